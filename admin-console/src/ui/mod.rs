pub mod alert;
pub mod format;
pub mod i18n;
pub mod modal;
pub mod snapshot;

pub use alert::{Alert, AlertVariant};
pub use i18n::{Locale, Msg};
pub use modal::{ChromeState, ModalStack, SuppressionToken};
