//! Notification banners and the session flash that carries them across a
//! post/redirect/get round trip.

use serde::{Deserialize, Serialize};
use tower_sessions::{session, Session};

use super::i18n::{Locale, Msg};

const FLASH_KEY: &str = "console.flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertVariant {
    Success,
    Error,
    Warning,
    Info,
}

impl AlertVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertVariant::Success => "success",
            AlertVariant::Error => "error",
            AlertVariant::Warning => "warning",
            AlertVariant::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub variant: AlertVariant,
    pub title: String,
    pub message: String,
    /// 0 keeps the banner until the page changes.
    #[serde(default)]
    pub dismiss_after_ms: u64,
}

impl Alert {
    pub fn new(variant: AlertVariant, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            variant,
            title: title.into(),
            message: message.into(),
            dismiss_after_ms: 0,
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(AlertVariant::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(AlertVariant::Error, title, message)
    }

    /// Success banner with the standard title, preferring the backend's
    /// message over the catalog text.
    pub fn done(locale: Locale, backend_message: Option<&str>, fallback: Msg) -> Self {
        Self::success(
            locale.text(Msg::SuccessTitle),
            backend_message.unwrap_or(locale.text(fallback)),
        )
    }

    pub fn dismiss_after(mut self, ms: u64) -> Self {
        self.dismiss_after_ms = ms;
        self
    }

    pub fn kind(&self) -> &'static str {
        self.variant.as_str()
    }
}

/// Queue a banner for the next page this session renders.
pub async fn push_flash(session: &Session, alert: Alert) -> Result<(), session::Error> {
    let mut queued: Vec<Alert> = session.get(FLASH_KEY).await?.unwrap_or_default();
    queued.push(alert);
    session.insert(FLASH_KEY, queued).await
}

/// Remove and return every queued banner.
pub async fn take_flash(session: &Session) -> Result<Vec<Alert>, session::Error> {
    Ok(session
        .remove::<Vec<Alert>>(FLASH_KEY)
        .await?
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    #[test]
    fn done_prefers_backend_message() {
        let alert = Alert::done(Locale::Th, Some("OK from API"), Msg::DeleteUserOk);
        assert_eq!(alert.title, "สำเร็จ");
        assert_eq!(alert.message, "OK from API");

        let alert = Alert::done(Locale::Th, None, Msg::DeleteUserOk);
        assert_eq!(alert.message, "ลบผู้ใช้งานเรียบร้อยแล้ว");
        assert_eq!(alert.kind(), "success");
    }

    #[tokio::test]
    async fn flash_is_shown_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        push_flash(&session, Alert::success("a", "first").dismiss_after(3000))
            .await
            .unwrap();
        push_flash(&session, Alert::error("b", "second")).await.unwrap();

        let shown = take_flash(&session).await.unwrap();
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0].message, "first");
        assert_eq!(shown[0].dismiss_after_ms, 3000);
        assert_eq!(shown[1].variant, AlertVariant::Error);

        assert!(take_flash(&session).await.unwrap().is_empty());
    }
}
