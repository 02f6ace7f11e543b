pub mod logging;
pub mod trace_context;

pub use logging::{init_tracing, LogFormat, TelemetryError};
pub use trace_context::{current_trace_headers, TracedClientExt, TracedRequest};
