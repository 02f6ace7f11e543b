//! Carries the console's span onto calls to the back-office REST API as
//! W3C Trace Context headers (https://www.w3.org/TR/trace-context/).

use opentelemetry::trace::{SpanContext, TraceContextExt};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub const TRACEPARENT_HEADER: &str = "traceparent";
pub const TRACESTATE_HEADER: &str = "tracestate";

/// `00-<trace id>-<span id>-<flags>`
fn traceparent(context: &SpanContext) -> String {
    format!(
        "00-{}-{}-{:02x}",
        context.trace_id(),
        context.span_id(),
        context.trace_flags().to_u8()
    )
}

/// Trace headers for the current span. Empty unless an OpenTelemetry span
/// is active, which never happens with OTLP export switched off.
pub fn current_trace_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();

    let context = Span::current().context();
    let span = context.span();
    let span_context = span.span_context();
    if !span_context.is_valid() {
        return headers;
    }

    if let Ok(value) = HeaderValue::from_str(&traceparent(span_context)) {
        headers.insert(TRACEPARENT_HEADER, value);
    }

    let state = span_context.trace_state().header();
    if let Ok(value) = HeaderValue::from_str(&state) {
        if !state.is_empty() {
            headers.insert(TRACESTATE_HEADER, value);
        }
    }

    headers
}

/// Request builder that attaches the trace headers at send time, so the
/// span doing the sending is the one propagated.
pub struct TracedRequest(RequestBuilder);

impl TracedRequest {
    pub fn json<T: serde::Serialize + ?Sized>(self, body: &T) -> Self {
        Self(self.0.json(body))
    }

    pub fn bearer_auth<T: std::fmt::Display>(self, token: T) -> Self {
        Self(self.0.bearer_auth(token))
    }

    pub async fn send(self) -> Result<Response, reqwest::Error> {
        self.0.headers(current_trace_headers()).send().await
    }
}

pub trait TracedClientExt {
    fn traced(&self, method: Method, url: &str) -> TracedRequest;
}

impl TracedClientExt for Client {
    fn traced(&self, method: Method, url: &str) -> TracedRequest {
        TracedRequest(self.request(method, url))
    }
}
