use crate::ui::alert::Alert;
use crate::ui::i18n::{Locale, Msg};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

/// Failure of one call to the REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed: connection refused, DNS, timeout.
    #[error("Backend unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Backend returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },

    /// A success response that did not contain the expected record.
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    /// Error banner for this failure. The backend's own message wins over
    /// `fallback`; transport failures always read "cannot connect".
    pub fn alert(&self, locale: Locale, fallback: Msg) -> Alert {
        let title = locale.text(Msg::ErrorTitle);
        match self {
            ApiError::Transport(_) => Alert::error(title, locale.text(Msg::CannotConnect)),
            ApiError::Status {
                message: Some(message),
                ..
            } => Alert::error(title, message),
            ApiError::Status { message: None, .. } | ApiError::Decode(_) => {
                Alert::error(title, locale.text(fallback))
            }
        }
    }

    /// Banner for the standalone add and edit pages, which title each
    /// failure after the action and word transport failures differently.
    pub fn page_alert(&self, locale: Locale, title: Msg, fallback: Msg) -> Alert {
        match self {
            ApiError::Transport(_) => Alert::error(
                locale.text(Msg::ConnectFailedTitle),
                locale.text(Msg::ApiConnectFailed),
            ),
            ApiError::Status {
                message: Some(message),
                ..
            } => Alert::error(locale.text(title), message),
            ApiError::Status { message: None, .. } | ApiError::Decode(_) => {
                Alert::error(locale.text(title), locale.text(fallback))
            }
        }
    }
}

/// Failures inside the console itself, shown as a bare 500 page.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Template error: {0}")]
    Render(#[from] askama::Error),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed inside the console");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<!doctype html><title>Error</title><h1>500</h1><p>Internal server error</p>"),
        )
            .into_response()
    }
}
