use axum::response::Redirect;

/// The users screen is the console's landing page.
pub async fn index() -> Redirect {
    Redirect::to("/users")
}

pub async fn health_check() -> &'static str {
    "OK"
}
