use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use console_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::ServerSettings;
use crate::handlers::{app, metrics, permissions, roles, users};
use crate::AppState;

pub fn build_router(state: AppState, server: &ServerSettings) -> Router {
    // Sessions only carry flash banners and list snapshots
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(server.secure_cookies)
        .with_expiry(Expiry::OnInactivity(server.session_inactivity()));

    Router::new()
        .route("/", get(app::index))
        .route("/health", get(app::health_check))
        .route("/metrics", get(metrics::metrics))
        .route("/users", get(users::list_page))
        .route("/users/add", get(users::add_page).post(users::create))
        .route("/users/:id/edit", get(users::edit_page).post(users::save))
        .route("/users/:id/edit/toggle-status", post(users::toggle_on_edit_page))
        .route("/users/:id/toggle-status", post(users::toggle_status))
        .route("/users/:id/update", post(users::update))
        .route("/users/:id/delete", post(users::delete))
        .route("/roles", get(roles::list_page).post(roles::create))
        .route("/roles/:id/update", post(roles::update))
        .route(
            "/permissions",
            get(permissions::list_page).post(permissions::create),
        )
        .route("/permissions/:id/update", post(permissions::update))
        .route("/permissions/:id/delete", post(permissions::delete))
        .nest_service("/static", ServeDir::new(&server.static_dir))
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Outermost, so the trace span sees the minted id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
