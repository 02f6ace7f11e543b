#![allow(dead_code)]

use admin_console::config::{BackendSettings, ConsoleSettings, ServerSettings};
use admin_console::services::BackendClient;
use admin_console::startup::build_router;
use admin_console::AppState;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// The console wired to a wiremock backend, plus the browser's session cookie.
pub struct TestConsole {
    pub backend: MockServer,
    router: Router,
    cookie: Option<String>,
}

pub fn server_settings() -> ServerSettings {
    ServerSettings {
        host: "127.0.0.1".to_string(),
        port: 0,
        static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string(),
        session_inactivity_minutes: 60,
        secure_cookies: false,
    }
}

pub fn router_for(base_url: &str) -> Router {
    let api = BackendClient::new(&BackendSettings {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        api_token: None,
    })
    .expect("Failed to build backend client");

    let state = AppState::new(Arc::new(api), ConsoleSettings::default());
    build_router(state, &server_settings())
}

impl TestConsole {
    pub async fn spawn() -> Self {
        let backend = MockServer::start().await;
        let router = router_for(&format!("{}/api", backend.uri()));

        Self {
            backend,
            router,
            cookie: None,
        }
    }

    /// A console whose backend refuses every connection.
    pub async fn unreachable() -> Self {
        let backend = MockServer::start().await;
        Self {
            backend,
            router: router_for("http://127.0.0.1:1/api"),
            cookie: None,
        }
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, body: &str) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// GET the page a redirect points at and return its HTML.
    pub async fn follow(&mut self, response: Response<Body>) -> String {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let target = location(&response);
        let page = self.get(&target).await;
        assert_eq!(page.status(), StatusCode::OK);
        body_text(page).await
    }

    async fn send(&mut self, mut request: Request<Body>) -> Response<Body> {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }
        response
    }

    pub async fn mock_get(&self, api_path: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/api{api_path}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.backend)
            .await;
    }

    pub async fn mock(&self, verb: &str, api_path: &str, status: u16, body: Value) {
        Mock::given(method(verb))
            .and(path(format!("/api{api_path}")))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.backend)
            .await;
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without a location")
        .to_str()
        .unwrap()
        .to_string()
}

pub fn user(id: &str, username: &str, active: bool, updated: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "email": format!("{username}@example.com"),
        "firstName": username,
        "lastName": "Test",
        "isActive": active,
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": updated,
        "roles": []
    })
}

pub fn admin_role() -> Value {
    json!({"id": "r1", "code": "ADMIN", "name": "Admin", "isSystem": true})
}

pub fn editor_role() -> Value {
    json!({"id": "r2", "code": "EDITOR", "name": "Editor", "isSystem": false})
}
