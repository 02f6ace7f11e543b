use crate::config::BackendSettings;
use crate::error::ApiError;
use crate::models::envelope::{ApiMessage, Envelope};
use crate::models::forms::{NewRole, PermissionForm, RegisterUser, RolePermissions, RoleUpdate, UserUpdate};
use crate::models::{Permission, Role, RoleDetail, User};
use console_core::metrics::record_backend_call;
use console_core::observability::{TracedClientExt, TracedRequest};
use reqwest::{Client, Method, Url};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("Invalid backend base URL {url}: {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result of `POST /auth/register`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registered {
    pub user_id: Option<String>,
    pub message: ApiMessage,
}

/// Client for the back-office REST API.
///
/// Every call forwards the current trace context, is counted in
/// `backend_requests_total`, and maps failures onto [`ApiError`].
pub struct BackendClient {
    client: Client,
    base_url: Url,
    api_token: Option<Secret<String>>,
}

impl BackendClient {
    pub fn new(settings: &BackendSettings) -> Result<Self, ClientBuildError> {
        let invalid = |reason: String| ClientBuildError::BaseUrl {
            url: settings.base_url.clone(),
            reason,
        };

        let base_url = Url::parse(&settings.base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_token: settings.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: &Url) -> TracedRequest {
        let request = self.client.traced(method, url.as_str());
        match &self.api_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn execute(
        &self,
        method: Method,
        endpoint: &'static str,
        request: TracedRequest,
    ) -> Result<Value, ApiError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                record_backend_call(method.as_str(), endpoint, "error");
                tracing::error!(%method, endpoint, error = %e, "Backend request failed");
                return Err(ApiError::Transport(e));
            }
        };

        let status = response.status();
        record_backend_call(method.as_str(), endpoint, status.as_str());

        let body = response.bytes().await.map_err(ApiError::Transport)?;

        if status.is_success() {
            tracing::debug!(%method, endpoint, status = status.as_u16(), "Backend request succeeded");
            Ok(serde_json::from_slice(&body).unwrap_or(Value::Null))
        } else {
            let message = ApiMessage::from_bytes(&body).message;
            tracing::warn!(
                %method,
                endpoint,
                status = status.as_u16(),
                message = message.as_deref().unwrap_or(""),
                "Backend rejected request"
            );
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn send(
        &self,
        method: Method,
        endpoint: &'static str,
        segments: &[&str],
    ) -> Result<Value, ApiError> {
        let request = self.request(method.clone(), &self.url(segments));
        self.execute(method, endpoint, request).await
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &'static str,
        segments: &[&str],
        body: &B,
    ) -> Result<Value, ApiError> {
        let request = self.request(method.clone(), &self.url(segments)).json(body);
        self.execute(method, endpoint, request).await
    }

    // ---------------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let body = self
            .send(Method::GET, "/auth/users", &["auth", "users"])
            .await?;
        Ok(Envelope::list(body, "users"))
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: &str) -> Result<User, ApiError> {
        let body = self
            .send(Method::GET, "/auth/users/{id}", &["auth", "users", id])
            .await?;
        Envelope::record(body, "user").map_err(|e| ApiError::Decode(e.to_string()))
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn register_user(&self, user: &RegisterUser) -> Result<Registered, ApiError> {
        let body = self
            .send_json(Method::POST, "/auth/register", &["auth", "register"], user)
            .await?;

        Ok(Registered {
            user_id: Envelope::created_user_id(&body),
            message: ApiMessage::from_value(&body),
        })
    }

    #[instrument(skip(self, update))]
    pub async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<ApiMessage, ApiError> {
        let body = self
            .send_json(Method::PUT, "/auth/users/{id}", &["auth", "users", id], update)
            .await?;
        Ok(ApiMessage::from_value(&body))
    }

    #[instrument(skip(self))]
    pub async fn toggle_user_status(&self, id: &str) -> Result<ApiMessage, ApiError> {
        let body = self
            .send(
                Method::PATCH,
                "/auth/users/{id}/toggle-status",
                &["auth", "users", id, "toggle-status"],
            )
            .await?;
        Ok(ApiMessage::from_value(&body))
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> Result<ApiMessage, ApiError> {
        let body = self
            .send(Method::DELETE, "/auth/users/{id}", &["auth", "users", id])
            .await?;
        Ok(ApiMessage::from_value(&body))
    }

    #[instrument(skip(self))]
    pub async fn assign_role(&self, user_id: &str, role_id: &str) -> Result<ApiMessage, ApiError> {
        let body = self
            .send(
                Method::POST,
                "/auth/users/{id}/roles/{roleId}",
                &["auth", "users", user_id, "roles", role_id],
            )
            .await?;
        Ok(ApiMessage::from_value(&body))
    }

    // ---------------------------------------------------------------------
    // Roles
    // ---------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn list_roles(&self) -> Result<Vec<Role>, ApiError> {
        let body = self
            .send(Method::GET, "/auth/roles", &["auth", "roles"])
            .await?;
        Ok(Envelope::list(body, "roles"))
    }

    #[instrument(skip(self))]
    pub async fn get_role(&self, id: &str) -> Result<RoleDetail, ApiError> {
        let body = self
            .send(Method::GET, "/auth/roles/{id}", &["auth", "roles", id])
            .await?;
        Ok(Envelope::role_detail(body))
    }

    #[instrument(skip(self, role), fields(code = %role.code))]
    pub async fn create_role(&self, role: &NewRole) -> Result<ApiMessage, ApiError> {
        let body = self
            .send_json(Method::POST, "/auth/roles", &["auth", "roles"], role)
            .await?;
        Ok(ApiMessage::from_value(&body))
    }

    #[instrument(skip(self, role))]
    pub async fn update_role(&self, id: &str, role: &RoleUpdate) -> Result<ApiMessage, ApiError> {
        let body = self
            .send_json(Method::PUT, "/auth/roles/{id}", &["auth", "roles", id], role)
            .await?;
        Ok(ApiMessage::from_value(&body))
    }

    #[instrument(skip(self, permissions), fields(count = permissions.permission_ids.len()))]
    pub async fn replace_role_permissions(
        &self,
        id: &str,
        permissions: &RolePermissions,
    ) -> Result<ApiMessage, ApiError> {
        let body = self
            .send_json(
                Method::PUT,
                "/auth/roles/{id}/permissions",
                &["auth", "roles", id, "permissions"],
                permissions,
            )
            .await?;
        Ok(ApiMessage::from_value(&body))
    }

    // ---------------------------------------------------------------------
    // Permissions
    // ---------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn list_permissions(&self) -> Result<Vec<Permission>, ApiError> {
        let body = self
            .send(Method::GET, "/auth/permissions", &["auth", "permissions"])
            .await?;
        Ok(Envelope::list(body, "permissions"))
    }

    #[instrument(skip(self, permission), fields(code = %permission.code))]
    pub async fn create_permission(&self, permission: &PermissionForm) -> Result<ApiMessage, ApiError> {
        let body = self
            .send_json(
                Method::POST,
                "/auth/permissions",
                &["auth", "permissions"],
                permission,
            )
            .await?;
        Ok(ApiMessage::from_value(&body))
    }

    #[instrument(skip(self, permission))]
    pub async fn update_permission(
        &self,
        id: &str,
        permission: &PermissionForm,
    ) -> Result<ApiMessage, ApiError> {
        let body = self
            .send_json(
                Method::PUT,
                "/auth/permissions/{id}",
                &["auth", "permissions", id],
                permission,
            )
            .await?;
        Ok(ApiMessage::from_value(&body))
    }

    #[instrument(skip(self))]
    pub async fn delete_permission(&self, id: &str) -> Result<ApiMessage, ApiError> {
        let body = self
            .send(
                Method::DELETE,
                "/auth/permissions/{id}",
                &["auth", "permissions", id],
            )
            .await?;
        Ok(ApiMessage::from_value(&body))
    }
}
