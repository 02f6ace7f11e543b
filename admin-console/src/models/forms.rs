//! Browser form submissions and the JSON bodies built from them.
//!
//! Only presence is checked here; every other rule belongs to the backend.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// Labels of the fields that failed validation, sorted for stable output.
pub fn missing_fields(errors: &ValidationErrors) -> String {
    let mut labels: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .collect();
    labels.sort();
    labels.dedup();
    labels.join(", ")
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewUserForm {
    #[validate(length(min = 1, message = "Username"))]
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[validate(length(min = 1, message = "Password"))]
    #[serde(default)]
    pub password: String,
    #[validate(length(min = 1, message = "Role"))]
    #[serde(default)]
    pub role_id: String,
}

/// `POST /auth/register` body. The role is assigned in a second call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl From<&NewUserForm> for RegisterUser {
    fn from(form: &NewUserForm) -> Self {
        Self {
            username: form.username.clone(),
            email: form.email.clone(),
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            password: form.password.clone(),
        }
    }
}

/// Full edit page: several roles may be ticked.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateForm {
    #[validate(length(min = 1, message = "Username"))]
    #[serde(default)]
    pub username: String,
    #[validate(length(min = 1, message = "Email"))]
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role_ids: Vec<String>,
}

/// Edit dialog on the users list: a single role select, empty for none.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserModalForm {
    #[validate(length(min = 1, message = "Username"))]
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role_id: String,
}

/// `PUT /auth/users/{id}` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role_ids: Vec<String>,
}

impl From<UserUpdateForm> for UserUpdate {
    fn from(form: UserUpdateForm) -> Self {
        Self {
            username: form.username,
            email: form.email,
            first_name: form.first_name,
            last_name: form.last_name,
            role_ids: form.role_ids,
        }
    }
}

impl From<UserModalForm> for UserUpdate {
    fn from(form: UserModalForm) -> Self {
        let role_ids = if form.role_id.is_empty() {
            Vec::new()
        } else {
            vec![form.role_id]
        };

        Self {
            username: form.username,
            email: form.email,
            first_name: form.first_name,
            last_name: form.last_name,
            role_ids,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoleForm {
    #[validate(length(min = 1, message = "Code"))]
    #[serde(default)]
    pub code: String,
    #[validate(length(min = 1, message = "Name"))]
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permission_ids: Vec<String>,
}

/// `POST /auth/roles` body; creation carries the permission set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRole {
    pub code: String,
    pub name: String,
    pub description: String,
    pub permission_ids: Vec<String>,
}

/// `PUT /auth/roles/{id}` body; permissions are replaced separately.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleUpdate {
    pub code: String,
    pub name: String,
    pub description: String,
}

/// `PUT /auth/roles/{id}/permissions` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissions {
    pub permission_ids: Vec<String>,
}

impl RoleForm {
    pub fn into_new_role(self) -> NewRole {
        NewRole {
            code: self.code,
            name: self.name,
            description: self.description,
            permission_ids: self.permission_ids,
        }
    }

    pub fn split(self) -> (RoleUpdate, RolePermissions) {
        (
            RoleUpdate {
                code: self.code,
                name: self.name,
                description: self.description,
            },
            RolePermissions {
                permission_ids: self.permission_ids,
            },
        )
    }
}

/// Add and edit dialogs on the permissions screen; also the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct PermissionForm {
    #[validate(length(min = 1, message = "Code"))]
    #[serde(default)]
    pub code: String,
    #[validate(length(min = 1, message = "Name"))]
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub module: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_user_requires_username_password_and_role() {
        let form = NewUserForm {
            email: "a@example.com".into(),
            ..Default::default()
        };

        let errors = form.validate().unwrap_err();
        assert_eq!(missing_fields(&errors), "Password, Role, Username");
    }

    #[test]
    fn registration_body_leaves_out_the_role() {
        let form = NewUserForm {
            username: "ann".into(),
            password: "pw".into(),
            role_id: "r1".into(),
            ..Default::default()
        };
        assert!(form.validate().is_ok());

        let body = serde_json::to_value(RegisterUser::from(&form)).unwrap();
        assert_eq!(
            body,
            json!({"username": "ann", "email": "", "firstName": "", "lastName": "", "password": "pw"})
        );
    }

    #[tokio::test]
    async fn repeated_role_checkboxes_collect_into_a_list() {
        let form: UserUpdateForm = parse_form(
            "username=ann&email=a%40x.io&firstName=Ann&lastName=Lee&roleIds=r1&roleIds=r2",
        )
        .await;
        assert_eq!(form.role_ids, vec!["r1", "r2"]);

        let body = serde_json::to_value(UserUpdate::from(form)).unwrap();
        assert_eq!(body["roleIds"], json!(["r1", "r2"]));
        assert_eq!(body["firstName"], "Ann");
    }

    #[test]
    fn modal_role_select_maps_to_zero_or_one_role() {
        let none = UserUpdate::from(UserModalForm {
            username: "ann".into(),
            ..Default::default()
        });
        assert!(none.role_ids.is_empty());

        let one = UserUpdate::from(UserModalForm {
            username: "ann".into(),
            role_id: "r3".into(),
            ..Default::default()
        });
        assert_eq!(one.role_ids, vec!["r3"]);
    }

    #[test]
    fn role_form_splits_into_field_and_permission_updates() {
        let form = RoleForm {
            code: "OPS".into(),
            name: "Operations".into(),
            description: String::new(),
            permission_ids: vec!["p1".into()],
        };

        let (fields, perms) = form.split();
        assert_eq!(
            serde_json::to_value(fields).unwrap(),
            json!({"code": "OPS", "name": "Operations", "description": ""})
        );
        assert_eq!(
            serde_json::to_value(perms).unwrap(),
            json!({"permissionIds": ["p1"]})
        );
    }

    #[test]
    fn permission_form_requires_code_and_name() {
        let errors = PermissionForm::default().validate().unwrap_err();
        assert_eq!(missing_fields(&errors), "Code, Name");
    }

    async fn parse_form<T: serde::de::DeserializeOwned>(body: &str) -> T {
        use axum::extract::FromRequest;
        use axum_extra::extract::Form;

        let request = axum::http::Request::builder()
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap();

        let Form(value) = Form::<T>::from_request(request, &()).await.unwrap();
        value
    }
}
