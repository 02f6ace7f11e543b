//! Response shapes accepted from the REST API.
//!
//! Lists arrive as a bare array, `{items}`, `{data}` or keyed by the entity's
//! plural name. Single records arrive bare or under `{<singular>}` / `{data}`.

use super::{Permission, Role, RoleDetail};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a mutation response. Only `message` is read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: Option<String>,
}

impl ApiMessage {
    /// Empty, non-JSON or oddly shaped bodies decode as no message.
    pub fn from_bytes(body: &[u8]) -> Self {
        serde_json::from_slice::<Value>(body)
            .map(|value| Self::from_value(&value))
            .unwrap_or_default()
    }

    pub fn from_value(value: &Value) -> Self {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string);

        Self { message }
    }
}

pub struct Envelope;

impl Envelope {
    /// Decode a list response. Unrecognised shapes give an empty list and
    /// records that fail to decode are skipped.
    pub fn list<T: DeserializeOwned>(body: Value, plural: &str) -> Vec<T> {
        let items = match body {
            Value::Array(items) => items,
            Value::Object(mut map) => ["items", "data", plural]
                .iter()
                .find_map(|key| match map.remove(*key) {
                    Some(Value::Array(items)) => Some(items),
                    _ => None,
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(entity = plural, error = %e, "Skipping undecodable record");
                    None
                }
            })
            .collect()
    }

    /// Decode a single-record response.
    pub fn record<T: DeserializeOwned>(body: Value, singular: &str) -> Result<T, serde_json::Error> {
        serde_json::from_value(Self::unwrap_record(body, singular))
    }

    fn unwrap_record(body: Value, singular: &str) -> Value {
        match body {
            Value::Object(mut map) => {
                for key in [singular, "data"] {
                    if matches!(map.get(key), Some(Value::Object(_))) {
                        if let Some(inner) = map.remove(key) {
                            return inner;
                        }
                    }
                }
                Value::Object(map)
            }
            other => other,
        }
    }

    /// `GET /auth/roles/{id}`: the role plus its permission list, which may
    /// sit beside the role fields or inside the wrapper.
    pub fn role_detail(body: Value) -> RoleDetail {
        let inner = Self::unwrap_record(body, "role");

        let permissions = match inner.get("permissions") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item.get("permission") {
                    Some(nested @ Value::Object(_)) => nested.clone(),
                    _ => item.clone(),
                })
                .filter_map(|item| serde_json::from_value::<Permission>(item).ok())
                .collect(),
            _ => Vec::new(),
        };

        RoleDetail {
            role: serde_json::from_value::<Role>(inner).ok(),
            permissions,
        }
    }

    /// Id of the account created by `POST /auth/register`, read from `user.id`.
    pub fn created_user_id(body: &Value) -> Option<String> {
        match body.get("user").and_then(|u| u.get("id")) {
            Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        }
    }
}
