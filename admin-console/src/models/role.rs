use super::{Permission, RecordId};
use crate::listing::{Listable, SortValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role as embedded in a user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    pub id: RecordId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_system: bool,
}

impl RoleSummary {
    pub fn new(id: &str, code: &str, name: &str) -> Self {
        Self {
            id: RecordId::from(id),
            code: code.to_string(),
            name: name.to_string(),
            description: None,
            is_system: false,
        }
    }
}

impl From<&Role> for RoleSummary {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id.clone(),
            code: role.code.clone(),
            name: role.name.clone(),
            description: role.description.clone(),
            is_system: role.is_system,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RecordId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_system: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Listable for Role {
    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "id" => Some(self.id.sort_value()),
            "code" => Some(SortValue::text(&self.code)),
            "name" => Some(SortValue::text(&self.name)),
            "description" => self.description.as_deref().map(SortValue::text),
            "isSystem" => Some(SortValue::Flag(self.is_system)),
            "createdAt" => self.created_at.as_deref().map(SortValue::text),
            "updatedAt" => self.updated_at.as_deref().map(SortValue::text),
            _ => None,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.code.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }

    fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }

    fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }
}

/// A role together with the permissions currently granted to it.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleDetail {
    pub role: Option<Role>,
    pub permissions: Vec<Permission>,
}

impl RoleDetail {
    pub fn permission_ids(&self) -> Vec<String> {
        self.permissions.iter().map(|p| p.id.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_search_covers_description() {
        let role: Role = serde_json::from_value(json!({
            "id": "1",
            "code": "AUDIT",
            "name": "Auditor",
            "description": "Read-only access to ledgers",
            "isSystem": true
        }))
        .unwrap();

        assert!(role.search_fields().contains(&"Read-only access to ledgers"));
        assert_eq!(role.sort_value("isSystem"), Some(SortValue::Flag(true)));
    }

    #[test]
    fn null_description_is_not_searched() {
        let role: Role = serde_json::from_value(json!({
            "id": 3,
            "code": "OPS",
            "name": "Operations",
            "description": null
        }))
        .unwrap();

        assert_eq!(role.search_fields(), vec!["Operations", "OPS"]);
        assert_eq!(role.id, "3");
    }
}
