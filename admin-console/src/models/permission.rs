use super::RecordId;
use crate::listing::{Listable, SortValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: RecordId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub module: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Listable for Permission {
    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "id" => Some(self.id.sort_value()),
            "code" => Some(SortValue::text(&self.code)),
            "name" => Some(SortValue::text(&self.name)),
            "description" => self.description.as_deref().map(SortValue::text),
            "module" => self.module.as_deref().map(SortValue::text),
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
