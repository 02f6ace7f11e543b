pub mod envelope;
pub mod forms;
pub mod permission;
pub mod role;
pub mod user;

pub use envelope::{ApiMessage, Envelope};
pub use forms::{NewUserForm, PermissionForm, RoleForm, UserModalForm, UserUpdateForm};
pub use permission::Permission;
pub use role::{Role, RoleDetail, RoleSummary};
pub use user::User;

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::listing::SortValue;

/// Record id as the backend sent it.
///
/// Backends disagree on whether ids are numbers or strings. The console uses
/// the text form for paths and form values, and keeps integer ids numeric so
/// they sort as numbers and serialize back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId {
    text: String,
    number: Option<i64>,
}

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn sort_value(&self) -> SortValue {
        match self.number {
            Some(n) => SortValue::Number(n),
            None => SortValue::text(&self.text),
        }
    }
}

impl From<&str> for RecordId {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
            number: None,
        }
    }
}

impl Deref for RecordId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq<str> for RecordId {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for RecordId {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

impl PartialEq<String> for RecordId {
    fn eq(&self, other: &String) -> bool {
        &self.text == other
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.number {
            Some(n) => serializer.serialize_i64(n),
            None => serializer.serialize_str(&self.text),
        }
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Self { text, number: None },
            RawId::Number(n) => Self {
                text: n.to_string(),
                number: n.as_i64(),
            },
        })
    }
}

/// Join first and last name the way the name column sorts them.
pub(crate) fn display_name(first: Option<&str>, last: Option<&str>) -> String {
    format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default())
}
