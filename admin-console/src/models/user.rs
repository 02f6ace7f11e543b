use super::{display_name, RecordId, RoleSummary};
use crate::listing::{Activatable, Listable, RoleHolder, SortValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RecordId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    pub last_login_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(default)]
    pub roles: Vec<RoleSummary>,
    /// Fields the console does not interpret, kept as received.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// "First Last" when both parts are present.
    pub fn full_name(&self) -> Option<String> {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) if !first.is_empty() && !last.is_empty() => {
                Some(format!("{first} {last}"))
            }
            _ => None,
        }
    }

    pub fn first_role(&self) -> Option<&RoleSummary> {
        self.roles.first()
    }

    pub fn role_ids(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.id.to_string()).collect()
    }
}

impl Listable for User {
    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "id" => Some(self.id.sort_value()),
            "username" => Some(SortValue::text(&self.username)),
            "email" => Some(SortValue::text(&self.email)),
            "firstName" => self.first_name.as_deref().map(SortValue::text),
            "lastName" => self.last_name.as_deref().map(SortValue::text),
            "name" => Some(SortValue::Text(display_name(
                self.first_name.as_deref(),
                self.last_name.as_deref(),
            ))),
            "role" => Some(SortValue::text(
                self.first_role().map(|r| r.name.as_str()).unwrap_or_default(),
            )),
            "isActive" => Some(SortValue::Flag(self.is_active)),
            "lastLoginAt" => self.last_login_at.as_deref().map(SortValue::text),
            "createdAt" => self.created_at.as_deref().map(SortValue::text),
            "updatedAt" => self.updated_at.as_deref().map(SortValue::text),
            _ => None,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.username.as_str(), self.email.as_str()];
        fields.extend(self.first_name.as_deref());
        fields.extend(self.last_name.as_deref());
        fields
    }

    fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }

    fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }
}

impl Activatable for User {
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl RoleHolder for User {
    fn first_role_id(&self) -> Option<&str> {
        self.first_role().map(|r| r.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{run, Paging, RoleFilter, SearchFilter, SortSpec};
    use serde_json::json;

    fn user(id: &str, first: Option<&str>, last: Option<&str>) -> User {
        serde_json::from_value(json!({
            "id": id,
            "username": format!("user{id}"),
            "email": format!("user{id}@example.com"),
            "firstName": first,
            "lastName": last,
            "isActive": true,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": null,
            "roles": []
        }))
        .unwrap()
    }

    #[test]
    fn numeric_ids_and_unknown_fields_survive() {
        let u: User = serde_json::from_value(json!({
            "id": 42,
            "username": "alice",
            "email": "a@example.com",
            "isActive": false,
            "department": "ops",
            "roles": [{"id": 7, "code": "ADMIN", "name": "Admin"}]
        }))
        .unwrap();

        assert_eq!(u.id, "42");
        assert_eq!(u.roles[0].id, "7");
        assert_eq!(u.extra.get("department"), Some(&json!("ops")));
        assert!(u.first_name.is_none());

        let back = serde_json::to_value(&u).unwrap();
        assert_eq!(back["department"], "ops");
        assert_eq!(back["isActive"], false);
    }

    #[test]
    fn numeric_ids_sort_by_value() {
        let records: Vec<User> = [9, 10, 2]
            .into_iter()
            .map(|id| serde_json::from_value(json!({"id": id, "username": "u"})).unwrap())
            .collect();

        let page = run(&records, &SortSpec::asc("id"), &[], Paging::new(1, 5));
        let ids: Vec<&str> = page.rows.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "9", "10"]);

        let page = run(&records, &SortSpec::desc("id"), &[], Paging::new(1, 5));
        let ids: Vec<&str> = page.rows.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["10", "9", "2"]);
    }

    #[test]
    fn name_column_sorts_by_joined_first_and_last_name() {
        let records = vec![
            user("1", Some("Zed"), Some("Adams")),
            user("2", None, Some("Young")),
            user("3", Some("Anna"), None),
        ];

        let page = run(&records, &SortSpec::asc("name"), &[], Paging::new(1, 5));
        let ids: Vec<&str> = page.rows.iter().map(|u| u.id.as_str()).collect();
        // " Young" < "Anna " < "Zed Adams"
        assert_eq!(ids, vec!["2", "3", "1"]);
    }

    #[test]
    fn role_column_uses_first_role_name() {
        let mut a = user("a", None, None);
        a.roles = vec![RoleSummary::new("r2", "EDITOR", "Editor")];
        let mut b = user("b", None, None);
        b.roles = vec![
            RoleSummary::new("r1", "ADMIN", "Admin"),
            RoleSummary::new("r3", "ZETA", "Zeta"),
        ];
        let c = user("c", None, None);

        let records = vec![a, b, c];
        let page = run(&records, &SortSpec::asc("role"), &[], Paging::new(1, 5));
        let ids: Vec<&str> = page.rows.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn search_matches_last_name_only() {
        let records = vec![
            user("1", Some("Ann"), Some("Kowalski")),
            user("2", Some("Bob"), Some("Smith")),
        ];
        let search = SearchFilter::new("kowal");

        let page = run(&records, &SortSpec::none(), &[&search], Paging::new(1, 5));
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].id, "1");
    }

    #[test]
    fn second_role_does_not_match_role_filter() {
        let mut u = user("1", None, None);
        u.roles = vec![
            RoleSummary::new("viewer", "VIEWER", "Viewer"),
            RoleSummary::new("admin", "ADMIN", "Admin"),
        ];
        let records = vec![u];
        let filter = RoleFilter::parse("admin");

        let page = run(&records, &SortSpec::none(), &[&filter], Paging::new(1, 5));
        assert!(page.is_empty());
    }

    #[test]
    fn full_name_needs_both_parts() {
        assert_eq!(
            user("1", Some("Ann"), Some("Lee")).full_name().as_deref(),
            Some("Ann Lee")
        );
        assert_eq!(user("1", Some("Ann"), None).full_name(), None);
    }
}
