use super::Listable;

/// One filter applied after sorting. A record is kept only when every
/// predicate on the screen matches it.
pub trait Predicate<T> {
    fn matches(&self, record: &T) -> bool;
}

pub trait Activatable {
    fn is_active(&self) -> bool;
}

pub trait RoleHolder {
    /// Id of the first role in the record's role list.
    fn first_role_id(&self) -> Option<&str>;
}

/// Case-insensitive substring match against any of a record's search fields.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    needle: String,
}

impl SearchFilter {
    pub fn new(term: &str) -> Self {
        Self {
            needle: term.to_lowercase(),
        }
    }
}

impl<T: Listable> Predicate<T> for SearchFilter {
    fn matches(&self, record: &T) -> bool {
        if self.needle.is_empty() {
            return true;
        }

        record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&self.needle))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn parse(value: &str) -> Self {
        match value {
            "active" => StatusFilter::Active,
            "inactive" => StatusFilter::Inactive,
            _ => StatusFilter::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Inactive => "inactive",
        }
    }
}

impl<T: Activatable> Predicate<T> for StatusFilter {
    fn matches(&self, record: &T) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => record.is_active(),
            StatusFilter::Inactive => !record.is_active(),
        }
    }
}

/// Matches users by their first-listed role only. A user holding the role
/// in a later position does not match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RoleFilter {
    #[default]
    All,
    Role(String),
}

impl RoleFilter {
    pub fn parse(value: &str) -> Self {
        match value {
            "" | "all" => RoleFilter::All,
            id => RoleFilter::Role(id.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RoleFilter::All => "all",
            RoleFilter::Role(id) => id,
        }
    }
}

impl<T: RoleHolder> Predicate<T> for RoleFilter {
    fn matches(&self, record: &T) -> bool {
        match self {
            RoleFilter::All => true,
            RoleFilter::Role(id) => record.first_role_id() == Some(id.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::SortValue;

    struct Person {
        names: Vec<&'static str>,
        active: bool,
        roles: Vec<&'static str>,
    }

    impl Listable for Person {
        fn sort_value(&self, _field: &str) -> Option<SortValue> {
            None
        }

        fn search_fields(&self) -> Vec<&str> {
            self.names.clone()
        }

        fn created_at(&self) -> Option<&str> {
            None
        }

        fn updated_at(&self) -> Option<&str> {
            None
        }
    }

    impl Activatable for Person {
        fn is_active(&self) -> bool {
            self.active
        }
    }

    impl RoleHolder for Person {
        fn first_role_id(&self) -> Option<&str> {
            self.roles.first().copied()
        }
    }

    fn person(names: Vec<&'static str>) -> Person {
        Person {
            names,
            active: true,
            roles: Vec::new(),
        }
    }

    #[test]
    fn search_hits_any_field_ignoring_case() {
        let p = person(vec!["jdoe", "jdoe@example.com", "John", "Smithers"]);

        assert!(SearchFilter::new("smith").matches(&p));
        assert!(SearchFilter::new("EXAMPLE").matches(&p));
        assert!(!SearchFilter::new("jane").matches(&p));
    }

    #[test]
    fn empty_search_matches_everything() {
        assert!(SearchFilter::new("").matches(&person(Vec::new())));
    }

    #[test]
    fn status_filter_values() {
        let mut p = person(vec!["x"]);
        assert!(StatusFilter::All.matches(&p));
        assert!(StatusFilter::Active.matches(&p));
        p.active = false;
        assert!(StatusFilter::Inactive.matches(&p));
        assert!(!StatusFilter::Active.matches(&p));

        assert_eq!(StatusFilter::parse("inactive"), StatusFilter::Inactive);
        assert_eq!(StatusFilter::parse("bogus"), StatusFilter::All);
    }

    #[test]
    fn role_filter_ignores_later_roles() {
        let mut p = person(vec!["x"]);
        p.roles = vec!["r1", "r2"];

        assert!(RoleFilter::parse("r1").matches(&p));
        assert!(!RoleFilter::parse("r2").matches(&p));
        assert!(RoleFilter::parse("all").matches(&p));
    }

    #[test]
    fn role_filter_excludes_users_without_roles() {
        let p = person(vec!["x"]);
        assert!(!RoleFilter::parse("r1").matches(&p));
        assert!(RoleFilter::All.matches(&p));
    }
}
