use super::{Paging, RoleFilter, SortDirection, SortSpec, StatusFilter, UPDATED_AT};
use serde::Deserialize;

/// List-screen query parameters as they arrive from the browser.
///
/// `sort` distinguishes absent (the mount default) from empty (no sort).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub status: Option<String>,
    pub role: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub page: Option<String>,
}

/// Search, filters, sort and page of one list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    pub search: String,
    pub status: StatusFilter,
    pub role: RoleFilter,
    pub sort: SortSpec,
    pub page: usize,
}

impl Default for ListState {
    fn default() -> Self {
        Self::mounted()
    }
}

impl ListState {
    /// State of a freshly opened screen: newest changes first.
    pub fn mounted() -> Self {
        Self {
            search: String::new(),
            status: StatusFilter::All,
            role: RoleFilter::All,
            sort: SortSpec::desc(UPDATED_AT),
            page: 1,
        }
    }

    /// State after "clear filters". The sort is dropped, not reset to the
    /// mount default.
    pub fn cleared() -> Self {
        Self {
            sort: SortSpec::none(),
            ..Self::mounted()
        }
    }

    pub fn from_params(params: &ListParams) -> Self {
        let mounted = Self::mounted();

        let sort = match params.sort.as_deref() {
            None => mounted.sort,
            Some(field) => SortSpec {
                field: Some(field.to_string()).filter(|f| !f.is_empty()),
                direction: params
                    .dir
                    .as_deref()
                    .map(SortDirection::parse)
                    .unwrap_or_default(),
            },
        };

        let page = params
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);

        Self {
            search: params.q.clone().unwrap_or_default(),
            status: params
                .status
                .as_deref()
                .map(StatusFilter::parse)
                .unwrap_or_default(),
            role: params
                .role
                .as_deref()
                .map(RoleFilter::parse)
                .unwrap_or_default(),
            sort,
            page,
        }
    }

    /// Clicking a column header: the active column flips direction, any
    /// other column becomes the ascending sort. The page is kept.
    pub fn toggle_sort(&self, field: &str) -> Self {
        let sort = if self.sort.is_sorted_by(field) {
            SortSpec {
                field: Some(field.to_string()),
                direction: self.sort.direction.flipped(),
            }
        } else {
            SortSpec::asc(field)
        };

        Self {
            sort,
            ..self.clone()
        }
    }

    pub fn with_page(&self, page: usize) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    pub fn paging(&self, per_page: usize) -> Paging {
        Paging::new(self.page, per_page)
    }

    /// Query string that reproduces this state. `sort` is always present so
    /// that a link back to the screen is never mistaken for a fresh mount.
    pub fn to_query(&self) -> String {
        let page = self.page.to_string();
        let mut pairs: Vec<(&str, &str)> = Vec::with_capacity(6);

        if !self.search.is_empty() {
            pairs.push(("q", self.search.as_str()));
        }
        if self.status != StatusFilter::All {
            pairs.push(("status", self.status.as_str()));
        }
        if self.role != RoleFilter::All {
            pairs.push(("role", self.role.as_str()));
        }
        pairs.push(("sort", self.sort.field().unwrap_or_default()));
        pairs.push(("dir", self.sort.direction.as_str()));
        if self.page > 1 {
            pairs.push(("page", page.as_str()));
        }

        serde_urlencoded::to_string(&pairs).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(query: &str) -> ListParams {
        serde_urlencoded::from_str(query).unwrap()
    }

    #[test]
    fn no_query_is_the_mount_default() {
        let state = ListState::from_params(&ListParams::default());
        assert_eq!(state.sort, SortSpec::desc("updatedAt"));
        assert_eq!(state.page, 1);
        assert_eq!(state.status, StatusFilter::All);
    }

    #[test]
    fn empty_sort_means_unsorted() {
        let state = ListState::from_params(&params("sort=&dir=asc"));
        assert_eq!(state.sort.field(), None);
    }

    #[test]
    fn toggling_the_active_column_flips_direction() {
        let state = ListState::mounted().toggle_sort("username");
        assert_eq!(state.sort, SortSpec::asc("username"));

        let state = state.toggle_sort("username");
        assert_eq!(state.sort, SortSpec::desc("username"));

        let state = state.toggle_sort("email");
        assert_eq!(state.sort, SortSpec::asc("email"));
    }

    #[test]
    fn toggling_updated_at_from_mount_goes_ascending() {
        let state = ListState::mounted().toggle_sort("updatedAt");
        assert_eq!(state.sort, SortSpec::asc("updatedAt"));
    }

    #[test]
    fn clear_link_reproduces_the_cleared_state() {
        let busy = ListState::from_params(&params(
            "q=bob&status=inactive&role=r1&sort=email&dir=desc&page=3",
        ));

        let query = ListState::cleared().to_query();
        assert_eq!(query, "sort=&dir=asc");

        let cleared = ListState::from_params(&params(&query));
        assert_eq!(cleared, ListState::cleared());
        assert_ne!(cleared, busy);
        assert_eq!(cleared.search, "");
        assert_eq!(cleared.status, StatusFilter::All);
        assert_eq!(cleared.role, RoleFilter::All);
        assert_eq!(cleared.sort.field(), None);
        assert_eq!(cleared.sort.direction, SortDirection::Asc);
        assert_eq!(cleared.page, 1);
    }

    #[test]
    fn search_edits_keep_the_page() {
        // The filter form resubmits the current page beside the new term
        let state = ListState::from_params(&params("q=ann&sort=updatedAt&dir=desc&page=4"));
        assert_eq!(state.page, 4);
        assert_eq!(state.search, "ann");
    }

    #[test]
    fn garbage_page_reads_as_first() {
        assert_eq!(ListState::from_params(&params("page=abc")).page, 1);
        assert_eq!(ListState::from_params(&params("page=0")).page, 1);
    }

    #[test]
    fn query_reproduces_state() {
        let state = ListState::from_params(&params(
            "q=a+b&status=active&role=r9&sort=name&dir=desc&page=2",
        ));
        let again = ListState::from_params(&params(&state.to_query()));
        assert_eq!(again, state);

        let cleared = ListState::cleared().to_query();
        assert_eq!(cleared, "sort=&dir=asc");
    }
}
