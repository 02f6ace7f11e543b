//! The list pipeline shared by the users, roles and permissions screens.
//!
//! A screen fetches its whole collection once and then renders
//! `paginate(filter(sort(records)))`. The order of the three stages is fixed:
//! the filtered rows keep the relative order established by the sort.

mod filter;
mod page;
mod sort;
mod state;

pub use filter::{Activatable, Predicate, RoleFilter, RoleHolder, SearchFilter, StatusFilter};
pub use page::{Page, Paging};
pub use sort::{SortDirection, SortSpec, SortValue};
pub use state::{ListParams, ListState};

use std::cmp::Reverse;

/// Sort key that falls back to `createdAt` when a record was never updated.
pub const UPDATED_AT: &str = "updatedAt";

/// A record the pipeline can sort and search.
pub trait Listable {
    /// Key for a sortable column, including derived columns such as a user's
    /// display name. `None` sorts as the empty string.
    fn sort_value(&self, field: &str) -> Option<SortValue>;

    /// Text fields the free-text search looks at.
    fn search_fields(&self) -> Vec<&str>;

    fn created_at(&self) -> Option<&str>;

    fn updated_at(&self) -> Option<&str>;
}

fn sort_key<T: Listable>(record: &T, field: &str) -> SortValue {
    if field == UPDATED_AT {
        let stamp = record
            .updated_at()
            .filter(|s| !s.is_empty())
            .or_else(|| record.created_at())
            .unwrap_or_default();
        return SortValue::Text(stamp.to_string());
    }

    record.sort_value(field).unwrap_or_default()
}

/// Sort, then filter, then slice out one page.
pub fn run<'a, T: Listable>(
    records: &'a [T],
    sort: &SortSpec,
    predicates: &[&dyn Predicate<T>],
    paging: Paging,
) -> Page<'a, T> {
    let mut rows: Vec<&T> = records.iter().collect();

    if let Some(field) = sort.field() {
        // Both sorts are stable, so equal keys keep their fetched order.
        match sort.direction {
            SortDirection::Asc => rows.sort_by_cached_key(|r| sort_key(*r, field)),
            SortDirection::Desc => rows.sort_by_cached_key(|r| Reverse(sort_key(*r, field))),
        }
    }

    rows.retain(|record| predicates.iter().all(|p| p.matches(record)));

    Page::slice(rows, records.len(), paging)
}
