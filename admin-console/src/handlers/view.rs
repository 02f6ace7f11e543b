//! Pieces shared by the three list screens: query parsing, the layout every
//! page renders into, sortable column headers, the pager, and the session
//! snapshot each screen works from.

use std::future::Future;

use askama::Template;
use axum::response::{Html, Redirect};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::{ApiError, ConsoleError};
use crate::listing::{ListParams, ListState, Page, SortDirection};
use crate::ui::alert::push_flash;
use crate::ui::snapshot::Snapshot;
use crate::ui::{Alert, ChromeState, Locale};

/// Query string of a list screen: the list state plus the open dialog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScreenQuery {
    #[serde(flatten)]
    pub list: ListParams,
    pub modal: Option<String>,
    pub id: Option<String>,
    pub refresh: Option<String>,
}

impl ScreenQuery {
    /// Links inside a screen always carry `sort`, so its absence marks a
    /// fresh visit. Fresh visits and `refresh` reload the collection.
    pub fn is_mount(&self) -> bool {
        self.list.sort.is_none() || self.refresh.is_some()
    }

    pub fn state(&self) -> ListState {
        ListState::from_params(&self.list)
    }

    pub fn modal(&self) -> Option<&str> {
        self.modal.as_deref().filter(|m| !m.is_empty())
    }

    pub fn record_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Data every page hands to `base.html`.
pub struct Layout {
    pub title: String,
    pub section: &'static str,
    pub lang: &'static str,
    pub alerts: Vec<Alert>,
    pub chrome: ChromeState,
}

impl Layout {
    pub fn new(title: impl Into<String>, section: &'static str, locale: Locale) -> Self {
        Self {
            title: title.into(),
            section,
            lang: locale.code(),
            alerts: Vec::new(),
            chrome: ChromeState::default(),
        }
    }

    pub fn with_alerts(mut self, alerts: Vec<Alert>) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn with_chrome(mut self, chrome: ChromeState) -> Self {
        self.chrome = chrome;
        self
    }
}

pub fn render<T: Template>(template: &T) -> Result<Html<String>, ConsoleError> {
    Ok(Html(template.render()?))
}

pub fn screen_href(base: &str, state: &ListState) -> String {
    format!("{base}?{}", state.to_query())
}

/// Link that opens a dialog on top of the current list state.
pub fn modal_href(base: &str, state: &ListState, modal: &str, id: Option<&str>) -> String {
    let mut pairs = vec![("modal", modal)];
    if let Some(id) = id {
        pairs.push(("id", id));
    }
    let dialog = serde_urlencoded::to_string(&pairs).unwrap_or_default();
    format!("{base}?{}&{dialog}", state.to_query())
}

/// `/users/<id>/<action>` with the id percent-encoded.
pub fn record_path(collection: &str, id: &str, action: &str) -> String {
    format!("{collection}/{}/{action}", urlencoding::encode(id))
}

/// Form target that brings the list state back with the redirect.
pub fn action_href(path: &str, state: &ListState) -> String {
    format!("{path}?{}", state.to_query())
}

pub async fn flash_redirect(
    session: &Session,
    alerts: Vec<Alert>,
    to: &str,
) -> Result<Redirect, ConsoleError> {
    for alert in alerts {
        push_flash(session, alert).await?;
    }
    Ok(Redirect::to(to))
}

/// Header cell of a table column.
pub struct Column {
    pub label: &'static str,
    pub sortable: bool,
    pub href: String,
    pub marker: &'static str,
}

impl Column {
    pub fn sortable(base: &str, state: &ListState, field: &str, label: &'static str) -> Self {
        let marker = match (state.sort.is_sorted_by(field), state.sort.direction) {
            (true, SortDirection::Asc) => "▲",
            (true, SortDirection::Desc) => "▼",
            (false, _) => "↕",
        };

        Self {
            label,
            sortable: true,
            href: screen_href(base, &state.toggle_sort(field)),
            marker,
        }
    }

    pub fn plain(label: &'static str) -> Self {
        Self {
            label,
            sortable: false,
            href: String::new(),
            marker: "",
        }
    }
}

pub struct PageLink {
    pub number: usize,
    pub href: String,
    pub current: bool,
}

/// "Showing X to Y of Z results" plus page links. Only shown when the
/// filtered rows do not fit on one page.
pub struct Pager {
    pub visible: bool,
    pub first: usize,
    pub last: usize,
    pub filtered: usize,
    pub has_previous: bool,
    pub previous_href: String,
    pub has_next: bool,
    pub next_href: String,
    pub pages: Vec<PageLink>,
}

impl Pager {
    pub fn new<T>(base: &str, state: &ListState, page: &Page<'_, T>) -> Self {
        let href = |number: usize| screen_href(base, &state.with_page(number));

        Self {
            visible: page.filtered > page.per_page,
            first: page.first_index(),
            last: page.last_index(),
            filtered: page.filtered,
            has_previous: page.has_previous(),
            previous_href: href(page.page.saturating_sub(1)),
            has_next: page.has_next(),
            next_href: href(page.page + 1),
            pages: (1..=page.total_pages)
                .map(|number| PageLink {
                    number,
                    href: href(number),
                    current: number == page.page,
                })
                .collect(),
        }
    }
}

/// Hidden inputs that keep sort and page when the filter form is submitted.
pub struct CarriedState {
    pub sort: String,
    pub dir: &'static str,
    pub page: usize,
}

impl CarriedState {
    pub fn from_state(state: &ListState) -> Self {
        Self {
            sort: state.sort.field().unwrap_or_default().to_string(),
            dir: state.sort.direction.as_str(),
            page: state.page,
        }
    }
}

/// One `<option>` of a select or one checkbox of a group.
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl Choice {
    pub fn new(value: &str, label: &str, selected: bool) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            selected,
        }
    }
}

pub struct Loaded<T> {
    pub records: Vec<T>,
    pub error: Option<ApiError>,
}

/// Records for a list screen. On mount, or when the session has no copy,
/// `fetch` runs and its result replaces the copy; otherwise the copy is used
/// as is. A failed fetch falls back to whatever copy exists.
pub async fn load_snapshot<T, F>(
    session: &Session,
    snapshot: &Snapshot<T>,
    mount: bool,
    fetch: F,
) -> Result<Loaded<T>, ConsoleError>
where
    T: Serialize + DeserializeOwned,
    F: Future<Output = Result<Vec<T>, ApiError>>,
{
    if !mount {
        if let Some(records) = snapshot.load(session).await? {
            return Ok(Loaded {
                records,
                error: None,
            });
        }
    }

    match fetch.await {
        Ok(records) => {
            snapshot.store(session, &records).await?;
            Ok(Loaded {
                records,
                error: None,
            })
        }
        Err(error) => Ok(Loaded {
            records: snapshot.load(session).await?.unwrap_or_default(),
            error: Some(error),
        }),
    }
}

/// Replace the session copy after a mutation. A failed refetch leaves the
/// old copy in place.
pub async fn refetch<T, F>(session: &Session, snapshot: &Snapshot<T>, fetch: F) -> Result<(), ConsoleError>
where
    T: Serialize + DeserializeOwned,
    F: Future<Output = Result<Vec<T>, ApiError>>,
{
    match fetch.await {
        Ok(records) => snapshot.store(session, &records).await?,
        Err(e) => tracing::warn!(error = %e, "List refetch after mutation failed"),
    }
    Ok(())
}

/// Banner for a failed required-field check, naming the empty fields.
pub fn missing_fields_alert(locale: Locale, fields: &str) -> Alert {
    Alert::error(
        locale.text(crate::ui::Msg::ErrorTitle),
        format!("{}: {fields}", locale.text(crate::ui::Msg::MissingFields)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(raw: &str) -> ScreenQuery {
        serde_urlencoded::from_str(raw).unwrap()
    }

    #[test]
    fn bare_visit_and_refresh_are_mounts() {
        assert!(query("").is_mount());
        assert!(query("sort=email&dir=asc&refresh=1").is_mount());
        assert!(!query("sort=&dir=asc&page=2").is_mount());
    }

    #[test]
    fn dialog_params_sit_beside_list_state() {
        let q = query("q=ann&sort=email&dir=desc&modal=edit&id=7");
        assert_eq!(q.modal(), Some("edit"));
        assert_eq!(q.record_id(), Some("7"));
        assert_eq!(q.state().search, "ann");

        assert_eq!(query("modal=&id=").modal(), None);
    }

    #[test]
    fn modal_links_keep_the_list_state() {
        let state = ListState::mounted().with_page(2);
        assert_eq!(
            modal_href("/users", &state, "delete", Some("a b")),
            "/users?sort=updatedAt&dir=desc&page=2&modal=delete&id=a+b"
        );
    }

    #[test]
    fn record_paths_encode_ids() {
        assert_eq!(
            record_path("/users", "42", "toggle-status"),
            "/users/42/toggle-status"
        );
        assert_eq!(record_path("/users", "a/b", "delete"), "/users/a%2Fb/delete");
    }

    #[test]
    fn active_column_shows_its_direction() {
        let state = ListState::mounted();
        let updated = Column::sortable("/roles", &state, "updatedAt", "Updated");
        assert_eq!(updated.marker, "▼");
        assert_eq!(updated.href, "/roles?sort=updatedAt&dir=asc");

        let code = Column::sortable("/roles", &state, "code", "Code");
        assert_eq!(code.marker, "↕");
        assert_eq!(code.href, "/roles?sort=code&dir=asc");
    }
}
