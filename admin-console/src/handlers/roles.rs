use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::Form;
use tower_sessions::Session;
use validator::Validate;

use super::view::{
    action_href, flash_redirect, load_snapshot, missing_fields_alert, modal_href, record_path,
    refetch, render, screen_href, CarriedState, Choice, Column, Layout, Pager, ScreenQuery,
};
use crate::error::ConsoleError;
use crate::listing::{self, ListParams, ListState, Predicate, SearchFilter};
use crate::models::forms::missing_fields;
use crate::models::{Permission, Role, RoleForm};
use crate::ui::alert::take_flash;
use crate::ui::format::{timestamp, DateStyle};
use crate::ui::snapshot::ROLES;
use crate::ui::{Alert, ModalStack, Msg};
use crate::AppState;

const BASE: &str = "/roles";

pub struct RoleRow {
    pub code: String,
    pub name: String,
    pub description: String,
    pub is_system: bool,
    pub updated: String,
    pub permissions_href: String,
    pub edit_href: String,
}

impl RoleRow {
    fn new(role: &Role, state: &ListState, dates: DateStyle) -> Self {
        let changed = role
            .updated_at
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(role.created_at.as_deref());

        Self {
            code: role.code.clone(),
            name: role.name.clone(),
            description: role.description.clone().unwrap_or_default(),
            is_system: role.is_system,
            updated: timestamp(changed, dates),
            permissions_href: modal_href(
                BASE,
                state,
                "permissions",
                Some(role.id.as_str()),
            ),
            edit_href: modal_href(BASE, state, "edit", Some(role.id.as_str())),
        }
    }
}

pub struct GrantedPermission {
    pub code: String,
    pub name: String,
    pub description: String,
}

/// Read-only list of what a role grants.
pub struct PermissionsDialog {
    pub heading: String,
    pub close_href: String,
    pub permissions: Vec<GrantedPermission>,
}

/// Add and edit share one form; `editing` picks the wording.
pub struct RoleFormDialog {
    pub editing: bool,
    pub action: String,
    pub close_href: String,
    pub code: String,
    pub name: String,
    pub description: String,
    pub permissions: Vec<Choice>,
}

impl RoleFormDialog {
    fn add(form: &RoleForm, all: &[Permission], state: &ListState) -> Self {
        Self::build(false, action_href(BASE, state), form, all, state)
    }

    fn edit(id: &str, form: &RoleForm, all: &[Permission], state: &ListState) -> Self {
        let action = action_href(&record_path(BASE, id, "update"), state);
        Self::build(true, action, form, all, state)
    }

    fn build(
        editing: bool,
        action: String,
        form: &RoleForm,
        all: &[Permission],
        state: &ListState,
    ) -> Self {
        Self {
            editing,
            action,
            close_href: screen_href(BASE, state),
            code: form.code.clone(),
            name: form.name.clone(),
            description: form.description.clone(),
            permissions: all
                .iter()
                .map(|p| {
                    let label = format!("{} ({})", p.name, p.code);
                    let granted = form.permission_ids.iter().any(|id| p.id == *id);
                    Choice::new(&p.id, &label, granted)
                })
                .collect(),
        }
    }
}

enum Dialog {
    Permissions(PermissionsDialog),
    Form(RoleFormDialog),
}

#[derive(Template)]
#[template(path = "roles/list.html")]
pub struct RolesTemplate {
    layout: Layout,
    search: String,
    carried: CarriedState,
    clear_href: String,
    add_href: String,
    columns: Vec<Column>,
    rows: Vec<RoleRow>,
    matched: usize,
    pager: Pager,
    permissions: Option<PermissionsDialog>,
    form: Option<RoleFormDialog>,
}

fn list_screen(
    app: &AppState,
    state: ListState,
    roles: &[Role],
    dialog: Option<Dialog>,
    alerts: Vec<Alert>,
) -> Result<Response, ConsoleError> {
    let locale = app.console.locale;
    let dates = app.console.date_style();

    let stack = ModalStack::default();
    let _token = dialog.as_ref().map(|_| stack.acquire());

    let search = SearchFilter::new(&state.search);
    let predicates: [&dyn Predicate<Role>; 1] = [&search];
    let page = listing::run(
        roles,
        &state.sort,
        &predicates,
        state.paging(app.console.items_per_page),
    );

    let (permissions, form) = match dialog {
        Some(Dialog::Permissions(d)) => (Some(d), None),
        Some(Dialog::Form(d)) => (None, Some(d)),
        None => (None, None),
    };

    let template = RolesTemplate {
        layout: Layout::new("Roles Management", "roles", locale)
            .with_alerts(alerts)
            .with_chrome(stack.chrome()),
        search: state.search.clone(),
        carried: CarriedState::from_state(&state),
        clear_href: screen_href(BASE, &ListState::cleared()),
        add_href: modal_href(BASE, &state, "add", None),
        columns: vec![
            Column::sortable(BASE, &state, "code", "Code"),
            Column::sortable(BASE, &state, "name", "Name"),
            Column::plain("Description"),
            Column::sortable(BASE, &state, "isSystem", "System"),
            Column::sortable(BASE, &state, "updatedAt", "Updated"),
            Column::plain("Actions"),
        ],
        rows: page
            .rows
            .iter()
            .map(|role| RoleRow::new(role, &state, dates))
            .collect(),
        matched: page.filtered,
        pager: Pager::new(BASE, &state, &page),
        permissions,
        form,
    };

    Ok(render(&template)?.into_response())
}

fn list_alert(app: &AppState, alert: Alert) -> Alert {
    alert.dismiss_after(app.console.alert_dismiss_ms)
}

async fn all_permissions(app: &AppState) -> Vec<Permission> {
    app.api.list_permissions().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Permission list unavailable for the role form");
        Vec::new()
    })
}

#[tracing::instrument(skip(app, session, query), fields(modal = ?query.modal))]
pub async fn list_page(
    State(app): State<AppState>,
    session: Session,
    Query(query): Query<ScreenQuery>,
) -> Result<Response, ConsoleError> {
    let locale = app.console.locale;
    let state = query.state();

    let roles = load_snapshot(&session, &ROLES, query.is_mount(), app.api.list_roles()).await?;

    let mut alerts = take_flash(&session).await?;
    if let Some(e) = &roles.error {
        alerts.push(list_alert(&app, e.alert(locale, Msg::LoadFailed)));
    }

    let dialog = match (query.modal(), query.record_id()) {
        (Some("add"), _) => {
            let all = all_permissions(&app).await;
            Some(Dialog::Form(RoleFormDialog::add(
                &RoleForm::default(),
                &all,
                &state,
            )))
        }
        (Some("permissions"), Some(id)) => match app.api.get_role(id).await {
            Ok(detail) => {
                let name = detail
                    .role
                    .as_ref()
                    .map(|r| r.name.clone())
                    .or_else(|| {
                        roles
                            .records
                            .iter()
                            .find(|r| r.id == id)
                            .map(|r| r.name.clone())
                    })
                    .unwrap_or_default();

                Some(Dialog::Permissions(PermissionsDialog {
                    heading: format!("Permissions for {name}"),
                    close_href: screen_href(BASE, &state),
                    permissions: detail
                        .permissions
                        .iter()
                        .map(|p| GrantedPermission {
                            code: p.code.clone(),
                            name: p.name.clone(),
                            description: p.description.clone().unwrap_or_default(),
                        })
                        .collect(),
                }))
            }
            Err(e) => {
                alerts.push(list_alert(&app, e.alert(locale, Msg::LoadFailed)));
                None
            }
        },
        (Some("edit"), Some(id)) => {
            let (all, detail) = tokio::join!(all_permissions(&app), app.api.get_role(id));

            let (role, granted) = match detail {
                Ok(detail) => {
                    let granted = detail.permission_ids();
                    (detail.role, granted)
                }
                Err(e) => {
                    alerts.push(list_alert(&app, e.alert(locale, Msg::LoadFailed)));
                    (None, Vec::new())
                }
            };

            role.or_else(|| roles.records.iter().find(|r| r.id == id).cloned())
                .map(|role| {
                    let form = RoleForm {
                        code: role.code,
                        name: role.name,
                        description: role.description.unwrap_or_default(),
                        permission_ids: granted,
                    };
                    Dialog::Form(RoleFormDialog::edit(id, &form, &all, &state))
                })
        }
        _ => None,
    };

    list_screen(&app, state, &roles.records, dialog, alerts)
}

/// Re-render the list with the submitted form still open.
async fn reopen_form(
    app: &AppState,
    session: &Session,
    state: ListState,
    id: Option<&str>,
    form: &RoleForm,
    alert: Alert,
) -> Result<Response, ConsoleError> {
    let (roles, all) = tokio::join!(
        load_snapshot(session, &ROLES, false, app.api.list_roles()),
        all_permissions(app),
    );
    let roles = roles?;

    let dialog = match id {
        Some(id) => RoleFormDialog::edit(id, form, &all, &state),
        None => RoleFormDialog::add(form, &all, &state),
    };

    list_screen(
        app,
        state,
        &roles.records,
        Some(Dialog::Form(dialog)),
        vec![list_alert(app, alert)],
    )
}

#[tracing::instrument(skip(app, session, params, form), fields(code = %form.code))]
pub async fn create(
    State(app): State<AppState>,
    session: Session,
    Query(params): Query<ListParams>,
    Form(form): Form<RoleForm>,
) -> Result<Response, ConsoleError> {
    let locale = app.console.locale;
    let state = ListState::from_params(&params);

    if let Err(errors) = form.validate() {
        let alert = missing_fields_alert(locale, &missing_fields(&errors));
        return reopen_form(&app, &session, state, None, &form, alert).await;
    }

    match app.api.create_role(&form.clone().into_new_role()).await {
        Ok(reply) => {
            tracing::info!(code = %form.code, "Role created");
            refetch(&session, &ROLES, app.api.list_roles()).await?;
            let alert = Alert::done(locale, reply.message.as_deref(), Msg::CreateRoleOk);
            let back = screen_href(BASE, &state);
            Ok(flash_redirect(&session, vec![list_alert(&app, alert)], &back)
                .await?
                .into_response())
        }
        Err(e) => {
            let alert = e.alert(locale, Msg::RoleActionFailed);
            reopen_form(&app, &session, state, None, &form, alert).await
        }
    }
}

/// Saves the fields first, then replaces the permission set.
#[tracing::instrument(skip(app, session, params, form))]
pub async fn update(
    State(app): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
    Form(form): Form<RoleForm>,
) -> Result<Response, ConsoleError> {
    let locale = app.console.locale;
    let state = ListState::from_params(&params);

    if let Err(errors) = form.validate() {
        let alert = missing_fields_alert(locale, &missing_fields(&errors));
        return reopen_form(&app, &session, state, Some(&id), &form, alert).await;
    }

    let (fields, permissions) = form.clone().split();

    let reply = match app.api.update_role(&id, &fields).await {
        Ok(reply) => reply,
        Err(e) => {
            let alert = e.alert(locale, Msg::RoleActionFailed);
            return reopen_form(&app, &session, state, Some(&id), &form, alert).await;
        }
    };

    let mut alerts = Vec::with_capacity(2);
    if let Err(e) = app.api.replace_role_permissions(&id, &permissions).await {
        tracing::warn!(role_id = %id, error = %e, "Role saved but its permissions were not");
        alerts.push(list_alert(&app, e.alert(locale, Msg::RoleActionFailed)));
    }

    refetch(&session, &ROLES, app.api.list_roles()).await?;
    alerts.push(list_alert(
        &app,
        Alert::done(locale, reply.message.as_deref(), Msg::UpdateRoleOk),
    ));

    let back = screen_href(BASE, &state);
    Ok(flash_redirect(&session, alerts, &back).await?.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::Locale;
    use serde_json::json;

    fn permissions() -> Vec<Permission> {
        serde_json::from_value(json!([
            {"id": "p1", "code": "USER_READ", "name": "Read users", "module": "users"},
            {"id": "p2", "code": "USER_WRITE", "name": "Write users"}
        ]))
        .unwrap()
    }

    #[test]
    fn rows_fall_back_to_created_at() {
        let role: Role = serde_json::from_value(json!({
            "id": "r1", "code": "OPS", "name": "Operations", "isSystem": true,
            "createdAt": "2024-01-05T14:30:00Z", "updatedAt": null
        }))
        .unwrap();

        let row = RoleRow::new(&role, &ListState::mounted(), Locale::Th.into());
        assert_eq!(row.updated, "5 ม.ค. 2567 14:30");
        assert_eq!(row.description, "");
        assert!(row.is_system);
        assert!(row.permissions_href.ends_with("&modal=permissions&id=r1"));
    }

    #[test]
    fn edit_form_ticks_granted_permissions() {
        let form = RoleForm {
            code: "OPS".into(),
            name: "Operations".into(),
            description: String::new(),
            permission_ids: vec!["p2".into()],
        };

        let dialog = RoleFormDialog::edit("r1", &form, &permissions(), &ListState::mounted());
        assert!(dialog.editing);
        assert_eq!(dialog.action, "/roles/r1/update?sort=updatedAt&dir=desc");
        assert_eq!(dialog.permissions[0].label, "Read users (USER_READ)");
        assert!(!dialog.permissions[0].selected);
        assert!(dialog.permissions[1].selected);
    }

    #[test]
    fn add_form_posts_to_the_collection() {
        let dialog = RoleFormDialog::add(&RoleForm::default(), &permissions(), &ListState::cleared());
        assert!(!dialog.editing);
        assert_eq!(dialog.action, "/roles?sort=&dir=asc");
        assert!(dialog.permissions.iter().all(|c| !c.selected));
    }
}
