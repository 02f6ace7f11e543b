use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use tower_sessions::Session;
use validator::Validate;

use super::view::{
    action_href, flash_redirect, load_snapshot, missing_fields_alert, modal_href, record_path,
    refetch, render, screen_href, CarriedState, Column, Layout, Pager, ScreenQuery,
};
use crate::error::ConsoleError;
use crate::listing::{self, ListParams, ListState, Predicate, SearchFilter};
use crate::models::forms::missing_fields;
use crate::models::{Permission, PermissionForm};
use crate::ui::alert::take_flash;
use crate::ui::format::{timestamp, DateStyle};
use crate::ui::snapshot::PERMISSIONS;
use crate::ui::{Alert, ModalStack, Msg};
use crate::AppState;

const BASE: &str = "/permissions";

pub struct PermissionRow {
    pub code: String,
    pub name: String,
    pub description: String,
    pub module: String,
    pub updated: String,
    pub edit_href: String,
    pub delete_href: String,
}

impl PermissionRow {
    fn new(permission: &Permission, state: &ListState, dates: DateStyle) -> Self {
        let changed = permission
            .updated_at
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(permission.created_at.as_deref());

        Self {
            code: permission.code.clone(),
            name: permission.name.clone(),
            description: permission.description.clone().unwrap_or_default(),
            module: permission.module.clone().unwrap_or_default(),
            updated: timestamp(changed, dates),
            edit_href: modal_href(BASE, state, "edit", Some(permission.id.as_str())),
            delete_href: modal_href(BASE, state, "delete", Some(permission.id.as_str())),
        }
    }
}

pub struct PermissionFormDialog {
    pub editing: bool,
    pub action: String,
    pub close_href: String,
    pub code: String,
    pub name: String,
    pub description: String,
    pub module: String,
}

impl PermissionFormDialog {
    fn new(id: Option<&str>, form: &PermissionForm, state: &ListState) -> Self {
        let action = match id {
            Some(id) => action_href(&record_path(BASE, id, "update"), state),
            None => action_href(BASE, state),
        };

        Self {
            editing: id.is_some(),
            action,
            close_href: screen_href(BASE, state),
            code: form.code.clone(),
            name: form.name.clone(),
            description: form.description.clone(),
            module: form.module.clone(),
        }
    }
}

impl From<&Permission> for PermissionForm {
    fn from(permission: &Permission) -> Self {
        Self {
            code: permission.code.clone(),
            name: permission.name.clone(),
            description: permission.description.clone().unwrap_or_default(),
            module: permission.module.clone().unwrap_or_default(),
        }
    }
}

pub struct DeletePermissionDialog {
    pub action: String,
    pub close_href: String,
    pub name: String,
}

impl DeletePermissionDialog {
    fn new(permission: &Permission, state: &ListState) -> Self {
        Self {
            action: action_href(&record_path(BASE, &permission.id, "delete"), state),
            close_href: screen_href(BASE, state),
            name: permission.name.clone(),
        }
    }
}

enum Dialog {
    Form(PermissionFormDialog),
    Delete(DeletePermissionDialog),
}

#[derive(Template)]
#[template(path = "permissions/list.html")]
pub struct PermissionsTemplate {
    layout: Layout,
    search: String,
    carried: CarriedState,
    clear_href: String,
    add_href: String,
    columns: Vec<Column>,
    rows: Vec<PermissionRow>,
    matched: usize,
    pager: Pager,
    form: Option<PermissionFormDialog>,
    delete: Option<DeletePermissionDialog>,
}

fn list_screen(
    app: &AppState,
    state: ListState,
    permissions: &[Permission],
    dialog: Option<Dialog>,
    alerts: Vec<Alert>,
) -> Result<Response, ConsoleError> {
    let locale = app.console.locale;
    let dates = app.console.date_style();

    let stack = ModalStack::default();
    let _token = dialog.as_ref().map(|_| stack.acquire());

    let search = SearchFilter::new(&state.search);
    let predicates: [&dyn Predicate<Permission>; 1] = [&search];
    let page = listing::run(
        permissions,
        &state.sort,
        &predicates,
        state.paging(app.console.items_per_page),
    );

    let (form, delete) = match dialog {
        Some(Dialog::Form(d)) => (Some(d), None),
        Some(Dialog::Delete(d)) => (None, Some(d)),
        None => (None, None),
    };

    let template = PermissionsTemplate {
        layout: Layout::new("Permissions Management", "permissions", locale)
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
            Column::sortable(BASE, &state, "module", "Module"),
            Column::sortable(BASE, &state, "updatedAt", "Updated"),
            Column::plain("Actions"),
        ],
        rows: page
            .rows
            .iter()
            .map(|p| PermissionRow::new(p, &state, dates))
            .collect(),
        matched: page.filtered,
        pager: Pager::new(BASE, &state, &page),
        form,
        delete,
    };

    Ok(render(&template)?.into_response())
}

fn list_alert(app: &AppState, alert: Alert) -> Alert {
    alert.dismiss_after(app.console.alert_dismiss_ms)
}

#[tracing::instrument(skip(app, session, query), fields(modal = ?query.modal))]
pub async fn list_page(
    State(app): State<AppState>,
    session: Session,
    Query(query): Query<ScreenQuery>,
) -> Result<Response, ConsoleError> {
    let locale = app.console.locale;
    let state = query.state();

    let permissions = load_snapshot(
        &session,
        &PERMISSIONS,
        query.is_mount(),
        app.api.list_permissions(),
    )
    .await?;

    let mut alerts = take_flash(&session).await?;
    if let Some(e) = &permissions.error {
        alerts.push(list_alert(&app, e.alert(locale, Msg::LoadFailed)));
    }

    let find = |id: &str| permissions.records.iter().find(|p| p.id == id);

    let dialog = match (query.modal(), query.record_id()) {
        (Some("add"), _) => Some(Dialog::Form(PermissionFormDialog::new(
            None,
            &PermissionForm::default(),
            &state,
        ))),
        (Some("edit"), Some(id)) => find(id).map(|p| {
            Dialog::Form(PermissionFormDialog::new(
                Some(id),
                &PermissionForm::from(p),
                &state,
            ))
        }),
        (Some("delete"), Some(id)) => {
            find(id).map(|p| Dialog::Delete(DeletePermissionDialog::new(p, &state)))
        }
        _ => None,
    };

    list_screen(&app, state, &permissions.records, dialog, alerts)
}

async fn current_permissions(
    app: &AppState,
    session: &Session,
) -> Result<Vec<Permission>, ConsoleError> {
    let loaded = load_snapshot(session, &PERMISSIONS, false, app.api.list_permissions()).await?;
    Ok(loaded.records)
}

async fn done(
    app: &AppState,
    session: &Session,
    state: &ListState,
    alert: Alert,
) -> Result<Response, ConsoleError> {
    refetch(session, &PERMISSIONS, app.api.list_permissions()).await?;
    let back = screen_href(BASE, state);
    Ok(flash_redirect(session, vec![list_alert(app, alert)], &back)
        .await?
        .into_response())
}

async fn save(
    app: &AppState,
    session: &Session,
    id: Option<&str>,
    params: &ListParams,
    form: PermissionForm,
) -> Result<Response, ConsoleError> {
    let locale = app.console.locale;
    let state = ListState::from_params(params);

    let failure = match form.validate() {
        Err(errors) => missing_fields_alert(locale, &missing_fields(&errors)),
        Ok(()) => {
            let outcome = match id {
                Some(id) => app
                    .api
                    .update_permission(id, &form)
                    .await
                    .map(|reply| (reply, Msg::UpdatePermissionOk)),
                None => app
                    .api
                    .create_permission(&form)
                    .await
                    .map(|reply| (reply, Msg::CreatePermissionOk)),
            };

            match outcome {
                Ok((reply, fallback)) => {
                    tracing::info!(code = %form.code, "Permission saved");
                    let alert = Alert::done(locale, reply.message.as_deref(), fallback);
                    return done(app, session, &state, alert).await;
                }
                Err(e) => e.alert(locale, Msg::PermissionActionFailed),
            }
        }
    };

    let records = current_permissions(app, session).await?;
    let dialog = PermissionFormDialog::new(id, &form, &state);
    list_screen(
        app,
        state,
        &records,
        Some(Dialog::Form(dialog)),
        vec![list_alert(app, failure)],
    )
}

#[tracing::instrument(skip(app, session, params, form), fields(code = %form.code))]
pub async fn create(
    State(app): State<AppState>,
    session: Session,
    Query(params): Query<ListParams>,
    Form(form): Form<PermissionForm>,
) -> Result<Response, ConsoleError> {
    save(&app, &session, None, &params, form).await
}

#[tracing::instrument(skip(app, session, params, form))]
pub async fn update(
    State(app): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
    Form(form): Form<PermissionForm>,
) -> Result<Response, ConsoleError> {
    save(&app, &session, Some(&id), &params, form).await
}

#[tracing::instrument(skip(app, session, params))]
pub async fn delete(
    State(app): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Response, ConsoleError> {
    let locale = app.console.locale;
    let state = ListState::from_params(&params);

    match app.api.delete_permission(&id).await {
        Ok(reply) => {
            tracing::info!(permission_id = %id, "Permission deleted");
            let alert = Alert::done(locale, reply.message.as_deref(), Msg::DeletePermissionOk);
            done(&app, &session, &state, alert).await
        }
        Err(e) => {
            let alert = e.alert(locale, Msg::DeletePermissionFailed);
            let records = current_permissions(&app, &session).await?;
            // Keep the confirmation open when the record is still listed
            let dialog = records
                .iter()
                .find(|p| p.id == id)
                .map(|p| Dialog::Delete(DeletePermissionDialog::new(p, &state)));
            list_screen(&app, state, &records, dialog, vec![list_alert(&app, alert)])
        }
    }
}
