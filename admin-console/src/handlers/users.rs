use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use axum_extra::extract::Form as RepeatedForm;
use tower_sessions::Session;
use validator::Validate;

use super::view::{
    action_href, flash_redirect, load_snapshot, missing_fields_alert, modal_href, record_path,
    render, screen_href, CarriedState, Choice, Column, Layout, Pager, ScreenQuery,
};
use crate::error::{ApiError, ConsoleError};
use crate::listing::{self, ListParams, ListState, Predicate, SearchFilter};
use crate::models::forms::{missing_fields, RegisterUser, UserUpdate};
use crate::models::{NewUserForm, Role, User, UserModalForm, UserUpdateForm};
use crate::ui::alert::take_flash;
use crate::ui::format::{timestamp, DateStyle};
use crate::ui::snapshot::{self, USERS, USER_ROLES};
use crate::ui::{Alert, Locale, ModalStack, Msg};
use crate::AppState;

const BASE: &str = "/users";

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub name: String,
    pub email: String,
    pub role_name: String,
    pub role_is_admin: bool,
    pub is_active: bool,
    pub created: String,
    pub updated: String,
    pub toggle_action: String,
    pub edit_href: String,
    pub delete_href: String,
    pub page_href: String,
}

impl UserRow {
    fn new(user: &User, state: &ListState, dates: DateStyle) -> Self {
        let role = user.first_role();

        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            name: user.full_name().unwrap_or_else(|| "-".to_string()),
            email: user.email.clone(),
            role_name: role
                .map(|r| r.name.clone())
                .unwrap_or_else(|| "No Role".to_string()),
            role_is_admin: role.is_some_and(|r| r.code == "ADMIN"),
            is_active: user.is_active,
            created: timestamp(user.created_at.as_deref(), dates),
            updated: timestamp(user.updated_at.as_deref(), dates),
            toggle_action: action_href(&record_path(BASE, &user.id, "toggle-status"), state),
            edit_href: modal_href(BASE, state, "edit", Some(user.id.as_str())),
            delete_href: modal_href(BASE, state, "delete", Some(user.id.as_str())),
            page_href: record_path(BASE, &user.id, "edit"),
        }
    }
}

/// Edit dialog on the list screen: a single role select.
pub struct EditUserDialog {
    pub action: String,
    pub close_href: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<Choice>,
    pub current_role: String,
}

impl EditUserDialog {
    fn new(user: &User, roles: &[Role], state: &ListState) -> Self {
        let selected = user.first_role().map(|r| r.id.as_str()).unwrap_or_default();

        Self {
            action: action_href(&record_path(BASE, &user.id, "update"), state),
            close_href: screen_href(BASE, state),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone().unwrap_or_default(),
            last_name: user.last_name.clone().unwrap_or_default(),
            roles: roles
                .iter()
                .map(|r| Choice::new(&r.id, &r.name, r.id == selected))
                .collect(),
            current_role: roles
                .iter()
                .find(|r| r.id == selected)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| "No role selected".to_string()),
        }
    }
}

pub struct DeleteUserDialog {
    pub action: String,
    pub close_href: String,
    pub username: String,
}

enum Dialog {
    Edit(EditUserDialog),
    Delete(DeleteUserDialog),
}

#[derive(Template)]
#[template(path = "users/list.html")]
pub struct UsersTemplate {
    layout: Layout,
    search: String,
    status: &'static str,
    role: String,
    carried: CarriedState,
    clear_href: String,
    role_filter: Vec<Choice>,
    columns: Vec<Column>,
    rows: Vec<UserRow>,
    matched: usize,
    pager: Pager,
    edit: Option<EditUserDialog>,
    delete: Option<DeleteUserDialog>,
}

fn list_screen(
    app: &AppState,
    state: ListState,
    users: &[User],
    roles: &[Role],
    dialog: Option<Dialog>,
    alerts: Vec<Alert>,
) -> Result<Response, ConsoleError> {
    let locale = app.console.locale;
    let dates = app.console.date_style();

    // Every open dialog holds a token for as long as the page is rendered
    let stack = ModalStack::default();
    let _token = dialog.as_ref().map(|_| stack.acquire());

    let search = SearchFilter::new(&state.search);
    let predicates: [&dyn Predicate<User>; 3] = [&search, &state.status, &state.role];
    let page = listing::run(
        users,
        &state.sort,
        &predicates,
        state.paging(app.console.items_per_page),
    );

    let role_filter = roles
        .iter()
        .map(|r| Choice::new(&r.id, &r.name, r.id == state.role.as_str()))
        .collect();

    let columns = vec![
        Column::sortable(BASE, &state, "id", "ID"),
        Column::sortable(BASE, &state, "username", "Username"),
        Column::sortable(BASE, &state, "name", "Name"),
        Column::sortable(BASE, &state, "email", "Email"),
        Column::sortable(BASE, &state, "role", "Role"),
        Column::sortable(BASE, &state, "isActive", "Status"),
        Column::sortable(BASE, &state, "createdAt", "Created"),
        Column::sortable(BASE, &state, "updatedAt", "Updated"),
        Column::plain("Actions"),
    ];

    let (edit, delete) = match dialog {
        Some(Dialog::Edit(d)) => (Some(d), None),
        Some(Dialog::Delete(d)) => (None, Some(d)),
        None => (None, None),
    };

    let template = UsersTemplate {
        layout: Layout::new("Users Management", "users", locale)
            .with_alerts(alerts)
            .with_chrome(stack.chrome()),
        search: state.search.clone(),
        status: state.status.as_str(),
        role: state.role.as_str().to_string(),
        carried: CarriedState::from_state(&state),
        clear_href: screen_href(BASE, &ListState::cleared()),
        role_filter,
        columns,
        rows: page
            .rows
            .iter()
            .map(|user| UserRow::new(user, &state, dates))
            .collect(),
        matched: page.filtered,
        pager: Pager::new(BASE, &state, &page),
        edit,
        delete,
    };

    Ok(render(&template)?.into_response())
}

fn list_alert(app: &AppState, alert: Alert) -> Alert {
    alert.dismiss_after(app.console.alert_dismiss_ms)
}

fn page_alert(app: &AppState, alert: Alert) -> Alert {
    alert.dismiss_after(app.console.form_alert_dismiss_ms)
}

#[tracing::instrument(skip(app, session, query), fields(modal = ?query.modal))]
pub async fn list_page(
    State(app): State<AppState>,
    session: Session,
    Query(query): Query<ScreenQuery>,
) -> Result<Response, ConsoleError> {
    let locale = app.console.locale;
    let state = query.state();
    let mount = query.is_mount();

    let (users, roles) = tokio::join!(
        load_snapshot(&session, &USERS, mount, app.api.list_users()),
        load_snapshot(&session, &USER_ROLES, mount, app.api.list_roles()),
    );
    let (users, mut roles) = (users?, roles?);

    let mut alerts = take_flash(&session).await?;
    if let Some(e) = &users.error {
        alerts.push(list_alert(&app, e.alert(locale, Msg::LoadFailed)));
    }
    if let Some(e) = &roles.error {
        tracing::warn!(error = %e, "Role list unavailable for the users screen");
    }

    let dialog = match (query.modal(), query.record_id()) {
        (Some("edit"), Some(id)) => {
            let (user, fresh_roles) = tokio::join!(app.api.get_user(id), app.api.list_roles());

            match fresh_roles {
                Ok(fresh) => {
                    USER_ROLES.store(&session, &fresh).await?;
                    roles.records = fresh;
                }
                Err(e) => tracing::warn!(error = %e, "Using cached roles for the edit dialog"),
            }

            let user = match user {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(user_id = %id, error = %e, "Falling back to the listed user");
                    users.records.iter().find(|u| u.id == id).cloned()
                }
            };

            match user {
                Some(user) => Some(Dialog::Edit(EditUserDialog::new(
                    &user,
                    &roles.records,
                    &state,
                ))),
                None => {
                    alerts.push(list_alert(
                        &app,
                        Alert::error(locale.text(Msg::ErrorTitle), locale.text(Msg::LoadFailed)),
                    ));
                    None
                }
            }
        }
        (Some("delete"), Some(id)) => users.records.iter().find(|u| u.id == id).map(|user| {
            Dialog::Delete(DeleteUserDialog {
                action: action_href(&record_path(BASE, &user.id, "delete"), &state),
                close_href: screen_href(BASE, &state),
                username: user.username.clone(),
            })
        }),
        _ => None,
    };

    list_screen(&app, state, &users.records, &roles.records, dialog, alerts)
}

#[tracing::instrument(skip(app, session, params))]
pub async fn toggle_status(
    State(app): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Response, ConsoleError> {
    let locale = app.console.locale;

    let alert = match app.api.toggle_user_status(&id).await {
        Ok(reply) => {
            USERS
                .patch(&session, |users| {
                    snapshot::toggle_status(users, &id);
                })
                .await?;
            tracing::info!(user_id = %id, "User status toggled");
            Alert::done(locale, reply.message.as_deref(), Msg::ToggleStatusOk)
        }
        Err(e) => e.alert(locale, Msg::ToggleStatusFailed),
    };

    let back = screen_href(BASE, &ListState::from_params(&params));
    Ok(flash_redirect(&session, vec![list_alert(&app, alert)], &back)
        .await?
        .into_response())
}

#[tracing::instrument(skip(app, session, params))]
pub async fn delete(
    State(app): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Response, ConsoleError> {
    let locale = app.console.locale;

    let alert = match app.api.delete_user(&id).await {
        Ok(reply) => {
            USERS
                .patch(&session, |users| {
                    snapshot::remove(users, &id);
                })
                .await?;
            tracing::info!(user_id = %id, "User deleted");
            Alert::done(locale, reply.message.as_deref(), Msg::DeleteUserOk)
        }
        Err(e) => e.alert(locale, Msg::DeleteUserFailed),
    };

    let back = screen_href(BASE, &ListState::from_params(&params));
    Ok(flash_redirect(&session, vec![list_alert(&app, alert)], &back)
        .await?
        .into_response())
}

/// Submit of the edit dialog. The dialog closes whatever the outcome.
#[tracing::instrument(skip(app, session, params, form))]
pub async fn update(
    State(app): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
    Form(form): Form<UserModalForm>,
) -> Result<Response, ConsoleError> {
    let locale = app.console.locale;
    let back = screen_href(BASE, &ListState::from_params(&params));

    if let Err(errors) = form.validate() {
        let alert = missing_fields_alert(locale, &missing_fields(&errors));
        return Ok(flash_redirect(&session, vec![list_alert(&app, alert)], &back)
            .await?
            .into_response());
    }

    let update = UserUpdate::from(form);
    let alert = match app.api.update_user(&id, &update).await {
        Ok(reply) => {
            // Refetch so the row shows the roles the backend actually stored
            match app.api.get_user(&id).await {
                Ok(fresh) => {
                    USERS
                        .patch(&session, |users| {
                            snapshot::replace(users, fresh);
                        })
                        .await?
                }
                Err(e) => {
                    tracing::warn!(user_id = %id, error = %e, "Refetch after update failed");
                    USERS
                        .patch(&session, |users| {
                            snapshot::merge_update(users, &id, &update);
                        })
                        .await?
                }
            };
            Alert::done(locale, reply.message.as_deref(), Msg::UpdateUserOk)
        }
        Err(e) => e.alert(locale, Msg::UpdateUserFailed),
    };

    Ok(flash_redirect(&session, vec![list_alert(&app, alert)], &back)
        .await?
        .into_response())
}

// ---------------------------------------------------------------------------
// Add page
// ---------------------------------------------------------------------------

#[derive(Template)]
#[template(path = "users/add.html")]
pub struct AddUserTemplate {
    layout: Layout,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    roles: Vec<Choice>,
}

async fn role_choices(app: &AppState, selected: &[String]) -> Vec<Choice> {
    match app.api.list_roles().await {
        Ok(roles) => roles
            .iter()
            .map(|r| Choice::new(&r.id, &r.name, selected.iter().any(|id| r.id == *id)))
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Role list unavailable");
            Vec::new()
        }
    }
}

fn add_screen(
    app: &AppState,
    form: &NewUserForm,
    roles: Vec<Choice>,
    alerts: Vec<Alert>,
) -> Result<Response, ConsoleError> {
    let template = AddUserTemplate {
        layout: Layout::new("เพิ่มผู้ใช้งาน", "users", app.console.locale).with_alerts(alerts),
        username: form.username.clone(),
        email: form.email.clone(),
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        roles,
    };
    Ok(render(&template)?.into_response())
}

pub async fn add_page(
    State(app): State<AppState>,
    session: Session,
) -> Result<Response, ConsoleError> {
    let alerts = take_flash(&session).await?;
    let roles = role_choices(&app, &[]).await;
    add_screen(&app, &NewUserForm::default(), roles, alerts)
}

/// Register the account, then give it the chosen role.
#[tracing::instrument(skip(app, session, form), fields(username = %form.username))]
pub async fn create(
    State(app): State<AppState>,
    session: Session,
    Form(form): Form<NewUserForm>,
) -> Result<Response, ConsoleError> {
    let locale = app.console.locale;
    let selected = vec![form.role_id.clone()];

    if let Err(errors) = form.validate() {
        let alert = page_alert(&app, missing_fields_alert(locale, &missing_fields(&errors)));
        let roles = role_choices(&app, &selected).await;
        return add_screen(&app, &form, roles, vec![alert]);
    }

    let registered = match app.api.register_user(&RegisterUser::from(&form)).await {
        Ok(registered) => registered,
        Err(e) => {
            let alert = page_alert(
                &app,
                e.page_alert(locale, Msg::CreateUserFailedTitle, Msg::CreateUserFailed),
            );
            let roles = role_choices(&app, &selected).await;
            return add_screen(&app, &form, roles, vec![alert]);
        }
    };

    tracing::info!(user_id = ?registered.user_id, "User registered");
    let mut alerts = vec![page_alert(
        &app,
        Alert::success(locale.text(Msg::DoneTitle), locale.text(Msg::CreateUserOk)),
    )];

    if let Some(user_id) = registered.user_id.as_deref() {
        let outcome = app.api.assign_role(user_id, &form.role_id).await;
        alerts.push(page_alert(&app, assignment_alert(locale, outcome)));
    }

    // A bare visit remounts the list, so the new account shows up
    Ok(flash_redirect(&session, alerts, BASE).await?.into_response())
}

fn assignment_alert<T>(locale: Locale, outcome: Result<T, ApiError>) -> Alert {
    match outcome {
        Ok(_) => Alert::success(locale.text(Msg::AssignRoleTitle), locale.text(Msg::AssignRoleOk)),
        Err(e) if e.is_transport() => Alert::error(
            locale.text(Msg::ConnectFailedTitle),
            locale.text(Msg::AssignRoleConnectFailed),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Role assignment failed");
            Alert::error(
                locale.text(Msg::AssignRoleFailedTitle),
                locale.text(Msg::AssignRoleFailed),
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Edit page
// ---------------------------------------------------------------------------

#[derive(Template)]
#[template(path = "users/edit.html")]
pub struct EditUserTemplate {
    layout: Layout,
    action: String,
    toggle_action: String,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    roles: Vec<Choice>,
    status_known: bool,
    is_active: bool,
}

struct EditForm<'a> {
    username: &'a str,
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    role_ids: &'a [String],
    is_active: Option<bool>,
}

fn edit_screen(
    app: &AppState,
    id: &str,
    form: EditForm<'_>,
    roles: &[Role],
    alerts: Vec<Alert>,
) -> Result<Response, ConsoleError> {
    let template = EditUserTemplate {
        layout: Layout::new("แก้ไขผู้ใช้งาน", "users", app.console.locale).with_alerts(alerts),
        action: record_path(BASE, id, "edit"),
        toggle_action: format!("{}/toggle-status", record_path(BASE, id, "edit")),
        username: form.username.to_string(),
        email: form.email.to_string(),
        first_name: form.first_name.to_string(),
        last_name: form.last_name.to_string(),
        roles: roles
            .iter()
            .map(|r| {
                let chosen = form.role_ids.iter().any(|id| r.id == *id);
                Choice::new(&r.id, &r.name, chosen)
            })
            .collect(),
        status_known: form.is_active.is_some(),
        is_active: form.is_active.unwrap_or_default(),
    };
    Ok(render(&template)?.into_response())
}

async fn roles_or_empty(app: &AppState) -> Vec<Role> {
    app.api.list_roles().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Role list unavailable");
        Vec::new()
    })
}

#[tracing::instrument(skip(app, session))]
pub async fn edit_page(
    State(app): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response, ConsoleError> {
    let locale = app.console.locale;
    let mut alerts = take_flash(&session).await?;

    let (user, roles) = tokio::join!(app.api.get_user(&id), roles_or_empty(&app));

    match user {
        Ok(user) => {
            let role_ids = user.role_ids();
            let form = EditForm {
                username: &user.username,
                email: &user.email,
                first_name: user.first_name.as_deref().unwrap_or_default(),
                last_name: user.last_name.as_deref().unwrap_or_default(),
                role_ids: &role_ids,
                is_active: Some(user.is_active),
            };
            edit_screen(&app, &id, form, &roles, alerts)
        }
        Err(e) => {
            tracing::warn!(user_id = %id, error = %e, "User could not be loaded for editing");
            alerts.push(page_alert(
                &app,
                Alert::error(locale.text(Msg::ErrorTitle), locale.text(Msg::LoadFailed)),
            ));
            let form = EditForm {
                username: "",
                email: "",
                first_name: "",
                last_name: "",
                role_ids: &[],
                is_active: None,
            };
            edit_screen(&app, &id, form, &roles, alerts)
        }
    }
}

#[tracing::instrument(skip(app, session, form))]
pub async fn save(
    State(app): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    RepeatedForm(form): RepeatedForm<UserUpdateForm>,
) -> Result<Response, ConsoleError> {
    let locale = app.console.locale;

    let failure = match form.validate() {
        Err(errors) => missing_fields_alert(locale, &missing_fields(&errors)),
        Ok(()) => {
            let update = UserUpdate::from(form.clone());
            match app.api.update_user(&id, &update).await {
                Ok(_) => {
                    tracing::info!(user_id = %id, "User saved from the edit page");
                    let alert = page_alert(
                        &app,
                        Alert::success(locale.text(Msg::DoneTitle), locale.text(Msg::SaveUserOk)),
                    );
                    return Ok(flash_redirect(&session, vec![alert], BASE)
                        .await?
                        .into_response());
                }
                Err(e) => e.page_alert(locale, Msg::SaveUserFailedTitle, Msg::SaveUserFailed),
            }
        }
    };

    let roles = roles_or_empty(&app).await;
    let submitted = EditForm {
        username: &form.username,
        email: &form.email,
        first_name: &form.first_name,
        last_name: &form.last_name,
        role_ids: &form.role_ids,
        is_active: None,
    };
    edit_screen(&app, &id, submitted, &roles, vec![page_alert(&app, failure)])
}

/// Status switch on the edit page; the user stays on the page.
#[tracing::instrument(skip(app, session))]
pub async fn toggle_on_edit_page(
    State(app): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response, ConsoleError> {
    let locale = app.console.locale;

    let alert = match app.api.toggle_user_status(&id).await {
        Ok(_) => {
            USERS
                .patch(&session, |users| {
                    snapshot::toggle_status(users, &id);
                })
                .await?;
            Alert::success(locale.text(Msg::DoneTitle), locale.text(Msg::PageToggleOk))
        }
        Err(e) => e.page_alert(locale, Msg::PageToggleFailedTitle, Msg::PageToggleFailed),
    };

    let back = record_path(BASE, &id, "edit");
    Ok(flash_redirect(&session, vec![page_alert(&app, alert)], &back)
        .await?
        .into_response())
}
