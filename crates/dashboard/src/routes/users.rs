//! User administration panel: list by role, create, grant and revoke roles.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Form, Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use pantry_shifts_client::ApiError;
use pantry_shifts_core::validation::{RoleAssignForm, UserForm};
use pantry_shifts_core::{FieldErrors, Role, RoleId, RoleName, Tab, User, UserId};
use serde::Deserialize;
use tracing::instrument;

use crate::components::{PageLink, Shell, StatusMessage, StatusQuery};
use crate::error::{AppError, upstream_status};
use crate::middleware::{RequireAdministration, Viewer};

/// Query parameters of the users page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsersQuery {
    pub role: Option<String>,
}

impl UsersQuery {
    /// Role filter; blank means every user.
    #[must_use]
    pub fn role(&self) -> Option<RoleName> {
        self.role.as_deref().and_then(|role| role.parse().ok())
    }
}

fn users_link(role: Option<&RoleName>) -> PageLink {
    PageLink::new("/admin/users").maybe_param("role", role)
}

/// An option in the role filter or role assignment select.
#[derive(Debug, Clone)]
pub struct RoleOption {
    pub id: RoleId,
    pub name: String,
    pub selected: bool,
}

/// A role a user holds, with its revoke action when the role is known.
#[derive(Debug, Clone)]
pub struct HeldRole {
    pub name: String,
    pub remove_action: Option<String>,
}

/// One row of the users table.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub roles: Vec<HeldRole>,
    pub assign_action: String,
}

impl UserRow {
    fn new(user: &User, roles: &[Role], filter: Option<&RoleName>, viewer: UserId) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone().unwrap_or_default(),
            roles: user
                .roles
                .iter()
                .map(|held| HeldRole {
                    name: held.to_string(),
                    remove_action: roles.iter().find(|role| role.name == *held).map(|role| {
                        PageLink::new(format!("/admin/users/{}/roles/{}/delete", user.id, role.id))
                            .maybe_param("role", filter)
                            .href(viewer)
                    }),
                })
                .collect(),
            assign_action: PageLink::new(format!("/admin/users/{}/roles", user.id))
                .maybe_param("role", filter)
                .href(viewer),
        }
    }
}

/// Users admin page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/users.html")]
pub struct UsersTemplate {
    pub shell: Shell,
    pub status: Option<StatusMessage>,
    pub user_id: UserId,
    pub users: Vec<UserRow>,
    pub roles: Vec<RoleOption>,
    pub filter: String,
    pub form: UserForm,
    pub errors: FieldErrors,
    pub create_action: String,
    pub pantries_href: String,
}

async fn render_page(
    viewer: &Viewer,
    filter: Option<RoleName>,
    status: Option<StatusMessage>,
    form: UserForm,
    errors: FieldErrors,
) -> Result<UsersTemplate, ApiError> {
    let users = viewer.api.list_users(filter.as_ref()).await?;
    let roles = viewer.api.list_roles().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load roles");
        Vec::new()
    });

    let id = viewer.id();
    Ok(UsersTemplate {
        shell: viewer.shell(Tab::Admin),
        status,
        user_id: id,
        users: users
            .iter()
            .map(|user| UserRow::new(user, &roles, filter.as_ref(), id))
            .collect(),
        roles: roles
            .iter()
            .map(|role| RoleOption {
                id: role.id,
                name: role.name.to_string(),
                selected: Some(&role.name) == filter.as_ref(),
            })
            .collect(),
        filter: filter.map(|role| role.to_string()).unwrap_or_default(),
        form,
        errors,
        create_action: PageLink::new("/admin/users").href(id),
        pantries_href: PageLink::new("/admin/pantries").href(id),
    })
}

/// Users admin page handler.
#[instrument(skip(viewer, status), fields(user_id = %viewer.id()))]
pub async fn index(
    RequireAdministration(viewer): RequireAdministration,
    Query(query): Query<UsersQuery>,
    Query(status): Query<StatusQuery>,
) -> Result<UsersTemplate, AppError> {
    Ok(render_page(
        &viewer,
        query.role(),
        status.message(),
        UserForm::default(),
        FieldErrors::new(),
    )
    .await?)
}

/// Create a user.
#[instrument(skip(viewer, form), fields(user_id = %viewer.id()))]
pub async fn create(
    RequireAdministration(viewer): RequireAdministration,
    Form(form): Form<UserForm>,
) -> Result<Response, AppError> {
    let user = match form.validate() {
        Ok(user) => user,
        Err(errors) => {
            tracing::info!(errors = %errors, "user form rejected");
            let status = StatusMessage::error("Please correct the highlighted fields.");
            let page = render_page(&viewer, None, Some(status), form, errors).await?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    match viewer.api.create_user(&user).await {
        Ok(_) => Ok(users_link(None)
            .status(&StatusMessage::success("User created successfully!"))
            .redirect(viewer.id())
            .into_response()),
        Err(e) => {
            tracing::warn!(error = %e, "user creation failed");
            let page =
                render_page(&viewer, None, Some(StatusMessage::failure(&e)), form, FieldErrors::new())
                    .await?;
            Ok((upstream_status(&e), page).into_response())
        }
    }
}

/// Grant a role to a user.
#[instrument(skip(viewer, query, form), fields(user_id = %viewer.id()))]
pub async fn assign_role(
    RequireAdministration(viewer): RequireAdministration,
    Path(target): Path<UserId>,
    Query(query): Query<UsersQuery>,
    Form(form): Form<RoleAssignForm>,
) -> Redirect {
    let message = match form.validate() {
        Err(errors) => StatusMessage::error(errors.to_string()),
        Ok(assignment) => match viewer.api.assign_role(target, assignment).await {
            Ok(()) => StatusMessage::success("Role assigned successfully!"),
            Err(e) => StatusMessage::failure(&e),
        },
    };
    users_link(query.role().as_ref())
        .status(&message)
        .redirect(viewer.id())
}

/// Revoke a role from a user.
#[instrument(skip(viewer, query), fields(user_id = %viewer.id()))]
pub async fn remove_role(
    RequireAdministration(viewer): RequireAdministration,
    Path((target, role_id)): Path<(UserId, RoleId)>,
    Query(query): Query<UsersQuery>,
) -> Redirect {
    let message = match viewer.api.remove_role(target, role_id).await {
        Ok(()) => StatusMessage::success("Role removed successfully!"),
        Err(e) => StatusMessage::failure(&e),
    };
    users_link(query.role().as_ref())
        .status(&message)
        .redirect(viewer.id())
}
