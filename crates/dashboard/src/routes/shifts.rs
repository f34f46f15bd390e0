//! Shift management panel (pantry leads and admins).
//!
//! Lists the shifts of one pantry, creates shifts with their first role,
//! and adds or removes roles. A form that fails local validation is answered
//! with 422 and never reaches the backend.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use chrono::FixedOffset;
use pantry_shifts_client::{ApiError, choose_pantry};
use pantry_shifts_core::calendar::format_date_time_range;
use pantry_shifts_core::validation::{ShiftForm, ShiftRoleForm};
use pantry_shifts_core::{
    FieldErrors, NewShiftRole, Pantry, PantryId, Shift, ShiftId, ShiftRoleId, Tab, UserId,
};
use serde::Deserialize;
use tracing::instrument;

use super::calendar::PantryOption;
use crate::components::{PageLink, Shell, StatusMessage, StatusQuery};
use crate::error::{AppError, upstream_status};
use crate::middleware::{RequireManagement, Viewer};
use crate::state::AppState;

/// Query parameters of the shifts page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShiftsQuery {
    pub pantry: Option<String>,
}

/// Hidden fields that bring the viewer back to the pantry they were on.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReturnForm {
    pub pantry: String,
}

impl ReturnForm {
    fn pantry(&self) -> Option<PantryId> {
        self.pantry.parse().ok()
    }
}

/// Form adding a role to a listed shift.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddRoleForm {
    pub role_title: String,
    pub required_count: String,
    pub pantry: String,
}

fn shifts_link(pantry: Option<PantryId>) -> PageLink {
    PageLink::new("/shifts").maybe_param("pantry", pantry)
}

/// A role listed under a shift row.
#[derive(Debug, Clone)]
pub struct RoleRow {
    pub label: String,
    pub delete_action: String,
}

/// One row of the shifts table.
#[derive(Debug, Clone)]
pub struct ShiftRow {
    pub id: ShiftId,
    pub title: String,
    pub when: String,
    pub capacity: String,
    pub status: String,
    pub roles: Vec<RoleRow>,
    pub delete_action: String,
    pub add_role_action: String,
}

impl ShiftRow {
    fn new(shift: &Shift, viewer: UserId, offset: FixedOffset) -> Self {
        Self {
            id: shift.id,
            title: shift.role_name.clone(),
            when: format_date_time_range(shift.start_time, shift.end_time, offset),
            capacity: shift.capacity().ratio(),
            status: shift.status.clone(),
            roles: shift
                .roles
                .iter()
                .map(|role| RoleRow {
                    label: format!(
                        "{} ({}/{})",
                        role.role_title, role.filled_count, role.required_count
                    ),
                    delete_action: PageLink::new(format!("/shift-roles/{}/delete", role.id))
                        .href(viewer),
                })
                .collect(),
            delete_action: PageLink::new(format!("/shifts/{}/delete", shift.id)).href(viewer),
            add_role_action: PageLink::new(format!("/shifts/{}/roles", shift.id)).href(viewer),
        }
    }
}

/// Shifts page template.
#[derive(Template, WebTemplate)]
#[template(path = "shifts/index.html")]
pub struct ShiftsTemplate {
    pub shell: Shell,
    pub status: Option<StatusMessage>,
    pub user_id: UserId,
    pub pantries: Vec<PantryOption>,
    pub form_pantries: Vec<PantryOption>,
    pub pantry_value: String,
    pub shifts: Vec<ShiftRow>,
    pub load_error: Option<String>,
    pub form: ShiftForm,
    pub errors: FieldErrors,
    pub create_action: String,
}

/// Data every render of the panel needs.
struct ShiftsPanel {
    pantries: Vec<Pantry>,
    pantry_id: Option<PantryId>,
    shifts: Vec<ShiftRow>,
    load_error: Option<String>,
}

impl ShiftsPanel {
    async fn load(viewer: &Viewer, requested: Option<PantryId>, offset: FixedOffset) -> Result<Self, ApiError> {
        let pantries = viewer.api.list_pantries().await?;
        let pantry_id = choose_pantry(&pantries, requested);

        let mut load_error = None;
        let mut shifts = match pantry_id {
            Some(pantry_id) => viewer.api.list_shifts(pantry_id).await.unwrap_or_else(|e| {
                tracing::warn!(pantry_id = %pantry_id, error = %e, "failed to load shifts");
                load_error = Some(format!("Error: {}", e.user_message()));
                Vec::new()
            }),
            None => Vec::new(),
        };
        shifts.sort_by_key(|shift| shift.start_time);

        Ok(Self {
            pantries,
            pantry_id,
            shifts: shifts
                .iter()
                .map(|shift| ShiftRow::new(shift, viewer.id(), offset))
                .collect(),
            load_error,
        })
    }

    fn render(
        self,
        viewer: &Viewer,
        status: Option<StatusMessage>,
        form: ShiftForm,
        errors: FieldErrors,
    ) -> ShiftsTemplate {
        let form_pantry = form.pantry_id.parse().ok();
        ShiftsTemplate {
            shell: viewer.shell(Tab::Shifts),
            status,
            user_id: viewer.id(),
            pantries: PantryOption::list(&self.pantries, self.pantry_id),
            form_pantries: PantryOption::list(&self.pantries, form_pantry),
            pantry_value: self.pantry_id.map(|id| id.to_string()).unwrap_or_default(),
            shifts: self.shifts,
            load_error: self.load_error,
            form,
            errors,
            create_action: PageLink::new("/shifts").href(viewer.id()),
        }
    }
}

fn blank_form(pantry_id: Option<PantryId>) -> ShiftForm {
    ShiftForm {
        pantry_id: pantry_id.map(|id| id.to_string()).unwrap_or_default(),
        required_count: "1".to_string(),
        ..ShiftForm::default()
    }
}

/// Shifts page handler.
#[instrument(skip(viewer, state, status), fields(user_id = %viewer.id()))]
pub async fn index(
    RequireManagement(viewer): RequireManagement,
    State(state): State<AppState>,
    Query(query): Query<ShiftsQuery>,
    Query(status): Query<StatusQuery>,
) -> Result<ShiftsTemplate, AppError> {
    let requested = query.pantry.as_deref().and_then(|p| p.parse().ok());
    let panel = ShiftsPanel::load(&viewer, requested, state.utc_offset()).await?;
    let form = blank_form(panel.pantry_id);
    Ok(panel.render(&viewer, status.message(), form, FieldErrors::new()))
}

/// Create a shift and its first role.
#[instrument(skip(viewer, state, form), fields(user_id = %viewer.id()))]
pub async fn create(
    RequireManagement(viewer): RequireManagement,
    State(state): State<AppState>,
    Form(form): Form<ShiftForm>,
) -> Result<Response, AppError> {
    let offset = state.utc_offset();
    let requested = form.pantry_id.parse().ok();

    let (pantry_id, new_shift) = match form.validate(offset) {
        Ok(valid) => valid,
        Err(errors) => {
            tracing::info!(errors = %errors, "shift form rejected");
            let panel = ShiftsPanel::load(&viewer, requested, offset).await?;
            let status = StatusMessage::error("Please correct the highlighted fields.");
            let page = panel.render(&viewer, Some(status), form, errors);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    let created = match viewer.api.create_shift(pantry_id, &new_shift).await {
        Ok(created) => created,
        Err(e) => {
            tracing::warn!(error = %e, "shift creation failed");
            let panel = ShiftsPanel::load(&viewer, requested, offset).await?;
            let page = panel.render(&viewer, Some(StatusMessage::failure(&e)), form, FieldErrors::new());
            return Ok((upstream_status(&e), page).into_response());
        }
    };

    let message = match created {
        Some(shift) => {
            let role = NewShiftRole {
                role_title: new_shift.role_name.clone(),
                required_count: new_shift.required_count,
            };
            match viewer.api.create_shift_role(shift.id, &role).await {
                Ok(_) => StatusMessage::success("Shift created successfully!"),
                Err(e) => StatusMessage::error(format!(
                    "Shift created, but adding its role failed: {}",
                    e.user_message()
                )),
            }
        }
        None => StatusMessage::success("Shift created successfully!"),
    };

    Ok(shifts_link(Some(pantry_id))
        .status(&message)
        .redirect(viewer.id())
        .into_response())
}

/// Delete a shift.
#[instrument(skip(viewer, form), fields(user_id = %viewer.id()))]
pub async fn delete(
    RequireManagement(viewer): RequireManagement,
    Path(id): Path<ShiftId>,
    Form(form): Form<ReturnForm>,
) -> Redirect {
    let message = match viewer.api.delete_shift(id).await {
        Ok(()) => StatusMessage::success("Shift deleted successfully!"),
        Err(e) => StatusMessage::failure(&e),
    };
    shifts_link(form.pantry()).status(&message).redirect(viewer.id())
}

/// Add a role to a shift.
#[instrument(skip(viewer, form), fields(user_id = %viewer.id()))]
pub async fn add_role(
    RequireManagement(viewer): RequireManagement,
    Path(id): Path<ShiftId>,
    Form(form): Form<AddRoleForm>,
) -> Redirect {
    let pantry = form.pantry.parse().ok();
    let role_form = ShiftRoleForm {
        role_title: form.role_title,
        required_count: form.required_count,
    };

    let message = match role_form.validate() {
        Err(errors) => StatusMessage::error(errors.to_string()),
        Ok(role) => match viewer.api.create_shift_role(id, &role).await {
            Ok(_) => StatusMessage::success("Role added successfully!"),
            Err(e) => StatusMessage::failure(&e),
        },
    };
    shifts_link(pantry).status(&message).redirect(viewer.id())
}

/// Remove a role from its shift.
#[instrument(skip(viewer, form), fields(user_id = %viewer.id()))]
pub async fn delete_role(
    RequireManagement(viewer): RequireManagement,
    Path(id): Path<ShiftRoleId>,
    Form(form): Form<ReturnForm>,
) -> Redirect {
    let message = match viewer.api.delete_shift_role(id).await {
        Ok(()) => StatusMessage::success("Role removed successfully!"),
        Err(e) => StatusMessage::failure(&e),
    };
    shifts_link(form.pantry()).status(&message).redirect(viewer.id())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pantry_shifts_core::ShiftRole;

    #[test]
    fn test_shift_row_labels() {
        let shift = Shift {
            id: ShiftId::new(4),
            pantry_id: PantryId::new(1),
            role_name: "Morning sort".to_string(),
            start_time: Utc.with_ymd_and_hms(2026, 10, 20, 9, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2026, 10, 20, 12, 0, 0).unwrap(),
            required_count: 5,
            filled_count: 2,
            status: "Open".to_string(),
            roles: vec![ShiftRole {
                id: ShiftRoleId::new(8),
                shift_id: Some(ShiftId::new(4)),
                role_title: "Sorter".to_string(),
                required_count: 5,
                filled_count: 2,
            }],
        };
        let offset = FixedOffset::east_opt(0).unwrap();
        let row = ShiftRow::new(&shift, UserId::new(3), offset);
        assert_eq!(row.when, "Tue, Oct 20, 9:00 AM – 12:00 PM");
        assert_eq!(row.capacity, "2 / 5");
        assert_eq!(row.roles.first().unwrap().label, "Sorter (2/5)");
        assert_eq!(row.delete_action, "/shifts/4/delete?user_id=3");
        assert_eq!(
            row.roles.first().unwrap().delete_action,
            "/shift-roles/8/delete?user_id=3"
        );
    }

    #[test]
    fn test_blank_form_preselects_pantry() {
        let form = blank_form(Some(PantryId::new(6)));
        assert_eq!(form.pantry_id, "6");
        assert_eq!(form.required_count, "1");
        assert!(form.role_name.is_empty());
    }

    #[test]
    fn test_return_form_pantry() {
        let form = ReturnForm {
            pantry: "x".to_string(),
        };
        assert_eq!(form.pantry(), None);
    }
}
