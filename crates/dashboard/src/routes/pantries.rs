//! Pantry administration panel.
//!
//! Creates, renames and deletes pantries and manages their leads. Leads can
//! be added to or removed from a pantry's lead list, or set as its primary
//! lead through `PATCH lead_id`.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Form, Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use pantry_shifts_client::ApiError;
use pantry_shifts_core::validation::{LeadForm, PantryForm, PantryLeadForm};
use pantry_shifts_core::{FieldErrors, Pantry, PantryId, PantryPatch, RoleName, Tab, User, UserId};
use tracing::instrument;

use super::calendar::PantryOption;
use crate::components::{PageLink, Shell, StatusMessage, StatusQuery};
use crate::error::{AppError, upstream_status};
use crate::middleware::{RequireAdministration, Viewer};

fn pantries_link() -> PageLink {
    PageLink::new("/admin/pantries")
}

/// A pantry lead candidate in a select box.
#[derive(Debug, Clone)]
pub struct LeadOption {
    pub id: UserId,
    pub label: String,
    pub selected: bool,
}

impl LeadOption {
    /// `"Full Name (email)"` entries, marking `selected`.
    #[must_use]
    pub fn list(users: &[User], selected: Option<UserId>) -> Vec<Self> {
        users
            .iter()
            .map(|user| Self {
                id: user.id,
                label: format!("{} ({})", user.display_name(), user.email),
                selected: Some(user.id) == selected,
            })
            .collect()
    }
}

/// One row of the pantries table.
#[derive(Debug, Clone)]
pub struct PantryRow {
    pub name: String,
    pub slug: String,
    pub address: String,
    pub location_address: String,
    pub leads: Vec<String>,
    pub lead_options: Vec<LeadOption>,
    pub public_href: Option<String>,
    pub update_action: String,
    pub delete_action: String,
    pub lead_action: String,
}

impl PantryRow {
    fn new(pantry: &Pantry, leads: &[User], viewer: UserId) -> Self {
        let base = format!("/admin/pantries/{}", pantry.id);
        Self {
            name: pantry.name.clone(),
            slug: pantry.slug.clone(),
            address: pantry
                .location_address
                .clone()
                .filter(|address| !address.trim().is_empty())
                .unwrap_or_else(|| "—".to_string()),
            location_address: pantry.location_address.clone().unwrap_or_default(),
            leads: pantry
                .leads
                .iter()
                .map(|lead| lead.display_name().to_owned())
                .collect(),
            lead_options: LeadOption::list(leads, pantry.lead_id),
            public_href: (!pantry.slug.is_empty())
                .then(|| format!("/pantries/{}/shifts", urlencoding::encode(&pantry.slug))),
            update_action: PageLink::new(base.clone()).href(viewer),
            delete_action: PageLink::new(format!("{base}/delete")).href(viewer),
            lead_action: PageLink::new(format!("{base}/lead")).href(viewer),
        }
    }
}

/// Pantries admin page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/pantries.html")]
pub struct PantriesTemplate {
    pub shell: Shell,
    pub status: Option<StatusMessage>,
    pub pantries: Vec<PantryRow>,
    pub pantry_options: Vec<PantryOption>,
    pub leads: Vec<LeadOption>,
    pub form: PantryForm,
    pub errors: FieldErrors,
    pub create_action: String,
    pub assign_action: String,
    pub remove_action: String,
    pub users_href: String,
}

async fn render_page(
    viewer: &Viewer,
    status: Option<StatusMessage>,
    form: PantryForm,
    errors: FieldErrors,
) -> Result<PantriesTemplate, ApiError> {
    let pantries = viewer.api.list_pantries().await?;
    let leads = viewer
        .api
        .list_users(Some(&RoleName::PantryLead))
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load pantry leads");
            Vec::new()
        });

    let id = viewer.id();
    Ok(PantriesTemplate {
        shell: viewer.shell(Tab::Admin),
        status,
        pantries: pantries
            .iter()
            .map(|pantry| PantryRow::new(pantry, &leads, id))
            .collect(),
        pantry_options: PantryOption::list(&pantries, None),
        leads: LeadOption::list(&leads, None),
        form,
        errors,
        create_action: pantries_link().href(id),
        assign_action: PageLink::new("/admin/leads").href(id),
        remove_action: PageLink::new("/admin/leads/remove").href(id),
        users_href: PageLink::new("/admin/users").href(id),
    })
}

/// Pantries admin page handler.
#[instrument(skip(viewer, status), fields(user_id = %viewer.id()))]
pub async fn index(
    RequireAdministration(viewer): RequireAdministration,
    Query(status): Query<StatusQuery>,
) -> Result<PantriesTemplate, AppError> {
    Ok(render_page(&viewer, status.message(), PantryForm::default(), FieldErrors::new()).await?)
}

/// Create a pantry.
#[instrument(skip(viewer, form), fields(user_id = %viewer.id()))]
pub async fn create(
    RequireAdministration(viewer): RequireAdministration,
    Form(form): Form<PantryForm>,
) -> Result<Response, AppError> {
    let pantry = match form.validate() {
        Ok(pantry) => pantry,
        Err(errors) => {
            tracing::info!(errors = %errors, "pantry form rejected");
            let status = StatusMessage::error("Please correct the highlighted fields.");
            let page = render_page(&viewer, Some(status), form, errors).await?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    match viewer.api.create_pantry(&pantry).await {
        Ok(_) => Ok(pantries_link()
            .status(&StatusMessage::success("Pantry created successfully!"))
            .redirect(viewer.id())
            .into_response()),
        Err(e) => {
            tracing::warn!(error = %e, "pantry creation failed");
            let page = render_page(&viewer, Some(StatusMessage::failure(&e)), form, FieldErrors::new()).await?;
            Ok((upstream_status(&e), page).into_response())
        }
    }
}

/// Rename a pantry or change its slug and address.
#[instrument(skip(viewer, form), fields(user_id = %viewer.id()))]
pub async fn update(
    RequireAdministration(viewer): RequireAdministration,
    Path(id): Path<PantryId>,
    Form(form): Form<PantryForm>,
) -> Redirect {
    let message = match form.validate() {
        Err(errors) => StatusMessage::error(errors.to_string()),
        Ok(pantry) => {
            let patch = PantryPatch {
                name: Some(pantry.name),
                slug: Some(pantry.slug),
                location_address: pantry.location_address,
                lead_id: None,
            };
            match viewer.api.update_pantry(id, &patch).await {
                Ok(_) => StatusMessage::success("Pantry updated successfully!"),
                Err(e) => StatusMessage::failure(&e),
            }
        }
    };
    pantries_link().status(&message).redirect(viewer.id())
}

/// Delete a pantry.
#[instrument(skip(viewer), fields(user_id = %viewer.id()))]
pub async fn delete(
    RequireAdministration(viewer): RequireAdministration,
    Path(id): Path<PantryId>,
) -> Redirect {
    let message = match viewer.api.delete_pantry(id).await {
        Ok(()) => StatusMessage::success("Pantry deleted successfully!"),
        Err(e) => StatusMessage::failure(&e),
    };
    pantries_link().status(&message).redirect(viewer.id())
}

/// Add a lead to a pantry's lead list.
#[instrument(skip(viewer, form), fields(user_id = %viewer.id()))]
pub async fn assign_lead(
    RequireAdministration(viewer): RequireAdministration,
    Form(form): Form<LeadForm>,
) -> Redirect {
    let message = match form.validate() {
        Err(errors) => StatusMessage::error(errors.to_string()),
        Ok((pantry_id, assignment)) => match viewer.api.add_pantry_lead(pantry_id, assignment).await {
            Ok(()) => StatusMessage::success("Lead assigned successfully!"),
            Err(e) => StatusMessage::failure(&e),
        },
    };
    pantries_link().status(&message).redirect(viewer.id())
}

/// Remove a lead from a pantry's lead list.
#[instrument(skip(viewer, form), fields(user_id = %viewer.id()))]
pub async fn remove_lead(
    RequireAdministration(viewer): RequireAdministration,
    Form(form): Form<LeadForm>,
) -> Redirect {
    let message = match form.validate() {
        Err(errors) => StatusMessage::error(errors.to_string()),
        Ok((pantry_id, assignment)) => {
            match viewer.api.remove_pantry_lead(pantry_id, assignment.user_id).await {
                Ok(()) => StatusMessage::success("Lead removed successfully!"),
                Err(e) => StatusMessage::failure(&e),
            }
        }
    };
    pantries_link().status(&message).redirect(viewer.id())
}

/// Set or clear a pantry's primary lead.
#[instrument(skip(viewer, form), fields(user_id = %viewer.id()))]
pub async fn set_lead(
    RequireAdministration(viewer): RequireAdministration,
    Path(id): Path<PantryId>,
    Form(form): Form<PantryLeadForm>,
) -> Redirect {
    let message = match form.validate() {
        Err(errors) => StatusMessage::error(errors.to_string()),
        Ok(lead_id) => match viewer.api.set_pantry_lead(id, lead_id).await {
            Ok(_) if lead_id.is_some() => StatusMessage::success("Lead updated successfully!"),
            Ok(_) => StatusMessage::success("Lead cleared successfully!"),
            Err(e) => StatusMessage::failure(&e),
        },
    };
    pantries_link().status(&message).redirect(viewer.id())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pantry_shifts_core::LeadUser;

    fn lead(id: i32, name: Option<&str>, email: &str) -> User {
        User {
            id: UserId::new(id),
            email: email.to_string(),
            full_name: name.map(str::to_string),
            roles: std::iter::once(RoleName::PantryLead).collect(),
        }
    }

    #[test]
    fn test_lead_option_labels() {
        let leads = vec![
            lead(2, Some("Ana Lee"), "ana@example.org"),
            lead(3, None, "bo@example.org"),
        ];
        let options = LeadOption::list(&leads, Some(UserId::new(3)));
        assert_eq!(options.first().unwrap().label, "Ana Lee (ana@example.org)");
        assert!(!options.first().unwrap().selected);
        assert_eq!(options.get(1).unwrap().label, "bo@example.org (bo@example.org)");
        assert!(options.get(1).unwrap().selected);
    }

    #[test]
    fn test_pantry_row_placeholders() {
        let pantry = Pantry {
            id: PantryId::new(5),
            name: "Eastside".to_string(),
            slug: String::new(),
            location_address: Some("  ".to_string()),
            lead_id: None,
            leads: Vec::new(),
        };
        let row = PantryRow::new(&pantry, &[], UserId::new(1));
        assert_eq!(row.address, "—");
        assert!(row.leads.is_empty());
        assert!(row.public_href.is_none());
        assert_eq!(row.lead_action, "/admin/pantries/5/lead?user_id=1");
    }

    #[test]
    fn test_pantry_row_leads_and_public_link() {
        let pantry = Pantry {
            id: PantryId::new(1),
            name: "Westside".to_string(),
            slug: "westside".to_string(),
            location_address: Some("1 Main St".to_string()),
            lead_id: Some(UserId::new(2)),
            leads: vec![LeadUser {
                id: UserId::new(2),
                email: "ana@example.org".to_string(),
                full_name: Some("Ana Lee".to_string()),
            }],
        };
        let leads = vec![lead(2, Some("Ana Lee"), "ana@example.org")];
        let row = PantryRow::new(&pantry, &leads, UserId::new(1));
        assert_eq!(row.leads, vec!["Ana Lee".to_string()]);
        assert_eq!(row.public_href.as_deref(), Some("/pantries/westside/shifts"));
        assert!(row.lead_options.first().unwrap().selected);
    }
}
