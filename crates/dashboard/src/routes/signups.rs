//! Volunteer sign-ups: joining a shift role, listing and cancelling one's own.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Form, Path, Query};
use axum::response::Redirect;
use pantry_shifts_core::{ShiftRoleId, SignupId, SignupRequest, Tab, UserId, Week};
use serde::Deserialize;
use tracing::instrument;

use super::calendar::{calendar_link, parse_anchor};
use crate::components::{PageLink, Shell, StatusMessage, StatusQuery};
use crate::error::AppError;
use crate::middleware::Viewer;

/// Hidden fields of the calendar's Sign Up buttons.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub pantry: String,
    pub week: String,
}

/// Sign the viewer up for a shift role, then return to the calendar week
/// they were looking at.
#[instrument(skip(viewer, form), fields(user_id = %viewer.id()))]
pub async fn sign_up(
    viewer: Viewer,
    Path(id): Path<ShiftRoleId>,
    Form(form): Form<SignupForm>,
) -> Redirect {
    let request = SignupRequest {
        user_id: Some(viewer.id()),
    };
    let message = match viewer.api.sign_up(id, request).await {
        Ok(_) => StatusMessage::success("Successfully signed up!"),
        Err(e) => {
            tracing::info!(shift_role_id = %id, error = %e, "signup rejected");
            StatusMessage::error(format!("Signup failed: {}", e.user_message()))
        }
    };

    let pantry = form.pantry.parse().ok();
    let link = match parse_anchor(&form.week) {
        Some(anchor) => calendar_link(pantry, Week::containing(anchor)),
        None => PageLink::new("/calendar").maybe_param("pantry", pantry),
    };
    link.status(&message).redirect(viewer.id())
}

/// One of the viewer's sign-ups.
#[derive(Debug, Clone)]
pub struct SignupRow {
    pub id: SignupId,
    pub shift_role_id: ShiftRoleId,
    pub cancel_action: String,
}

/// "My sign-ups" page template.
#[derive(Template, WebTemplate)]
#[template(path = "signups/index.html")]
pub struct SignupsTemplate {
    pub shell: Shell,
    pub status: Option<StatusMessage>,
    pub signups: Vec<SignupRow>,
    pub calendar_href: String,
}

/// List the viewer's sign-ups.
#[instrument(skip(viewer, status), fields(user_id = %viewer.id()))]
pub async fn index(viewer: Viewer, Query(status): Query<StatusQuery>) -> Result<SignupsTemplate, AppError> {
    let signups = viewer.api.user_signups(viewer.id()).await?;
    Ok(SignupsTemplate {
        shell: viewer.shell(Tab::Calendar),
        status: status.message(),
        signups: signups
            .iter()
            .map(|signup| signup_row(signup.id, signup.shift_role_id, viewer.id()))
            .collect(),
        calendar_href: PageLink::new("/calendar").href(viewer.id()),
    })
}

fn signup_row(id: SignupId, shift_role_id: ShiftRoleId, viewer: UserId) -> SignupRow {
    SignupRow {
        id,
        shift_role_id,
        cancel_action: PageLink::new(format!("/signups/{id}/cancel")).href(viewer),
    }
}

/// Cancel one of the viewer's sign-ups.
#[instrument(skip(viewer), fields(user_id = %viewer.id()))]
pub async fn cancel(viewer: Viewer, Path(id): Path<SignupId>) -> Redirect {
    let message = match viewer.api.cancel_signup(id).await {
        Ok(()) => StatusMessage::success("Signup cancelled."),
        Err(e) => StatusMessage::failure(&e),
    };
    PageLink::new("/signups").status(&message).redirect(viewer.id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_row_cancel_action() {
        let row = signup_row(SignupId::new(12), ShiftRoleId::new(3), UserId::new(8));
        assert_eq!(row.cancel_action, "/signups/12/cancel?user_id=8");
    }
}
