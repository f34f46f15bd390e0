//! Public pantry page: upcoming shifts without an identity.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use chrono::FixedOffset;
use pantry_shifts_core::Shift;
use pantry_shifts_core::calendar::format_date_time_range;
use tracing::instrument;

use crate::state::AppState;

/// A role line on the public page.
#[derive(Debug, Clone)]
pub struct PublicRole {
    pub title: String,
    pub ratio: String,
    pub status_class: &'static str,
    pub status_label: &'static str,
}

/// A shift on the public page.
#[derive(Debug, Clone)]
pub struct PublicShift {
    pub title: String,
    pub when: String,
    pub roles: Vec<PublicRole>,
}

impl PublicShift {
    fn new(shift: &Shift, offset: FixedOffset) -> Self {
        Self {
            title: shift.role_name.clone(),
            when: format_date_time_range(shift.start_time, shift.end_time, offset),
            roles: shift
                .roles
                .iter()
                .map(|role| {
                    let capacity = role.capacity();
                    PublicRole {
                        title: role.role_title.clone(),
                        ratio: capacity.ratio(),
                        status_class: capacity.status().css_class(),
                        status_label: capacity.status().label(),
                    }
                })
                .collect(),
        }
    }
}

/// Public shifts page template.
#[derive(Template, WebTemplate)]
#[template(path = "public/shifts.html")]
pub struct PublicShiftsTemplate {
    pub slug: String,
    pub shifts: Vec<PublicShift>,
    pub load_error: bool,
}

/// Public shifts page handler.
///
/// Backend failures render the page with an error notice instead of failing
/// the request.
#[instrument(skip(state))]
pub async fn shifts(State(state): State<AppState>, Path(slug): Path<String>) -> PublicShiftsTemplate {
    let offset = state.utc_offset();
    match state.api().anonymous().public_shifts(&slug).await {
        Ok(mut shifts) => {
            shifts.sort_by_key(|shift| shift.start_time);
            PublicShiftsTemplate {
                shifts: shifts
                    .iter()
                    .map(|shift| PublicShift::new(shift, offset))
                    .collect(),
                slug,
                load_error: false,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to load public shifts");
            PublicShiftsTemplate {
                slug,
                shifts: Vec::new(),
                load_error: true,
            }
        }
    }
}
