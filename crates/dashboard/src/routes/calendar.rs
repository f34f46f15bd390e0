//! Weekly calendar page.
//!
//! `GET /calendar?user_id=&pantry=&week=YYYY-MM-DD` renders a Monday-start
//! seven-column grid for one pantry. Prev/next/today links carry the week
//! anchor in the URL so the view has no server-side state.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use chrono::{FixedOffset, NaiveDate};
use pantry_shifts_client::choose_pantry;
use pantry_shifts_core::calendar::{format_time_range, shift_meta};
use pantry_shifts_core::{
    Navigation, Pantry, PantryId, Shift, ShiftRole, Tab, UserId, Week, WeekGrid,
};
use serde::Deserialize;
use tracing::instrument;

use crate::components::{PageLink, Shell, StatusMessage, StatusQuery};
use crate::error::AppError;
use crate::middleware::Viewer;
use crate::state::AppState;

/// Query parameters of the calendar page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarQuery {
    pub pantry: Option<String>,
    pub week: Option<String>,
}

impl CalendarQuery {
    /// Requested pantry; unparseable values are ignored.
    #[must_use]
    pub fn pantry(&self) -> Option<PantryId> {
        self.pantry.as_deref().and_then(|p| p.parse().ok())
    }

    /// Requested week anchor; unparseable values are ignored.
    #[must_use]
    pub fn anchor(&self) -> Option<NaiveDate> {
        parse_anchor(self.week.as_deref()?)
    }
}

/// Parse a `YYYY-MM-DD` week anchor.
#[must_use]
pub fn parse_anchor(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Where the calendar page for `pantry` and `week` lives.
#[must_use]
pub fn calendar_link(pantry: Option<PantryId>, week: Week) -> PageLink {
    PageLink::new("/calendar")
        .maybe_param("pantry", pantry)
        .param("week", week.anchor())
}

/// A pantry in the selector.
#[derive(Debug, Clone)]
pub struct PantryOption {
    pub id: PantryId,
    pub name: String,
    pub selected: bool,
}

impl PantryOption {
    #[must_use]
    pub fn list(pantries: &[Pantry], selected: Option<PantryId>) -> Vec<Self> {
        pantries
            .iter()
            .map(|p| Self {
                id: p.id,
                name: p.name.clone(),
                selected: Some(p.id) == selected,
            })
            .collect()
    }
}

/// One shift role with its capacity and sign-up action.
#[derive(Debug, Clone)]
pub struct RoleSlot {
    pub title: String,
    pub ratio: String,
    pub percent: u8,
    pub status_class: &'static str,
    pub status_label: &'static str,
    pub full: bool,
    pub signup_action: String,
}

impl RoleSlot {
    fn new(role: &ShiftRole, viewer: UserId) -> Self {
        let capacity = role.capacity();
        let status = capacity.status();
        Self {
            title: role.role_title.clone(),
            ratio: format!("{}/{} filled", capacity.filled, capacity.required),
            percent: capacity.percent(),
            status_class: status.css_class(),
            status_label: status.label(),
            full: capacity.is_full(),
            signup_action: PageLink::new(format!("/shift-roles/{}/signup", role.id)).href(viewer),
        }
    }
}

/// A shift card within a day column.
#[derive(Debug, Clone)]
pub struct ShiftCard {
    pub title: String,
    pub time_range: String,
    pub meta: String,
    pub status_class: &'static str,
    pub roles: Vec<RoleSlot>,
}

impl ShiftCard {
    fn new(shift: &Shift, viewer: UserId, offset: FixedOffset) -> Self {
        Self {
            title: shift.role_name.clone(),
            time_range: format_time_range(shift.start_time, shift.end_time, offset),
            meta: shift_meta(shift),
            status_class: shift.capacity().status().css_class(),
            roles: shift
                .roles
                .iter()
                .map(|role| RoleSlot::new(role, viewer))
                .collect(),
        }
    }
}

/// One of the seven day columns.
#[derive(Debug, Clone)]
pub struct DayView {
    pub header: String,
    pub is_today: bool,
    pub shifts: Vec<ShiftCard>,
}

/// Prev/next/today links and the week title.
#[derive(Debug, Clone)]
pub struct WeekNav {
    pub title: String,
    pub anchor: String,
    pub prev_href: String,
    pub next_href: String,
    pub today_href: String,
}

impl WeekNav {
    #[must_use]
    pub fn new(week: Week, pantry: Option<PantryId>, today: NaiveDate, viewer: UserId) -> Self {
        let href = |navigation| calendar_link(pantry, week.navigate(navigation, today)).href(viewer);
        Self {
            title: week.title(),
            anchor: week.anchor(),
            prev_href: href(Navigation::Prev),
            next_href: href(Navigation::Next),
            today_href: href(Navigation::Today),
        }
    }
}

/// Build the seven day views from a bucketed grid.
#[must_use]
pub fn day_views(grid: &WeekGrid, today: NaiveDate, viewer: UserId, offset: FixedOffset) -> Vec<DayView> {
    grid.days()
        .iter()
        .map(|day| DayView {
            header: day.header(),
            is_today: day.date == today,
            shifts: day
                .shifts
                .iter()
                .map(|shift| ShiftCard::new(shift, viewer, offset))
                .collect(),
        })
        .collect()
}

/// Calendar page template.
#[derive(Template, WebTemplate)]
#[template(path = "calendar/index.html")]
pub struct CalendarTemplate {
    pub shell: Shell,
    pub status: Option<StatusMessage>,
    pub user_id: UserId,
    pub pantries: Vec<PantryOption>,
    pub nav: WeekNav,
    pub days: Vec<DayView>,
    pub load_error: Option<String>,
    pub pantry_id: Option<PantryId>,
}

/// Calendar page handler.
#[instrument(skip(viewer, state, status), fields(user_id = %viewer.id()))]
pub async fn index(
    viewer: Viewer,
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
    Query(status): Query<StatusQuery>,
) -> Result<CalendarTemplate, AppError> {
    let today = state.today();
    let offset = state.utc_offset();
    let week = Week::containing(query.anchor().unwrap_or(today));

    let pantries = viewer.api.all_pantries().await?;
    let pantry_id = choose_pantry(&pantries, query.pantry());

    let mut load_error = None;
    let days = match pantry_id {
        Some(pantry_id) => match viewer.api.list_shifts(pantry_id).await {
            Ok(shifts) => {
                let grid = WeekGrid::build(week, shifts, offset);
                tracing::debug!(pantry_id = %pantry_id, shifts = grid.shift_count(), "calendar built");
                day_views(&grid, today, viewer.id(), offset)
            }
            Err(e) => {
                tracing::warn!(pantry_id = %pantry_id, error = %e, "failed to load shifts");
                load_error = Some(format!("Error: {}", e.user_message()));
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    Ok(CalendarTemplate {
        shell: viewer.shell(Tab::Calendar),
        status: status.message(),
        user_id: viewer.id(),
        pantries: PantryOption::list(&pantries, pantry_id),
        nav: WeekNav::new(week, pantry_id, today, viewer.id()),
        days,
        load_error,
        pantry_id,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_query_ignores_garbage() {
        let query = CalendarQuery {
            pantry: Some("abc".to_string()),
            week: Some("next tuesday".to_string()),
        };
        assert_eq!(query.pantry(), None);
        assert_eq!(query.anchor(), None);
    }

    #[test]
    fn test_query_parses_values() {
        let query = CalendarQuery {
            pantry: Some("3".to_string()),
            week: Some("2026-10-21".to_string()),
        };
        assert_eq!(query.pantry(), Some(PantryId::new(3)));
        assert_eq!(query.anchor(), Some(date(2026, 10, 21)));
    }

    #[test]
    fn test_week_nav_links() {
        let week = Week::containing(date(2026, 10, 21));
        let nav = WeekNav::new(week, Some(PantryId::new(2)), date(2026, 11, 4), UserId::new(7));
        assert_eq!(nav.anchor, "2026-10-19");
        assert_eq!(nav.prev_href, "/calendar?pantry=2&week=2026-10-12&user_id=7");
        assert_eq!(nav.next_href, "/calendar?pantry=2&week=2026-10-26&user_id=7");
        assert_eq!(nav.today_href, "/calendar?pantry=2&week=2026-11-02&user_id=7");
    }

    #[test]
    fn test_role_slot_full_has_no_signup() {
        let role = ShiftRole {
            id: pantry_shifts_core::ShiftRoleId::new(11),
            shift_id: None,
            role_title: "Greeter".to_string(),
            required_count: 10,
            filled_count: 9,
        };
        let slot = RoleSlot::new(&role, UserId::new(1));
        assert_eq!(slot.ratio, "9/10 filled");
        assert_eq!(slot.status_class, "almost-full");
        assert!(!slot.full);
        assert_eq!(slot.signup_action, "/shift-roles/11/signup?user_id=1");

        let full = ShiftRole {
            filled_count: 10,
            ..role
        };
        assert!(RoleSlot::new(&full, UserId::new(1)).full);
    }
}
