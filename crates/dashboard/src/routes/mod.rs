//! HTTP route handlers for the dashboard.
//!
//! Every identified route takes `?user_id=X`; links and form actions rendered
//! by the dashboard carry it along.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Health check (see crate::app)
//!
//! # Shell
//! GET  /                                    - Identify viewer, open calendar
//!
//! # Calendar (any tier)
//! GET  /calendar?pantry=&week=              - Weekly calendar
//! POST /shift-roles/{id}/signup             - Sign up for a role
//! GET  /signups                             - My sign-ups
//! POST /signups/{id}/cancel                 - Cancel a sign-up
//!
//! # Shift management (pantry lead or admin)
//! GET  /shifts?pantry=                      - Shifts of a pantry
//! POST /shifts                              - Create shift
//! POST /shifts/{id}/delete                  - Delete shift
//! POST /shifts/{id}/roles                   - Add role to shift
//! POST /shift-roles/{id}/delete             - Remove role
//!
//! # Administration (admin)
//! GET  /admin/pantries                      - Pantries and leads
//! POST /admin/pantries                      - Create pantry
//! POST /admin/pantries/{id}                 - Update pantry
//! POST /admin/pantries/{id}/delete          - Delete pantry
//! POST /admin/pantries/{id}/lead            - Set or clear primary lead
//! POST /admin/leads                         - Add lead to pantry
//! POST /admin/leads/remove                  - Remove lead from pantry
//! GET  /admin/users?role=                   - Users
//! POST /admin/users                         - Create user
//! POST /admin/users/{id}/roles              - Grant role
//! POST /admin/users/{id}/roles/{role_id}/delete - Revoke role
//!
//! # Public (no identity)
//! GET  /pantries/{slug}/shifts              - Upcoming shifts of a pantry
//! ```

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub mod calendar;
pub mod dashboard;
pub mod pantries;
pub mod public;
pub mod shifts;
pub mod signups;
pub mod users;

/// Build the dashboard router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .merge(calendar_routes())
        .merge(shift_routes())
        .nest("/admin", admin_routes())
        .route("/pantries/{slug}/shifts", get(public::shifts))
}

/// Calendar and sign-up routes.
fn calendar_routes() -> Router<AppState> {
    Router::new()
        .route("/calendar", get(calendar::index))
        .route("/shift-roles/{id}/signup", post(signups::sign_up))
        .route("/signups", get(signups::index))
        .route("/signups/{id}/cancel", post(signups::cancel))
}

/// Shift management routes.
fn shift_routes() -> Router<AppState> {
    Router::new()
        .route("/shifts", get(shifts::index).post(shifts::create))
        .route("/shifts/{id}/delete", post(shifts::delete))
        .route("/shifts/{id}/roles", post(shifts::add_role))
        .route("/shift-roles/{id}/delete", post(shifts::delete_role))
}

/// Administration routes.
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/pantries", get(pantries::index).post(pantries::create))
        .route("/pantries/{id}", post(pantries::update))
        .route("/pantries/{id}/delete", post(pantries::delete))
        .route("/pantries/{id}/lead", post(pantries::set_lead))
        .route("/leads", post(pantries::assign_lead))
        .route("/leads/remove", post(pantries::remove_lead))
        .route("/users", get(users::index).post(users::create))
        .route("/users/{id}/roles", post(users::assign_role))
        .route("/users/{id}/roles/{role_id}/delete", post(users::remove_role))
}
