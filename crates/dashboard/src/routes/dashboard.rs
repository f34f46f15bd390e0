//! Dashboard entry point.

use axum::response::Redirect;
use pantry_shifts_core::Tab;
use tracing::instrument;

use crate::components::PageLink;
use crate::middleware::Viewer;

/// `GET /` identifies the viewer and opens the calendar tab.
///
/// Unidentified visitors get the identity error page from [`Viewer`].
#[instrument(skip(viewer), fields(user_id = %viewer.id()))]
pub async fn index(viewer: Viewer) -> Redirect {
    tracing::debug!(tier = viewer.capability().label(), "viewer identified");
    PageLink::new(Tab::Calendar.path()).redirect(viewer.id())
}
