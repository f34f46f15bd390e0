//! Viewer identification and capability extractors.
//!
//! The dashboard has no sessions. A page is opened as `/calendar?user_id=7`;
//! the extractor forwards that id to `GET /api/me` and the backend decides who
//! the viewer is. Every link and form action the dashboard renders carries the
//! same parameter so the identity survives navigation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{FromRef, FromRequestParts, Query},
    http::{StatusCode, Uri, request::Parts},
    response::{IntoResponse, Response},
};
use pantry_shifts_client::{ApiClient, ApiError};
use pantry_shifts_core::{Capability, Tab, User, UserId};
use serde::Deserialize;

use crate::components::Shell;
use crate::error::{clear_sentry_user, set_sentry_user, upstream_status};
use crate::state::AppState;

const IDENTITY_HINT: &str = "Make sure you include ?user_id=X in the URL";

#[derive(Debug, Deserialize)]
struct IdentityParams {
    user_id: Option<String>,
}

/// Read the `user_id` query parameter from a request URI.
///
/// A missing, blank or non-numeric value counts as no identity.
#[must_use]
pub fn identity_param(uri: &Uri) -> Option<UserId> {
    let Query(params) = Query::<IdentityParams>::try_from_uri(uri).ok()?;
    params.user_id?.parse().ok()
}

/// The identified viewer and a backend client acting for them.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(viewer: Viewer) -> impl IntoResponse {
///     format!("Hello, {}!", viewer.user.display_name())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Viewer {
    pub user: User,
    pub api: ApiClient,
}

impl Viewer {
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.user.id
    }

    #[must_use]
    pub fn capability(&self) -> Capability {
        self.user.capability()
    }

    /// Page shell with `tab` highlighted.
    #[must_use]
    pub fn shell(&self, tab: Tab) -> Shell {
        Shell::new(&self.user, tab)
    }
}

/// Error page shown when the viewer cannot be identified or lacks access.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
    pub hint: Option<&'static str>,
    pub shell: Option<Shell>,
}

/// Error returned when a page needs an identity or a higher tier.
#[derive(Debug)]
pub enum IdentityRejection {
    /// No usable `user_id` parameter.
    Missing,
    /// The backend did not recognize the identity.
    Unrecognized(ApiError),
    /// The viewer is identified but their tier is too low.
    Forbidden { shell: Box<Shell>, required: Capability },
}

impl IdentityRejection {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Missing => StatusCode::UNAUTHORIZED,
            Self::Unrecognized(e) => upstream_status(e),
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        let status = self.status();
        let page = match self {
            Self::Missing => ErrorTemplate {
                title: "Error loading user".to_string(),
                message: "No user was given for this page.".to_string(),
                hint: Some(IDENTITY_HINT),
                shell: None,
            },
            Self::Unrecognized(e) => {
                tracing::warn!(error = %e, "viewer lookup failed");
                ErrorTemplate {
                    title: "Error loading user".to_string(),
                    message: e.user_message(),
                    hint: Some(IDENTITY_HINT),
                    shell: None,
                }
            }
            Self::Forbidden { shell, required } => ErrorTemplate {
                title: "Access denied".to_string(),
                message: format!("{} access is required for this page.", required.label()),
                hint: None,
                shell: Some(*shell),
            },
        };
        (status, page).into_response()
    }
}

impl<S> FromRequestParts<S> for Viewer
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = IdentityRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let user_id = identity_param(&parts.uri).ok_or(IdentityRejection::Missing)?;

        let api = state.api_as(user_id);
        let user = api.me().await.map_err(|e| {
            clear_sentry_user();
            IdentityRejection::Unrecognized(e)
        })?;

        set_sentry_user(user.id, Some(&user.email));
        Ok(Self { user, api })
    }
}

async fn require_capability<S>(
    parts: &mut Parts,
    state: &S,
    required: Capability,
) -> Result<Viewer, IdentityRejection>
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    let viewer = Viewer::from_request_parts(parts, state).await?;
    if viewer.capability().includes(required) {
        Ok(viewer)
    } else {
        tracing::info!(user_id = %viewer.id(), ?required, "capability check failed");
        Err(IdentityRejection::Forbidden {
            shell: Box::new(viewer.shell(Tab::Calendar)),
            required,
        })
    }
}

/// Extractor that requires the shift management tier.
pub struct RequireManagement(pub Viewer);

impl<S> FromRequestParts<S> for RequireManagement
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = IdentityRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require_capability(parts, state, Capability::ShiftManagement)
            .await
            .map(Self)
    }
}

/// Extractor that requires the administration tier.
pub struct RequireAdministration(pub Viewer);

impl<S> FromRequestParts<S> for RequireAdministration
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = IdentityRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require_capability(parts, state, Capability::Administration)
            .await
            .map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pantry_shifts_core::RoleName;

    #[test]
    fn test_identity_param() {
        let uri: Uri = "/calendar?pantry=2&user_id=7".parse().unwrap();
        assert_eq!(identity_param(&uri), Some(UserId::new(7)));
    }

    #[test]
    fn test_identity_param_missing_or_invalid() {
        for raw in ["/calendar", "/calendar?user_id=", "/calendar?user_id=abc"] {
            let uri: Uri = raw.parse().unwrap();
            assert_eq!(identity_param(&uri), None, "{raw}");
        }
    }

    #[test]
    fn test_missing_identity_page_has_hint() {
        let response = IdentityRejection::Missing.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_unrecognized_passes_backend_status() {
        let rejection =
            IdentityRejection::Unrecognized(ApiError::from_status(StatusCode::NOT_FOUND, "User not found"));
        assert_eq!(rejection.status(), StatusCode::NOT_FOUND);

        let rejection = IdentityRejection::Unrecognized(ApiError::EmptyBody);
        assert_eq!(rejection.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_error_template_renders_hint_and_shell() {
        let user = User {
            id: UserId::new(3),
            email: "vol@example.org".to_string(),
            full_name: None,
            roles: std::iter::once(RoleName::Volunteer).collect(),
        };
        let page = ErrorTemplate {
            title: "Access denied".to_string(),
            message: "Administrator access is required for this page.".to_string(),
            hint: Some(IDENTITY_HINT),
            shell: Some(Shell::new(&user, Tab::Calendar)),
        };
        let html = page.render().unwrap();
        assert!(html.contains("Access denied"));
        assert!(html.contains("?user_id=X"));
        assert!(html.contains("vol@example.org"));
    }
}
