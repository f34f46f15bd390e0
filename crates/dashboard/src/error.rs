//! Unified error handling for the dashboard.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pantry_shifts_client::ApiError;
use pantry_shifts_core::UserId;
use thiserror::Error;

/// Application-level error type for the dashboard.
#[derive(Debug, Error)]
pub enum AppError {
    /// Scheduling backend call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// No dashboard page at this path.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Status the dashboard answers with when a backend call fails.
///
/// Backend 4xx answers pass through; everything else is a bad gateway.
#[must_use]
pub fn upstream_status(error: &ApiError) -> StatusCode {
    match error.status() {
        Some(status) if status.is_client_error() => status,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl AppError {
    /// HTTP status code for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Api(e) => upstream_status(e),
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Message safe to show the viewer.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Api(e) if upstream_status(e).is_client_error() => e.user_message(),
            Self::Api(_) => "External service error".to_string(),
            Self::NotFound(_) => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Dashboard request error"
            );
        }

        (status, self.public_message()).into_response()
    }
}

/// Set the Sentry user context for the identified viewer.
pub fn set_sentry_user(user_id: UserId, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
