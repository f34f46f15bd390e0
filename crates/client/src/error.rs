//! Errors returned by [`crate::ApiClient`].

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the scheduling backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, timeout or other transport failure.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    ///
    /// `message` is the response body, or the status reason when the body is
    /// empty.
    #[error("API error: {status} - {message}")]
    Status { status: StatusCode, message: String },

    /// The response body was not the expected JSON.
    #[error("Parse error: {0}")]
    Decode(String),

    /// The backend answered 204 where a body was required.
    #[error("Empty response body")]
    EmptyBody,

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Build a status error from a response body, falling back to the
    /// canonical reason for an empty body.
    #[must_use]
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            status
                .canonical_reason()
                .map_or_else(|| status.as_u16().to_string(), str::to_owned)
        } else {
            body.to_owned()
        };
        Self::Status { status, message }
    }

    /// HTTP status when the backend answered.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Text shown to dashboard and CLI users.
    ///
    /// Backend messages are shown verbatim; transport details are not.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            Self::Transport(e) if e.is_timeout() => {
                "The scheduling service took too long to respond".to_string()
            }
            Self::Transport(_) => "Could not reach the scheduling service".to_string(),
            Self::Decode(_) | Self::EmptyBody => {
                "The scheduling service sent an unexpected response".to_string()
            }
            Self::InvalidUrl(_) => "Invalid request".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_uses_body() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"error":"Invalid lead_id"}"#);
        assert_eq!(err.user_message(), r#"{"error":"Invalid lead_id"}"#);
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_status_error_falls_back_to_reason() {
        let err = ApiError::from_status(StatusCode::FORBIDDEN, "  \n");
        assert_eq!(err.user_message(), "Forbidden");
        assert_eq!(err.to_string(), "API error: 403 Forbidden - Forbidden");
    }

    #[test]
    fn test_not_found() {
        assert!(ApiError::from_status(StatusCode::NOT_FOUND, "").is_not_found());
        assert!(!ApiError::EmptyBody.is_not_found());
    }

    #[test]
    fn test_decode_message_hides_details() {
        let err = ApiError::Decode("expected value at line 1 column 1".to_string());
        assert_eq!(
            err.user_message(),
            "The scheduling service sent an unexpected response"
        );
    }
}
