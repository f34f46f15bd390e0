//! Transient status messages and identity-preserving page links.
//!
//! A panel action ends in a redirect back to its page. The outcome travels
//! in the `status` and `kind` query parameters of that redirect, and the
//! stylesheet fades the message out after a few seconds.

use std::fmt::Display;

use axum::response::Redirect;
use pantry_shifts_client::{ApiError, with_identity};
use pantry_shifts_core::UserId;
use serde::Deserialize;

/// Visual kind of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
    Info,
}

impl StatusKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }

    /// Lenient parse; unknown kinds render as info.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "success" => Self::Success,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }
}

/// A one-shot message shown above a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

impl StatusMessage {
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Success,
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Error,
        }
    }

    /// `"Error: <message>"` for a failed backend call.
    #[must_use]
    pub fn failure(error: &ApiError) -> Self {
        Self::error(format!("Error: {}", error.user_message()))
    }

    /// CSS classes for the message element.
    #[must_use]
    pub fn css_class(&self) -> String {
        format!("message message-{} show", self.kind.as_str())
    }
}

/// Status parameters read back from a redirect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
    pub kind: Option<String>,
}

impl StatusQuery {
    #[must_use]
    pub fn message(&self) -> Option<StatusMessage> {
        let text = self.status.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        Some(StatusMessage {
            text: text.to_owned(),
            kind: self
                .kind
                .as_deref()
                .map_or(StatusKind::Info, StatusKind::parse),
        })
    }
}

/// A dashboard URL with query parameters; the viewer's identity is merged
/// in last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    path: String,
    params: Vec<(String, String)>,
}

impl PageLink {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, key: &str, value: impl Display) -> Self {
        self.params.push((key.to_owned(), value.to_string()));
        self
    }

    /// Add the parameter only when a value is present.
    #[must_use]
    pub fn maybe_param(self, key: &str, value: Option<impl Display>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    #[must_use]
    pub fn status(self, message: &StatusMessage) -> Self {
        self.param("status", &message.text)
            .param("kind", message.kind.as_str())
    }

    /// Relative URL carrying the viewer's identity.
    #[must_use]
    pub fn href(&self, viewer: UserId) -> String {
        with_identity(&self.unidentified(), Some(viewer))
    }

    /// Relative URL without an identity, for public pages.
    #[must_use]
    pub fn unidentified(&self) -> String {
        if self.params.is_empty() {
            return self.path.clone();
        }
        let query = self
            .params
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", self.path)
    }

    /// 303 redirect to this page as `viewer`.
    #[must_use]
    pub fn redirect(&self, viewer: UserId) -> Redirect {
        Redirect::to(&self.href(viewer))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_href_merges_identity_last() {
        let link = PageLink::new("/shifts").param("pantry", 4);
        assert_eq!(link.href(UserId::new(9)), "/shifts?pantry=4&user_id=9");
        assert_eq!(PageLink::new("/calendar").href(UserId::new(9)), "/calendar?user_id=9");
    }

    #[test]
    fn test_status_is_encoded() {
        let link = PageLink::new("/admin/pantries")
            .status(&StatusMessage::success("Pantry created successfully!"));
        assert_eq!(
            link.href(UserId::new(1)),
            "/admin/pantries?status=Pantry%20created%20successfully%21&kind=success&user_id=1"
        );
    }

    #[test]
    fn test_maybe_param_skips_none() {
        let link = PageLink::new("/calendar").maybe_param("pantry", None::<i32>);
        assert_eq!(link.unidentified(), "/calendar");
    }

    #[test]
    fn test_status_query_round_trip() {
        let query = StatusQuery {
            status: Some("Lead removed successfully!".to_string()),
            kind: Some("success".to_string()),
        };
        let message = query.message().unwrap();
        assert_eq!(message.kind, StatusKind::Success);
        assert_eq!(message.css_class(), "message message-success show");
    }

    #[test]
    fn test_status_query_blank_is_none() {
        let query = StatusQuery {
            status: Some("   ".to_string()),
            kind: Some("error".to_string()),
        };
        assert!(query.message().is_none());
        assert!(StatusQuery::default().message().is_none());
    }

    #[test]
    fn test_unknown_kind_is_info() {
        assert_eq!(StatusKind::parse("celebrate"), StatusKind::Info);
    }

    #[test]
    fn test_failure_prefixes_error() {
        let err = ApiError::from_status(StatusCode::CONFLICT, "Role is full");
        let message = StatusMessage::failure(&err);
        assert_eq!(message.text, "Error: Role is full");
        assert_eq!(message.kind, StatusKind::Error);
    }

    #[test]
    fn test_redirect_is_see_other() {
        use axum::response::IntoResponse;
        let response = PageLink::new("/signups").redirect(UserId::new(2)).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/signups?user_id=2"
        );
    }
}
