//! [`ApiClient`] and the shared request/response plumbing.
//!
//! Endpoint methods live in `crate::endpoints`, one file per resource, each
//! adding an `impl ApiClient` block on top of the helpers here.

use std::sync::Arc;

use pantry_shifts_core::UserId;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// Name of the identity query parameter.
pub const IDENTITY_PARAM: &str = "user_id";

/// Append the identity parameter to `path`, joining with `?` or `&`
/// depending on whether the path already carries a query string.
///
/// ```
/// use pantry_shifts_client::with_identity;
/// use pantry_shifts_core::UserId;
///
/// assert_eq!(with_identity("/api/me", Some(UserId::new(3))), "/api/me?user_id=3");
/// assert_eq!(
///     with_identity("/api/users?role=ADMIN", Some(UserId::new(3))),
///     "/api/users?role=ADMIN&user_id=3"
/// );
/// assert_eq!(with_identity("/api/me", None), "/api/me");
/// ```
#[must_use]
pub fn with_identity(path: &str, user_id: Option<UserId>) -> String {
    match user_id {
        None => path.to_owned(),
        Some(id) => {
            let separator = if path.contains('?') { '&' } else { '?' };
            format!("{path}{separator}{IDENTITY_PARAM}={id}")
        }
    }
}

/// Client for the scheduling backend.
///
/// Cloning is cheap; clones share one connection pool. [`ApiClient::as_user`]
/// returns a clone that forwards a different identity.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
    identity: Option<UserId>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create an anonymous client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("pantry-shifts/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.base_url.clone(),
            }),
            identity: None,
        })
    }

    /// A client that forwards `user_id` on every request.
    #[must_use]
    pub fn as_user(&self, user_id: UserId) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            identity: Some(user_id),
        }
    }

    /// A client that forwards no identity.
    #[must_use]
    pub fn anonymous(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            identity: None,
        }
    }

    /// The identity forwarded on requests, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<UserId> {
        self.identity
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Absolute URL for `path` with the identity merged in.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the result does not parse.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let full = format!("{base}{}", with_identity(path, self.identity));
        Ok(Url::parse(&full)?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path)?;
        tracing::debug!(%method, %url, "api request");
        Ok(self.inner.http.request(method, url))
    }

    /// GET a required JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path)?;
        Self::send(request).await?.ok_or(ApiError::EmptyBody)
    }

    /// GET a JSON list; 204 counts as an empty list.
    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, ApiError> {
        let request = self.request(Method::GET, path)?;
        Ok(Self::send(request).await?.unwrap_or_default())
    }

    /// POST a JSON body; `None` on 204.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, ApiError> {
        let request = self.request(Method::POST, path)?.json(body);
        Self::send(request).await
    }

    /// PATCH a JSON body; `None` on 204.
    pub(crate) async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, ApiError> {
        let request = self.request(Method::PATCH, path)?.json(body);
        Self::send(request).await
    }

    /// POST a JSON body, ignoring any response body.
    pub(crate) async fn post_discard<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let request = self.request(Method::POST, path)?.json(body);
        Self::send_discard(request).await
    }

    /// DELETE, ignoring any response body.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, path)?;
        Self::send_discard(request).await
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<Option<T>, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Self::parse_error(response).await);
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ApiError::Decode(format!("Failed to parse response: {e}")))
    }

    async fn send_discard(request: RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::parse_error(response).await)
    }

    async fn parse_error(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %body, "api request failed");
        ApiError::from_status(status, &body)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig::new(base).unwrap()).unwrap()
    }

    #[test]
    fn test_with_identity_merges_query() {
        let id = Some(UserId::new(12));
        assert_eq!(with_identity("/api/pantries", id), "/api/pantries?user_id=12");
        assert_eq!(
            with_identity("/api/users?role=PANTRY_LEAD", id),
            "/api/users?role=PANTRY_LEAD&user_id=12"
        );
        assert_eq!(with_identity("/api/pantries", None), "/api/pantries");
    }

    #[test]
    fn test_url_keeps_base_path() {
        let api = client("http://127.0.0.1:5000/backend/").as_user(UserId::new(1));
        assert_eq!(
            api.url("/api/me").unwrap().as_str(),
            "http://127.0.0.1:5000/backend/api/me?user_id=1"
        );
    }

    #[test]
    fn test_as_user_and_anonymous_share_base() {
        let api = client("http://localhost:5000");
        let volunteer = api.as_user(UserId::new(7));
        assert_eq!(volunteer.identity(), Some(UserId::new(7)));
        assert_eq!(volunteer.anonymous().identity(), None);
        assert_eq!(
            volunteer.anonymous().url("/api/roles").unwrap().as_str(),
            "http://localhost:5000/api/roles"
        );
    }

    #[test]
    fn test_debug_shows_identity() {
        let api = client("http://localhost:5000").as_user(UserId::new(2));
        let debug = format!("{api:?}");
        assert!(debug.contains("localhost:5000"));
        assert!(debug.contains("UserId(2)"));
    }
}
