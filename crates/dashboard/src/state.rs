//! Application state shared across handlers.

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, Utc};
use pantry_shifts_client::{ApiClient, ApiError};
use pantry_shifts_core::UserId;

use crate::config::DashboardConfig;

/// Application state shared across all handlers.
///
/// Immutable after startup; every request builds its own view from fresh
/// backend data.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: DashboardConfig,
    api: ApiClient,
}

impl AppState {
    /// Create application state and the shared backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: DashboardConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { config, api }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    /// Backend client without an identity.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Backend client acting for `user_id`.
    #[must_use]
    pub fn api_as(&self, user_id: UserId) -> ApiClient {
        self.inner.api.as_user(user_id)
    }

    #[must_use]
    pub fn utc_offset(&self) -> FixedOffset {
        self.inner.config.utc_offset()
    }

    /// Today's date in the configured offset.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.utc_offset()).date_naive()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("api", &self.inner.api)
            .finish_non_exhaustive()
    }
}
