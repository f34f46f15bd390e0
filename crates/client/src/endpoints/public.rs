//! Unauthenticated pantry pages.

use pantry_shifts_core::Shift;
use tracing::instrument;

use crate::{ApiClient, ApiError};

impl ApiClient {
    /// Shifts of the pantry with `slug`. Unknown slugs yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn public_shifts(&self, slug: &str) -> Result<Vec<Shift>, ApiError> {
        self.get_list(&format!(
            "/api/public/pantries/{}/shifts",
            urlencoding::encode(slug)
        ))
        .await
    }
}
