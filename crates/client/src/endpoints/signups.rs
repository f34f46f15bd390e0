//! Signup endpoints.

use pantry_shifts_core::{ShiftRoleId, Signup, SignupId, SignupRequest, UserId};
use tracing::instrument;

use super::SignupEnvelope;
use crate::{ApiClient, ApiError};

impl ApiClient {
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self), fields(shift_role_id = %shift_role_id))]
    pub async fn list_role_signups(
        &self,
        shift_role_id: ShiftRoleId,
    ) -> Result<Vec<Signup>, ApiError> {
        self.get_list(&format!("/api/shift-roles/{shift_role_id}/signups"))
            .await
    }

    /// Sign up for one slot of a shift role.
    ///
    /// An empty request signs up the identified caller.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails (typically 400 or 409 when the role
    /// is already full).
    #[instrument(skip(self), fields(shift_role_id = %shift_role_id, user_id = ?self.identity()))]
    pub async fn sign_up(
        &self,
        shift_role_id: ShiftRoleId,
        request: SignupRequest,
    ) -> Result<Option<Signup>, ApiError> {
        let envelope: Option<SignupEnvelope> = self
            .post(&format!("/api/shift-roles/{shift_role_id}/signup"), &request)
            .await?;
        Ok(envelope.map(Signup::from))
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self), fields(signup_id = %id))]
    pub async fn cancel_signup(&self, id: SignupId) -> Result<(), ApiError> {
        self.delete(&format!("/api/signups/{id}")).await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn user_signups(&self, user_id: UserId) -> Result<Vec<Signup>, ApiError> {
        self.get_list(&format!("/api/users/{user_id}/signups")).await
    }
}
