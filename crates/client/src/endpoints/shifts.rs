//! Shift and shift-role endpoints.

use pantry_shifts_core::{
    CreatedShift, NewShift, NewShiftRole, PantryId, Shift, ShiftId, ShiftPatch, ShiftRole,
    ShiftRoleId, ShiftRolePatch,
};
use tracing::instrument;

use crate::{ApiClient, ApiError};

impl ApiClient {
    /// All shifts of a pantry. The backend does no date filtering.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails (403 when the caller cannot see the
    /// pantry).
    #[instrument(skip(self), fields(pantry_id = %pantry_id, user_id = ?self.identity()))]
    pub async fn list_shifts(&self, pantry_id: PantryId) -> Result<Vec<Shift>, ApiError> {
        self.get_list(&format!("/api/pantries/{pantry_id}/shifts"))
            .await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self, shift), fields(pantry_id = %pantry_id, role_name = %shift.role_name))]
    pub async fn create_shift(
        &self,
        pantry_id: PantryId,
        shift: &NewShift,
    ) -> Result<Option<CreatedShift>, ApiError> {
        self.post(&format!("/api/pantries/{pantry_id}/shifts"), shift)
            .await
    }

    /// # Errors
    ///
    /// Returns error if the shift is not found or the request fails.
    #[instrument(skip(self), fields(shift_id = %id))]
    pub async fn get_shift(&self, id: ShiftId) -> Result<Shift, ApiError> {
        self.get(&format!("/api/shifts/{id}")).await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self, patch), fields(shift_id = %id))]
    pub async fn update_shift(
        &self,
        id: ShiftId,
        patch: &ShiftPatch,
    ) -> Result<Option<Shift>, ApiError> {
        self.patch(&format!("/api/shifts/{id}"), patch).await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self), fields(shift_id = %id))]
    pub async fn delete_shift(&self, id: ShiftId) -> Result<(), ApiError> {
        self.delete(&format!("/api/shifts/{id}")).await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self), fields(shift_id = %shift_id))]
    pub async fn list_shift_roles(&self, shift_id: ShiftId) -> Result<Vec<ShiftRole>, ApiError> {
        self.get_list(&format!("/api/shifts/{shift_id}/roles")).await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self, role), fields(shift_id = %shift_id, role_title = %role.role_title))]
    pub async fn create_shift_role(
        &self,
        shift_id: ShiftId,
        role: &NewShiftRole,
    ) -> Result<Option<ShiftRole>, ApiError> {
        self.post(&format!("/api/shifts/{shift_id}/roles"), role)
            .await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self, patch), fields(shift_role_id = %id))]
    pub async fn update_shift_role(
        &self,
        id: ShiftRoleId,
        patch: &ShiftRolePatch,
    ) -> Result<Option<ShiftRole>, ApiError> {
        self.patch(&format!("/api/shift-roles/{id}"), patch).await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self), fields(shift_role_id = %id))]
    pub async fn delete_shift_role(&self, id: ShiftRoleId) -> Result<(), ApiError> {
        self.delete(&format!("/api/shift-roles/{id}")).await
    }
}
