//! Identity, role catalogue and pantry administration endpoints.

use pantry_shifts_core::{
    LeadAssignment, NewPantry, Pantry, PantryId, PantryPatch, Role, User, UserId,
};
use tracing::instrument;

use crate::{ApiClient, ApiError};

impl ApiClient {
    /// The user identified by the forwarded `user_id`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or no identity is known to the
    /// backend.
    #[instrument(skip(self), fields(user_id = ?self.identity()))]
    pub async fn me(&self) -> Result<User, ApiError> {
        self.get("/api/me").await
    }

    /// Roles that can be granted to users.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_roles(&self) -> Result<Vec<Role>, ApiError> {
        self.get_list("/api/roles").await
    }

    /// Pantries visible to the current user (all of them for admins, the ones
    /// they lead for pantry leads).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self), fields(user_id = ?self.identity()))]
    pub async fn list_pantries(&self) -> Result<Vec<Pantry>, ApiError> {
        self.get_list("/api/pantries").await
    }

    /// Every pantry regardless of the caller's leads.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn all_pantries(&self) -> Result<Vec<Pantry>, ApiError> {
        self.get_list("/api/all_pantries").await
    }

    /// # Errors
    ///
    /// Returns error if the pantry is not found or the request fails.
    #[instrument(skip(self), fields(pantry_id = %id))]
    pub async fn get_pantry(&self, id: PantryId) -> Result<Pantry, ApiError> {
        self.get(&format!("/api/pantries/{id}")).await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self, pantry), fields(name = %pantry.name))]
    pub async fn create_pantry(&self, pantry: &NewPantry) -> Result<Option<Pantry>, ApiError> {
        self.post("/api/pantries", pantry).await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self, patch), fields(pantry_id = %id))]
    pub async fn update_pantry(
        &self,
        id: PantryId,
        patch: &PantryPatch,
    ) -> Result<Option<Pantry>, ApiError> {
        self.patch(&format!("/api/pantries/{id}"), patch).await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self), fields(pantry_id = %id))]
    pub async fn delete_pantry(&self, id: PantryId) -> Result<(), ApiError> {
        self.delete(&format!("/api/pantries/{id}")).await
    }

    /// Set the pantry's primary lead, or clear it with `None`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self), fields(pantry_id = %id))]
    pub async fn set_pantry_lead(
        &self,
        id: PantryId,
        lead_id: Option<UserId>,
    ) -> Result<Option<Pantry>, ApiError> {
        self.update_pantry(id, &PantryPatch::lead(lead_id)).await
    }

    /// Add a lead to the pantry's lead list.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self), fields(pantry_id = %id, lead_id = %assignment.user_id))]
    pub async fn add_pantry_lead(
        &self,
        id: PantryId,
        assignment: LeadAssignment,
    ) -> Result<(), ApiError> {
        self.post_discard(&format!("/api/pantries/{id}/leads"), &assignment)
            .await
    }

    /// Remove a lead from the pantry's lead list.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self), fields(pantry_id = %id, lead_id = %user_id))]
    pub async fn remove_pantry_lead(&self, id: PantryId, user_id: UserId) -> Result<(), ApiError> {
        self.delete(&format!("/api/pantries/{id}/leads/{user_id}"))
            .await
    }
}
