//! User and role assignment endpoints.

use pantry_shifts_core::{NewUser, RoleAssignment, RoleId, RoleName, User, UserId};
use tracing::instrument;

use super::UserEnvelope;
use crate::{ApiClient, ApiError};

impl ApiClient {
    /// Users, optionally only those holding `role`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_users(&self, role: Option<&RoleName>) -> Result<Vec<User>, ApiError> {
        let path = match role {
            Some(role) => format!("/api/users?role={}", urlencoding::encode(role.as_str())),
            None => "/api/users".to_string(),
        };
        self.get_list(&path).await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn create_user(&self, user: &NewUser) -> Result<Option<User>, ApiError> {
        let envelope: Option<UserEnvelope> = self.post("/api/users", user).await?;
        Ok(envelope.map(User::from))
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id, role_id = %assignment.role_id))]
    pub async fn assign_role(
        &self,
        user_id: UserId,
        assignment: RoleAssignment,
    ) -> Result<(), ApiError> {
        self.post_discard(&format!("/api/users/{user_id}/roles"), &assignment)
            .await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id, role_id = %role_id))]
    pub async fn remove_role(&self, user_id: UserId, role_id: RoleId) -> Result<(), ApiError> {
        self.delete(&format!("/api/users/{user_id}/roles/{role_id}"))
            .await
    }
}
