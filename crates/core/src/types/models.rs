//! Entities and request payloads exchanged with the scheduling backend.
//!
//! Backends in the wild disagree on field names (`id` vs `shift_id`, `name` vs
//! `pantry_name`), so every entity accepts both spellings through serde
//! aliases and always serializes the short one.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::{PantryId, RoleId, ShiftId, ShiftRoleId, SignupId, UserId};
use super::role::{Capability, RoleName};
use crate::capacity::Capacity;

// =============================================================================
// Entities
// =============================================================================

/// A food pantry offering volunteer shifts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pantry {
    #[serde(alias = "pantry_id")]
    pub id: PantryId,
    #[serde(alias = "pantry_name")]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<UserId>,
    /// Leads assigned through `/api/pantries/{id}/leads`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leads: Vec<LeadUser>,
}

/// Minimal user record embedded in a pantry's lead list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadUser {
    #[serde(alias = "user_id")]
    pub id: UserId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl LeadUser {
    /// Full name when known, email otherwise.
    #[must_use]
    pub fn display_name(&self) -> &str {
        display_name(self.full_name.as_deref(), &self.email)
    }
}

/// A scheduled shift at a pantry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    #[serde(alias = "shift_id")]
    pub id: ShiftId,
    pub pantry_id: PantryId,
    #[serde(alias = "shift_name")]
    pub role_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub required_count: u32,
    #[serde(default)]
    pub filled_count: u32,
    #[serde(default = "default_shift_status")]
    pub status: String,
    #[serde(default, alias = "shift_roles")]
    pub roles: Vec<ShiftRole>,
}

fn default_shift_status() -> String {
    "Open".to_string()
}

impl Shift {
    /// Headcount for the shift as a whole.
    #[must_use]
    pub const fn capacity(&self) -> Capacity {
        Capacity::new(self.required_count, self.filled_count)
    }
}

/// Shift summary returned by `POST /api/pantries/{id}/shifts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedShift {
    #[serde(alias = "shift_id")]
    pub id: ShiftId,
    #[serde(alias = "shift_name")]
    pub role_name: String,
    #[serde(default)]
    pub required_count: u32,
    #[serde(default)]
    pub filled_count: u32,
    #[serde(default = "default_shift_status")]
    pub status: String,
}

/// A named position within a shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRole {
    #[serde(alias = "shift_role_id")]
    pub id: ShiftRoleId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_id: Option<ShiftId>,
    pub role_title: String,
    pub required_count: u32,
    #[serde(default)]
    pub filled_count: u32,
}

impl ShiftRole {
    /// Headcount for this role.
    #[must_use]
    pub const fn capacity(&self) -> Capacity {
        Capacity::new(self.required_count, self.filled_count)
    }
}

/// One volunteer holding one slot of a shift role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signup {
    #[serde(alias = "signup_id")]
    pub id: SignupId,
    pub shift_role_id: ShiftRoleId,
    pub user_id: UserId,
}

/// A dashboard user.
///
/// The wire form carries either `roles: [..]`, a single `role: ".."`, or both.
/// They are merged into one ordered set on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UserWire")]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub roles: BTreeSet<RoleName>,
}

#[derive(Deserialize)]
struct UserWire {
    #[serde(alias = "user_id")]
    id: UserId,
    #[serde(default)]
    email: String,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    roles: Vec<RoleName>,
    #[serde(default)]
    role: Option<RoleName>,
}

impl From<UserWire> for User {
    fn from(wire: UserWire) -> Self {
        let mut roles: BTreeSet<RoleName> = wire.roles.into_iter().collect();
        roles.extend(wire.role);
        Self {
            id: wire.id,
            email: wire.email,
            full_name: wire.full_name.filter(|name| !name.trim().is_empty()),
            roles,
        }
    }
}

impl User {
    /// Capability tier derived from the user's roles.
    #[must_use]
    pub fn capability(&self) -> Capability {
        Capability::from_roles(&self.roles)
    }

    /// Whether the user holds the given role.
    #[must_use]
    pub fn has_role(&self, role: &RoleName) -> bool {
        self.roles.contains(role)
    }

    /// Full name when known, email otherwise.
    #[must_use]
    pub fn display_name(&self) -> &str {
        display_name(self.full_name.as_deref(), &self.email)
    }

    /// Role names joined for display, e.g. `"ADMIN, PANTRY_LEAD"`.
    #[must_use]
    pub fn role_list(&self) -> String {
        self.roles
            .iter()
            .map(RoleName::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn display_name<'a>(full_name: Option<&'a str>, email: &'a str) -> &'a str {
    match full_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => email,
    }
}

/// An assignable role record from `/api/roles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(alias = "role_id")]
    pub id: RoleId,
    #[serde(alias = "role_name")]
    pub name: RoleName,
}

// =============================================================================
// Request payloads
// =============================================================================

/// Body of `POST /api/pantries`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPantry {
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_address: Option<String>,
}

/// Body of `PATCH /api/pantries/{id}`.
///
/// `lead_id: Some(None)` serializes as `"lead_id": null` and clears the lead;
/// `lead_id: None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PantryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<Option<UserId>>,
}

impl PantryPatch {
    /// Patch that sets or clears the pantry lead.
    #[must_use]
    pub fn lead(lead_id: Option<UserId>) -> Self {
        Self {
            lead_id: Some(lead_id),
            ..Self::default()
        }
    }
}

/// Body of `POST /api/pantries/{id}/shifts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewShift {
    pub role_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub required_count: u32,
}

/// Body of `PATCH /api/shifts/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShiftPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Body of `POST /api/shifts/{id}/roles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewShiftRole {
    pub role_title: String,
    pub required_count: u32,
}

/// Body of `PATCH /api/shift-roles/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShiftRolePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_count: Option<u32>,
}

/// Body of `POST /api/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub email: Email,
    pub full_name: String,
}

/// Body of `POST /api/pantries/{id}/leads`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LeadAssignment {
    pub user_id: UserId,
}

/// Body of `POST /api/users/{id}/roles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleAssignment {
    pub role_id: RoleId,
}

/// Body of `POST /api/shift-roles/{id}/signup`.
///
/// Without a `user_id` the backend signs up the identified caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SignupRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}
