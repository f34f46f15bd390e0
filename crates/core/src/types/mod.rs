//! Core types for Pantry Shifts.
//!
//! This module provides the entity models exchanged with the scheduling
//! backend plus type-safe wrappers for ids, emails and role names.

pub mod email;
pub mod id;
pub mod models;
pub mod role;

pub use email::{Email, EmailError};
pub use id::*;
pub use models::*;
pub use role::{Capability, InvalidRoleName, RoleName, Tab};
