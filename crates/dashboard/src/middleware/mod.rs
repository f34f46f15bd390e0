//! Request extractors for the dashboard.
//!
//! The layer stack itself (Sentry, tracing, static files) is assembled in
//! [`crate::app`]; this module holds the per-handler identity checks.

pub mod identity;

pub use identity::{
    IdentityRejection, RequireAdministration, RequireManagement, Viewer, identity_param,
};
