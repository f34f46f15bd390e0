//! Pantry Shifts Client - Typed access to the scheduling backend.
//!
//! Wraps every REST endpoint the dashboard and CLI use. The identity of the
//! caller travels as a `user_id` query parameter that is merged onto every
//! request URL; the backend owns all authorization decisions.
//!
//! # Modules
//!
//! - [`client`] - [`ApiClient`] and the request/response plumbing
//! - [`config`] - [`ApiConfig`] loaded from environment variables
//! - [`error`] - [`ApiError`] taxonomy
//! - [`views`] - Stateful view controllers (the weekly calendar)
//!
//! # Example
//!
//! ```no_run
//! use pantry_shifts_client::{ApiClient, ApiConfig};
//! use pantry_shifts_core::UserId;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(&ApiConfig::from_env()?)?.as_user(UserId::new(3));
//! let me = client.me().await?;
//! println!("{} can see {:?}", me.email, me.capability().visible_tabs());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
mod endpoints;
pub mod error;
pub mod views;

pub use client::{ApiClient, with_identity};
pub use config::{ApiConfig, ConfigError};
pub use error::ApiError;
pub use views::{CalendarView, RefreshOutcome, RequestSequence, ShiftSource, Ticket, choose_pantry};
