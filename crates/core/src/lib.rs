//! Pantry Shifts Core - Shared types and scheduling logic.
//!
//! This crate provides the types and pure logic used across all Pantry Shifts
//! components:
//! - `client` - Typed REST client for the scheduling backend
//! - `dashboard` - Server-rendered dashboard for admins, leads and volunteers
//! - `cli` - Terminal calendar and lookup commands
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no clocks. Anything time-dependent takes "today" or a UTC offset
//! as a parameter so it can be tested in isolation.
//!
//! # Modules
//!
//! - [`types`] - Entity models, type-safe IDs, emails and role names
//! - [`calendar`] - Monday-start week math and day bucketing of shifts
//! - [`capacity`] - Filled/required ratios and the three-tier capacity status
//! - [`validation`] - Form validation with per-field error messages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod calendar;
pub mod capacity;
pub mod types;
pub mod validation;

pub use calendar::{DayColumn, InvalidOffset, Navigation, Week, WeekGrid, parse_offset, week_start};
pub use capacity::{Capacity, CapacityStatus};
pub use types::*;
pub use validation::FieldErrors;
