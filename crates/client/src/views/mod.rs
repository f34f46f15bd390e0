//! Stateful view controllers shared by the dashboard and the CLI.

pub mod calendar;
pub mod sequence;

pub use calendar::{CalendarView, RefreshOutcome, ShiftSource, choose_pantry};
pub use sequence::{RequestSequence, Ticket};
