//! Reusable view components shared by every dashboard page.

pub mod flash;
pub mod nav;

pub use flash::{PageLink, StatusKind, StatusMessage, StatusQuery};
pub use nav::{NavTab, Shell};
