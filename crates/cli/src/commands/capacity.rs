//! `capacity` command.

use pantry_shifts_core::Capacity;

use super::{CliError, print};

/// One-line summary such as `"8 / 10 filled (80%) - Almost full, 2 remaining"`.
#[must_use]
pub fn summary(capacity: Capacity) -> String {
    format!(
        "{} filled ({}%) - {}, {} remaining",
        capacity.ratio(),
        capacity.percent(),
        capacity.status().label(),
        capacity.remaining()
    )
}

/// Print the capacity status of a role.
///
/// # Errors
///
/// Returns `CliError::Io` if stdout cannot be written.
pub fn show(required: u32, filled: u32) -> Result<(), CliError> {
    print(&summary(Capacity::new(required, filled)))
}
