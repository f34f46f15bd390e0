//! Signup capacity of a shift or shift role.

use serde::Serialize;

/// Required and filled headcount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Capacity {
    pub required: u32,
    pub filled: u32,
}

/// Three-tier capacity status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapacityStatus {
    /// No slots remain.
    Full,
    /// Remaining slots are at most 20% of required, rounded up.
    AlmostFull,
    Available,
}

impl CapacityStatus {
    /// CSS class for the status badge.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::AlmostFull => "almost-full",
            Self::Available => "available",
        }
    }

    /// Badge label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Full => "Full",
            Self::AlmostFull => "Almost full",
            Self::Available => "Available",
        }
    }
}

impl std::fmt::Display for CapacityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.css_class())
    }
}

impl Capacity {
    #[must_use]
    pub const fn new(required: u32, filled: u32) -> Self {
        Self { required, filled }
    }

    /// Open slots; never negative.
    #[must_use]
    pub const fn remaining(self) -> u32 {
        self.required.saturating_sub(self.filled)
    }

    /// Fill percentage for a progress bar, rounded and clamped to `0..=100`.
    ///
    /// Zero when nothing is required.
    #[must_use]
    pub fn percent(self) -> u8 {
        if self.required == 0 {
            return 0;
        }
        let percent = (u64::from(self.filled) * 200 + u64::from(self.required))
            / (u64::from(self.required) * 2);
        u8::try_from(percent.min(100)).unwrap_or(100)
    }

    /// Slot count at or below which a role counts as almost full.
    ///
    /// `ceil(required * 0.2)` in integer arithmetic.
    #[must_use]
    pub const fn almost_full_threshold(self) -> u32 {
        self.required.div_ceil(5)
    }

    #[must_use]
    pub const fn status(self) -> CapacityStatus {
        let remaining = self.remaining();
        if self.filled >= self.required {
            CapacityStatus::Full
        } else if remaining <= self.almost_full_threshold() {
            CapacityStatus::AlmostFull
        } else {
            CapacityStatus::Available
        }
    }

    #[must_use]
    pub const fn is_full(self) -> bool {
        matches!(self.status(), CapacityStatus::Full)
    }

    /// `"filled / required"`.
    #[must_use]
    pub fn ratio(self) -> String {
        format!("{} / {}", self.filled, self.required)
    }
}
