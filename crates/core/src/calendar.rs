//! Monday-start week math and day bucketing of shifts.
//!
//! Everything here is pure: "today" and the UTC offset used to decide which
//! calendar day a shift falls on are always passed in.
//!
//! ```
//! use chrono::{FixedOffset, NaiveDate};
//! use pantry_shifts_core::{Week, WeekGrid};
//!
//! let anchor = NaiveDate::from_ymd_opt(2026, 10, 25).unwrap(); // a Sunday
//! let week = Week::containing(anchor);
//! assert_eq!(week.start(), NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
//!
//! let grid = WeekGrid::build(week, Vec::new(), FixedOffset::east_opt(0).unwrap());
//! assert_eq!(grid.days().len(), 7);
//! assert!(grid.days().iter().all(|day| day.is_empty()));
//! ```

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Shift;

/// Number of days in a calendar week.
pub const DAYS_PER_WEEK: usize = 7;

/// The most recent Monday on or before `date`.
///
/// A Sunday maps to the Monday six days earlier. Clamped to
/// [`NaiveDate::MIN`] at the start of the supported range.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(back))
        .unwrap_or(NaiveDate::MIN)
}

/// The calendar date of `instant` as seen at `offset`.
#[must_use]
pub fn local_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// Error returned for an unparseable UTC offset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid UTC offset {0:?}, expected a value like +02:00 or -05:30")]
pub struct InvalidOffset(pub String);

/// Parse a UTC offset such as `+02:00`, `-0530`, `Z` or `UTC`.
///
/// # Errors
///
/// Returns [`InvalidOffset`] if the value is not a valid offset.
pub fn parse_offset(value: &str) -> Result<FixedOffset, InvalidOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(|| InvalidOffset(value.to_owned()));
    }
    value
        .parse::<FixedOffset>()
        .map_err(|_| InvalidOffset(value.to_owned()))
}

/// Week navigation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Navigation {
    Prev,
    Next,
    Today,
}

impl std::str::FromStr for Navigation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p" | "prev" | "previous" => Ok(Self::Prev),
            "n" | "next" => Ok(Self::Next),
            "t" | "today" => Ok(Self::Today),
            other => Err(format!("unknown navigation {other:?}")),
        }
    }
}

/// A Monday-start 7-day window.
///
/// Date arithmetic saturates at the ends of chrono's supported range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Week {
    start: NaiveDate,
}

impl Week {
    /// The week containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            start: week_start(date),
        }
    }

    /// Monday of this week.
    #[must_use]
    pub const fn start(self) -> NaiveDate {
        self.start
    }

    /// Sunday of this week.
    #[must_use]
    pub fn end(self) -> NaiveDate {
        self.start
            .checked_add_days(Days::new(6))
            .unwrap_or(NaiveDate::MAX)
    }

    /// The seven dates of the week, Monday first.
    #[must_use]
    pub fn days(self) -> [NaiveDate; DAYS_PER_WEEK] {
        let mut days = [self.start; DAYS_PER_WEEK];
        for (offset, day) in (0_u64..).zip(days.iter_mut()) {
            *day = self
                .start
                .checked_add_days(Days::new(offset))
                .unwrap_or(NaiveDate::MAX);
        }
        days
    }

    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end()
    }

    /// Column index of `date`, if it falls in this week.
    #[must_use]
    pub fn day_index(self, date: NaiveDate) -> Option<usize> {
        let delta = date.signed_duration_since(self.start).num_days();
        usize::try_from(delta)
            .ok()
            .filter(|index| *index < DAYS_PER_WEEK)
    }

    /// The week before, or this week if it is the first representable one.
    #[must_use]
    pub fn previous(self) -> Self {
        self.start
            .checked_sub_days(Days::new(7))
            .map_or(self, |start| Self { start })
    }

    /// The week after, or this week if it is the last representable one.
    #[must_use]
    pub fn next(self) -> Self {
        self.start
            .checked_add_days(Days::new(7))
            .map_or(self, |start| Self { start })
    }

    /// Apply a navigation action. `Today` jumps to the week containing `today`.
    #[must_use]
    pub fn navigate(self, navigation: Navigation, today: NaiveDate) -> Self {
        match navigation {
            Navigation::Prev => self.previous(),
            Navigation::Next => self.next(),
            Navigation::Today => Self::containing(today),
        }
    }

    /// Heading such as `"Oct 19 – Oct 25"`.
    #[must_use]
    pub fn title(self) -> String {
        format!(
            "{} – {}",
            self.start.format("%b %-d"),
            self.end().format("%b %-d")
        )
    }

    /// `YYYY-MM-DD` of the Monday, as used in `?week=` links.
    #[must_use]
    pub fn anchor(self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }
}

/// One day of a [`WeekGrid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayColumn {
    pub date: NaiveDate,
    /// Shifts starting on `date`, ascending by start time.
    pub shifts: Vec<Shift>,
}

impl DayColumn {
    /// Header such as `"Mon, Oct 19"`.
    #[must_use]
    pub fn header(&self) -> String {
        format_day_header(self.date)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }
}

/// Seven day columns of shifts for one week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekGrid {
    week: Week,
    days: Vec<DayColumn>,
}

impl WeekGrid {
    /// Bucket `shifts` into the days of `week`.
    ///
    /// A shift belongs to the day of its start time's local date at `offset`.
    /// Shifts outside the week are dropped. Each day is stable-sorted by start
    /// time, so ties keep their input order.
    #[must_use]
    pub fn build<I>(week: Week, shifts: I, offset: FixedOffset) -> Self
    where
        I: IntoIterator<Item = Shift>,
    {
        let mut days: Vec<DayColumn> = week
            .days()
            .into_iter()
            .map(|date| DayColumn {
                date,
                shifts: Vec::new(),
            })
            .collect();

        for shift in shifts {
            let date = local_date(shift.start_time, offset);
            if let Some(column) = week.day_index(date).and_then(|index| days.get_mut(index)) {
                column.shifts.push(shift);
            }
        }

        for column in &mut days {
            column.shifts.sort_by_key(|shift| shift.start_time);
        }

        Self { week, days }
    }

    #[must_use]
    pub const fn week(&self) -> Week {
        self.week
    }

    #[must_use]
    pub fn days(&self) -> &[DayColumn] {
        &self.days
    }

    /// Total shifts across all seven days.
    #[must_use]
    pub fn shift_count(&self) -> usize {
        self.days.iter().map(|day| day.shifts.len()).sum()
    }

    #[must_use]
    pub fn into_days(self) -> Vec<DayColumn> {
        self.days
    }
}

// =============================================================================
// Formatting
// =============================================================================

/// `"Mon, Oct 19"`.
#[must_use]
pub fn format_day_header(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

/// `"9:00 AM"` in the given offset.
#[must_use]
pub fn format_time(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    instant.with_timezone(&offset).format("%-I:%M %p").to_string()
}

/// `"9:00 AM – 12:00 PM"` in the given offset.
#[must_use]
pub fn format_time_range(start: DateTime<Utc>, end: DateTime<Utc>, offset: FixedOffset) -> String {
    format!("{} – {}", format_time(start, offset), format_time(end, offset))
}

/// `"Sat, Mar 1, 9:00 AM – 12:00 PM"` for lists that span several days.
#[must_use]
pub fn format_date_time_range(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    offset: FixedOffset,
) -> String {
    format!(
        "{}, {}",
        format_day_header(local_date(start, offset)),
        format_time_range(start, end, offset)
    )
}

/// Meta line under a shift title: `"filled / required · status"`.
#[must_use]
pub fn shift_meta(shift: &Shift) -> String {
    format!(
        "{} / {} · {}",
        shift.filled_count, shift.required_count, shift.status
    )
}
