//! `week` and `calendar` commands.
//!
//! Both go through [`CalendarView`], so the interactive browser never shows a
//! week whose response arrived after a newer request was made.

use std::io::Write;

use chrono::{FixedOffset, NaiveDate};
use pantry_shifts_client::{CalendarView, RefreshOutcome, choose_pantry};
use pantry_shifts_core::calendar::{format_time_range, shift_meta};
use pantry_shifts_core::{Navigation, PantryId, Shift, WeekGrid};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{CliError, Session, print};

const HELP: &str = "Commands: p (previous week), n (next week), t (this week), q (quit)";

/// A line typed at the calendar prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Move(Navigation),
    Quit,
    Help,
}

impl Input {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if matches!(line.to_ascii_lowercase().as_str(), "q" | "quit" | "exit") {
            return Self::Quit;
        }
        line.parse().map_or(Self::Help, Self::Move)
    }
}

fn render_shift(shift: &Shift, offset: FixedOffset, lines: &mut Vec<String>) {
    lines.push(format!(
        "  {}  {} ({})",
        format_time_range(shift.start_time, shift.end_time, offset),
        shift.role_name,
        shift_meta(shift)
    ));
    if shift.roles.is_empty() {
        lines.push("    No positions available".to_string());
    }
    for role in &shift.roles {
        let capacity = role.capacity();
        lines.push(format!(
            "    {}: {}/{} filled, {}",
            role.role_title,
            capacity.filled,
            capacity.required,
            capacity.status().label()
        ));
    }
}

/// Plain-text rendering of a week: title, then each day with its shifts.
#[must_use]
pub fn render_week(grid: &WeekGrid, offset: FixedOffset) -> String {
    let mut lines = vec![grid.week().title()];
    for day in grid.days() {
        lines.push(day.header());
        if day.is_empty() {
            lines.push("  No shifts".to_string());
        }
        for shift in &day.shifts {
            render_shift(shift, offset, &mut lines);
        }
    }
    lines.join("\n")
}

async fn resolve_pantry(
    session: &Session,
    requested: Option<PantryId>,
) -> Result<Option<PantryId>, CliError> {
    let pantries = session.client.all_pantries().await?;
    if let Some(id) = requested {
        if !pantries.iter().any(|pantry| pantry.id == id) {
            return Err(CliError::UnknownPantry(id));
        }
    }
    Ok(choose_pantry(&pantries, requested))
}

async fn open_view(
    session: &Session,
    pantry: Option<PantryId>,
    date: Option<NaiveDate>,
) -> Result<Option<CalendarView>, CliError> {
    let Some(pantry) = resolve_pantry(session, pantry).await? else {
        print("No pantries available")?;
        return Ok(None);
    };
    let view = CalendarView::new(date.unwrap_or_else(|| session.today()), session.offset);
    view.select_pantry(Some(pantry));
    Ok(Some(view))
}

async fn show(view: &CalendarView, session: &Session) -> Result<(), CliError> {
    match view.refresh(&session.client).await? {
        RefreshOutcome::Applied(grid) => print(&render_week(&grid, view.offset())),
        RefreshOutcome::Stale => {
            tracing::debug!("calendar response superseded");
            Ok(())
        }
        RefreshOutcome::NoPantry => print("No pantries available"),
    }
}

/// Print one week of shifts.
///
/// # Errors
///
/// Returns `CliError` if the pantry is unknown or a request fails.
pub async fn week(
    session: &Session,
    pantry: Option<PantryId>,
    date: Option<NaiveDate>,
) -> Result<(), CliError> {
    match open_view(session, pantry, date).await? {
        Some(view) => show(&view, session).await,
        None => Ok(()),
    }
}

fn prompt() -> Result<(), CliError> {
    let mut out = std::io::stdout().lock();
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}

/// Browse weeks from stdin until `q` or end of input.
///
/// Fetch errors after the first week are printed and browsing continues.
///
/// # Errors
///
/// Returns `CliError` if the first week cannot be loaded or stdin fails.
pub async fn interactive(
    session: &Session,
    pantry: Option<PantryId>,
    date: Option<NaiveDate>,
) -> Result<(), CliError> {
    let Some(view) = open_view(session, pantry, date).await? else {
        return Ok(());
    };
    show(&view, session).await?;
    print(HELP)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;
    while let Some(line) = lines.next_line().await? {
        match Input::parse(&line) {
            Input::Move(navigation) => {
                let week = view.navigate(navigation, session.today());
                tracing::debug!(week = %week.anchor(), "navigated");
                if let Err(e) = show(&view, session).await {
                    print(&format!("Error: {e}"))?;
                }
            }
            Input::Quit => break,
            Input::Help => print(HELP)?,
        }
        prompt()?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pantry_shifts_core::{ShiftId, ShiftRole, ShiftRoleId, Week};

    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn shift(day: u32, roles: Vec<ShiftRole>) -> Shift {
        Shift {
            id: ShiftId::new(1),
            pantry_id: PantryId::new(2),
            role_name: "Sorting".to_string(),
            start_time: Utc.with_ymd_and_hms(2026, 10, day, 9, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2026, 10, day, 12, 0, 0).unwrap(),
            required_count: 5,
            filled_count: 3,
            status: "Open".to_string(),
            roles,
        }
    }

    #[test]
    fn test_input_parse() {
        assert_eq!(Input::parse("p"), Input::Move(Navigation::Prev));
        assert_eq!(Input::parse(" Next\n"), Input::Move(Navigation::Next));
        assert_eq!(Input::parse("t"), Input::Move(Navigation::Today));
        assert_eq!(Input::parse("q"), Input::Quit);
        assert_eq!(Input::parse("?"), Input::Help);
    }

    #[test]
    fn test_render_week() {
        let week = Week::containing(NaiveDate::from_ymd_opt(2026, 10, 21).unwrap());
        let greeter = ShiftRole {
            id: ShiftRoleId::new(4),
            shift_id: Some(ShiftId::new(1)),
            role_title: "Greeter".to_string(),
            required_count: 5,
            filled_count: 4,
        };
        let grid = WeekGrid::build(
            week,
            vec![shift(20, vec![greeter]), shift(22, Vec::new())],
            utc(),
        );

        let text = render_week(&grid, utc());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Oct 19 – Oct 25");
        assert_eq!(lines[1], "Mon, Oct 19");
        assert_eq!(lines[2], "  No shifts");
        assert_eq!(lines[3], "Tue, Oct 20");
        assert_eq!(lines[4], "  9:00 AM – 12:00 PM  Sorting (3 / 5 · Open)");
        assert_eq!(lines[5], "    Greeter: 4/5 filled, Almost full");
        assert_eq!(lines[6], "Wed, Oct 21");
        assert_eq!(lines[7], "  No shifts");
        assert_eq!(lines[9], "  9:00 AM – 12:00 PM  Sorting (3 / 5 · Open)");
        assert_eq!(lines[10], "    No positions available");
        assert_eq!(lines.len(), 17);
    }
}
