//! Integration tests for the calendar controller over real HTTP.
//!
//! The fake backend can hold a pantry's shift listing, which lets these tests
//! reorder responses and check that only the newest request is applied.

use std::time::Duration;

use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use pantry_shifts_client::{CalendarView, RefreshOutcome};
use pantry_shifts_core::{Navigation, RoleName};
use pantry_shifts_integration_tests::FakeBackend;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

#[tokio::test]
async fn test_slow_response_for_previous_pantry_is_discarded() {
    let backend = FakeBackend::start().await;
    let volunteer = backend.add_user("vol@example.org", "Sam", &[RoleName::Volunteer]);
    let slow = backend.add_pantry("Slow", "slow");
    let fast = backend.add_pantry("Fast", "fast");
    backend.add_shift(slow, "Slow shift", Utc.with_ymd_and_hms(2026, 10, 20, 9, 0, 0).unwrap(), 2);
    backend.add_shift(fast, "Fast shift", Utc.with_ymd_and_hms(2026, 10, 21, 9, 0, 0).unwrap(), 2);
    backend.delay_shifts(slow, Duration::from_millis(300));

    let client = backend.client().as_user(volunteer);
    let view = CalendarView::new(date(2026, 10, 21), utc());
    view.select_pantry(Some(slow));

    let (first, second) = tokio::join!(view.refresh(&client), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        view.select_pantry(Some(fast));
        view.refresh(&client).await
    });

    assert_eq!(first.unwrap(), RefreshOutcome::Stale);
    let RefreshOutcome::Applied(grid) = second.unwrap() else {
        panic!("newest refresh should apply");
    };
    assert_eq!(grid.shift_count(), 1);
    assert_eq!(grid.days()[2].shifts[0].role_name, "Fast shift");

    // The late response must not have overwritten the displayed grid.
    let shown = view.grid().expect("grid applied");
    assert_eq!(shown, grid);
    assert_eq!(view.pantry(), Some(fast));
}

#[tokio::test]
async fn test_navigation_rebuilds_for_new_week() {
    let backend = FakeBackend::start().await;
    let volunteer = backend.add_user("vol@example.org", "Sam", &[RoleName::Volunteer]);
    let pantry = backend.add_pantry("Eastside", "eastside");
    backend.add_shift(pantry, "This week", Utc.with_ymd_and_hms(2026, 10, 23, 9, 0, 0).unwrap(), 2);
    backend.add_shift(pantry, "Next week", Utc.with_ymd_and_hms(2026, 10, 27, 9, 0, 0).unwrap(), 2);

    let client = backend.client().as_user(volunteer);
    let view = CalendarView::new(date(2026, 10, 21), utc());
    view.select_pantry(Some(pantry));

    let RefreshOutcome::Applied(grid) = view.refresh(&client).await.unwrap() else {
        panic!("refresh should apply");
    };
    assert_eq!(grid.shift_count(), 1);
    assert_eq!(grid.days()[4].shifts[0].role_name, "This week");

    let week = view.navigate(Navigation::Next, date(2026, 10, 21));
    assert_eq!(week.start(), date(2026, 10, 26));
    let RefreshOutcome::Applied(grid) = view.refresh(&client).await.unwrap() else {
        panic!("refresh should apply");
    };
    assert_eq!(grid.shift_count(), 1);
    assert_eq!(grid.days()[1].shifts[0].role_name, "Next week");

    view.navigate(Navigation::Today, date(2026, 10, 21));
    assert_eq!(view.week().start(), date(2026, 10, 19));
}

#[tokio::test]
async fn test_refresh_without_pantry_fetches_nothing() {
    let backend = FakeBackend::start().await;
    let client = backend.client();
    let view = CalendarView::new(date(2026, 10, 21), utc());

    assert_eq!(view.refresh(&client).await.unwrap(), RefreshOutcome::NoPantry);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_fetch_error_surfaces_when_current() {
    let backend = FakeBackend::start().await;
    let client = backend.client();
    let view = CalendarView::new(date(2026, 10, 21), utc());
    view.select_pantry(Some(pantry_shifts_core::PantryId::new(404)));

    let err = view.refresh(&client).await.expect_err("unknown pantry");
    assert_eq!(err.user_message(), "Pantry not found");
    assert!(view.grid().is_none());
}
