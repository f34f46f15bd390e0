//! Weekly calendar controller.
//!
//! Holds the view state (pantry, week, offset) as explicit fields and applies
//! fetched shifts only when they answer the most recently issued request.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{FixedOffset, NaiveDate};
use pantry_shifts_core::{Navigation, Pantry, PantryId, Shift, Week, WeekGrid};

use super::sequence::{RequestSequence, Ticket};
use crate::{ApiClient, ApiError};

/// Anything that can list a pantry's shifts.
pub trait ShiftSource {
    fn shifts_for(
        &self,
        pantry_id: PantryId,
    ) -> impl Future<Output = Result<Vec<Shift>, ApiError>> + Send;
}

impl ShiftSource for ApiClient {
    fn shifts_for(
        &self,
        pantry_id: PantryId,
    ) -> impl Future<Output = Result<Vec<Shift>, ApiError>> + Send {
        self.list_shifts(pantry_id)
    }
}

/// Pick the pantry to show: `requested` if the user can see it, otherwise the
/// first visible pantry. `None` when there are no pantries.
#[must_use]
pub fn choose_pantry(pantries: &[Pantry], requested: Option<PantryId>) -> Option<PantryId> {
    requested
        .filter(|id| pantries.iter().any(|pantry| pantry.id == *id))
        .or_else(|| pantries.first().map(|pantry| pantry.id))
}

/// Result of [`CalendarView::refresh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response was current and is now the displayed grid.
    Applied(WeekGrid),
    /// A newer request was issued while this one was in flight.
    Stale,
    /// No pantry is selected; nothing was fetched.
    NoPantry,
}

#[derive(Debug)]
struct CalendarState {
    pantry: Option<PantryId>,
    week: Week,
    grid: Option<WeekGrid>,
    applied: Option<Ticket>,
}

/// Controller for one weekly calendar.
#[derive(Debug)]
pub struct CalendarView {
    offset: FixedOffset,
    sequence: RequestSequence,
    state: Mutex<CalendarState>,
}

impl CalendarView {
    /// A view of the week containing `anchor` with no pantry selected.
    #[must_use]
    pub fn new(anchor: NaiveDate, offset: FixedOffset) -> Self {
        Self {
            offset,
            sequence: RequestSequence::new(),
            state: Mutex::new(CalendarState {
                pantry: None,
                week: Week::containing(anchor),
                grid: None,
                applied: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CalendarState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    #[must_use]
    pub fn pantry(&self) -> Option<PantryId> {
        self.lock().pantry
    }

    #[must_use]
    pub fn week(&self) -> Week {
        self.lock().week
    }

    /// The last applied grid.
    #[must_use]
    pub fn grid(&self) -> Option<WeekGrid> {
        self.lock().grid.clone()
    }

    /// Ticket of the last applied response.
    #[must_use]
    pub fn applied_ticket(&self) -> Option<Ticket> {
        self.lock().applied
    }

    /// Switch pantries. The current grid is cleared since it belongs to the
    /// previous pantry.
    pub fn select_pantry(&self, pantry: Option<PantryId>) {
        let mut state = self.lock();
        if state.pantry != pantry {
            state.pantry = pantry;
            state.grid = None;
        }
    }

    /// Move the week anchor and return the new week.
    pub fn navigate(&self, navigation: Navigation, today: NaiveDate) -> Week {
        let mut state = self.lock();
        state.week = state.week.navigate(navigation, today);
        state.week
    }

    /// Fetch the selected pantry's shifts and rebuild the grid.
    ///
    /// If another refresh was issued while this one was waiting, the response
    /// is discarded and [`RefreshOutcome::Stale`] is returned, errors included.
    ///
    /// # Errors
    ///
    /// Returns the fetch error when this refresh is still the latest.
    pub async fn refresh<S: ShiftSource + Sync>(
        &self,
        source: &S,
    ) -> Result<RefreshOutcome, ApiError> {
        let (ticket, pantry, week) = {
            let mut state = self.lock();
            let ticket = self.sequence.issue();
            let Some(pantry) = state.pantry else {
                state.grid = None;
                return Ok(RefreshOutcome::NoPantry);
            };
            (ticket, pantry, state.week)
        };

        let fetched = source.shifts_for(pantry).await;

        let mut state = self.lock();
        if !self.sequence.is_current(ticket) {
            tracing::debug!(
                ticket = ticket.value(),
                latest = ?self.sequence.latest().map(Ticket::value),
                "discarding stale calendar response"
            );
            return Ok(RefreshOutcome::Stale);
        }

        let grid = WeekGrid::build(week, fetched?, self.offset);
        state.grid = Some(grid.clone());
        state.applied = Some(ticket);
        Ok(RefreshOutcome::Applied(grid))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use pantry_shifts_core::{ShiftId, ShiftRoleId};
    use reqwest::StatusCode;
    use tokio::sync::{Mutex as AsyncMutex, oneshot};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn shift(id: i32, day: u32) -> Shift {
        let start = Utc.with_ymd_and_hms(2026, 10, day, 9, 0, 0).unwrap();
        Shift {
            id: ShiftId::new(id),
            pantry_id: PantryId::new(1),
            role_name: "Sorting".to_string(),
            start_time: start,
            end_time: start + chrono::Duration::hours(3),
            required_count: 2,
            filled_count: 0,
            status: "Open".to_string(),
            roles: vec![pantry_shifts_core::ShiftRole {
                id: ShiftRoleId::new(id * 10),
                shift_id: Some(ShiftId::new(id)),
                role_title: "Driver".to_string(),
                required_count: 1,
                filled_count: 0,
            }],
        }
    }

    fn pantry(id: i32) -> Pantry {
        serde_json::from_value(serde_json::json!({"id": id, "name": format!("P{id}")})).unwrap()
    }

    struct FixedSource(HashMap<PantryId, Vec<Shift>>);

    impl ShiftSource for FixedSource {
        async fn shifts_for(&self, pantry_id: PantryId) -> Result<Vec<Shift>, ApiError> {
            self.0
                .get(&pantry_id)
                .cloned()
                .ok_or_else(|| ApiError::from_status(StatusCode::FORBIDDEN, ""))
        }
    }

    /// Hands out responses only when the test releases them.
    struct GatedSource {
        gates: AsyncMutex<Vec<oneshot::Receiver<Result<Vec<Shift>, ApiError>>>>,
    }

    impl ShiftSource for GatedSource {
        async fn shifts_for(&self, _pantry_id: PantryId) -> Result<Vec<Shift>, ApiError> {
            let gate = self.gates.lock().await.remove(0);
            gate.await.unwrap()
        }
    }

    #[test]
    fn test_choose_pantry_falls_back_to_first() {
        let pantries = vec![pantry(1), pantry(2)];
        assert_eq!(
            choose_pantry(&pantries, Some(PantryId::new(2))),
            Some(PantryId::new(2))
        );
        assert_eq!(
            choose_pantry(&pantries, Some(PantryId::new(9))),
            Some(PantryId::new(1))
        );
        assert_eq!(choose_pantry(&pantries, None), Some(PantryId::new(1)));
        assert_eq!(choose_pantry(&[], Some(PantryId::new(1))), None);
    }

    #[test]
    fn test_navigate_moves_week() {
        let view = CalendarView::new(date(2026, 10, 21), utc());
        assert_eq!(view.week().start(), date(2026, 10, 19));
        view.navigate(Navigation::Next, date(2026, 1, 1));
        assert_eq!(view.week().start(), date(2026, 10, 26));
        view.navigate(Navigation::Today, date(2026, 10, 25));
        assert_eq!(view.week().start(), date(2026, 10, 19));
    }

    #[tokio::test]
    async fn test_refresh_without_pantry() {
        let view = CalendarView::new(date(2026, 10, 21), utc());
        let source = FixedSource(HashMap::new());
        assert_eq!(view.refresh(&source).await.unwrap(), RefreshOutcome::NoPantry);
        assert!(view.grid().is_none());
    }

    #[tokio::test]
    async fn test_refresh_builds_grid() {
        let view = CalendarView::new(date(2026, 10, 21), utc());
        view.select_pantry(Some(PantryId::new(1)));
        let source = FixedSource(HashMap::from([(
            PantryId::new(1),
            vec![shift(1, 20), shift(2, 27)],
        )]));

        let RefreshOutcome::Applied(grid) = view.refresh(&source).await.unwrap() else {
            panic!("expected applied grid");
        };
        assert_eq!(grid.shift_count(), 1);
        assert_eq!(view.grid(), Some(grid));
    }

    #[tokio::test]
    async fn test_refresh_error_is_returned_when_current() {
        let view = CalendarView::new(date(2026, 10, 21), utc());
        view.select_pantry(Some(PantryId::new(5)));
        let source = FixedSource(HashMap::new());
        let err = view.refresh(&source).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    }

    #[tokio::test]
    async fn test_stale_response_never_overwrites_fresher() {
        let view = Arc::new(CalendarView::new(date(2026, 10, 21), utc()));
        view.select_pantry(Some(PantryId::new(1)));

        let (older_tx, older_rx) = oneshot::channel();
        let (newer_tx, newer_rx) = oneshot::channel();
        let source = GatedSource {
            gates: AsyncMutex::new(vec![older_rx, newer_rx]),
        };

        let older = view.refresh(&source);
        let newer = view.refresh(&source);
        let release = async {
            // Newest finishes first, then the older one lands late.
            newer_tx.send(Ok(vec![shift(2, 21)])).unwrap();
            tokio::task::yield_now().await;
            older_tx.send(Ok(vec![shift(1, 20)])).unwrap();
        };

        let (older, newer, ()) = tokio::join!(older, newer, release);

        assert_eq!(older.unwrap(), RefreshOutcome::Stale);
        assert!(matches!(newer.unwrap(), RefreshOutcome::Applied(_)));

        let grid = view.grid().unwrap();
        assert_eq!(grid.shift_count(), 1);
        assert_eq!(grid.days()[2].shifts[0].id, ShiftId::new(2));
    }

    #[tokio::test]
    async fn test_stale_error_is_discarded() {
        let view = CalendarView::new(date(2026, 10, 21), utc());
        view.select_pantry(Some(PantryId::new(1)));

        let (older_tx, older_rx) = oneshot::channel();
        let (newer_tx, newer_rx) = oneshot::channel();
        let source = GatedSource {
            gates: AsyncMutex::new(vec![older_rx, newer_rx]),
        };

        let older = view.refresh(&source);
        let newer = view.refresh(&source);
        let release = async {
            older_tx
                .send(Err(ApiError::from_status(StatusCode::BAD_GATEWAY, "")))
                .unwrap();
            newer_tx.send(Ok(Vec::new())).unwrap();
        };

        let (older, newer, ()) = tokio::join!(older, newer, release);
        assert_eq!(older.unwrap(), RefreshOutcome::Stale);
        assert!(matches!(newer.unwrap(), RefreshOutcome::Applied(_)));
    }

    #[test]
    fn test_select_pantry_clears_grid() {
        let view = CalendarView::new(date(2026, 10, 21), utc());
        view.select_pantry(Some(PantryId::new(1)));
        let empty = WeekGrid::build(view.week(), Vec::new(), utc());
        view.lock().grid = Some(empty);
        view.select_pantry(Some(PantryId::new(1)));
        assert!(view.grid().is_some());
        view.select_pantry(Some(PantryId::new(2)));
        assert!(view.grid().is_none());
    }
}
