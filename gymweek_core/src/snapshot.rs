//! Plan-vs-actual snapshot assembly.
//!
//! Builds the reconciliation engine's input for one week: seven dated day
//! records with actual sessions grouped per day and a base status derived
//! from the routine's top-level planned days. The overlay and ledger
//! refinement happens in `reconcile`; this module only aggregates.

use crate::types::{
    ActualSession, DayKey, LoggedSession, PvaActual, PvaDay, PvaDayStatus, PvaWeek, RoutineDoc,
    WeekKey,
};
use chrono::NaiveDate;
use serde_json::Map;
use std::collections::HashSet;
use tracing::debug;

/// Assemble a week snapshot from logged sessions and the routine's
/// top-level planned days
///
/// `today` anchors the planned-but-no-session split between "still ahead"
/// and "missed"; callers pass the current date so the build stays
/// deterministic under test.
pub fn build_week_snapshot(
    week_key: WeekKey,
    sessions: &[LoggedSession],
    routine: Option<&RoutineDoc>,
    today: NaiveDate,
) -> PvaWeek {
    let planned_days: HashSet<DayKey> = routine
        .map(|doc| doc.planned_days.iter().copied().collect())
        .unwrap_or_default();

    let days = DayKey::ALL
        .iter()
        .map(|day| {
            let date = week_key.date_of(*day);
            let day_sessions: Vec<ActualSession> = sessions
                .iter()
                .filter(|session| session.date == date)
                .map(ActualSession::from)
                .collect();
            let status = base_day_status(
                planned_days.contains(day),
                day_sessions.len(),
                date,
                today,
            );
            debug!(
                "Snapshot {} {}: {} session(s), base status {}",
                week_key,
                day,
                day_sessions.len(),
                status
            );
            PvaDay {
                date,
                day_key: Some(*day),
                planned: None,
                actual: PvaActual {
                    sessions: day_sessions,
                },
                status: Some(status),
                gym_check: None,
                extra: Map::new(),
            }
        })
        .collect();

    PvaWeek {
        week_key,
        range: week_key.range(),
        has_routine_template: routine.is_some(),
        days,
    }
}

/// Base status before ledger refinement
fn base_day_status(
    planned: bool,
    session_count: usize,
    date: NaiveDate,
    today: NaiveDate,
) -> PvaDayStatus {
    match (planned, session_count) {
        (true, 0) => {
            if date >= today {
                PvaDayStatus::PlannedOnly
            } else {
                PvaDayStatus::Missed
            }
        }
        (true, 1) => PvaDayStatus::Done,
        (true, _) => PvaDayStatus::PlannedAndExtra,
        (false, 0) => PvaDayStatus::Rest,
        (false, _) => PvaDayStatus::Extra,
    }
}
