//! Session synthesis from gym-check data.
//!
//! Turns one day's check-offs into a creatable session payload: plan
//! fields supply the prescription (name, sets, reps, load), the ledger
//! supplies what actually happened (notes, media, day duration). This is
//! a pure builder; persisting the result is the session log's job.

use crate::gymcheck;
use crate::plan;
use crate::types::{
    CreateSessionBody, DayKey, DayPlan, RoutineDoc, SessionExercise, SessionMeta, WeekKey,
};
use tracing::debug;

/// `meta.source` value stamped on synthesized sessions
pub const GYM_CHECK_SOURCE: &str = "gymCheck";

/// Session type used when the plan does not name one
pub const FALLBACK_SESSION_TYPE: &str = "gym";

/// Why a session could not be synthesized
///
/// Both cases are precondition failures, not transient errors; retrying
/// without changing the inputs will fail the same way.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildSessionError {
    /// The day key is not one of the seven canonical Mon..Sun keys
    #[error("invalid day key {0:?} (expected Mon..Sun)")]
    InvalidDayKey(String),

    /// Zero exercises qualified; an empty session is never created
    #[error("no completed exercises to log for {0}")]
    NoDoneExercises(DayKey),
}

/// Build a creatable session from one day of a routine's check-offs
///
/// With `include_only_done` set, an exercise qualifies only when its
/// ledger entry has `done` strictly true; a missing entry excludes it.
/// Without it, every planned exercise is included and ledger data still
/// overlays notes and media where present. Notes fall back to the plan's
/// own notes, media to the plan's linked attachment ids.
pub fn build_gym_check_session(
    routine: &RoutineDoc,
    week_key: WeekKey,
    day_key: &str,
    include_only_done: bool,
) -> Result<CreateSessionBody, BuildSessionError> {
    let day = DayKey::parse(day_key)
        .ok_or_else(|| BuildSessionError::InvalidDayKey(day_key.to_string()))?;

    let plans = plan::plan_from_meta(&routine.meta);
    let day_plan = plans
        .iter()
        .find(|p| p.day_key == day)
        .cloned()
        .unwrap_or_else(|| DayPlan::empty(day));
    let ledger = gymcheck::day_state_from_meta(&routine.meta, day).unwrap_or_default();

    let mut exercises = Vec::new();
    for item in &day_plan.exercises {
        let entry = ledger.exercises.get(&item.id);
        if include_only_done && !entry.map_or(false, |e| e.done) {
            continue;
        }
        exercises.push(SessionExercise {
            name: item.name.clone(),
            sets: item.sets.clone(),
            reps: item.reps.clone(),
            load: item.load.clone(),
            notes: entry
                .and_then(|e| e.notes.clone())
                .or_else(|| item.notes.clone()),
            media_public_ids: entry
                .map(|e| e.media_public_ids.clone())
                .filter(|ids| !ids.is_empty())
                .unwrap_or_else(|| item.attachment_public_ids.clone()),
        });
    }

    if exercises.is_empty() {
        return Err(BuildSessionError::NoDoneExercises(day));
    }

    debug!(
        "Synthesized {} session for {} {} with {} exercises",
        day_plan
            .session_type
            .as_deref()
            .unwrap_or(FALLBACK_SESSION_TYPE),
        week_key,
        day,
        exercises.len()
    );

    Ok(CreateSessionBody {
        session_type: day_plan
            .session_type
            .clone()
            .unwrap_or_else(|| FALLBACK_SESSION_TYPE.to_string()),
        duration_seconds: ledger.duration_min.map(|minutes| minutes.saturating_mul(60)),
        notes: ledger.notes.clone(),
        exercises,
        meta: Some(SessionMeta {
            source: GYM_CHECK_SOURCE.to_string(),
            week_key,
            day_key: day,
            routine_week_key: week_key,
        }),
    })
}
