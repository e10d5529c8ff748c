//! Plan-vs-actual reconciliation.
//!
//! Merges the normalized weekly plan and the gym-check ledger into an
//! externally aggregated week snapshot, producing a filled planned
//! overlay, a completion summary, and one resolved status per day.
//!
//! The engine is a pure function over already-fetched inputs. Status is
//! recomputed from a decision table on every call and never persisted, so
//! there is no stored state to drift out of sync with the evidence.

use crate::gymcheck;
use crate::plan;
use crate::types::{
    DayKey, ExerciseItem, GymCheckDayState, GymCheckSummary, PlannedOverlay, PvaDayStatus, PvaWeek,
    RoutineDoc,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Merge routine-derived plan and ledger data into a week snapshot
///
/// The input is cloned; only `planned`, `gymCheck`, and `status` are
/// rewritten per day, everything else passes through unchanged. Days with
/// an unrecognized `dayKey` are left exactly as received, and an absent
/// routine is treated as "no plan, no ledger" rather than an error.
pub fn merge_plan_vs_actual(pva: &PvaWeek, routine: Option<&RoutineDoc>) -> PvaWeek {
    let (overlays, exercises, ledger) = routine_maps(routine);

    let mut merged = pva.clone();
    for day in &mut merged.days {
        let Some(day_key) = day.day_key else {
            debug!("Passing through snapshot day {} without a day key", day.date);
            continue;
        };

        let planned_exercises = exercises
            .get(&day_key)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let summary = summarize_day(planned_exercises, ledger.get(&day_key));
        let overlay = fill_overlay(day.planned.as_ref(), overlays.get(&day_key));
        let status = resolve_status(
            &overlay,
            &summary,
            day.status,
            day.actual.sessions.len(),
        );

        debug!(
            "Resolved {} as {} ({}/{} done, checks: {})",
            day_key, status, summary.done_exercises, summary.total_planned_exercises,
            summary.has_any_check
        );

        day.planned = Some(overlay);
        day.gym_check = Some(summary);
        day.status = Some(status);
    }

    info!(
        "Merged plan-vs-actual for {} ({} days, routine: {})",
        merged.week_key,
        merged.days.len(),
        routine.is_some()
    );
    merged
}

type RoutineMaps = (
    BTreeMap<DayKey, PlannedOverlay>,
    BTreeMap<DayKey, Vec<ExerciseItem>>,
    BTreeMap<DayKey, GymCheckDayState>,
);

fn routine_maps(routine: Option<&RoutineDoc>) -> RoutineMaps {
    let Some(doc) = routine else {
        return (BTreeMap::new(), BTreeMap::new(), BTreeMap::new());
    };

    let mut overlays = BTreeMap::new();
    let mut exercises = BTreeMap::new();
    for day_plan in plan::plan_from_meta(&doc.meta) {
        overlays.insert(
            day_plan.day_key,
            PlannedOverlay {
                session_type: day_plan.session_type.clone(),
                focus: day_plan.focus.clone(),
                tags: if day_plan.tags.is_empty() {
                    None
                } else {
                    Some(day_plan.tags.clone())
                },
            },
        );
        exercises.insert(day_plan.day_key, day_plan.exercises);
    }

    (overlays, exercises, gymcheck::ledger_from_meta(&doc.meta))
}

/// Per-field fill: values already present in the external snapshot win,
/// routine-derived values only plug the holes
fn fill_overlay(
    external: Option<&PlannedOverlay>,
    derived: Option<&PlannedOverlay>,
) -> PlannedOverlay {
    let external = external.cloned().unwrap_or_default();
    let Some(derived) = derived else {
        return external;
    };
    PlannedOverlay {
        session_type: external
            .session_type
            .or_else(|| derived.session_type.clone()),
        focus: external.focus.or_else(|| derived.focus.clone()),
        tags: external.tags.or_else(|| derived.tags.clone()),
    }
}

/// Count completion evidence for one day
///
/// `done_exercises` counts only ids that exist in the plan; ledger entries
/// for edited-out exercises never inflate it, but they do count as
/// check activity along with day-level duration and notes.
fn summarize_day(
    planned: &[ExerciseItem],
    ledger: Option<&GymCheckDayState>,
) -> GymCheckSummary {
    let total = planned.len() as u32;
    let Some(state) = ledger else {
        return GymCheckSummary {
            total_planned_exercises: total,
            ..GymCheckSummary::default()
        };
    };

    let done = planned
        .iter()
        .filter(|exercise| {
            state
                .exercises
                .get(&exercise.id)
                .map_or(false, |entry| entry.done)
        })
        .count() as u32;

    GymCheckSummary {
        total_planned_exercises: total,
        done_exercises: done,
        duration_min: state.duration_min,
        notes: state.notes.clone(),
        has_any_check: !state.exercises.is_empty()
            || state.duration_min.is_some()
            || state.notes.is_some(),
    }
}

/// The status decision table
///
/// Check-off activity outranks everything; the externally supplied status
/// is only trusted for days the ledger knows nothing about. Partial
/// completion (some but not all exercises done) resolves to `done`.
fn resolve_status(
    overlay: &PlannedOverlay,
    summary: &GymCheckSummary,
    external_status: Option<PvaDayStatus>,
    actual_session_count: usize,
) -> PvaDayStatus {
    let planned_signal = overlay.has_planned_session() || summary.total_planned_exercises > 0;

    if summary.has_any_check {
        if summary.total_planned_exercises > 0 {
            if summary.done_exercises > 0 {
                PvaDayStatus::Done
            } else if planned_signal {
                PvaDayStatus::Missed
            } else {
                PvaDayStatus::Unknown
            }
        } else if overlay.has_planned_session() {
            PvaDayStatus::Done
        } else {
            PvaDayStatus::Extra
        }
    } else if let Some(status) = external_status {
        status
    } else if !planned_signal && actual_session_count > 0 {
        PvaDayStatus::Extra
    } else {
        PvaDayStatus::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActualSession, DayPlan, PvaActual, PvaDay, WeekKey};
    use serde_json::Map;

    fn week_key() -> WeekKey {
        WeekKey::parse("2026-W07").expect("valid week")
    }

    fn exercise(id: &str, name: &str) -> ExerciseItem {
        ExerciseItem {
            id: id.to_string(),
            name: name.to_string(),
            ..ExerciseItem::default()
        }
    }

    fn create_test_routine() -> RoutineDoc {
        let mut doc = RoutineDoc::new(week_key());
        let day_plan = DayPlan {
            day_key: DayKey::Wed,
            session_type: Some("push".to_string()),
            focus: Some("chest".to_string()),
            tags: vec!["strength".to_string()],
            notes: None,
            exercises: vec![
                exercise("ex-a", "Bench Press"),
                exercise("ex-b", "Overhead Press"),
                exercise("ex-c", "Dips"),
            ],
        };
        plan::set_plan_into_meta(&mut doc.meta, &[day_plan]);
        doc
    }

    fn create_test_day(day_key: DayKey, status: Option<PvaDayStatus>) -> PvaDay {
        PvaDay {
            date: week_key().date_of(day_key),
            day_key: Some(day_key),
            planned: None,
            actual: PvaActual::default(),
            status,
            gym_check: None,
            extra: Map::new(),
        }
    }

    fn create_test_week(days: Vec<PvaDay>) -> PvaWeek {
        PvaWeek {
            week_key: week_key(),
            range: week_key().range(),
            has_routine_template: true,
            days,
        }
    }

    fn actual_session(id: &str) -> ActualSession {
        ActualSession {
            id: id.to_string(),
            session_type: "gym".to_string(),
            duration_seconds: Some(3600),
            notes: None,
            metrics: None,
            source: None,
        }
    }

    fn check_off(doc: &mut RoutineDoc, day: DayKey, done_ids: &[&str]) {
        let mut state = gymcheck::day_state_from_meta(&doc.meta, day).unwrap_or_default();
        for id in done_ids {
            state.exercise_mut(id).done = true;
        }
        gymcheck::set_day_state_into_meta(&mut doc.meta, day, &state);
    }

    #[test]
    fn test_partial_completion_resolves_to_done() {
        let mut routine = create_test_routine();
        check_off(&mut routine, DayKey::Wed, &["ex-a", "ex-b"]);

        let week = create_test_week(vec![create_test_day(DayKey::Wed, None)]);
        let merged = merge_plan_vs_actual(&week, Some(&routine));

        let day = &merged.days[0];
        assert_eq!(day.status, Some(PvaDayStatus::Done));
        let summary = day.gym_check.as_ref().expect("summary set");
        assert_eq!(summary.total_planned_exercises, 3);
        assert_eq!(summary.done_exercises, 2);
        assert!(summary.has_any_check);
    }

    #[test]
    fn test_checks_with_nothing_done_resolve_to_missed() {
        let mut routine = create_test_routine();
        let mut state = GymCheckDayState::default();
        state.exercise_mut("ex-a").done = false;
        gymcheck::set_day_state_into_meta(&mut routine.meta, DayKey::Wed, &state);

        let week = create_test_week(vec![create_test_day(DayKey::Wed, None)]);
        let merged = merge_plan_vs_actual(&week, Some(&routine));
        assert_eq!(merged.days[0].status, Some(PvaDayStatus::Missed));
    }

    #[test]
    fn test_orphaned_ledger_entries_count_as_activity_not_completion() {
        let mut routine = create_test_routine();
        // Checked off under an id that was later edited out of the plan
        check_off(&mut routine, DayKey::Wed, &["ex-gone"]);

        let week = create_test_week(vec![create_test_day(DayKey::Wed, None)]);
        let merged = merge_plan_vs_actual(&week, Some(&routine));

        let day = &merged.days[0];
        let summary = day.gym_check.as_ref().expect("summary set");
        assert_eq!(summary.done_exercises, 0);
        assert!(summary.has_any_check);
        assert_eq!(day.status, Some(PvaDayStatus::Missed));
    }

    #[test]
    fn test_day_level_checks_without_plan_resolve_by_planned_session() {
        // Duration recorded on a day with no planned exercises
        let mut routine = RoutineDoc::new(week_key());
        let state = GymCheckDayState {
            duration_min: Some(45),
            ..GymCheckDayState::default()
        };
        gymcheck::set_day_state_into_meta(&mut routine.meta, DayKey::Sat, &state);

        let week = create_test_week(vec![create_test_day(DayKey::Sat, None)]);
        let merged = merge_plan_vs_actual(&week, Some(&routine));
        assert_eq!(merged.days[0].status, Some(PvaDayStatus::Extra));

        // Same ledger, but the plan declares a session for the day
        let day_plan = DayPlan {
            day_key: DayKey::Sat,
            session_type: Some("cardio".to_string()),
            focus: None,
            tags: Vec::new(),
            notes: None,
            exercises: Vec::new(),
        };
        plan::set_plan_into_meta(&mut routine.meta, &[day_plan]);
        let merged = merge_plan_vs_actual(&week, Some(&routine));
        assert_eq!(merged.days[0].status, Some(PvaDayStatus::Done));
    }

    #[test]
    fn test_orphaned_entry_on_zero_planned_day_resolves_by_planned_session() {
        // A done check-off survives the plan edit that removed every
        // exercise; the day now has zero planned exercises but real
        // ledger activity
        let mut routine = RoutineDoc::new(week_key());
        check_off(&mut routine, DayKey::Thu, &["ex-gone"]);

        let week = create_test_week(vec![create_test_day(DayKey::Thu, None)]);
        let merged = merge_plan_vs_actual(&week, Some(&routine));
        let day = &merged.days[0];
        let summary = day.gym_check.as_ref().expect("summary set");
        assert_eq!(summary.total_planned_exercises, 0);
        assert_eq!(summary.done_exercises, 0);
        assert!(summary.has_any_check);
        assert_eq!(day.status, Some(PvaDayStatus::Extra));

        // With a planned session header on the day, the same orphaned
        // activity resolves to done
        let day_plan = DayPlan {
            day_key: DayKey::Thu,
            session_type: Some("pull".to_string()),
            focus: None,
            tags: Vec::new(),
            notes: None,
            exercises: Vec::new(),
        };
        plan::set_plan_into_meta(&mut routine.meta, &[day_plan]);
        let merged = merge_plan_vs_actual(&week, Some(&routine));
        assert_eq!(merged.days[0].status, Some(PvaDayStatus::Done));
    }

    #[test]
    fn test_external_status_used_only_without_check_activity() {
        let routine = create_test_routine();
        let week = create_test_week(vec![create_test_day(
            DayKey::Wed,
            Some(PvaDayStatus::PlannedOnly),
        )]);
        let merged = merge_plan_vs_actual(&week, Some(&routine));
        // No ledger activity, so the externally supplied status stands
        assert_eq!(merged.days[0].status, Some(PvaDayStatus::PlannedOnly));

        let mut routine = routine;
        check_off(&mut routine, DayKey::Wed, &["ex-a"]);
        let merged = merge_plan_vs_actual(&week, Some(&routine));
        assert_eq!(merged.days[0].status, Some(PvaDayStatus::Done));
    }

    #[test]
    fn test_unplanned_day_with_sessions_is_extra() {
        let mut day = create_test_day(DayKey::Sun, None);
        day.actual.sessions.push(actual_session("s-1"));
        let week = create_test_week(vec![day]);

        let merged = merge_plan_vs_actual(&week, None);
        assert_eq!(merged.days[0].status, Some(PvaDayStatus::Extra));
    }

    #[test]
    fn test_nothing_known_resolves_to_unknown() {
        let week = create_test_week(vec![create_test_day(DayKey::Tue, None)]);
        let merged = merge_plan_vs_actual(&week, None);
        assert_eq!(merged.days[0].status, Some(PvaDayStatus::Unknown));
        let summary = merged.days[0].gym_check.as_ref().expect("summary set");
        assert_eq!(summary.total_planned_exercises, 0);
        assert!(!summary.has_any_check);
    }

    #[test]
    fn test_overlay_external_fields_win_over_routine() {
        let routine = create_test_routine();
        let mut day = create_test_day(DayKey::Wed, None);
        day.planned = Some(PlannedOverlay {
            session_type: Some("upper".to_string()),
            focus: None,
            tags: None,
        });
        let week = create_test_week(vec![day]);

        let merged = merge_plan_vs_actual(&week, Some(&routine));
        let overlay = merged.days[0].planned.as_ref().expect("overlay set");
        assert_eq!(overlay.session_type.as_deref(), Some("upper"));
        // Holes are filled from the routine plan
        assert_eq!(overlay.focus.as_deref(), Some("chest"));
        assert_eq!(overlay.tags.as_deref(), Some(&["strength".to_string()][..]));
    }

    #[test]
    fn test_malformed_day_passes_through_untouched() {
        let mut day = create_test_day(DayKey::Mon, Some(PvaDayStatus::Rest));
        day.day_key = None;
        let original = day.clone();
        let week = create_test_week(vec![day]);

        let merged = merge_plan_vs_actual(&week, Some(&create_test_routine()));
        assert_eq!(merged.days[0], original);
    }

    #[test]
    fn test_merge_preserves_foreign_fields_and_sessions() {
        let mut day = create_test_day(DayKey::Wed, None);
        day.actual.sessions.push(actual_session("s-9"));
        day.extra
            .insert("syncedFrom".to_string(), serde_json::json!("watch"));
        let week = create_test_week(vec![day]);

        let merged = merge_plan_vs_actual(&week, Some(&create_test_routine()));
        assert_eq!(merged.days[0].actual.sessions.len(), 1);
        assert_eq!(merged.days[0].actual.sessions[0].id, "s-9");
        assert_eq!(merged.days[0].extra["syncedFrom"], "watch");
        assert_eq!(merged.week_key, week.week_key);
        assert!(merged.has_routine_template);
    }

    #[test]
    fn test_ledger_notes_and_duration_pass_into_summary() {
        let mut routine = create_test_routine();
        let mut state = GymCheckDayState {
            duration_min: Some(50),
            notes: Some("cut short".to_string()),
            ..GymCheckDayState::default()
        };
        state.exercise_mut("ex-a").done = true;
        gymcheck::set_day_state_into_meta(&mut routine.meta, DayKey::Wed, &state);

        let week = create_test_week(vec![create_test_day(DayKey::Wed, None)]);
        let merged = merge_plan_vs_actual(&week, Some(&routine));
        let summary = merged.days[0].gym_check.as_ref().expect("summary set");
        assert_eq!(summary.duration_min, Some(50));
        assert_eq!(summary.notes.as_deref(), Some("cut short"));
    }
}
