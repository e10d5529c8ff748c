//! Weekly plan normalization.
//!
//! The authored plan lives inside the routine document's free-form metadata
//! and arrives in two wire shapes: a day-keyed map and an array of entries
//! tagged with `dayKey`. Everything downstream works on one canonical form,
//! a list of exactly seven day plans in Mon..Sun order, so both shapes are
//! collapsed here at the boundary and never branch anywhere else.

use crate::types::{DayKey, DayPlan, ExerciseItem};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// Key under which the plan is stored in routine metadata
pub const PLAN_META_KEY: &str = "plan";

/// Generate a stable id for a plan exercise
pub fn new_exercise_id() -> String {
    Uuid::new_v4().to_string()
}

/// Collapse authored day plans into exactly one entry per day, Mon..Sun
///
/// Duplicate day keys collapse with the last occurrence winning. Missing
/// days are synthesized empty. Free-text fields are trimmed, empty tags
/// dropped, and exercises without an id get a fresh one; exercises that
/// already carry an id keep it, so normalizing twice changes nothing.
pub fn normalize_plans(plans: &[DayPlan]) -> Vec<DayPlan> {
    let mut by_day: BTreeMap<DayKey, DayPlan> = BTreeMap::new();
    for plan in plans {
        by_day.insert(plan.day_key, normalize_day(plan));
    }
    DayKey::ALL
        .iter()
        .map(|day| by_day.remove(day).unwrap_or_else(|| DayPlan::empty(*day)))
        .collect()
}

fn normalize_day(plan: &DayPlan) -> DayPlan {
    DayPlan {
        day_key: plan.day_key,
        session_type: trimmed_opt(&plan.session_type),
        focus: trimmed_opt(&plan.focus),
        tags: plan
            .tags
            .iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
        notes: trimmed_opt(&plan.notes),
        exercises: plan.exercises.iter().map(normalize_exercise).collect(),
    }
}

fn normalize_exercise(exercise: &ExerciseItem) -> ExerciseItem {
    let id = exercise.id.trim();
    ExerciseItem {
        id: if id.is_empty() {
            new_exercise_id()
        } else {
            id.to_string()
        },
        name: exercise.name.trim().to_string(),
        sets: trimmed_opt(&exercise.sets),
        reps: trimmed_opt(&exercise.reps),
        load: trimmed_opt(&exercise.load),
        notes: trimmed_opt(&exercise.notes),
        movement_id: trimmed_opt(&exercise.movement_id),
        movement_name: trimmed_opt(&exercise.movement_name),
        attachment_public_ids: exercise
            .attachment_public_ids
            .iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect(),
    }
}

fn trimmed_opt(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Read the canonical 7-day plan out of routine metadata
///
/// Never errors. Unrecognized day keys and malformed entries are dropped,
/// and a `plan` value that is neither map nor array yields an all-empty
/// week, so callers always get something renderable.
pub fn plan_from_meta(meta: &Value) -> Vec<DayPlan> {
    let raw = match meta.get(PLAN_META_KEY) {
        Some(Value::Array(entries)) => days_from_array(entries),
        Some(Value::Object(map)) => days_from_map(map),
        Some(other) => {
            warn!("Ignoring plan metadata with unexpected shape: {}", shape_name(other));
            Vec::new()
        }
        None => Vec::new(),
    };
    normalize_plans(&raw)
}

fn days_from_array(entries: &[Value]) -> Vec<DayPlan> {
    entries
        .iter()
        .filter_map(|entry| day_plan_from_value(entry.clone()))
        .collect()
}

fn days_from_map(map: &Map<String, Value>) -> Vec<DayPlan> {
    map.iter()
        .filter_map(|(key, value)| {
            let Some(day) = DayKey::parse(key) else {
                debug!("Dropping plan entry under unrecognized day key {:?}", key);
                return None;
            };
            let Value::Object(fields) = value else {
                debug!("Dropping non-object plan entry for {}", day);
                return None;
            };
            // The map key is the day's identity; an embedded dayKey tag loses
            let mut fields = fields.clone();
            fields.insert("dayKey".to_string(), Value::String(day.as_str().to_string()));
            day_plan_from_value(Value::Object(fields))
        })
        .collect()
}

fn day_plan_from_value(value: Value) -> Option<DayPlan> {
    match serde_json::from_value::<DayPlan>(value) {
        Ok(plan) => Some(plan),
        Err(e) => {
            debug!("Dropping malformed plan entry: {}", e);
            None
        }
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Write plans back into routine metadata in the canonical array encoding
///
/// The plans are normalized first, so ids are assigned only where missing
/// and a read-back returns exactly what was written. A non-object `meta`
/// is replaced by a fresh object rather than erroring.
pub fn set_plan_into_meta(meta: &mut Value, plans: &[DayPlan]) {
    let normalized = normalize_plans(plans);
    let encoded = match serde_json::to_value(&normalized) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to encode plan, writing empty week: {}", e);
            Value::Array(Vec::new())
        }
    };
    if !meta.is_object() {
        *meta = Value::Object(Map::new());
    }
    if let Some(fields) = meta.as_object_mut() {
        fields.insert(PLAN_META_KEY.to_string(), encoded);
    }
}
