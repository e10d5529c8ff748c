//! Gym-check ledger access.
//!
//! The ledger records what actually happened on the gym floor: per-exercise
//! check-offs keyed by plan exercise id, plus day-level duration, notes,
//! and metrics. It lives in routine metadata under `gymCheck`, keyed by
//! day. The ledger is intentionally never validated against the plan;
//! check-offs for exercises that were later edited out of the plan stay on
//! record, and the reconciliation engine decides how to count them.

use crate::types::{DayKey, GymCheckDayState};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Key under which the ledger is stored in routine metadata
pub const GYM_CHECK_META_KEY: &str = "gymCheck";

/// Read the whole per-day ledger out of routine metadata
///
/// Malformed input yields an empty ledger; individual bad days are dropped
/// without touching the rest.
pub fn ledger_from_meta(meta: &Value) -> BTreeMap<DayKey, GymCheckDayState> {
    let Some(Value::Object(map)) = meta.get(GYM_CHECK_META_KEY) else {
        return BTreeMap::new();
    };
    map.iter()
        .filter_map(|(key, value)| {
            let Some(day) = DayKey::parse(key) else {
                debug!("Dropping gym-check entry under unrecognized day key {:?}", key);
                return None;
            };
            match serde_json::from_value::<GymCheckDayState>(value.clone()) {
                Ok(state) => Some((day, state)),
                Err(e) => {
                    debug!("Dropping malformed gym-check entry for {}: {}", day, e);
                    None
                }
            }
        })
        .collect()
}

/// Read one day's ledger state, `None` when absent or malformed
pub fn day_state_from_meta(meta: &Value, day: DayKey) -> Option<GymCheckDayState> {
    let value = meta.get(GYM_CHECK_META_KEY)?.get(day.as_str())?;
    match serde_json::from_value(value.clone()) {
        Ok(state) => Some(state),
        Err(e) => {
            debug!("Ignoring malformed gym-check entry for {}: {}", day, e);
            None
        }
    }
}

/// Write one day's ledger state back into routine metadata
///
/// A non-object `meta` or `gymCheck` value is replaced by a fresh object
/// rather than erroring; other days are left untouched.
pub fn set_day_state_into_meta(meta: &mut Value, day: DayKey, state: &GymCheckDayState) {
    let encoded = match serde_json::to_value(state) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to encode gym-check state for {}: {}", day, e);
            return;
        }
    };
    if !meta.is_object() {
        *meta = Value::Object(Map::new());
    }
    let Some(fields) = meta.as_object_mut() else {
        return;
    };
    let ledger = fields
        .entry(GYM_CHECK_META_KEY.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !ledger.is_object() {
        warn!("Replacing non-object gym-check ledger");
        *ledger = Value::Object(Map::new());
    }
    if let Some(days) = ledger.as_object_mut() {
        days.insert(day.as_str().to_string(), encoded);
    }
}
