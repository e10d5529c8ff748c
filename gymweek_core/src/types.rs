//! Core domain types for the Gymweek training system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Week and day addressing (ISO week keys, Mon..Sun day keys)
//! - Authored weekly plans and their exercises
//! - The gym-check ledger captured on the gym floor
//! - Logged sessions and session creation payloads
//! - Plan-vs-actual snapshot shapes
//! - Routine documents, attachments, and the movement catalog
//!
//! Routine documents and snapshot shapes are exchanged with external
//! tooling as camelCase JSON; the lenient deserializers near the bottom
//! keep one malformed field from poisoning a whole document.

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Week and Day Addressing
// ============================================================================

/// One of the seven canonical weekday slots, fixed Mon..Sun order
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DayKey {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayKey {
    /// All seven day keys in canonical order
    pub const ALL: [DayKey; 7] = [
        DayKey::Mon,
        DayKey::Tue,
        DayKey::Wed,
        DayKey::Thu,
        DayKey::Fri,
        DayKey::Sat,
        DayKey::Sun,
    ];

    /// Parse a day key, accepting short or full names in any case
    pub fn parse(s: &str) -> Option<DayKey> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mon" | "monday" => Some(DayKey::Mon),
            "tue" | "tuesday" => Some(DayKey::Tue),
            "wed" | "wednesday" => Some(DayKey::Wed),
            "thu" | "thursday" => Some(DayKey::Thu),
            "fri" | "friday" => Some(DayKey::Fri),
            "sat" | "saturday" => Some(DayKey::Sat),
            "sun" | "sunday" => Some(DayKey::Sun),
            _ => None,
        }
    }

    /// Canonical wire spelling ("Mon" .. "Sun")
    pub fn as_str(self) -> &'static str {
        match self {
            DayKey::Mon => "Mon",
            DayKey::Tue => "Tue",
            DayKey::Wed => "Wed",
            DayKey::Thu => "Thu",
            DayKey::Fri => "Fri",
            DayKey::Sat => "Sat",
            DayKey::Sun => "Sun",
        }
    }

    /// Position within the Mon..Sun week (0..=6)
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn weekday(self) -> Weekday {
        match self {
            DayKey::Mon => Weekday::Mon,
            DayKey::Tue => Weekday::Tue,
            DayKey::Wed => Weekday::Wed,
            DayKey::Thu => Weekday::Thu,
            DayKey::Fri => Weekday::Fri,
            DayKey::Sat => Weekday::Sat,
            DayKey::Sun => Weekday::Sun,
        }
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<DayKey, String> {
        DayKey::parse(s).ok_or_else(|| format!("unrecognized day key {s:?} (expected Mon..Sun)"))
    }
}

/// ISO year-week identifier, rendered as e.g. `2026-W07`
///
/// Construction always validates that the week exists for the year, so a
/// held `WeekKey` can be mapped to dates without further checking.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct WeekKey {
    year: i32,
    week: u32,
}

impl WeekKey {
    /// Build a week key, `None` when the year has no such ISO week
    pub fn new(year: i32, week: u32) -> Option<WeekKey> {
        NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).map(|_| WeekKey { year, week })
    }

    /// Parse a `YYYY-Www` string (the `W` may be lowercase)
    pub fn parse(s: &str) -> Option<WeekKey> {
        let (year_part, week_part) = s.trim().split_once('-')?;
        let week_part = week_part
            .strip_prefix('W')
            .or_else(|| week_part.strip_prefix('w'))?;
        let year = year_part.parse::<i32>().ok()?;
        let week = week_part.parse::<u32>().ok()?;
        WeekKey::new(year, week)
    }

    /// The week key containing the given date
    pub fn for_date(date: NaiveDate) -> WeekKey {
        let iso = date.iso_week();
        WeekKey {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// The week key containing today (UTC)
    pub fn current() -> WeekKey {
        WeekKey::for_date(Utc::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    /// Calendar date of the given day within this week
    pub fn date_of(&self, day: DayKey) -> NaiveDate {
        // (year, week) validity is checked at construction
        NaiveDate::from_isoywd_opt(self.year, self.week, day.weekday())
            .expect("week key holds a valid ISO week")
    }

    /// The Monday..Sunday date range covered by this week
    pub fn range(&self) -> DateRange {
        DateRange {
            from: self.date_of(DayKey::Mon),
            to: self.date_of(DayKey::Sun),
        }
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-W{:02}", self.year, self.week)
    }
}

impl FromStr for WeekKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<WeekKey, String> {
        WeekKey::parse(s).ok_or_else(|| format!("invalid week key {s:?} (expected YYYY-Www)"))
    }
}

impl TryFrom<String> for WeekKey {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<WeekKey, String> {
        value.parse()
    }
}

impl From<WeekKey> for String {
    fn from(week: WeekKey) -> String {
        week.to_string()
    }
}

/// Inclusive calendar date range
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

// ============================================================================
// Weekly Plan Types
// ============================================================================

/// One authored exercise line within a day plan
///
/// `movement_id`/`movement_name` are a snapshot of the catalog movement the
/// line was created from; later catalog edits never rewrite authored plans.
/// `attachment_public_ids` links the line to media in the routine's
/// attachment set by public id.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExerciseItem {
    pub id: String,
    pub name: String,
    pub sets: Option<String>,
    pub reps: Option<String>,
    pub load: Option<String>,
    pub notes: Option<String>,
    pub movement_id: Option<String>,
    pub movement_name: Option<String>,
    pub attachment_public_ids: Vec<String>,
}

/// One weekday of the authored plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    #[serde(deserialize_with = "de_day_key")]
    pub day_key: DayKey,
    #[serde(default)]
    pub session_type: Option<String>,
    #[serde(default)]
    pub focus: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub exercises: Vec<ExerciseItem>,
}

impl DayPlan {
    /// An empty slot for the given day
    pub fn empty(day_key: DayKey) -> DayPlan {
        DayPlan {
            day_key,
            session_type: None,
            focus: None,
            tags: Vec::new(),
            notes: None,
            exercises: Vec::new(),
        }
    }

    /// True when the day carries an authored session (type, focus, or tags)
    pub fn has_planned_session(&self) -> bool {
        filled(&self.session_type) || filled(&self.focus) || !self.tags.is_empty()
    }
}

// ============================================================================
// Gym-Check Ledger Types
// ============================================================================

/// Completion state for one planned exercise, captured during the workout
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GymCheckExerciseState {
    pub done: bool,
    pub notes: Option<String>,
    pub duration_min: Option<u32>,
    pub media_public_ids: Vec<String>,
}

/// Day-level metrics captured alongside the check-offs
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GymCheckMetrics {
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub calories: Option<u32>,
    pub avg_hr: Option<u8>,
    pub max_hr: Option<u8>,
    pub distance_m: Option<f64>,
    pub steps: Option<u32>,
    pub elevation_gain_m: Option<f64>,
    pub avg_pace_min_per_km: Option<f64>,
    pub avg_cadence: Option<u32>,
    pub rpe: Option<u8>,
    pub source: Option<String>,
}

/// One day of the gym-check ledger
///
/// Exercise state is keyed by plan exercise id. Entries whose id no longer
/// matches the plan are kept as written; the reconciliation engine decides
/// how much of them to count.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GymCheckDayState {
    pub duration_min: Option<u32>,
    pub notes: Option<String>,
    pub exercises: BTreeMap<String, GymCheckExerciseState>,
    pub metrics: GymCheckMetrics,
}

impl GymCheckDayState {
    /// True when nothing has been recorded for the day
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty() && self.duration_min.is_none() && self.notes.is_none()
    }

    /// Mutable state for one exercise id, created on first touch
    pub fn exercise_mut(&mut self, exercise_id: &str) -> &mut GymCheckExerciseState {
        self.exercises.entry(exercise_id.to_string()).or_default()
    }
}

// ============================================================================
// Session Types
// ============================================================================

/// One exercise line of a created training session
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionExercise {
    pub name: String,
    pub sets: Option<String>,
    pub reps: Option<String>,
    pub load: Option<String>,
    pub notes: Option<String>,
    pub media_public_ids: Vec<String>,
}

/// Provenance stamped on synthesized sessions
///
/// Manually entered sessions carry no meta; downstream consumers use this
/// to tell the two apart.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionMeta {
    pub source: String,
    pub week_key: WeekKey,
    pub day_key: DayKey,
    pub routine_week_key: WeekKey,
}

/// Payload accepted by the session log when creating a session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionBody {
    #[serde(rename = "type")]
    pub session_type: String,
    pub duration_seconds: Option<u32>,
    pub notes: Option<String>,
    pub exercises: Vec<SessionExercise>,
    pub meta: Option<SessionMeta>,
}

/// A stored training session record
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggedSession {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub session_type: String,
    pub duration_seconds: Option<u32>,
    pub notes: Option<String>,
    #[serde(default)]
    pub exercises: Vec<SessionExercise>,
    pub meta: Option<SessionMeta>,
    pub created_at: DateTime<Utc>,
}

/// A logged session as seen by the reconciliation engine
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActualSession {
    pub id: String,
    #[serde(rename = "type")]
    pub session_type: String,
    pub duration_seconds: Option<u32>,
    pub notes: Option<String>,
    #[serde(default)]
    pub metrics: Option<Value>,
    #[serde(default)]
    pub source: Option<String>,
}

impl From<&LoggedSession> for ActualSession {
    fn from(session: &LoggedSession) -> ActualSession {
        ActualSession {
            id: session.id.to_string(),
            session_type: session.session_type.clone(),
            duration_seconds: session.duration_seconds,
            notes: session.notes.clone(),
            metrics: None,
            source: session.meta.as_ref().map(|meta| meta.source.clone()),
        }
    }
}

// ============================================================================
// Plan-vs-Actual Snapshot Types
// ============================================================================

/// Planned-session overlay for one snapshot day
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PlannedOverlay {
    pub session_type: Option<String>,
    pub focus: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl PlannedOverlay {
    /// True when any planned signal is present
    pub fn has_planned_session(&self) -> bool {
        filled(&self.session_type)
            || filled(&self.focus)
            || self.tags.as_ref().map_or(false, |tags| !tags.is_empty())
    }
}

/// Actual-session slice of a snapshot day
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PvaActual {
    pub sessions: Vec<ActualSession>,
}

/// Per-day completion summary computed from plan and ledger
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GymCheckSummary {
    pub total_planned_exercises: u32,
    pub done_exercises: u32,
    pub duration_min: Option<u32>,
    pub notes: Option<String>,
    pub has_any_check: bool,
}

/// Resolved per-day status; derived on every merge, never persisted
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PvaDayStatus {
    Rest,
    PlannedOnly,
    Done,
    Missed,
    Extra,
    PlannedAndExtra,
    Unknown,
}

impl PvaDayStatus {
    /// Parse a status string; empty yields `None`, unrecognized collapses
    /// to `Unknown` so the taxonomy stays closed
    pub fn parse(s: &str) -> Option<PvaDayStatus> {
        match s.trim() {
            "" => None,
            "rest" => Some(PvaDayStatus::Rest),
            "planned_only" => Some(PvaDayStatus::PlannedOnly),
            "done" => Some(PvaDayStatus::Done),
            "missed" => Some(PvaDayStatus::Missed),
            "extra" => Some(PvaDayStatus::Extra),
            "planned_and_extra" => Some(PvaDayStatus::PlannedAndExtra),
            _ => Some(PvaDayStatus::Unknown),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PvaDayStatus::Rest => "rest",
            PvaDayStatus::PlannedOnly => "planned_only",
            PvaDayStatus::Done => "done",
            PvaDayStatus::Missed => "missed",
            PvaDayStatus::Extra => "extra",
            PvaDayStatus::PlannedAndExtra => "planned_and_extra",
            PvaDayStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PvaDayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One day of a plan-vs-actual week snapshot
///
/// Fields the merge does not own (`date`, `actual`, anything in `extra`)
/// pass through untouched.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PvaDay {
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "de_opt_day_key")]
    pub day_key: Option<DayKey>,
    #[serde(default)]
    pub planned: Option<PlannedOverlay>,
    #[serde(default)]
    pub actual: PvaActual,
    #[serde(default, deserialize_with = "de_opt_status")]
    pub status: Option<PvaDayStatus>,
    #[serde(default)]
    pub gym_check: Option<GymCheckSummary>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A full week of plan-vs-actual days
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PvaWeek {
    pub week_key: WeekKey,
    pub range: DateRange,
    pub has_routine_template: bool,
    pub days: Vec<PvaDay>,
}

// ============================================================================
// Attachment Types
// ============================================================================

/// A media attachment linked to a routine, identified by public id
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AttachmentOption {
    pub public_id: String,
    pub url: Option<String>,
    pub secure_url: Option<String>,
    pub name: Option<String>,
    pub resource_type: Option<String>,
}

/// External media-item shape used when attaching media to a session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub public_id: String,
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
}

// ============================================================================
// Routine Document
// ============================================================================

/// The weekly routine aggregate persisted by the routine store
///
/// `meta` is a free-form bag owned by external tooling; the plan and the
/// gym-check ledger live inside it under well-known keys. Unknown top-level
/// fields are preserved through load/save cycles via `extra`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoutineDoc {
    pub week_key: WeekKey,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub split: Option<String>,
    #[serde(default, deserialize_with = "de_day_key_list")]
    pub planned_days: Vec<DayKey>,
    #[serde(default, deserialize_with = "de_lenient_vec")]
    pub attachments: Vec<AttachmentOption>,
    #[serde(default = "empty_meta")]
    pub meta: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RoutineDoc {
    /// A fresh, active routine for the given week
    pub fn new(week_key: WeekKey) -> RoutineDoc {
        RoutineDoc {
            week_key,
            status: Some("active".to_string()),
            title: None,
            split: None,
            planned_days: Vec::new(),
            attachments: Vec::new(),
            meta: empty_meta(),
            extra: Map::new(),
        }
    }
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Broad training category of a catalog movement
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MovementGroup {
    Push,
    Pull,
    Legs,
    Hinge,
    Core,
    Cardio,
    Mobility,
}

/// A movement definition (e.g., "Back Squat")
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Movement {
    pub id: String,
    pub name: String,
    pub group: MovementGroup,
    pub tags: Vec<String>,
    pub reference_url: Option<String>,
}

/// The complete catalog of known movements
#[derive(Clone, Debug)]
pub struct Catalog {
    pub movements: HashMap<String, Movement>,
}

// ============================================================================
// Serde Helpers
// ============================================================================

fn filled(value: &Option<String>) -> bool {
    value.as_deref().map_or(false, |s| !s.trim().is_empty())
}

fn empty_meta() -> Value {
    Value::Object(Map::new())
}

/// Day key from any accepted spelling; errors on unrecognized input so the
/// enclosing entry gets dropped by lenient callers
pub(crate) fn de_day_key<'de, D>(deserializer: D) -> std::result::Result<DayKey, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let raw = String::deserialize(deserializer)?;
    DayKey::parse(&raw).ok_or_else(|| D::Error::custom(format!("unrecognized day key {raw:?}")))
}

/// Day key that degrades to `None` instead of erroring
pub(crate) fn de_opt_day_key<'de, D>(deserializer: D) -> std::result::Result<Option<DayKey>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(DayKey::parse))
}

/// Status string that degrades to `None` when absent or empty
pub(crate) fn de_opt_status<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<PvaDayStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(PvaDayStatus::parse))
}

/// Day-key list that drops unparseable entries and tolerates non-arrays
pub(crate) fn de_day_key_list<'de, D>(deserializer: D) -> std::result::Result<Vec<DayKey>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .iter()
        .filter_map(|item| item.as_str().and_then(DayKey::parse))
        .collect())
}

/// Typed list that drops malformed entries and tolerates non-arrays
pub(crate) fn de_lenient_vec<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_key_parse_accepts_short_and_full_names() {
        assert_eq!(DayKey::parse("Mon"), Some(DayKey::Mon));
        assert_eq!(DayKey::parse("wednesday"), Some(DayKey::Wed));
        assert_eq!(DayKey::parse(" SUN "), Some(DayKey::Sun));
        assert_eq!(DayKey::parse("Funday"), None);
        assert_eq!(DayKey::parse(""), None);
    }

    #[test]
    fn test_day_key_order_is_mon_to_sun() {
        assert_eq!(DayKey::Mon.index(), 0);
        assert_eq!(DayKey::Sun.index(), 6);
        let indices: Vec<usize> = DayKey::ALL.iter().map(|d| d.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_week_key_parse_and_display_round_trip() {
        let week = WeekKey::parse("2026-W07").expect("valid week");
        assert_eq!(week.year(), 2026);
        assert_eq!(week.week(), 7);
        assert_eq!(week.to_string(), "2026-W07");
        assert_eq!(WeekKey::parse("2026-w07"), Some(week));
    }

    #[test]
    fn test_week_key_rejects_invalid_weeks() {
        assert_eq!(WeekKey::parse("2026-W00"), None);
        assert_eq!(WeekKey::parse("2026-W54"), None);
        // 2026 has 53 ISO weeks, 2025 does not
        assert!(WeekKey::parse("2026-W53").is_some());
        assert_eq!(WeekKey::parse("2025-W53"), None);
        assert_eq!(WeekKey::parse("garbage"), None);
        assert_eq!(WeekKey::parse("2026W07"), None);
    }

    #[test]
    fn test_week_key_maps_days_to_dates() {
        let week = WeekKey::parse("2026-W07").expect("valid week");
        let monday = week.date_of(DayKey::Mon);
        let sunday = week.date_of(DayKey::Sun);
        assert_eq!(monday.to_string(), "2026-02-09");
        assert_eq!(sunday.to_string(), "2026-02-15");
        assert_eq!(week.range().from, monday);
        assert_eq!(week.range().to, sunday);
        assert_eq!(WeekKey::for_date(monday), week);
        assert_eq!(WeekKey::for_date(sunday), week);
    }

    #[test]
    fn test_week_key_serializes_as_string() {
        let week = WeekKey::parse("2026-W07").expect("valid week");
        let json = serde_json::to_string(&week).expect("serialize");
        assert_eq!(json, "\"2026-W07\"");
        let back: WeekKey = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, week);
        assert!(serde_json::from_str::<WeekKey>("\"2026-W99\"").is_err());
    }

    #[test]
    fn test_day_plan_wire_field_names_are_camel_case() {
        let plan = DayPlan {
            day_key: DayKey::Wed,
            session_type: Some("push".to_string()),
            focus: None,
            tags: vec!["hypertrophy".to_string()],
            notes: None,
            exercises: vec![ExerciseItem {
                id: "ex-1".to_string(),
                name: "Bench Press".to_string(),
                movement_id: Some("bench_press".to_string()),
                movement_name: Some("Bench Press".to_string()),
                ..ExerciseItem::default()
            }],
        };
        let value = serde_json::to_value(&plan).expect("serialize");
        assert_eq!(value["dayKey"], "Wed");
        assert_eq!(value["sessionType"], "push");
        assert_eq!(value["exercises"][0]["movementId"], "bench_press");
    }

    #[test]
    fn test_pva_day_status_parse_handles_empty_and_unknown() {
        assert_eq!(PvaDayStatus::parse(""), None);
        assert_eq!(PvaDayStatus::parse("  "), None);
        assert_eq!(PvaDayStatus::parse("done"), Some(PvaDayStatus::Done));
        assert_eq!(
            PvaDayStatus::parse("planned_and_extra"),
            Some(PvaDayStatus::PlannedAndExtra)
        );
        assert_eq!(PvaDayStatus::parse("whatever"), Some(PvaDayStatus::Unknown));
    }

    #[test]
    fn test_pva_day_preserves_unknown_fields() {
        let json = r#"{
            "date": "2026-02-11",
            "dayKey": "Wed",
            "externalId": "abc-123",
            "actual": { "sessions": [] }
        }"#;
        let day: PvaDay = serde_json::from_str(json).expect("deserialize");
        assert_eq!(day.day_key, Some(DayKey::Wed));
        assert_eq!(day.extra["externalId"], "abc-123");
        let back = serde_json::to_value(&day).expect("serialize");
        assert_eq!(back["externalId"], "abc-123");
    }

    #[test]
    fn test_pva_day_tolerates_malformed_day_key_and_status() {
        let json = r#"{
            "date": "2026-02-11",
            "dayKey": "Midweek",
            "status": "finished?"
        }"#;
        let day: PvaDay = serde_json::from_str(json).expect("deserialize");
        assert_eq!(day.day_key, None);
        assert_eq!(day.status, Some(PvaDayStatus::Unknown));
        assert!(day.actual.sessions.is_empty());
    }

    #[test]
    fn test_routine_doc_tolerates_malformed_lists() {
        let json = r#"{
            "weekKey": "2026-W07",
            "plannedDays": ["Mon", "Smonday", "Fri", 7],
            "attachments": [{ "publicId": "img1" }, 42, "nope"],
            "meta": null
        }"#;
        let doc: RoutineDoc = serde_json::from_str(json).expect("deserialize");
        assert_eq!(doc.planned_days, vec![DayKey::Mon, DayKey::Fri]);
        assert_eq!(doc.attachments.len(), 1);
        assert_eq!(doc.attachments[0].public_id, "img1");
        assert!(doc.meta.is_null());
    }
}
