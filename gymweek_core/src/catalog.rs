//! Built-in movement catalog.
//!
//! Plan exercises can be created from a catalog movement; the plan stores
//! an id + name snapshot, so later catalog edits never rewrite authored
//! plans. Custom movements from the config file are merged over the
//! built-ins by id.

use crate::config::CatalogConfig;
use crate::types::{Catalog, Movement, MovementGroup};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog of built-in movements
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for testing and custom catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

/// Default catalog with config-defined custom movements merged over it
pub fn build_catalog(config: &CatalogConfig) -> Catalog {
    let mut catalog = build_default_catalog_internal();
    for custom in &config.custom {
        catalog.movements.insert(
            custom.id.clone(),
            Movement {
                id: custom.id.clone(),
                name: custom.name.clone(),
                group: custom.group,
                tags: custom.tags.clone(),
                reference_url: custom.url.clone(),
            },
        );
    }
    catalog
}

/// Internal function that actually builds the catalog
fn build_default_catalog_internal() -> Catalog {
    let mut movements = HashMap::new();

    let mut add = |id: &str, name: &str, group: MovementGroup, tags: &[&str], url: Option<&str>| {
        movements.insert(
            id.to_string(),
            Movement {
                id: id.to_string(),
                name: name.to_string(),
                group,
                tags: tags.iter().map(|t| t.to_string()).collect(),
                reference_url: url.map(str::to_string),
            },
        );
    };

    // ========================================================================
    // Legs / Hinge
    // ========================================================================

    add(
        "back_squat",
        "Back Squat",
        MovementGroup::Legs,
        &["barbell", "squat", "compound"],
        Some("https://en.wikipedia.org/wiki/Squat_(exercise)"),
    );
    add(
        "front_squat",
        "Front Squat",
        MovementGroup::Legs,
        &["barbell", "squat"],
        None,
    );
    add(
        "leg_press",
        "Leg Press",
        MovementGroup::Legs,
        &["machine"],
        None,
    );
    add(
        "deadlift",
        "Deadlift",
        MovementGroup::Hinge,
        &["barbell", "posterior_chain", "compound"],
        Some("https://en.wikipedia.org/wiki/Deadlift"),
    );
    add(
        "romanian_deadlift",
        "Romanian Deadlift",
        MovementGroup::Hinge,
        &["barbell", "hamstrings"],
        None,
    );
    add(
        "hip_thrust",
        "Hip Thrust",
        MovementGroup::Hinge,
        &["barbell", "glutes"],
        None,
    );

    // ========================================================================
    // Push / Pull
    // ========================================================================

    add(
        "bench_press",
        "Bench Press",
        MovementGroup::Push,
        &["barbell", "chest", "compound"],
        Some("https://en.wikipedia.org/wiki/Bench_press"),
    );
    add(
        "incline_db_press",
        "Incline Dumbbell Press",
        MovementGroup::Push,
        &["dumbbell", "chest"],
        None,
    );
    add(
        "overhead_press",
        "Overhead Press",
        MovementGroup::Push,
        &["barbell", "shoulders"],
        Some("https://en.wikipedia.org/wiki/Overhead_press"),
    );
    add(
        "triceps_pushdown",
        "Triceps Pushdown",
        MovementGroup::Push,
        &["cable", "arms"],
        None,
    );
    add(
        "barbell_row",
        "Barbell Row",
        MovementGroup::Pull,
        &["barbell", "back", "compound"],
        None,
    );
    add(
        "pullup",
        "Pull-up",
        MovementGroup::Pull,
        &["bodyweight", "back"],
        Some("https://en.wikipedia.org/wiki/Pull-up_(exercise)"),
    );
    add(
        "lat_pulldown",
        "Lat Pulldown",
        MovementGroup::Pull,
        &["cable", "back"],
        None,
    );
    add(
        "dumbbell_curl",
        "Dumbbell Curl",
        MovementGroup::Pull,
        &["dumbbell", "arms"],
        None,
    );

    // ========================================================================
    // Core / Cardio / Mobility
    // ========================================================================

    add(
        "plank",
        "Plank",
        MovementGroup::Core,
        &["bodyweight", "isometric"],
        Some("https://en.wikipedia.org/wiki/Plank_(exercise)"),
    );
    add(
        "hanging_leg_raise",
        "Hanging Leg Raise",
        MovementGroup::Core,
        &["bodyweight"],
        None,
    );
    add(
        "treadmill_run",
        "Treadmill Run",
        MovementGroup::Cardio,
        &["machine", "conditioning"],
        None,
    );
    add(
        "couch_stretch",
        "Couch Stretch",
        MovementGroup::Mobility,
        &["hips"],
        None,
    );

    Catalog { movements }
}

impl Catalog {
    /// Look up a movement by id
    pub fn movement(&self, id: &str) -> Option<&Movement> {
        self.movements.get(id)
    }

    /// Movements sorted by display name, for listings
    pub fn sorted_movements(&self) -> Vec<&Movement> {
        let mut movements: Vec<&Movement> = self.movements.values().collect();
        movements.sort_by(|a, b| a.name.cmp(&b.name));
        movements
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, movement) in &self.movements {
            if id.is_empty() || movement.id.is_empty() {
                errors.push("Movement has empty ID".to_string());
            }
            if id != &movement.id {
                errors.push(format!(
                    "Movement key '{}' doesn't match movement.id '{}'",
                    id, movement.id
                ));
            }
            if movement.name.is_empty() {
                errors.push(format!("Movement '{}' has empty name", id));
            }
        }

        // Two ids with the same display name make plan snapshots ambiguous
        let mut names_seen = HashSet::new();
        let mut sorted: Vec<&Movement> = self.movements.values().collect();
        sorted.sort_by(|a, b| a.id.cmp(&b.id));
        for movement in sorted {
            let lowered = movement.name.to_lowercase();
            if !lowered.is_empty() && !names_seen.insert(lowered) {
                errors.push(format!(
                    "Movement '{}' duplicates display name '{}'",
                    movement.id, movement.name
                ));
            }
        }

        errors
    }
}
