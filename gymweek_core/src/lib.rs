#![forbid(unsafe_code)]

//! Core domain model and business logic for the Gymweek system.
//!
//! This crate provides:
//! - Domain types (weeks, plans, gym-check states, sessions)
//! - Plan normalization and meta-bag codecs
//! - Plan-vs-actual reconciliation
//! - Session synthesis from gym-check data
//! - Attachment set and media mapping
//! - Persistence (routine store, session WAL, CSV rollup)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod plan;
pub mod gymcheck;
pub mod reconcile;
pub mod snapshot;
pub mod session;
pub mod attachments;
pub mod storage;
pub mod sessionlog;
pub mod rollup;
pub mod history;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::get_default_catalog;
pub use config::Config;
pub use plan::{normalize_plans, plan_from_meta, set_plan_into_meta};
pub use gymcheck::{day_state_from_meta, ledger_from_meta, set_day_state_into_meta};
pub use reconcile::merge_plan_vs_actual;
pub use snapshot::build_week_snapshot;
pub use session::{build_gym_check_session, BuildSessionError};
pub use attachments::{attachments_set, diff_new_attachment_public_ids, resolve_media_items};
pub use storage::RoutineStore;
pub use sessionlog::{create_session, JsonlSink, SessionSink};
pub use history::load_recent_sessions;
