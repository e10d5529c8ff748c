use clap::{Args, Parser, Subcommand};
use gymweek_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gymweek")]
#[command(about = "Weekly gym planning and plan-vs-actual reconciliation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// ISO week to operate on, e.g. 2026-W07 (defaults to the current week)
    #[arg(long, global = true)]
    week: Option<WeekKey>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the reconciled plan-vs-actual week (default)
    Status,

    /// Author the week's plan
    Plan {
        #[command(subcommand)]
        action: PlanAction,
    },

    /// Check an exercise off (or back on) during the workout
    Check(CheckArgs),

    /// Synthesize and log a session from a day's check-offs
    Log {
        /// Day of the week (Mon..Sun)
        day: DayKey,

        /// Include every planned exercise, not only checked ones
        #[arg(long)]
        all: bool,

        /// Show the session without logging it
        #[arg(long)]
        dry_run: bool,
    },

    /// List recent sessions
    Sessions {
        /// How many days back to look (defaults from config)
        #[arg(long)]
        days: Option<i64>,
    },

    /// Attach a media item to the week's routine
    Attach {
        /// Stable public id of the media item
        public_id: String,

        /// Resolvable URL for the media item
        #[arg(long)]
        url: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Resource type, e.g. image or video
        #[arg(long = "type")]
        resource_type: Option<String>,
    },

    /// List the movement catalog
    Movements,

    /// Roll up logged sessions to CSV
    Rollup {
        /// Clean up processed log files after rollup
        #[arg(long)]
        cleanup: bool,
    },

    /// Archive the week's routine
    Archive,
}

#[derive(Subcommand)]
enum PlanAction {
    /// Show the week's normalized plan
    Show,

    /// Replace a day's session type, focus, tags, and notes
    Set {
        /// Day of the week (Mon..Sun)
        day: DayKey,

        /// Session type, e.g. push, pull, legs
        #[arg(long = "type")]
        session_type: Option<String>,

        /// Session focus, e.g. chest, posterior chain
        #[arg(long)]
        focus: Option<String>,

        /// Tag for the day (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Day-level notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Add an exercise to a day
    Add {
        /// Day of the week (Mon..Sun)
        day: DayKey,

        /// Exercise name, or a catalog movement id like bench_press
        name: String,

        #[arg(long)]
        sets: Option<String>,

        #[arg(long)]
        reps: Option<String>,

        #[arg(long)]
        load: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Attachment public id to link to this exercise (repeatable)
        #[arg(long = "attach")]
        attachments: Vec<String>,
    },

    /// Remove a day's plan entirely
    Clear {
        /// Day of the week (Mon..Sun)
        day: DayKey,
    },
}

#[derive(Args)]
struct CheckArgs {
    /// Day of the week (Mon..Sun)
    day: DayKey,

    /// Exercise id or name, as listed by `plan show`
    exercise: String,

    /// Un-check instead of checking off
    #[arg(long)]
    undo: bool,

    /// Outcome notes for this exercise
    #[arg(long)]
    notes: Option<String>,

    /// Media public id to record against this exercise (repeatable)
    #[arg(long)]
    media: Vec<String>,

    /// Minutes spent on this exercise
    #[arg(long)]
    duration: Option<u32>,

    /// Whole-workout duration in minutes, stored on the day
    #[arg(long)]
    day_duration: Option<u32>,

    /// Day-level notes
    #[arg(long)]
    day_notes: Option<String>,
}

fn main() -> Result<()> {
    // Initialize logging
    gymweek_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory and target week
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let week = cli.week.unwrap_or_else(WeekKey::current);
    tracing::debug!("Using data directory {}", data_dir.display());

    match cli.command {
        Some(Commands::Status) | None => cmd_status(data_dir, week),
        Some(Commands::Plan { action }) => cmd_plan(data_dir, week, action, &config),
        Some(Commands::Check(check)) => cmd_check(data_dir, week, check),
        Some(Commands::Log { day, all, dry_run }) => cmd_log(data_dir, week, day, all, dry_run),
        Some(Commands::Sessions { days }) => {
            cmd_sessions(data_dir, days.unwrap_or(config.history.default_days))
        }
        Some(Commands::Attach {
            public_id,
            url,
            name,
            resource_type,
        }) => cmd_attach(data_dir, week, public_id, url, name, resource_type),
        Some(Commands::Movements) => cmd_movements(&config),
        Some(Commands::Rollup { cleanup }) => cmd_rollup(data_dir, cleanup),
        Some(Commands::Archive) => cmd_archive(data_dir, week),
    }
}

fn cmd_status(data_dir: PathBuf, week: WeekKey) -> Result<()> {
    let log_path = data_dir.join("wal").join("sessions.wal");
    let csv_path = data_dir.join("sessions.csv");

    let store = RoutineStore::new(&data_dir);
    let routine = store.get(week)?;

    let sessions = gymweek_core::history::load_sessions_for_week(&log_path, &csv_path, week)?;
    let today = chrono::Utc::now().date_naive();
    let snapshot = build_week_snapshot(week, &sessions, routine.as_ref(), today);
    let merged = merge_plan_vs_actual(&snapshot, routine.as_ref());

    display_week(&merged, routine.as_ref());
    Ok(())
}

fn cmd_plan(data_dir: PathBuf, week: WeekKey, action: PlanAction, config: &Config) -> Result<()> {
    let store = RoutineStore::new(&data_dir);

    match action {
        PlanAction::Show => {
            let Some(routine) = store.get(week)? else {
                println!("No routine stored for {}.", week);
                return Ok(());
            };
            display_plan(week, &plan_from_meta(&routine.meta));
            Ok(())
        }

        PlanAction::Set {
            day,
            session_type,
            focus,
            tags,
            notes,
        } => {
            store.update(week, |doc| {
                let mut plans = plan_from_meta(&doc.meta);
                let slot = &mut plans[day.index()];
                slot.session_type = session_type;
                slot.focus = focus;
                slot.tags = tags;
                slot.notes = notes;
                let planned = slot.has_planned_session() || !slot.exercises.is_empty();
                set_plan_into_meta(&mut doc.meta, &plans);
                set_planned_day(doc, day, planned);
                Ok(())
            })?;
            println!("✓ Plan updated for {} {}", week, day);
            Ok(())
        }

        PlanAction::Add {
            day,
            name,
            sets,
            reps,
            load,
            notes,
            attachments,
        } => {
            let catalog = gymweek_core::catalog::build_catalog(&config.catalog);
            let movement = catalog.movement(&name).cloned();

            let display_name = movement
                .as_ref()
                .map(|m| m.name.clone())
                .unwrap_or_else(|| name.clone());
            let item = ExerciseItem {
                id: gymweek_core::plan::new_exercise_id(),
                name: display_name.clone(),
                sets,
                reps,
                load,
                notes,
                movement_id: movement.as_ref().map(|m| m.id.clone()),
                movement_name: movement.as_ref().map(|m| m.name.clone()),
                attachment_public_ids: attachments,
            };
            let item_id = item.id.clone();

            store.update(week, |doc| {
                let mut plans = plan_from_meta(&doc.meta);
                plans[day.index()].exercises.push(item);
                set_plan_into_meta(&mut doc.meta, &plans);
                set_planned_day(doc, day, true);
                Ok(())
            })?;

            println!("✓ Added {} to {} {}", display_name, week, day);
            println!("  id: {}", item_id);
            Ok(())
        }

        PlanAction::Clear { day } => {
            store.update(week, |doc| {
                let mut plans = plan_from_meta(&doc.meta);
                plans[day.index()] = DayPlan::empty(day);
                set_plan_into_meta(&mut doc.meta, &plans);
                set_planned_day(doc, day, false);
                Ok(())
            })?;
            println!("✓ Cleared plan for {} {}", week, day);
            Ok(())
        }
    }
}

fn cmd_check(data_dir: PathBuf, week: WeekKey, check: CheckArgs) -> Result<()> {
    let CheckArgs {
        day,
        exercise,
        undo,
        notes,
        media,
        duration,
        day_duration,
        day_notes,
    } = check;
    let store = RoutineStore::new(&data_dir);

    let doc = store.update(week, |doc| {
        let plans = plan_from_meta(&doc.meta);
        let id = find_exercise(&plans[day.index()], &exercise)?.id.clone();

        let mut state = day_state_from_meta(&doc.meta, day).unwrap_or_default();
        let entry = state.exercise_mut(&id);
        entry.done = !undo;
        if let Some(n) = notes {
            entry.notes = Some(n);
        }
        if let Some(minutes) = duration {
            entry.duration_min = Some(minutes);
        }
        for public_id in media {
            if !entry.media_public_ids.contains(&public_id) {
                entry.media_public_ids.push(public_id);
            }
        }
        if let Some(minutes) = day_duration {
            state.duration_min = Some(minutes);
        }
        if let Some(n) = day_notes {
            state.notes = Some(n);
        }
        set_day_state_into_meta(&mut doc.meta, day, &state);
        Ok(())
    })?;

    // Summarize the day from the saved document
    let plans = plan_from_meta(&doc.meta);
    let state = day_state_from_meta(&doc.meta, day).unwrap_or_default();
    let day_plan = &plans[day.index()];
    let done = day_plan
        .exercises
        .iter()
        .filter(|item| state.exercises.get(&item.id).map_or(false, |e| e.done))
        .count();

    if undo {
        println!("✓ Unchecked {}", exercise);
    } else {
        println!("✓ Checked off {}", exercise);
    }
    println!("  {} {}: {}/{} done", week, day, done, day_plan.exercises.len());
    Ok(())
}

fn cmd_log(data_dir: PathBuf, week: WeekKey, day: DayKey, all: bool, dry_run: bool) -> Result<()> {
    // Ensure directories exist
    let wal_dir = data_dir.join("wal");
    std::fs::create_dir_all(&wal_dir)?;
    let log_path = wal_dir.join("sessions.wal");
    let media_path = wal_dir.join("session_media.wal");

    let store = RoutineStore::new(&data_dir);
    let Some(routine) = store.get(week)? else {
        return Err(Error::Storage(format!("no routine stored for {}", week)));
    };

    let body = match build_gym_check_session(&routine, week, day.as_str(), !all) {
        Ok(body) => body,
        Err(e) => {
            eprintln!("Cannot log session: {}", e);
            return Err(e.into());
        }
    };

    display_session_body(week, day, &body);

    if dry_run {
        println!("\n[Dry run - not logging session]");
        return Ok(());
    }

    // Collect checked media before the body is consumed
    let mut checked_ids = Vec::new();
    for exercise in &body.exercises {
        checked_ids.extend(exercise.media_public_ids.iter().cloned());
    }

    let mut sink = JsonlSink::new(&log_path);
    let session = create_session(&mut sink, body, week.date_of(day))?;
    println!("\n✓ Session logged!");
    println!("  id: {}", session.id);

    // The session is already on disk at this point; an attach failure is
    // partial success, not something to retry from the top.
    let items = resolve_media_items(&routine, &checked_ids);
    if let Err(e) = gymweek_core::sessionlog::attach_media(&media_path, session.id, &items) {
        eprintln!("Session {} was logged but attaching media failed: {}", session.id, e);
        return Err(e);
    }
    if !items.is_empty() {
        println!("  media: {} item(s) attached", items.len());
    }
    Ok(())
}

fn cmd_sessions(data_dir: PathBuf, days: i64) -> Result<()> {
    let log_path = data_dir.join("wal").join("sessions.wal");
    let csv_path = data_dir.join("sessions.csv");

    let sessions = load_recent_sessions(&log_path, &csv_path, days)?;
    if sessions.is_empty() {
        println!("No sessions in the last {} days.", days);
        return Ok(());
    }

    println!("\n  {} session(s) in the last {} days\n", sessions.len(), days);
    for session in &sessions {
        let mut line = format!("  {}  {:<10}", session.date, session.session_type);
        if let Some(seconds) = session.duration_seconds {
            line.push_str(&format!("  {:>3} min", seconds / 60));
        }
        if let Some(meta) = &session.meta {
            line.push_str(&format!("  [{} {} {}]", meta.source, meta.week_key, meta.day_key));
        }
        println!("{}", line);
    }
    println!();
    Ok(())
}

fn cmd_attach(
    data_dir: PathBuf,
    week: WeekKey,
    public_id: String,
    url: String,
    name: Option<String>,
    resource_type: Option<String>,
) -> Result<()> {
    let store = RoutineStore::new(&data_dir);

    let before = match store.get(week)? {
        Some(doc) => attachments_set(&doc),
        None => Vec::new(),
    };

    let attachment = AttachmentOption {
        public_id: public_id.clone(),
        url: Some(url),
        secure_url: None,
        name,
        resource_type,
    };
    let doc = store.update(week, |doc| {
        if let Some(existing) = doc
            .attachments
            .iter_mut()
            .find(|a| a.public_id == attachment.public_id)
        {
            *existing = attachment;
        } else {
            doc.attachments.push(attachment);
        }
        Ok(())
    })?;

    let after = attachments_set(&doc);
    let new_ids = diff_new_attachment_public_ids(&before, &after);
    if new_ids.is_empty() {
        println!("✓ Updated attachment {}", public_id);
    } else {
        println!("✓ Attached {}", public_id);
    }
    println!("  {} attachment(s) on {}", after.len(), week);
    Ok(())
}

fn cmd_movements(config: &Config) -> Result<()> {
    let catalog = gymweek_core::catalog::build_catalog(&config.catalog);
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    println!("\n  {} movement(s)\n", catalog.movements.len());
    for movement in catalog.sorted_movements() {
        let mut line = format!(
            "  {:<20} {:<9} {}",
            movement.id,
            format!("{:?}", movement.group),
            movement.name
        );
        if !movement.tags.is_empty() {
            line.push_str(&format!("  [{}]", movement.tags.join(", ")));
        }
        println!("{}", line);
    }
    println!();
    Ok(())
}

fn cmd_rollup(data_dir: PathBuf, cleanup: bool) -> Result<()> {
    let wal_dir = data_dir.join("wal");
    let log_path = wal_dir.join("sessions.wal");
    let csv_path = data_dir.join("sessions.csv");

    if !log_path.exists() {
        println!("No session log found - nothing to roll up.");
        return Ok(());
    }

    let count = gymweek_core::rollup::log_to_csv_and_archive(&log_path, &csv_path)?;

    println!("✓ Rolled up {} sessions to CSV", count);
    println!("  CSV: {}", csv_path.display());

    if cleanup {
        let cleaned = gymweek_core::rollup::cleanup_processed_logs(&wal_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed log files", cleaned);
        }
    }

    Ok(())
}

fn cmd_archive(data_dir: PathBuf, week: WeekKey) -> Result<()> {
    let store = RoutineStore::new(&data_dir);
    store.archive(week)?;
    println!("✓ Archived routine for {}", week);
    Ok(())
}

/// Keep the routine's top-level planned days in step with the authored plan
fn set_planned_day(doc: &mut RoutineDoc, day: DayKey, planned: bool) {
    doc.planned_days.retain(|d| *d != day);
    if planned {
        doc.planned_days.push(day);
        doc.planned_days.sort_by_key(|d| d.index());
    }
}

/// Resolve an exercise by id, falling back to a unique name match
fn find_exercise<'a>(plan: &'a DayPlan, needle: &str) -> Result<&'a ExerciseItem> {
    if let Some(item) = plan.exercises.iter().find(|item| item.id == needle) {
        return Ok(item);
    }

    let lowered = needle.to_lowercase();
    let mut matches = plan
        .exercises
        .iter()
        .filter(|item| item.name.to_lowercase() == lowered);
    match (matches.next(), matches.next()) {
        (Some(item), None) => Ok(item),
        (Some(_), Some(_)) => Err(Error::Other(format!(
            "multiple exercises named {:?} on {}; use the id",
            needle, plan.day_key
        ))),
        (None, _) => {
            if plan.exercises.is_empty() {
                return Err(Error::Other(format!(
                    "no exercises planned for {}",
                    plan.day_key
                )));
            }
            let known: Vec<String> = plan
                .exercises
                .iter()
                .map(|item| format!("{} ({})", item.name, item.id))
                .collect();
            Err(Error::Other(format!(
                "no exercise {:?} on {}; known: {}",
                needle,
                plan.day_key,
                known.join(", ")
            )))
        }
    }
}

fn display_week(week: &PvaWeek, routine: Option<&RoutineDoc>) {
    println!("\n╭─────────────────────────────────────────╮");
    println!(
        "│  WEEK {}  ({} .. {})",
        week.week_key, week.range.from, week.range.to
    );
    println!("╰─────────────────────────────────────────╯");

    match routine {
        Some(doc) => {
            if let Some(title) = &doc.title {
                println!("  {}", title);
            }
            if doc.status.as_deref() == Some("archived") {
                println!("  [archived]");
            }
        }
        None => println!("  (no routine stored for this week)"),
    }
    println!();

    for day in &week.days {
        let key = day.day_key.map(DayKey::as_str).unwrap_or("???");
        let status = day.status.map(PvaDayStatus::as_str).unwrap_or("-");
        let mut line = format!("  {} {}  {:<17}", key, day.date, status);

        if let Some(planned) = &day.planned {
            if let Some(session_type) = &planned.session_type {
                line.push_str(&format!(" {}", session_type));
            }
            if let Some(focus) = &planned.focus {
                line.push_str(&format!(" ({})", focus));
            }
        }
        if let Some(check) = &day.gym_check {
            if check.total_planned_exercises > 0 {
                line.push_str(&format!(
                    "  {}/{} ✓",
                    check.done_exercises, check.total_planned_exercises
                ));
            }
        }
        if !day.actual.sessions.is_empty() {
            line.push_str(&format!("  {} session(s)", day.actual.sessions.len()));
        }
        println!("{}", line);
    }
    println!();
}

fn display_plan(week: WeekKey, plans: &[DayPlan]) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  PLAN {}", week);
    println!("╰─────────────────────────────────────────╯");
    println!();

    for plan in plans {
        let mut header = format!("  {}", plan.day_key);
        if let Some(session_type) = &plan.session_type {
            header.push_str(&format!("  {}", session_type));
        }
        if let Some(focus) = &plan.focus {
            header.push_str(&format!(" ({})", focus));
        }
        if !plan.tags.is_empty() {
            header.push_str(&format!("  [{}]", plan.tags.join(", ")));
        }
        if !plan.has_planned_session() && plan.exercises.is_empty() {
            header.push_str("  -");
        }
        println!("{}", header);

        if let Some(notes) = &plan.notes {
            println!("      {}", notes);
        }
        for item in &plan.exercises {
            println!(
                "    → {}{}  [{}]",
                item.name,
                format_set_scheme(&item.sets, &item.reps, &item.load),
                item.id
            );
        }
    }
    println!();
}

fn display_session_body(week: WeekKey, day: DayKey, body: &CreateSessionBody) {
    println!("\n╭─────────────────────────────────────────╮");
    println!(
        "│  {} SESSION  {} {}",
        body.session_type.to_uppercase(),
        week,
        day
    );
    println!("╰─────────────────────────────────────────╯");
    println!();

    if let Some(seconds) = body.duration_seconds {
        println!("  Duration: {} min", seconds / 60);
    }
    if let Some(notes) = &body.notes {
        println!("  Notes: {}", notes);
    }

    for exercise in &body.exercises {
        println!(
            "  → {}{}",
            exercise.name,
            format_set_scheme(&exercise.sets, &exercise.reps, &exercise.load)
        );
        if let Some(notes) = &exercise.notes {
            println!("      {}", notes);
        }
    }
}

fn format_set_scheme(
    sets: &Option<String>,
    reps: &Option<String>,
    load: &Option<String>,
) -> String {
    let mut out = String::new();
    match (sets, reps) {
        (Some(sets), Some(reps)) => out.push_str(&format!("  {} x {}", sets, reps)),
        (Some(sets), None) => out.push_str(&format!("  {} sets", sets)),
        (None, Some(reps)) => out.push_str(&format!("  {} reps", reps)),
        (None, None) => {}
    }
    if let Some(load) = load {
        out.push_str(&format!(" @ {}", load));
    }
    out
}
