//! HabitFlow CLI - Command-line interface for HabitFlow
//!
//! Commands:
//! - init: Create the local profile
//! - habit: Add, edit, remove and list habits
//! - track / today: Record completions and show today's checklist
//! - stats / insights / recommend / dashboard: Derived views
//! - sync: Deliver queued writes to the HabitFlow API
//! - export / import: Snapshot files
//! - doctor: Diagnose configuration, data file and API health

use chrono::{DateTime, Local, Timelike, Utc};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use habitflow::config::{default_config_path, Config};
use habitflow::messages::{
    format_insights, motivational_emoji, progress_bar, streak_message, time_greeting,
    truncate_text, MAX_HABIT_NAME_LEN, MIN_HABIT_NAME_LEN,
};
use habitflow::sync::{DataSource, HttpRemote, RemoteConfig, Sourced};
use habitflow::types::{
    HabitUpdate, Insight, NewEntry, NewHabit, Period, Recommendation, TargetFrequency, User,
};
use habitflow::{
    build_dashboard, recommend, AppState, HabitError, HabitService, InsightGenerator,
    RemoteService, Snapshot, HABITFLOW_VERSION, PRODUCER_NAME,
};

/// HabitFlow - Build better habits, one day at a time
#[derive(Parser)]
#[command(name = "habitflow")]
#[command(author = "HabitFlow Contributors")]
#[command(version = HABITFLOW_VERSION)]
#[command(about = "Track habits, streaks and insights", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/habitflow/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Snapshot file, overrides the configured one
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the local user profile
    Init {
        /// First name
        #[arg(long)]
        name: String,

        #[arg(long)]
        last_name: Option<String>,

        /// User id (default: configured id or a new UUID)
        #[arg(long)]
        user_id: Option<String>,

        /// Replace an existing profile
        #[arg(long)]
        force: bool,
    },

    /// Manage habits
    Habit {
        #[command(subcommand)]
        action: HabitAction,
    },

    /// Record an entry for a habit (completed unless --missed)
    Track {
        /// Habit name or id
        habit: String,

        #[arg(long)]
        missed: bool,

        /// Rating from 1 to 5
        #[arg(long)]
        rating: Option<u8>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Show today's checklist
    Today {
        #[arg(long)]
        json: bool,
    },

    /// Show completion statistics
    Stats {
        /// Period in days: 7, 30 or 90
        #[arg(long, default_value = "7")]
        period: Period,

        #[arg(long)]
        json: bool,
    },

    /// Show personal insights
    Insights {
        #[arg(long)]
        json: bool,
    },

    /// Suggest new habits
    Recommend {
        #[arg(long)]
        json: bool,
    },

    /// Print the full dashboard as JSON
    Dashboard {
        #[arg(long, default_value = "7")]
        period: Period,
    },

    /// Deliver queued writes to the HabitFlow API
    Sync {
        #[arg(long)]
        json: bool,
    },

    /// Write the snapshot to a file
    Export {
        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Replace local data with a snapshot file
    Import {
        /// Input file path (use - for stdin)
        input: PathBuf,
    },

    /// Diagnose configuration, data file and API health
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum HabitAction {
    /// Add a habit
    Add {
        name: String,

        #[arg(long)]
        description: Option<String>,

        /// daily, weekly, 3_times_week, weekdays or weekends
        #[arg(long, default_value = "daily")]
        frequency: TargetFrequency,
    },

    /// Edit a habit
    Edit {
        /// Habit name or id
        habit: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,

        #[arg(long)]
        clear_description: bool,

        #[arg(long)]
        frequency: Option<TargetFrequency>,
    },

    /// Remove a habit (its history is kept)
    Rm {
        /// Habit name or id
        habit: String,
    },

    /// List habits
    List {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string()));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), HabitCliError> {
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let open = || Session::open(&config_path, cli.data_file.clone());

    match cli.command {
        Commands::Init {
            name,
            last_name,
            user_id,
            force,
        } => cmd_init(&mut open()?, name, last_name, user_id, force),

        Commands::Habit { action } => match action {
            HabitAction::Add {
                name,
                description,
                frequency,
            } => cmd_habit_add(&mut open()?, name, description, frequency),
            HabitAction::Edit {
                habit,
                name,
                description,
                clear_description,
                frequency,
            } => {
                let description = if clear_description {
                    Some(None)
                } else {
                    description.map(Some)
                };
                let update = HabitUpdate {
                    name,
                    description,
                    target_frequency: frequency,
                };
                cmd_habit_edit(&mut open()?, &habit, update)
            }
            HabitAction::Rm { habit } => cmd_habit_rm(&mut open()?, &habit),
            HabitAction::List { json } => cmd_habit_list(&open()?, json),
        },

        Commands::Track {
            habit,
            missed,
            rating,
            notes,
        } => cmd_track(&mut open()?, &habit, missed, rating, notes),

        Commands::Today { json } => cmd_today(&open()?, json),

        Commands::Stats { period, json } => cmd_stats(&open()?, period, json),

        Commands::Insights { json } => cmd_insights(&open()?, json),

        Commands::Recommend { json } => cmd_recommend(&open()?, json),

        Commands::Dashboard { period } => {
            let session = open()?;
            let dashboard = build_dashboard(&session.state, Local::now(), period);
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
            Ok(())
        }

        Commands::Sync { json } => cmd_sync(&mut open()?, json),

        Commands::Export { output } => {
            let json = open()?.state.to_json()?;
            write_output(&output, &json)?;
            Ok(())
        }

        Commands::Import { input } => cmd_import(&mut open()?, &input),

        // runs without a session so a broken config or data file can be diagnosed
        Commands::Doctor { json } => cmd_doctor(&config_path, cli.data_file.as_deref(), json),
    }
}

/// Loaded configuration and state for one command
struct Session {
    config: Config,
    state: AppState,
}

impl Session {
    fn open(config_path: &Path, data_file: Option<PathBuf>) -> Result<Self, HabitCliError> {
        let mut config = load_config(config_path)?;
        if let Some(path) = data_file {
            config.data_file = path;
        }

        let mut state = AppState::load(&config.data_file)?;
        state.set_remote_writes(config.remote.enabled);
        state.set_streak_policy(config.streak_policy);

        Ok(Self { config, state })
    }

    fn remote(&self) -> Result<Option<HabitService<HttpRemote>>, HabitCliError> {
        if !self.config.remote.enabled {
            return Ok(None);
        }
        let remote = HttpRemote::new(RemoteConfig::from(&self.config.remote)).map_err(HabitError::from)?;
        Ok(Some(
            HabitService::new(remote).with_max_attempts(self.config.remote.max_attempts),
        ))
    }

    /// Persist local changes, then try to deliver queued writes
    fn commit(&mut self) -> Result<(), HabitCliError> {
        self.state.save(&self.config.data_file)?;

        if let Some(service) = self.remote()? {
            let report = service.flush(&mut self.state);
            if let Some(error) = &report.error {
                tracing::warn!(%error, remaining = report.remaining, "queued writes not delivered");
            }
            if report.sent > 0 || report.dropped > 0 {
                self.state.save(&self.config.data_file)?;
            }
        }
        Ok(())
    }

    fn insights(&self, now: DateTime<Local>) -> Result<Sourced<Vec<Insight>>, HabitCliError> {
        Ok(match self.remote()? {
            Some(service) => service.insights(&self.state, now),
            None => Sourced::local(InsightGenerator::generate(
                &self.state.calculator(now).insight_input(),
            )),
        })
    }

    fn recommendations(
        &self,
        now: DateTime<Local>,
    ) -> Result<Sourced<Vec<Recommendation>>, HabitCliError> {
        Ok(match self.remote()? {
            Some(service) => service.recommendations(&self.state, now),
            None => Sourced::local(recommend(self.state.habits().len(), now.hour())),
        })
    }
}

fn load_config(path: &Path) -> Result<Config, HabitCliError> {
    let mut config = Config::load_from(path)?;
    config.apply_overrides(|key| std::env::var(key).ok())?;
    Ok(config)
}

fn cmd_init(
    session: &mut Session,
    name: String,
    last_name: Option<String>,
    user_id: Option<String>,
    force: bool,
) -> Result<(), HabitCliError> {
    if let Some(existing) = session.state.user() {
        if !force {
            return Err(HabitCliError::AlreadyInitialized(existing.display_name()));
        }
    }

    let user_id = user_id
        .or_else(|| session.config.user_id.clone())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let mut user = User::new(user_id, name);
    user.last_name = last_name;
    let display = user.display_name();

    session.state.set_user(user);
    session.commit()?;

    println!("👋 Welcome to HabitFlow, {}!", display);
    println!("Add your first habit with: habitflow habit add \"Drink water\"");
    Ok(())
}

fn cmd_habit_add(
    session: &mut Session,
    name: String,
    description: Option<String>,
    frequency: TargetFrequency,
) -> Result<(), HabitCliError> {
    let mut new = NewHabit::new(name).with_frequency(frequency);
    if let Some(description) = description {
        new = new.with_description(description);
    }

    let habit = session.state.create_habit(new)?;
    session.commit()?;

    println!("✅ Added \"{}\" ({})", habit.name, habit.target_frequency.label());
    Ok(())
}

fn cmd_habit_edit(session: &mut Session, key: &str, update: HabitUpdate) -> Result<(), HabitCliError> {
    let id = session.state.habits().resolve(key)?.id;
    let habit = session.state.update_habit(id, update)?;
    session.commit()?;

    println!("✏️ Updated \"{}\"", habit.name);
    Ok(())
}

fn cmd_habit_rm(session: &mut Session, key: &str) -> Result<(), HabitCliError> {
    let id = session.state.habits().resolve(key)?.id;
    let habit = session.state.delete_habit(id)?;
    session.commit()?;

    println!("🗑️ Removed \"{}\"", habit.name);
    Ok(())
}

fn cmd_habit_list(session: &Session, json: bool) -> Result<(), HabitCliError> {
    let habits = session.state.habits();

    if json {
        println!("{}", serde_json::to_string_pretty(habits.as_slice())?);
        return Ok(());
    }

    if habits.is_empty() {
        println!("No habits yet. Add one with: habitflow habit add <name>");
        return Ok(());
    }

    for habit in habits.iter() {
        let description = habit
            .description
            .as_deref()
            .map(|d| format!(" - {}", truncate_text(d, 40)))
            .unwrap_or_default();
        println!("• {} [{}]{}", habit.name, habit.target_frequency.label(), description);
    }
    Ok(())
}

fn cmd_track(
    session: &mut Session,
    key: &str,
    missed: bool,
    rating: Option<u8>,
    notes: Option<String>,
) -> Result<(), HabitCliError> {
    let id = session.state.habits().resolve(key)?.id;

    let mut new = if missed {
        NewEntry::missed()
    } else {
        NewEntry::completed()
    }
    .at(Utc::now());
    if let Some(rating) = rating {
        new = new.with_rating(rating);
    }
    if let Some(notes) = notes {
        new = new.with_notes(notes);
    }

    let entry = session.state.record_entry(id, new)?;
    session.commit()?;

    if entry.completed {
        let streak = session.state.calculator(Local::now()).current_streak(id);
        println!("✅ {} done! {}", entry.habit_name, streak_message(streak));
    } else {
        println!("📝 Logged {} as missed. Tomorrow is a new day.", entry.habit_name);
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct TodayItem {
    name: String,
    completed: bool,
    current_streak: u32,
}

fn cmd_today(session: &Session, json: bool) -> Result<(), HabitCliError> {
    let now = Local::now();
    let calc = session.state.calculator(now);

    let items: Vec<TodayItem> = session
        .state
        .habits()
        .iter()
        .map(|h| TodayItem {
            name: h.name.clone(),
            completed: calc.completed_today(h.id),
            current_streak: calc.current_streak(h.id),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    let name = session
        .state
        .user()
        .map(|u| format!(", {}", u.first_name))
        .unwrap_or_default();
    println!("{}{}!\n", time_greeting(now.hour()), name);

    if items.is_empty() {
        println!("No habits yet. Add one with: habitflow habit add <name>");
        return Ok(());
    }

    for item in &items {
        let mark = if item.completed { "✅" } else { "⬜" };
        println!("{} {} (🔥 {})", mark, item.name, item.current_streak);
    }

    let done = calc.completed_today_count();
    println!("\n{}", progress_bar(done, items.len(), 10));
    println!("{}", streak_message(calc.user_stats().streak_days));
    Ok(())
}

fn cmd_stats(session: &Session, period: Period, json: bool) -> Result<(), HabitCliError> {
    let calc = session.state.calculator(Local::now());
    let stats = calc.user_stats();
    let overview = calc.overview(period);

    if json {
        let value = serde_json::json!({
            "stats": stats,
            "overview": overview,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("📊 Statistics (last {} days)", overview.period_days);
    println!("===============================");
    println!(
        "Habits: {} ({} active this week)",
        stats.total_habits, stats.active_habits
    );
    println!(
        "30-day completion: {}% {}",
        stats.completion_rate,
        motivational_emoji(stats.completion_rate)
    );
    println!("Average daily completion: {}%", overview.average_completion_rate);
    println!("Total completions: {}", overview.total_completions);
    println!("Best streak: {} days", overview.best_streak);
    println!("{}", streak_message(stats.streak_days));

    if let Some(best) = &overview.most_consistent {
        println!("Most consistent: {} ({}%)", best.name, best.completion_rate);
    }
    if let Some(pattern) = &overview.weekday_pattern {
        println!("Best day: {} / Hardest day: {}", pattern.best_day, pattern.hardest_day);
    }

    if !overview.habits.is_empty() {
        println!("\nPer habit:");
        for habit in &overview.habits {
            println!(
                "  {} {}% | streak {} (best {}) | {} completions",
                habit.name,
                habit.completion_rate,
                habit.current_streak,
                habit.longest_streak,
                habit.total_entries
            );
        }
    }
    Ok(())
}

fn cmd_insights(session: &Session, json: bool) -> Result<(), HabitCliError> {
    let insights = session.insights(Local::now())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
        return Ok(());
    }

    print!("{}", format_insights(&insights.value));
    print_source_notice(insights.source, session.config.remote.enabled);
    Ok(())
}

fn cmd_recommend(session: &Session, json: bool) -> Result<(), HabitCliError> {
    let recommendations = session.recommendations(Local::now())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
        return Ok(());
    }

    println!("💡 Suggested habits:\n");
    for rec in &recommendations.value {
        println!("• {} [{}]", rec.name, rec.difficulty.as_str());
        println!("  {}", rec.description);
        println!("  {}\n", rec.reason);
    }
    print_source_notice(recommendations.source, session.config.remote.enabled);
    Ok(())
}

fn print_source_notice(source: DataSource, remote_enabled: bool) {
    if remote_enabled && source == DataSource::Local {
        println!("ℹ️ HabitFlow API unavailable, showing locally generated results.");
    }
}

fn cmd_sync(session: &mut Session, json: bool) -> Result<(), HabitCliError> {
    let service = session.remote()?.ok_or(HabitCliError::RemoteDisabled)?;

    let report = service.flush(&mut session.state);
    session.state.save(&session.config.data_file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Synced {} write(s), dropped {}, {} pending",
            report.sent, report.dropped, report.remaining
        );
    }

    match report.error {
        Some(error) => Err(HabitCliError::SyncIncomplete(error)),
        None => Ok(()),
    }
}

fn cmd_import(session: &mut Session, input: &Path) -> Result<(), HabitCliError> {
    let content = read_input(input)?;
    let snapshot: Snapshot = serde_json::from_str(&content)?;

    session.state.replace_snapshot(snapshot)?;
    session.state.save(&session.config.data_file)?;

    eprintln!(
        "Imported {} habit(s) and {} entr(ies)",
        session.state.habits().len(),
        session.state.entries().len()
    );
    Ok(())
}

fn cmd_doctor(config_path: &Path, data_file: Option<&Path>, json: bool) -> Result<(), HabitCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    // Check HabitFlow version
    checks.push(DoctorCheck {
        name: "habitflow_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("HabitFlow version {}", HABITFLOW_VERSION),
    });

    // Check config file
    let config = match load_config(config_path) {
        Ok(config) => {
            let message = if config_path.exists() {
                format!("Config file valid ({})", config_path.display())
            } else {
                format!("No config file at {}, using defaults", config_path.display())
            };
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message,
            });
            config
        }
        Err(e) => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: CliError::from(e).message,
            });
            Config::default()
        }
    };

    // Check data file
    let mut loaded: Option<AppState> = None;
    let data_file = data_file.map(Path::to_path_buf).unwrap_or(config.data_file.clone());
    if data_file.exists() {
        match AppState::load(&data_file) {
            Ok(state) => {
                let orphaned = state.entries().orphaned(state.habits()).count();
                checks.push(DoctorCheck {
                    name: "data_file".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Snapshot valid ({} habits, {} entries, {} orphaned)",
                        state.habits().len(),
                        state.entries().len(),
                        orphaned
                    ),
                });

                let failing = state.outbox().iter().filter(|w| w.attempts > 0).count();
                checks.push(DoctorCheck {
                    name: "outbox".to_string(),
                    status: if failing > 0 {
                        CheckStatus::Warning
                    } else {
                        CheckStatus::Ok
                    },
                    message: format!(
                        "{} pending write(s), {} with failed attempts",
                        state.outbox().len(),
                        failing
                    ),
                });
                loaded = Some(state);
            }
            Err(e) => {
                checks.push(DoctorCheck {
                    name: "data_file".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot load snapshot: {}", e),
                });
            }
        }
    } else {
        checks.push(DoctorCheck {
            name: "data_file".to_string(),
            status: CheckStatus::Warning,
            message: format!("Snapshot file does not exist yet ({})", data_file.display()),
        });
    }

    // Check the API when remote sync is enabled
    if config.remote.enabled {
        match HttpRemote::new(RemoteConfig::from(&config.remote)) {
            Ok(remote) => {
                let service = HabitService::new(remote);
                match service.remote().health() {
                    Ok(()) => {
                        checks.push(DoctorCheck {
                            name: "remote".to_string(),
                            status: CheckStatus::Ok,
                            message: format!("API healthy at {}", config.remote.base_url),
                        });
                        if let Some(state) = &loaded {
                            checks.extend(sync_check(&service, state, Local::now()));
                        }
                    }
                    Err(e) => checks.push(DoctorCheck {
                        name: "remote".to_string(),
                        status: CheckStatus::Warning,
                        message: format!("API unreachable ({}), working offline", e),
                    }),
                }
            }
            Err(e) => checks.push(DoctorCheck {
                name: "remote".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot build HTTP client: {}", e),
            }),
        }
    } else {
        checks.push(DoctorCheck {
            name: "remote".to_string(),
            status: CheckStatus::Ok,
            message: "Remote sync disabled (local only)".to_string(),
        });
    }

    // Check stdout (emoji output is meant for terminals)
    let stdout_check = if atty::is(atty::Stream::Stdout) {
        DoctorCheck {
            name: "stdout".to_string(),
            status: CheckStatus::Ok,
            message: "stdout is a TTY (interactive output)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdout".to_string(),
            status: CheckStatus::Ok,
            message: "stdout is a pipe (use --json for machine-readable output)".to_string(),
        }
    };
    checks.push(stdout_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: HABITFLOW_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("HabitFlow Doctor Report");
        println!("=======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(HabitCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

/// Compare local data with the remote copy; `None` without a profile
fn sync_check<R: RemoteService>(
    service: &HabitService<R>,
    state: &AppState,
    now: DateTime<Local>,
) -> Option<DoctorCheck> {
    match service.status(state, now) {
        Ok(None) => None,
        Ok(Some(status)) if status.is_in_sync() => Some(DoctorCheck {
            name: "sync".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "Remote has all {} habit(s) and {} recent completion(s)",
                status.local_habits, status.local_completions
            ),
        }),
        Ok(Some(status)) => {
            let missing = if status.missing_remotely.is_empty() {
                String::new()
            } else {
                format!(", missing remotely: {}", status.missing_remotely.join(", "))
            };
            Some(DoctorCheck {
                name: "sync".to_string(),
                status: CheckStatus::Warning,
                message: format!(
                    "Remote behind: {}/{} habits, {}/{} completions this week, {} pending write(s){}; run 'habitflow sync'",
                    status.remote_habits,
                    status.local_habits,
                    status.remote_completions,
                    status.local_completions,
                    status.pending_writes,
                    missing
                ),
            })
        }
        Err(e) => Some(DoctorCheck {
            name: "sync".to_string(),
            status: CheckStatus::Warning,
            message: format!("Cannot compare with remote: {}", e),
        }),
    }
}

fn read_input(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        fs::read_to_string(path)
    }
}

fn write_output(path: &Path, content: &str) -> io::Result<()> {
    if path.as_os_str() == "-" {
        println!("{}", content);
        Ok(())
    } else {
        fs::write(path, content)
    }
}

// Error types

#[derive(Debug)]
enum HabitCliError {
    Habit(HabitError),
    Io(io::Error),
    Json(serde_json::Error),
    AlreadyInitialized(String),
    RemoteDisabled,
    SyncIncomplete(String),
    DoctorFailed,
}

impl From<HabitError> for HabitCliError {
    fn from(e: HabitError) -> Self {
        HabitCliError::Habit(e)
    }
}

impl From<io::Error> for HabitCliError {
    fn from(e: io::Error) -> Self {
        HabitCliError::Io(e)
    }
}

impl From<serde_json::Error> for HabitCliError {
    fn from(e: serde_json::Error) -> Self {
        HabitCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<HabitError> for CliError {
    fn from(e: HabitError) -> Self {
        let message = e.to_string();
        let name_hint = format!(
            "Use {}-{} characters and no special symbols",
            MIN_HABIT_NAME_LEN, MAX_HABIT_NAME_LEN
        );
        let (code, hint) = match e {
            HabitError::JsonError(_) => ("JSON_ERROR", Some("Check JSON syntax")),
            HabitError::IoError(_) => ("IO_ERROR", Some("Check file paths and permissions")),
            HabitError::DuplicateHabit(_) => (
                "DUPLICATE_HABIT",
                Some("Habit names are unique regardless of case"),
            ),
            HabitError::UnknownHabit(_) => (
                "UNKNOWN_HABIT",
                Some("Run 'habitflow habit list' to see your habits"),
            ),
            HabitError::InvalidHabitName(_) => (
                "INVALID_NAME",
                Some(name_hint.as_str()),
            ),
            HabitError::InvalidRating(_) => ("INVALID_RATING", Some("Use a rating from 1 to 5")),
            HabitError::InvalidFrequency(_) => (
                "INVALID_FREQUENCY",
                Some("Use daily, weekly, 3_times_week, weekdays or weekends"),
            ),
            HabitError::DateParseError(_) => ("DATE_ERROR", Some("Use RFC 3339 timestamps")),
            HabitError::UnsupportedSnapshot(_) => (
                "SNAPSHOT_VERSION",
                Some("The file was written by a different HabitFlow version"),
            ),
            HabitError::ConfigError(_) => ("CONFIG_ERROR", Some("Run 'habitflow doctor' for details")),
            HabitError::Remote(_) => ("REMOTE_ERROR", Some("Check the API base URL")),
        };

        CliError {
            code: code.to_string(),
            message,
            hint: hint.map(str::to_string),
        }
    }
}

impl From<HabitCliError> for CliError {
    fn from(e: HabitCliError) -> Self {
        match e {
            HabitCliError::Habit(e) => CliError::from(e),
            HabitCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            HabitCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            HabitCliError::AlreadyInitialized(name) => CliError {
                code: "ALREADY_INITIALIZED".to_string(),
                message: format!("A profile for {} already exists", name),
                hint: Some("Pass --force to replace it".to_string()),
            },
            HabitCliError::RemoteDisabled => CliError {
                code: "REMOTE_DISABLED".to_string(),
                message: "Remote sync is disabled".to_string(),
                hint: Some("Set [remote] enabled = true in the config or HABITFLOW_REMOTE=1".to_string()),
            },
            HabitCliError::SyncIncomplete(error) => CliError {
                code: "SYNC_INCOMPLETE".to_string(),
                message: format!("Some writes are still pending: {}", error),
                hint: Some("They will be retried on the next sync".to_string()),
            },
            HabitCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
