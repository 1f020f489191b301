//! HabitFlow - Offline-first habit tracking core
//!
//! HabitFlow keeps a user's habits and their completion log, and derives
//! everything a front-end needs from them: streaks, completion rates, daily
//! series, weekday patterns, rule-based insights and habit suggestions.
//!
//! ## Modules
//!
//! - **State**: habit registry, entry log and the persisted JSON snapshot
//! - **Stats**: streaks and completion statistics relative to a reference time
//! - **Insights**: rule-based insights and catalog recommendations
//! - **Sync**: optional HabitFlow API with a write-behind outbox
//! - **Dashboard / FFI**: one-shot JSON API and its C ABI

pub mod config;
pub mod dashboard;
pub mod entries;
pub mod error;
pub mod insights;
pub mod messages;
pub mod registry;
pub mod state;
pub mod stats;
pub mod sync;
pub mod types;

// FFI bindings for C interop (on by default for cdylib/staticlib builds)
#[cfg(feature = "ffi")]
pub mod ffi;

pub use config::Config;
pub use dashboard::{build_dashboard, dashboard_from_json, Dashboard};
pub use error::{HabitError, RemoteError};
pub use insights::{recommend, InsightGenerator};
pub use state::{AppState, Snapshot};
pub use stats::StatsCalculator;
pub use sync::{DataSource, HabitService, RemoteService, Sourced};

/// HabitFlow version embedded in dashboards
pub const HABITFLOW_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for dashboards
pub const PRODUCER_NAME: &str = "habitflow";
