//! One-shot dashboard API
//!
//! Bundles everything a front-end shows on its main screen into a single
//! serializable value. The `*_json` functions take a snapshot document and
//! an RFC 3339 reference time and are what the C ABI calls into.

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HabitError, Result};
use crate::insights::{recommend, InsightGenerator};
use crate::state::AppState;
use crate::types::{
    Entry, Habit, Insight, Period, Recommendation, StatsOverview, User, UserStats,
};
use crate::{HABITFLOW_VERSION, PRODUCER_NAME};

/// Entries older than this many days are left out of the dashboard
pub const DASHBOARD_ENTRY_DAYS: i64 = 30;

/// Software that produced a dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
}

impl Default for Producer {
    fn default() -> Self {
        Self {
            name: PRODUCER_NAME.to_string(),
            version: HABITFLOW_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub producer: Producer,
    /// Reference time the dashboard was computed for (RFC 3339)
    pub generated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    pub habits: Vec<Habit>,
    /// Entries from the last 30 days, oldest first
    pub entries: Vec<Entry>,
    pub stats: UserStats,
    pub overview: StatsOverview,
    pub insights: Vec<Insight>,
    pub recommendations: Vec<Recommendation>,
}

/// Build the dashboard for `state` as seen at `now`
pub fn build_dashboard<Tz: TimeZone>(state: &AppState, now: DateTime<Tz>, period: Period) -> Dashboard
where
    Tz::Offset: std::fmt::Display,
{
    let calc = state.calculator(now.clone());
    let cutoff = now.with_timezone(&Utc) - Duration::days(DASHBOARD_ENTRY_DAYS);

    let mut entries: Vec<Entry> = state
        .entries()
        .iter()
        .filter(|e| e.timestamp.map_or(true, |ts| ts >= cutoff))
        .cloned()
        .collect();
    // untimed entries last
    entries.sort_by_key(|e| (e.timestamp.is_none(), e.timestamp));

    Dashboard {
        producer: Producer::default(),
        generated_at: now.to_rfc3339(),
        user: state.user().cloned(),
        habits: state.habits().as_slice().to_vec(),
        entries,
        stats: calc.user_stats(),
        overview: calc.overview(period),
        insights: InsightGenerator::generate(&calc.insight_input()),
        recommendations: recommend(state.habits().len(), now.hour()),
    }
}

/// Parse an RFC 3339 reference time, keeping its offset for calendar math
pub fn parse_reference_time(now_rfc3339: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(now_rfc3339.trim())
        .map_err(|e| HabitError::DateParseError(format!("{}: {}", now_rfc3339, e)))
}

/// Dashboard JSON from a snapshot JSON document (weekly period)
pub fn dashboard_from_json(snapshot_json: &str, now_rfc3339: &str) -> Result<String> {
    let state = AppState::from_json(snapshot_json)?;
    let now = parse_reference_time(now_rfc3339)?;
    let dashboard = build_dashboard(&state, now, Period::default());
    Ok(serde_json::to_string(&dashboard)?)
}

/// Insight list JSON from a snapshot JSON document
pub fn insights_from_json(snapshot_json: &str, now_rfc3339: &str) -> Result<String> {
    let state = AppState::from_json(snapshot_json)?;
    let now = parse_reference_time(now_rfc3339)?;
    let insights = InsightGenerator::generate(&state.calculator(now).insight_input());
    Ok(serde_json::to_string(&insights)?)
}

/// Recommendation list JSON for a habit count and local hour
pub fn recommendations_json(habit_count: usize, hour: u32) -> Result<String> {
    Ok(serde_json::to_string(&recommend(habit_count, hour))?)
}
