//! Core types for HabitFlow
//!
//! This module defines the records that flow through the crate: habit
//! definitions and completion entries (the persisted data), and the
//! statistics, insights and recommendations derived from them.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::HabitError;

/// Owner id used for habits and entries created before a user profile exists
pub const LOCAL_USER_ID: &str = "local";

/// Stable habit identity, independent of the display name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(Uuid);

impl HabitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HabitId {
    type Err = HabitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(HabitId)
            .map_err(|_| HabitError::UnknownHabit(s.to_string()))
    }
}

/// Entry identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How often the user intends to perform a habit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetFrequency {
    #[default]
    Daily,
    Weekly,
    #[serde(rename = "3_times_week")]
    ThreeTimesWeek,
    Weekdays,
    Weekends,
}

impl TargetFrequency {
    pub const ALL: [TargetFrequency; 5] = [
        TargetFrequency::Daily,
        TargetFrequency::Weekly,
        TargetFrequency::ThreeTimesWeek,
        TargetFrequency::Weekdays,
        TargetFrequency::Weekends,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetFrequency::Daily => "daily",
            TargetFrequency::Weekly => "weekly",
            TargetFrequency::ThreeTimesWeek => "3_times_week",
            TargetFrequency::Weekdays => "weekdays",
            TargetFrequency::Weekends => "weekends",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            TargetFrequency::Daily => "Daily",
            TargetFrequency::Weekly => "Weekly",
            TargetFrequency::ThreeTimesWeek => "3 times a week",
            TargetFrequency::Weekdays => "Weekdays only",
            TargetFrequency::Weekends => "Weekends only",
        }
    }
}

impl fmt::Display for TargetFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TargetFrequency {
    type Err = HabitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(TargetFrequency::Daily),
            "weekly" => Ok(TargetFrequency::Weekly),
            "3_times_week" | "3x" => Ok(TargetFrequency::ThreeTimesWeek),
            "weekdays" => Ok(TargetFrequency::Weekdays),
            "weekends" => Ok(TargetFrequency::Weekends),
            _ => Err(HabitError::InvalidFrequency(s.to_string())),
        }
    }
}

/// User profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub joined_at: DateTime<Utc>,
}

impl User {
    pub fn new(user_id: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: None,
            first_name: first_name.into(),
            last_name: None,
            email: None,
            joined_at: Utc::now(),
        }
    }

    /// First and last name joined for display
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

/// A habit definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    /// Display name, unique per user (case-insensitive)
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub target_frequency: TargetFrequency,
    /// Owning user id
    pub owner: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a habit
#[derive(Debug, Clone, Default)]
pub struct NewHabit {
    pub name: String,
    pub description: Option<String>,
    pub target_frequency: TargetFrequency,
}

impl NewHabit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_frequency(mut self, frequency: TargetFrequency) -> Self {
        self.target_frequency = frequency;
        self
    }
}

/// Partial update applied to an existing habit
#[derive(Debug, Clone, Default)]
pub struct HabitUpdate {
    pub name: Option<String>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
    pub target_frequency: Option<TargetFrequency>,
}

/// A single completion record. Immutable once appended to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub habit_id: HabitId,
    /// Habit name at the time the entry was recorded
    pub habit_name: String,
    pub owner: String,
    pub completed: bool,
    /// Self-reported rating, 1-5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Entry {
    /// Calendar date of this entry in the time zone of `now`.
    ///
    /// Entries without a timestamp are treated as happening at `now`.
    pub fn local_date<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> NaiveDate {
        match self.timestamp {
            Some(ts) => ts.with_timezone(&now.timezone()).date_naive(),
            None => now.date_naive(),
        }
    }

    /// Instant of this entry, `now` when it carries no timestamp
    pub fn instant<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Utc> {
        self.timestamp.unwrap_or_else(|| now.with_timezone(&Utc))
    }
}

/// Input for recording an entry
#[derive(Debug, Clone, Default)]
pub struct NewEntry {
    pub completed: bool,
    pub rating: Option<u8>,
    pub notes: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewEntry {
    /// A completed entry stamped with the current time
    pub fn completed() -> Self {
        Self {
            completed: true,
            timestamp: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// A missed (not completed) entry stamped with the current time
    pub fn missed() -> Self {
        Self {
            completed: false,
            timestamp: Some(Utc::now()),
            ..Default::default()
        }
    }

    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        self.notes = if notes.trim().is_empty() { None } else { Some(notes) };
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// How the current streak treats a habit not yet completed today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakPolicy {
    /// The streak must include the reference day
    #[default]
    Strict,
    /// A streak ending yesterday is still in progress
    AllowYesterday,
}

impl FromStr for StreakPolicy {
    type Err = HabitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(StreakPolicy::Strict),
            "allow_yesterday" => Ok(StreakPolicy::AllowYesterday),
            _ => Err(HabitError::ConfigError(format!(
                "Unknown streak policy: {}",
                s
            ))),
        }
    }
}

/// Statistics window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    Week,
    Month,
    Quarter,
}

impl Period {
    pub fn days(&self) -> u32 {
        match self {
            Period::Week => 7,
            Period::Month => 30,
            Period::Quarter => 90,
        }
    }
}

impl FromStr for Period {
    type Err = HabitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7" | "week" => Ok(Period::Week),
            "30" | "month" => Ok(Period::Month),
            "90" | "quarter" => Ok(Period::Quarter),
            _ => Err(HabitError::ConfigError(format!(
                "Unknown period: {} (expected 7, 30 or 90)",
                s
            ))),
        }
    }
}

/// Per-habit statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitStats {
    pub habit_id: HabitId,
    pub name: String,
    /// Number of completed entries
    pub total_entries: usize,
    /// Completions per day since the habit was created (0-100)
    pub completion_rate: u8,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_completed: Option<DateTime<Utc>>,
    pub completed_today: bool,
}

/// Aggregate statistics for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_habits: usize,
    /// Habits with at least one completion in the last 7 days
    pub active_habits: usize,
    /// 30-day completion rate (0-100)
    pub completion_rate: u8,
    /// Consecutive days with any completed habit
    pub streak_days: u32,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Completion summary for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCompletion {
    pub date: NaiveDate,
    /// Habits completed on this day
    pub completed: usize,
    /// Habits registered
    pub total: usize,
    pub percentage: u8,
}

/// Best and hardest weekday by completion count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayPattern {
    pub best_day: String,
    pub hardest_day: String,
}

/// Habit with the highest completion rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MostConsistent {
    pub name: String,
    pub completion_rate: u8,
}

/// Everything the statistics view needs for one period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsOverview {
    pub period_days: u32,
    pub daily: Vec<DailyCompletion>,
    pub habits: Vec<HabitStats>,
    pub total_completions: usize,
    pub average_completion_rate: u8,
    pub best_streak: u32,
    pub most_consistent: Option<MostConsistent>,
    pub weekday_pattern: Option<WeekdayPattern>,
}

/// Insight category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    Improvement,
    Motivation,
    Pattern,
    Recommendation,
    Achievement,
}

impl InsightCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightCategory::Improvement => "improvement",
            InsightCategory::Motivation => "motivation",
            InsightCategory::Pattern => "pattern",
            InsightCategory::Recommendation => "recommendation",
            InsightCategory::Achievement => "achievement",
        }
    }
}

impl fmt::Display for InsightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "improvement" => Ok(InsightCategory::Improvement),
            "motivation" => Ok(InsightCategory::Motivation),
            "pattern" => Ok(InsightCategory::Pattern),
            "recommendation" => Ok(InsightCategory::Recommendation),
            "achievement" => Ok(InsightCategory::Achievement),
            _ => Err(format!("Unknown insight category: {}", s)),
        }
    }
}

/// Insight priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Numeric rank for sorting (higher = more urgent)
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A templated observation derived from statistics. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub text: String,
    pub category: InsightCategory,
    /// Confidence, 0-100
    pub confidence: u8,
    pub priority: Priority,
}

impl Insight {
    pub fn new(
        text: impl Into<String>,
        category: InsightCategory,
        confidence: u8,
        priority: Priority,
    ) -> Self {
        Self {
            text: text.into(),
            category,
            confidence: confidence.min(100),
            priority,
        }
    }
}

/// Effort level of a recommended habit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// A suggested new habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    pub description: String,
    pub reason: String,
    pub difficulty: Difficulty,
}
