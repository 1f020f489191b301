//! Wire records for the HabitFlow REST API
//!
//! The API is keyed by habit name and user id rather than by the local
//! UUIDs, so these records are kept separate from the core types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::messages::truncate_text;
use crate::types::{
    Difficulty, Entry, Habit, Insight, InsightCategory, Priority, Recommendation, User,
};

/// `POST /users`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPayload {
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub joined_at: DateTime<Utc>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl From<&User> for UserPayload {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            first_name: Some(user.first_name.clone()),
            last_name: user.last_name.clone(),
            joined_at: user.joined_at,
            is_active: true,
        }
    }
}

/// `POST /habits`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitPayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub target_frequency: String,
    pub user_id: String,
}

impl From<&Habit> for HabitPayload {
    fn from(habit: &Habit) -> Self {
        Self {
            name: habit.name.clone(),
            description: habit.description.clone(),
            target_frequency: habit.target_frequency.as_str().to_string(),
            user_id: habit.owner.clone(),
        }
    }
}

/// `POST /habits/track`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPayload {
    pub habit_name: String,
    pub user_id: String,
    pub completed: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
}

impl From<&Entry> for TrackPayload {
    fn from(entry: &Entry) -> Self {
        Self {
            habit_name: entry.habit_name.clone(),
            user_id: entry.owner.clone(),
            completed: entry.completed,
            notes: entry.notes.clone(),
            rating: entry.rating,
        }
    }
}

/// `GET /health`
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// One item of `GET /insights/{user_id}`
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteInsight {
    pub insight: String,
    pub category: String,
    /// 0.0-1.0
    pub confidence: f64,
}

impl RemoteInsight {
    /// Convert to a local insight. Unknown categories are rejected.
    ///
    /// The API carries no priority, so one is derived from confidence.
    pub fn into_insight(self) -> Option<Insight> {
        let category = self.category.parse::<InsightCategory>().ok()?;
        let confidence = (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u8;
        let priority = match confidence {
            90.. => Priority::High,
            70..=89 => Priority::Medium,
            _ => Priority::Low,
        };
        Some(Insight::new(self.insight, category, confidence, priority))
    }
}

/// `GET /recommendations/{user_id}`
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteRecommendation {
    #[serde(default)]
    pub current_habits: Vec<String>,
    pub recommendation: String,
}

impl RemoteRecommendation {
    /// The API returns one free-text suggestion; wrap it as a single entry
    pub fn into_recommendations(self) -> Vec<Recommendation> {
        let text = self.recommendation.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let headline = text.lines().next().unwrap_or(text);
        vec![Recommendation {
            name: truncate_text(headline, 40),
            description: text.to_string(),
            reason: format!(
                "Suggested to complement your {} current habit(s)",
                self.current_habits.len()
            ),
            difficulty: Difficulty::Medium,
        }]
    }
}

/// One item of `GET /habits/{user_id}`
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteHabit {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_frequency: Option<String>,
}

/// One item of `GET /entries/{user_id}`
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEntry {
    pub habit_name: String,
    /// The API stores booleans as text in some deployments
    #[serde(default)]
    pub completed: serde_json::Value,
    #[serde(default)]
    pub date: Option<String>,
}

impl RemoteEntry {
    pub fn is_completed(&self) -> bool {
        match &self.completed {
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::String(s) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_remote_insight_scales_confidence() {
        let remote: RemoteInsight = serde_json::from_str(
            r#"{"user_id":"42","insight":"Mornings work for you","category":"pattern","confidence":0.87,"generated_at":"2024-01-01T00:00:00"}"#,
        )
        .unwrap();

        let insight = remote.into_insight().unwrap();
        assert_eq!(insight.confidence, 87);
        assert_eq!(insight.category, InsightCategory::Pattern);
        assert_eq!(insight.priority, Priority::Medium);
    }

    #[test]
    fn test_remote_insight_unknown_category() {
        let remote = RemoteInsight {
            insight: "?".to_string(),
            category: "prophecy".to_string(),
            confidence: 1.0,
        };
        assert!(remote.into_insight().is_none());
    }

    #[test]
    fn test_recommendation_text_wrapped() {
        let remote: RemoteRecommendation = serde_json::from_str(
            r#"{"user_id":"42","current_habits":["Read","Walk"],"recommendation":"Try 5 minutes of stretching\nafter your walk"}"#,
        )
        .unwrap();

        let recs = remote.into_recommendations();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].name, "Try 5 minutes of stretching");
        assert!(recs[0].reason.contains("2 current"));

        let empty = RemoteRecommendation {
            current_habits: vec![],
            recommendation: "  ".to_string(),
        };
        assert!(empty.into_recommendations().is_empty());
    }

    #[test]
    fn test_remote_entry_completed_variants() {
        let text: RemoteEntry =
            serde_json::from_str(r#"{"habit_name":"Read","completed":"TRUE"}"#).unwrap();
        let flag: RemoteEntry =
            serde_json::from_str(r#"{"habit_name":"Read","completed":false}"#).unwrap();
        assert!(text.is_completed());
        assert!(!flag.is_completed());
    }
}
