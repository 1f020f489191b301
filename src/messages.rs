//! Templated user-facing text
//!
//! Motivational messages, greetings and small formatting helpers shared by
//! every front-end. All functions are pure.

use crate::error::HabitError;
use crate::types::{Insight, InsightCategory};

/// Longest accepted habit name, in characters
pub const MAX_HABIT_NAME_LEN: usize = 50;

pub const MIN_HABIT_NAME_LEN: usize = 2;

const FORBIDDEN_NAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

const COMPLETED_WORDS: [&str; 9] = [
    "yes", "y", "done", "completed", "complete", "finished", "ok", "true", "✅",
];

/// Motivational message for a streak length
pub fn streak_message(streak_days: u32) -> String {
    match streak_days {
        0 => "🌱 Time to start a new streak!".to_string(),
        1 => "🎯 First day done. Keep it going!".to_string(),
        2..=6 => format!("🔥 {} days in a row. You're doing great!", streak_days),
        7..=29 => format!("💪 {} day streak. You're unstoppable!", streak_days),
        _ => format!("🏆 {} consecutive days. You're a legend!", streak_days),
    }
}

/// Emoji for a completion rate percentage
pub fn motivational_emoji(completion_rate: u8) -> &'static str {
    match completion_rate {
        90.. => "🏆",
        70..=89 => "🔥",
        50..=69 => "💪",
        30..=49 => "🌱",
        _ => "🚀",
    }
}

/// Greeting for an hour of the day (0-23)
pub fn time_greeting(hour: u32) -> &'static str {
    match hour {
        5..=11 => "🌅 Good morning",
        12..=17 => "☀️ Good afternoon",
        _ => "🌙 Good evening",
    }
}

/// Text progress bar, e.g. `▰▰▰▱▱▱▱▱▱▱ 30.0%`
pub fn progress_bar(current: usize, total: usize, length: usize) -> String {
    if total == 0 {
        return "▱".repeat(length);
    }

    let filled = current.min(total) * length / total;
    format!(
        "{}{} {:.1}%",
        "▰".repeat(filled),
        "▱".repeat(length - filled),
        (current as f64 / total as f64) * 100.0
    )
}

/// Check a habit name against the naming rules
pub fn validate_habit_name(name: &str) -> Result<(), HabitError> {
    let trimmed = name.trim();

    if trimmed.chars().count() < MIN_HABIT_NAME_LEN {
        return Err(HabitError::InvalidHabitName(format!(
            "name must be at least {} characters",
            MIN_HABIT_NAME_LEN
        )));
    }

    if name.chars().count() > MAX_HABIT_NAME_LEN {
        return Err(HabitError::InvalidHabitName(format!(
            "name must be at most {} characters",
            MAX_HABIT_NAME_LEN
        )));
    }

    if let Some(c) = name.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
        return Err(HabitError::InvalidHabitName(format!(
            "character '{}' is not allowed",
            c
        )));
    }

    Ok(())
}

/// Interpret a free-text status ("done", "yes", "✅") as completed or not
pub fn parse_habit_status(status: &str) -> bool {
    let status = status.trim().to_lowercase();
    COMPLETED_WORDS.contains(&status.as_str())
}

/// Truncate text to `max_len` characters, ending with an ellipsis
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

pub fn category_emoji(category: InsightCategory) -> &'static str {
    match category {
        InsightCategory::Motivation => "💪",
        InsightCategory::Improvement => "📈",
        InsightCategory::Pattern => "🔍",
        InsightCategory::Achievement => "🏆",
        InsightCategory::Recommendation => "💡",
    }
}

/// Numbered plain-text rendering of an insight list
pub fn format_insights(insights: &[Insight]) -> String {
    if insights.is_empty() {
        return "🤖 No insights available right now.".to_string();
    }

    let mut out = String::from("🧠 Personal insights:\n\n");
    for (i, insight) in insights.iter().enumerate() {
        out.push_str(&format!(
            "{} {}. {}\n\n",
            category_emoji(insight.category),
            i + 1,
            insight.text
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Priority;

    #[test]
    fn test_streak_message_tiers() {
        assert!(streak_message(0).contains("new streak"));
        assert!(streak_message(1).contains("First day"));
        assert!(streak_message(3).starts_with("🔥 3 days"));
        assert!(streak_message(12).starts_with("💪 12 day"));
        assert!(streak_message(45).starts_with("🏆 45"));
    }

    #[test]
    fn test_motivational_emoji_thresholds() {
        assert_eq!(motivational_emoji(95), "🏆");
        assert_eq!(motivational_emoji(70), "🔥");
        assert_eq!(motivational_emoji(50), "💪");
        assert_eq!(motivational_emoji(30), "🌱");
        assert_eq!(motivational_emoji(0), "🚀");
    }

    #[test]
    fn test_time_greeting() {
        assert_eq!(time_greeting(7), "🌅 Good morning");
        assert_eq!(time_greeting(12), "☀️ Good afternoon");
        assert_eq!(time_greeting(22), "🌙 Good evening");
        assert_eq!(time_greeting(3), "🌙 Good evening");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0, 0, 5), "▱▱▱▱▱");
        assert_eq!(progress_bar(3, 10, 10), "▰▰▰▱▱▱▱▱▱▱ 30.0%");
        assert_eq!(progress_bar(2, 2, 4), "▰▰▰▰ 100.0%");
    }

    #[test]
    fn test_validate_habit_name() {
        assert!(validate_habit_name("Read").is_ok());
        assert!(validate_habit_name(" a ").is_err());
        assert!(validate_habit_name(&"x".repeat(51)).is_err());
        assert!(validate_habit_name("Read/Write").is_err());
        assert!(validate_habit_name("Drink water?").is_err());
    }

    #[test]
    fn test_parse_habit_status() {
        assert!(parse_habit_status("Done"));
        assert!(parse_habit_status(" yes "));
        assert!(parse_habit_status("✅"));
        assert!(!parse_habit_status("skipped"));
        assert!(!parse_habit_status(""));
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("a longer sentence", 10), "a longe...");
    }

    #[test]
    fn test_format_insights() {
        assert!(format_insights(&[]).contains("No insights"));

        let insights = vec![Insight::new(
            "Keep going",
            InsightCategory::Motivation,
            100,
            Priority::Low,
        )];
        let text = format_insights(&insights);
        assert!(text.contains("💪 1. Keep going"));
    }
}
