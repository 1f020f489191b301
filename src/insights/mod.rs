//! Rule-based insight generation
//!
//! Insights are derived from a handful of aggregates ([`InsightInput`]) by a
//! fixed sequence of threshold rules. Each rule contributes at most one
//! insight; the final list is ordered by priority and is never empty.

pub mod recommendations;

use serde::{Deserialize, Serialize};

use crate::types::{Insight, InsightCategory, Priority};

pub use recommendations::recommend;

/// Weekly completion rate below which the improvement nudge fires
pub const LOW_RATE_THRESHOLD: f64 = 30.0;

/// Weekly completion rate above which a new habit is suggested
pub const HIGH_RATE_THRESHOLD: f64 = 80.0;

/// Completions per habit in a week that count as an achievement
pub const ACHIEVEMENT_COMPLETIONS_PER_HABIT: usize = 5;

/// Aggregates the insight rules are evaluated against
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightInput {
    pub habit_count: usize,
    /// Completed entries ever recorded for registered habits
    pub total_completed: usize,
    /// Completed entries in the trailing 7 calendar days
    pub completed_last_7_days: usize,
    /// Completed entries per habit name, habits with none omitted
    pub completion_frequency: Vec<(String, usize)>,
}

impl InsightInput {
    /// Completion rate over the last week, as a percentage (unclamped)
    pub fn weekly_rate(&self) -> f64 {
        if self.total_completed == 0 || self.habit_count == 0 {
            return 0.0;
        }
        self.completed_last_7_days as f64 / (self.habit_count * 7) as f64 * 100.0
    }

    /// Habit with the most completions; ties go to the alphabetically first name
    pub fn most_frequent(&self) -> Option<(&str, usize)> {
        self.completion_frequency
            .iter()
            .filter(|(_, n)| *n > 0)
            .min_by(|(a_name, a), (b_name, b)| b.cmp(a).then_with(|| a_name.cmp(b_name)))
            .map(|(name, n)| (name.as_str(), *n))
    }
}

type Rule = fn(&InsightInput) -> Option<Insight>;

/// Rules in evaluation order
const RULES: [Rule; 7] = [
    getting_started,
    inactivity,
    weekly_achievement,
    low_completion,
    high_completion,
    most_consistent,
    one_percent_better,
];

/// Insight generator
pub struct InsightGenerator;

impl InsightGenerator {
    /// Evaluate every rule and return the insights ordered by priority.
    ///
    /// Insights of equal priority keep their rule order.
    pub fn generate(input: &InsightInput) -> Vec<Insight> {
        let mut insights: Vec<Insight> = RULES.iter().filter_map(|rule| rule(input)).collect();
        insights.sort_by_key(|i| std::cmp::Reverse(i.priority.rank()));

        tracing::debug!(
            habit_count = input.habit_count,
            weekly_rate = input.weekly_rate(),
            count = insights.len(),
            "generated insights"
        );

        insights
    }
}

fn getting_started(input: &InsightInput) -> Option<Insight> {
    (input.habit_count == 0).then(|| {
        Insight::new(
            "Welcome to your habit journey! Starting with 2-3 simple habits is more effective than trying to change everything at once.",
            InsightCategory::Recommendation,
            95,
            Priority::High,
        )
    })
}

fn inactivity(input: &InsightInput) -> Option<Insight> {
    (input.habit_count > 0 && input.completed_last_7_days == 0).then(|| {
        Insight::new(
            "It looks like you haven't tracked any habits this week. Remember, consistency is key to building lasting habits!",
            InsightCategory::Motivation,
            90,
            Priority::High,
        )
    })
}

fn weekly_achievement(input: &InsightInput) -> Option<Insight> {
    let target = input.habit_count * ACHIEVEMENT_COMPLETIONS_PER_HABIT;
    (input.habit_count > 0 && input.completed_last_7_days >= target).then(|| {
        Insight::new(
            "Excellent work! You've been very consistent this week. This kind of dedication builds lasting change.",
            InsightCategory::Achievement,
            95,
            Priority::High,
        )
    })
}

fn low_completion(input: &InsightInput) -> Option<Insight> {
    (input.habit_count > 0 && input.weekly_rate() < LOW_RATE_THRESHOLD).then(|| {
        Insight::new(
            "Your completion rate is low. Try focusing on just one habit at a time to build momentum.",
            InsightCategory::Improvement,
            85,
            Priority::High,
        )
    })
}

fn high_completion(input: &InsightInput) -> Option<Insight> {
    (input.habit_count > 0 && input.weekly_rate() > HIGH_RATE_THRESHOLD).then(|| {
        Insight::new(
            "You're crushing it! Consider adding a new challenging habit to keep growing.",
            InsightCategory::Recommendation,
            90,
            Priority::Medium,
        )
    })
}

fn most_consistent(input: &InsightInput) -> Option<Insight> {
    if input.habit_count == 0 {
        return None;
    }
    let (name, count) = input.most_frequent()?;
    Some(Insight::new(
        format!(
            "\"{}\" is your most consistent habit with {} completions. Great job!",
            name, count
        ),
        InsightCategory::Pattern,
        88,
        Priority::Medium,
    ))
}

fn one_percent_better(_: &InsightInput) -> Option<Insight> {
    Some(Insight::new(
        "Small daily improvements lead to stunning yearly results. Focus on being 1% better each day!",
        InsightCategory::Motivation,
        100,
        Priority::Low,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn input(habits: usize, total: usize, recent: usize) -> InsightInput {
        InsightInput {
            habit_count: habits,
            total_completed: total,
            completed_last_7_days: recent,
            completion_frequency: Vec::new(),
        }
    }

    fn categories(insights: &[Insight]) -> Vec<InsightCategory> {
        insights.iter().map(|i| i.category).collect()
    }

    #[test]
    fn test_newcomer() {
        let insights = InsightGenerator::generate(&InsightInput::default());
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].category, InsightCategory::Recommendation);
        assert_eq!(insights[0].priority, Priority::High);
        assert!(insights[0].text.contains("2-3 simple habits"));
        assert_eq!(insights[1].confidence, 100);
    }

    #[test]
    fn test_never_empty() {
        for (h, t, r) in [(0, 0, 0), (1, 0, 0), (3, 50, 21), (5, 10, 10), (2, 3, 0)] {
            assert!(!InsightGenerator::generate(&input(h, t, r)).is_empty());
        }
    }

    #[test]
    fn test_inactive_week() {
        let insights = InsightGenerator::generate(&input(2, 10, 0));
        assert_eq!(
            categories(&insights),
            vec![
                InsightCategory::Motivation,
                InsightCategory::Improvement,
                InsightCategory::Motivation,
            ]
        );
        assert_eq!(insights[0].confidence, 90);
    }

    #[test]
    fn test_achievement_with_fifteen_completions() {
        let insights = InsightGenerator::generate(&input(3, 15, 15));
        let achievement = insights
            .iter()
            .find(|i| i.category == InsightCategory::Achievement)
            .unwrap();
        assert_eq!(achievement.confidence, 95);
        assert_eq!(achievement.priority, Priority::High);
    }

    #[test]
    fn test_low_rate_improvement() {
        // 5 of 21 slots is about 24%
        let insights = InsightGenerator::generate(&input(3, 5, 5));
        let cats = categories(&insights);
        assert!(cats.contains(&InsightCategory::Improvement));
        assert!(!insights
            .iter()
            .any(|i| i.category == InsightCategory::Recommendation));
    }

    #[test]
    fn test_high_rate_recommendation() {
        // 18 of 21 slots is about 86%
        let insights = InsightGenerator::generate(&input(3, 18, 18));
        let rec = insights
            .iter()
            .find(|i| i.category == InsightCategory::Recommendation)
            .unwrap();
        assert_eq!(rec.priority, Priority::Medium);
        assert_eq!(rec.confidence, 90);
        assert!(!categories(&insights).contains(&InsightCategory::Improvement));
    }

    #[test]
    fn test_mid_rate_has_neither() {
        // 11 of 21 slots is about 52%
        let cats = categories(&InsightGenerator::generate(&input(3, 11, 11)));
        assert!(!cats.contains(&InsightCategory::Improvement));
        assert!(!cats.contains(&InsightCategory::Recommendation));
    }

    #[test]
    fn test_most_consistent_ties_alphabetical() {
        let mut data = input(3, 8, 8);
        data.completion_frequency = vec![
            ("Walk".to_string(), 4),
            ("Meditate".to_string(), 4),
            ("Read".to_string(), 0),
        ];
        assert_eq!(data.most_frequent(), Some(("Meditate", 4)));

        let insights = InsightGenerator::generate(&data);
        let pattern = insights
            .iter()
            .find(|i| i.category == InsightCategory::Pattern)
            .unwrap();
        assert_eq!(
            pattern.text,
            "\"Meditate\" is your most consistent habit with 4 completions. Great job!"
        );
    }

    #[test]
    fn test_sorted_by_priority_stable() {
        let mut data = input(3, 18, 18);
        data.completion_frequency = vec![("Read".to_string(), 6)];
        let insights = InsightGenerator::generate(&data);

        let ranks: Vec<u8> = insights.iter().map(|i| i.priority.rank()).collect();
        let mut sorted = ranks.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(ranks, sorted);

        // medium-priority rules keep their evaluation order
        let medium: Vec<_> = insights
            .iter()
            .filter(|i| i.priority == Priority::Medium)
            .map(|i| i.category)
            .collect();
        assert_eq!(
            medium,
            vec![InsightCategory::Recommendation, InsightCategory::Pattern]
        );
    }

    #[test]
    fn test_weekly_rate_zero_without_history() {
        assert_eq!(input(3, 0, 0).weekly_rate(), 0.0);
        assert!((input(3, 10, 7).weekly_rate() - 33.33).abs() < 0.01);
    }
}
