//! Static habit recommendation catalog

use crate::types::{Difficulty, Recommendation};

struct CatalogEntry {
    name: &'static str,
    description: &'static str,
    reason: &'static str,
    difficulty: Difficulty,
}

impl CatalogEntry {
    fn to_recommendation(&self) -> Recommendation {
        Recommendation {
            name: self.name.to_string(),
            description: self.description.to_string(),
            reason: self.reason.to_string(),
            difficulty: self.difficulty,
        }
    }
}

const STARTER_HABITS: [CatalogEntry; 3] = [
    CatalogEntry {
        name: "Morning Hydration",
        description: "Drink a glass of water when you wake up",
        reason: "Easy to implement and provides immediate health benefits",
        difficulty: Difficulty::Easy,
    },
    CatalogEntry {
        name: "5-Minute Meditation",
        description: "Practice mindfulness for 5 minutes daily",
        reason: "Builds mental clarity and is achievable for beginners",
        difficulty: Difficulty::Easy,
    },
    CatalogEntry {
        name: "Evening Gratitude",
        description: "Write down 3 things you're grateful for each evening",
        reason: "Improves mental well-being and takes minimal time",
        difficulty: Difficulty::Easy,
    },
];

const MORNING_HABIT: CatalogEntry = CatalogEntry {
    name: "Morning Exercise",
    description: "15-20 minutes of physical activity",
    reason: "Morning workouts boost energy and mood throughout the day",
    difficulty: Difficulty::Medium,
};

const GROWTH_HABITS: [CatalogEntry; 2] = [
    CatalogEntry {
        name: "Daily Reading",
        description: "Read for 15 minutes before bed",
        reason: "Improves knowledge and helps with better sleep",
        difficulty: Difficulty::Easy,
    },
    CatalogEntry {
        name: "Meal Prep Sunday",
        description: "Prepare healthy meals for the week",
        reason: "Saves time and promotes healthier eating habits",
        difficulty: Difficulty::Medium,
    },
];

/// Hours (inclusive) during which the morning habit is suggested
const MORNING_HOURS: std::ops::RangeInclusive<u32> = 6..=10;

/// Suggested habits for a user with `habit_count` habits at local `hour`
pub fn recommend(habit_count: usize, hour: u32) -> Vec<Recommendation> {
    if habit_count == 0 {
        return STARTER_HABITS.iter().map(CatalogEntry::to_recommendation).collect();
    }

    let mut recommendations = Vec::with_capacity(3);
    if MORNING_HOURS.contains(&hour) {
        recommendations.push(MORNING_HABIT.to_recommendation());
    }
    recommendations.extend(GROWTH_HABITS.iter().map(CatalogEntry::to_recommendation));
    recommendations
}
