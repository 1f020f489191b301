//! Habit registry
//!
//! Holds one user's habit definitions. Habits are keyed by [`HabitId`];
//! names are display labels kept unique per registry, compared
//! case-insensitively.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HabitError, Result};
use crate::messages::validate_habit_name;
use crate::types::{Habit, HabitId, HabitUpdate, NewHabit};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitRegistry {
    habits: Vec<Habit>,
}

impl HabitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_habits(habits: Vec<Habit>) -> Self {
        Self { habits }
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    /// Habits in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Habit> {
        self.habits.iter()
    }

    pub fn as_slice(&self) -> &[Habit] {
        &self.habits
    }

    pub fn contains(&self, id: HabitId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: HabitId) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    /// Case-insensitive lookup by display name
    pub fn find_by_name(&self, name: &str) -> Option<&Habit> {
        let needle = name.trim().to_lowercase();
        self.habits
            .iter()
            .find(|h| h.name.to_lowercase() == needle)
    }

    /// Resolve a habit by id string or by name
    pub fn resolve(&self, key: &str) -> Result<&Habit> {
        if let Ok(id) = key.parse::<HabitId>() {
            if let Some(habit) = self.get(id) {
                return Ok(habit);
            }
        }
        self.find_by_name(key)
            .ok_or_else(|| HabitError::UnknownHabit(key.to_string()))
    }

    /// Create a habit owned by `owner`
    pub fn create(
        &mut self,
        new: NewHabit,
        owner: &str,
        created_at: DateTime<Utc>,
    ) -> Result<&Habit> {
        let name = new.name.trim().to_string();
        validate_habit_name(&name)?;
        self.ensure_name_free(&name, None)?;

        self.habits.push(Habit {
            id: HabitId::new(),
            name,
            description: new.description.filter(|d| !d.trim().is_empty()),
            target_frequency: new.target_frequency,
            owner: owner.to_string(),
            created_at,
        });

        Ok(&self.habits[self.habits.len() - 1])
    }

    /// Apply a partial update. Renames are checked against other habits.
    pub fn update(&mut self, id: HabitId, update: HabitUpdate) -> Result<&Habit> {
        if let Some(name) = &update.name {
            validate_habit_name(name.trim())?;
            self.ensure_name_free(name.trim(), Some(id))?;
        }

        let habit = self
            .habits
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| HabitError::UnknownHabit(id.to_string()))?;

        if let Some(name) = update.name {
            habit.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            habit.description = description.filter(|d| !d.trim().is_empty());
        }
        if let Some(frequency) = update.target_frequency {
            habit.target_frequency = frequency;
        }

        Ok(&*habit)
    }

    pub fn remove(&mut self, id: HabitId) -> Result<Habit> {
        let index = self
            .habits
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| HabitError::UnknownHabit(id.to_string()))?;
        Ok(self.habits.remove(index))
    }

    /// Insert a habit, replacing any existing habit with the same id.
    ///
    /// Used when importing habits from elsewhere. A name clash with a
    /// different id is still rejected.
    pub fn upsert(&mut self, habit: Habit) -> Result<()> {
        self.ensure_name_free(&habit.name, Some(habit.id))?;
        match self.habits.iter_mut().find(|h| h.id == habit.id) {
            Some(existing) => *existing = habit,
            None => self.habits.push(habit),
        }
        Ok(())
    }

    /// Give every habit owned by `from` to `to`; returns how many moved
    pub fn reassign_owner(&mut self, from: &str, to: &str) -> usize {
        let mut moved = 0;
        for habit in self.habits.iter_mut().filter(|h| h.owner == from) {
            habit.owner = to.to_string();
            moved += 1;
        }
        moved
    }

    fn ensure_name_free(&self, name: &str, except: Option<HabitId>) -> Result<()> {
        match self.find_by_name(name) {
            Some(existing) if Some(existing.id) != except => {
                Err(HabitError::DuplicateHabit(existing.name.clone()))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TargetFrequency, LOCAL_USER_ID};

    fn registry_with(names: &[&str]) -> HabitRegistry {
        let mut registry = HabitRegistry::new();
        for name in names {
            registry
                .create(NewHabit::new(*name), LOCAL_USER_ID, Utc::now())
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_create_trims_and_assigns_owner() {
        let mut registry = HabitRegistry::new();
        let habit = registry
            .create(
                NewHabit::new("  Read  ")
                    .with_description("20 pages")
                    .with_frequency(TargetFrequency::Weekdays),
                "user-1",
                Utc::now(),
            )
            .unwrap();

        assert_eq!(habit.name, "Read");
        assert_eq!(habit.owner, "user-1");
        assert_eq!(habit.description.as_deref(), Some("20 pages"));
        assert_eq!(habit.target_frequency, TargetFrequency::Weekdays);
    }

    #[test]
    fn test_duplicate_names_rejected_case_insensitively() {
        let mut registry = registry_with(&["Read"]);
        let result = registry.create(NewHabit::new("read"), LOCAL_USER_ID, Utc::now());
        assert!(matches!(result, Err(HabitError::DuplicateHabit(_))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_invalid_name_rejected() {
        let mut registry = HabitRegistry::new();
        let result = registry.create(NewHabit::new("x"), LOCAL_USER_ID, Utc::now());
        assert!(matches!(result, Err(HabitError::InvalidHabitName(_))));
    }

    #[test]
    fn test_rename_keeps_identity() {
        let mut registry = registry_with(&["Read", "Walk"]);
        let id = registry.find_by_name("Read").unwrap().id;

        let renamed = registry
            .update(
                id,
                HabitUpdate {
                    name: Some("Read books".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(renamed.id, id);
        assert_eq!(renamed.name, "Read books");

        // renaming onto another habit's name fails
        let clash = registry.update(
            id,
            HabitUpdate {
                name: Some("walk".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(clash, Err(HabitError::DuplicateHabit(_))));
    }

    #[test]
    fn test_update_can_clear_description() {
        let mut registry = HabitRegistry::new();
        let id = registry
            .create(
                NewHabit::new("Read").with_description("20 pages"),
                LOCAL_USER_ID,
                Utc::now(),
            )
            .unwrap()
            .id;

        let habit = registry
            .update(
                id,
                HabitUpdate {
                    description: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(habit.description, None);
    }

    #[test]
    fn test_remove_and_resolve() {
        let mut registry = registry_with(&["Read", "Walk"]);
        let walk = registry.resolve("WALK").unwrap().clone();
        assert_eq!(registry.resolve(&walk.id.to_string()).unwrap().name, "Walk");

        let removed = registry.remove(walk.id).unwrap();
        assert_eq!(removed.name, "Walk");
        assert!(registry.resolve("Walk").is_err());
        assert!(registry.remove(walk.id).is_err());
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let mut registry = registry_with(&["Read"]);
        let mut habit = registry.find_by_name("Read").unwrap().clone();
        habit.description = Some("updated".to_string());

        registry.upsert(habit.clone()).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(habit.id).unwrap().description.as_deref(), Some("updated"));

        let mut other = habit.clone();
        other.id = HabitId::new();
        assert!(registry.upsert(other).is_err());
    }
}
