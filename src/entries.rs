//! Entry log
//!
//! Append-only log of completion entries for one user. Entries are never
//! removed and only their owner can change; filtering helpers resolve calendar dates in the time
//! zone of the reference instant they are given.

use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::registry::HabitRegistry;
use crate::types::{Entry, HabitId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryLog {
    entries: Vec<Entry>,
}

impl EntryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Entry] {
        &self.entries
    }

    pub fn append(&mut self, entry: Entry) -> &Entry {
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Transfer entries owned by `from` to `to`. Only the owner changes;
    /// returns how many entries moved.
    pub fn reassign_owner(&mut self, from: &str, to: &str) -> usize {
        let mut moved = 0;
        for entry in self.entries.iter_mut().filter(|e| e.owner == from) {
            entry.owner = to.to_string();
            moved += 1;
        }
        moved
    }

    pub fn completed(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.completed)
    }

    /// All entries recorded for a habit
    pub fn for_habit(&self, habit_id: HabitId) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(move |e| e.habit_id == habit_id)
    }

    /// Completed entries for a habit
    pub fn completed_for_habit(&self, habit_id: HabitId) -> impl Iterator<Item = &Entry> {
        self.for_habit(habit_id).filter(|e| e.completed)
    }

    /// Entries whose calendar date (in `now`'s time zone) equals `date`
    pub fn on_date<'a, Tz: TimeZone>(
        &'a self,
        date: NaiveDate,
        now: &'a DateTime<Tz>,
    ) -> impl Iterator<Item = &'a Entry> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.local_date(now) == date)
    }

    /// Entries falling on the reference day
    pub fn today<'a, Tz: TimeZone>(
        &'a self,
        now: &'a DateTime<Tz>,
    ) -> impl Iterator<Item = &'a Entry> + 'a {
        self.on_date(now.date_naive(), now)
    }

    /// Completed entries in the `days` calendar days ending at `now` (inclusive)
    pub fn completed_in_window<'a, Tz: TimeZone>(
        &'a self,
        days: u32,
        now: &'a DateTime<Tz>,
    ) -> impl Iterator<Item = &'a Entry> + 'a {
        let (start, end) = window_bounds(days, now);
        self.completed().filter(move |e| {
            let date = e.local_date(now);
            date >= start && date <= end
        })
    }

    /// Entries whose habit no longer exists in the registry
    pub fn orphaned<'a>(
        &'a self,
        registry: &'a HabitRegistry,
    ) -> impl Iterator<Item = &'a Entry> + 'a {
        self.entries
            .iter()
            .filter(move |e| !registry.contains(e.habit_id))
    }
}

/// First and last calendar day of a trailing window of `days` days ending at `now`
pub fn window_bounds<Tz: TimeZone>(days: u32, now: &DateTime<Tz>) -> (NaiveDate, NaiveDate) {
    let end = now.date_naive();
    let start = end - Duration::days(i64::from(days.max(1)) - 1);
    (start, end)
}
