//! Application state
//!
//! [`AppState`] owns the user profile, the habit registry, the entry log and
//! the outbox of pending remote writes. Every mutation goes through a named
//! operation here so that validation and write queueing happen in one place.
//!
//! The whole state persists as a versioned JSON [`Snapshot`].

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::entries::EntryLog;
use crate::error::{HabitError, Result};
use crate::messages::validate_habit_name;
use crate::registry::HabitRegistry;
use crate::stats::StatsCalculator;
use crate::sync::{HabitPayload, Outbox, TrackPayload, UserPayload, WriteOp};
use crate::types::{
    Entry, EntryId, Habit, HabitId, HabitUpdate, NewEntry, NewHabit, StreakPolicy, User,
    LOCAL_USER_ID,
};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Rating given by the one-tap `track` operation
pub const DEFAULT_TRACK_RATING: u8 = 5;

/// Persisted form of [`AppState`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default)]
    pub habits: HabitRegistry,
    #[serde(default)]
    pub entries: EntryLog,
    #[serde(default)]
    pub pending: Outbox,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            user: None,
            habits: HabitRegistry::default(),
            entries: EntryLog::default(),
            pending: Outbox::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    user: Option<User>,
    habits: HabitRegistry,
    entries: EntryLog,
    outbox: Outbox,
    remote_writes: bool,
    policy: StreakPolicy,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from a snapshot, rejecting unknown versions
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let mut state = Self::new();
        state.replace_snapshot(snapshot)?;
        Ok(state)
    }

    /// Queue supported mutations for remote delivery
    pub fn set_remote_writes(&mut self, enabled: bool) {
        self.remote_writes = enabled;
    }

    pub fn set_streak_policy(&mut self, policy: StreakPolicy) {
        self.policy = policy;
    }

    pub fn streak_policy(&self) -> StreakPolicy {
        self.policy
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Owner id for new habits and entries
    pub fn user_id(&self) -> &str {
        self.user
            .as_ref()
            .map(|u| u.user_id.as_str())
            .unwrap_or(LOCAL_USER_ID)
    }

    pub fn habits(&self) -> &HabitRegistry {
        &self.habits
    }

    pub fn entries(&self) -> &EntryLog {
        &self.entries
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn outbox_mut(&mut self) -> &mut Outbox {
        &mut self.outbox
    }

    /// Statistics over the current state at `now`
    pub fn calculator<Tz: TimeZone>(&self, now: DateTime<Tz>) -> StatsCalculator<'_, Tz> {
        StatsCalculator::new(&self.habits, &self.entries, now).with_policy(self.policy)
    }

    /// Set the profile. Habits, entries and queued writes owned by the
    /// previous owner (the local placeholder before a profile exists) move to
    /// the new user, and the user is created remotely before anything else.
    pub fn set_user(&mut self, user: User) {
        let previous = self.user_id().to_string();
        if previous != user.user_id {
            let habits = self.habits.reassign_owner(&previous, &user.user_id);
            let entries = self.entries.reassign_owner(&previous, &user.user_id);
            let queued = self.outbox.reassign_owner(&previous, &user.user_id);
            tracing::debug!(
                from = %previous,
                to = %user.user_id,
                habits,
                entries,
                queued,
                "moved records to new owner"
            );
        }

        if self.remote_writes {
            self.outbox
                .enqueue_front(WriteOp::CreateUser(UserPayload::from(&user)), Utc::now());
        }
        self.user = Some(user);
    }

    pub fn create_habit(&mut self, new: NewHabit) -> Result<Habit> {
        self.create_habit_at(new, Utc::now())
    }

    pub fn create_habit_at(&mut self, new: NewHabit, created_at: DateTime<Utc>) -> Result<Habit> {
        let owner = self.user_id().to_string();
        let habit = self.habits.create(new, &owner, created_at)?.clone();
        tracing::debug!(habit = %habit.name, id = %habit.id, "created habit");
        self.enqueue(WriteOp::CreateHabit(HabitPayload::from(&habit)));
        Ok(habit)
    }

    /// Edit a habit. Edits are not sent to the remote.
    pub fn update_habit(&mut self, id: HabitId, update: HabitUpdate) -> Result<Habit> {
        let habit = self.habits.update(id, update)?.clone();
        tracing::debug!(habit = %habit.name, id = %habit.id, "updated habit");
        Ok(habit)
    }

    /// Delete a habit. Its entries stay in the log as orphaned history.
    pub fn delete_habit(&mut self, id: HabitId) -> Result<Habit> {
        let habit = self.habits.remove(id)?;
        tracing::debug!(habit = %habit.name, id = %habit.id, "deleted habit");
        Ok(habit)
    }

    /// Append an entry for an existing habit
    pub fn record_entry(&mut self, habit_id: HabitId, new: NewEntry) -> Result<Entry> {
        let habit = self
            .habits
            .get(habit_id)
            .ok_or_else(|| HabitError::UnknownHabit(habit_id.to_string()))?;

        if let Some(rating) = new.rating {
            if !(1..=5).contains(&rating) {
                return Err(HabitError::InvalidRating(rating));
            }
        }

        let entry = Entry {
            id: EntryId::new(),
            habit_id,
            habit_name: habit.name.clone(),
            owner: self.user_id().to_string(),
            completed: new.completed,
            rating: new.rating,
            notes: new.notes.filter(|n| !n.trim().is_empty()),
            timestamp: new.timestamp,
        };

        self.entries.append(entry.clone());
        tracing::debug!(habit = %entry.habit_name, completed = entry.completed, "recorded entry");
        self.enqueue(WriteOp::TrackEntry(TrackPayload::from(&entry)));
        Ok(entry)
    }

    /// Mark a habit completed at `now` with the default rating
    pub fn track(&mut self, habit_id: HabitId, now: DateTime<Utc>) -> Result<Entry> {
        self.record_entry(
            habit_id,
            NewEntry {
                completed: true,
                rating: Some(DEFAULT_TRACK_RATING),
                notes: None,
                timestamp: Some(now),
            },
        )
    }

    /// Replace everything with the contents of a snapshot.
    ///
    /// The snapshot is checked as a whole first: habit names must be valid
    /// and unique (case-insensitive), ids unique, and ratings within 1..=5.
    /// On error the state is left unchanged.
    pub fn replace_snapshot(&mut self, snapshot: Snapshot) -> Result<()> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(HabitError::UnsupportedSnapshot(snapshot.version));
        }

        let mut habits = HabitRegistry::new();
        for habit in snapshot.habits.iter() {
            validate_habit_name(&habit.name)?;
            if habits.contains(habit.id) {
                return Err(HabitError::DuplicateHabit(habit.name.clone()));
            }
            habits.upsert(habit.clone())?;
        }

        if let Some(rating) = snapshot
            .entries
            .iter()
            .filter_map(|e| e.rating)
            .find(|r| !(1..=5).contains(r))
        {
            return Err(HabitError::InvalidRating(rating));
        }

        self.user = snapshot.user;
        self.habits = habits;
        self.entries = snapshot.entries;
        self.outbox = snapshot.pending;

        let orphaned = self.entries.orphaned(&self.habits).count();
        if orphaned > 0 {
            tracing::debug!(orphaned, "snapshot contains entries for deleted habits");
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            user: self.user.clone(),
            habits: self.habits.clone(),
            entries: self.entries.clone(),
            pending: self.outbox.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    /// Load state from a snapshot file. A missing file yields an empty state.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no snapshot file, starting empty");
            return Ok(Self::new());
        }
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the snapshot to `path` via a temporary file and rename
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, self.to_json()?)?;
        fs::rename(&tmp, path)?;

        tracing::debug!(
            path = %path.display(),
            habits = self.habits.len(),
            entries = self.entries.len(),
            "saved snapshot"
        );
        Ok(())
    }

    fn enqueue(&mut self, op: WriteOp) {
        if self.remote_writes {
            self.outbox.enqueue(op, Utc::now());
        }
    }
}
