//! Pending remote writes
//!
//! Local mutations that the remote API supports are queued here and flushed
//! in FIFO order. The queue is persisted with the snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

use super::wire::{HabitPayload, TrackPayload, UserPayload};
use super::RemoteService;
use crate::error::RemoteError;

/// Default number of delivery attempts before a write is dropped
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// A remote write operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WriteOp {
    CreateUser(UserPayload),
    CreateHabit(HabitPayload),
    TrackEntry(TrackPayload),
}

impl WriteOp {
    pub fn name(&self) -> &'static str {
        match self {
            WriteOp::CreateUser(_) => "create_user",
            WriteOp::CreateHabit(_) => "create_habit",
            WriteOp::TrackEntry(_) => "track_entry",
        }
    }

    /// Point a habit or entry write at another user
    fn reassign_owner(&mut self, from: &str, to: &str) -> bool {
        let user_id = match self {
            WriteOp::CreateUser(_) => return false,
            WriteOp::CreateHabit(habit) => &mut habit.user_id,
            WriteOp::TrackEntry(entry) => &mut entry.user_id,
        };
        if user_id.as_str() != from {
            return false;
        }
        *user_id = to.to_string();
        true
    }

    fn send<R: RemoteService + ?Sized>(&self, remote: &R) -> Result<(), RemoteError> {
        match self {
            WriteOp::CreateUser(user) => remote.create_user(user),
            WriteOp::CreateHabit(habit) => remote.create_habit(habit),
            WriteOp::TrackEntry(entry) => remote.track_entry(entry),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingWrite {
    pub id: Uuid,
    pub op: WriteOp,
    #[serde(default)]
    pub attempts: u32,
    pub enqueued_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Outcome of one flush
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    /// Writes delivered and removed from the queue
    pub sent: usize,
    /// Writes dropped after exhausting their attempts
    pub dropped: usize,
    /// Writes still queued
    pub remaining: usize,
    /// Error that stopped the flush, if any
    pub error: Option<String>,
}

impl FlushReport {
    pub fn is_complete(&self) -> bool {
        self.remaining == 0 && self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outbox {
    queue: VecDeque<PendingWrite>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingWrite> {
        self.queue.iter()
    }

    pub fn enqueue(&mut self, op: WriteOp, now: DateTime<Utc>) {
        tracing::debug!(op = op.name(), queued = self.queue.len() + 1, "queued remote write");
        self.queue.push_back(PendingWrite {
            id: Uuid::new_v4(),
            op,
            attempts: 0,
            enqueued_at: now,
            last_error: None,
        });
    }

    /// Queue a write ahead of everything already queued
    pub fn enqueue_front(&mut self, op: WriteOp, now: DateTime<Utc>) {
        tracing::debug!(op = op.name(), queued = self.queue.len() + 1, "queued remote write first");
        self.queue.push_front(PendingWrite {
            id: Uuid::new_v4(),
            op,
            attempts: 0,
            enqueued_at: now,
            last_error: None,
        });
    }

    /// Rewrite queued habit and entry writes owned by `from`
    pub fn reassign_owner(&mut self, from: &str, to: &str) -> usize {
        let mut moved = 0;
        for pending in self.queue.iter_mut() {
            if pending.op.reassign_owner(from, to) {
                moved += 1;
            }
        }
        moved
    }

    /// Deliver queued writes in order.
    ///
    /// Stops at the first failure so later writes never overtake earlier
    /// ones. A write that has failed `max_attempts` times is dropped.
    pub fn flush<R: RemoteService + ?Sized>(&mut self, remote: &R, max_attempts: u32) -> FlushReport {
        let mut report = FlushReport::default();

        while let Some(front) = self.queue.front_mut() {
            match front.op.send(remote) {
                Ok(()) => {
                    self.queue.pop_front();
                    report.sent += 1;
                }
                Err(e) => {
                    front.attempts += 1;
                    front.last_error = Some(e.to_string());

                    if front.attempts >= max_attempts.max(1) {
                        tracing::warn!(
                            op = front.op.name(),
                            attempts = front.attempts,
                            error = %e,
                            "dropping remote write after repeated failures"
                        );
                        self.queue.pop_front();
                        report.dropped += 1;
                    }

                    report.error = Some(e.to_string());
                    break;
                }
            }
        }

        report.remaining = self.queue.len();
        report
    }
}
