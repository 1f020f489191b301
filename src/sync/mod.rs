//! Remote synchronization
//!
//! Local state is always the source of truth. Writes the remote API supports
//! are queued in the [`Outbox`] and delivered later; insights and
//! recommendations are asked of the remote first and generated locally when
//! it cannot answer.

#[cfg(feature = "remote")]
pub mod http;
pub mod outbox;
pub mod wire;

use chrono::{DateTime, TimeZone, Timelike};
use serde::Serialize;

use crate::error::RemoteError;
use crate::insights::{recommend, InsightGenerator};
use crate::state::AppState;
use crate::stats::RECENT_WINDOW_DAYS;
use crate::types::{Insight, Recommendation};

#[cfg(feature = "remote")]
pub use http::{HttpRemote, RemoteConfig};
pub use outbox::{FlushReport, Outbox, PendingWrite, WriteOp, DEFAULT_MAX_ATTEMPTS};
pub use wire::{
    HabitPayload, RemoteEntry, RemoteHabit, RemoteInsight, RemoteRecommendation, TrackPayload,
    UserPayload,
};

/// Operations the HabitFlow API offers
pub trait RemoteService {
    fn health(&self) -> Result<(), RemoteError>;

    fn create_user(&self, user: &UserPayload) -> Result<(), RemoteError>;

    fn create_habit(&self, habit: &HabitPayload) -> Result<(), RemoteError>;

    fn track_entry(&self, entry: &TrackPayload) -> Result<(), RemoteError>;

    fn insights(&self, user_id: &str) -> Result<Vec<RemoteInsight>, RemoteError>;

    fn recommendations(&self, user_id: &str) -> Result<RemoteRecommendation, RemoteError>;

    fn habits(&self, user_id: &str) -> Result<Vec<RemoteHabit>, RemoteError>;

    /// Entries of the last `days` days
    fn entries(&self, user_id: &str, days: u32) -> Result<Vec<RemoteEntry>, RemoteError>;
}

/// A remote that is never reachable; used when remote sync is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl RemoteService for Offline {
    fn health(&self) -> Result<(), RemoteError> {
        Err(RemoteError::Unavailable)
    }

    fn create_user(&self, _: &UserPayload) -> Result<(), RemoteError> {
        Err(RemoteError::Unavailable)
    }

    fn create_habit(&self, _: &HabitPayload) -> Result<(), RemoteError> {
        Err(RemoteError::Unavailable)
    }

    fn track_entry(&self, _: &TrackPayload) -> Result<(), RemoteError> {
        Err(RemoteError::Unavailable)
    }

    fn insights(&self, _: &str) -> Result<Vec<RemoteInsight>, RemoteError> {
        Err(RemoteError::Unavailable)
    }

    fn recommendations(&self, _: &str) -> Result<RemoteRecommendation, RemoteError> {
        Err(RemoteError::Unavailable)
    }

    fn habits(&self, _: &str) -> Result<Vec<RemoteHabit>, RemoteError> {
        Err(RemoteError::Unavailable)
    }

    fn entries(&self, _: &str, _: u32) -> Result<Vec<RemoteEntry>, RemoteError> {
        Err(RemoteError::Unavailable)
    }
}

/// How far the remote copy lags behind local state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub local_habits: usize,
    pub remote_habits: usize,
    /// Local habit names the remote does not have
    pub missing_remotely: Vec<String>,
    /// Completions of the last 7 days
    pub local_completions: usize,
    pub remote_completions: usize,
    pub pending_writes: usize,
}

impl SyncStatus {
    pub fn is_in_sync(&self) -> bool {
        self.missing_remotely.is_empty()
            && self.local_completions <= self.remote_completions
            && self.pending_writes == 0
    }
}

/// Where a result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Local,
    Remote,
}

/// A value tagged with its source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sourced<T> {
    pub value: T,
    pub source: DataSource,
}

impl<T> Sourced<T> {
    pub fn local(value: T) -> Self {
        Self {
            value,
            source: DataSource::Local,
        }
    }

    pub fn remote(value: T) -> Self {
        Self {
            value,
            source: DataSource::Remote,
        }
    }

    pub fn is_local(&self) -> bool {
        self.source == DataSource::Local
    }
}

/// Applies the local-first policy on top of a remote service
pub struct HabitService<R: RemoteService> {
    remote: R,
    max_attempts: u32,
}

impl HabitService<Offline> {
    pub fn offline() -> Self {
        Self::new(Offline)
    }
}

impl<R: RemoteService> HabitService<R> {
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Deliver the state's queued writes
    pub fn flush(&self, state: &mut AppState) -> FlushReport {
        let report = state.outbox_mut().flush(&self.remote, self.max_attempts);
        tracing::debug!(
            sent = report.sent,
            dropped = report.dropped,
            remaining = report.remaining,
            "outbox flush finished"
        );
        report
    }

    /// Compare local habits and recent completions with the remote copy.
    ///
    /// `None` when there is no profile to look up.
    pub fn status<Tz: TimeZone>(
        &self,
        state: &AppState,
        now: DateTime<Tz>,
    ) -> Result<Option<SyncStatus>, RemoteError> {
        let Some(user) = state.user() else {
            return Ok(None);
        };

        let remote_habits = self.remote.habits(&user.user_id)?;
        let remote_completions = self
            .remote
            .entries(&user.user_id, RECENT_WINDOW_DAYS)?
            .iter()
            .filter(|e| e.is_completed())
            .count();

        let missing_remotely = state
            .habits()
            .iter()
            .filter(|h| {
                !remote_habits
                    .iter()
                    .any(|r| r.name.eq_ignore_ascii_case(&h.name))
            })
            .map(|h| h.name.clone())
            .collect();

        Ok(Some(SyncStatus {
            local_habits: state.habits().len(),
            remote_habits: remote_habits.len(),
            missing_remotely,
            local_completions: state
                .calculator(now)
                .completions_in_window(RECENT_WINDOW_DAYS),
            remote_completions,
            pending_writes: state.outbox().len(),
        }))
    }

    /// Insights from the remote, or generated locally if it fails
    pub fn insights<Tz: TimeZone>(&self, state: &AppState, now: DateTime<Tz>) -> Sourced<Vec<Insight>> {
        if let Some(user) = state.user() {
            match self.remote.insights(&user.user_id) {
                Ok(remote) => {
                    let insights: Vec<Insight> =
                        remote.into_iter().filter_map(RemoteInsight::into_insight).collect();
                    if !insights.is_empty() {
                        return Sourced::remote(insights);
                    }
                    tracing::debug!("remote returned no usable insights, generating locally");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "remote insights unavailable, using local rules");
                }
            }
        }

        let input = state.calculator(now).insight_input();
        Sourced::local(InsightGenerator::generate(&input))
    }

    /// Habit recommendations from the remote, or the local catalog if it fails
    pub fn recommendations<Tz: TimeZone>(
        &self,
        state: &AppState,
        now: DateTime<Tz>,
    ) -> Sourced<Vec<Recommendation>> {
        if let Some(user) = state.user() {
            match self.remote.recommendations(&user.user_id) {
                Ok(remote) => {
                    let recommendations = remote.into_recommendations();
                    if !recommendations.is_empty() {
                        return Sourced::remote(recommendations);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "remote recommendations unavailable, using local catalog");
                }
            }
        }

        Sourced::local(recommend(state.habits().len(), now.hour()))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// In-memory remote that records writes and can be told to fail
    #[derive(Default)]
    pub struct FakeRemote {
        tracked: RefCell<Vec<String>>,
        created_habits: RefCell<Vec<String>>,
        calls: Cell<usize>,
        fail_after: Cell<Option<usize>>,
        sent: RefCell<Vec<String>>,
        pub insights: RefCell<Vec<RemoteInsight>>,
        pub recommendation: RefCell<Option<String>>,
        pub habits: RefCell<Vec<RemoteHabit>>,
        pub entries: RefCell<Vec<RemoteEntry>>,
    }

    impl FakeRemote {
        /// Succeed for the next `n` write calls, then fail
        pub fn fail_after(&self, n: usize) {
            self.calls.set(0);
            self.fail_after.set(Some(n));
        }

        pub fn recover(&self) {
            self.fail_after.set(None);
        }

        pub fn tracked(&self) -> Vec<String> {
            self.tracked.borrow().clone()
        }

        pub fn created_habits(&self) -> Vec<String> {
            self.created_habits.borrow().clone()
        }

        /// Every delivered write as `kind:name:user`, in order
        pub fn sent(&self) -> Vec<String> {
            self.sent.borrow().clone()
        }

        fn check(&self) -> Result<(), RemoteError> {
            let calls = self.calls.get();
            self.calls.set(calls + 1);
            match self.fail_after.get() {
                Some(n) if calls >= n => Err(RemoteError::Server {
                    status: 500,
                    message: "boom".to_string(),
                }),
                _ => Ok(()),
            }
        }
    }

    impl RemoteService for FakeRemote {
        fn health(&self) -> Result<(), RemoteError> {
            match self.fail_after.get() {
                Some(_) => Err(RemoteError::Unavailable),
                None => Ok(()),
            }
        }

        fn create_user(&self, user: &UserPayload) -> Result<(), RemoteError> {
            self.check()?;
            self.sent.borrow_mut().push(format!("user:{}", user.user_id));
            Ok(())
        }

        fn create_habit(&self, habit: &HabitPayload) -> Result<(), RemoteError> {
            self.check()?;
            self.created_habits.borrow_mut().push(habit.name.clone());
            self.sent
                .borrow_mut()
                .push(format!("habit:{}:{}", habit.name, habit.user_id));
            Ok(())
        }

        fn track_entry(&self, entry: &TrackPayload) -> Result<(), RemoteError> {
            self.check()?;
            self.tracked.borrow_mut().push(entry.habit_name.clone());
            self.sent
                .borrow_mut()
                .push(format!("track:{}:{}", entry.habit_name, entry.user_id));
            Ok(())
        }

        fn insights(&self, _: &str) -> Result<Vec<RemoteInsight>, RemoteError> {
            self.check()?;
            Ok(self.insights.borrow().clone())
        }

        fn recommendations(&self, _: &str) -> Result<RemoteRecommendation, RemoteError> {
            self.check()?;
            Ok(RemoteRecommendation {
                current_habits: Vec::new(),
                recommendation: self.recommendation.borrow().clone().unwrap_or_default(),
            })
        }

        fn habits(&self, _: &str) -> Result<Vec<RemoteHabit>, RemoteError> {
            self.check()?;
            Ok(self.habits.borrow().clone())
        }

        fn entries(&self, _: &str, _: u32) -> Result<Vec<RemoteEntry>, RemoteError> {
            self.check()?;
            Ok(self.entries.borrow().clone())
        }
    }
}
