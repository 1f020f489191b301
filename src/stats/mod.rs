//! Streak and completion statistics
//!
//! Everything here is a pure function of the habit registry, the entry log
//! and a reference instant. Calendar days are taken in the reference
//! instant's time zone, so the same history can yield different "today"
//! answers for users in different zones.

pub mod completion;
pub mod streak;

use chrono::{DateTime, TimeZone, Utc};
use std::collections::{BTreeMap, BTreeSet};

use crate::entries::{window_bounds, EntryLog};
use crate::insights::InsightInput;
use crate::registry::HabitRegistry;
use crate::types::{
    Habit, HabitId, HabitStats, MostConsistent, Period, StatsOverview, StreakPolicy, UserStats,
};

pub use completion::{daily_series, days_since, percentage, weekday_pattern};
pub use streak::{current_streak, longest_streak};

/// Window used for "active habit" and insight recency checks
pub const RECENT_WINDOW_DAYS: u32 = 7;

/// Window used for the aggregate completion rate
pub const AGGREGATE_WINDOW_DAYS: u32 = 30;

/// Statistics calculator over a borrowed registry and entry log
pub struct StatsCalculator<'a, Tz: TimeZone> {
    habits: &'a HabitRegistry,
    entries: &'a EntryLog,
    now: DateTime<Tz>,
    policy: StreakPolicy,
}

impl<'a, Tz: TimeZone> StatsCalculator<'a, Tz> {
    pub fn new(habits: &'a HabitRegistry, entries: &'a EntryLog, now: DateTime<Tz>) -> Self {
        Self {
            habits,
            entries,
            now,
            policy: StreakPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: StreakPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn now(&self) -> &DateTime<Tz> {
        &self.now
    }

    /// Distinct calendar dates on which the habit was completed
    pub fn completion_dates(&self, habit_id: HabitId) -> BTreeSet<chrono::NaiveDate> {
        self.entries
            .completed_for_habit(habit_id)
            .map(|e| e.local_date(&self.now))
            .collect()
    }

    /// Completion dates for every registered habit. Orphaned entries are
    /// never included.
    fn registered_completion_dates(&self) -> BTreeMap<HabitId, BTreeSet<chrono::NaiveDate>> {
        self.habits
            .iter()
            .map(|h| (h.id, self.completion_dates(h.id)))
            .collect()
    }

    pub fn completed_today(&self, habit_id: HabitId) -> bool {
        let today = self.now.date_naive();
        self.entries
            .completed_for_habit(habit_id)
            .any(|e| e.local_date(&self.now) == today)
    }

    pub fn current_streak(&self, habit_id: HabitId) -> u32 {
        current_streak(
            &self.completion_dates(habit_id),
            self.now.date_naive(),
            self.policy,
        )
    }

    pub fn longest_streak(&self, habit_id: HabitId) -> u32 {
        longest_streak(&self.completion_dates(habit_id))
    }

    /// Number of registered habits completed today
    pub fn completed_today_count(&self) -> usize {
        self.habits
            .iter()
            .filter(|h| self.completed_today(h.id))
            .count()
    }

    /// Completed entries of registered habits in the last `days` calendar days
    pub fn completions_in_window(&self, days: u32) -> usize {
        self.entries
            .completed_in_window(days, &self.now)
            .filter(|e| self.habits.contains(e.habit_id))
            .count()
    }

    /// Aggregate completion rate over the last `days` calendar days
    pub fn completion_rate(&self, days: u32) -> u8 {
        let slots = self.habits.len() * days.max(1) as usize;
        percentage(self.completions_in_window(days), slots)
    }

    /// Per-day series for a statistics period, oldest first
    pub fn daily_series(&self, period: Period) -> Vec<crate::types::DailyCompletion> {
        let (start, end) = window_bounds(period.days(), &self.now);
        daily_series(&self.registered_completion_dates(), start, end)
    }

    pub fn habit_stats(&self, habit: &Habit) -> HabitStats {
        let dates = self.completion_dates(habit.id);
        let total_entries = self.entries.completed_for_habit(habit.id).count();
        let age_days = days_since(habit.created_at, self.now.with_timezone(&Utc));
        let last_completed = self
            .entries
            .completed_for_habit(habit.id)
            .map(|e| e.instant(&self.now))
            .max();

        HabitStats {
            habit_id: habit.id,
            name: habit.name.clone(),
            total_entries,
            completion_rate: percentage(total_entries, age_days),
            current_streak: current_streak(&dates, self.now.date_naive(), self.policy),
            longest_streak: longest_streak(&dates),
            last_completed,
            completed_today: dates.contains(&self.now.date_naive()),
        }
    }

    /// Stats for every registered habit, in registry order
    pub fn all_habit_stats(&self) -> Vec<HabitStats> {
        self.habits.iter().map(|h| self.habit_stats(h)).collect()
    }

    pub fn user_stats(&self) -> UserStats {
        let (start, end) = window_bounds(RECENT_WINDOW_DAYS, &self.now);
        let completions = self.registered_completion_dates();

        let active_habits = completions
            .values()
            .filter(|dates| dates.range(start..=end).next().is_some())
            .count();

        let any_day: BTreeSet<_> = completions.values().flatten().copied().collect();

        let last_activity = self
            .entries
            .completed()
            .filter(|e| self.habits.contains(e.habit_id))
            .map(|e| e.instant(&self.now))
            .max();

        UserStats {
            total_habits: self.habits.len(),
            active_habits,
            completion_rate: self.completion_rate(AGGREGATE_WINDOW_DAYS),
            streak_days: current_streak(&any_day, self.now.date_naive(), self.policy),
            last_activity,
        }
    }

    /// Everything the statistics view shows for one period
    pub fn overview(&self, period: Period) -> StatsOverview {
        let daily = self.daily_series(period);
        let habits = self.all_habit_stats();

        let average_completion_rate = if daily.is_empty() {
            0
        } else {
            let sum: usize = daily.iter().map(|d| d.percentage as usize).sum();
            (sum as f64 / daily.len() as f64).round() as u8
        };

        let best_streak = habits.iter().map(|h| h.current_streak).max().unwrap_or(0);

        let most_consistent = habits
            .iter()
            .fold(None::<&HabitStats>, |best, h| match best {
                Some(b) if b.completion_rate >= h.completion_rate => Some(b),
                _ if h.completion_rate > 0 => Some(h),
                _ => best,
            })
            .map(|h| MostConsistent {
                name: h.name.clone(),
                completion_rate: h.completion_rate,
            });

        let (start, end) = window_bounds(period.days(), &self.now);
        let period_dates = self
            .entries
            .completed()
            .filter(|e| self.habits.contains(e.habit_id))
            .map(|e| e.local_date(&self.now))
            .filter(|d| *d >= start && *d <= end);

        let overview = StatsOverview {
            period_days: period.days(),
            total_completions: habits.iter().map(|h| h.total_entries).sum(),
            average_completion_rate,
            best_streak,
            most_consistent,
            weekday_pattern: weekday_pattern(period_dates),
            daily,
            habits,
        };

        tracing::debug!(
            period_days = overview.period_days,
            habits = overview.habits.len(),
            total_completions = overview.total_completions,
            "computed stats overview"
        );

        overview
    }

    /// Aggregates consumed by the insight rules
    pub fn insight_input(&self) -> InsightInput {
        let completion_frequency = self
            .habits
            .iter()
            .map(|h| (h.name.clone(), self.entries.completed_for_habit(h.id).count()))
            .filter(|(_, n)| *n > 0)
            .collect();

        InsightInput {
            habit_count: self.habits.len(),
            total_completed: self
                .entries
                .completed()
                .filter(|e| self.habits.contains(e.habit_id))
                .count(),
            completed_last_7_days: self.completions_in_window(RECENT_WINDOW_DAYS),
            completion_frequency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Entry, EntryId, NewHabit, LOCAL_USER_ID};
    use chrono::{Duration, FixedOffset};
    use pretty_assertions::assert_eq;

    struct Fixture {
        habits: HabitRegistry,
        entries: EntryLog,
        now: DateTime<Utc>,
    }

    impl Fixture {
        fn new(names: &[&str]) -> Self {
            let now = Utc.with_ymd_and_hms(2024, 6, 10, 15, 0, 0).unwrap();
            let mut habits = HabitRegistry::new();
            for name in names {
                habits
                    .create(NewHabit::new(*name), LOCAL_USER_ID, now - Duration::days(9))
                    .unwrap();
            }
            Self {
                habits,
                entries: EntryLog::new(),
                now,
            }
        }

        fn id(&self, name: &str) -> HabitId {
            self.habits.find_by_name(name).unwrap().id
        }

        fn complete(&mut self, name: &str, days_ago: i64) {
            let habit_id = self.id(name);
            self.push(habit_id, name, true, Some(self.now - Duration::days(days_ago)));
        }

        fn push(&mut self, habit_id: HabitId, name: &str, completed: bool, ts: Option<DateTime<Utc>>) {
            self.entries.append(Entry {
                id: EntryId::new(),
                habit_id,
                habit_name: name.to_string(),
                owner: LOCAL_USER_ID.to_string(),
                completed,
                rating: None,
                notes: None,
                timestamp: ts,
            });
        }

        fn calc(&self) -> StatsCalculator<'_, Utc> {
            StatsCalculator::new(&self.habits, &self.entries, self.now)
        }
    }

    #[test]
    fn test_empty_log() {
        let fx = Fixture::new(&["Read", "Walk"]);
        let calc = fx.calc();
        for habit in fx.habits.iter() {
            assert_eq!(calc.current_streak(habit.id), 0);
            assert!(!calc.completed_today(habit.id));
        }
        assert_eq!(calc.completion_rate(7), 0);
    }

    #[test]
    fn test_untimed_completion_counts_as_now() {
        let mut fx = Fixture::new(&["Read"]);
        let read = fx.id("Read");
        fx.complete("Read", 3);
        fx.push(read, "Read", true, None);

        let stats = fx.calc().habit_stats(fx.habits.get(read).unwrap());
        assert_eq!(stats.last_completed, Some(fx.now));
        assert!(stats.completed_today);
        assert_eq!(fx.calc().user_stats().last_activity, Some(fx.now));
    }

    #[test]
    fn test_no_habits_rate_is_zero() {
        let fx = Fixture::new(&[]);
        assert_eq!(fx.calc().completion_rate(7), 0);
        assert_eq!(fx.calc().user_stats().completion_rate, 0);
    }

    #[test]
    fn test_read_today_yesterday_and_three_days_ago() {
        let mut fx = Fixture::new(&["Read"]);
        fx.complete("Read", 0);
        fx.complete("Read", 1);
        fx.complete("Read", 3);

        let calc = fx.calc();
        let read = fx.id("Read");
        assert_eq!(calc.current_streak(read), 2);
        assert_eq!(calc.longest_streak(read), 2);
        assert!(calc.completed_today(read));
    }

    #[test]
    fn test_missed_entries_do_not_count() {
        let mut fx = Fixture::new(&["Read"]);
        let read = fx.id("Read");
        let now = fx.now;
        fx.push(read, "Read", false, Some(now));

        let calc = fx.calc();
        assert!(!calc.completed_today(read));
        assert_eq!(calc.current_streak(read), 0);
    }

    #[test]
    fn test_allow_yesterday_policy() {
        let mut fx = Fixture::new(&["Read"]);
        fx.complete("Read", 1);
        fx.complete("Read", 2);
        let read = fx.id("Read");

        assert_eq!(fx.calc().current_streak(read), 0);
        let lenient = fx.calc().with_policy(StreakPolicy::AllowYesterday);
        assert_eq!(lenient.current_streak(read), 2);
    }

    #[test]
    fn test_today_uses_reference_timezone() {
        let mut fx = Fixture::new(&["Read"]);
        let read = fx.id("Read");
        // 23:30 UTC on June 9th is June 10th at UTC+2
        let ts = Utc.with_ymd_and_hms(2024, 6, 9, 23, 30, 0).unwrap();
        fx.push(read, "Read", true, Some(ts));

        let utc_now = Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap();
        let utc_calc = StatsCalculator::new(&fx.habits, &fx.entries, utc_now);
        assert!(!utc_calc.completed_today(read));

        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let local_calc =
            StatsCalculator::new(&fx.habits, &fx.entries, utc_now.with_timezone(&plus_two));
        assert!(local_calc.completed_today(read));
    }

    #[test]
    fn test_missing_timestamp_counts_as_now() {
        let mut fx = Fixture::new(&["Read"]);
        let read = fx.id("Read");
        fx.push(read, "Read", true, None);
        assert!(fx.calc().completed_today(read));
    }

    #[test]
    fn test_completion_rate_over_window() {
        let mut fx = Fixture::new(&["Read", "Walk", "Swim"]);
        // 15 completions over 7 days for 3 habits
        for day in 0..5 {
            fx.complete("Read", day);
            fx.complete("Walk", day);
            fx.complete("Swim", day);
        }
        // outside the window
        fx.complete("Read", 8);

        let calc = fx.calc();
        assert_eq!(calc.completions_in_window(7), 15);
        assert_eq!(calc.completion_rate(7), 71);
    }

    #[test]
    fn test_completion_rate_clamped() {
        let mut fx = Fixture::new(&["Read"]);
        for _ in 0..20 {
            fx.complete("Read", 0);
        }
        assert_eq!(fx.calc().completion_rate(7), 100);
    }

    #[test]
    fn test_orphaned_entries_excluded() {
        let mut fx = Fixture::new(&["Read", "Walk"]);
        fx.complete("Read", 0);
        fx.complete("Walk", 0);
        let walk = fx.id("Walk");
        fx.habits.remove(walk).unwrap();

        let calc = fx.calc();
        assert_eq!(calc.completions_in_window(7), 1);
        assert_eq!(calc.user_stats().total_habits, 1);
        assert_eq!(calc.insight_input().total_completed, 1);
        assert_eq!(calc.daily_series(Period::Week)[6].completed, 1);
    }

    #[test]
    fn test_habit_stats() {
        let mut fx = Fixture::new(&["Read"]);
        for day in [0, 1, 2, 5, 6, 7, 8] {
            fx.complete("Read", day);
        }

        let calc = fx.calc();
        let habit = fx.habits.find_by_name("Read").unwrap();
        let stats = calc.habit_stats(habit);

        assert_eq!(stats.total_entries, 7);
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.longest_streak, 4);
        assert!(stats.completed_today);
        // created 9 days ago: 7 / 9
        assert_eq!(stats.completion_rate, 78);
        assert_eq!(stats.last_completed, Some(fx.now));
    }

    #[test]
    fn test_user_stats() {
        let mut fx = Fixture::new(&["Read", "Walk", "Swim"]);
        fx.complete("Read", 0);
        fx.complete("Walk", 1);
        fx.complete("Swim", 8);

        let stats = fx.calc().user_stats();
        assert_eq!(stats.total_habits, 3);
        assert_eq!(stats.active_habits, 2);
        assert_eq!(stats.streak_days, 2);
        assert_eq!(stats.last_activity, Some(fx.now));
        // 3 completions over 3 habits x 30 days
        assert_eq!(stats.completion_rate, 3);
    }

    #[test]
    fn test_overview() {
        let mut fx = Fixture::new(&["Read", "Walk"]);
        fx.complete("Read", 0);
        fx.complete("Read", 1);
        fx.complete("Walk", 0);

        let overview = fx.calc().overview(Period::Week);
        assert_eq!(overview.period_days, 7);
        assert_eq!(overview.daily.len(), 7);
        assert_eq!(overview.daily[6].percentage, 100);
        assert_eq!(overview.daily[5].percentage, 50);
        assert_eq!(overview.total_completions, 3);
        // (100 + 50) / 7
        assert_eq!(overview.average_completion_rate, 21);
        assert_eq!(overview.best_streak, 2);
        assert_eq!(overview.most_consistent.unwrap().name, "Read");
        // 2024-06-10 is a Monday
        assert_eq!(overview.weekday_pattern.unwrap().best_day, "Monday");
    }

    #[test]
    fn test_overview_without_completions() {
        let fx = Fixture::new(&["Read"]);
        let overview = fx.calc().overview(Period::Month);
        assert_eq!(overview.daily.len(), 30);
        assert!(overview.most_consistent.is_none());
        assert!(overview.weekday_pattern.is_none());
        assert_eq!(overview.best_streak, 0);
    }

    #[test]
    fn test_insight_input() {
        let mut fx = Fixture::new(&["Read", "Walk", "Swim"]);
        fx.complete("Read", 0);
        fx.complete("Read", 10);
        fx.complete("Walk", 2);

        let input = fx.calc().insight_input();
        assert_eq!(input.habit_count, 3);
        assert_eq!(input.total_completed, 3);
        assert_eq!(input.completed_last_7_days, 2);
        assert_eq!(
            input.completion_frequency,
            vec![("Read".to_string(), 2), ("Walk".to_string(), 1)]
        );
    }
}
