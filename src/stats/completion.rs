//! Completion-rate arithmetic and per-day aggregation

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet};

use crate::types::{DailyCompletion, HabitId, WeekdayPattern};

/// `part / whole` as a whole percentage, rounded and clamped to 0-100.
/// A zero denominator yields 0.
pub fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let pct = (part as f64 / whole as f64) * 100.0;
    pct.round().clamp(0.0, 100.0) as u8
}

/// Whole days a habit has existed, rounded up, never less than one
pub fn days_since(created_at: DateTime<Utc>, now: DateTime<Utc>) -> usize {
    let seconds = (now - created_at).num_seconds();
    if seconds <= 0 {
        return 1;
    }
    let days = (seconds + 86_399) / 86_400;
    (days as usize).max(1)
}

/// Per-day completion counts over `[start, end]`, oldest first.
///
/// `completions` maps each registered habit to the dates it was completed;
/// a day's count is the number of distinct habits completed that day.
pub fn daily_series(
    completions: &BTreeMap<HabitId, BTreeSet<NaiveDate>>,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<DailyCompletion> {
    let total = completions.len();
    let mut series = Vec::new();
    let mut day = start;

    while day <= end {
        let completed = completions
            .values()
            .filter(|dates| dates.contains(&day))
            .count();
        series.push(DailyCompletion {
            date: day,
            completed,
            total,
            percentage: percentage(completed, total),
        });
        day += Duration::days(1);
    }

    series
}

/// Best and hardest weekday by number of completions.
///
/// Only weekdays with at least one completion are considered; ties go to the
/// earlier day of the week. `None` when there are no completions.
pub fn weekday_pattern<I>(completion_dates: I) -> Option<WeekdayPattern>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut counts = [0usize; 7];
    for date in completion_dates {
        counts[date.weekday().num_days_from_monday() as usize] += 1;
    }

    let seen: Vec<(usize, usize)> = counts
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, n)| *n > 0)
        .collect();

    let best = seen.iter().fold(None, |acc: Option<(usize, usize)>, &(i, n)| match acc {
        Some((_, m)) if m >= n => acc,
        _ => Some((i, n)),
    })?;
    let hardest = seen.iter().fold(None, |acc: Option<(usize, usize)>, &(i, n)| match acc {
        Some((_, m)) if m <= n => acc,
        _ => Some((i, n)),
    })?;

    Some(WeekdayPattern {
        best_day: weekday_name(best.0).to_string(),
        hardest_day: weekday_name(hardest.0).to_string(),
    })
}

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

fn weekday_name(index_from_monday: usize) -> &'static str {
    WEEKDAY_NAMES[index_from_monday % 7]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_percentage_rounding_and_clamp() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(5, 3), 100);
    }

    #[test]
    fn test_days_since_rounds_up() {
        let created = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(days_since(created, created), 1);
        assert_eq!(days_since(created, created + Duration::hours(1)), 1);
        assert_eq!(days_since(created, created + Duration::hours(25)), 2);
        assert_eq!(days_since(created, created - Duration::days(3)), 1);
    }

    #[test]
    fn test_daily_series_counts_distinct_habits() {
        let read = HabitId::new();
        let walk = HabitId::new();
        let mut completions = BTreeMap::new();
        completions.insert(read, [date(2024, 6, 9), date(2024, 6, 10)].into_iter().collect());
        completions.insert(walk, [date(2024, 6, 10)].into_iter().collect());

        let series = daily_series(&completions, date(2024, 6, 8), date(2024, 6, 10));
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].completed, 0);
        assert_eq!(series[1].percentage, 50);
        assert_eq!(series[2].completed, 2);
        assert_eq!(series[2].percentage, 100);
        assert!(series.iter().all(|d| d.total == 2));
    }

    #[test]
    fn test_daily_series_without_habits() {
        let series = daily_series(&BTreeMap::new(), date(2024, 6, 4), date(2024, 6, 10));
        assert_eq!(series.len(), 7);
        assert!(series.iter().all(|d| d.percentage == 0));
    }

    #[test]
    fn test_weekday_pattern() {
        // 2024-06-10 is a Monday
        let dates = vec![
            date(2024, 6, 10),
            date(2024, 6, 17),
            date(2024, 6, 12),
            date(2024, 6, 15),
        ];
        let pattern = weekday_pattern(dates).unwrap();
        assert_eq!(pattern.best_day, "Monday");
        assert_eq!(pattern.hardest_day, "Wednesday");

        assert!(weekday_pattern(Vec::new()).is_none());
    }
}
