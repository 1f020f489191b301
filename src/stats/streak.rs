//! Streak counting over sets of completion dates

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::types::StreakPolicy;

/// Consecutive completed days ending at `today` (or yesterday, if the policy
/// allows it and today has no completion yet).
pub fn current_streak(dates: &BTreeSet<NaiveDate>, today: NaiveDate, policy: StreakPolicy) -> u32 {
    let start = if dates.contains(&today) {
        today
    } else {
        match (policy, today.pred_opt()) {
            (StreakPolicy::AllowYesterday, Some(yesterday)) if dates.contains(&yesterday) => {
                yesterday
            }
            _ => return 0,
        }
    };

    let mut streak = 0;
    let mut day = Some(start);
    while let Some(d) = day.filter(|d| dates.contains(d)) {
        streak += 1;
        day = d.pred_opt();
    }
    streak
}

/// Longest run of consecutive dates anywhere in the history
pub fn longest_streak(dates: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for &date in dates {
        run = match previous.and_then(|p| p.succ_opt()) {
            Some(next) if next == date => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(date);
    }

    longest
}
