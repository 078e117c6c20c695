use chrono::NaiveDate;

use crate::entry::Entry;

/// Consecutive calendar days with a completed entry, ending today or yesterday.
///
/// Entries are reduced to their UTC calendar date first, so several readings
/// logged on the same day count once. A latest reading older than yesterday
/// breaks the streak entirely.
pub fn compute_streak<'a, I>(entries: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut dates: Vec<NaiveDate> = entries
        .into_iter()
        .filter(|entry| entry.completed)
        .map(Entry::recorded_date)
        .collect();
    if dates.is_empty() {
        return 0;
    }
    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates.dedup();

    let latest = dates[0];
    if (today - latest).num_days() > 1 {
        return 0;
    }

    let mut streak = 1;
    for pair in dates.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
    }

    fn entry_on(day: u32, date: NaiveDate, hour: u32) -> Entry {
        let at = Utc.from_utc_datetime(&date.and_hms_opt(hour, 15, 0).unwrap());
        Entry::completed(day, "Romans 1-8", "", at).unwrap()
    }

    #[test]
    fn empty_collection_has_no_streak() {
        assert_eq!(compute_streak(&Vec::<Entry>::new(), today()), 0);
    }

    #[test]
    fn four_consecutive_days_ending_today() {
        let entries: Vec<Entry> = (0..4)
            .map(|offset| {
                let date = today() - Duration::days(i64::from(offset));
                entry_on(offset + 1, date, 7)
            })
            .collect();
        assert_eq!(compute_streak(&entries, today()), 4);
    }

    #[test]
    fn streak_ending_yesterday_still_counts() {
        let entries = vec![
            entry_on(1, today() - Duration::days(1), 9),
            entry_on(2, today() - Duration::days(2), 9),
        ];
        assert_eq!(compute_streak(&entries, today()), 2);
    }

    #[test]
    fn inactivity_breaks_streak() {
        let entries = vec![
            entry_on(1, today() - Duration::days(3), 9),
            entry_on(2, today() - Duration::days(4), 9),
        ];
        assert_eq!(compute_streak(&entries, today()), 0);
    }

    #[test]
    fn gap_stops_backward_walk() {
        let entries = vec![
            entry_on(5, today(), 9),
            entry_on(4, today() - Duration::days(1), 9),
            entry_on(2, today() - Duration::days(3), 9),
            entry_on(1, today() - Duration::days(4), 9),
        ];
        assert_eq!(compute_streak(&entries, today()), 2);
    }

    #[test]
    fn same_day_readings_collapse() {
        let entries = vec![
            entry_on(3, today(), 21),
            entry_on(2, today(), 6),
            entry_on(1, today() - Duration::days(1), 9),
        ];
        assert_eq!(compute_streak(&entries, today()), 2);
    }

    #[test]
    fn incomplete_entries_are_ignored() {
        let mut skipped = entry_on(2, today(), 9);
        skipped.completed = false;
        let entries = vec![skipped, entry_on(1, today() - Duration::days(2), 9)];
        assert_eq!(compute_streak(&entries, today()), 0);
    }

    #[test]
    fn backfilled_entries_follow_recorded_date_not_plan_day() {
        let entries = vec![
            entry_on(40, today(), 9),
            entry_on(3, today() - Duration::days(1), 9),
        ];
        assert_eq!(compute_streak(&entries, today()), 2);
    }
}
