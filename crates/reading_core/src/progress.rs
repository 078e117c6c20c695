use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::plan::{reading_plan, PlanEntry, TOTAL_DAYS};
use crate::streak::compute_streak;

/// Counters recomputed from the entry collection after every mutation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DerivedState {
    pub completed_count: u32,
    pub current_streak: u32,
    pub current_day: u32,
}

impl DerivedState {
    pub fn compute<'a, I>(entries: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a Entry>,
        I::IntoIter: Clone,
    {
        let entries = entries.into_iter();
        Self {
            completed_count: completed_days(entries.clone()).len() as u32,
            current_streak: compute_streak(entries.clone(), today),
            current_day: resolve_current_day(entries, TOTAL_DAYS),
        }
    }

    pub fn progress_percentage(&self) -> f64 {
        progress_percentage(self.completed_count, TOTAL_DAYS)
    }
}

/// Plan days that carry a completed entry.
pub fn completed_days<'a, I>(entries: I) -> BTreeSet<u32>
where
    I: IntoIterator<Item = &'a Entry>,
{
    entries
        .into_iter()
        .filter(|entry| entry.completed)
        .map(|entry| entry.day)
        .collect()
}

/// First day without a completed entry, clamped to `total_days` once everything is done.
pub fn resolve_current_day<'a, I>(entries: I, total_days: u32) -> u32
where
    I: IntoIterator<Item = &'a Entry>,
{
    first_open_day(&completed_days(entries), total_days)
}

fn first_open_day(done: &BTreeSet<u32>, total_days: u32) -> u32 {
    (1..=total_days)
        .find(|day| !done.contains(day))
        .unwrap_or_else(|| total_days.max(1))
}

/// Plan entries scheduled on or before `today` that are not completed, in day order.
pub fn resolve_missed_days(completed: &BTreeSet<u32>, today: NaiveDate) -> Vec<PlanEntry> {
    reading_plan()
        .filter(|entry| entry.scheduled_date <= today && !completed.contains(&entry.day))
        .collect()
}

pub fn progress_percentage(completed_count: u32, total_days: u32) -> f64 {
    if total_days == 0 {
        return 100.0;
    }
    (f64::from(completed_count) / f64::from(total_days) * 100.0).min(100.0)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DayStatus {
    Completed,
    Current,
    Missed,
    Upcoming,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DayCell {
    pub plan: PlanEntry,
    pub status: DayStatus,
}

/// Status grid for every plan day, as shown by the challenge calendar.
pub fn plan_calendar<'a, I>(entries: I, today: NaiveDate) -> Vec<DayCell>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let done = completed_days(entries);
    let current_day = first_open_day(&done, TOTAL_DAYS);
    reading_plan()
        .map(|plan| {
            let status = if done.contains(&plan.day) {
                DayStatus::Completed
            } else if plan.day == current_day {
                DayStatus::Current
            } else if plan.scheduled_date <= today {
                DayStatus::Missed
            } else {
                DayStatus::Upcoming
            };
            DayCell { plan, status }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(date: NaiveDate) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_hms_opt(10, 0, 0).unwrap())
    }

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).unwrap()
    }

    fn completed(days: &[u32]) -> Vec<Entry> {
        days.iter()
            .map(|&day| Entry::completed(day, "Romans 1-8", "", at(date(1, 20))).unwrap())
            .collect()
    }

    #[test]
    fn current_day_starts_at_one() {
        assert_eq!(resolve_current_day(&Vec::<Entry>::new(), TOTAL_DAYS), 1);
    }

    #[test]
    fn current_day_follows_contiguous_run() {
        let entries = completed(&[1, 2, 3, 4, 5]);
        assert_eq!(resolve_current_day(&entries, TOTAL_DAYS), 6);
    }

    #[test]
    fn current_day_stops_at_first_gap() {
        assert_eq!(resolve_current_day(&completed(&[1, 2, 4]), TOTAL_DAYS), 3);
    }

    #[test]
    fn incomplete_entry_is_a_gap() {
        let mut entries = completed(&[1, 2, 3]);
        entries[1].completed = false;
        assert_eq!(resolve_current_day(&entries, TOTAL_DAYS), 2);
    }

    #[test]
    fn finished_plan_clamps_to_last_day() {
        let all: Vec<u32> = (1..=TOTAL_DAYS).collect();
        assert_eq!(resolve_current_day(&completed(&all), TOTAL_DAYS), TOTAL_DAYS);
        assert_eq!(resolve_current_day(&completed(&[1, 2, 3]), 3), 3);
    }

    #[test]
    fn missed_days_cover_elapsed_gaps_in_order() {
        let done: BTreeSet<u32> = [1, 3].into_iter().collect();
        let missed = resolve_missed_days(&done, date(1, 5));
        let days: Vec<u32> = missed.iter().map(|entry| entry.day).collect();
        assert_eq!(days, vec![2, 4, 5]);
    }

    #[test]
    fn missed_days_empty_when_caught_up() {
        let done: BTreeSet<u32> = (1..=10).collect();
        assert!(resolve_missed_days(&done, date(1, 10)).is_empty());
        let before_start = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert!(resolve_missed_days(&BTreeSet::new(), before_start).is_empty());
    }

    #[test]
    fn missed_days_after_plan_end_list_every_gap() {
        let done: BTreeSet<u32> = (1..=85).collect();
        let missed = resolve_missed_days(&done, date(6, 1));
        assert_eq!(missed.len(), 5);
        assert_eq!(missed[0].day, 86);
    }

    #[test]
    fn derived_state_counts_completed_entries() {
        let today = date(1, 20);
        let state = DerivedState::compute(&completed(&[1, 2, 4]), today);
        assert_eq!(state.completed_count, 3);
        assert_eq!(state.current_streak, 1);
        assert_eq!(state.current_day, 3);
    }

    #[test]
    fn progress_percentage_caps_at_hundred() {
        assert_eq!(progress_percentage(45, 90), 50.0);
        assert_eq!(progress_percentage(120, 90), 100.0);
        assert_eq!(progress_percentage(0, 90), 0.0);
    }

    #[test]
    fn calendar_marks_each_status() {
        let cells = plan_calendar(&completed(&[1, 3]), date(1, 4));
        assert_eq!(cells.len(), TOTAL_DAYS as usize);
        assert_eq!(cells[0].status, DayStatus::Completed);
        assert_eq!(cells[1].status, DayStatus::Current);
        assert_eq!(cells[2].status, DayStatus::Completed);
        assert_eq!(cells[3].status, DayStatus::Missed);
        assert_eq!(cells[4].status, DayStatus::Upcoming);
    }
}
