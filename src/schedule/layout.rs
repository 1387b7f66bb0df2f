use super::days::DayBucket;
use serde::Serialize;

/// Two fixed-height columns of days, each in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleColumns {
    pub left: Vec<DayBucket>,
    pub right: Vec<DayBucket>,
}

impl ScheduleColumns {
    pub fn left_lines(&self) -> usize {
        total_lines(&self.left)
    }

    pub fn right_lines(&self) -> usize {
        total_lines(&self.right)
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    pub fn day_count(&self) -> usize {
        self.left.len() + self.right.len()
    }
}

pub fn total_lines(days: &[DayBucket]) -> usize {
    days.iter().map(|day| day.line_cost).sum()
}

/// Longest prefix of `days` whose line costs fit in `max_lines`.
///
/// The first day that does not fit ends the page, even if a later, smaller
/// day would still fit, so the result is always a contiguous run of dates.
pub fn pack_single_column(days: Vec<DayBucket>, max_lines: usize) -> Vec<DayBucket> {
    let mut packed = Vec::new();
    let mut used: usize = 0;
    for day in days {
        if used.saturating_add(day.line_cost) > max_lines {
            break;
        }
        used += day.line_cost;
        packed.push(day);
    }
    tracing::debug!(days = packed.len(), lines = used, max_lines, "packed single column");
    packed
}

// TODO: a non-truncating mode that keeps scanning for later days that still fit.
/// Places each day in the left column when it fits there, otherwise in the
/// right column, and stops at the first day that fits in neither.
///
/// Days keep their input order within each column; nothing is rebalanced.
pub fn pack_two_columns(days: Vec<DayBucket>, max_lines: usize) -> ScheduleColumns {
    let mut columns = ScheduleColumns::default();
    let mut left_lines: usize = 0;
    let mut right_lines: usize = 0;

    for day in days {
        let lines_needed = day.line_cost;
        if left_lines.saturating_add(lines_needed) <= max_lines {
            left_lines += lines_needed;
            columns.left.push(day);
        } else if right_lines.saturating_add(lines_needed) <= max_lines {
            right_lines += lines_needed;
            columns.right.push(day);
        } else {
            break;
        }
    }

    tracing::debug!(
        left_days = columns.left.len(),
        right_days = columns.right.len(),
        left_lines,
        right_lines,
        max_lines,
        "packed two columns"
    );
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{EffortLevel, ScheduledTask};
    use chrono::{Duration, NaiveDate};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn day(offset: i64, task_count: usize) -> DayBucket {
        let date = start() + Duration::days(offset);
        let tasks = (0..task_count)
            .map(|i| ScheduledTask {
                id: i as i64 + 1,
                name: format!("Task {i}"),
                effort_level: EffortLevel::High,
                scheduled_date: date.format("%Y-%m-%d").to_string(),
                role_name: "Manager".to_string(),
            })
            .collect();
        DayBucket::new(date, tasks, false, 3)
    }

    fn days_with_counts(counts: &[usize]) -> Vec<DayBucket> {
        counts
            .iter()
            .enumerate()
            .map(|(i, count)| day(i as i64, *count))
            .collect()
    }

    #[test]
    fn single_column_stops_before_budget_overflow() {
        let packed = pack_single_column(days_with_counts(&[0, 0, 0, 0, 0]), 10);
        assert_eq!(packed.len(), 3);
        assert_eq!(total_lines(&packed), 9);
    }

    #[test]
    fn single_column_does_not_skip_ahead_to_smaller_days() {
        // costs 3, 8, 3: the 8 blocks the trailing 3 even though it would fit
        let packed = pack_single_column(days_with_counts(&[0, 5, 0]), 7);
        assert_eq!(packed.len(), 1);
    }

    #[test]
    fn single_column_keeps_exact_fit() {
        let packed = pack_single_column(days_with_counts(&[1, 1]), 8);
        assert_eq!(packed.len(), 2);
    }

    #[test]
    fn two_columns_fill_left_then_right() {
        let columns = pack_two_columns(days_with_counts(&[0, 0, 0]), 6);
        assert_eq!(columns.left.len(), 2);
        assert_eq!(columns.right.len(), 1);
        assert_eq!(columns.left_lines(), 6);
        assert_eq!(columns.right_lines(), 3);
        assert_eq!(columns.right[0].date, start() + Duration::days(2));
    }

    #[test]
    fn oversized_first_day_leaves_both_columns_empty() {
        let columns = pack_two_columns(days_with_counts(&[10, 0, 0]), 6);
        assert!(columns.is_empty());
        assert!(pack_single_column(days_with_counts(&[10, 0]), 6).is_empty());
    }

    #[test]
    fn two_columns_stop_at_first_day_fitting_neither() {
        // costs 5, 5, 8, 3 with budget 6: the 8 ends packing, the 3 is never considered
        let columns = pack_two_columns(days_with_counts(&[2, 2, 5, 0]), 6);
        assert_eq!(columns.left.len(), 1);
        assert_eq!(columns.right.len(), 1);
        assert_eq!(columns.day_count(), 2);
    }

    #[test]
    fn right_column_days_were_rejected_by_left_only_for_space() {
        let counts = [1, 4, 0, 2, 0, 3, 1, 0, 6, 2];
        let max_lines = 14;
        let columns = pack_two_columns(days_with_counts(&counts), max_lines);
        assert!(columns.left_lines() <= max_lines);
        assert!(columns.right_lines() <= max_lines);

        // replay the scan: each right-column day must overflow the left column at its turn
        let mut left_lines = 0;
        let mut left_iter = columns.left.iter().peekable();
        for placed in &columns.right {
            while let Some(left_day) = left_iter.next_if(|d| d.date < placed.date) {
                left_lines += left_day.line_cost;
            }
            assert!(left_lines + placed.line_cost > max_lines);
        }
    }

    #[test]
    fn packing_respects_budget_for_many_shapes() {
        for max_lines in 1..=20 {
            for seed in 0..6usize {
                let counts: Vec<usize> = (0..12).map(|i| (i * 7 + seed * 3) % 5).collect();
                let days = days_with_counts(&counts);

                let single = pack_single_column(days.clone(), max_lines);
                assert!(total_lines(&single) <= max_lines);
                if let Some(next) = days.get(single.len()) {
                    assert!(total_lines(&single) + next.line_cost > max_lines);
                }
                assert_eq!(single.as_slice(), &days[..single.len()]);

                let columns = pack_two_columns(days.clone(), max_lines);
                assert!(columns.left_lines() <= max_lines);
                assert!(columns.right_lines() <= max_lines);
                let mut merged: Vec<DayBucket> =
                    columns.left.iter().chain(columns.right.iter()).cloned().collect();
                merged.sort_by_key(|d| d.date);
                assert_eq!(merged.as_slice(), &days[..merged.len()]);
            }
        }
    }
}
