use super::ScheduleError;
use super::aggregate::TasksByDate;
use crate::calendar::{ScheduleWindow, format_day_label, parse_iso_date};
use crate::task::ScheduledTask;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// One calendar day of the schedule and the lines it occupies on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub formatted_label: String,
    pub tasks: Vec<ScheduledTask>,
    pub is_overdue: bool,
    pub line_cost: usize,
}

impl DayBucket {
    pub fn new(
        date: NaiveDate,
        tasks: Vec<ScheduledTask>,
        is_overdue: bool,
        header_lines: usize,
    ) -> Self {
        Self {
            date,
            formatted_label: format_day_label(date),
            line_cost: day_line_cost(tasks.len(), header_lines),
            tasks,
            is_overdue,
        }
    }

    /// Lines spent on the heading and spacing, i.e. everything but the tasks.
    pub fn header_lines(&self) -> usize {
        self.line_cost - self.tasks.len()
    }
}

pub fn day_line_cost(task_count: usize, header_lines: usize) -> usize {
    header_lines.saturating_add(task_count)
}

/// Orders the grouped tasks into the day sequence the packers consume:
/// non-empty overdue days oldest first, then every day of `window`, empty or not.
///
/// Every key must parse as `YYYY-MM-DD`; otherwise the whole collection fails
/// with one error naming all offending keys.
pub fn collect_days(
    tasks_by_date: TasksByDate,
    window: &ScheduleWindow,
    header_lines: usize,
) -> Result<Vec<DayBucket>, ScheduleError> {
    let mut by_date: BTreeMap<NaiveDate, Vec<ScheduledTask>> = BTreeMap::new();
    let mut invalid_dates = Vec::new();
    for (key, tasks) in tasks_by_date {
        match parse_iso_date(&key) {
            Some(date) => by_date.entry(date).or_default().extend(tasks),
            None => invalid_dates.push(key),
        }
    }
    if !invalid_dates.is_empty() {
        tracing::warn!(?invalid_dates, "scheduled tasks carry unparseable dates");
        return Err(ScheduleError::DataIntegrity { invalid_dates });
    }

    let mut upcoming = by_date.split_off(&window.today());
    let mut days = Vec::new();
    for (date, mut tasks) in by_date {
        if tasks.is_empty() {
            continue;
        }
        tasks.sort_by(|a, b| a.name.cmp(&b.name));
        days.push(DayBucket::new(date, tasks, true, header_lines));
    }
    let overdue = days.len();

    for date in window.days() {
        let mut tasks = upcoming.remove(&date).unwrap_or_default();
        tasks.sort_by(|a, b| a.name.cmp(&b.name));
        days.push(DayBucket::new(date, tasks, false, header_lines));
    }

    tracing::debug!(
        overdue,
        upcoming = days.len() - overdue,
        "collected schedule days"
    );
    Ok(days)
}
