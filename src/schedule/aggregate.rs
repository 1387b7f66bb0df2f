use crate::calendar::ScheduleWindow;
use crate::persistence::{ScheduledTaskSource, StoreResult};
use crate::task::ScheduledTask;
use std::collections::BTreeMap;

/// Incomplete scheduled tasks keyed by their stored ISO date string.
pub type TasksByDate = BTreeMap<String, Vec<ScheduledTask>>;

/// Reads every incomplete, dated task up to the end of `window` and groups it
/// by date. Overdue tasks have no lower bound unless `include_overdue` is off,
/// in which case nothing before today is read.
pub fn scheduled_tasks_by_date<S>(
    source: &S,
    window: &ScheduleWindow,
    include_overdue: bool,
) -> StoreResult<TasksByDate>
where
    S: ScheduledTaskSource + ?Sized,
{
    let lower_bound = if include_overdue {
        None
    } else {
        Some(window.today())
    };
    let tasks = source.query_scheduled_tasks(true, window.max_date(), lower_bound)?;
    Ok(group_by_date(tasks))
}

pub fn group_by_date(tasks: Vec<ScheduledTask>) -> TasksByDate {
    let mut grouped = TasksByDate::new();
    for task in tasks {
        grouped
            .entry(task.scheduled_date.clone())
            .or_default()
            .push(task);
    }
    // stable, so equal names keep store order
    for day_tasks in grouped.values_mut() {
        day_tasks.sort_by(|a, b| a.name.cmp(&b.name));
    }
    grouped
}
