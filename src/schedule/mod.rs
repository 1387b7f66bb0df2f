//! Builds the printable schedule: incomplete dated tasks are grouped by day,
//! laid out as a chronological run of days, and cut to a line budget.

use crate::calendar::ScheduleWindow;
use crate::config::{LayoutLimits, ScheduleConfig};
use crate::persistence::{ScheduledTaskSource, StoreError};
use chrono::NaiveDate;
use thiserror::Error;

pub mod aggregate;
pub mod days;
pub mod layout;
pub mod render;

pub use aggregate::{TasksByDate, group_by_date, scheduled_tasks_by_date};
pub use days::{DayBucket, collect_days, day_line_cost};
pub use layout::{ScheduleColumns, pack_single_column, pack_two_columns, total_lines};

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("stored scheduled dates could not be parsed: {}", .invalid_dates.join(", "))]
    DataIntegrity { invalid_dates: Vec<String> },
    #[error("invalid schedule configuration: {0}")]
    InvalidConfiguration(String),
}

fn collect_for_view<S>(
    source: &S,
    today: NaiveDate,
    config: &ScheduleConfig,
) -> Result<(Vec<DayBucket>, LayoutLimits), ScheduleError>
where
    S: ScheduledTaskSource + ?Sized,
{
    let limits = config.validate()?;
    let window = ScheduleWindow::new(today, limits.max_future_days).ok_or_else(|| {
        ScheduleError::InvalidConfiguration(format!(
            "max_future_days {} runs past the last supported date",
            limits.max_future_days
        ))
    })?;
    let tasks_by_date = scheduled_tasks_by_date(source, &window, limits.include_overdue)?;
    let days = collect_days(tasks_by_date, &window, limits.header_lines)?;
    Ok((days, limits))
}

/// Single column schedule starting at the oldest overdue day.
pub fn schedule_view<S>(
    source: &S,
    today: NaiveDate,
    config: &ScheduleConfig,
) -> Result<Vec<DayBucket>, ScheduleError>
where
    S: ScheduledTaskSource + ?Sized,
{
    let (days, limits) = collect_for_view(source, today, config)?;
    Ok(pack_single_column(days, limits.max_lines))
}

/// Two column schedule for the printed page.
pub fn print_view<S>(
    source: &S,
    today: NaiveDate,
    config: &ScheduleConfig,
) -> Result<ScheduleColumns, ScheduleError>
where
    S: ScheduledTaskSource + ?Sized,
{
    let (days, limits) = collect_for_view(source, today, config)?;
    Ok(pack_two_columns(days, limits.max_lines))
}
