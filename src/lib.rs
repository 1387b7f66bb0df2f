pub mod calendar;
pub mod config;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod schedule;
pub mod task;
pub(crate) mod task_validation;

pub use calendar::{ScheduleWindow, format_day_label, scheduling_window};
pub use config::{AppConfig, ConfigError, LayoutLimits, ScheduleConfig};
pub use persistence::{
    ScheduledTaskSource, SqliteTaskStore, StoreError, StoreSnapshot, TaskStore, export_to_csv,
    export_to_json, import_from_csv, import_from_json,
};
pub use schedule::{
    DayBucket, ScheduleColumns, ScheduleError, TasksByDate, collect_days, pack_single_column,
    pack_two_columns, print_view, schedule_view, scheduled_tasks_by_date,
};
pub use task::{EffortLevel, Role, ScheduledTask, Task, TaskDraft, TaskListing, TaskStatus};

/// Installs the `tracing` subscriber used by the binaries.
///
/// `RUST_LOG` wins when set; otherwise this crate logs at info.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "habit_planner=info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
