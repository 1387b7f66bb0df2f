use crate::task::{Role, ScheduledTask, Task, TaskDraft, TaskListing, TaskStatus};
use crate::task_validation::TaskValidationError;
use chrono::NaiveDate;
use thiserror::Error;

pub mod file;
pub mod sqlite;

pub use file::{
    StoreSnapshot, export_to_csv, export_to_json, import_from_csv, import_from_json,
};
pub use sqlite::SqliteTaskStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    /// A row already in the database does not decode.
    #[error("corrupt stored data: {0}")]
    Corrupt(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read side used by the schedule views.
pub trait ScheduledTaskSource {
    /// Dated tasks with `scheduled_date <= upper_bound` (and `>= lower_bound`
    /// when given), ordered by `(scheduled_date, name)`.
    ///
    /// Rows whose stored date is not `YYYY-MM-DD` are returned regardless of
    /// the bounds so the caller can report them.
    fn query_scheduled_tasks(
        &self,
        not_complete_only: bool,
        upper_bound: NaiveDate,
        lower_bound: Option<NaiveDate>,
    ) -> StoreResult<Vec<ScheduledTask>>;
}

pub trait TaskStore: ScheduledTaskSource {
    fn list_roles(&self) -> StoreResult<Vec<Role>>;
    fn find_role(&self, role_id: i64) -> StoreResult<Option<Role>>;
    fn create_role(&self, name: &str) -> StoreResult<Role>;
    fn rename_role(&self, role_id: i64, name: &str) -> StoreResult<Role>;
    /// Fails with [`StoreError::Conflict`] while tasks still reference the role.
    fn delete_role(&self, role_id: i64) -> StoreResult<()>;

    fn list_tasks(&self, status: TaskStatus) -> StoreResult<Vec<TaskListing>>;
    fn tasks_for_role(&self, role_id: i64) -> StoreResult<Vec<Task>>;
    fn find_task(&self, task_id: i64) -> StoreResult<Option<Task>>;
    fn create_task(&self, draft: &TaskDraft) -> StoreResult<Task>;
    fn update_task(&self, task_id: i64, draft: &TaskDraft) -> StoreResult<Task>;
    fn set_task_complete(&self, task_id: i64, is_complete: bool) -> StoreResult<Task>;
    fn delete_task(&self, task_id: i64) -> StoreResult<bool>;

    fn snapshot(&self) -> StoreResult<StoreSnapshot>;
    /// Replaces every role and task with the snapshot contents.
    fn replace_all(&self, snapshot: &StoreSnapshot) -> StoreResult<()>;
}
