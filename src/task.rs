use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rough size of a task, shown next to it on the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffortLevel {
    Low,
    Medium,
    High,
}

impl EffortLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffortLevel::Low => "Low",
            EffortLevel::Medium => "Medium",
            EffortLevel::High => "High",
        }
    }
}

impl fmt::Display for EffortLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEffortLevel(pub String);

impl fmt::Display for UnknownEffortLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown effort level '{}' (expected Low, Medium or High)",
            self.0
        )
    }
}

impl std::error::Error for UnknownEffortLevel {}

impl FromStr for EffortLevel {
    type Err = UnknownEffortLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(EffortLevel::Low),
            "medium" => Ok(EffortLevel::Medium),
            "high" => Ok(EffortLevel::High),
            _ => Err(UnknownEffortLevel(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub role_id: i64,
    pub name: String,
    pub effort_level: EffortLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_complete: bool,
}

impl Task {
    pub fn new(id: i64, role_id: i64, name: impl Into<String>, effort_level: EffortLevel) -> Self {
        Self {
            id,
            role_id,
            name: name.into(),
            effort_level,
            scheduled_date: None,
            is_complete: false,
        }
    }
}

/// Fields a caller supplies when creating or editing a task. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub role_id: i64,
    pub name: String,
    pub effort_level: EffortLevel,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
}

impl TaskDraft {
    pub fn new(role_id: i64, name: impl Into<String>, effort_level: EffortLevel) -> Self {
        Self {
            role_id,
            name: name.into(),
            effort_level,
            scheduled_date: None,
        }
    }

    pub fn scheduled_on(mut self, date: NaiveDate) -> Self {
        self.scheduled_date = Some(date);
        self
    }
}

/// Task list with its role name, as shown on the task pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskListing {
    #[serde(flatten)]
    pub task: Task,
    pub role_name: String,
}

/// Incomplete, dated task as read for the schedule.
///
/// `scheduled_date` is kept as the stored ISO string; it is only parsed when
/// the days are collected so a malformed row surfaces as a data integrity error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub id: i64,
    pub name: String,
    pub effort_level: EffortLevel,
    pub scheduled_date: String,
    pub role_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Active,
    Completed,
}

impl TaskStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(TaskStatus::Active),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(format!("unknown task status '{other}'")),
        }
    }
}
