use super::{StoreError, StoreResult, TaskStore};
use crate::task::{EffortLevel, Role, Task};
use crate::task_validation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Every role and task in the store, ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub roles: Vec<Role>,
    pub tasks: Vec<Task>,
}

impl StoreSnapshot {
    pub fn validate(&self) -> StoreResult<()> {
        task_validation::validate_snapshot(&self.roles, &self.tasks)?;
        Ok(())
    }
}

pub fn export_to_json<S, P>(store: &S, path: P) -> StoreResult<StoreSnapshot>
where
    S: TaskStore + ?Sized,
    P: AsRef<Path>,
{
    let snapshot = store.snapshot()?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(snapshot)
}

pub fn import_from_json<S, P>(store: &S, path: P) -> StoreResult<StoreSnapshot>
where
    S: TaskStore + ?Sized,
    P: AsRef<Path>,
{
    let file = File::open(path)?;
    let snapshot: StoreSnapshot = serde_json::from_reader(file)?;
    snapshot.validate()?;
    store.replace_all(&snapshot)?;
    Ok(snapshot)
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CsvRecord {
    kind: String,
    id: i64,
    name: String,
    #[serde(default)]
    role_id: String,
    #[serde(default)]
    effort_level: String,
    #[serde(default)]
    scheduled_date: String,
    #[serde(default)]
    is_complete: String,
}

const KIND_ROLE: &str = "role";
const KIND_TASK: &str = "task";

impl From<&Role> for CsvRecord {
    fn from(role: &Role) -> Self {
        Self {
            kind: KIND_ROLE.to_string(),
            id: role.id,
            name: role.name.clone(),
            ..Self::default()
        }
    }
}

impl From<&Task> for CsvRecord {
    fn from(task: &Task) -> Self {
        Self {
            kind: KIND_TASK.to_string(),
            id: task.id,
            name: task.name.clone(),
            role_id: task.role_id.to_string(),
            effort_level: task.effort_level.as_str().to_string(),
            scheduled_date: format_date(task.scheduled_date),
            is_complete: task.is_complete.to_string(),
        }
    }
}

impl CsvRecord {
    fn into_task(self) -> StoreResult<Task> {
        let role_id = self.role_id.trim().parse::<i64>().map_err(|e| {
            StoreError::InvalidData(format!(
                "task {} has invalid role_id '{}': {e}",
                self.id, self.role_id
            ))
        })?;
        let effort_level = self
            .effort_level
            .parse::<EffortLevel>()
            .map_err(|err| StoreError::InvalidData(format!("task {}: {err}", self.id)))?;
        let mut task = Task::new(self.id, role_id, self.name, effort_level);
        task.scheduled_date = parse_date(&self.scheduled_date)?;
        task.is_complete = parse_bool(&self.is_complete)?.unwrap_or(false);
        Ok(task)
    }
}

pub fn export_to_csv<S, P>(store: &S, path: P) -> StoreResult<StoreSnapshot>
where
    S: TaskStore + ?Sized,
    P: AsRef<Path>,
{
    let snapshot = store.snapshot()?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for role in &snapshot.roles {
        writer.serialize(CsvRecord::from(role))?;
    }
    for task in &snapshot.tasks {
        writer.serialize(CsvRecord::from(task))?;
    }
    writer.flush()?;
    Ok(snapshot)
}

pub fn import_from_csv<S, P>(store: &S, path: P) -> StoreResult<StoreSnapshot>
where
    S: TaskStore + ?Sized,
    P: AsRef<Path>,
{
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut snapshot = StoreSnapshot::default();
    for record in reader.deserialize::<CsvRecord>() {
        let record = record?;
        match record.kind.trim() {
            KIND_ROLE => snapshot.roles.push(Role {
                id: record.id,
                name: record.name,
            }),
            KIND_TASK => snapshot.tasks.push(record.into_task()?),
            other => {
                return Err(StoreError::InvalidData(format!(
                    "unknown record kind '{other}'"
                )));
            }
        }
    }
    snapshot.validate()?;
    store.replace_all(&snapshot)?;
    Ok(snapshot)
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_date(input: &str) -> StoreResult<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|e| StoreError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn parse_bool(input: &str) -> StoreResult<Option<bool>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    match input.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(Some(true)),
        "false" | "0" => Ok(Some(false)),
        other => Err(StoreError::InvalidData(format!("invalid boolean '{other}'"))),
    }
}
