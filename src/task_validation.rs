use crate::task::{Role, Task, TaskDraft};
use std::collections::HashSet;
use std::fmt;

const MAX_NAME_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskValidationError {
    message: String,
}

impl TaskValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TaskValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TaskValidationError {}

fn validate_name(kind: &str, name: &str) -> Result<(), TaskValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::new(format!("{kind} name must not be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(TaskValidationError::new(format!(
            "{kind} name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_role_name(name: &str) -> Result<(), TaskValidationError> {
    validate_name("role", name)
}

pub fn validate_draft(draft: &TaskDraft) -> Result<(), TaskValidationError> {
    validate_name("task", &draft.name)?;
    if draft.role_id <= 0 {
        return Err(TaskValidationError::new(format!(
            "task role id {} is not a valid id",
            draft.role_id
        )));
    }
    Ok(())
}

/// Checks a full set of roles and tasks before it replaces the store contents.
pub fn validate_snapshot(roles: &[Role], tasks: &[Task]) -> Result<(), TaskValidationError> {
    let mut role_ids = HashSet::with_capacity(roles.len());
    for role in roles {
        validate_role_name(&role.name)
            .map_err(|err| TaskValidationError::new(format!("role {}: {err}", role.id)))?;
        if !role_ids.insert(role.id) {
            return Err(TaskValidationError::new(format!(
                "duplicate role id {}",
                role.id
            )));
        }
    }

    let mut task_ids = HashSet::with_capacity(tasks.len());
    for task in tasks {
        validate_name("task", &task.name)
            .map_err(|err| TaskValidationError::new(format!("task {}: {err}", task.id)))?;
        if !task_ids.insert(task.id) {
            return Err(TaskValidationError::new(format!(
                "duplicate task id {}",
                task.id
            )));
        }
        if !role_ids.contains(&task.role_id) {
            return Err(TaskValidationError::new(format!(
                "task {} references unknown role {}",
                task.id, task.role_id
            )));
        }
    }
    Ok(())
}
