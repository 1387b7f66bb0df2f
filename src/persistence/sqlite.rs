use super::{ScheduledTaskSource, StoreError, StoreResult, StoreSnapshot, TaskStore};
use crate::calendar::parse_iso_date;
use crate::task::{EffortLevel, Role, ScheduledTask, Task, TaskDraft, TaskListing, TaskStatus};
use crate::task_validation;
use chrono::NaiveDate;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;

const TASK_COLUMNS: &str = "id, role_id, name, effort_level, scheduled_date, is_complete";

pub struct SqliteTaskStore {
    connection: Mutex<Connection>,
}

struct TaskRow {
    id: i64,
    role_id: i64,
    name: String,
    effort_level: String,
    scheduled_date: Option<String>,
    is_complete: bool,
}

impl TaskRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            role_id: row.get(1)?,
            name: row.get(2)?,
            effort_level: row.get(3)?,
            scheduled_date: row.get(4)?,
            is_complete: row.get(5)?,
        })
    }

    fn into_task(self) -> StoreResult<Task> {
        let effort_level = parse_effort(self.id, &self.effort_level)?;
        let scheduled_date = match self.scheduled_date.as_deref() {
            None => None,
            Some(raw) => Some(parse_iso_date(raw).ok_or_else(|| {
                StoreError::Corrupt(format!(
                    "task {} has malformed scheduled_date '{raw}'",
                    self.id
                ))
            })?),
        };
        Ok(Task {
            id: self.id,
            role_id: self.role_id,
            name: self.name,
            effort_level,
            scheduled_date,
            is_complete: self.is_complete,
        })
    }
}

fn parse_effort(task_id: i64, raw: &str) -> StoreResult<EffortLevel> {
    raw.parse::<EffortLevel>()
        .map_err(|err| StoreError::Corrupt(format!("task {task_id}: {err}")))
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

impl SqliteTaskStore {
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let connection = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened task database");
        Self::from_connection(connection)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> StoreResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> StoreResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS roles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                role_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                effort_level TEXT NOT NULL CHECK (effort_level IN ('Low', 'Medium', 'High')),
                scheduled_date DATE,
                is_complete INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (role_id) REFERENCES roles (id)
            );
            CREATE INDEX IF NOT EXISTS idx_tasks_schedule
                ON tasks (is_complete, scheduled_date);
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn load_task(conn: &Connection, task_id: i64) -> StoreResult<Option<Task>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
        let row = conn
            .query_row(&sql, params![task_id], TaskRow::from_row)
            .optional()?;
        row.map(TaskRow::into_task).transpose()
    }

    fn ensure_role_exists(conn: &Connection, role_id: i64) -> StoreResult<()> {
        let exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM roles WHERE id = ?1",
            params![role_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(StoreError::InvalidData(format!(
                "role {role_id} does not exist"
            )));
        }
        Ok(())
    }
}

impl ScheduledTaskSource for SqliteTaskStore {
    fn query_scheduled_tasks(
        &self,
        not_complete_only: bool,
        upper_bound: NaiveDate,
        lower_bound: Option<NaiveDate>,
    ) -> StoreResult<Vec<ScheduledTask>> {
        // Bounds are applied after parsing so that a malformed date is always
        // returned, whatever it would compare like as a string.
        let conn = self.connection.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT t.id, t.name, t.effort_level, t.scheduled_date, r.name AS role_name
            FROM tasks t
            JOIN roles r ON t.role_id = r.id
            WHERE t.scheduled_date IS NOT NULL
              AND (?1 = 0 OR t.is_complete = 0)
            ORDER BY t.scheduled_date, t.name
            "#,
        )?;
        let rows = stmt.query_map(params![not_complete_only], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut tasks = Vec::new();
        for row in rows {
            let (id, name, effort, scheduled_date, role_name) = row?;
            if let Some(date) = parse_iso_date(&scheduled_date) {
                let below = lower_bound.is_some_and(|lower| date < lower);
                if below || date > upper_bound {
                    continue;
                }
            }
            tasks.push(ScheduledTask {
                id,
                name,
                effort_level: parse_effort(id, &effort)?,
                scheduled_date,
                role_name,
            });
        }
        tracing::debug!(
            %upper_bound,
            lower_bound = ?lower_bound,
            rows = tasks.len(),
            "queried scheduled tasks"
        );
        Ok(tasks)
    }
}

impl TaskStore for SqliteTaskStore {
    fn list_roles(&self) -> StoreResult<Vec<Role>> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare("SELECT id, name FROM roles ORDER BY name, id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Role {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn find_role(&self, role_id: i64) -> StoreResult<Option<Role>> {
        let conn = self.connection.lock();
        let role = conn
            .query_row(
                "SELECT id, name FROM roles WHERE id = ?1",
                params![role_id],
                |row| {
                    Ok(Role {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(role)
    }

    fn create_role(&self, name: &str) -> StoreResult<Role> {
        task_validation::validate_role_name(name)?;
        let name = name.trim().to_string();
        let conn = self.connection.lock();
        conn.execute("INSERT INTO roles (name) VALUES (?1)", params![name])?;
        let id = conn.last_insert_rowid();
        tracing::debug!(role_id = id, "created role");
        Ok(Role { id, name })
    }

    fn rename_role(&self, role_id: i64, name: &str) -> StoreResult<Role> {
        task_validation::validate_role_name(name)?;
        let name = name.trim().to_string();
        let conn = self.connection.lock();
        let changed = conn.execute(
            "UPDATE roles SET name = ?1 WHERE id = ?2",
            params![name, role_id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("role {role_id} not found")));
        }
        Ok(Role { id: role_id, name })
    }

    fn delete_role(&self, role_id: i64) -> StoreResult<()> {
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        let linked: i64 = tx.query_row(
            "SELECT COUNT(*) FROM tasks WHERE role_id = ?1",
            params![role_id],
            |row| row.get(0),
        )?;
        if linked > 0 {
            return Err(StoreError::Conflict(format!(
                "cannot delete role: {linked} task(s) are still linked, reassign or delete them first"
            )));
        }
        let removed = tx.execute("DELETE FROM roles WHERE id = ?1", params![role_id])?;
        if removed == 0 {
            return Err(StoreError::NotFound(format!("role {role_id} not found")));
        }
        tx.commit()?;
        Ok(())
    }

    fn list_tasks(&self, status: TaskStatus) -> StoreResult<Vec<TaskListing>> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT t.id, t.role_id, t.name, t.effort_level, t.scheduled_date, t.is_complete,
                   r.name AS role_name
            FROM tasks t
            JOIN roles r ON t.role_id = r.id
            WHERE t.is_complete = ?1
            ORDER BY
                CASE WHEN t.scheduled_date IS NULL THEN 1 ELSE 0 END,
                t.scheduled_date ASC,
                t.name ASC
            "#,
        )?;
        let rows = stmt.query_map(params![status.is_complete()], |row| {
            Ok((TaskRow::from_row(row)?, row.get::<_, String>(6)?))
        })?;

        let mut listings = Vec::new();
        for row in rows {
            let (task_row, role_name) = row?;
            listings.push(TaskListing {
                task: task_row.into_task()?,
                role_name,
            });
        }
        Ok(listings)
    }

    fn tasks_for_role(&self, role_id: i64) -> StoreResult<Vec<Task>> {
        let conn = self.connection.lock();
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE role_id = ?1 ORDER BY name");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![role_id], TaskRow::from_row)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?.into_task()?);
        }
        Ok(tasks)
    }

    fn find_task(&self, task_id: i64) -> StoreResult<Option<Task>> {
        let conn = self.connection.lock();
        Self::load_task(&conn, task_id)
    }

    fn create_task(&self, draft: &TaskDraft) -> StoreResult<Task> {
        task_validation::validate_draft(draft)?;
        let conn = self.connection.lock();
        Self::ensure_role_exists(&conn, draft.role_id)?;
        conn.execute(
            "INSERT INTO tasks (name, role_id, effort_level, scheduled_date, is_complete)
             VALUES (?1, ?2, ?3, ?4, 0)",
            params![
                draft.name.trim(),
                draft.role_id,
                draft.effort_level.as_str(),
                format_date(draft.scheduled_date)
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(task_id = id, role_id = draft.role_id, "created task");
        Self::load_task(&conn, id)?
            .ok_or_else(|| StoreError::NotFound(format!("task {id} not found after insert")))
    }

    fn update_task(&self, task_id: i64, draft: &TaskDraft) -> StoreResult<Task> {
        task_validation::validate_draft(draft)?;
        let conn = self.connection.lock();
        Self::ensure_role_exists(&conn, draft.role_id)?;
        let changed = conn.execute(
            "UPDATE tasks SET name = ?1, role_id = ?2, effort_level = ?3, scheduled_date = ?4
             WHERE id = ?5",
            params![
                draft.name.trim(),
                draft.role_id,
                draft.effort_level.as_str(),
                format_date(draft.scheduled_date),
                task_id
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("task {task_id} not found")));
        }
        Self::load_task(&conn, task_id)?
            .ok_or_else(|| StoreError::NotFound(format!("task {task_id} not found")))
    }

    fn set_task_complete(&self, task_id: i64, is_complete: bool) -> StoreResult<Task> {
        let conn = self.connection.lock();
        let changed = conn.execute(
            "UPDATE tasks SET is_complete = ?1 WHERE id = ?2",
            params![is_complete, task_id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("task {task_id} not found")));
        }
        Self::load_task(&conn, task_id)?
            .ok_or_else(|| StoreError::NotFound(format!("task {task_id} not found")))
    }

    fn delete_task(&self, task_id: i64) -> StoreResult<bool> {
        let conn = self.connection.lock();
        let removed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
        Ok(removed > 0)
    }

    fn snapshot(&self) -> StoreResult<StoreSnapshot> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare("SELECT id, name FROM roles ORDER BY id")?;
        let roles = stmt
            .query_map([], |row| {
                Ok(Role {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], TaskRow::from_row)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?.into_task()?);
        }
        Ok(StoreSnapshot { roles, tasks })
    }

    fn replace_all(&self, snapshot: &StoreSnapshot) -> StoreResult<()> {
        task_validation::validate_snapshot(&snapshot.roles, &snapshot.tasks)?;
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM tasks", [])?;
        tx.execute("DELETE FROM roles", [])?;
        {
            let mut stmt = tx.prepare("INSERT INTO roles (id, name) VALUES (?1, ?2)")?;
            for role in &snapshot.roles {
                stmt.execute(params![role.id, role.name.trim()])?;
            }
            let mut stmt = tx.prepare(
                "INSERT INTO tasks (id, role_id, name, effort_level, scheduled_date, is_complete)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for task in &snapshot.tasks {
                stmt.execute(params![
                    task.id,
                    task.role_id,
                    task.name.trim(),
                    task.effort_level.as_str(),
                    format_date(task.scheduled_date),
                    task.is_complete
                ])?;
            }
        }
        tx.commit()?;
        tracing::info!(
            roles = snapshot.roles.len(),
            tasks = snapshot.tasks.len(),
            "replaced store contents"
        );
        Ok(())
    }
}
