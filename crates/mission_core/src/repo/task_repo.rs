//! Task repository contract and SQLite implementation.
//!
//! # Invariants
//! - Listings are ordered most-recent-first: `created_at DESC`, then
//!   insertion order descending for rows sharing a timestamp.
//! - `update_task` replaces every mutable column of an existing row.

use super::{parse_enum, parse_uuid, RepoError, RepoResult};
use crate::model::task::{Assignee, Task, TaskId, TaskPriority, TaskStatus};
use rusqlite::{params, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    description,
    status,
    assigned_to,
    priority,
    created_at,
    updated_at,
    completed_at
FROM tasks";

const RECENT_ORDER_SQL: &str = "ORDER BY created_at DESC, rowid DESC";

/// Repository interface for the `tasks` table.
pub trait TaskRepository {
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Most recent `limit` tasks, unfiltered.
    fn list_recent_tasks(&self, limit: u32) -> RepoResult<Vec<Task>>;
    /// Most recent `limit` tasks with `status`, served by the status index.
    fn list_tasks_by_status(&self, status: TaskStatus, limit: u32) -> RepoResult<Vec<Task>>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                title,
                description,
                status,
                assigned_to,
                priority,
                created_at,
                updated_at,
                completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                task.id.to_string(),
                task.title.as_str(),
                task.description.as_deref(),
                task.status.as_str(),
                task.assigned_to.as_str(),
                task.priority.as_str(),
                task.created_at,
                task.updated_at,
                task.completed_at,
            ],
        )?;

        Ok(task.id)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                description = ?2,
                status = ?3,
                assigned_to = ?4,
                priority = ?5,
                updated_at = ?6,
                completed_at = ?7
             WHERE uuid = ?8;",
            params![
                task.title.as_str(),
                task.description.as_deref(),
                task.status.as_str(),
                task.assigned_to.as_str(),
                task.priority.as_str(),
                task.updated_at,
                task.completed_at,
                task.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "tasks",
                id: task.id,
            });
        }

        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_recent_tasks(&self, limit: u32) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} {RECENT_ORDER_SQL} LIMIT ?1;"))?;
        let mut rows = stmt.query([i64::from(limit)])?;
        collect_tasks(&mut rows)
    }

    fn list_tasks_by_status(&self, status: TaskStatus, limit: u32) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL} WHERE status = ?1 {RECENT_ORDER_SQL} LIMIT ?2;"
        ))?;
        let mut rows = stmt.query(params![status.as_str(), i64::from(limit)])?;
        collect_tasks(&mut rows)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound { table: "tasks", id });
        }

        Ok(())
    }
}

fn collect_tasks(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<Task>> {
    let mut tasks = Vec::new();
    while let Some(row) = rows.next()? {
        tasks.push(parse_task_row(row)?);
    }
    Ok(tasks)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let status_text: String = row.get("status")?;
    let assignee_text: String = row.get("assigned_to")?;
    let priority_text: String = row.get("priority")?;

    let task = Task {
        id: parse_uuid("tasks", &uuid_text)?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: parse_enum("tasks", "status", &status_text, TaskStatus::parse)?,
        assigned_to: parse_enum("tasks", "assigned_to", &assignee_text, Assignee::parse)?,
        priority: parse_enum("tasks", "priority", &priority_text, TaskPriority::parse)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        completed_at: row.get("completed_at")?,
    };
    task.validate()?;
    Ok(task)
}
