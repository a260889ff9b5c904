//! Task use-case service.
//!
//! # Responsibility
//! - Provide the task board's list/create/status/edit/delete entry points.
//!
//! # Invariants
//! - `list_tasks` reads one bounded recent page and filters it in memory, so
//!   a filtered result never reaches past the newest `TASK_LIST_LIMIT` rows.
//! - Creation sets `status = Todo` and `created_at == updated_at`.
//! - A blank title is rejected before any write is attempted.

use super::normalize_optional_text;
use crate::model::clock::{Clock, SystemClock};
use crate::model::require_text;
use crate::model::task::{NewTask, Task, TaskFilter, TaskId, TaskPatch, TaskStatus};
use crate::repo::task_repo::TaskRepository;
use crate::repo::{RepoError, RepoResult};
use std::sync::Arc;

/// Rows read by `list_tasks` before filtering.
pub const TASK_LIST_LIMIT: u32 = 100;
/// Rows returned by `tasks_by_status`.
pub const TASKS_BY_STATUS_LIMIT: u32 = 50;

pub struct TaskService<R: TaskRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service that stamps writes with the wall clock.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, Arc::new(SystemClock))
    }

    pub fn with_clock(repo: R, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Lists the newest tasks, then keeps those matching `filter`.
    pub fn list_tasks(&self, filter: &TaskFilter) -> RepoResult<Vec<Task>> {
        let mut tasks = self.repo.list_recent_tasks(TASK_LIST_LIMIT)?;
        tasks.retain(|task| filter.matches(task));
        Ok(tasks)
    }

    pub fn tasks_by_status(&self, status: TaskStatus) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks_by_status(status, TASKS_BY_STATUS_LIMIT)
    }

    pub fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.repo.get_task(id)
    }

    /// Creates a `Todo` task and returns the stored record.
    ///
    /// The title is stored as entered; a blank description is stored as
    /// `None`.
    pub fn create_task(&self, input: NewTask) -> RepoResult<Task> {
        require_text("task", "title", &input.title)?;

        let mut task = Task::new(
            input.title,
            input.assigned_to,
            input.priority,
            self.clock.now_ms(),
        );
        task.description = normalize_optional_text(input.description);
        self.repo.insert_task(&task)?;
        Ok(task)
    }

    /// Sets a task's status and returns the updated record.
    ///
    /// Writing `Done` stamps `completed_at` even when the task is already
    /// done. Moving out of `Done` leaves `completed_at` untouched.
    pub fn update_task_status(&self, id: TaskId, status: TaskStatus) -> RepoResult<Task> {
        let mut task = self.require_task(id)?;
        task.set_status(status, self.clock.now_ms());
        self.repo.update_task(&task)?;
        Ok(task)
    }

    /// Patches editable fields and returns the updated record.
    ///
    /// A blank description clears it, matching `create_task`.
    pub fn update_task(&self, id: TaskId, patch: TaskPatch) -> RepoResult<Task> {
        if let Some(title) = patch.title.as_deref() {
            require_text("task", "title", title)?;
        }
        let clears_description = patch
            .description
            .as_deref()
            .is_some_and(|text| text.trim().is_empty());
        let patch = TaskPatch {
            description: normalize_optional_text(patch.description),
            ..patch
        };

        let mut task = self.require_task(id)?;
        task.apply_patch(&patch, self.clock.now_ms());
        if clears_description {
            task.description = None;
        }
        self.repo.update_task(&task)?;
        Ok(task)
    }

    /// Hard-deletes a task. Unknown ids surface as `RepoError::NotFound`.
    pub fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        self.repo.delete_task(id)
    }

    fn require_task(&self, id: TaskId) -> RepoResult<Task> {
        self.repo
            .get_task(id)?
            .ok_or(RepoError::NotFound { table: "tasks", id })
    }
}
