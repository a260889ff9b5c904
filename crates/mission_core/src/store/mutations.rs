//! Typed write functions exposed by the store.
//!
//! Every mutation builds its service on the transaction handed in by
//! `Store::mutate`, using the store's clock.

use super::{Mutation, Table};
use crate::model::clock::Clock;
use crate::model::memory::{Memory, MemoryId, MemoryPatch, NewMemory};
use crate::model::task::{NewTask, Task, TaskId, TaskPatch, TaskStatus};
use crate::repo::memory_repo::SqliteMemoryRepository;
use crate::repo::task_repo::SqliteTaskRepository;
use crate::repo::RepoResult;
use crate::seed;
use crate::service::memory_service::MemoryService;
use crate::service::task_service::TaskService;
use rusqlite::Connection;
use std::sync::Arc;

const TASKS: &[Table] = &[Table::Tasks];
const MEMORIES: &[Table] = &[Table::Memories];

fn task_service<'c>(
    conn: &'c Connection,
    clock: &Arc<dyn Clock>,
) -> TaskService<SqliteTaskRepository<'c>> {
    TaskService::with_clock(SqliteTaskRepository::new(conn), Arc::clone(clock))
}

fn memory_service<'c>(
    conn: &'c Connection,
    clock: &Arc<dyn Clock>,
) -> MemoryService<SqliteMemoryRepository<'c>> {
    MemoryService::with_clock(SqliteMemoryRepository::new(conn), Arc::clone(clock))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTask(pub NewTask);

impl Mutation for CreateTask {
    type Output = Task;

    fn name(&self) -> &'static str {
        "tasks.create"
    }

    fn tables(&self) -> &'static [Table] {
        TASKS
    }

    fn apply(self, conn: &Connection, clock: &Arc<dyn Clock>) -> RepoResult<Task> {
        task_service(conn, clock).create_task(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateTaskStatus {
    pub id: TaskId,
    pub status: TaskStatus,
}

impl Mutation for UpdateTaskStatus {
    type Output = Task;

    fn name(&self) -> &'static str {
        "tasks.update_status"
    }

    fn tables(&self) -> &'static [Table] {
        TASKS
    }

    fn apply(self, conn: &Connection, clock: &Arc<dyn Clock>) -> RepoResult<Task> {
        task_service(conn, clock).update_task_status(self.id, self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTask {
    pub id: TaskId,
    pub patch: TaskPatch,
}

impl Mutation for UpdateTask {
    type Output = Task;

    fn name(&self) -> &'static str {
        "tasks.update"
    }

    fn tables(&self) -> &'static [Table] {
        TASKS
    }

    fn apply(self, conn: &Connection, clock: &Arc<dyn Clock>) -> RepoResult<Task> {
        task_service(conn, clock).update_task(self.id, self.patch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteTask {
    pub id: TaskId,
}

impl Mutation for DeleteTask {
    type Output = ();

    fn name(&self) -> &'static str {
        "tasks.remove"
    }

    fn tables(&self) -> &'static [Table] {
        TASKS
    }

    fn apply(self, conn: &Connection, clock: &Arc<dyn Clock>) -> RepoResult<()> {
        task_service(conn, clock).delete_task(self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMemory(pub NewMemory);

impl Mutation for CreateMemory {
    type Output = Memory;

    fn name(&self) -> &'static str {
        "memories.create"
    }

    fn tables(&self) -> &'static [Table] {
        MEMORIES
    }

    fn apply(self, conn: &Connection, clock: &Arc<dyn Clock>) -> RepoResult<Memory> {
        memory_service(conn, clock).create_memory(self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateMemory {
    pub id: MemoryId,
    pub patch: MemoryPatch,
}

impl Mutation for UpdateMemory {
    type Output = Memory;

    fn name(&self) -> &'static str {
        "memories.update"
    }

    fn tables(&self) -> &'static [Table] {
        MEMORIES
    }

    fn apply(self, conn: &Connection, clock: &Arc<dyn Clock>) -> RepoResult<Memory> {
        memory_service(conn, clock).update_memory(self.id, self.patch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteMemory {
    pub id: MemoryId,
}

impl Mutation for DeleteMemory {
    type Output = ();

    fn name(&self) -> &'static str {
        "memories.remove"
    }

    fn tables(&self) -> &'static [Table] {
        MEMORIES
    }

    fn apply(self, conn: &Connection, clock: &Arc<dyn Clock>) -> RepoResult<()> {
        memory_service(conn, clock).delete_memory(self.id)
    }
}

/// Inserts the initial task list. Returns the number of rows inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedTasks;

impl Mutation for SeedTasks {
    type Output = usize;

    fn name(&self) -> &'static str {
        "seed.tasks"
    }

    fn tables(&self) -> &'static [Table] {
        TASKS
    }

    fn apply(self, conn: &Connection, clock: &Arc<dyn Clock>) -> RepoResult<usize> {
        seed::seed_tasks(&SqliteTaskRepository::new(conn), clock.now_ms())
    }
}

/// Inserts the initial memory log. Returns the number of rows inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedMemories;

impl Mutation for SeedMemories {
    type Output = usize;

    fn name(&self) -> &'static str {
        "seed.memories"
    }

    fn tables(&self) -> &'static [Table] {
        MEMORIES
    }

    fn apply(self, conn: &Connection, clock: &Arc<dyn Clock>) -> RepoResult<usize> {
        seed::seed_memories(&SqliteMemoryRepository::new(conn), clock.now_ms())
    }
}
