//! Typed read functions exposed by the store.

use super::{Query, Table};
use crate::model::memory::{Memory, MemoryCategory, MemoryStats};
use crate::model::task::{Task, TaskFilter, TaskStatus};
use crate::repo::memory_repo::SqliteMemoryRepository;
use crate::repo::task_repo::SqliteTaskRepository;
use crate::repo::RepoResult;
use crate::service::memory_service::MemoryService;
use crate::service::task_service::TaskService;
use rusqlite::Connection;

const TASKS: &[Table] = &[Table::Tasks];
const MEMORIES: &[Table] = &[Table::Memories];

fn task_service(conn: &Connection) -> TaskService<SqliteTaskRepository<'_>> {
    TaskService::new(SqliteTaskRepository::new(conn))
}

fn memory_service(conn: &Connection) -> MemoryService<SqliteMemoryRepository<'_>> {
    MemoryService::new(SqliteMemoryRepository::new(conn))
}

/// Bounded recent task page with optional equality filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListTasks {
    pub filter: TaskFilter,
}

impl Query for ListTasks {
    type Output = Vec<Task>;

    fn name(&self) -> &'static str {
        "tasks.list"
    }

    fn tables(&self) -> &'static [Table] {
        TASKS
    }

    fn run(&self, conn: &Connection) -> RepoResult<Self::Output> {
        task_service(conn).list_tasks(&self.filter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TasksByStatus {
    pub status: TaskStatus,
}

impl Query for TasksByStatus {
    type Output = Vec<Task>;

    fn name(&self) -> &'static str {
        "tasks.by_status"
    }

    fn tables(&self) -> &'static [Table] {
        TASKS
    }

    fn run(&self, conn: &Connection) -> RepoResult<Self::Output> {
        task_service(conn).tasks_by_status(self.status)
    }
}

/// Memory screen listing: search when `search` is non-empty, recent otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListMemories {
    pub search: Option<String>,
}

impl Query for ListMemories {
    type Output = Vec<Memory>;

    fn name(&self) -> &'static str {
        "memories.list"
    }

    fn tables(&self) -> &'static [Table] {
        MEMORIES
    }

    fn run(&self, conn: &Connection) -> RepoResult<Self::Output> {
        memory_service(conn).list_memories(self.search.as_deref())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecentMemories {
    pub limit: Option<u32>,
}

impl Query for RecentMemories {
    type Output = Vec<Memory>;

    fn name(&self) -> &'static str {
        "memories.recent"
    }

    fn tables(&self) -> &'static [Table] {
        MEMORIES
    }

    fn run(&self, conn: &Connection) -> RepoResult<Self::Output> {
        memory_service(conn).recent_memories(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMemories {
    pub query: String,
    pub limit: Option<usize>,
}

impl Query for SearchMemories {
    type Output = Vec<Memory>;

    fn name(&self) -> &'static str {
        "memories.search"
    }

    fn tables(&self) -> &'static [Table] {
        MEMORIES
    }

    fn run(&self, conn: &Connection) -> RepoResult<Self::Output> {
        memory_service(conn).search_memories(&self.query, self.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoriesByCategory {
    pub category: MemoryCategory,
    pub limit: Option<u32>,
}

impl Query for MemoriesByCategory {
    type Output = Vec<Memory>;

    fn name(&self) -> &'static str {
        "memories.by_category"
    }

    fn tables(&self) -> &'static [Table] {
        MEMORIES
    }

    fn run(&self, conn: &Connection) -> RepoResult<Self::Output> {
        memory_service(conn).memories_by_category(self.category, self.limit)
    }
}

/// Whole-table category counts. Degrades to all-zero counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStatsQuery;

impl Query for MemoryStatsQuery {
    type Output = MemoryStats;

    fn name(&self) -> &'static str {
        "memories.stats"
    }

    fn tables(&self) -> &'static [Table] {
        MEMORIES
    }

    fn run(&self, conn: &Connection) -> RepoResult<Self::Output> {
        memory_service(conn).memory_stats()
    }
}
