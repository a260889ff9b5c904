//! Screen projections: task board columns and the memory screen filter.
//!
//! These are pure functions of already-fetched data; they never touch the
//! store.

use crate::model::memory::{Memory, MemoryCategory, MemoryStats};
use crate::model::task::{Task, TaskStatus};
use serde::Serialize;

/// One board column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskColumn {
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

/// Tasks grouped into the four status columns, in `TaskStatus::ALL` order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskBoard {
    pub columns: Vec<TaskColumn>,
}

impl TaskBoard {
    /// Groups `tasks`, keeping their incoming order inside each column.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut columns: Vec<TaskColumn> = TaskStatus::ALL
            .iter()
            .map(|status| TaskColumn {
                status: *status,
                tasks: Vec::new(),
            })
            .collect();

        for task in tasks {
            if let Some(column) = columns.iter_mut().find(|column| column.status == task.status) {
                column.tasks.push(task);
            }
        }

        Self { columns }
    }

    pub fn column(&self, status: TaskStatus) -> &[Task] {
        self.columns
            .iter()
            .find(|column| column.status == status)
            .map(|column| column.tasks.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(|column| column.tasks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Category selector on the memory screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategorySelection {
    #[default]
    All,
    Only(MemoryCategory),
}

impl CategorySelection {
    pub fn matches(self, memory: &Memory) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => memory.category == category,
        }
    }
}

/// Memory screen state: current listing, selector and stats header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryScreen {
    pub memories: Vec<Memory>,
    pub selection: CategorySelection,
    pub stats: MemoryStats,
}

impl MemoryScreen {
    pub fn new(memories: Vec<Memory>, selection: CategorySelection, stats: MemoryStats) -> Self {
        Self {
            memories,
            selection,
            stats,
        }
    }

    /// Memories shown under the current selector.
    pub fn visible(&self) -> Vec<&Memory> {
        self.memories
            .iter()
            .filter(|memory| self.selection.matches(memory))
            .collect()
    }
}
