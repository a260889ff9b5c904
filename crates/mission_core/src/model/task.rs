//! Task domain model.
//!
//! # Responsibility
//! - Define the task board record and its status/assignee/priority enums.
//! - Provide the status transition helper used by every status write.
//!
//! # Invariants
//! - `title` is never blank.
//! - `created_at <= updated_at`.
//! - `completed_at` is set on every transition into `Done` and is never
//!   cleared afterwards, so it survives a regression out of `Done`.

use super::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a task row.
pub type TaskId = Uuid;

/// Board column a task sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    Blocked,
}

impl TaskStatus {
    /// Board column order.
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Blocked,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Blocked => "blocked",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "todo" => Some(Self::Todo),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }

    /// Human-readable column label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
            Self::Blocked => "Blocked",
        }
    }
}

/// The two people tasks can be assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assignee {
    Cristina,
    Jesus,
}

impl Assignee {
    pub const ALL: [Assignee; 2] = [Assignee::Cristina, Assignee::Jesus];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cristina => "cristina",
            Self::Jesus => "jesus",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cristina" => Some(Self::Cristina),
            "jesus" => Some(Self::Jesus),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// One row of the `tasks` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub assigned_to: Assignee,
    pub priority: TaskPriority,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Equals `created_at` right after creation.
    pub updated_at: i64,
    /// Unix epoch milliseconds of the latest transition into `Done`.
    pub completed_at: Option<i64>,
}

impl Task {
    /// Creates a `Todo` task with a fresh id and both timestamps set to `now_ms`.
    pub fn new(
        title: impl Into<String>,
        assigned_to: Assignee,
        priority: TaskPriority,
        now_ms: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            status: TaskStatus::Todo,
            assigned_to,
            priority,
            created_at: now_ms,
            updated_at: now_ms,
            completed_at: None,
        }
    }

    /// Moves the task to `status`.
    ///
    /// Stamps `completed_at` whenever `status` is `Done`, including a
    /// `Done -> Done` write. Leaving `Done` keeps the old stamp.
    /// A `now_ms` earlier than `created_at` is clamped to it.
    pub fn set_status(&mut self, status: TaskStatus, now_ms: i64) {
        let now_ms = now_ms.max(self.created_at);
        self.status = status;
        self.updated_at = now_ms;
        if status == TaskStatus::Done {
            self.completed_at = Some(now_ms);
        }
    }

    /// Applies a partial field patch and touches `updated_at`.
    pub fn apply_patch(&mut self, patch: &TaskPatch, now_ms: i64) {
        let now_ms = now_ms.max(self.created_at);
        if let Some(title) = patch.title.as_ref() {
            self.title = title.clone();
        }
        if let Some(description) = patch.description.as_ref() {
            self.description = Some(description.clone());
        }
        if let Some(assigned_to) = patch.assigned_to {
            self.assigned_to = assigned_to;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        self.updated_at = now_ms;
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("task", "title", &self.title)?;
        if self.updated_at < self.created_at {
            return Err(ValidationError::TimestampOrder {
                entity: "task",
                earlier: "created_at",
                later: "updated_at",
            });
        }
        match self.completed_at {
            Some(completed_at) if completed_at < self.created_at => {
                Err(ValidationError::TimestampOrder {
                    entity: "task",
                    earlier: "created_at",
                    later: "completed_at",
                })
            }
            None if self.status == TaskStatus::Done => Err(ValidationError::MissingCompletion),
            _ => Ok(()),
        }
    }
}

/// Input for task creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Assignee,
    pub priority: TaskPriority,
}

/// Partial update of the editable task fields. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<Assignee>,
    pub priority: Option<TaskPriority>,
}

/// Equality filters applied to the bounded task listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Assignee>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |status| task.status == status)
            && self
                .assigned_to
                .map_or(true, |assignee| task.assigned_to == assignee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_wire_names_roundtrip() {
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }
        for assignee in Assignee::ALL {
            assert_eq!(Assignee::parse(assignee.as_str()), Some(assignee));
        }
        for priority in TaskPriority::ALL {
            assert_eq!(TaskPriority::parse(priority.as_str()), Some(priority));
        }
        assert_eq!(TaskStatus::parse("cancelled"), None);
    }

    #[test]
    fn done_stamps_completion_and_regression_keeps_it() {
        let mut task = Task::new("Ship", Assignee::Jesus, TaskPriority::High, 100);
        task.set_status(TaskStatus::Done, 200);
        assert_eq!(task.completed_at, Some(200));

        task.set_status(TaskStatus::InProgress, 300);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.completed_at, Some(200));

        task.set_status(TaskStatus::Done, 400);
        assert_eq!(task.completed_at, Some(400));
    }

    #[test]
    fn backwards_clock_is_clamped_to_creation() {
        let mut task = Task::new("Ship", Assignee::Jesus, TaskPriority::High, 1_000);
        task.set_status(TaskStatus::Done, 400);
        assert_eq!(task.updated_at, 1_000);
        assert_eq!(task.completed_at, Some(1_000));
        assert_eq!(task.validate(), Ok(()));

        task.apply_patch(&TaskPatch::default(), 10);
        assert_eq!(task.updated_at, 1_000);
        assert_eq!(task.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_blank_title_and_missing_completion() {
        let blank = Task::new("   ", Assignee::Cristina, TaskPriority::Low, 1);
        assert_eq!(
            blank.validate(),
            Err(ValidationError::EmptyField {
                entity: "task",
                field: "title"
            })
        );

        let mut done = Task::new("x", Assignee::Cristina, TaskPriority::Low, 1);
        done.status = TaskStatus::Done;
        assert_eq!(done.validate(), Err(ValidationError::MissingCompletion));
    }

    #[test]
    fn filter_matches_on_both_fields() {
        let task = Task::new("x", Assignee::Jesus, TaskPriority::Medium, 1);
        assert!(TaskFilter::default().matches(&task));
        assert!(TaskFilter {
            status: Some(TaskStatus::Todo),
            assigned_to: Some(Assignee::Jesus),
        }
        .matches(&task));
        assert!(!TaskFilter {
            status: None,
            assigned_to: Some(Assignee::Cristina),
        }
        .matches(&task));
    }
}
