//! Data access and synchronization core for the Mission Control dashboard.
//!
//! The crate owns the two tables behind the task board and the memory log,
//! the reactive `Store` handle that keeps subscribed screens up to date, and
//! the degrading `Bindings` that screens talk to.

pub mod binding;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;
pub mod store;
pub mod view;

pub use binding::{Bindings, LiveView, MutationHandle, MutationOutcome, QueryView};
pub use config::{ConfigError, LoggingConfig, MissionConfig, StoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::clock::{Clock, ManualClock, SystemClock};
pub use model::memory::{
    CategoryCounts, Memory, MemoryCategory, MemoryId, MemoryPatch, MemoryStats, NewMemory,
};
pub use model::task::{
    Assignee, NewTask, Task, TaskFilter, TaskId, TaskPatch, TaskPriority, TaskStatus,
};
pub use model::ValidationError;
pub use repo::memory_repo::{MemoryRepository, SqliteMemoryRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::{RepoError, RepoResult};
pub use service::memory_service::MemoryService;
pub use service::task_service::TaskService;
pub use store::{ConnectionState, LiveQuery, Mutation, Query, Store, StoreError, StoreResult, Table};
pub use view::{CategorySelection, MemoryScreen, TaskBoard, TaskColumn};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
