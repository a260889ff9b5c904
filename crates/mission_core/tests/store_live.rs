use mission_core::store::mutations::{
    CreateMemory, CreateTask, DeleteMemory, DeleteTask, SeedMemories, SeedTasks, UpdateTask,
    UpdateTaskStatus,
};
use mission_core::store::queries::{
    ListMemories, ListTasks, MemoriesByCategory, MemoryStatsQuery, TasksByStatus,
};
use mission_core::{
    Assignee, ConnectionState, ManualClock, MemoryCategory, NewMemory, NewTask, RepoError, Store,
    StoreConfig, StoreError, TaskFilter, TaskPatch, TaskPriority, TaskStatus,
};
use std::sync::Arc;

fn store() -> Store {
    Store::open_with_clock(&StoreConfig::in_memory(), Arc::new(ManualClock::new(1_000, 1)))
}

fn ship_spec() -> CreateTask {
    CreateTask(NewTask {
        title: "Ship spec".to_string(),
        description: None,
        assigned_to: Assignee::Jesus,
        priority: TaskPriority::High,
    })
}

#[test]
fn task_lifecycle_scenario() {
    let store = store();
    assert_eq!(store.state(), ConnectionState::Connected);

    let task = store.mutate(ship_spec()).unwrap();
    let jesus = ListTasks {
        filter: TaskFilter {
            status: None,
            assigned_to: Some(Assignee::Jesus),
        },
    };
    let listed = store.query(&jesus).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, task.id);
    assert_eq!(listed[0].status, TaskStatus::Todo);

    let done = store
        .mutate(UpdateTaskStatus {
            id: task.id,
            status: TaskStatus::Done,
        })
        .unwrap();
    assert!(done.completed_at.is_some());
    assert!(done.completed_at.unwrap() >= done.created_at);

    store.mutate(DeleteTask { id: task.id }).unwrap();
    assert!(store.query(&jesus).unwrap().is_empty());
    assert!(store.query(&ListTasks::default()).unwrap().is_empty());
}

#[test]
fn subscriptions_receive_results_after_relevant_mutations() {
    let store = store();
    let mut all_tasks = store.subscribe(ListTasks::default()).unwrap();
    let mut todo_column = store
        .subscribe(TasksByStatus {
            status: TaskStatus::Todo,
        })
        .unwrap();
    let mut stats = store.subscribe(MemoryStatsQuery).unwrap();

    assert!(all_tasks.current().is_empty());
    assert!(!all_tasks.has_changed());

    let task = store.mutate(ship_spec()).unwrap();
    assert!(all_tasks.has_changed());
    assert_eq!(all_tasks.take_update().len(), 1);
    assert!(!all_tasks.has_changed());
    assert_eq!(todo_column.take_update().len(), 1);
    assert!(!stats.has_changed(), "task writes must not refresh memory queries");

    store
        .mutate(UpdateTaskStatus {
            id: task.id,
            status: TaskStatus::InProgress,
        })
        .unwrap();
    assert!(todo_column.take_update().is_empty());
    assert_eq!(all_tasks.take_update()[0].status, TaskStatus::InProgress);

    store
        .mutate(CreateMemory(NewMemory {
            content: "Client Onboarding".to_string(),
            category: MemoryCategory::Work,
            source: None,
        }))
        .unwrap();
    let latest = stats.take_update();
    assert_eq!(latest.total, 1);
    assert_eq!(latest.by_category.work, 1);
    assert!(!all_tasks.has_changed());
}

#[test]
fn rejected_mutations_do_not_notify_and_roll_back() {
    let store = store();
    let mut tasks = store.subscribe(ListTasks::default()).unwrap();

    let err = store
        .mutate(CreateTask(NewTask {
            title: "   ".to_string(),
            description: None,
            assigned_to: Assignee::Cristina,
            priority: TaskPriority::Low,
        }))
        .unwrap_err();
    assert!(matches!(err, StoreError::Repo(RepoError::Validation(_))));
    assert!(!tasks.has_changed());

    let err = store
        .mutate(UpdateTask {
            id: uuid::Uuid::new_v4(),
            patch: TaskPatch::default(),
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::Repo(RepoError::NotFound { .. })));
    assert!(tasks.take_update().is_empty());
}

#[test]
fn dropped_subscriptions_are_pruned() {
    let store = store();
    let first = store.subscribe(ListTasks::default()).unwrap();
    let _second = store.subscribe(ListMemories::default()).unwrap();
    assert_eq!(store.live_count(), 2);

    drop(first);
    store.mutate(ship_spec()).unwrap();
    assert_eq!(store.live_count(), 1);
}

#[test]
fn last_write_wins_per_task() {
    let store = store();
    let task = store.mutate(ship_spec()).unwrap();

    store
        .mutate(UpdateTaskStatus {
            id: task.id,
            status: TaskStatus::Blocked,
        })
        .unwrap();
    store
        .mutate(UpdateTaskStatus {
            id: task.id,
            status: TaskStatus::InProgress,
        })
        .unwrap();

    let tasks = store.query(&ListTasks::default()).unwrap();
    assert_eq!(tasks[0].status, TaskStatus::InProgress);
}

#[test]
fn seeding_inserts_initial_rows() {
    let store = store();
    assert_eq!(store.mutate(SeedTasks).unwrap(), 9);
    assert_eq!(store.mutate(SeedMemories).unwrap(), 5);

    let tasks = store.query(&ListTasks::default()).unwrap();
    assert_eq!(tasks.len(), 9);
    assert!(tasks.iter().all(|task| task.status == TaskStatus::Todo));
    assert!(tasks.iter().all(|task| task.created_at == tasks[0].created_at));
    assert_eq!(tasks[0].title, "Tournament at WSA - Saturday prep");

    let stats = store.query(&MemoryStatsQuery).unwrap();
    assert_eq!(stats.total, 5);
    assert_eq!(stats.by_category.work, 2);
    assert_eq!(stats.by_category.insight, 0);

    let work = store
        .query(&MemoriesByCategory {
            category: MemoryCategory::Work,
            limit: None,
        })
        .unwrap();
    assert_eq!(work.len(), 2);
}

#[test]
fn file_store_survives_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::file(dir.path().join("mission.db"));
    let store = Store::open(&config);
    let mut memories = store.subscribe(ListMemories::default()).unwrap();

    let memory = store
        .mutate(CreateMemory(NewMemory {
            content: "persisted".to_string(),
            category: MemoryCategory::Personal,
            source: Some("test".to_string()),
        }))
        .unwrap();
    assert_eq!(memories.take_update().len(), 1);

    let mut states = store.watch_state();
    store.reconnect(&config);
    assert!(states.has_changed().unwrap());
    assert_eq!(*states.borrow_and_update(), ConnectionState::Connected);
    assert_eq!(memories.take_update()[0].id, memory.id);

    store.mutate(DeleteMemory { id: memory.id }).unwrap();
    assert!(memories.take_update().is_empty());
}

#[tokio::test]
async fn live_query_wakes_async_waiters() {
    let store = store();
    let mut tasks = store.subscribe(ListTasks::default()).unwrap();

    let writer = store.clone();
    writer.mutate(ship_spec()).unwrap();

    assert!(tasks.changed().await);
    assert_eq!(tasks.current().len(), 1);
}
