use mission_core::db::open_db_in_memory;
use mission_core::service::memory_service::{
    MEMORY_LIST_SEARCH_LIMIT, MEMORY_RECENT_LIMIT, MEMORY_SEARCH_DEFAULT_LIMIT,
    MEMORY_SEARCH_WINDOW,
};
use mission_core::{
    ManualClock, MemoryCategory, MemoryPatch, MemoryService, NewMemory, RepoError,
    SqliteMemoryRepository,
};
use rusqlite::Connection;
use std::sync::Arc;

fn service(conn: &Connection) -> MemoryService<SqliteMemoryRepository<'_>> {
    MemoryService::with_clock(
        SqliteMemoryRepository::new(conn),
        Arc::new(ManualClock::new(10_000, 1)),
    )
}

fn remember(
    service: &MemoryService<SqliteMemoryRepository<'_>>,
    content: &str,
    category: MemoryCategory,
) -> mission_core::Memory {
    service
        .create_memory(NewMemory {
            content: content.to_string(),
            category,
            source: None,
        })
        .unwrap()
}

#[test]
fn create_memory_sets_equal_timestamps_and_keeps_source() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service
        .create_memory(NewMemory {
            content: "Current client count: 2 active clients".to_string(),
            category: MemoryCategory::Work,
            source: Some("MEMORY.md".to_string()),
        })
        .unwrap();

    assert_eq!(created.created_at, created.updated_at);
    assert_eq!(created.source.as_deref(), Some("MEMORY.md"));
    assert_eq!(service.get_memory(created.id).unwrap(), Some(created));
}

#[test]
fn blank_content_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .create_memory(NewMemory {
            content: "   ".to_string(),
            category: MemoryCategory::Insight,
            source: None,
        })
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(service.list_memories(None).unwrap().is_empty());
}

#[test]
fn empty_search_returns_unfiltered_recent_listing() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let older = remember(&service, "older", MemoryCategory::Personal);
    let newer = remember(&service, "newer", MemoryCategory::Goal);

    for query in [None, Some("")] {
        let listed = service.list_memories(query).unwrap();
        assert_eq!(
            listed.iter().map(|memory| memory.id).collect::<Vec<_>>(),
            vec![newer.id, older.id],
            "query {query:?} must list everything"
        );
    }
}

#[test]
fn search_is_case_insensitive_substring() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let onboarding = remember(&service, "Client Onboarding", MemoryCategory::Work);
    remember(&service, "Tournament on Saturday", MemoryCategory::Personal);

    let hits = service.list_memories(Some("client")).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, onboarding.id);

    let hits = service.list_memories(Some("ONBOARD")).unwrap();
    assert_eq!(hits.len(), 1);

    assert!(service.list_memories(Some("invoice")).unwrap().is_empty());
}

#[test]
fn search_query_is_matched_as_typed() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    remember(&service, "Client Onboarding", MemoryCategory::Work);
    let spaced = remember(&service, "two  spaces here", MemoryCategory::Insight);
    remember(&service, "nospace", MemoryCategory::Personal);

    let hits = service.list_memories(Some("  ")).unwrap();
    assert_eq!(
        hits.iter().map(|memory| memory.id).collect::<Vec<_>>(),
        vec![spaced.id]
    );

    assert!(service.list_memories(Some(" client")).unwrap().is_empty());
}

#[test]
fn content_is_stored_as_entered() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let memory = remember(&service, "  indented note\n", MemoryCategory::Insight);
    assert_eq!(memory.content, "  indented note\n");

    let updated = service
        .update_memory(
            memory.id,
            MemoryPatch {
                content: Some(" revised ".to_string()),
                ..MemoryPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.content, " revised ");
    assert_eq!(service.get_memory(memory.id).unwrap().unwrap().content, " revised ");
}

#[test]
fn search_results_are_capped() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    for index in 0..(MEMORY_LIST_SEARCH_LIMIT + 5) {
        remember(&service, &format!("note {index}"), MemoryCategory::Insight);
    }

    assert_eq!(
        service.list_memories(Some("note")).unwrap().len(),
        MEMORY_LIST_SEARCH_LIMIT
    );
    assert_eq!(
        service.search_memories("note", None).unwrap().len(),
        MEMORY_SEARCH_DEFAULT_LIMIT
    );
    assert_eq!(service.search_memories("note", Some(3)).unwrap().len(), 3);
}

#[test]
fn search_only_sees_the_recent_window() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    remember(&service, "needle buried deep", MemoryCategory::Work);
    for index in 0..MEMORY_SEARCH_WINDOW {
        remember(&service, &format!("hay {index}"), MemoryCategory::Work);
    }

    assert!(service.list_memories(Some("needle")).unwrap().is_empty());
    assert_eq!(
        service.list_memories(None).unwrap().len(),
        MEMORY_RECENT_LIMIT as usize
    );

    let recent = service.recent_memories(Some(2)).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].content, format!("hay {}", MEMORY_SEARCH_WINDOW - 1));
    assert_eq!(recent[1].content, format!("hay {}", MEMORY_SEARCH_WINDOW - 2));
}

#[test]
fn by_category_lists_recent_first() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let first = remember(&service, "goal one", MemoryCategory::Goal);
    remember(&service, "work item", MemoryCategory::Work);
    let second = remember(&service, "goal two", MemoryCategory::Goal);

    let goals = service
        .memories_by_category(MemoryCategory::Goal, None)
        .unwrap();
    assert_eq!(
        goals.iter().map(|memory| memory.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );
    assert_eq!(
        service
            .memories_by_category(MemoryCategory::Goal, Some(1))
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn stats_are_zero_filled_and_total_matches_sum() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let empty = service.memory_stats().unwrap();
    assert_eq!(empty.total, 0);
    assert_eq!(empty.by_category.sum(), 0);

    remember(&service, "a", MemoryCategory::Work);
    remember(&service, "b", MemoryCategory::Work);
    remember(&service, "c", MemoryCategory::Preference);

    let stats = service.memory_stats().unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.total, stats.by_category.sum());
    assert_eq!(stats.by_category.work, 2);
    assert_eq!(stats.by_category.preference, 1);
    assert_eq!(stats.by_category.personal, 0);
    assert_eq!(stats.by_category.goal, 0);
    assert_eq!(stats.by_category.insight, 0);
}

#[test]
fn update_and_delete_memory() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let memory = remember(&service, "draft thought", MemoryCategory::Insight);

    let updated = service
        .update_memory(
            memory.id,
            MemoryPatch {
                category: Some(MemoryCategory::Goal),
                ..MemoryPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.content, "draft thought");
    assert_eq!(updated.category, MemoryCategory::Goal);
    assert!(updated.updated_at > updated.created_at);

    service.delete_memory(memory.id).unwrap();
    assert!(service.get_memory(memory.id).unwrap().is_none());
    assert!(matches!(
        service.delete_memory(memory.id).unwrap_err(),
        RepoError::NotFound {
            table: "memories",
            ..
        }
    ));
}
