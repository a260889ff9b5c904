//! Memory repository contract and SQLite implementation.
//!
//! # Invariants
//! - Listings are ordered most-recent-first, like the task repository.
//! - `category_stats` scans every row, so its total always equals the sum
//!   of the per-category counts.

use super::{parse_enum, parse_uuid, RepoError, RepoResult};
use crate::model::memory::{Memory, MemoryCategory, MemoryId, MemoryStats};
use rusqlite::{params, Connection, Row};

const MEMORY_SELECT_SQL: &str = "SELECT
    uuid,
    content,
    category,
    source,
    created_at,
    updated_at
FROM memories";

const RECENT_ORDER_SQL: &str = "ORDER BY created_at DESC, rowid DESC";

/// Repository interface for the `memories` table.
pub trait MemoryRepository {
    fn insert_memory(&self, memory: &Memory) -> RepoResult<MemoryId>;
    fn update_memory(&self, memory: &Memory) -> RepoResult<()>;
    fn get_memory(&self, id: MemoryId) -> RepoResult<Option<Memory>>;
    fn list_recent_memories(&self, limit: u32) -> RepoResult<Vec<Memory>>;
    fn list_memories_by_category(
        &self,
        category: MemoryCategory,
        limit: u32,
    ) -> RepoResult<Vec<Memory>>;
    /// Full-table scan of categories.
    fn category_stats(&self) -> RepoResult<MemoryStats>;
    fn delete_memory(&self, id: MemoryId) -> RepoResult<()>;
}

/// SQLite-backed memory repository.
pub struct SqliteMemoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemoryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl MemoryRepository for SqliteMemoryRepository<'_> {
    fn insert_memory(&self, memory: &Memory) -> RepoResult<MemoryId> {
        memory.validate()?;

        self.conn.execute(
            "INSERT INTO memories (
                uuid,
                content,
                category,
                source,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                memory.id.to_string(),
                memory.content.as_str(),
                memory.category.as_str(),
                memory.source.as_deref(),
                memory.created_at,
                memory.updated_at,
            ],
        )?;

        Ok(memory.id)
    }

    fn update_memory(&self, memory: &Memory) -> RepoResult<()> {
        memory.validate()?;

        let changed = self.conn.execute(
            "UPDATE memories
             SET
                content = ?1,
                category = ?2,
                source = ?3,
                updated_at = ?4
             WHERE uuid = ?5;",
            params![
                memory.content.as_str(),
                memory.category.as_str(),
                memory.source.as_deref(),
                memory.updated_at,
                memory.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "memories",
                id: memory.id,
            });
        }

        Ok(())
    }

    fn get_memory(&self, id: MemoryId) -> RepoResult<Option<Memory>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMORY_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_memory_row(row)?));
        }
        Ok(None)
    }

    fn list_recent_memories(&self, limit: u32) -> RepoResult<Vec<Memory>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMORY_SELECT_SQL} {RECENT_ORDER_SQL} LIMIT ?1;"))?;
        let mut rows = stmt.query([i64::from(limit)])?;
        collect_memories(&mut rows)
    }

    fn list_memories_by_category(
        &self,
        category: MemoryCategory,
        limit: u32,
    ) -> RepoResult<Vec<Memory>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEMORY_SELECT_SQL} WHERE category = ?1 {RECENT_ORDER_SQL} LIMIT ?2;"
        ))?;
        let mut rows = stmt.query(params![category.as_str(), i64::from(limit)])?;
        collect_memories(&mut rows)
    }

    fn category_stats(&self) -> RepoResult<MemoryStats> {
        let mut stmt = self.conn.prepare("SELECT category FROM memories;")?;
        let mut rows = stmt.query([])?;
        let mut stats = MemoryStats::default();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            stats.record(parse_enum(
                "memories",
                "category",
                &value,
                MemoryCategory::parse,
            )?);
        }
        Ok(stats)
    }

    fn delete_memory(&self, id: MemoryId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM memories WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "memories",
                id,
            });
        }

        Ok(())
    }
}

fn collect_memories(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<Memory>> {
    let mut memories = Vec::new();
    while let Some(row) = rows.next()? {
        memories.push(parse_memory_row(row)?);
    }
    Ok(memories)
}

fn parse_memory_row(row: &Row<'_>) -> RepoResult<Memory> {
    let uuid_text: String = row.get("uuid")?;
    let category_text: String = row.get("category")?;

    let memory = Memory {
        id: parse_uuid("memories", &uuid_text)?,
        content: row.get("content")?,
        category: parse_enum("memories", "category", &category_text, MemoryCategory::parse)?,
        source: row.get("source")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    memory.validate()?;
    Ok(memory)
}
