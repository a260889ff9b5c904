//! Memory log use-case service.
//!
//! # Invariants
//! - `list_memories` with an empty query is the plain recent listing, never
//!   an empty search result. Any other query, whitespace included, is
//!   searched exactly as typed.
//! - Search looks only at the newest `MEMORY_SEARCH_WINDOW` rows.
//! - Stats are computed over the whole table.

use super::normalize_optional_text;
use crate::model::clock::{Clock, SystemClock};
use crate::model::memory::{
    Memory, MemoryCategory, MemoryId, MemoryPatch, MemoryStats, NewMemory,
};
use crate::model::require_text;
use crate::repo::memory_repo::MemoryRepository;
use crate::repo::{RepoError, RepoResult};
use std::sync::Arc;

/// Rows returned by the unfiltered recent listing.
pub const MEMORY_RECENT_LIMIT: u32 = 100;
/// Recent rows scanned by a content search.
pub const MEMORY_SEARCH_WINDOW: u32 = 500;
/// Search hits returned by `list_memories`.
pub const MEMORY_LIST_SEARCH_LIMIT: usize = 50;
/// Search hits returned by `search_memories` when no limit is given.
pub const MEMORY_SEARCH_DEFAULT_LIMIT: usize = 20;
pub const MEMORY_CATEGORY_LIMIT: u32 = 50;

pub struct MemoryService<R: MemoryRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
}

impl<R: MemoryRepository> MemoryService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, Arc::new(SystemClock))
    }

    pub fn with_clock(repo: R, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Memory screen listing.
    ///
    /// A non-empty `search` runs a case-insensitive content search capped at
    /// `MEMORY_LIST_SEARCH_LIMIT` hits; otherwise the newest
    /// `MEMORY_RECENT_LIMIT` memories are returned.
    pub fn list_memories(&self, search: Option<&str>) -> RepoResult<Vec<Memory>> {
        match search.filter(|query| !query.is_empty()) {
            Some(query) => self.search_memories(query, Some(MEMORY_LIST_SEARCH_LIMIT)),
            None => self.recent_memories(None),
        }
    }

    pub fn recent_memories(&self, limit: Option<u32>) -> RepoResult<Vec<Memory>> {
        self.repo
            .list_recent_memories(limit.unwrap_or(MEMORY_RECENT_LIMIT))
    }

    /// Case-insensitive substring search over the newest memories.
    ///
    /// The query is matched as given, without trimming.
    pub fn search_memories(&self, query: &str, limit: Option<usize>) -> RepoResult<Vec<Memory>> {
        let needle = query.to_lowercase();
        let limit = limit.unwrap_or(MEMORY_SEARCH_DEFAULT_LIMIT);
        let window = self.repo.list_recent_memories(MEMORY_SEARCH_WINDOW)?;
        Ok(window
            .into_iter()
            .filter(|memory| memory.content_contains(&needle))
            .take(limit)
            .collect())
    }

    pub fn memories_by_category(
        &self,
        category: MemoryCategory,
        limit: Option<u32>,
    ) -> RepoResult<Vec<Memory>> {
        self.repo
            .list_memories_by_category(category, limit.unwrap_or(MEMORY_CATEGORY_LIMIT))
    }

    pub fn memory_stats(&self) -> RepoResult<MemoryStats> {
        self.repo.category_stats()
    }

    pub fn get_memory(&self, id: MemoryId) -> RepoResult<Option<Memory>> {
        self.repo.get_memory(id)
    }

    /// Creates a memory and returns the stored record.
    ///
    /// Content is stored as entered; only a blank one is rejected.
    pub fn create_memory(&self, input: NewMemory) -> RepoResult<Memory> {
        require_text("memory", "content", &input.content)?;

        let mut memory = Memory::new(input.content, input.category, self.clock.now_ms());
        memory.source = normalize_optional_text(input.source);
        self.repo.insert_memory(&memory)?;
        Ok(memory)
    }

    pub fn update_memory(&self, id: MemoryId, patch: MemoryPatch) -> RepoResult<Memory> {
        if let Some(content) = patch.content.as_deref() {
            require_text("memory", "content", content)?;
        }
        let mut memory = self
            .repo
            .get_memory(id)?
            .ok_or(RepoError::NotFound {
                table: "memories",
                id,
            })?;
        memory.apply_patch(&patch, self.clock.now_ms());
        self.repo.update_memory(&memory)?;
        Ok(memory)
    }

    pub fn delete_memory(&self, id: MemoryId) -> RepoResult<()> {
        self.repo.delete_memory(id)
    }
}
