//! Memory log domain model.
//!
//! # Invariants
//! - `content` is never blank.
//! - `created_at <= updated_at`.
//! - `MemoryStats::total` equals the sum of its per-category counts.

use super::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a memory row.
pub type MemoryId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryCategory {
    Personal,
    Work,
    Preference,
    Goal,
    Insight,
}

impl MemoryCategory {
    pub const ALL: [MemoryCategory; 5] = [
        MemoryCategory::Personal,
        MemoryCategory::Work,
        MemoryCategory::Preference,
        MemoryCategory::Goal,
        MemoryCategory::Insight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Work => "work",
            Self::Preference => "preference",
            Self::Goal => "goal",
            Self::Insight => "insight",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "personal" => Some(Self::Personal),
            "work" => Some(Self::Work),
            "preference" => Some(Self::Preference),
            "goal" => Some(Self::Goal),
            "insight" => Some(Self::Insight),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Personal => "Personal",
            Self::Work => "Work",
            Self::Preference => "Preference",
            Self::Goal => "Goal",
            Self::Insight => "Insight",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Personal => 0,
            Self::Work => 1,
            Self::Preference => 2,
            Self::Goal => 3,
            Self::Insight => 4,
        }
    }
}

/// One row of the `memories` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    pub id: MemoryId,
    pub content: String,
    pub category: MemoryCategory,
    /// Free-text attribution, e.g. the conversation or file it came from.
    pub source: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Memory {
    pub fn new(content: impl Into<String>, category: MemoryCategory, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            category,
            source: None,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Applies a partial patch and touches `updated_at`, never earlier than
    /// `created_at`.
    pub fn apply_patch(&mut self, patch: &MemoryPatch, now_ms: i64) {
        let now_ms = now_ms.max(self.created_at);
        if let Some(content) = patch.content.as_ref() {
            self.content = content.clone();
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        self.updated_at = now_ms;
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("memory", "content", &self.content)?;
        if self.updated_at < self.created_at {
            return Err(ValidationError::TimestampOrder {
                entity: "memory",
                earlier: "created_at",
                later: "updated_at",
            });
        }
        Ok(())
    }

    /// Case-insensitive substring match on `content`.
    ///
    /// `needle_lower` must already be lowercased.
    pub fn content_contains(&self, needle_lower: &str) -> bool {
        self.content.to_lowercase().contains(needle_lower)
    }
}

/// Input for memory creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMemory {
    pub content: String,
    pub category: MemoryCategory,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryPatch {
    pub content: Option<String>,
    pub category: Option<MemoryCategory>,
}

/// Per-category counts for the whole `memories` table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total: u64,
    pub by_category: CategoryCounts,
}

impl MemoryStats {
    pub fn record(&mut self, category: MemoryCategory) {
        self.by_category.increment(category);
        self.total += 1;
    }
}

/// Zero-filled counts for all five categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub personal: u64,
    pub work: u64,
    pub preference: u64,
    pub goal: u64,
    pub insight: u64,
}

impl CategoryCounts {
    pub fn get(&self, category: MemoryCategory) -> u64 {
        self.as_array()[category.index()]
    }

    pub fn sum(&self) -> u64 {
        self.as_array().iter().sum()
    }

    fn increment(&mut self, category: MemoryCategory) {
        let slot = match category {
            MemoryCategory::Personal => &mut self.personal,
            MemoryCategory::Work => &mut self.work,
            MemoryCategory::Preference => &mut self.preference,
            MemoryCategory::Goal => &mut self.goal,
            MemoryCategory::Insight => &mut self.insight,
        };
        *slot += 1;
    }

    fn as_array(&self) -> [u64; 5] {
        [
            self.personal,
            self.work,
            self.preference,
            self.goal,
            self.insight,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_wire_names_roundtrip() {
        for category in MemoryCategory::ALL {
            assert_eq!(MemoryCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(MemoryCategory::parse("Work"), None);
    }

    #[test]
    fn content_match_is_case_insensitive() {
        let memory = Memory::new("Client Onboarding", MemoryCategory::Work, 1);
        assert!(memory.content_contains("client"));
        assert!(memory.content_contains("boarding"));
        assert!(!memory.content_contains("offboarding"));
    }

    #[test]
    fn stats_total_tracks_category_sum() {
        let mut stats = MemoryStats::default();
        stats.record(MemoryCategory::Work);
        stats.record(MemoryCategory::Work);
        stats.record(MemoryCategory::Goal);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_category.sum(), stats.total);
        assert_eq!(stats.by_category.get(MemoryCategory::Work), 2);
        assert_eq!(stats.by_category.get(MemoryCategory::Insight), 0);
    }

    #[test]
    fn patch_with_earlier_clock_keeps_timestamps_ordered() {
        let mut memory = Memory::new("note", MemoryCategory::Work, 500);
        memory.apply_patch(&MemoryPatch::default(), 20);
        assert_eq!(memory.updated_at, 500);
        assert!(memory.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_content() {
        let memory = Memory::new("\n\t", MemoryCategory::Insight, 5);
        assert!(matches!(
            memory.validate(),
            Err(ValidationError::EmptyField { field: "content", .. })
        ));
    }
}
