//! Data access use-cases for the task board and the memory log.
//!
//! # Responsibility
//! - Apply the business rules (bounded listings, status stamping, search,
//!   stats) on top of repository implementations.
//! - Read "now" exactly once per write from an injected `Clock`.

pub mod memory_service;
pub mod task_service;

/// Maps blank optional text to `None`; anything else is kept as entered.
pub(crate) fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
