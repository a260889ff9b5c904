//! Domain model for the task board and the memory log.
//!
//! # Responsibility
//! - Define the two persisted entities (`Task`, `Memory`) and their enums.
//! - Own field-level validation shared by every write path.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID v4 that is never reused.
//! - All timestamps are Unix epoch milliseconds.
//! - Deletion is a hard delete; there is no tombstone state.

pub mod clock;
pub mod memory;
pub mod task;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field-level validation failure raised before any write reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty or whitespace-only.
    EmptyField {
        entity: &'static str,
        field: &'static str,
    },
    /// `later` is earlier than `earlier` for the same record.
    TimestampOrder {
        entity: &'static str,
        earlier: &'static str,
        later: &'static str,
    },
    /// A task is `done` without a completion timestamp.
    MissingCompletion,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { entity, field } => {
                write!(f, "{entity}.{field} must not be empty")
            }
            Self::TimestampOrder {
                entity,
                earlier,
                later,
            } => write!(f, "{entity}.{later} must not be earlier than {entity}.{earlier}"),
            Self::MissingCompletion => write!(f, "task.completed_at is required when status is done"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { entity, field });
    }
    Ok(())
}
