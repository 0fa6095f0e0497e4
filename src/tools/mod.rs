/// MCP tools for habit management
///
/// This module contains the MCP tools that external clients can call to
/// interact with the habit tracker. Each tool resolves its habit through
/// the storage layer and leaves the streak logic to the domain.

pub mod complete;
pub mod create;
pub mod delete;
pub mod list;
pub mod reset;

// Re-export tool functions for easy access
pub use complete::*;
pub use create::*;
pub use delete::*;
pub use list::*;
pub use reset::*;

use schemars::JsonSchema;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{DomainError, HabitId};
use crate::storage::{ErrorKind, StorageError};

/// Errors a tool call can end with
#[derive(Error, Debug)]
pub enum ToolError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The supplied ID is not a UUID, so no stored habit can carry it
    #[error("Habit not found: {0}")]
    UnknownHabitId(String),
}

impl ToolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::Domain(_) => ErrorKind::Validation,
            ToolError::Storage(e) => e.kind(),
            ToolError::UnknownHabitId(_) => ErrorKind::NotFound,
        }
    }
}

/// Parameters for tools that act on a single habit
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HabitIdParams {
    /// ID of the habit
    #[serde(alias = "habit_id", alias = "id")]
    pub habit_id: String,
}

/// Parse a caller-supplied habit ID
///
/// A string that is not a UUID cannot name any stored habit, so it is
/// reported as not found rather than as a validation failure.
pub fn parse_habit_id(raw: &str) -> Result<HabitId, ToolError> {
    HabitId::from_string(raw).map_err(|_| ToolError::UnknownHabitId(raw.to_string()))
}
