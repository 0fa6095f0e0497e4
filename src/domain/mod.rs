/// Domain module containing core business logic and data types
///
/// This module defines the Habit entity, its validation rules, and the
/// completion/streak transitions applied to it.

pub mod habit;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use streak::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid frequency '{0}'. Valid options: daily, weekly, monthly")]
    InvalidFrequency(String),
}
