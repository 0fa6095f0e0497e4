/// Storage layer for persisting habit data
///
/// This module handles all database operations using SQLite. It provides
/// a clean interface for storing, retrieving and atomically updating habits.

pub mod migrations;
pub mod sqlite;

// Re-export the main storage types
pub use sqlite::*;

use chrono::Utc;
use thiserror::Error;

use crate::domain::{DomainError, Habit, HabitId, NewHabit};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Coarse classification of a storage failure for the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request must be corrected before retrying
    Validation,
    /// The referenced habit does not exist
    NotFound,
    /// Anything else the store ran into
    Internal,
}

impl StorageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::Validation(_) => ErrorKind::Validation,
            StorageError::HabitNotFound { .. } => ErrorKind::NotFound,
            _ => ErrorKind::Internal,
        }
    }

    pub(crate) fn not_found(habit_id: &HabitId) -> Self {
        StorageError::HabitNotFound {
            habit_id: habit_id.to_string(),
        }
    }
}

/// Trait defining the storage interface for habits
///
/// This trait allows us to potentially swap out SQLite for other databases
/// in the future while keeping the same interface.
pub trait HabitStorage {
    /// Validate the creation fields and persist a new habit with zeroed counters
    fn create_habit(&self, fields: NewHabit) -> Result<Habit, StorageError> {
        let habit = Habit::new(fields, Utc::now())?;
        self.insert_habit(&habit)?;
        Ok(habit)
    }

    /// Insert an already-built habit
    fn insert_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Get a habit by ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError>;

    /// Overwrite the mutable fields of an existing habit
    fn save_habit(&self, habit: &Habit) -> Result<Habit, StorageError>;

    /// Permanently delete a habit and its completion history
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError>;

    /// List all habits, most recently created first
    fn list_habits(&self) -> Result<Vec<Habit>, StorageError>;

    /// Load, mutate and save one habit as a single atomic step
    ///
    /// No other writer can interleave between the load and the save, so a
    /// decision `update` makes from the loaded state still holds when it
    /// is written back.
    fn modify_habit(
        &self,
        habit_id: &HabitId,
        update: &mut dyn FnMut(&mut Habit),
    ) -> Result<Habit, StorageError>;
}
