/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents a user's habit
/// they want to track, along with the creation fields and their validation.

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Frequency, HabitId};

/// A habit represents something the user wants to do regularly
///
/// This is the only entity in our system. Besides its descriptive fields it
/// carries the completion history and the two streak counters, which are
/// only changed through [`Habit::complete_today`] and [`Habit::reset_streak`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name (e.g., "Morning Run", "Read for 30min")
    pub name: String,
    pub description: String,
    /// Free-form category label (e.g., "health")
    pub category: String,
    pub frequency: Frequency,
    /// Goal used for the completion-rate display only
    pub target_days: u32,
    /// Calendar days with a recorded completion, in the order they were recorded
    pub completed_dates: Vec<NaiveDate>,
    /// Completions since the last reset
    pub streak: u32,
    /// Highest value `streak` has ever reached
    pub longest_streak: u32,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
    /// Carried for compatibility; no operation reads it
    pub is_active: bool,
}

/// Fields supplied when creating a habit
///
/// Every field is optional at the wire level so a missing one can be
/// reported as a validation error instead of a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewHabit {
    /// Name of the habit
    pub name: Option<String>,
    /// What the habit is about
    pub description: Option<String>,
    /// Category label (health, productivity, etc.)
    pub category: Option<String>,
    /// How often: daily, weekly or monthly
    pub frequency: Option<String>,
    /// Positive goal used for the completion rate
    #[serde(alias = "target_days")]
    pub target_days: Option<i64>,
}

impl Habit {
    /// Create a new habit with validation
    ///
    /// The habit starts with no completions and both counters at zero.
    /// `created_at` is kept to microsecond precision, the precision the
    /// store persists.
    pub fn new(fields: NewHabit, created_at: DateTime<Utc>) -> Result<Self, DomainError> {
        let name = Self::required_text(fields.name, "name")?;
        let description = Self::required_text(fields.description, "description")?;
        let category = Self::required_text(fields.category, "category")?;
        let frequency = fields
            .frequency
            .ok_or(DomainError::MissingField("frequency"))?
            .parse::<Frequency>()?;
        let target_days = Self::validate_target_days(fields.target_days)?;

        Ok(Self {
            id: HabitId::new(),
            name,
            description,
            category,
            frequency,
            target_days,
            completed_dates: Vec::new(),
            streak: 0,
            longest_streak: 0,
            created_at: created_at.trunc_subsecs(6),
            is_active: true,
        })
    }

    /// Create a habit from existing data (used when loading from database)
    ///
    /// This constructor assumes data is already validated.
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: HabitId,
        name: String,
        description: String,
        category: String,
        frequency: Frequency,
        target_days: u32,
        completed_dates: Vec<NaiveDate>,
        streak: u32,
        longest_streak: u32,
        created_at: DateTime<Utc>,
        is_active: bool,
    ) -> Self {
        Self {
            id,
            name,
            description,
            category,
            frequency,
            target_days,
            completed_dates,
            streak,
            longest_streak,
            created_at,
            is_active,
        }
    }

    /// Recorded completions as a whole percentage of `target_days`
    ///
    /// Display-only; it is not capped, so a habit completed more often than
    /// its target reports more than 100.
    pub fn completion_rate(&self) -> u32 {
        if self.target_days == 0 {
            return 0;
        }
        let rate = self.completed_dates.len() as f64 / f64::from(self.target_days) * 100.0;
        rate.round() as u32
    }

    // Validation helper methods

    fn required_text(value: Option<String>, field: &'static str) -> Result<String, DomainError> {
        match value {
            None => Err(DomainError::MissingField(field)),
            Some(text) if text.is_empty() => Err(DomainError::Validation {
                message: format!("{} cannot be empty", field),
            }),
            Some(text) => Ok(text),
        }
    }

    fn validate_target_days(value: Option<i64>) -> Result<u32, DomainError> {
        let days = value.ok_or(DomainError::MissingField("targetDays"))?;
        if days <= 0 {
            return Err(DomainError::Validation {
                message: format!("targetDays must be a positive integer, got {}", days),
            });
        }
        u32::try_from(days).map_err(|_| DomainError::Validation {
            message: format!("targetDays is too large: {}", days),
        })
    }
}
