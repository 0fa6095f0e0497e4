/// Tool for creating new habits
///
/// This module implements the habit_create MCP tool.

use chrono::Utc;
use serde::Serialize;

use crate::domain::{Habit, NewHabit};
use crate::storage::HabitStorage;
use crate::tools::ToolError;

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub habit: Habit,
    pub message: String,
}

/// Create a new habit using the provided storage
///
/// The fields are validated before anything touches the store.
pub fn create_habit<S: HabitStorage + ?Sized>(
    storage: &S,
    params: NewHabit,
) -> Result<CreateHabitResponse, ToolError> {
    let habit = Habit::new(params, Utc::now())?;
    storage.insert_habit(&habit)?;

    tracing::info!("Created habit '{}' ({})", habit.name, habit.id);

    Ok(CreateHabitResponse {
        message: format!("✅ Created habit '{}'! Ready to start your streak!", habit.name),
        habit,
    })
}
