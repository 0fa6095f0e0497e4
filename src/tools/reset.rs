/// Tool for resetting a habit's streak
///
/// This module implements the habit_reset MCP tool.

use serde::Serialize;

use crate::domain::Habit;
use crate::storage::HabitStorage;
use crate::tools::{parse_habit_id, HabitIdParams, ToolError};

/// Response from resetting a streak
#[derive(Debug, Serialize)]
pub struct ResetHabitResponse {
    pub habit: Habit,
    pub message: String,
}

/// Zero the current streak of a habit
pub fn reset_habit_streak<S: HabitStorage + ?Sized>(
    storage: &S,
    params: HabitIdParams,
) -> Result<ResetHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let habit = storage.modify_habit(&habit_id, &mut |habit| habit.reset_streak())?;

    tracing::debug!("Reset streak for {}", habit.id);

    Ok(ResetHabitResponse {
        message: format!(
            "🔄 Reset streak for '{}'. Best streak stays at {}.",
            habit.name, habit.longest_streak
        ),
        habit,
    })
}
