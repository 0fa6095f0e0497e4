/// Tool for deleting habits
///
/// This module implements the habit_delete MCP tool. Deletion is permanent.

use serde::Serialize;

use crate::storage::HabitStorage;
use crate::tools::{parse_habit_id, HabitIdParams, ToolError};

/// Acknowledgment of a deletion
#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub id: String,
    pub message: String,
}

/// Permanently delete a habit
pub fn delete_habit<S: HabitStorage + ?Sized>(
    storage: &S,
    params: HabitIdParams,
) -> Result<DeleteHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    storage.delete_habit(&habit_id)?;

    tracing::info!("Deleted habit {}", habit_id);

    Ok(DeleteHabitResponse {
        id: habit_id.to_string(),
        message: "Habit deleted".to_string(),
    })
}
