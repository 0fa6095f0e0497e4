/// Tool for marking a habit completed for today
///
/// This module implements the habit_complete MCP tool.

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::domain::{CompletionOutcome, Habit};
use crate::storage::HabitStorage;
use crate::tools::{parse_habit_id, HabitIdParams, ToolError};

/// Response from completing a habit
#[derive(Debug, Serialize)]
pub struct CompleteHabitResponse {
    pub habit: Habit,
    pub outcome: CompletionOutcome,
    pub message: String,
}

/// Record today's completion for a habit
///
/// `now` decides which calendar day is "today". The load, the completion
/// decision and the save happen in one storage transaction, so two
/// concurrent calls on the same day record the day once.
pub fn complete_habit<S, Tz>(
    storage: &S,
    params: HabitIdParams,
    now: &DateTime<Tz>,
) -> Result<CompleteHabitResponse, ToolError>
where
    S: HabitStorage + ?Sized,
    Tz: TimeZone,
{
    let habit_id = parse_habit_id(&params.habit_id)?;

    let mut outcome = CompletionOutcome::AlreadyCompleted;
    let habit = storage.modify_habit(&habit_id, &mut |habit| {
        outcome = habit.complete_today(now);
    })?;

    let message = match outcome {
        CompletionOutcome::Recorded { new_record: true, .. } => {
            format!(
                "🔥 Completed '{}'! New best: {}. {}",
                habit.name,
                habit.longest_streak,
                habit.motivational_message()
            )
        }
        CompletionOutcome::Recorded { .. } => {
            format!("🔥 Completed '{}'! {}", habit.name, habit.motivational_message())
        }
        CompletionOutcome::AlreadyCompleted => {
            format!("'{}' is already completed for today.", habit.name)
        }
    };

    tracing::debug!("Completion for {}: {:?}", habit.id, outcome);

    Ok(CompleteHabitResponse {
        habit,
        outcome,
        message,
    })
}
