/// Tool for listing all habits
///
/// This module implements the habit_list MCP tool.

use chrono::{DateTime, TimeZone};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::Habit;
use crate::storage::HabitStorage;
use crate::tools::ToolError;

/// Parameters for listing habits (the list is always complete)
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListHabitsParams {}

/// A habit plus the display values derived from it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitSummary {
    #[serde(flatten)]
    pub habit: Habit,
    pub completed_today: bool,
    /// Percentage of `targetDays` completed so far
    pub completion_rate: u32,
    pub motivational_message: String,
}

/// Summary statistics for all habits
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitListSummary {
    pub total_habits: usize,
    pub completed_today: usize,
}

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitSummary>,
    pub summary: HabitListSummary,
}

/// List every habit, newest first
pub fn list_habits<S, Tz>(
    storage: &S,
    _params: ListHabitsParams,
    now: &DateTime<Tz>,
) -> Result<ListHabitsResponse, ToolError>
where
    S: HabitStorage + ?Sized,
    Tz: TimeZone,
{
    let habits: Vec<HabitSummary> = storage
        .list_habits()?
        .into_iter()
        .map(|habit| HabitSummary {
            completed_today: habit.is_completed_today(now),
            completion_rate: habit.completion_rate(),
            motivational_message: habit.motivational_message(),
            habit,
        })
        .collect();

    let summary = HabitListSummary {
        total_habits: habits.len(),
        completed_today: habits.iter().filter(|h| h.completed_today).count(),
    };

    Ok(ListHabitsResponse { habits, summary })
}
