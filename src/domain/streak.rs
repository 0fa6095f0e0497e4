/// Completion and streak transitions for a habit
///
/// A habit has two counters driven by one trigger each: completing a new
/// calendar day bumps `streak` (and lifts `longest_streak` along with it),
/// and a reset zeroes `streak`. The streak counts distinct completed days
/// since the last reset; gaps between those days do not break it.
///
/// These transitions are pure. They never read the clock: the caller
/// supplies "now", and the calendar day is taken in that value's own
/// time zone.

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::Serialize;

use crate::domain::Habit;

/// Truncate a timestamp to its calendar day in its own time zone
///
/// For a `DateTime<Local>` this is the local-midnight truncation.
pub fn calendar_day<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    now.date_naive()
}

/// What a completion request did to the habit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CompletionOutcome {
    /// The day was appended and the streak incremented
    Recorded {
        streak: u32,
        /// Whether this completion raised `longest_streak`
        new_record: bool,
    },
    /// The day already had a completion; nothing changed
    AlreadyCompleted,
}

impl CompletionOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, CompletionOutcome::Recorded { .. })
    }
}

impl Habit {
    /// Check whether a completion is already recorded for `day`
    pub fn is_completed_on(&self, day: NaiveDate) -> bool {
        self.completed_dates.contains(&day)
    }

    /// Check whether the calendar day of `now` already has a completion
    pub fn is_completed_today<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        self.is_completed_on(calendar_day(now))
    }

    /// Mark the calendar day of `now` as completed
    ///
    /// Idempotent per day: a second call on the same calendar day leaves the
    /// habit untouched and reports [`CompletionOutcome::AlreadyCompleted`].
    pub fn complete_today<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> CompletionOutcome {
        self.complete_on(calendar_day(now))
    }

    /// Mark `day` as completed
    pub fn complete_on(&mut self, day: NaiveDate) -> CompletionOutcome {
        if self.is_completed_on(day) {
            return CompletionOutcome::AlreadyCompleted;
        }

        self.completed_dates.push(day);
        self.streak = self.streak.saturating_add(1);

        let new_record = self.streak > self.longest_streak;
        if new_record {
            self.longest_streak = self.streak;
        }

        CompletionOutcome::Recorded {
            streak: self.streak,
            new_record,
        }
    }

    /// Zero the current streak
    ///
    /// `longest_streak` and `completed_dates` are left as they are.
    pub fn reset_streak(&mut self) {
        self.streak = 0;
    }

    /// Get a motivational message based on the current streak
    pub fn motivational_message(&self) -> String {
        match self.streak {
            0 => "Ready to start your streak! Every journey begins with a single step.".to_string(),
            1 => "Great start! One day down, keep the momentum going.".to_string(),
            2..=6 => format!("Nice work! {} days completed. You're building a strong habit.", self.streak),
            7..=13 => format!("Excellent! {} days strong. You're in the groove now!", self.streak),
            14..=29 => format!("Amazing! {} days completed. This is becoming second nature.", self.streak),
            30..=99 => format!("Incredible! {} days of consistency. You're a habit master!", self.streak),
            _ => format!("Legendary! {} days of unwavering commitment. You're an inspiration!", self.streak),
        }
    }
}
