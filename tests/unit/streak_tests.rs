/// Completion and reset behavior through the public API
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use habit_streak_mcp::*;

fn new_habit() -> Habit {
    Habit::new(
        NewHabit {
            name: Some("X".to_string()),
            description: Some("Y".to_string()),
            category: Some("Z".to_string()),
            frequency: Some("daily".to_string()),
            target_days: Some(30),
        },
        Utc::now(),
    )
    .expect("valid habit")
}

fn morning(day: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(-3 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 5, day, 6, 15, 0)
        .unwrap()
}

#[test]
fn test_second_completion_same_day_changes_nothing() {
    let mut habit = new_habit();
    habit.complete_today(&morning(1));
    let after_first = habit.clone();

    for hours in [1, 5, 17] {
        let outcome = habit.complete_today(&(morning(1) + Duration::hours(hours)));
        assert_eq!(outcome, CompletionOutcome::AlreadyCompleted);
        assert_eq!(habit, after_first);
    }
}

#[test]
fn test_reset_then_complete_keeps_watermark() {
    let mut habit = new_habit();
    for day in 1..=3 {
        habit.complete_today(&morning(day));
    }
    habit.reset_streak();
    habit.complete_today(&morning(4));
    habit.complete_today(&morning(5));

    assert_eq!(habit.streak, 2);
    assert_eq!(habit.longest_streak, 3);
    assert_eq!(habit.completed_dates.len(), 5);

    for day in 6..=7 {
        habit.complete_today(&morning(day));
    }
    assert_eq!(habit.streak, 4);
    assert_eq!(habit.longest_streak, 4);
}

#[test]
fn test_calendar_day_uses_the_given_offset() {
    let late_evening = FixedOffset::east_opt(-3 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 5, 1, 22, 0, 0)
        .unwrap();

    assert_eq!(calendar_day(&late_evening), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    assert_eq!(
        calendar_day(&late_evening.with_timezone(&Utc)),
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    );
}

#[test]
fn test_creation_rejects_unknown_frequency() {
    let result = Habit::new(
        NewHabit {
            frequency: Some("yearly".to_string()),
            ..NewHabit::default()
        },
        Utc::now(),
    );
    assert!(result.is_err());

    let result = Habit::new(
        NewHabit {
            name: Some("X".to_string()),
            description: Some("Y".to_string()),
            category: Some("Z".to_string()),
            frequency: Some("yearly".to_string()),
            target_days: Some(30),
        },
        Utc::now(),
    );
    assert_eq!(result, Err(DomainError::InvalidFrequency("yearly".to_string())));
}
