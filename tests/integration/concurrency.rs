/// Concurrent completions against one shared store
use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{Duration, FixedOffset, TimeZone};
use habit_streak_mcp::tools::{complete_habit, HabitIdParams};
use habit_streak_mcp::*;
use tempfile::tempdir;

fn fields() -> NewHabit {
    NewHabit {
        name: Some("Meditate".to_string()),
        description: Some("Ten minutes".to_string()),
        category: Some("mindfulness".to_string()),
        frequency: Some("daily".to_string()),
        target_days: Some(30),
    }
}

#[test]
fn test_parallel_completions_record_the_day_once() {
    let storage = Arc::new(SqliteStorage::open_in_memory().expect("storage"));
    let habit = storage.create_habit(fields()).expect("create");
    let now = FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 6, 1, 8, 0, 0)
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let storage = Arc::clone(&storage);
            let params = HabitIdParams {
                habit_id: habit.id.to_string(),
            };
            let at = now + Duration::minutes(i);
            thread::spawn(move || complete_habit(storage.as_ref(), params, &at).expect("complete"))
        })
        .collect();

    let recorded = handles
        .into_iter()
        .map(|h| h.join().expect("thread"))
        .filter(|r| r.outcome.is_recorded())
        .count();

    assert_eq!(recorded, 1);
    let stored = storage.get_habit(&habit.id).expect("get");
    assert_eq!(stored.streak, 1);
    assert_eq!(stored.longest_streak, 1);
    assert_eq!(stored.completed_dates.len(), 1);
}

#[test]
fn test_two_connections_to_one_file_record_the_day_once() {
    let temp_dir = tempdir().expect("temp dir");
    let db_path = temp_dir.path().join("habits.db");

    let first = SqliteStorage::new(db_path.clone()).expect("first");
    let second = SqliteStorage::new(db_path.clone()).expect("second");
    let habit = first.create_habit(fields()).expect("create");
    let now = FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 6, 1, 8, 0, 0)
        .unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = [first, second]
        .into_iter()
        .map(|storage| {
            let barrier = Arc::clone(&barrier);
            let params = HabitIdParams {
                habit_id: habit.id.to_string(),
            };
            thread::spawn(move || {
                barrier.wait();
                complete_habit(&storage, params, &now).expect("complete")
            })
        })
        .collect();

    let recorded = handles
        .into_iter()
        .map(|h| h.join().expect("thread"))
        .filter(|r| r.outcome.is_recorded())
        .count();
    assert_eq!(recorded, 1);

    let reopened = SqliteStorage::new(db_path).expect("reopen");
    let stored = reopened.get_habit(&habit.id).expect("get");
    assert_eq!(stored.streak, 1);
    assert_eq!(stored.longest_streak, 1);
    assert_eq!(stored.completed_dates.len(), 1);
}
