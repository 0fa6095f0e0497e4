/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habit data. It handles all SQL queries and data conversion.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row, TransactionBehavior};

use crate::domain::{Frequency, Habit, HabitId};
use crate::storage::{migrations, HabitStorage, StorageError};

const HABIT_COLUMNS: &str =
    "id, name, description, category, frequency, target_days, streak, longest_streak, created_at, is_active";

/// SQLite-based storage implementation
///
/// The connection sits behind a mutex so the storage can be shared across
/// threads, and every multi-statement write runs in an immediate
/// transaction so it also serializes against other processes using the
/// same database file.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::from_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// Open a private in-memory database (mainly for tests)
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        // Completion rows cascade with their habit
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| StorageError::Connection(format!("Failed to set busy timeout: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Connection("Database lock poisoned".to_string()))
    }

    /// Map a habits row to a Habit with an empty completion history
    fn row_to_habit(row: &Row<'_>) -> rusqlite::Result<Habit> {
        let id_str: String = row.get(0)?;
        let id = HabitId::from_string(&id_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

        let frequency_str: String = row.get(4)?;
        let frequency = frequency_str
            .parse::<Frequency>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

        let created_at_str: String = row.get(8)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?
            .with_timezone(&Utc);

        Ok(Habit::from_existing(
            id,
            row.get(1)?, // name
            row.get(2)?, // description
            row.get(3)?, // category
            frequency,
            row.get(5)?, // target_days
            Vec::new(),
            row.get(6)?, // streak
            row.get(7)?, // longest_streak
            created_at,
            row.get(9)?, // is_active
        ))
    }

    fn load_completed_dates(
        conn: &Connection,
        habit_id: &HabitId,
    ) -> Result<Vec<NaiveDate>, StorageError> {
        let mut stmt = conn.prepare(
            "SELECT completed_on FROM habit_completions WHERE habit_id = ?1 ORDER BY rowid",
        )?;
        let dates = stmt
            .query_map(params![habit_id.to_string()], |row| row.get::<_, NaiveDate>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(dates)
    }

    fn fetch_habit(conn: &Connection, habit_id: &HabitId) -> Result<Habit, StorageError> {
        let sql = format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS);
        let result = conn.query_row(&sql, params![habit_id.to_string()], Self::row_to_habit);

        let mut habit = match result {
            Ok(habit) => habit,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(StorageError::not_found(habit_id));
            }
            Err(e) => return Err(StorageError::Query(e)),
        };

        habit.completed_dates = Self::load_completed_dates(conn, habit_id)?;
        Ok(habit)
    }

    /// Overwrite the stored row and completion days with `habit`
    ///
    /// Callers run this inside a transaction.
    fn write_habit(conn: &Connection, habit: &Habit) -> Result<(), StorageError> {
        let rows_affected = conn.execute(
            "UPDATE habits SET
                name = ?2,
                description = ?3,
                category = ?4,
                frequency = ?5,
                target_days = ?6,
                streak = ?7,
                longest_streak = ?8,
                is_active = ?9
             WHERE id = ?1",
            params![
                habit.id.to_string(),
                habit.name,
                habit.description,
                habit.category,
                habit.frequency.as_str(),
                habit.target_days,
                habit.streak,
                habit.longest_streak,
                habit.is_active
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::not_found(&habit.id));
        }

        Self::replace_completed_dates(conn, habit)
    }

    fn replace_completed_dates(conn: &Connection, habit: &Habit) -> Result<(), StorageError> {
        let id = habit.id.to_string();
        conn.execute("DELETE FROM habit_completions WHERE habit_id = ?1", params![id])?;

        let mut stmt =
            conn.prepare("INSERT INTO habit_completions (habit_id, completed_on) VALUES (?1, ?2)")?;
        for day in &habit.completed_dates {
            stmt.execute(params![id, day])?;
        }
        Ok(())
    }
}

impl HabitStorage for SqliteStorage {
    /// Insert a new habit and any completion days it already carries
    fn insert_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO habits (
                id, name, description, category, frequency, target_days,
                streak, longest_streak, created_at, is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                habit.id.to_string(),
                habit.name,
                habit.description,
                habit.category,
                habit.frequency.as_str(),
                habit.target_days,
                habit.streak,
                habit.longest_streak,
                habit.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
                habit.is_active
            ],
        )?;
        Self::replace_completed_dates(&tx, habit)?;
        tx.commit()?;

        tracing::debug!("Created habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError> {
        let conn = self.lock()?;
        Self::fetch_habit(&conn, habit_id)
    }

    fn save_habit(&self, habit: &Habit) -> Result<Habit, StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        Self::write_habit(&tx, habit)?;
        let stored = Self::fetch_habit(&tx, &habit.id)?;
        tx.commit()?;

        tracing::debug!("Saved habit: {} ({})", stored.name, stored.id);
        Ok(stored)
    }

    /// Hard delete; the completion rows go with it
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let id = habit_id.to_string();
        tx.execute("DELETE FROM habit_completions WHERE habit_id = ?1", params![id])?;
        let rows_affected = tx.execute("DELETE FROM habits WHERE id = ?1", params![id])?;
        if rows_affected == 0 {
            return Err(StorageError::not_found(habit_id));
        }
        tx.commit()?;

        tracing::debug!("Deleted habit: {}", habit_id);
        Ok(())
    }

    fn list_habits(&self) -> Result<Vec<Habit>, StorageError> {
        let conn = self.lock()?;

        let mut completions: HashMap<String, Vec<NaiveDate>> = HashMap::new();
        {
            let mut stmt =
                conn.prepare("SELECT habit_id, completed_on FROM habit_completions ORDER BY rowid")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, NaiveDate>(1)?))
            })?;
            for row in rows {
                let (habit_id, day) = row?;
                completions.entry(habit_id).or_default().push(day);
            }
        }

        let sql = format!(
            "SELECT {} FROM habits ORDER BY created_at DESC, rowid DESC",
            HABIT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let habit_iter = stmt.query_map([], Self::row_to_habit)?;

        let mut habits = Vec::new();
        for habit in habit_iter {
            let mut habit = habit?;
            if let Some(days) = completions.remove(&habit.id.to_string()) {
                habit.completed_dates = days;
            }
            habits.push(habit);
        }

        Ok(habits)
    }

    fn modify_habit(
        &self,
        habit_id: &HabitId,
        update: &mut dyn FnMut(&mut Habit),
    ) -> Result<Habit, StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut habit = Self::fetch_habit(&tx, habit_id)?;
        let before = habit.clone();
        update(&mut habit);
        habit.id = before.id;

        if habit != before {
            Self::write_habit(&tx, &habit)?;
            tracing::debug!("Modified habit: {} ({})", habit.name, habit.id);
        }
        tx.commit()?;

        Ok(habit)
    }
}
