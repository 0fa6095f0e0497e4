/// Runtime configuration for the server binary
///
/// Resolves where the database lives and which log filter to install,
/// from the command line flags and the environment.

use std::io;
use std::path::{Path, PathBuf};

/// File name of the database inside the data directory
pub const DATABASE_FILE: &str = "habits.db";

/// Log verbosity selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Debug,
    Verbose,
}

impl Verbosity {
    pub fn from_flags(debug: bool, verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Quiet
        }
    }

    /// Default `tracing` filter directive for this crate
    pub fn filter_directive(&self) -> String {
        let level = match self {
            Verbosity::Verbose => "debug",
            Verbosity::Debug => "info",
            Verbosity::Quiet => "warn",
        };
        format!("habit_streak_mcp={}", level)
    }
}

/// Candidate data directories, most preferred first
fn candidate_dirs() -> Vec<PathBuf> {
    [
        dirs::home_dir().map(|p| p.join(".habit_tracker")),
        dirs::data_dir().map(|p| p.join("habit_tracker")),
        dirs::config_dir().map(|p| p.join("habit_tracker")),
        std::env::current_dir().ok().map(|p| p.join(".habit_tracker")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Check that `dir` exists (creating it if needed) and accepts writes
fn is_writable_dir(dir: &Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }
    let probe = dir.join(".test_write");
    let writable = std::fs::write(&probe, "test").is_ok();
    let _ = std::fs::remove_file(&probe);
    writable
}

/// Pick the database path from the first writable candidate directory
///
/// Falls back to the system temp directory when none is writable.
pub fn default_database_path() -> io::Result<PathBuf> {
    database_path_in(&candidate_dirs())
}

fn database_path_in(candidates: &[PathBuf]) -> io::Result<PathBuf> {
    if let Some(dir) = candidates.iter().find(|dir| is_writable_dir(dir)) {
        return Ok(dir.join(DATABASE_FILE));
    }

    let temp_dir = std::env::temp_dir().join("habit_tracker");
    std::fs::create_dir_all(&temp_dir)?;
    tracing::warn!("Using temporary directory for database: {}", temp_dir.display());
    Ok(temp_dir.join(DATABASE_FILE))
}

/// Resolve the database path, preparing the parent of an explicit one
pub fn resolve_database_path(explicit: Option<PathBuf>) -> io::Result<PathBuf> {
    match explicit {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Ok(path)
        }
        None => default_database_path(),
    }
}
