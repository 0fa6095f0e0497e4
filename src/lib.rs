/// Public library interface for the Habit Streak MCP server
///
/// This module exports the main server implementation and public types
/// that can be used by other applications or tests.

use std::path::PathBuf;
use thiserror::Error;

pub mod config;
mod domain;
mod mcp;
mod storage;
pub mod tools;

// Re-export public modules and types
pub use domain::*;
pub use mcp::{error_codes, Clock, JsonRpcResponse, McpServer};
pub use storage::{ErrorKind, HabitStorage, SqliteStorage, StorageError};
pub use tools::ToolError;

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main habit tracker server that implements the MCP protocol
///
/// This server owns the habit storage and hands it to the MCP layer,
/// which exposes the create/list/complete/reset/delete tools.
pub struct HabitTrackerServer {
    storage: SqliteStorage,
}

impl HabitTrackerServer {
    /// Create a new habit tracker server with the specified database path
    ///
    /// This will initialize the SQLite database with the required schema
    /// if it doesn't already exist.
    pub async fn new(db_path: PathBuf) -> Result<Self, ServerError> {
        tracing::info!("Initializing Habit Streak server with database: {:?}", db_path);

        let storage = SqliteStorage::new(db_path)?;
        Ok(Self { storage })
    }

    /// Create a server backed by a throwaway in-memory database
    pub fn in_memory() -> Result<Self, ServerError> {
        Ok(Self {
            storage: SqliteStorage::open_in_memory()?,
        })
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until stdin is closed or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server...");

        // Database health check
        let habits = self.storage.list_habits()?;
        tracing::info!("Server started successfully, found {} existing habits", habits.len());

        let mut mcp_server = McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }
}
