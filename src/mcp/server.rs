/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads newline-delimited JSON-RPC requests
/// 2. Routes tool calls to the habit tools
/// 3. Writes one JSON-RPC response per request

use chrono::{DateTime, FixedOffset, Local};
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use crate::domain::NewHabit;
use crate::mcp::protocol::*;
use crate::tools::{self, HabitIdParams, ListHabitsParams};
use crate::{HabitTrackerServer, ServerError};

/// Source of "now" for completion requests
pub type Clock = Box<dyn Fn() -> DateTime<FixedOffset> + Send + Sync>;

/// MCP server that handles communication with the client
pub struct McpServer {
    habit_tracker: HabitTrackerServer,
    clock: Clock,
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server reading the local wall clock
    pub fn new(habit_tracker: HabitTrackerServer) -> Self {
        Self {
            habit_tracker,
            clock: Box::new(|| Local::now().fixed_offset()),
            initialized: false,
        }
    }

    /// Replace the clock used to decide which calendar day is "today"
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<FixedOffset> + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve requests from `reader` until it is exhausted
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (input closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.process_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        writer.write_all(response_str.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                        writer.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read request: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and notifications.
    pub async fn process_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        let Some(id) = request.id.clone() else {
            self.handle_notification(&request);
            return None;
        };

        Some(self.handle_request(id, request).await)
    }

    fn handle_notification(&mut self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "initialized" | "notifications/initialized" => {
                self.initialized = true;
                info!("MCP client finished initialization");
            }
            other => debug!("Ignoring notification '{}'", other),
        }
    }

    async fn handle_request(&mut self, id: Value, request: JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" => {
                self.initialized = true;
                JsonRpcResponse::success(id, Value::Null)
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": tool_definitions() })),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        }
    }

    fn handle_initialize(&self, id: Value) -> JsonRpcResponse {
        info!("MCP client connected");

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: "Habit Streak MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        to_response(id, &result)
    }

    async fn handle_tools_call(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let Some(params) = params else {
            return JsonRpcResponse::error(
                id,
                error_codes::INVALID_PARAMS,
                "Missing parameters".to_string(),
                None,
            );
        };

        let call: ToolCallParams = match serde_json::from_value(params) {
            Ok(call) => call,
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid parameters: {}", e),
                    None,
                );
            }
        };

        debug!("Calling tool '{}'", call.name);
        let storage = self.habit_tracker.storage();
        let now = (self.clock)();

        match call.name.as_str() {
            "habit_list" => self.dispatch(id, call.arguments, |p: ListHabitsParams| {
                tools::list_habits(storage, p, &now).map(|r| {
                    let message = format!(
                        "📋 {} habits, {} completed today",
                        r.summary.total_habits, r.summary.completed_today
                    );
                    (message, r)
                })
            }),
            "habit_create" => self.dispatch(id, call.arguments, |p: NewHabit| {
                tools::create_habit(storage, p).map(|r| (r.message.clone(), r.habit))
            }),
            "habit_complete" => self.dispatch(id, call.arguments, |p: HabitIdParams| {
                tools::complete_habit(storage, p, &now).map(|r| (r.message.clone(), r.habit))
            }),
            "habit_reset" => self.dispatch(id, call.arguments, |p: HabitIdParams| {
                tools::reset_habit_streak(storage, p).map(|r| (r.message.clone(), r.habit))
            }),
            "habit_delete" => self.dispatch(id, call.arguments, |p: HabitIdParams| {
                tools::delete_habit(storage, p).map(|r| (r.message.clone(), r))
            }),
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Unknown tool: {}", call.name),
                None,
            ),
        }
    }

    /// Decode tool arguments, run the tool and wrap its output
    fn dispatch<P, T, F>(&self, id: Value, arguments: Value, tool: F) -> JsonRpcResponse
    where
        P: DeserializeOwned,
        T: Serialize,
        F: FnOnce(P) -> Result<(String, T), tools::ToolError>,
    {
        let arguments = if arguments.is_null() { json!({}) } else { arguments };
        let params: P = match serde_json::from_value(arguments) {
            Ok(params) => params,
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid arguments: {}", e),
                    None,
                );
            }
        };

        match tool(params) {
            Ok((message, payload)) => match serde_json::to_value(&payload) {
                Ok(payload) => to_response(id, &ToolCallResult::success(message, &payload)),
                Err(e) => internal_error(id, e),
            },
            Err(e) => {
                debug!("Tool failed: {}", e);
                JsonRpcResponse::tool_error(id, &e)
            }
        }
    }
}

fn to_response<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => internal_error(id, e),
    }
}

fn internal_error(id: Value, e: serde_json::Error) -> JsonRpcResponse {
    error!("Failed to serialize response: {}", e);
    JsonRpcResponse::error(
        id,
        error_codes::INTERNAL_ERROR,
        format!("Failed to serialize response: {}", e),
        None,
    )
}

fn input_schema<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or_else(|_| json!({ "type": "object" }))
}

/// The tools this server exposes
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "habit_list".to_string(),
            description: "List all habits, newest first, with streaks and today's completion state".to_string(),
            input_schema: input_schema::<ListHabitsParams>(),
        },
        ToolDefinition {
            name: "habit_create".to_string(),
            description: "Create a new habit to track".to_string(),
            input_schema: input_schema::<NewHabit>(),
        },
        ToolDefinition {
            name: "habit_complete".to_string(),
            description: "Mark a habit as completed for today (no effect if already completed today)".to_string(),
            input_schema: input_schema::<HabitIdParams>(),
        },
        ToolDefinition {
            name: "habit_reset".to_string(),
            description: "Reset a habit's current streak to zero; the best streak is kept".to_string(),
            input_schema: input_schema::<HabitIdParams>(),
        },
        ToolDefinition {
            name: "habit_delete".to_string(),
            description: "Permanently delete a habit and its completion history".to_string(),
            input_schema: input_schema::<HabitIdParams>(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn server() -> McpServer {
        let habit_tracker = HabitTrackerServer::in_memory().unwrap();
        McpServer::new(habit_tracker).with_clock(|| {
            FixedOffset::east_opt(3600)
                .unwrap()
                .with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
                .unwrap()
        })
    }

    async fn call(server: &mut McpServer, request: Value) -> Value {
        let response = server.process_line(&request.to_string()).await.unwrap();
        serde_json::to_value(&response).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_and_notification() {
        let mut server = server();

        let response = call(&mut server, json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}})).await;
        assert_eq!(response["result"]["protocolVersion"], MCP_VERSION);

        let none = server
            .process_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(none.is_none());
        assert!(server.initialized);
    }

    #[tokio::test]
    async fn test_tools_list_has_schemas() {
        let mut server = server();
        let response = call(&mut server, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;

        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 5);
        let create = tools.iter().find(|t| t["name"] == "habit_create").unwrap();
        assert!(create["inputSchema"]["properties"]["targetDays"].is_object());
    }

    #[tokio::test]
    async fn test_errors_map_to_codes() {
        let mut server = server();

        let invalid = call(
            &mut server,
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {
                "name": "habit_create",
                "arguments": {"name": "X", "description": "Y", "category": "Z", "frequency": "yearly", "targetDays": 30}
            }}),
        )
        .await;
        assert_eq!(invalid["error"]["code"], error_codes::VALIDATION_ERROR);

        let missing = call(
            &mut server,
            json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {
                "name": "habit_reset",
                "arguments": {"habitId": "nonexistent_id"}
            }}),
        )
        .await;
        assert_eq!(missing["error"]["code"], error_codes::HABIT_NOT_FOUND);

        let unknown = call(&mut server, json!({"jsonrpc": "2.0", "id": 5, "method": "bogus"})).await;
        assert_eq!(unknown["error"]["code"], error_codes::METHOD_NOT_FOUND);

        let garbled = server.process_line("{not json").await.unwrap();
        assert_eq!(garbled.error.unwrap().code, error_codes::PARSE_ERROR);
    }
}
