/// End-to-end MCP sessions over in-memory pipes
use chrono::{DateTime, FixedOffset, TimeZone};
use habit_streak_mcp::*;
use serde_json::{json, Value};

fn day(d: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 3, d, 9, 0, 0)
        .unwrap()
}

fn tool_call(id: u64, name: &str, arguments: Value) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
    .to_string()
}

/// The JSON payload carried in the second content item of a tool result
fn payload(response: &Value) -> Value {
    let text = response["result"]["content"][1]["text"]
        .as_str()
        .expect("payload text");
    serde_json::from_str(text).expect("payload json")
}

async fn send(server: &mut McpServer, line: String) -> Value {
    let response = server.process_line(&line).await.expect("response");
    serde_json::to_value(&response).expect("serializable")
}

#[tokio::test]
async fn test_complete_reset_scenario_over_mcp() {
    let tracker = HabitTrackerServer::in_memory().expect("server");
    let mut server = McpServer::new(tracker).with_clock(|| day(1));

    let created = send(
        &mut server,
        tool_call(1, "habit_create", json!({
            "name": "X", "description": "Y", "category": "Z",
            "frequency": "daily", "targetDays": 30
        })),
    )
    .await;
    let habit = payload(&created);
    assert_eq!(habit["streak"], 0);
    assert_eq!(habit["longestStreak"], 0);
    let id = habit["id"].as_str().expect("id").to_string();

    let first = payload(&send(&mut server, tool_call(2, "habit_complete", json!({"habitId": id}))).await);
    assert_eq!(first["streak"], 1);
    assert_eq!(first["completedDates"], json!(["2024-03-01"]));

    let again = payload(&send(&mut server, tool_call(3, "habit_complete", json!({"habitId": id}))).await);
    assert_eq!(again, first);

    let mut server = server.with_clock(|| day(2));
    let second = payload(&send(&mut server, tool_call(4, "habit_complete", json!({"habitId": id}))).await);
    assert_eq!(second["streak"], 2);
    assert_eq!(second["longestStreak"], 2);

    let reset = payload(&send(&mut server, tool_call(5, "habit_reset", json!({"habitId": id}))).await);
    assert_eq!(reset["streak"], 0);
    assert_eq!(reset["longestStreak"], 2);
    assert_eq!(reset["completedDates"], json!(["2024-03-01", "2024-03-02"]));

    let mut server = server.with_clock(|| day(3));
    let third = payload(&send(&mut server, tool_call(6, "habit_complete", json!({"habitId": id}))).await);
    assert_eq!(third["streak"], 1);
    assert_eq!(third["longestStreak"], 2);

    let listed = payload(&send(&mut server, tool_call(7, "habit_list", json!({}))).await);
    assert_eq!(listed["summary"]["totalHabits"], 1);
    assert_eq!(listed["habits"][0]["completedToday"], true);
    assert_eq!(listed["habits"][0]["completionRate"], 10);

    let deleted = payload(&send(&mut server, tool_call(8, "habit_delete", json!({"habitId": id}))).await);
    assert_eq!(deleted["message"], "Habit deleted");

    let gone = send(&mut server, tool_call(9, "habit_complete", json!({"habitId": id}))).await;
    assert_eq!(gone["error"]["code"], error_codes::HABIT_NOT_FOUND);
}

#[tokio::test]
async fn test_serve_writes_one_line_per_request() {
    let tracker = HabitTrackerServer::in_memory().expect("server");
    let mut server = McpServer::new(tracker);

    let input = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}).to_string(),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
        String::new(),
        json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}).to_string(),
        tool_call(3, "habit_list", Value::Null),
    ]
    .join("\n");

    let mut output = Vec::new();
    server
        .serve(input.as_bytes(), &mut output)
        .await
        .expect("serve");

    let lines: Vec<Value> = String::from_utf8(output)
        .expect("utf8")
        .lines()
        .map(|l| serde_json::from_str(l).expect("json line"))
        .collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["id"], 1);
    assert_eq!(lines[1]["result"], json!({}));
    assert_eq!(payload(&lines[2])["habits"], json!([]));
}

#[tokio::test]
async fn test_database_persistence_across_servers() {
    let temp_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let db_path = temp_file.path().to_path_buf();

    let first = HabitTrackerServer::new(db_path.clone())
        .await
        .expect("Failed to create first server");
    let habit = first
        .storage()
        .create_habit(NewHabit {
            name: Some("X".to_string()),
            description: Some("Y".to_string()),
            category: Some("Z".to_string()),
            frequency: Some("weekly".to_string()),
            target_days: Some(8),
        })
        .expect("create");
    drop(first);

    let second = HabitTrackerServer::new(db_path)
        .await
        .expect("Failed to create second server");
    let loaded = second.storage().get_habit(&habit.id).expect("reload");
    assert_eq!(loaded.frequency, Frequency::Weekly);
    assert_eq!(loaded.name, "X");
}
