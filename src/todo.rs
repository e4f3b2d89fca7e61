//! Normalization of heterogeneous to-do payloads from tool calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One normalized task entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

/// Extracts a task list from a tool payload.
///
/// Accepts a JSON string (parsed first), a raw array, or an object exposing
/// the array under a `todos` or `items` key. Returns `None` (never panics)
/// when the JSON fails to parse, the resolved value is not an array, the
/// array is empty, or any element lacks `content`. The payload originates
/// from a tool call whose exact shape is not contractually guaranteed.
#[must_use]
pub fn parse_todos(payload: &Value) -> Option<Vec<TodoItem>> {
    let parsed_string;
    let resolved = match payload {
        Value::String(raw) => {
            parsed_string = serde_json::from_str::<Value>(raw).ok()?;
            &parsed_string
        }
        other => other,
    };

    let items = match resolved {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get("todos")
            .or_else(|| map.get("items"))?
            .as_array()?,
        _ => return None,
    };

    if items.is_empty() {
        return None;
    }

    let mut todos = Vec::with_capacity(items.len());
    for item in items {
        let content = item.get("content")?.as_str()?.to_string();
        todos.push(TodoItem {
            content,
            status: item.get("status").and_then(Value::as_str).map(str::to_string),
            priority: item
                .get("priority")
                .and_then(Value::as_str)
                .map(str::to_string),
        });
    }

    Some(todos)
}
