//! Request handler helpers
//!
//! Shared by the stdio server and the HTTP transport when dispatching
//! tools/call requests.

use serde_json::Value;

/// Extract tool arguments from params
pub fn extract_arguments(params: &Value) -> Value {
    params
        .get("arguments")
        .cloned()
        .unwrap_or(Value::Object(serde_json::Map::new()))
}

/// Extract tool name from params
pub fn extract_tool_name(params: &Value) -> Option<&str> {
    params.get("name").and_then(|v| v.as_str())
}
