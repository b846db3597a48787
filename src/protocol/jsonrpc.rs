//! JSON-RPC 2.0 protocol types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 Request
#[derive(Deserialize, Debug, Clone)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Check if this is a valid JSON-RPC 2.0 request
    pub fn is_valid(&self) -> bool {
        self.jsonrpc == "2.0"
    }

    /// Check if this is a notification (no id)
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 Success Response
#[derive(Serialize, Debug)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    pub result: Value,
}

impl JsonRpcResponse {
    /// Create a new success response
    pub fn new(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result,
        }
    }
}

/// JSON-RPC 2.0 Notification (server to client, no id)
#[derive(Serialize, Debug, Clone)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    /// Create a new notification
    pub fn new(method: String, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method,
            params,
        }
    }

    /// Create an MCP logging notification (notifications/message)
    pub fn log_message(level: &str, data: Value) -> Self {
        Self::new(
            "notifications/message".to_string(),
            Some(serde_json::json!({
                "level": level,
                "logger": "market-stream",
                "data": data,
            })),
        )
    }
}

/// JSON-RPC 2.0 Error Response
#[derive(Serialize, Debug)]
pub struct JsonRpcError {
    pub jsonrpc: String,
    pub id: Value,
    pub error: ErrorObject,
}

impl JsonRpcError {
    /// Create a new error response
    pub fn new(id: Value, code: i32, message: String, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            error: ErrorObject {
                code,
                message,
                data,
            },
        }
    }

    /// Create a parse error response
    pub fn parse_error(id: Value, details: String) -> Self {
        Self::new(
            id,
            -32700,
            "Parse error".to_string(),
            Some(serde_json::json!({"details": details})),
        )
    }

    /// Create an invalid request error response
    pub fn invalid_request(id: Value, details: String) -> Self {
        Self::new(
            id,
            -32600,
            "Invalid Request".to_string(),
            Some(serde_json::json!({"details": details})),
        )
    }

    /// Create a method not found error response
    pub fn method_not_found(id: Value, method: String) -> Self {
        Self::new(
            id,
            -32601,
            "Method not found".to_string(),
            Some(serde_json::json!({"method": method})),
        )
    }

    /// Create an invalid params error response
    pub fn invalid_params(id: Value, details: String) -> Self {
        Self::new(
            id,
            -32602,
            "Invalid params".to_string(),
            Some(serde_json::json!({"details": details})),
        )
    }

    /// Create an internal error response
    pub fn internal_error(id: Value, details: String) -> Self {
        Self::new(
            id,
            -32603,
            "Internal error".to_string(),
            Some(serde_json::json!({"details": details})),
        )
    }
}

/// JSON-RPC 2.0 Error Object
#[derive(Serialize, Debug)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_validation() {
        let request: JsonRpcRequest =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "method": "ping"})).unwrap();
        assert!(request.is_valid());
        assert!(!request.is_notification());

        let notification: JsonRpcRequest = serde_json::from_value(
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        )
        .unwrap();
        assert!(notification.is_notification());
    }

    #[test]
    fn test_log_message_shape() {
        let notification = JsonRpcNotification::log_message("info", json!("fetching data"));
        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["method"], "notifications/message");
        assert_eq!(value["params"]["level"], "info");
        assert_eq!(value["params"]["data"], "fetching data");
    }

    #[test]
    fn test_error_codes() {
        let error = JsonRpcError::method_not_found(json!(1), "bogus".to_string());
        assert_eq!(error.error.code, -32601);
        let error = JsonRpcError::invalid_params(json!(1), "missing ticker".to_string());
        assert_eq!(error.error.code, -32602);
    }
}
