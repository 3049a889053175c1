//! JSON-RPC 2.0 framing for the streamable HTTP transport
//!
//! Minimal request/response types, just enough for the MCP methods the
//! endpoint serves.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 request
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    /// Protocol version, must be "2.0"
    pub jsonrpc: String,

    /// Request id; null or absent for notifications
    #[serde(default)]
    pub id: Value,

    /// Method being invoked
    pub method: String,

    /// Method parameters
    #[serde(default)]
    pub params: Value,
}

impl RpcRequest {
    /// Notifications carry no id and expect no response
    pub fn is_notification(&self) -> bool {
        self.id.is_null()
    }
}

/// JSON-RPC 2.0 response
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    /// Fixed at "2.0"
    pub jsonrpc: &'static str,

    /// Request id (echoed from the request)
    pub id: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl RpcResponse {
    /// Success response carrying a result
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Error response with the given code and message
    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }

    /// The request was not a well-formed JSON-RPC request
    pub fn invalid_request(id: Value) -> Self {
        Self::error(id, -32600, "Invalid request")
    }

    /// The method is not served by this endpoint
    pub fn method_not_found(id: Value, method: &str) -> Self {
        Self::error(id, -32601, format!("Method not found: {}", method))
    }

    /// The params did not match what the method expects
    pub fn invalid_params(id: Value, message: impl Into<String>) -> Self {
        Self::error(id, -32602, message)
    }

    /// The method itself failed
    pub fn internal_error(id: Value, message: impl Into<String>) -> Self {
        Self::error(id, -32603, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_with_id_is_not_notification() {
        let request: RpcRequest =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 7, "method": "ping"})).unwrap();
        assert!(!request.is_notification());
        assert_eq!(request.method, "ping");
        assert!(request.params.is_null());
    }

    #[test]
    fn test_request_without_id_is_notification() {
        let request: RpcRequest = serde_json::from_value(
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        )
        .unwrap();
        assert!(request.is_notification());
    }

    #[test]
    fn test_success_omits_error_field() {
        let response = RpcResponse::success(json!(1), json!({"ok": true}));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 1);
        assert_eq!(value["result"]["ok"], true);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_error_omits_result_field() {
        let response = RpcResponse::method_not_found(json!("a"), "resources/list");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["error"]["code"], -32601);
        assert_eq!(value["error"]["message"], "Method not found: resources/list");
        assert!(value.get("result").is_none());
    }
}
