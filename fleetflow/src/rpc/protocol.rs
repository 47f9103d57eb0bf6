//! JSON-RPC 2.0 protocol types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version, always "2.0".
    pub jsonrpc: String,
    /// Method to invoke.
    pub method: String,
    /// Method parameters.
    #[serde(default)]
    pub params: Value,
    /// Request id, echoed back in the response.
    #[serde(default)]
    pub id: Value,
}

impl JsonRpcRequest {
    /// Create a request with a specific ID
    pub fn with_id(method: impl Into<String>, params: Value, id: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
            id,
        }
    }
}

/// JSON-RPC 2.0 response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version, always "2.0".
    pub jsonrpc: String,
    /// Result on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    /// Id of the request this answers.
    pub id: Value,
}

impl JsonRpcResponse {
    /// Create a success response
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error response
    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
            id,
        }
    }
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,
    /// Short description.
    pub message: String,
    /// Extra information.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Standard JSON-RPC error codes
pub mod error_codes {
    /// Invalid JSON.
    pub const PARSE_ERROR: i64 = -32700;
    /// Not a valid request object.
    pub const INVALID_REQUEST: i64 = -32600;
    /// Method does not exist.
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Invalid method parameters.
    pub const INVALID_PARAMS: i64 = -32602;
    /// Internal error.
    pub const INTERNAL_ERROR: i64 = -32603;
}

/// Builds the agent result payload: one text part in an agent message.
#[must_use]
pub fn agent_message(text: &str) -> Value {
    serde_json::json!({
        "message": {
            "role": "agent",
            "parts": [{"kind": "text", "text": text}],
        }
    })
}

/// Extracts the text of the first part of an agent result payload.
#[must_use]
pub fn agent_message_text(result: &Value) -> Option<&str> {
    result
        .pointer("/message/parts/0/text")
        .and_then(Value::as_str)
}

/// Extracts the prompt from agent call parameters.
///
/// Accepts both `{"prompt": ...}` and `{"input": {"prompt": ...}}`.
#[must_use]
pub fn prompt_param(params: &Value) -> Option<&str> {
    params
        .get("prompt")
        .or_else(|| params.pointer("/input/prompt"))
        .and_then(Value::as_str)
}

/// Parse a JSON-RPC request from a JSON value
pub fn parse_request(value: Value) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let id = value.get("id").cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| {
        JsonRpcResponse::error(
            id,
            error_codes::INVALID_REQUEST,
            format!("Invalid request: {e}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let req = JsonRpcRequest::with_id("agent.run", json!({"prompt": "hi"}), json!("1"));
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"method\":\"agent.run\""));
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
    }

    #[test]
    fn test_response_serialization() {
        let resp = JsonRpcResponse::success(json!(1), json!({"ok": true}));
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"result\""));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_agent_message_text() {
        let payload = agent_message("all good");
        assert_eq!(agent_message_text(&payload), Some("all good"));
        assert_eq!(agent_message_text(&json!({"message": {}})), None);
    }

    #[test]
    fn test_prompt_param_shapes() {
        assert_eq!(prompt_param(&json!({"prompt": "a"})), Some("a"));
        assert_eq!(prompt_param(&json!({"input": {"prompt": "b"}})), Some("b"));
        assert_eq!(prompt_param(&json!({"text": "c"})), None);
    }

    #[test]
    fn test_parse_request_invalid_keeps_id() {
        let err = parse_request(json!({"id": 7, "params": {}})).unwrap_err();
        assert_eq!(err.id, json!(7));
        assert_eq!(err.error.unwrap().code, error_codes::INVALID_REQUEST);
    }
}
