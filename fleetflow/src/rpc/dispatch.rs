//! Routes JSON-RPC requests to an agent.

use super::protocol::{
    agent_message, error_codes, parse_request, prompt_param, JsonRpcResponse,
};
use crate::agent::Agent;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info_span, Instrument};

/// Answers the configured agent method; every other method is unknown.
#[derive(Clone)]
pub struct RpcDispatcher {
    agent: Arc<dyn Agent>,
    method: String,
}

impl std::fmt::Debug for RpcDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcDispatcher")
            .field("agent", &self.agent.name())
            .field("method", &self.method)
            .finish()
    }
}

impl RpcDispatcher {
    /// Creates a dispatcher answering `method` with `agent`.
    pub fn new(agent: Arc<dyn Agent>, method: impl Into<String>) -> Self {
        Self {
            agent,
            method: method.into(),
        }
    }

    /// Returns the method name this dispatcher answers.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Handles one raw request body.
    pub async fn dispatch(&self, body: Value) -> JsonRpcResponse {
        let request = match parse_request(body) {
            Ok(request) => request,
            Err(response) => return response,
        };
        let id = request.id.clone();

        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::error(
                id,
                error_codes::INVALID_REQUEST,
                "jsonrpc must be \"2.0\"",
            );
        }
        if request.method != self.method {
            return JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            );
        }
        let Some(prompt) = prompt_param(&request.params) else {
            return JsonRpcResponse::error(
                id,
                error_codes::INVALID_PARAMS,
                "params.prompt must be a string",
            );
        };

        let span = info_span!("rpc_call", method = %request.method, rpc_id = %id);
        debug!(parent: &span, "Dispatching agent call");
        match self.agent.run(prompt).instrument(span).await {
            Ok(response) => JsonRpcResponse::success(id, agent_message(&response.text)),
            Err(e) => {
                error!(method = %request.method, error = %e, "Agent call failed");
                JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentError, AgentResponse, MockAgent};
    use crate::rpc::protocol::agent_message_text;
    use serde_json::json;

    fn echo_agent() -> Arc<dyn Agent> {
        let mut agent = MockAgent::new();
        agent.expect_name().return_const("echo".to_string());
        agent
            .expect_run()
            .returning(|prompt| Ok(AgentResponse::text(format!("echo: {prompt}"))));
        Arc::new(agent)
    }

    #[tokio::test]
    async fn test_dispatch_runs_agent() {
        let dispatcher = RpcDispatcher::new(echo_agent(), "agent.run");
        let response = dispatcher
            .dispatch(json!({
                "jsonrpc": "2.0",
                "id": "abc",
                "method": "agent.run",
                "params": {"prompt": "status of TRUCK-1"}
            }))
            .await;

        assert_eq!(response.id, json!("abc"));
        assert!(response.error.is_none());
        assert_eq!(
            agent_message_text(response.result.as_ref().unwrap()),
            Some("echo: status of TRUCK-1")
        );
    }

    #[tokio::test]
    async fn test_dispatch_accepts_nested_input_prompt() {
        let dispatcher = RpcDispatcher::new(echo_agent(), "tasks/run");
        let response = dispatcher
            .dispatch(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tasks/run",
                "params": {"input": {"prompt": "hi"}}
            }))
            .await;

        assert!(response.result.is_some());
    }

    #[tokio::test]
    async fn test_dispatch_error_codes() {
        let dispatcher = RpcDispatcher::new(echo_agent(), "agent.run");

        let unknown = dispatcher
            .dispatch(json!({"jsonrpc": "2.0", "id": 1, "method": "nope", "params": {}}))
            .await;
        assert_eq!(unknown.error.unwrap().code, error_codes::METHOD_NOT_FOUND);

        let bad_params = dispatcher
            .dispatch(json!({"jsonrpc": "2.0", "id": 2, "method": "agent.run", "params": {}}))
            .await;
        assert_eq!(bad_params.error.unwrap().code, error_codes::INVALID_PARAMS);

        let bad_version = dispatcher
            .dispatch(json!({"jsonrpc": "1.0", "id": 3, "method": "agent.run"}))
            .await;
        assert_eq!(bad_version.error.unwrap().code, error_codes::INVALID_REQUEST);

        let not_an_object = dispatcher.dispatch(json!([1, 2, 3])).await;
        assert_eq!(not_an_object.error.unwrap().code, error_codes::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_agent_failure_is_internal_error() {
        let mut agent = MockAgent::new();
        agent.expect_name().return_const("broken".to_string());
        agent
            .expect_run()
            .returning(|_| Err(AgentError::MissingVehicleId("hello".to_string())));

        let response = RpcDispatcher::new(Arc::new(agent), "agent.run")
            .dispatch(json!({
                "jsonrpc": "2.0",
                "id": 9,
                "method": "agent.run",
                "params": {"prompt": "hello"}
            }))
            .await;

        let error = response.error.unwrap();
        assert_eq!(error.code, error_codes::INTERNAL_ERROR);
        assert!(error.message.contains("No vehicle id"));
    }
}
