//! JSON-RPC client for a remote agent service.

use super::{Agent, AgentError, AgentResponse};
use crate::rpc::protocol::{agent_message_text, JsonRpcRequest, JsonRpcResponse};
use crate::settings::RpcConfig;
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// An agent living behind a JSON-RPC endpoint.
///
/// Sends `{"prompt": ...}` to the configured method and reads the answer
/// from `result.message.parts[0].text`.
#[derive(Debug)]
pub struct RemoteAgent {
    url: String,
    method: String,
    http_client: reqwest::Client,
    next_id: AtomicU64,
}

impl RemoteAgent {
    /// Creates a client for the endpoint and method in `config`.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the HTTP client cannot be built.
    pub fn new(config: &RpcConfig) -> Result<Self, AgentError> {
        Self::with_url(config, config.remote_url.clone())
    }

    /// Creates a client for a specific endpoint.
    pub fn with_url(config: &RpcConfig, url: impl Into<String>) -> Result<Self, AgentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AgentError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: url.into(),
            method: config.method.clone(),
            http_client,
            next_id: AtomicU64::new(1),
        })
    }

    /// Returns the endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn request(&self, prompt: &str) -> JsonRpcRequest {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        JsonRpcRequest::with_id(&self.method, json!({ "prompt": prompt }), json!(id))
    }
}

#[async_trait]
impl Agent for RemoteAgent {
    fn name(&self) -> &str {
        &self.url
    }

    async fn run(&self, prompt: &str) -> Result<AgentResponse, AgentError> {
        let request = self.request(prompt);
        debug!(url = %self.url, method = %self.method, id = %request.id, "Calling remote agent");

        let response = self
            .http_client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.url, %status, "Remote agent returned HTTP error");
            return Err(AgentError::Transport(format!("HTTP {status}")));
        }

        let body: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| AgentError::MalformedResponse(e.to_string()))?;

        if let Some(error) = body.error {
            return Err(AgentError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = body
            .result
            .ok_or_else(|| AgentError::MalformedResponse("missing result".to_string()))?;
        let text = agent_message_text(&result).ok_or_else(|| {
            AgentError::MalformedResponse("result has no message text".to_string())
        })?;

        Ok(AgentResponse::text(text))
    }
}
