//! The chat bridge: one chat request in, one agent run, two chunks out.

use super::protocol::{ChatCompletionChunk, ChatCompletionRequest, ChatMessage};
use crate::agent::Agent;
use crate::settings::ServiceConfig;
use crate::utils::{completion_id, unix_timestamp};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, info_span, warn, Instrument};

/// Errors that reject a chat request before the agent runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    /// The `x-api-key` header is missing or wrong.
    #[error("Invalid API key")]
    Unauthorized,

    /// The conversation has no user message.
    #[error("No user message found")]
    NoUserMessage,

    /// The body is not a chat-completions request.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl BridgeError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NoUserMessage | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        (self.status(), body).into_response()
    }
}

/// Returns the content of the last user message.
///
/// Earlier user messages and other roles are ignored. A blank last user
/// message counts as no user message.
pub fn extract_prompt(messages: &[ChatMessage]) -> Result<&str, BridgeError> {
    messages
        .iter()
        .rev()
        .find(|message| message.is_user())
        .map(|message| message.content.as_str())
        .filter(|content| !content.trim().is_empty())
        .ok_or(BridgeError::NoUserMessage)
}

/// Connects chat clients to an agent.
#[derive(Clone)]
pub struct Bridge {
    agent: Arc<dyn Agent>,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("agent", &self.agent.name())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl Bridge {
    /// Creates a bridge; `model` is the name reported in chunks.
    pub fn new(
        agent: Arc<dyn Agent>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            agent,
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Creates a bridge with the configured key and model.
    pub fn from_config(agent: Arc<dyn Agent>, config: &ServiceConfig) -> Self {
        Self::new(agent, config.api_key.clone(), config.model_display_name())
    }

    /// Returns the reported model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Checks the presented API key.
    pub fn authorize(&self, presented: Option<&str>) -> Result<(), BridgeError> {
        match presented {
            Some(key) if key == self.api_key => Ok(()),
            _ => {
                warn!("Rejected chat request with invalid API key");
                Err(BridgeError::Unauthorized)
            }
        }
    }

    /// Handles one chat request.
    ///
    /// Authorization and validation happen before the agent is invoked.
    /// The agent runs to completion, then its answer is returned as a
    /// content chunk followed by a stop chunk. An agent failure is not an
    /// error here: its message becomes the answer text.
    pub async fn handle(
        &self,
        presented_key: Option<&str>,
        request: &ChatCompletionRequest,
    ) -> Result<Vec<ChatCompletionChunk>, BridgeError> {
        self.authorize(presented_key)?;
        let prompt = extract_prompt(&request.messages)?;

        let id = completion_id();
        let span = info_span!("chat_completion", completion_id = %id, agent = %self.agent.name());
        info!(parent: &span, prompt_len = prompt.len(), "Running agent for chat request");
        let text = match self.agent.run(prompt).instrument(span).await {
            Ok(response) => response.text,
            Err(e) => {
                error!(agent = %self.agent.name(), error = %e, "Agent run failed");
                format!("⚠️ Agent error: {e}")
            }
        };

        let created = unix_timestamp();
        Ok(vec![
            ChatCompletionChunk::content(&id, created, &self.model, text),
            ChatCompletionChunk::stop(&id, created, &self.model),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentError, AgentResponse, MockAgent};
    use mockall::predicate::eq;

    fn request(messages: Vec<ChatMessage>) -> ChatCompletionRequest {
        ChatCompletionRequest {
            messages,
            model: None,
            stream: Some(true),
        }
    }

    #[test]
    fn test_extract_prompt_takes_last_user_message() {
        let messages = vec![
            ChatMessage::new("system", "be brief"),
            ChatMessage::user("first question"),
            ChatMessage::new("assistant", "first answer"),
            ChatMessage::user("second question"),
            ChatMessage::new("assistant", "thinking"),
        ];
        assert_eq!(extract_prompt(&messages), Ok("second question"));
    }

    #[test]
    fn test_extract_prompt_without_user() {
        let messages = vec![ChatMessage::new("system", "be brief")];
        assert_eq!(extract_prompt(&messages), Err(BridgeError::NoUserMessage));
        assert_eq!(extract_prompt(&[]), Err(BridgeError::NoUserMessage));
    }

    #[test]
    fn test_extract_prompt_rejects_blank_last_user_message() {
        let messages = vec![ChatMessage::user("check TRUCK-1"), ChatMessage::user("  ")];
        assert_eq!(extract_prompt(&messages), Err(BridgeError::NoUserMessage));
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(BridgeError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(BridgeError::NoUserMessage.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_handle_passes_only_last_user_message() {
        let mut agent = MockAgent::new();
        agent.expect_name().return_const("mock".to_string());
        agent
            .expect_run()
            .with(eq("second"))
            .times(1)
            .returning(|_| Ok(AgentResponse::text("answer")));

        let bridge = Bridge::new(Arc::new(agent), "key", "granite");
        let chunks = bridge
            .handle(
                Some("key"),
                &request(vec![ChatMessage::user("first"), ChatMessage::user("second")]),
            )
            .await
            .unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text(), Some("answer"));
        assert_eq!(chunks[0].id, chunks[1].id);
        assert_eq!(chunks[1].choices[0].finish_reason.as_deref(), Some("stop"));
        assert_eq!(chunks[0].model, "granite");
    }

    #[tokio::test]
    async fn test_handle_rejects_before_invoking_agent() {
        let mut agent = MockAgent::new();
        agent.expect_name().return_const("mock".to_string());
        agent.expect_run().never();
        let bridge = Bridge::new(Arc::new(agent), "key", "granite");

        let wrong_key = bridge
            .handle(Some("nope"), &request(vec![ChatMessage::user("hi")]))
            .await;
        assert_eq!(wrong_key, Err(BridgeError::Unauthorized));

        let missing_key = bridge
            .handle(None, &request(vec![ChatMessage::user("hi")]))
            .await;
        assert_eq!(missing_key, Err(BridgeError::Unauthorized));

        let no_user = bridge
            .handle(Some("key"), &request(vec![ChatMessage::new("system", "x")]))
            .await;
        assert_eq!(no_user, Err(BridgeError::NoUserMessage));
    }

    #[tokio::test]
    async fn test_agent_failure_becomes_text() {
        let mut agent = MockAgent::new();
        agent.expect_name().return_const("mock".to_string());
        agent
            .expect_run()
            .returning(|_| Err(AgentError::Transport("timeout".to_string())));

        let chunks = Bridge::new(Arc::new(agent), "key", "granite")
            .handle(Some("key"), &request(vec![ChatMessage::user("hi")]))
            .await
            .unwrap();

        assert_eq!(
            chunks[0].text(),
            Some("⚠️ Agent error: Remote agent request failed: timeout")
        );
    }

    #[test]
    fn test_from_config_strips_model_prefix() {
        let mut agent = MockAgent::new();
        agent.expect_name().return_const("mock".to_string());
        let bridge = Bridge::from_config(Arc::new(agent), &ServiceConfig::default());
        assert_eq!(bridge.model(), "ibm/granite-3-8b-instruct");
    }
}
