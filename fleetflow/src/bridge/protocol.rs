//! Chat-completions wire types.

use serde::{Deserialize, Serialize};

/// Object type of streamed chunks.
pub const CHUNK_OBJECT: &str = "chat.completion.chunk";

/// Sentinel sent after the last chunk.
pub const DONE_SENTINEL: &str = "[DONE]";

/// One message of a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user`, `assistant`, ...
    pub role: String,
    /// The message text.
    pub content: String,
}

impl ChatMessage {
    /// Creates a message.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Creates a `user` message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Whether this message was written by the user.
    pub fn is_user(&self) -> bool {
        self.role == "user"
    }
}

/// An incoming chat-completions request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// The conversation so far.
    pub messages: Vec<ChatMessage>,
    /// Requested model; ignored, the configured model is reported.
    #[serde(default)]
    pub model: Option<String>,
    /// Requested streaming; the response is streamed either way.
    #[serde(default)]
    pub stream: Option<bool>,
}

/// Incremental content of a chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    /// Speaker, present on the content chunk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Text, present on the content chunk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A choice inside a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkChoice {
    /// Always 0.
    pub index: u32,
    /// What this chunk adds.
    pub delta: Delta,
    /// `None` on the content chunk, `"stop"` on the final one.
    pub finish_reason: Option<String>,
}

/// A streamed response chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    /// Completion id, shared by all chunks of a response.
    pub id: String,
    /// Always [`CHUNK_OBJECT`].
    pub object: String,
    /// Unix seconds.
    pub created: i64,
    /// Reported model name.
    pub model: String,
    /// Exactly one choice.
    pub choices: Vec<ChunkChoice>,
}

impl ChatCompletionChunk {
    fn with_choice(id: &str, created: i64, model: &str, choice: ChunkChoice) -> Self {
        Self {
            id: id.to_string(),
            object: CHUNK_OBJECT.to_string(),
            created,
            model: model.to_string(),
            choices: vec![choice],
        }
    }

    /// The chunk carrying the whole answer.
    pub fn content(id: &str, created: i64, model: &str, text: impl Into<String>) -> Self {
        Self::with_choice(
            id,
            created,
            model,
            ChunkChoice {
                index: 0,
                delta: Delta {
                    role: Some("assistant".to_string()),
                    content: Some(text.into()),
                },
                finish_reason: None,
            },
        )
    }

    /// The closing chunk with an empty delta.
    pub fn stop(id: &str, created: i64, model: &str) -> Self {
        Self::with_choice(
            id,
            created,
            model,
            ChunkChoice {
                index: 0,
                delta: Delta::default(),
                finish_reason: Some("stop".to_string()),
            },
        )
    }

    /// Returns the text of the first choice, if any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
    }
}
