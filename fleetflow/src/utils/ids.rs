//! Identifier helpers.

use uuid::Uuid;

/// Returns a fresh chat completion id, `chatcmpl-<32 hex digits>`.
#[must_use]
pub fn completion_id() -> String {
    format!("chatcmpl-{}", Uuid::new_v4().simple())
}
