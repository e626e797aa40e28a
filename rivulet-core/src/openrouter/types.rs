//! OpenRouter wire types
//!
//! These types match the OpenAI-compatible chat-completions format and are
//! used for serialization/deserialization when talking to the server. The
//! canonical conversation model lives in `protocol::types`; only the thin
//! request/response shapes live here.

use crate::protocol::{Message, Role};
use serde::{Deserialize, Serialize};

/// Outgoing chat-completion request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub max_tokens: u32,
    pub stream: bool,
}

impl ChatCompletionRequest {
    /// Build a streaming request: system prompt first, then the history
    ///
    /// Channel tags on assistant messages are a client-side concern and are
    /// not sent over the wire.
    pub fn streaming(
        model: &str,
        system_prompt: &str,
        max_tokens: u32,
        history: &[Message],
    ) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(WireMessage {
            role: Role::System,
            content: system_prompt.to_owned(),
        });
        messages.extend(history.iter().map(WireMessage::from));

        Self {
            model: model.to_owned(),
            messages,
            max_tokens,
            stream: true,
        }
    }
}

/// One message as sent over the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// One streamed completion chunk, as carried by a `data: ` event
///
/// Deserialization is deliberately tolerant: every field defaults so that
/// role-only deltas, usage-only chunks, and future additions parse into a
/// chunk that simply carries no content.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

/// Choice entry inside a stream chunk
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
}

/// Incremental message delta inside a choice
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

/// Response of the model discovery endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub data: Vec<ModelInfo>,
}

/// One model entry from the discovery endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    pub id: String,

    #[serde(default)]
    pub pricing: Option<ModelPricing>,
}

impl ModelInfo {
    /// Whether both prompt and completion pricing are zero
    pub fn is_free(&self) -> bool {
        self.pricing
            .as_ref()
            .is_some_and(|pricing| {
                pricing.prompt.as_deref() == Some("0") && pricing.completion.as_deref() == Some("0")
            })
    }
}

/// Per-token pricing, reported as decimal strings
#[derive(Debug, Clone, Deserialize)]
pub struct ModelPricing {
    #[serde(default)]
    pub prompt: Option<String>,

    #[serde(default)]
    pub completion: Option<String>,
}
