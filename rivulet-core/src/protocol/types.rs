//! Core types for the conversation transcript
//!
//! The transcript is an ordered, append-only sequence of [`Message`]s.
//! During a streaming turn, exactly one assistant message is the active
//! append target; it is superseded (never edited retroactively) when the
//! assistant switches between reasoning and response output.

use serde::{Deserialize, Serialize};

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions that guide the model's behavior
    System,
    /// User input message
    User,
    /// Assistant (model) response
    Assistant,
}

/// Logical channel of assistant output
///
/// A single model turn may interleave "thinking" text with the actual
/// answer; each contiguous run of same-channel fragments becomes one
/// transcript message, so the presentation layer gets natural boundaries
/// without waiting for the turn to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Model reasoning / chain-of-thought output
    Reasoning,
    /// The answer itself
    Response,
}

/// One turn in the transcript
///
/// `content` grows monotonically by append while the message is the active
/// streaming target and is frozen once a new message supersedes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender. Immutable once created.
    pub role: Role,

    /// Text content of the message
    pub content: String,

    /// Channel tag, present only on streamed assistant messages
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub channel: Option<Channel>,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            channel: None,
        }
    }

    /// Create an assistant message tagged with a channel
    pub fn assistant(content: impl Into<String>, channel: Channel) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            channel: Some(channel),
        }
    }
}

/// The ordered, append-only list of conversation messages
///
/// Ownership stays with the caller (the presentation layer); the streaming
/// core borrows it for the duration of one send and never persists it.
pub type Transcript = Vec<Message>;

/// One incremental fragment of generated text plus its channel tag
///
/// Deltas are ephemeral: they are folded into the transcript by the
/// reconciler and not retained.
#[derive(Debug, Clone, PartialEq)]
pub struct Delta {
    /// Non-empty fragment of content
    pub text: String,

    /// Classification result for this fragment
    pub channel: Channel,
}
