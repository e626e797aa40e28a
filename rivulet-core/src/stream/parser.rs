//! Event parser: one SSE record to zero-or-one content fragment
//!
//! Individual malformed frames are skipped, never fatal: a stream that has
//! already delivered useful content must not be torn down because one
//! event failed to parse.

use crate::openrouter::types::StreamChunk;
use crate::stream::decoder::DATA_PREFIX;

/// Stream-termination sentinel sent as the final event payload
pub const DONE_SENTINEL: &str = "[DONE]";

/// Result of parsing a single event record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedEvent {
    /// The record carried an incremental content fragment
    Content(String),

    /// The record was the `[DONE]` end-of-stream sentinel
    Done,

    /// The record carried nothing usable (role-only delta, empty content,
    /// or a malformed frame)
    Skip,
}

/// Parse one `data: `-prefixed record into a [`ParsedEvent`]
pub fn parse_record(record: &str) -> ParsedEvent {
    let payload = record.strip_prefix(DATA_PREFIX).unwrap_or(record);
    // Tolerate CRLF framing: the decoder emits lines verbatim
    let payload = payload.strip_suffix('\r').unwrap_or(payload);

    if payload == DONE_SENTINEL {
        return ParsedEvent::Done;
    }

    let chunk: StreamChunk = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(err) => {
            tracing::warn!("skipping malformed stream frame: {}", err);
            return ParsedEvent::Skip;
        }
    };

    match chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
    {
        Some(text) if !text.is_empty() => ParsedEvent::Content(text),
        _ => ParsedEvent::Skip,
    }
}
