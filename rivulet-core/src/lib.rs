//! Rivulet Core Library
//!
//! This crate provides the streaming core of the Rivulet chat client:
//! ingestion of streamed chat-completion responses from an
//! OpenRouter-compatible API and their reconciliation into an ordered,
//! append-only conversation transcript, plus the configuration and
//! persistence layers around it.

pub mod config;
pub mod openrouter;
pub mod protocol;
pub mod stream;

/// Returns the version of the Rivulet Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
