//! Protocol module for the canonical conversation model
//!
//! This module defines the data structures the rest of the crate operates
//! on. These structures are designed to be:
//! - Transport-agnostic (the wire format lives in `openrouter::types`)
//! - Append-only during a streaming session
//! - Type-safe and serializable

pub mod types;

pub use types::{Channel, Delta, Message, Role, Transcript};
