//! OpenRouter API surface
//!
//! This module owns everything that touches the network: the pooled HTTP
//! client, the wire request/response shapes, error mapping for non-success
//! statuses, and the read-only model discovery endpoint. The streaming
//! pipeline itself lives in [`crate::stream`] and reaches the network only
//! through the [`ChatTransport`](crate::stream::ChatTransport) seam this
//! module implements.

pub mod client;
pub mod error;
pub mod types;

pub use client::{OpenRouterClient, OpenRouterConfig, DEFAULT_BASE_URL};
pub use error::{ClientError, ClientResult};
pub use types::{ChatCompletionRequest, ModelInfo};
