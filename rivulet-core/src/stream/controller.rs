//! Stream controller: request lifecycle orchestration
//!
//! Opens one streamed chat-completion request over a [`ChatTransport`],
//! drives the decode/parse/classify/fold pipeline, and reports a terminal
//! outcome. Cancellation is cooperative: the token is checked at the
//! read-suspension point so an in-progress network read is abandoned, not
//! drained. Content already folded into the transcript stays there on
//! cancellation and on failure alike.

use crate::openrouter::error::ClientResult;
use crate::openrouter::types::ChatCompletionRequest;
use crate::protocol::{Delta, Transcript};
use crate::stream::classifier;
use crate::stream::decoder::SseDecoder;
use crate::stream::parser::{self, ParsedEvent};
use crate::stream::reconciler::{FoldResult, Reconciler};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Finite, non-restartable sequence of raw response chunks
pub type RecordStream = Pin<Box<dyn Stream<Item = ClientResult<Bytes>> + Send>>;

/// Transport seam the controller drives
///
/// The production implementation is `OpenRouterClient`; tests substitute
/// scripted byte streams.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Issue the streamed chat-completion request and hand back its body
    ///
    /// Implementations reject missing credentials before any network
    /// activity and map non-success statuses to errors.
    async fn open_chat_stream(&self, request: &ChatCompletionRequest) -> ClientResult<RecordStream>;
}

/// Parameters for one send, supplied by the caller
///
/// The new user message is not carried here: the caller appends it to the
/// transcript before calling [`send`].
#[derive(Debug, Clone)]
pub struct SendRequest {
    /// Model identifier to request
    pub model: String,

    /// System prompt prefixed to the outgoing message list
    pub system_prompt: String,

    /// Generation budget forwarded as `max_tokens`
    pub max_tokens: u32,
}

/// Terminal status of a send that did not fail
///
/// Cancellation crosses the boundary as a status, never as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The transport ended normally (`[DONE]` sentinel or stream close)
    Completed,

    /// The caller triggered the cancellation token
    Cancelled,
}

/// Send one turn and fold the streamed reply into the transcript
///
/// Invokes `on_delta` once per visible fragment, in strict arrival order,
/// after the fragment has been folded; the caller re-renders and persists
/// the transcript from the callback. Returns `Ok` with the outcome, or an
/// error for network failure, non-success status, or an irrecoverable
/// decode failure. Re-sending after cancellation is a brand-new session;
/// there is no resume.
pub async fn send<F>(
    transport: &dyn ChatTransport,
    request: &SendRequest,
    transcript: &mut Transcript,
    mut on_delta: F,
    cancel: &CancellationToken,
) -> ClientResult<StreamOutcome>
where
    F: FnMut(&Delta, FoldResult),
{
    if cancel.is_cancelled() {
        return Ok(StreamOutcome::Cancelled);
    }

    let wire = ChatCompletionRequest::streaming(
        &request.model,
        &request.system_prompt,
        request.max_tokens,
        transcript,
    );

    info!("opening chat stream for model '{}'", request.model);
    let mut stream = transport.open_chat_stream(&wire).await?;

    let mut decoder = SseDecoder::new();
    let mut reconciler = Reconciler::new();

    loop {
        let chunk = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("chat stream cancelled by caller");
                return Ok(StreamOutcome::Cancelled);
            }
            chunk = stream.next() => chunk,
        };

        let Some(chunk) = chunk else {
            debug!("chat stream closed without sentinel");
            break;
        };

        for record in decoder.feed(&chunk?) {
            match parser::parse_record(&record) {
                ParsedEvent::Done => {
                    debug!("end-of-stream sentinel received");
                    return Ok(StreamOutcome::Completed);
                }
                ParsedEvent::Skip => {}
                ParsedEvent::Content(text) => {
                    let delta = Delta {
                        channel: classifier::classify(&text),
                        text,
                    };
                    let fold = reconciler.fold(transcript, &delta);
                    on_delta(&delta, fold);
                }
            }
        }
    }

    Ok(StreamOutcome::Completed)
}
