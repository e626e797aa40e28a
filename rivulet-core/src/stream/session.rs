//! Stream session: lifecycle of one in-flight streamed request
//!
//! A session is created when a send is initiated and settles exactly once:
//! completed, aborted by the user, or failed. The caller keeps a clone of
//! the cancellation token (or the session itself) to wire up a pause/stop
//! affordance. One in-flight session per conversation is a caller
//! precondition; the UI disables sending until the prior one settles.

use crate::openrouter::error::ClientResult;
use crate::protocol::{Delta, Transcript};
use crate::stream::controller::{self, ChatTransport, SendRequest, StreamOutcome};
use crate::stream::reconciler::FoldResult;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Terminal and in-flight states of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Request is in flight
    Running,
    /// Transport ended normally
    Completed,
    /// Caller cancelled before the transport ended
    Aborted,
    /// Network, status, or decode failure
    Failed,
}

/// Lifecycle object for one streamed request
#[derive(Debug)]
pub struct StreamSession {
    id: Uuid,
    cancel: CancellationToken,
    status: SessionStatus,
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamSession {
    /// Create a fresh running session with its own cancellation token
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            cancel: CancellationToken::new(),
            status: SessionStatus::Running,
        }
    }

    /// Unique id for log correlation
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Clone of the cancellation token, for the pause/stop affordance
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request cooperative cancellation of the in-flight read
    pub fn abort(&self) {
        self.cancel.cancel();
    }

    /// Current status
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Run one send under this session, recording the terminal status
    pub async fn run<F>(
        &mut self,
        transport: &dyn ChatTransport,
        request: &SendRequest,
        transcript: &mut Transcript,
        on_delta: F,
    ) -> ClientResult<StreamOutcome>
    where
        F: FnMut(&Delta, FoldResult),
    {
        let result = controller::send(transport, request, transcript, on_delta, &self.cancel).await;
        self.status = match &result {
            Ok(StreamOutcome::Completed) => SessionStatus::Completed,
            Ok(StreamOutcome::Cancelled) => SessionStatus::Aborted,
            Err(_) => SessionStatus::Failed,
        };
        result
    }
}
