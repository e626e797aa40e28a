//! End-to-end tests for the streaming pipeline over scripted transports

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use futures::StreamExt;
use proptest::prelude::*;
use rivulet_core::openrouter::types::ChatCompletionRequest;
use rivulet_core::openrouter::{ClientError, ClientResult};
use rivulet_core::protocol::{Channel, Delta, Message, Role, Transcript};
use rivulet_core::stream::{
    send, ChatTransport, FoldResult, Reconciler, RecordStream, SendRequest, SessionStatus,
    StreamOutcome, StreamSession,
};
use tokio_util::sync::CancellationToken;

/// Transport that replays prepared byte chunks, then optionally hangs
struct ScriptedTransport {
    chunks: Vec<ClientResult<Bytes>>,
    hang_after: bool,
}

impl ScriptedTransport {
    fn new(chunks: Vec<ClientResult<Bytes>>) -> Self {
        Self {
            chunks,
            hang_after: false,
        }
    }

    /// One SSE `data: ` line per chunk
    fn from_frames(frames: &[String]) -> Self {
        Self::new(
            frames
                .iter()
                .map(|frame| Ok(Bytes::from(format!("data: {frame}\n"))))
                .collect(),
        )
    }

    /// Never end the stream after the prepared chunks (no sentinel, no close)
    fn hanging(mut self) -> Self {
        self.hang_after = true;
        self
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn open_chat_stream(
        &self,
        _request: &ChatCompletionRequest,
    ) -> ClientResult<RecordStream> {
        let chunks: Vec<ClientResult<Bytes>> = self
            .chunks
            .iter()
            .map(|chunk| match chunk {
                Ok(bytes) => Ok(bytes.clone()),
                Err(err) => Err(ClientError::Network(err.to_string())),
            })
            .collect();
        let replay = stream::iter(chunks);
        if self.hang_after {
            Ok(Box::pin(replay.chain(stream::pending())))
        } else {
            Ok(Box::pin(replay))
        }
    }
}

fn content_frame(text: &str) -> String {
    format!(
        r#"{{"choices":[{{"delta":{{"content":{}}}}}]}}"#,
        serde_json::to_string(text).unwrap()
    )
}

fn request() -> SendRequest {
    SendRequest {
        model: "test-model".to_string(),
        system_prompt: "be helpful".to_string(),
        max_tokens: 256,
    }
}

fn assistant_contents(transcript: &Transcript) -> Vec<(Option<Channel>, &str)> {
    transcript
        .iter()
        .filter(|message| message.role == Role::Assistant)
        .map(|message| (message.channel, message.content.as_str()))
        .collect()
}

/// The documented interleaved-turn scenario: reasoning run, then answer
#[tokio::test]
async fn test_interleaved_turn_splits_into_two_messages() {
    let transport = ScriptedTransport::from_frames(&[
        content_frame("**Reasoning** thinking"),
        content_frame(" more"),
        content_frame("answer"),
        "[DONE]".to_string(),
    ]);

    let mut transcript = vec![Message::user("question")];
    let cancel = CancellationToken::new();
    let outcome = send(&transport, &request(), &mut transcript, |_, _| {}, &cancel)
        .await
        .unwrap();

    assert_eq!(outcome, StreamOutcome::Completed);
    assert_eq!(
        assistant_contents(&transcript),
        vec![
            (Some(Channel::Reasoning), "**Reasoning** thinking more"),
            (Some(Channel::Response), "answer"),
        ]
    );
}

#[tokio::test]
async fn test_switching_back_to_reasoning_appends_third_message() {
    let transport = ScriptedTransport::from_frames(&[
        content_frame("**Reasoning** a"),
        content_frame("b"),
        content_frame("**Reasoning** c"),
        "[DONE]".to_string(),
    ]);

    let mut transcript = Vec::new();
    let cancel = CancellationToken::new();
    send(&transport, &request(), &mut transcript, |_, _| {}, &cancel)
        .await
        .unwrap();

    assert_eq!(transcript.len(), 3);
}

/// Frames with no usable content leave the transcript untouched
#[tokio::test]
async fn test_empty_and_role_only_frames_ignored() {
    let transport = ScriptedTransport::from_frames(&[
        r#"{"choices":[{"delta":{"role":"assistant"}}]}"#.to_string(),
        content_frame("hello"),
        r#"{"choices":[{"delta":{"content":""}}]}"#.to_string(),
        "[DONE]".to_string(),
    ]);

    let mut transcript = Vec::new();
    let mut delta_count = 0;
    let cancel = CancellationToken::new();
    send(
        &transport,
        &request(),
        &mut transcript,
        |_, _| delta_count += 1,
        &cancel,
    )
    .await
    .unwrap();

    assert_eq!(delta_count, 1);
    assert_eq!(assistant_contents(&transcript), vec![(Some(Channel::Response), "hello")]);
}

/// A malformed frame amid valid ones folds to the same content as its
/// removal would
#[tokio::test]
async fn test_malformed_frame_skip_is_idempotent() {
    let with_bad = ScriptedTransport::from_frames(&[
        content_frame("a"),
        "{definitely not json".to_string(),
        content_frame("b"),
        "[DONE]".to_string(),
    ]);
    let without_bad = ScriptedTransport::from_frames(&[
        content_frame("a"),
        content_frame("b"),
        "[DONE]".to_string(),
    ]);

    let cancel = CancellationToken::new();
    let mut first = Vec::new();
    send(&with_bad, &request(), &mut first, |_, _| {}, &cancel)
        .await
        .unwrap();
    let mut second = Vec::new();
    send(&without_bad, &request(), &mut second, |_, _| {}, &cancel)
        .await
        .unwrap();

    assert_eq!(first, second);
}

/// Stream close without a sentinel still completes
#[tokio::test]
async fn test_close_without_sentinel_completes() {
    let transport = ScriptedTransport::from_frames(&[content_frame("partial")]);

    let mut transcript = Vec::new();
    let cancel = CancellationToken::new();
    let outcome = send(&transport, &request(), &mut transcript, |_, _| {}, &cancel)
        .await
        .unwrap();

    assert_eq!(outcome, StreamOutcome::Completed);
    assert_eq!(assistant_contents(&transcript), vec![(Some(Channel::Response), "partial")]);
}

/// A frame split across network chunks reassembles before parsing
#[tokio::test]
async fn test_frame_split_across_chunks() {
    let frame = format!("data: {}\n", content_frame("hello world"));
    let (head, tail) = frame.split_at(frame.len() / 2);
    let transport = ScriptedTransport::new(vec![
        Ok(Bytes::from(head.to_string())),
        Ok(Bytes::from(tail.to_string())),
    ]);

    let mut transcript = Vec::new();
    let cancel = CancellationToken::new();
    send(&transport, &request(), &mut transcript, |_, _| {}, &cancel)
        .await
        .unwrap();

    assert_eq!(
        assistant_contents(&transcript),
        vec![(Some(Channel::Response), "hello world")]
    );
}

/// Cancellation before any byte is read: no messages, `Cancelled`
#[tokio::test]
async fn test_cancellation_before_first_read() {
    let transport =
        ScriptedTransport::from_frames(&[content_frame("never seen"), "[DONE]".to_string()]);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut transcript = vec![Message::user("question")];
    let outcome = send(&transport, &request(), &mut transcript, |_, _| {}, &cancel)
        .await
        .unwrap();

    assert_eq!(outcome, StreamOutcome::Cancelled);
    assert_eq!(transcript.len(), 1);
}

/// Cancellation after M frames keeps exactly the content of frames 1..M
#[tokio::test]
async fn test_cancellation_mid_stream_keeps_folded_content() {
    let transport = ScriptedTransport::from_frames(&[
        content_frame("kept one"),
        content_frame(" and two"),
    ])
    .hanging();

    let cancel = CancellationToken::new();
    let cancel_from_callback = cancel.clone();
    let mut transcript = Vec::new();
    let mut seen = 0;

    let outcome = send(
        &transport,
        &request(),
        &mut transcript,
        |_, _| {
            seen += 1;
            if seen == 2 {
                cancel_from_callback.cancel();
            }
        },
        &cancel,
    )
    .await
    .unwrap();

    assert_eq!(outcome, StreamOutcome::Cancelled);
    assert_eq!(
        assistant_contents(&transcript),
        vec![(Some(Channel::Response), "kept one and two")]
    );
}

/// A mid-stream read failure surfaces as an error without rolling back
#[tokio::test]
async fn test_mid_stream_failure_preserves_partial_content() {
    let transport = ScriptedTransport::new(vec![
        Ok(Bytes::from(format!("data: {}\n", content_frame("partial")))),
        Err(ClientError::Network("connection reset".to_string())),
    ]);

    let mut transcript = Vec::new();
    let cancel = CancellationToken::new();
    let result = send(&transport, &request(), &mut transcript, |_, _| {}, &cancel).await;

    assert!(matches!(result, Err(ClientError::Network(_))));
    assert_eq!(assistant_contents(&transcript), vec![(Some(Channel::Response), "partial")]);
}

/// Session statuses settle to match the outcome
#[tokio::test]
async fn test_session_status_tracks_outcome() {
    let transport =
        ScriptedTransport::from_frames(&[content_frame("done"), "[DONE]".to_string()]);
    let mut session = StreamSession::new();
    let mut transcript = Vec::new();
    session
        .run(&transport, &request(), &mut transcript, |_, _| {})
        .await
        .unwrap();
    assert_eq!(session.status(), SessionStatus::Completed);

    let mut aborted = StreamSession::new();
    aborted.abort();
    let outcome = aborted
        .run(&transport, &request(), &mut transcript, |_, _| {})
        .await
        .unwrap();
    assert_eq!(outcome, StreamOutcome::Cancelled);
    assert_eq!(aborted.status(), SessionStatus::Aborted);

    let failing = ScriptedTransport::new(vec![Err(ClientError::Network("boom".to_string()))]);
    let mut failed = StreamSession::new();
    assert!(failed
        .run(&failing, &request(), &mut transcript, |_, _| {})
        .await
        .is_err());
    assert_eq!(failed.status(), SessionStatus::Failed);
}

proptest! {
    /// Run-length invariant: one message per maximal same-channel run,
    /// and only channel switches report `appended`
    #[test]
    fn prop_fold_appends_once_per_channel_run(reasoning_flags in prop::collection::vec(any::<bool>(), 1..64)) {
        let deltas: Vec<Delta> = reasoning_flags
            .iter()
            .map(|&reasoning| Delta {
                text: "x".to_string(),
                channel: if reasoning { Channel::Reasoning } else { Channel::Response },
            })
            .collect();

        let runs = 1 + reasoning_flags.windows(2).filter(|pair| pair[0] != pair[1]).count();

        let mut transcript: Transcript = Vec::new();
        let mut reconciler = Reconciler::new();
        let mut appended = 0;
        for delta in &deltas {
            let FoldResult { appended: did } = reconciler.fold(&mut transcript, delta);
            if did {
                appended += 1;
            }
        }

        prop_assert_eq!(transcript.len(), runs);
        prop_assert_eq!(appended, runs);
    }
}
