//! Chat streaming demo
//!
//! Drives the full decode/parse/classify/fold pipeline against a scripted
//! in-process server, so it runs offline. Shows how a turn that
//! interleaves reasoning and response output becomes separate transcript
//! messages while streaming.
//!
//! Run with: cargo run --example chat_demo

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use rivulet_core::openrouter::types::ChatCompletionRequest;
use rivulet_core::openrouter::ClientResult;
use rivulet_core::protocol::{Channel, Message};
use rivulet_core::stream::{ChatTransport, RecordStream, SendRequest, StreamSession};

/// Replays a canned SSE body one chunk per network read
struct ScriptedServer {
    chunks: Vec<&'static str>,
}

#[async_trait]
impl ChatTransport for ScriptedServer {
    async fn open_chat_stream(
        &self,
        _request: &ChatCompletionRequest,
    ) -> ClientResult<RecordStream> {
        let chunks: Vec<ClientResult<Bytes>> = self
            .chunks
            .iter()
            .map(|chunk| Ok(Bytes::from_static(chunk.as_bytes())))
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("rivulet_core=debug")
        .init();

    let server = ScriptedServer {
        chunks: vec![
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"**Reasoning** the user greeted me\"}}]}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\", so I should greet back\"}}]}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hello! How can\"}}]}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" I help you today?\"}}]}\n",
            "data: [DONE]\n",
        ],
    };

    let request = SendRequest {
        model: "deepseek-r1:0528".to_string(),
        system_prompt: "You are a helpful assistant.".to_string(),
        max_tokens: 4096,
    };

    let mut transcript = vec![Message::user("hi there")];
    let mut session = StreamSession::new();

    println!("sending turn (session {})...\n", session.id());

    let outcome = session
        .run(&server, &request, &mut transcript, |delta, fold| {
            let marker = if fold.appended { "new message" } else { "append" };
            println!("  [{marker}] {:?} {:?}", delta.channel, delta.text);
        })
        .await
        .expect("scripted stream cannot fail");

    println!("\noutcome: {outcome:?}, session status: {:?}\n", session.status());

    for message in &transcript {
        let tag = match message.channel {
            Some(Channel::Reasoning) => " (reasoning)",
            Some(Channel::Response) => " (response)",
            None => "",
        };
        println!("{:?}{}: {}", message.role, tag, message.content);
    }
}
