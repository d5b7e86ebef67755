//! Chat stream consumer.
//!
//! Drives one server-streamed chat reply: decodes fragments, accumulates
//! the text, and on any read failure issues exactly one `StopChat` before
//! surfacing the error.
//!
//! ```text
//! Streaming ──End──▶ Completed
//!     │
//!     ├──read error / bad fragment──▶ Failed ──StopChat ok──▶ Stopped  (Stream)
//!     │                                  └────StopChat err──▶ Failed   (StopCall)
//!     └──stop()──▶ Stopped
//! ```

use crate::error::ClientError;
use crate::ports::middleware_gateway::{FragmentStream, MiddlewareGateway, StreamFrame};
use crate::ports::progress::ProgressNotifier;
use futures::Stream;
use sb_domain::{CallTimeout, ChatFragment, ChatPhase, ChatStreamState, SessionId};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// The final result of a completed chat.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub session_id: SessionId,
    pub text: String,
    pub fragment_count: usize,
}

/// A chat reply being received.
///
/// Lazy and finite: fragments are read only when asked for, and once the
/// stream reaches a terminal phase [`next_fragment`](Self::next_fragment)
/// keeps returning `None`.
pub struct ChatStream {
    gateway: Arc<dyn MiddlewareGateway>,
    frames: Box<dyn FragmentStream>,
    progress: Arc<dyn ProgressNotifier>,
    session_id: SessionId,
    state: ChatStreamState,
}

impl ChatStream {
    pub(crate) fn new(
        gateway: Arc<dyn MiddlewareGateway>,
        frames: Box<dyn FragmentStream>,
        progress: Arc<dyn ProgressNotifier>,
        session_id: SessionId,
    ) -> Self {
        let mut state = ChatStreamState::new();
        state.begin();
        Self {
            gateway,
            frames,
            progress,
            session_id,
            state,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn state(&self) -> &ChatStreamState {
        &self.state
    }

    pub fn phase(&self) -> ChatPhase {
        self.state.phase()
    }

    /// Next non-empty fragment, in arrival order.
    ///
    /// Returns `None` after a clean end of data. A read failure yields one
    /// `Some(Err(..))` and then `None`.
    pub async fn next_fragment(&mut self) -> Option<Result<String, ClientError>> {
        if self.state.is_terminal() {
            return None;
        }

        loop {
            let frame = self.frames.next_frame().await;
            match frame {
                Some(StreamFrame::Item(raw)) => {
                    trace!("Chat {} frame: {}", self.session_id, raw);
                    match ChatFragment::decode(&raw) {
                        Ok(fragment) if fragment.is_empty() => continue,
                        Ok(fragment) => {
                            if self.state.fragment_count() == 0 {
                                self.progress.on_first_fragment();
                            }
                            self.state.push(&fragment.text);
                            return Some(Ok(fragment.text));
                        }
                        Err(e) => return Some(Err(self.abort(e.to_string()).await)),
                    }
                }
                Some(StreamFrame::End) => {
                    debug!(
                        "Chat {} completed after {} fragments",
                        self.session_id,
                        self.state.fragment_count()
                    );
                    self.state.complete();
                    self.progress.on_stream_end(true);
                    return None;
                }
                Some(StreamFrame::Error(e)) => return Some(Err(self.abort(e.to_string()).await)),
                None => {
                    return Some(Err(self
                        .abort("stream closed before end of data".to_string())
                        .await));
                }
            }
        }
    }

    /// Drain the stream, calling `on_fragment` for each fragment as it arrives.
    pub async fn collect_with<F>(mut self, mut on_fragment: F) -> Result<ChatReply, ClientError>
    where
        F: FnMut(&str),
    {
        while let Some(fragment) = self.next_fragment().await {
            on_fragment(&fragment?);
        }
        Ok(self.into_reply())
    }

    /// Drain the stream and return the whole reply.
    pub async fn collect(self) -> Result<ChatReply, ClientError> {
        self.collect_with(|_| {}).await
    }

    /// Cancel the chat: issue `StopChat` and stop reading.
    ///
    /// No-op once the stream is terminal.
    pub async fn stop(&mut self) -> Result<(), ClientError> {
        if self.state.is_terminal() {
            return Ok(());
        }
        debug!("Stopping chat {} on request", self.session_id);
        let result = self.gateway.stop_chat(CallTimeout::Unbounded).await;
        match result {
            Ok(_) => {
                self.state.stopped();
                self.progress.on_stream_end(false);
                Ok(())
            }
            Err(e) => {
                let error = ClientError::from_gateway("StopChat", e);
                self.state.fail(error.to_string());
                self.progress.on_stream_end(false);
                Err(error)
            }
        }
    }

    /// Adapt into a [`futures::Stream`] of fragments.
    pub fn into_stream(self) -> impl Stream<Item = Result<String, ClientError>> + Send {
        futures::stream::unfold(self, |mut chat| async move {
            chat.next_fragment().await.map(|item| (item, chat))
        })
    }

    fn into_reply(self) -> ChatReply {
        ChatReply {
            session_id: self.session_id,
            text: self.state.text().to_string(),
            fragment_count: self.state.fragment_count(),
        }
    }

    async fn abort(&mut self, message: String) -> ClientError {
        warn!("Chat {} stream failed: {}", self.session_id, message);
        self.state.fail(message.clone());

        let stop = self.gateway.stop_chat(CallTimeout::Unbounded).await;
        self.progress.on_stream_end(false);
        match stop {
            Ok(_) => {
                self.state.stopped();
                ClientError::Stream { message }
            }
            Err(e) => {
                warn!("StopChat after stream failure also failed: {}", e);
                ClientError::StopCall {
                    stream: message,
                    stop: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::middleware_gateway::GatewayError;
    use crate::ports::progress::NoProgress;
    use crate::test_support::{ScriptedGateway, fragment};
    use futures::StreamExt;

    async fn open(gateway: Arc<ScriptedGateway>) -> ChatStream {
        let request = sb_domain::ChatRequest::new("test", "hi", SessionId::new(7)).unwrap();
        let frames = gateway
            .chat(&request, CallTimeout::Unbounded)
            .await
            .unwrap();
        ChatStream::new(gateway, frames, Arc::new(NoProgress), SessionId::new(7))
    }

    #[tokio::test]
    async fn test_fragments_forwarded_in_order() {
        let gateway = Arc::new(ScriptedGateway::new().with_stream(vec![
            fragment("Hel"),
            fragment("lo, "),
            fragment("world"),
            StreamFrame::End,
        ]));
        let chat = open(gateway.clone()).await;

        let mut seen = Vec::new();
        let reply = chat
            .collect_with(|f| seen.push(f.to_string()))
            .await
            .unwrap();

        assert_eq!(seen, vec!["Hel", "lo, ", "world"]);
        assert_eq!(reply.text, "Hello, world");
        assert_eq!(reply.fragment_count, 3);
        assert_eq!(reply.session_id, SessionId::new(7));
        assert_eq!(gateway.count("StopChat"), 0);
    }

    #[tokio::test]
    async fn test_empty_message_is_skipped() {
        let gateway = Arc::new(ScriptedGateway::new().with_stream(vec![
            StreamFrame::Item(r#"{"references": []}"#.to_string()),
            fragment("only"),
            StreamFrame::End,
        ]));
        let reply = open(gateway).await.collect().await.unwrap();
        assert_eq!(reply.text, "only");
        assert_eq!(reply.fragment_count, 1);
    }

    #[tokio::test]
    async fn test_read_error_issues_one_stop() {
        let gateway = Arc::new(ScriptedGateway::new().with_stream(vec![
            fragment("Hel"),
            StreamFrame::Error(GatewayError::RequestFailed("connection reset".to_string())),
        ]));
        let mut chat = open(gateway.clone()).await;

        assert_eq!(chat.next_fragment().await, Some(Ok("Hel".to_string())));
        let err = chat.next_fragment().await.unwrap().unwrap_err();

        assert!(matches!(
            err,
            ClientError::Stream { ref message } if message.contains("connection reset")
        ));
        assert_eq!(gateway.count("StopChat"), 1);
        assert_eq!(gateway.timeout_of("StopChat"), Some(CallTimeout::Unbounded));
        assert_eq!(chat.phase(), ChatPhase::Stopped);
        assert_eq!(chat.state().text(), "Hel");

        // Not restartable
        assert_eq!(chat.next_fragment().await, None);
        assert_eq!(gateway.count("StopChat"), 1);
    }

    #[tokio::test]
    async fn test_source_gone_without_end_is_a_failure() {
        let gateway = Arc::new(ScriptedGateway::new().with_stream(vec![fragment("Hel")]));
        let err = open(gateway.clone()).await.collect().await.unwrap_err();
        assert!(matches!(err, ClientError::Stream { .. }));
        assert_eq!(gateway.count("StopChat"), 1);
    }

    #[tokio::test]
    async fn test_undecodable_fragment_goes_through_stop() {
        let gateway = Arc::new(ScriptedGateway::new().with_stream(vec![
            StreamFrame::Item("not json".to_string()),
            StreamFrame::End,
        ]));
        let err = open(gateway.clone()).await.collect().await.unwrap_err();
        assert!(matches!(err, ClientError::Stream { .. }));
        assert_eq!(gateway.count("StopChat"), 1);
    }

    #[tokio::test]
    async fn test_stop_failure_reports_both_errors() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .with_stream(vec![
                    fragment("Hel"),
                    StreamFrame::Error(GatewayError::RequestFailed("connection reset".to_string())),
                ])
                .with_stop_result(Err(GatewayError::TransportClosed)),
        );
        let mut chat = open(gateway.clone()).await;
        chat.next_fragment().await;
        let err = chat.next_fragment().await.unwrap().unwrap_err();

        match err {
            ClientError::StopCall { stream, stop } => {
                assert!(stream.contains("connection reset"));
                assert_eq!(stop, "Transport closed");
            }
            other => panic!("expected StopCall, got {:?}", other),
        }
        assert_eq!(chat.phase(), ChatPhase::Failed);
        assert_eq!(gateway.count("StopChat"), 1);
    }

    #[tokio::test]
    async fn test_explicit_stop() {
        let gateway = Arc::new(
            ScriptedGateway::new().with_stream(vec![fragment("Hel"), fragment("lo")]),
        );
        let mut chat = open(gateway.clone()).await;
        chat.next_fragment().await;

        chat.stop().await.unwrap();
        assert_eq!(chat.phase(), ChatPhase::Stopped);
        assert_eq!(chat.next_fragment().await, None);

        // Second stop is a no-op
        chat.stop().await.unwrap();
        assert_eq!(gateway.count("StopChat"), 1);
    }

    #[derive(Default)]
    struct RecordingProgress(std::sync::Mutex<Vec<String>>);

    impl ProgressNotifier for RecordingProgress {
        fn on_call_start(&self, _operation: &str) {}
        fn on_call_complete(&self, _operation: &str, _success: bool) {}
        fn on_first_fragment(&self) {
            self.0.lock().unwrap().push("first".to_string());
        }
        fn on_stream_end(&self, success: bool) {
            self.0.lock().unwrap().push(format!("end:{}", success));
        }
    }

    #[tokio::test]
    async fn test_progress_hooks_fire_once() {
        let gateway = Arc::new(ScriptedGateway::new().with_stream(vec![
            fragment("a"),
            fragment("b"),
            StreamFrame::End,
        ]));
        let request = sb_domain::ChatRequest::new("test", "hi", SessionId::new(7)).unwrap();
        let frames = gateway
            .chat(&request, CallTimeout::Unbounded)
            .await
            .unwrap();
        let progress = Arc::new(RecordingProgress::default());
        let chat = ChatStream::new(gateway, frames, progress.clone(), SessionId::new(7));

        chat.collect().await.unwrap();
        assert_eq!(*progress.0.lock().unwrap(), vec!["first", "end:true"]);
    }

    #[tokio::test]
    async fn test_into_stream() {
        let gateway = Arc::new(ScriptedGateway::new().with_stream(vec![
            fragment("a"),
            fragment("b"),
            StreamFrame::End,
        ]));
        let items: Vec<_> = open(gateway).await.into_stream().collect().await;
        assert_eq!(items, vec![Ok("a".to_string()), Ok("b".to_string())]);
    }
}
