//! Streaming chat printer
//!
//! Writes each fragment as soon as it arrives. Ctrl-C stops the chat on the
//! middleware and keeps whatever text was already received.

use sb_application::{ChatReply, ChatStream, ClientError};
use sb_domain::ChatPhase;
use std::future::Future;
use std::io::{Stdout, Write};

/// Prints a chat reply while it streams in
pub struct ChatPrinter<W: Write> {
    out: W,
}

impl ChatPrinter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ChatPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Stream `chat` to the output until it ends, fails or Ctrl-C is pressed.
    pub async fn print(&mut self, chat: ChatStream) -> Result<ChatReply, ClientError> {
        self.print_until(chat, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    }

    /// Stream `chat` until it ends, fails or `interrupt` resolves.
    pub async fn print_until<I>(
        &mut self,
        mut chat: ChatStream,
        interrupt: I,
    ) -> Result<ChatReply, ClientError>
    where
        I: Future<Output = ()>,
    {
        tokio::pin!(interrupt);
        loop {
            tokio::select! {
                biased;

                _ = &mut interrupt => {
                    self.write("\n^C\n");
                    chat.stop().await?;
                    // Interrupted while a read failure was being handled
                    if chat.phase() == ChatPhase::Failed {
                        let message = chat
                            .state()
                            .last_error()
                            .unwrap_or("chat stream failed")
                            .to_string();
                        return Err(ClientError::Stream { message });
                    }
                    break;
                }
                fragment = chat.next_fragment() => match fragment {
                    Some(Ok(text)) => self.write(&text),
                    Some(Err(e)) => {
                        self.write("\n");
                        return Err(e);
                    }
                    None => break,
                },
            }
        }

        self.write("\n");
        let state = chat.state();
        Ok(ChatReply {
            session_id: chat.session_id(),
            text: state.text().to_string(),
            fragment_count: state.fragment_count(),
        })
    }

    fn write(&mut self, text: &str) {
        // A closed stdout is not worth failing the chat for
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sb_application::{
        ClientOptions, FragmentStream, GatewayError, MiddlewareClient, MiddlewareGateway,
        StreamFrame,
    };
    use sb_application::{TransferFeed, TransferFrame};
    use sb_domain::{
        CallTimeout, ChatRequest, DownloadRequest, FileBatch, GenerationParameters, SessionId,
        SetActiveAssistantRequest, SetModelsRequest,
    };
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;

    struct Frames(VecDeque<StreamFrame>);

    #[async_trait]
    impl FragmentStream for Frames {
        async fn next_frame(&mut self) -> Option<StreamFrame> {
            self.0.pop_front()
        }
    }

    struct NoUpdates;

    #[async_trait]
    impl TransferFeed for NoUpdates {
        async fn next_update(&mut self) -> Option<TransferFrame> {
            Some(TransferFrame::End)
        }
    }

    /// Answers `Chat` with a fixed script and counts `StopChat`.
    struct ChatOnlyGateway {
        script: Mutex<Option<Vec<StreamFrame>>>,
        stops: Mutex<usize>,
        stop_entered: Notify,
        hold_stop: bool,
    }

    impl ChatOnlyGateway {
        fn new(script: Vec<StreamFrame>) -> Arc<Self> {
            Self::build(script, false)
        }

        /// `StopChat` never returns.
        fn with_hanging_stop(script: Vec<StreamFrame>) -> Arc<Self> {
            Self::build(script, true)
        }

        fn build(script: Vec<StreamFrame>, hold_stop: bool) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(Some(script)),
                stops: Mutex::new(0),
                stop_entered: Notify::new(),
                hold_stop,
            })
        }
    }

    #[async_trait]
    impl MiddlewareGateway for ChatOnlyGateway {
        async fn say_hello(&self, _: &str, _: CallTimeout) -> Result<String, GatewayError> {
            Ok(String::new())
        }
        async fn say_hello_backend(&self, _: &str, _: CallTimeout) -> Result<String, GatewayError> {
            Ok(String::new())
        }
        async fn get_chat_history(&self, _: CallTimeout) -> Result<String, GatewayError> {
            Ok(String::new())
        }
        async fn get_client_config(&self, _: CallTimeout) -> Result<String, GatewayError> {
            Ok(String::new())
        }
        async fn set_active_assistant(
            &self,
            _: &SetActiveAssistantRequest,
            _: CallTimeout,
        ) -> Result<String, GatewayError> {
            Ok(String::new())
        }
        async fn chat(
            &self,
            _: &ChatRequest,
            _: CallTimeout,
        ) -> Result<Box<dyn FragmentStream>, GatewayError> {
            let script = self.script.lock().unwrap().take().unwrap_or_default();
            Ok(Box::new(Frames(script.into())))
        }
        async fn stop_chat(&self, _: CallTimeout) -> Result<String, GatewayError> {
            *self.stops.lock().unwrap() += 1;
            self.stop_entered.notify_one();
            if self.hold_stop {
                std::future::pending::<()>().await;
            }
            Ok(String::new())
        }
        async fn load_models(&self, _: CallTimeout) -> Result<String, GatewayError> {
            Ok(String::new())
        }
        async fn remove_session(
            &self,
            _: SessionId,
            _: CallTimeout,
        ) -> Result<String, GatewayError> {
            Ok(String::new())
        }
        async fn set_parameters(
            &self,
            _: &GenerationParameters,
            _: CallTimeout,
        ) -> Result<String, GatewayError> {
            Ok(String::new())
        }
        async fn add_files(
            &self,
            _: &FileBatch,
            _: CallTimeout,
        ) -> Result<Box<dyn TransferFeed>, GatewayError> {
            Ok(Box::new(NoUpdates))
        }
        async fn remove_files(
            &self,
            _: &FileBatch,
            _: CallTimeout,
        ) -> Result<String, GatewayError> {
            Ok(String::new())
        }
        async fn get_file_list(&self, _: &str, _: CallTimeout) -> Result<String, GatewayError> {
            Ok(String::new())
        }
        async fn download_files(
            &self,
            _: &DownloadRequest,
            _: CallTimeout,
        ) -> Result<Box<dyn TransferFeed>, GatewayError> {
            Ok(Box::new(NoUpdates))
        }
        async fn set_models(
            &self,
            _: &SetModelsRequest,
            _: CallTimeout,
        ) -> Result<String, GatewayError> {
            Ok(String::new())
        }
        async fn close(&self) -> Result<(), GatewayError> {
            Ok(())
        }
    }

    fn item(text: &str) -> StreamFrame {
        StreamFrame::Item(serde_json::json!({ "message": text }).to_string())
    }

    #[tokio::test]
    async fn test_prints_fragments_in_order() {
        let gateway = ChatOnlyGateway::new(vec![
            item("Hel"),
            item("lo, "),
            item("world"),
            StreamFrame::End,
        ]);
        let client = MiddlewareClient::new(gateway.clone(), ClientOptions::default());
        let chat = client.chat("hi").await.unwrap();

        let mut printer = ChatPrinter::new(Vec::new());
        let reply = printer.print(chat).await.unwrap();

        assert_eq!(reply.text, "Hello, world");
        assert_eq!(reply.fragment_count, 3);
        assert_eq!(String::from_utf8(printer.into_inner()).unwrap(), "Hello, world\n");
        assert_eq!(*gateway.stops.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stream_failure_is_returned_after_partial_output() {
        let gateway = ChatOnlyGateway::new(vec![
            item("Hel"),
            StreamFrame::Error(GatewayError::ConnectionError("reset".to_string())),
        ]);
        let client = MiddlewareClient::new(gateway.clone(), ClientOptions::default());
        let chat = client.chat("hi").await.unwrap();

        let mut printer = ChatPrinter::new(Vec::new());
        let error = printer.print(chat).await.unwrap_err();

        assert!(matches!(error, ClientError::Stream { .. }));
        assert_eq!(String::from_utf8(printer.into_inner()).unwrap(), "Hel\n");
        assert_eq!(*gateway.stops.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_interrupt_during_failure_handling_still_reports_failure() {
        let gateway = ChatOnlyGateway::with_hanging_stop(vec![
            item("Hel"),
            StreamFrame::Error(GatewayError::ConnectionError("reset".to_string())),
        ]);
        let client = MiddlewareClient::new(gateway.clone(), ClientOptions::default());
        let chat = client.chat("hi").await.unwrap();

        let mut printer = ChatPrinter::new(Vec::new());
        let interrupt = {
            let gateway = gateway.clone();
            async move { gateway.stop_entered.notified().await }
        };
        let error = printer.print_until(chat, interrupt).await.unwrap_err();

        assert!(matches!(error, ClientError::Stream { ref message } if message.contains("reset")));
        assert_eq!(*gateway.stops.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_interrupt_keeps_partial_reply() {
        let gateway = ChatOnlyGateway::new(vec![item("Hel")]);
        let client = MiddlewareClient::new(gateway.clone(), ClientOptions::default());
        let mut chat = client.chat("hi").await.unwrap();
        assert_eq!(chat.next_fragment().await, Some(Ok("Hel".to_string())));

        let mut printer = ChatPrinter::new(Vec::new());
        let reply = printer.print_until(chat, async {}).await.unwrap();

        assert_eq!(reply.text, "Hel");
        assert_eq!(*gateway.stops.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_reply() {
        let gateway = ChatOnlyGateway::new(vec![StreamFrame::End]);
        let client = MiddlewareClient::new(gateway, ClientOptions::default());
        let chat = client.chat("hi").await.unwrap();
        assert_eq!(chat.phase(), ChatPhase::Streaming);

        let mut printer = ChatPrinter::new(Vec::new());
        let reply = printer.print(chat).await.unwrap();
        assert!(reply.text.is_empty());
        assert_eq!(reply.fragment_count, 0);
    }
}
