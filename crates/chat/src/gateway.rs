use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::controller::RenderAction;
use crate::events::{ChatEnvelope, EventContext, EventDispatcher, HandlerResult};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport failed to connect: {0}")]
    Connect(String),
    #[error("transport read failed: {0}")]
    Receive(String),
    #[error("transport disconnect failed: {0}")]
    Disconnect(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("message send failed: {0}")]
    Send(String),
    #[error("message delete failed: {0}")]
    Delete(String),
    #[error("reaction add failed: {0}")]
    React(String),
}

/// Inbound half of the chat surface.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn connect(&self) -> Result<(), TransportError>;
    async fn next_envelope(&self) -> Result<Option<ChatEnvelope>, TransportError>;
    async fn disconnect(&self) -> Result<(), TransportError>;
}

/// Outbound half of the chat surface.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends `text` to the channel and returns the new message's id.
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<String, DeliveryError>;
    async fn delete_message(&self, channel_id: &str, message_id: &str)
        -> Result<(), DeliveryError>;
    async fn add_reaction(
        &self,
        channel_id: &str,
        message_id: &str,
        emoji: &str,
    ) -> Result<(), DeliveryError>;
}

#[derive(Default)]
pub struct NoopTransport;

#[async_trait]
impl ChatTransport for NoopTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn next_envelope(&self) -> Result<Option<ChatEnvelope>, TransportError> {
        Ok(None)
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct NoopMessenger;

#[async_trait]
impl Messenger for NoopMessenger {
    async fn send_message(&self, _channel_id: &str, _text: &str) -> Result<String, DeliveryError> {
        Ok("noop-message-id".to_owned())
    }

    async fn delete_message(
        &self,
        _channel_id: &str,
        _message_id: &str,
    ) -> Result<(), DeliveryError> {
        Ok(())
    }

    async fn add_reaction(
        &self,
        _channel_id: &str,
        _message_id: &str,
        _emoji: &str,
    ) -> Result<(), DeliveryError> {
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_retries: 5, base_delay_ms: 250, max_delay_ms: 5_000 }
    }
}

impl ReconnectPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// Event loop: pulls envelopes off the transport, dispatches them, and
/// executes the resulting render actions through the messenger. Dispatch
/// and delivery failures are logged and never kill the loop.
pub struct GatewayRunner {
    transport: Arc<dyn ChatTransport>,
    messenger: Arc<dyn Messenger>,
    dispatcher: EventDispatcher,
    reconnect_policy: ReconnectPolicy,
}

impl GatewayRunner {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        messenger: Arc<dyn Messenger>,
        dispatcher: EventDispatcher,
        reconnect_policy: ReconnectPolicy,
    ) -> Self {
        Self { transport, messenger, dispatcher, reconnect_policy }
    }

    pub async fn start(&self) -> Result<()> {
        for attempt in 0..=self.reconnect_policy.max_retries {
            match self.connect_and_pump(attempt).await {
                Ok(()) => return Ok(()),
                Err(transport_error) => {
                    warn!(
                        attempt,
                        max_retries = self.reconnect_policy.max_retries,
                        error = %transport_error,
                        "chat transport failed"
                    );

                    if attempt >= self.reconnect_policy.max_retries {
                        warn!(
                            max_retries = self.reconnect_policy.max_retries,
                            "chat transport retries exhausted; continuing process without crash"
                        );
                        return Ok(());
                    }

                    let delay = self.reconnect_policy.backoff(attempt);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Ok(())
    }

    async fn connect_and_pump(&self, attempt: u32) -> Result<(), TransportError> {
        info!(attempt, "opening chat transport connection");
        self.transport.connect().await?;
        info!(attempt, "chat transport connected");

        loop {
            let Some(envelope) = self.transport.next_envelope().await? else {
                info!(attempt, "chat transport stream closed");
                self.transport.disconnect().await?;
                return Ok(());
            };

            let channel_id = envelope.event.channel_id().map(str::to_owned);
            info!(
                event_name = "ingress.chat.envelope_received",
                envelope_id = %envelope.envelope_id,
                event_type = ?envelope.event.event_type(),
                correlation_id = %envelope.envelope_id,
                channel_id = channel_id.as_deref().unwrap_or("unknown"),
                "received chat envelope"
            );

            let context = EventContext { correlation_id: envelope.envelope_id.clone() };
            match self.dispatcher.dispatch(&envelope, &context).await {
                Ok(HandlerResult::Render(actions)) => {
                    let Some(channel_id) = channel_id else {
                        warn!(
                            correlation_id = %context.correlation_id,
                            "render actions for an event without a channel; dropping"
                        );
                        continue;
                    };
                    self.run_actions(&channel_id, actions, &context.correlation_id).await;
                }
                Ok(HandlerResult::Ignored) => {
                    debug!(
                        correlation_id = %context.correlation_id,
                        "envelope ignored by handlers"
                    );
                }
                Err(error) => {
                    warn!(
                        envelope_id = %envelope.envelope_id,
                        correlation_id = %context.correlation_id,
                        error = %error,
                        "event dispatch failed; continuing gateway loop"
                    );
                }
            }
        }
    }

    async fn run_actions(&self, channel_id: &str, actions: Vec<RenderAction>, correlation_id: &str) {
        for action in actions {
            let outcome = match action {
                RenderAction::Post { text, reactions } => {
                    self.post(channel_id, &text, &reactions).await
                }
                RenderAction::Delete { message_id } => {
                    self.messenger.delete_message(channel_id, &message_id).await
                }
            };
            if let Err(error) = outcome {
                warn!(
                    correlation_id,
                    channel_id,
                    error = %error,
                    "render action failed; continuing"
                );
            }
        }
    }

    async fn post(
        &self,
        channel_id: &str,
        text: &str,
        reactions: &[String],
    ) -> Result<(), DeliveryError> {
        let message_id = self.messenger.send_message(channel_id, text).await?;
        for emoji in reactions {
            self.messenger.add_reaction(channel_id, &message_id, emoji).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;

    use async_trait::async_trait;
    use snapshelf_core::store::AlbumStore;
    use snapshelf_db::InMemoryAlbumStore;
    use tokio::sync::Mutex;

    use super::{
        ChatTransport, DeliveryError, GatewayRunner, Messenger, ReconnectPolicy, TransportError,
    };
    use crate::controller::AlbumController;
    use crate::events::{controller_dispatcher, ChatEnvelope, ChatEvent, MessageEvent};

    struct ScriptedTransport {
        state: Mutex<ScriptedState>,
    }

    #[derive(Default)]
    struct ScriptedState {
        connect_results: VecDeque<Result<(), TransportError>>,
        envelopes: VecDeque<Result<Option<ChatEnvelope>, TransportError>>,
        connect_attempts: usize,
    }

    impl ScriptedTransport {
        fn with_script(
            connect_results: Vec<Result<(), TransportError>>,
            envelopes: Vec<Result<Option<ChatEnvelope>, TransportError>>,
        ) -> Self {
            Self {
                state: Mutex::new(ScriptedState {
                    connect_results: connect_results.into(),
                    envelopes: envelopes.into(),
                    connect_attempts: 0,
                }),
            }
        }

        async fn connect_attempts(&self) -> usize {
            self.state.lock().await.connect_attempts
        }
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn connect(&self) -> Result<(), TransportError> {
            let mut state = self.state.lock().await;
            state.connect_attempts += 1;
            state.connect_results.pop_front().unwrap_or(Ok(()))
        }

        async fn next_envelope(&self) -> Result<Option<ChatEnvelope>, TransportError> {
            let mut state = self.state.lock().await;
            state.envelopes.pop_front().unwrap_or(Ok(None))
        }

        async fn disconnect(&self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingMessenger {
        state: Mutex<RecordingState>,
    }

    #[derive(Default)]
    struct RecordingState {
        sent: Vec<(String, String)>,
        reactions: Vec<(String, String)>,
        deleted: Vec<String>,
    }

    impl RecordingMessenger {
        async fn sent(&self) -> Vec<(String, String)> {
            self.state.lock().await.sent.clone()
        }

        async fn reactions(&self) -> Vec<(String, String)> {
            self.state.lock().await.reactions.clone()
        }

        async fn deleted(&self) -> Vec<String> {
            self.state.lock().await.deleted.clone()
        }
    }

    #[async_trait]
    impl Messenger for RecordingMessenger {
        async fn send_message(
            &self,
            channel_id: &str,
            text: &str,
        ) -> Result<String, DeliveryError> {
            let mut state = self.state.lock().await;
            state.sent.push((channel_id.to_owned(), text.to_owned()));
            Ok(format!("m-{}", state.sent.len()))
        }

        async fn delete_message(
            &self,
            _channel_id: &str,
            message_id: &str,
        ) -> Result<(), DeliveryError> {
            let mut state = self.state.lock().await;
            state.deleted.push(message_id.to_owned());
            Ok(())
        }

        async fn add_reaction(
            &self,
            _channel_id: &str,
            message_id: &str,
            emoji: &str,
        ) -> Result<(), DeliveryError> {
            let mut state = self.state.lock().await;
            state.reactions.push((message_id.to_owned(), emoji.to_owned()));
            Ok(())
        }
    }

    fn menu_envelope(envelope_id: &str) -> ChatEnvelope {
        ChatEnvelope {
            envelope_id: envelope_id.to_owned(),
            event: ChatEvent::Message(MessageEvent {
                channel_id: "C1".to_owned(),
                author_is_bot: false,
                text: "!album".to_owned(),
                attachments: Vec::new(),
            }),
        }
    }

    async fn seeded_dispatcher() -> crate::events::EventDispatcher {
        let store = Arc::new(InMemoryAlbumStore::default());
        store.create_album("Albums", "trip").await.expect("create");
        store.create_album("Albums", "pets").await.expect("create");
        controller_dispatcher(Arc::new(AlbumController::new(store, "Albums", "!album")))
    }

    #[tokio::test]
    async fn pumped_envelope_sends_the_menu_and_arms_reactions() {
        let transport =
            Arc::new(ScriptedTransport::with_script(vec![Ok(())], vec![
                Ok(Some(menu_envelope("env-1"))),
                Ok(None),
            ]));
        let messenger = Arc::new(RecordingMessenger::default());

        let runner = GatewayRunner::new(
            transport,
            messenger.clone(),
            seeded_dispatcher().await,
            ReconnectPolicy { max_retries: 0, base_delay_ms: 0, max_delay_ms: 0 },
        );
        runner.start().await.expect("runner should not fail");

        let sent = messenger.sent().await;
        assert_eq!(sent.len(), 2, "menu lines plus the selection prompt");
        assert_eq!(sent[0].0, "C1");
        assert_eq!(sent[1].1, "Pick an album by number!");
        // The prompt is the second message sent, so it gets id m-2.
        assert_eq!(
            messenger.reactions().await,
            vec![("m-2".to_owned(), "1️⃣".to_owned()), ("m-2".to_owned(), "2️⃣".to_owned())]
        );
    }

    #[tokio::test]
    async fn selection_reaction_deletes_the_prompt_and_posts_the_page() {
        let store = Arc::new(InMemoryAlbumStore::default());
        store.create_album("Albums", "trip").await.expect("create");
        store.add_image("Albums", "trip", "https://cdn.example/1.png").await.expect("add");
        let dispatcher =
            controller_dispatcher(Arc::new(AlbumController::new(store, "Albums", "!album")));

        // The prompt is the second message the menu flow sends, so the
        // scripted reaction targets m-2.
        let select = ChatEnvelope {
            envelope_id: "env-2".to_owned(),
            event: ChatEvent::ReactionAdded(crate::events::ReactionEvent {
                channel_id: "C1".to_owned(),
                message_id: "m-2".to_owned(),
                emoji: "1️⃣".to_owned(),
                reactor_is_bot: false,
                message_author_is_bot: true,
            }),
        };
        let transport = Arc::new(ScriptedTransport::with_script(vec![Ok(())], vec![
            Ok(Some(menu_envelope("env-1"))),
            Ok(Some(select)),
            Ok(None),
        ]));
        let messenger = Arc::new(RecordingMessenger::default());

        let runner = GatewayRunner::new(
            transport,
            messenger.clone(),
            dispatcher,
            ReconnectPolicy { max_retries: 0, base_delay_ms: 0, max_delay_ms: 0 },
        );
        runner.start().await.expect("runner should not fail");

        assert_eq!(messenger.deleted().await, vec!["m-2"]);
        let sent = messenger.sent().await;
        let page = &sent.last().expect("page message").1;
        assert!(page.ends_with("Showing images 1-1 of 1"), "got: {page}");
    }

    #[tokio::test]
    async fn reconnects_after_an_initial_connect_failure() {
        let transport = Arc::new(ScriptedTransport::with_script(
            vec![Err(TransportError::Connect("network down".to_owned())), Ok(())],
            vec![Ok(Some(menu_envelope("env-1"))), Ok(None)],
        ));
        let messenger = Arc::new(RecordingMessenger::default());

        let runner = GatewayRunner::new(
            transport.clone(),
            messenger.clone(),
            seeded_dispatcher().await,
            ReconnectPolicy { max_retries: 2, base_delay_ms: 0, max_delay_ms: 0 },
        );
        runner.start().await.expect("runner should not fail");

        assert_eq!(transport.connect_attempts().await, 2);
        assert!(!messenger.sent().await.is_empty());
    }

    #[tokio::test]
    async fn exhausts_retries_without_crashing() {
        let transport = Arc::new(ScriptedTransport::with_script(
            vec![
                Err(TransportError::Connect("fail-1".to_owned())),
                Err(TransportError::Connect("fail-2".to_owned())),
                Err(TransportError::Connect("fail-3".to_owned())),
            ],
            vec![],
        ));

        let runner = GatewayRunner::new(
            transport.clone(),
            Arc::new(RecordingMessenger::default()),
            crate::events::EventDispatcher::new(),
            ReconnectPolicy { max_retries: 2, base_delay_ms: 0, max_delay_ms: 0 },
        );

        runner.start().await.expect("runner should degrade gracefully");
        assert_eq!(transport.connect_attempts().await, 3);
    }

    #[test]
    fn backoff_is_capped_at_the_policy_maximum() {
        let policy = ReconnectPolicy { max_retries: 10, base_delay_ms: 250, max_delay_ms: 5_000 };
        assert_eq!(policy.backoff(0).as_millis(), 250);
        assert_eq!(policy.backoff(1).as_millis(), 500);
        assert_eq!(policy.backoff(10).as_millis(), 5_000);
    }
}
