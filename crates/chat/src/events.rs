use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;

use crate::controller::{AlbumController, RenderAction};

/// One inbound unit from the transport, tagged with the transport's own id
/// for log correlation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatEnvelope {
    pub envelope_id: String,
    pub event: ChatEvent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatEvent {
    Message(MessageEvent),
    ReactionAdded(ReactionEvent),
    Unsupported { event_type: String },
}

impl ChatEvent {
    pub fn event_type(&self) -> ChatEventType {
        match self {
            Self::Message(_) => ChatEventType::Message,
            Self::ReactionAdded(_) => ChatEventType::ReactionAdded,
            Self::Unsupported { .. } => ChatEventType::Unsupported,
        }
    }

    /// Channel the event happened in, if it has one.
    pub fn channel_id(&self) -> Option<&str> {
        match self {
            Self::Message(event) => Some(&event.channel_id),
            Self::ReactionAdded(event) => Some(&event.channel_id),
            Self::Unsupported { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChatEventType {
    Message,
    ReactionAdded,
    Unsupported,
}

/// A file attached to a message. Only the filename is inspected by the
/// image check; the url is what gets stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageEvent {
    pub channel_id: String,
    pub author_is_bot: bool,
    pub text: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactionEvent {
    pub channel_id: String,
    /// Message the reaction landed on.
    pub message_id: String,
    pub emoji: String,
    pub reactor_is_bot: bool,
    pub message_author_is_bot: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

/// What a handler decided: actions for the gateway to perform, or nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    Render(Vec<RenderAction>),
    Ignored,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventHandlerError {
    #[error("message handler failure: {0}")]
    Message(String),
    #[error("reaction handler failure: {0}")]
    Reaction(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Handler(#[from] EventHandlerError),
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    fn event_type(&self) -> ChatEventType;
    async fn handle(
        &self,
        envelope: &ChatEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;
}

#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<ChatEventType, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.insert(handler.event_type(), Arc::new(handler));
    }

    pub async fn dispatch(
        &self,
        envelope: &ChatEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, DispatchError> {
        let Some(handler) = self.handlers.get(&envelope.event.event_type()) else {
            return Ok(HandlerResult::Ignored);
        };

        handler.handle(envelope, ctx).await.map_err(DispatchError::from)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

/// Dispatcher with both album handlers registered against one controller.
pub fn controller_dispatcher(controller: Arc<AlbumController>) -> EventDispatcher {
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(MessageEventHandler::new(controller.clone()));
    dispatcher.register(ReactionEventHandler::new(controller));
    dispatcher
}

pub struct MessageEventHandler {
    controller: Arc<AlbumController>,
}

impl MessageEventHandler {
    pub fn new(controller: Arc<AlbumController>) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl EventHandler for MessageEventHandler {
    fn event_type(&self) -> ChatEventType {
        ChatEventType::Message
    }

    async fn handle(
        &self,
        envelope: &ChatEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let ChatEvent::Message(event) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        let actions = self.controller.handle_message(event, ctx).await;
        Ok(into_result(actions))
    }
}

pub struct ReactionEventHandler {
    controller: Arc<AlbumController>,
}

impl ReactionEventHandler {
    pub fn new(controller: Arc<AlbumController>) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl EventHandler for ReactionEventHandler {
    fn event_type(&self) -> ChatEventType {
        ChatEventType::ReactionAdded
    }

    async fn handle(
        &self,
        envelope: &ChatEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let ChatEvent::ReactionAdded(event) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        let actions = self.controller.handle_reaction(event, ctx).await;
        Ok(into_result(actions))
    }
}

fn into_result(actions: Vec<RenderAction>) -> HandlerResult {
    if actions.is_empty() {
        HandlerResult::Ignored
    } else {
        HandlerResult::Render(actions)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use snapshelf_db::InMemoryAlbumStore;

    use super::{
        controller_dispatcher, ChatEnvelope, ChatEvent, EventContext, EventDispatcher,
        HandlerResult, MessageEvent,
    };
    use crate::controller::AlbumController;

    fn controller() -> Arc<AlbumController> {
        Arc::new(AlbumController::new(
            Arc::new(InMemoryAlbumStore::default()),
            "Albums",
            "!album",
        ))
    }

    #[tokio::test]
    async fn dispatcher_routes_commands_to_the_controller() {
        let dispatcher = controller_dispatcher(controller());
        let envelope = ChatEnvelope {
            envelope_id: "env-1".to_owned(),
            event: ChatEvent::Message(MessageEvent {
                channel_id: "C1".to_owned(),
                author_is_bot: false,
                text: "!album help".to_owned(),
                attachments: Vec::new(),
            }),
        };

        let result =
            dispatcher.dispatch(&envelope, &EventContext::default()).await.expect("dispatch");

        assert!(matches!(result, HandlerResult::Render(_)));
    }

    #[tokio::test]
    async fn dispatcher_ignores_event_types_with_no_handler() {
        let dispatcher = EventDispatcher::new();
        let envelope = ChatEnvelope {
            envelope_id: "env-2".to_owned(),
            event: ChatEvent::Unsupported { event_type: "typing_start".to_owned() },
        };

        let result =
            dispatcher.dispatch(&envelope, &EventContext::default()).await.expect("dispatch");

        assert_eq!(result, HandlerResult::Ignored);
    }

    #[tokio::test]
    async fn non_command_chatter_is_ignored() {
        let dispatcher = controller_dispatcher(controller());
        let envelope = ChatEnvelope {
            envelope_id: "env-3".to_owned(),
            event: ChatEvent::Message(MessageEvent {
                channel_id: "C1".to_owned(),
                author_is_bot: false,
                text: "random channel banter".to_owned(),
                attachments: Vec::new(),
            }),
        };

        let result =
            dispatcher.dispatch(&envelope, &EventContext::default()).await.expect("dispatch");

        assert_eq!(result, HandlerResult::Ignored);
    }

    #[test]
    fn controller_dispatcher_registers_both_handlers() {
        let dispatcher = controller_dispatcher(controller());
        assert_eq!(dispatcher.handler_count(), 2);
    }
}
