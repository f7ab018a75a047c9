//! Sync-client-to-view translation layer.
//!
//! The [`Bridge`] wraps the low-level [`parlor_client::Client`] and adapts
//! it to the view lifecycle.
//!
//! # Responsibilities
//!
//! - Converts view intents ([`crate::AppAction`]) into sync client events.
//! - Accumulates outgoing gateway requests and channel publishes for the
//!   driver to perform in the next I/O cycle.
//! - Interprets client actions and converts them back into
//!   [`crate::AppEvent`]s to update the view.

use parlor_client::{
    Client, ClientAction, ClientEvent, Environment, GatewayRequest, LocalIdentity, Message, Seq,
};
use parlor_core::Participant;
use parlor_proto::BroadcastEvent;

use crate::{AppAction, AppEvent};

/// Side effect for the driver to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Call the message store.
    Gateway(GatewayRequest),
    /// Publish on the conversation's broadcast channel.
    Publish(BroadcastEvent),
}

/// Render-time snapshot of the conversation as the sync client holds it.
#[derive(Debug, Clone, Copy)]
pub struct Transcript<'a> {
    /// Messages in display order.
    pub messages: &'a [Message],
    /// The other participant (name, photo, presence), once loaded.
    pub peer: Option<&'a Participant>,
    /// Peer's last-read marker, for receipt ticks.
    pub peer_last_read: Option<&'a Seq>,
}

/// Bridge between App and the conversation sync client.
///
/// Generic over Environment to support both production and simulation.
pub struct Bridge<E: Environment> {
    client: Client<E>,
    outgoing: Vec<Outbound>,
}

impl<E: Environment> Bridge<E> {
    /// Create a bridge for one conversation.
    pub fn new(env: E, me: LocalIdentity, conversation_id: impl Into<String>) -> Self {
        let client = Client::new(env, me, conversation_id);
        Self { client, outgoing: Vec::new() }
    }

    /// Snapshot the transcript and receipt state for rendering.
    pub fn transcript(&self) -> Transcript<'_> {
        Transcript {
            messages: self.client.messages(),
            peer: self.client.conversation().map(|c| &c.peer),
            peer_last_read: self.client.peer_last_read(),
        }
    }

    /// The underlying sync client, for render-time reads.
    pub fn client(&self) -> &Client<E> {
        &self.client
    }

    /// Process a view intent and return resulting view events.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        match action {
            AppAction::OpenConversation => self.feed(ClientEvent::Open),
            AppAction::SendMessage { body } => self.feed(ClientEvent::SendMessage { body }),
            AppAction::NearTop => self.feed(ClientEvent::NearTop),
            AppAction::ViewedBottom => self.feed(ClientEvent::ViewedBottom),

            AppAction::Render
            | AppAction::Quit
            | AppAction::ScrollToBottom { .. }
            | AppAction::PreserveScrollOffset { .. } => vec![],
        }
    }

    /// Feed a completion, broadcast, or channel status into the client.
    pub fn handle_client_event(&mut self, event: ClientEvent) -> Vec<AppEvent> {
        self.feed(event)
    }

    /// Take pending outgoing side effects.
    pub fn take_outgoing(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outgoing)
    }

    fn feed(&mut self, event: ClientEvent) -> Vec<AppEvent> {
        match self.client.handle(event) {
            Ok(actions) => self.translate(actions),
            Err(e) => vec![AppEvent::Error { message: e.to_string() }],
        }
    }

    fn translate(&mut self, actions: Vec<ClientAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                ClientAction::Request(request) => {
                    self.outgoing.push(Outbound::Gateway(request));
                },
                ClientAction::Publish(event) => {
                    self.outgoing.push(Outbound::Publish(event));
                },
                ClientAction::Loaded { count } => {
                    events.push(AppEvent::Loaded { count });
                },
                ClientAction::Appended { own } => {
                    events.push(AppEvent::MessageAppended { own });
                },
                ClientAction::Prepended { count } => {
                    events.push(AppEvent::MessagesPrepended { count });
                },
                ClientAction::Reconciled { .. } | ClientAction::ReceiptsChanged => {
                    events.push(AppEvent::MessageUpdated);
                },
                ClientAction::SendRolledBack { body, failure } => {
                    events.push(AppEvent::SendFailed { body, failure });
                },
                ClientAction::ConnectionChanged { live } => {
                    events.push(AppEvent::ConnectionChanged { live });
                },
                ClientAction::CloseConversation { reason } => {
                    events.push(AppEvent::ConversationClosed { reason });
                },
                ClientAction::Log { message } => {
                    tracing::debug!(%message, "client");
                },
            }
        }

        events
    }
}
