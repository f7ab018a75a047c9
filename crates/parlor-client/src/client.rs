//! Conversation sync state machine.
//!
//! The `Client` owns the local view of one open conversation: the ordered
//! message list, the backward-paging cursor, and both participants' read
//! markers. It consumes [`ClientEvent`]s and produces [`ClientAction`]s; all
//! I/O (gateway calls, broadcast publish/subscribe) is the caller's job, and
//! completions are fed back in as events. Overlapping operations may finish
//! in any order; every handler is idempotent where the transport allows
//! duplicates.

use std::collections::HashSet;

use parlor_core::{Conversation, Delivery, Environment, Message, MessageId, Seq, TempId};
use parlor_proto::{
    BroadcastEvent, ChannelStatus, ConversationPage, GatewayError, MarkReadRequest,
    MarkReadResponse, MessageRecord, PAGE_SIZE, PostMessageRequest, Role,
};

use crate::{
    error::ClientError,
    event::{ClientAction, ClientEvent, FetchKind, GatewayRequest, SendFailure},
    list::MessageList,
};

/// Maximum message body length in characters. Longer input makes `send` a
/// no-op; the compose control disables itself rather than erroring.
pub const MAX_BODY_LEN: usize = 5000;

/// The local participant's identity and display metadata.
///
/// Carried on optimistic messages and on published `new-message` events so
/// the peer can render without an extra profile fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalIdentity {
    /// User id.
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// Photo URL. `None` if the user has no photo.
    pub photo: Option<String>,
    /// Participant kind.
    pub role: Role,
}

/// Backward-paging cursor state.
#[derive(Debug, Clone, Default)]
struct CursorState {
    has_more: bool,
    next_cursor: Option<String>,
}

/// Client state machine for one open conversation.
///
/// Owned exclusively by the component displaying the conversation; discarded
/// on navigation away and rebuilt from the store on re-entry.
pub struct Client<E: Environment> {
    /// Environment for wall clock and temp-id randomness.
    env: E,

    /// Local participant.
    me: LocalIdentity,

    /// Conversation this client is bound to (the broadcast topic key).
    conversation_id: String,

    /// Ordered message cache.
    messages: MessageList,

    /// Cursor for older history.
    cursor: CursorState,

    /// Page fetch currently in flight. At most one at a time; sends may
    /// overlap freely.
    fetch_in_flight: Option<FetchKind>,

    /// Initial page applied; most operations require this.
    primed: bool,

    /// Temp ids of posts awaiting store acknowledgment.
    sends_in_flight: HashSet<TempId>,

    /// Conversation metadata (both participants) once the initial page
    /// loaded.
    conversation: Option<Conversation>,

    /// Peer read marker observed before the initial page applied.
    early_peer_marker: Option<Seq>,

    /// Last observed channel liveness. `None` until the first status.
    channel_live: Option<bool>,
}

impl<E: Environment> Client<E> {
    /// Create a client bound to one conversation.
    pub fn new(env: E, me: LocalIdentity, conversation_id: impl Into<String>) -> Self {
        Self {
            env,
            me,
            conversation_id: conversation_id.into(),
            messages: MessageList::new(),
            cursor: CursorState::default(),
            fetch_in_flight: None,
            primed: false,
            sends_in_flight: HashSet::new(),
            conversation: None,
            early_peer_marker: None,
            channel_live: None,
        }
    }

    /// Messages in arrival/creation order.
    pub fn messages(&self) -> &[Message] {
        self.messages.messages()
    }

    /// Whether the initial page has been applied.
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// Whether older history remains beyond the loaded window.
    pub fn has_more(&self) -> bool {
        self.cursor.has_more
    }

    /// Conversation metadata. `None` before the initial page.
    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    /// The peer's last-read marker as last observed.
    pub fn peer_last_read(&self) -> Option<&Seq> {
        self.conversation
            .as_ref()
            .and_then(|c| c.peer.last_read_seq.as_ref())
            .or(self.early_peer_marker.as_ref())
    }

    /// The local participant's last-read marker.
    pub fn my_last_read(&self) -> Option<&Seq> {
        self.conversation.as_ref().and_then(|c| c.me.last_read_seq.as_ref())
    }

    /// Process an event and return resulting actions.
    pub fn handle(&mut self, event: ClientEvent) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ClientEvent::Open => self.handle_open(),
            ClientEvent::SendMessage { body } => self.handle_send(&body),
            ClientEvent::NearTop => Ok(self.handle_near_top()),
            ClientEvent::ViewedBottom => Ok(self.handle_viewed_bottom()),
            ClientEvent::PageFetched { kind, result } => self.handle_page(kind, result),
            ClientEvent::PostCompleted { temp_id, result } => self.handle_post(temp_id, result),
            ClientEvent::MarkReadCompleted { result } => Ok(self.handle_mark_read(result)),
            ClientEvent::BroadcastReceived(event) => Ok(self.handle_broadcast(event)),
            ClientEvent::ChannelStatusChanged(status) => Ok(self.handle_channel(status)),
        }
    }

    fn handle_open(&mut self) -> Result<Vec<ClientAction>, ClientError> {
        if self.primed {
            return Err(ClientError::AlreadyOpen);
        }
        if self.fetch_in_flight == Some(FetchKind::Initial) {
            // Open retry while the first fetch is still out.
            return Ok(vec![]);
        }

        self.fetch_in_flight = Some(FetchKind::Initial);

        Ok(vec![
            ClientAction::Request(GatewayRequest::Fetch {
                kind: FetchKind::Initial,
                cursor: None,
                limit: PAGE_SIZE,
            }),
            ClientAction::Log {
                message: format!("Opening conversation {}", self.conversation_id),
            },
        ])
    }

    /// Optimistic send: the pending message is visible before any network
    /// traffic, and exactly one post goes out per accepted call.
    fn handle_send(&mut self, body: &str) -> Result<Vec<ClientAction>, ClientError> {
        if !self.primed {
            return Err(ClientError::NotReady { operation: "send" });
        }

        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed.chars().count() > MAX_BODY_LEN {
            return Ok(vec![]);
        }

        let temp_id = TempId(self.env.random_u128());
        let message = Message {
            id: MessageId::Temp(temp_id),
            body: trimmed.to_string(),
            sender_id: self.me.user_id.clone(),
            sender_name: self.me.name.clone(),
            sender_photo: self.me.photo.clone(),
            sender_role: self.me.role,
            created_at: self.env.unix_millis(),
            delivery: Delivery::Pending,
        };

        self.messages.push(message);
        self.sends_in_flight.insert(temp_id);

        Ok(vec![
            ClientAction::Appended { own: true },
            ClientAction::Request(GatewayRequest::Post {
                temp_id,
                request: PostMessageRequest { body: trimmed.to_string() },
            }),
        ])
    }

    /// Backward paging. Every precondition miss is a silent no-op: the next
    /// qualifying scroll event retries naturally.
    fn handle_near_top(&mut self) -> Vec<ClientAction> {
        if !self.primed || self.fetch_in_flight.is_some() || !self.cursor.has_more {
            return vec![];
        }
        let Some(cursor) = self.cursor.next_cursor.clone() else {
            return vec![];
        };

        self.fetch_in_flight = Some(FetchKind::Older);

        vec![ClientAction::Request(GatewayRequest::Fetch {
            kind: FetchKind::Older,
            cursor: Some(cursor),
            limit: PAGE_SIZE,
        })]
    }

    /// Local view event: the viewer can see the bottom of the list, so every
    /// unread peer message becomes read.
    fn handle_viewed_bottom(&mut self) -> Vec<ClientAction> {
        if !self.primed {
            return vec![];
        }

        let unread: Vec<String> = self
            .messages
            .messages()
            .iter()
            .filter(|m| m.sender_id != self.me.user_id)
            .filter(|m| {
                m.seq().is_some_and(|seq| self.my_last_read().is_none_or(|marker| seq > marker))
            })
            .filter_map(|m| m.id.server().map(str::to_string))
            .collect();

        if unread.is_empty() {
            return vec![];
        }

        vec![ClientAction::Request(GatewayRequest::MarkRead(MarkReadRequest::Ids {
            message_ids: unread,
        }))]
    }

    fn handle_page(
        &mut self,
        kind: FetchKind,
        result: Result<ConversationPage, GatewayError>,
    ) -> Result<Vec<ClientAction>, ClientError> {
        if self.fetch_in_flight != Some(kind) {
            return Err(ClientError::UnexpectedFetch { kind });
        }
        self.fetch_in_flight = None;

        match (kind, result) {
            (FetchKind::Initial, Ok(page)) => self.apply_initial_page(page),
            (FetchKind::Initial, Err(e)) => {
                if e.is_terminal() {
                    return Ok(vec![ClientAction::CloseConversation { reason: e.to_string() }]);
                }
                // Transient: the caller may issue Open again.
                Ok(vec![ClientAction::Log {
                    message: format!("Initial page fetch failed: {e}"),
                }])
            },
            (FetchKind::Older, Ok(page)) => Ok(self.apply_older_page(page)),
            (FetchKind::Older, Err(e)) => {
                // History is best-effort: cursor state untouched, the next
                // qualifying scroll retries.
                Ok(vec![ClientAction::Log { message: format!("Older page fetch failed: {e}") }])
            },
            (FetchKind::Refresh, Ok(page)) => Ok(self.apply_refresh_page(&page)),
            (FetchKind::Refresh, Err(e)) => {
                Ok(vec![ClientAction::Log { message: format!("Refresh fetch failed: {e}") }])
            },
        }
    }

    fn apply_initial_page(
        &mut self,
        page: ConversationPage,
    ) -> Result<Vec<ClientAction>, ClientError> {
        let conversation_id = page.conversation.id.clone();
        let mut conversation = Conversation::from_record(page.conversation, &self.me.user_id)
            .ok_or(ClientError::MalformedConversation { conversation_id })?;

        // Broadcast events may have landed before this page; they are newer
        // than anything in it, so they stay appended after the page content.
        let early = std::mem::replace(&mut self.messages, MessageList::new());

        for record in page.messages {
            self.messages.push(Message::from_record(record));
        }
        for message in early.messages() {
            self.messages.push(message.clone());
        }

        if let Some(marker) = self.early_peer_marker.take() {
            conversation.peer.advance_last_read(marker);
        }

        self.cursor =
            CursorState { has_more: page.pagination.has_more, next_cursor: page.pagination.next_cursor };
        self.conversation = Some(conversation);
        self.primed = true;

        Ok(vec![
            ClientAction::Loaded { count: self.messages.len() },
            ClientAction::Request(GatewayRequest::MarkRead(MarkReadRequest::All {
                mark_all_as_read: true,
            })),
            ClientAction::Log {
                message: format!(
                    "Loaded conversation {} with {} messages",
                    self.conversation_id,
                    self.messages.len()
                ),
            },
        ])
    }

    fn apply_older_page(&mut self, page: ConversationPage) -> Vec<ClientAction> {
        let older: Vec<Message> = page.messages.into_iter().map(Message::from_record).collect();
        let inserted = self.messages.prepend(older);

        self.cursor = CursorState {
            has_more: page.pagination.has_more,
            next_cursor: page.pagination.next_cursor,
        };

        let mut actions = Vec::new();
        if inserted > 0 {
            actions.push(ClientAction::Prepended { count: inserted });
        }
        actions.push(ClientAction::Log {
            message: format!("Prepended {inserted} older messages, has_more={}", self.cursor.has_more),
        });
        actions
    }

    /// Merge the newest page by id after a channel outage: anything the
    /// broadcast missed gets appended, everything known is skipped.
    fn apply_refresh_page(&mut self, page: &ConversationPage) -> Vec<ClientAction> {
        let mut actions = Vec::new();
        let mut merged = 0usize;

        for record in &page.messages {
            if self.messages.contains_server(&record.id) {
                continue;
            }

            let own = record.sender_id == self.me.user_id;

            // An own record may be a send whose ack is still out: the store
            // persisted it before the reconnect. Fold it into the pending
            // copy instead of rendering the same message twice.
            if own && let Some(temp_id) = self.oldest_pending_send(&record.body) {
                if self.messages.reconcile(temp_id, Message::from_record(record.clone())).is_some()
                {
                    merged += 1;
                    actions.push(ClientAction::Reconciled { temp_id, id: record.id.clone() });
                }
                continue;
            }

            if self.messages.push(Message::from_record(record.clone())) {
                merged += 1;
                actions.push(ClientAction::Appended { own });
            }
        }

        if let Some(conversation) = &mut self.conversation {
            for record in &page.conversation.participants {
                if record.id == conversation.peer.id {
                    conversation.peer.online = record.online;
                    if let Some(marker) = record.last_read_seq.clone()
                        && conversation.peer.advance_last_read(marker)
                    {
                        actions.push(ClientAction::ReceiptsChanged);
                    }
                }
            }
        }

        actions.push(ClientAction::Log {
            message: format!("Refreshed newest page after reconnect ({merged} merged)"),
        });
        actions
    }

    /// Temp id of the oldest in-flight send with this body, if any.
    fn oldest_pending_send(&self, body: &str) -> Option<TempId> {
        self.messages.messages().iter().find_map(|m| match m.id {
            MessageId::Temp(temp_id)
                if self.sends_in_flight.contains(&temp_id) && m.body == body =>
            {
                Some(temp_id)
            },
            _ => None,
        })
    }

    fn handle_post(
        &mut self,
        temp_id: TempId,
        result: Result<MessageRecord, GatewayError>,
    ) -> Result<Vec<ClientAction>, ClientError> {
        if !self.sends_in_flight.remove(&temp_id) {
            return Err(ClientError::UnknownSend { temp_id });
        }

        match result {
            Ok(record) => {
                let publish = BroadcastEvent::NewMessage {
                    id: record.id.clone(),
                    body: record.body.clone(),
                    sender_id: record.sender_id.clone(),
                    sender_name: record.sender_name.clone(),
                    sender_photo: record.sender_photo.clone(),
                    sender_role: record.sender_role,
                    seq: record.seq.clone(),
                    created_at: record.created_at,
                };

                if self.messages.contains_server(&record.id) {
                    // A reconnect refresh already merged this record. The
                    // broadcast still has to go out: it is only published on
                    // ack, and the peer may have missed the message entirely.
                    self.messages.remove_temp(temp_id);
                    return Ok(vec![
                        ClientAction::Publish(publish),
                        ClientAction::Log {
                            message: format!("Ack for {} already merged, dropped temp", record.id),
                        },
                    ]);
                }

                let id = record.id.clone();
                self.messages
                    .reconcile(temp_id, Message::from_record(record))
                    .ok_or(ClientError::UnknownSend { temp_id })?;

                Ok(vec![
                    ClientAction::Reconciled { temp_id, id },
                    ClientAction::Publish(publish),
                ])
            },
            Err(error) => {
                let Some(removed) = self.messages.remove_temp(temp_id) else {
                    // A reconnect refresh merged the persisted record even
                    // though the post response was lost; nothing to roll back.
                    return Ok(vec![ClientAction::Log {
                        message: format!("Post response failed after merge: {error}"),
                    }]);
                };
                let body = removed.body;

                let failure = if error.is_entitlement_gate() {
                    SendFailure::EntitlementGate {
                        code: error.code.clone().unwrap_or_default(),
                    }
                } else {
                    SendFailure::Transient { error: error.clone() }
                };

                Ok(vec![
                    ClientAction::SendRolledBack { body, failure },
                    ClientAction::Log { message: format!("Send rolled back: {error}") },
                ])
            },
        }
    }

    fn handle_mark_read(
        &mut self,
        result: Result<MarkReadResponse, GatewayError>,
    ) -> Vec<ClientAction> {
        match result {
            Ok(response) => {
                if let Some(conversation) = &mut self.conversation {
                    conversation.me.advance_last_read(response.last_read_seq.clone());
                }
                vec![ClientAction::Publish(BroadcastEvent::ReadStatus {
                    reader_id: self.me.user_id.clone(),
                    last_read_seq: response.last_read_seq,
                })]
            },
            Err(e) => {
                // The next view event reissues the call; nothing to roll back.
                vec![ClientAction::Log { message: format!("Mark-read failed: {e}") }]
            },
        }
    }

    fn handle_broadcast(&mut self, event: BroadcastEvent) -> Vec<ClientAction> {
        match event {
            BroadcastEvent::NewMessage {
                id,
                body,
                sender_id,
                sender_name,
                sender_photo,
                sender_role,
                seq,
                created_at,
            } => {
                if sender_id == self.me.user_id {
                    // Own echo: the local copy is authoritative.
                    return vec![];
                }
                if self.messages.contains_server(&id) {
                    // At-least-once delivery; duplicates are expected.
                    return vec![];
                }

                let message = Message {
                    id: MessageId::Server(id),
                    body,
                    sender_id,
                    sender_name,
                    sender_photo,
                    sender_role,
                    created_at,
                    delivery: Delivery::Acked { seq },
                };
                self.messages.push(message);

                if self.primed {
                    vec![ClientAction::Appended { own: false }]
                } else {
                    // Picked up by the initial page application.
                    vec![]
                }
            },

            // Pure render-state update: never answers with a network call.
            BroadcastEvent::ReadStatus { reader_id, last_read_seq } => {
                if reader_id == self.me.user_id {
                    if let Some(conversation) = &mut self.conversation {
                        conversation.me.advance_last_read(last_read_seq);
                    }
                    return vec![];
                }

                match &mut self.conversation {
                    Some(conversation) => {
                        if conversation.peer.advance_last_read(last_read_seq) {
                            vec![ClientAction::ReceiptsChanged]
                        } else {
                            vec![]
                        }
                    },
                    None => {
                        if self.early_peer_marker.as_ref().is_none_or(|m| *m < last_read_seq) {
                            self.early_peer_marker = Some(last_read_seq);
                        }
                        vec![]
                    },
                }
            },
        }
    }

    fn handle_channel(&mut self, status: ChannelStatus) -> Vec<ClientAction> {
        let live = status.is_live();
        let previous = self.channel_live.replace(live);

        let mut actions = Vec::new();
        if previous != Some(live) {
            actions.push(ClientAction::ConnectionChanged { live });
        }

        // Recovery after an outage: refetch the newest page and merge by id
        // to cover anything the channel dropped while down.
        if live && previous == Some(false) && self.primed && self.fetch_in_flight.is_none() {
            self.fetch_in_flight = Some(FetchKind::Refresh);
            actions.push(ClientAction::Request(GatewayRequest::Fetch {
                kind: FetchKind::Refresh,
                cursor: None,
                limit: PAGE_SIZE,
            }));
            actions.push(ClientAction::Log {
                message: format!("Channel recovered ({status:?}), refreshing newest page"),
            });
        }

        actions
    }
}
