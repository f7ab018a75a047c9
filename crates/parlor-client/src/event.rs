//! Client events and actions.

use parlor_core::TempId;
use parlor_proto::{
    BroadcastEvent, ChannelStatus, ConversationPage, GatewayError, MarkReadRequest,
    MarkReadResponse, MessageRecord, PostMessageRequest,
};

/// Which page fetch a completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// First page on conversation open (newest messages, no cursor).
    Initial,
    /// Backward page of older history.
    Older,
    /// Newest-page refetch after the broadcast channel recovered, merged by
    /// id to pick up anything missed while degraded.
    Refresh,
}

/// Events the caller feeds into the client.
///
/// The caller is responsible for:
/// - Performing gateway requests and feeding completions back
/// - Forwarding broadcast channel events and subscription state changes
/// - Forwarding view intents (send, scrolled near top, viewed bottom)
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// Conversation was opened; fetch the initial page.
    Open,

    /// The viewer wants to send a message.
    ///
    /// Blank or over-length bodies make this a no-op; the view disables the
    /// control rather than surfacing an error.
    SendMessage {
        /// Message text as typed.
        body: String,
    },

    /// Viewport scrolled within the top threshold; load older history.
    NearTop,

    /// Viewport reached the bottom (or the conversation was just brought
    /// into view); mark visible messages read.
    ViewedBottom,

    /// A page fetch completed.
    PageFetched {
        /// Which fetch this answers.
        kind: FetchKind,
        /// Page on success, gateway error envelope on failure.
        result: Result<ConversationPage, GatewayError>,
    },

    /// A message post completed.
    PostCompleted {
        /// Temporary id of the optimistic message.
        temp_id: TempId,
        /// Persisted record on success, error envelope on failure.
        result: Result<MessageRecord, GatewayError>,
    },

    /// A mark-read call completed.
    MarkReadCompleted {
        /// Resulting marker on success, error envelope on failure.
        result: Result<MarkReadResponse, GatewayError>,
    },

    /// An event arrived on the conversation's broadcast topic.
    ///
    /// Delivery is at-least-once and unordered; handling is idempotent.
    BroadcastReceived(BroadcastEvent),

    /// The broadcast subscription changed state.
    ChannelStatusChanged(ChannelStatus),
}

/// Gateway requests the caller executes against the message store.
///
/// All requests are scoped to the conversation the client was opened for;
/// the driver holds that binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayRequest {
    /// Fetch a page of messages.
    Fetch {
        /// Which fetch this is, echoed back in the completion.
        kind: FetchKind,
        /// Boundary token. `None` fetches the newest page.
        cursor: Option<String>,
        /// Maximum messages to return.
        limit: u32,
    },

    /// Post a new message.
    Post {
        /// Temporary id to echo back in the completion.
        temp_id: TempId,
        /// Request body.
        request: PostMessageRequest,
    },

    /// Mark messages read.
    MarkRead(MarkReadRequest),
}

/// Why a send rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendFailure {
    /// The store refused with a recognized entitlement code; show an
    /// upgrade prompt, not a retry affordance.
    EntitlementGate {
        /// The business code (e.g. `PREMIUM_REQUIRED`).
        code: String,
    },
    /// Anything else; retry is the user's explicit re-send.
    Transient {
        /// The gateway error envelope.
        error: GatewayError,
    },
}

/// Actions the client produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Execute a gateway request and feed the completion back.
    Request(GatewayRequest),

    /// Publish an event on the conversation's broadcast topic.
    Publish(BroadcastEvent),

    /// The initial page is in; the view should scroll instantly to the
    /// bottom, exactly once.
    Loaded {
        /// Messages in the list after the initial load.
        count: usize,
    },

    /// A message was appended to the end of the list.
    Appended {
        /// Whether the local participant sent it.
        own: bool,
    },

    /// Older messages were prepended; the view must offset its scroll
    /// position by exactly the height the prepended block introduced.
    Prepended {
        /// How many messages were prepended.
        count: usize,
    },

    /// A pending message was reconciled with its server identity, in place.
    Reconciled {
        /// The temporary id that was replaced.
        temp_id: TempId,
        /// The server-assigned id.
        id: String,
    },

    /// A send rolled back; the view restores the body to the compose field.
    SendRolledBack {
        /// The unsent text.
        body: String,
        /// Why it failed.
        failure: SendFailure,
    },

    /// The peer's read marker advanced; delivery ticks need re-render.
    ReceiptsChanged,

    /// Broadcast channel connectivity changed; surface a non-blocking
    /// indicator, never a hard failure.
    ConnectionChanged {
        /// Whether the subscription is live.
        live: bool,
    },

    /// The conversation cannot be shown (gone or access denied); the view
    /// should navigate back to the conversation list.
    CloseConversation {
        /// Human-readable explanation.
        reason: String,
    },

    /// Log message for debugging.
    Log {
        /// Log message.
        message: String,
    },
}
