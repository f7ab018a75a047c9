//! Message Store Gateway contracts.
//!
//! JSON request/response bodies for the three store operations the client
//! uses:
//!
//! - `GET  /conversations/{id}?cursor={opaque}&limit={n}` → [`ConversationPage`]
//! - `POST /conversations/{id}/messages` → [`PostMessageResponse`] or 403
//!   [`GatewayError`]
//! - `PATCH /conversations/{id}/messages` → [`MarkReadResponse`]
//!
//! Exact routes are a driver concern; these types pin down the body shapes.
//! Field names follow the store's camelCase convention via serde renames.

use serde::{Deserialize, Serialize};

use crate::Seq;

/// Messages fetched per page. The initial fetch (no cursor) returns the most
/// recent page; subsequent fetches walk backwards through history.
pub const PAGE_SIZE: u32 = 30;

/// Participant kind in a conversation. Exactly two kinds exist; every
/// conversation pairs one of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The hiring side of the marketplace.
    Parent,
    /// The caregiving side of the marketplace.
    Sitter,
}

impl Role {
    /// The other participant kind.
    pub fn peer(self) -> Self {
        match self {
            Self::Parent => Self::Sitter,
            Self::Sitter => Self::Parent,
        }
    }
}

/// A message as the store returns it.
///
/// `seq` is the store-assigned ordering key; `id` is the stable opaque
/// identity used for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    /// Server-assigned opaque id.
    pub id: String,
    /// Message text.
    pub body: String,
    /// Sender's user id.
    pub sender_id: String,
    /// Sender's display name.
    pub sender_name: String,
    /// Sender's photo URL. `None` if the sender has no photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_photo: Option<String>,
    /// Sender's participant kind.
    pub sender_role: Role,
    /// Store-assigned sequence number.
    pub seq: Seq,
    /// Creation time, unix milliseconds.
    pub created_at: i64,
}

/// One side of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRecord {
    /// User id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Photo URL. `None` if the participant has no photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Participant kind.
    pub role: Role,
    /// Highest contiguous sequence number this participant has read.
    /// `None` if nothing read yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_read_seq: Option<Seq>,
    /// Whether the participant currently has the conversation open.
    #[serde(default)]
    pub online: bool,
}

/// Conversation metadata as the store returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    /// Conversation id.
    pub id: String,
    /// Creation time, unix milliseconds.
    pub created_at: i64,
    /// Exactly two participants, one of each [`Role`].
    pub participants: Vec<ParticipantRecord>,
}

/// Backward-paging cursor state returned with every page.
///
/// `next_cursor` is only meaningful while `has_more` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Whether older history exists beyond this page.
    pub has_more: bool,
    /// Opaque boundary token for the next older page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Response body for a page fetch.
///
/// `messages` are in chronological order within the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPage {
    /// Conversation metadata.
    pub conversation: ConversationRecord,
    /// Messages in this page, oldest first.
    pub messages: Vec<MessageRecord>,
    /// Cursor state for further backward paging.
    pub pagination: Pagination,
}

/// Query parameters for a page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Boundary token from a previous page. `None` fetches the newest page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// Maximum messages to return.
    pub limit: u32,
}

/// Request body for posting a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMessageRequest {
    /// Message text, trimmed non-empty.
    pub body: String,
}

/// Response body for a successful post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMessageResponse {
    /// The persisted message with server identity and seq assigned.
    pub message: MessageRecord,
}

/// Request body for marking messages read.
///
/// Both forms are part of the contract: an explicit id list for incremental
/// reads, and mark-all for conversation open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkReadRequest {
    /// Mark the listed message ids read.
    Ids {
        /// Server ids of the messages to mark.
        #[serde(rename = "messageIds")]
        message_ids: Vec<String>,
    },
    /// Mark every visible message read.
    All {
        /// Must be `true`; present for wire compatibility.
        #[serde(rename = "markAllAsRead")]
        mark_all_as_read: bool,
    },
}

/// Response body for a mark-read call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponse {
    /// The caller's resulting last-read sequence number.
    pub last_read_seq: Seq,
}

/// Error envelope the gateway returns on non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayError {
    /// HTTP status code.
    #[serde(skip, default)]
    pub status: u16,
    /// Human-readable description.
    pub error: String,
    /// Machine-readable business code. `None` for plain transport errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Business codes that signal an entitlement gate: the caller's plan does not
/// permit the operation, and an upgrade prompt (not a retry) is the recovery.
const ENTITLEMENT_CODES: &[&str] = &["PREMIUM_REQUIRED", "SUBSCRIPTION_REQUIRED", "TIER_LIMIT"];

/// Business codes that make an open conversation view terminal.
const TERMINAL_CODES: &[&str] = &["NOT_FOUND", "ACCESS_DENIED"];

impl GatewayError {
    /// Whether this is a recognized entitlement gate (403 + business code).
    pub fn is_entitlement_gate(&self) -> bool {
        self.status == 403
            && self.code.as_deref().is_some_and(|c| ENTITLEMENT_CODES.contains(&c))
    }

    /// Whether this error is terminal for the conversation view (the
    /// conversation is gone or the caller may not see it).
    pub fn is_terminal(&self) -> bool {
        self.code.as_deref().is_some_and(|c| TERMINAL_CODES.contains(&c))
            || self.status == 404
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "gateway error {} ({code}): {}", self.status, self.error),
            None => write!(f, "gateway error {}: {}", self.status, self.error),
        }
    }
}

impl std::error::Error for GatewayError {}
