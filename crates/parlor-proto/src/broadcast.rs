//! Broadcast Channel contracts.
//!
//! The channel is a topic-scoped publish/subscribe transport keyed by
//! conversation id. Delivery is at-least-once and unordered relative to the
//! REST calls, so every consumer of these events must be idempotent.
//!
//! Two event kinds exist: `new-message` (a participant posted) and
//! `read-status` (a participant's last-read marker advanced). The transport
//! also reports its own subscription lifecycle, surfaced to the UI as a
//! non-blocking connection indicator.

use serde::{Deserialize, Serialize};

use crate::{Seq, gateway::Role};

/// Events published on a conversation's broadcast topic.
///
/// The `event` field on the wire discriminates the kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum BroadcastEvent {
    /// A participant posted a message. Published by the sender's client
    /// after the store acknowledged the post, so `id` and `created_at` are
    /// the server-assigned values.
    #[serde(rename_all = "camelCase")]
    NewMessage {
        /// Server-assigned message id.
        id: String,
        /// Message text.
        body: String,
        /// Sender's user id.
        sender_id: String,
        /// Sender's display name.
        sender_name: String,
        /// Sender's photo URL. `None` if the sender has no photo.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender_photo: Option<String>,
        /// Sender's participant kind.
        sender_role: Role,
        /// Store-assigned sequence number.
        seq: Seq,
        /// Creation time, unix milliseconds.
        created_at: i64,
    },

    /// A participant's last-read marker advanced. Receiving this must never
    /// trigger a network call; it is purely a render-state update.
    #[serde(rename_all = "camelCase")]
    ReadStatus {
        /// The participant whose marker advanced.
        reader_id: String,
        /// Their new highest contiguous read sequence number.
        last_read_seq: Seq,
    },
}

/// Subscription lifecycle states reported by the channel transport.
///
/// Anything other than [`ChannelStatus::Subscribed`] degrades the client to
/// poll-on-reopen mode; it never fails the conversation view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelStatus {
    /// Topic subscription is live.
    Subscribed,
    /// Transport reported an error on the channel.
    ChannelError,
    /// Subscription attempt timed out.
    TimedOut,
    /// Channel was closed.
    Closed,
}

impl ChannelStatus {
    /// Whether events are currently flowing.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Subscribed)
    }
}
