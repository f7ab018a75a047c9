//! Message identity and delivery lifecycle.
//!
//! A message is identified by exactly one of two keys at any time: a
//! client-generated temporary id while the post is in flight, or the
//! server-assigned id once the store acknowledged it. Reconciliation swaps
//! the key in place without moving the message in the list.

use std::fmt;

use parlor_proto::{MessageRecord, Role, Seq};
use serde::{Deserialize, Serialize};

/// Client-generated temporary message id.
///
/// 128 random bits drawn from the environment, unique within a session for
/// all practical purposes. Never leaves the client; the store only ever sees
/// the message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TempId(pub u128);

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tmp-{:032x}", self.0)
    }
}

/// Message identity: temporary until acknowledged, server-assigned after.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageId {
    /// Client-generated id of a pending message.
    Temp(TempId),
    /// Server-assigned opaque id.
    Server(String),
}

impl MessageId {
    /// Server id if this message has been acknowledged.
    pub fn server(&self) -> Option<&str> {
        match self {
            Self::Server(id) => Some(id),
            Self::Temp(_) => None,
        }
    }
}

/// Delivery lifecycle of a message in the local list.
///
/// `Pending → Acked` on store acknowledgment. `Pending → Failed` on post
/// failure; failed messages are removed from the list immediately, the
/// variant exists so the transition is explicit rather than a boolean flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delivery {
    /// Posted locally, store has not acknowledged yet.
    Pending,
    /// Store acknowledged and assigned an ordering key.
    Acked {
        /// Store-assigned sequence number.
        seq: Seq,
    },
    /// Post failed; the optimistic entry is rolled back.
    Failed,
}

/// Read-receipt classification for rendering delivery ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receipt {
    /// Single check: sent, not yet acknowledged by the store.
    Sent,
    /// Double check: stored, peer has not read it.
    Delivered,
    /// Highlighted double check: peer's last-read marker covers it.
    Read,
}

/// A message in the local conversation cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Current identity (temporary or server-assigned).
    pub id: MessageId,
    /// Message text.
    pub body: String,
    /// Sender's user id.
    pub sender_id: String,
    /// Sender's display name.
    pub sender_name: String,
    /// Sender's photo URL. `None` if the sender has no photo.
    pub sender_photo: Option<String>,
    /// Sender's participant kind.
    pub sender_role: Role,
    /// Creation time, unix milliseconds. Client wall clock while pending,
    /// replaced by the store's timestamp on acknowledgment.
    pub created_at: i64,
    /// Delivery lifecycle state.
    pub delivery: Delivery,
}

impl Message {
    /// Build a message from a store record (already acknowledged).
    pub fn from_record(record: MessageRecord) -> Self {
        Self {
            id: MessageId::Server(record.id),
            body: record.body,
            sender_id: record.sender_id,
            sender_name: record.sender_name,
            sender_photo: record.sender_photo,
            sender_role: record.sender_role,
            created_at: record.created_at,
            delivery: Delivery::Acked { seq: record.seq },
        }
    }

    /// Store-assigned sequence number. `None` while pending.
    pub fn seq(&self) -> Option<&Seq> {
        match &self.delivery {
            Delivery::Acked { seq } => Some(seq),
            Delivery::Pending | Delivery::Failed => None,
        }
    }

    /// Whether the store has not acknowledged this message yet.
    pub fn is_pending(&self) -> bool {
        matches!(self.delivery, Delivery::Pending)
    }

    /// Classify this message against the peer's last-read marker.
    ///
    /// The relation is closed and non-decreasing: once the marker covers a
    /// seq it never uncovers it, so a message shown as read stays read.
    pub fn receipt(&self, peer_last_read: Option<&Seq>) -> Receipt {
        match self.seq() {
            None => Receipt::Sent,
            Some(seq) => match peer_last_read {
                Some(marker) if seq <= marker => Receipt::Read,
                _ => Receipt::Delivered,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn acked(seq: u64) -> Message {
        Message {
            id: MessageId::Server(format!("m{seq}")),
            body: "hi".into(),
            sender_id: "u1".into(),
            sender_name: "Ana".into(),
            sender_photo: None,
            sender_role: Role::Parent,
            created_at: 0,
            delivery: Delivery::Acked { seq: Seq::from(seq) },
        }
    }

    #[test]
    fn pending_message_is_sent_tick() {
        let msg = Message {
            delivery: Delivery::Pending,
            id: MessageId::Temp(TempId(7)),
            ..acked(1)
        };
        assert_eq!(msg.receipt(Some(&Seq::from(100))), Receipt::Sent);
    }

    #[test]
    fn receipt_against_marker() {
        let msg = acked(5);
        assert_eq!(msg.receipt(None), Receipt::Delivered);
        assert_eq!(msg.receipt(Some(&Seq::from(4))), Receipt::Delivered);
        assert_eq!(msg.receipt(Some(&Seq::from(5))), Receipt::Read);
        assert_eq!(msg.receipt(Some(&Seq::from(6))), Receipt::Read);
    }

    #[test]
    fn receipt_uses_big_integer_comparison() {
        let msg = Message {
            delivery: Delivery::Acked { seq: Seq::parse("9999999999999998").unwrap() },
            ..acked(1)
        };
        let marker = Seq::parse("9999999999999999").unwrap();
        assert_eq!(msg.receipt(Some(&marker)), Receipt::Read);
    }

    #[test]
    fn from_record_is_acked() {
        let record = MessageRecord {
            id: "m1".into(),
            body: "Oi!".into(),
            sender_id: "u1".into(),
            sender_name: "Ana".into(),
            sender_photo: None,
            sender_role: Role::Parent,
            seq: Seq::from(1),
            created_at: 42,
        };
        let msg = Message::from_record(record);
        assert!(!msg.is_pending());
        assert_eq!(msg.id.server(), Some("m1"));
        assert_eq!(msg.seq(), Some(&Seq::from(1)));
    }
}
