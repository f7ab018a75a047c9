//! Conversation metadata held by the client.
//!
//! The store owns the conversation record; the client keeps a read-through
//! copy scoped to the currently open conversation, discarded on navigation
//! away.

use parlor_proto::{ConversationRecord, ParticipantRecord, Role, Seq};
use serde::{Deserialize, Serialize};

/// One participant as the client tracks them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// User id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Photo URL. `None` if the participant has no photo.
    pub photo: Option<String>,
    /// Participant kind.
    pub role: Role,
    /// Highest contiguous read seq, monotonically non-decreasing.
    pub last_read_seq: Option<Seq>,
    /// Whether the participant currently has the conversation open.
    pub online: bool,
}

impl Participant {
    /// Advance the last-read marker, never regressing it.
    ///
    /// Updates are commutative and idempotent: applying an older or
    /// duplicate value is a no-op. Returns whether the marker moved.
    pub fn advance_last_read(&mut self, seq: Seq) -> bool {
        match &self.last_read_seq {
            Some(current) if *current >= seq => false,
            _ => {
                self.last_read_seq = Some(seq);
                true
            },
        }
    }
}

impl From<ParticipantRecord> for Participant {
    fn from(record: ParticipantRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            photo: record.photo,
            role: record.role,
            last_read_seq: record.last_read_seq,
            online: record.online,
        }
    }
}

/// A 1:1 conversation between exactly two participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Conversation id (the broadcast topic key).
    pub id: String,
    /// Creation time, unix milliseconds.
    pub created_at: i64,
    /// The local participant.
    pub me: Participant,
    /// The other participant.
    pub peer: Participant,
}

impl Conversation {
    /// Split a store record into local and peer sides.
    ///
    /// `None` if the record does not contain exactly two participants with
    /// `my_id` among them; such a record is malformed for a 1:1 thread.
    pub fn from_record(record: ConversationRecord, my_id: &str) -> Option<Self> {
        let [a, b] = <[ParticipantRecord; 2]>::try_from(record.participants).ok()?;

        let (mine, theirs) = if a.id == my_id {
            (a, b)
        } else if b.id == my_id {
            (b, a)
        } else {
            return None;
        };

        Some(Self {
            id: record.id,
            created_at: record.created_at,
            me: mine.into(),
            peer: theirs.into(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record() -> ConversationRecord {
        ConversationRecord {
            id: "c1".into(),
            created_at: 0,
            participants: vec![
                ParticipantRecord {
                    id: "u1".into(),
                    name: "Ana".into(),
                    photo: None,
                    role: Role::Parent,
                    last_read_seq: Some(Seq::from(3)),
                    online: true,
                },
                ParticipantRecord {
                    id: "u2".into(),
                    name: "Bea".into(),
                    photo: None,
                    role: Role::Sitter,
                    last_read_seq: None,
                    online: false,
                },
            ],
        }
    }

    #[test]
    fn splits_me_and_peer_either_way() {
        let as_u1 = Conversation::from_record(record(), "u1").unwrap();
        assert_eq!(as_u1.me.id, "u1");
        assert_eq!(as_u1.peer.id, "u2");

        let as_u2 = Conversation::from_record(record(), "u2").unwrap();
        assert_eq!(as_u2.me.id, "u2");
        assert_eq!(as_u2.peer.id, "u1");
    }

    #[test]
    fn rejects_foreign_conversation() {
        assert!(Conversation::from_record(record(), "u9").is_none());
    }

    #[test]
    fn rejects_wrong_arity() {
        let mut rec = record();
        rec.participants.pop();
        assert!(Conversation::from_record(rec, "u1").is_none());
    }

    #[test]
    fn last_read_never_regresses() {
        let mut conv = Conversation::from_record(record(), "u1").unwrap();

        assert!(conv.me.advance_last_read(Seq::from(5)));
        assert!(!conv.me.advance_last_read(Seq::from(4)));
        assert!(!conv.me.advance_last_read(Seq::from(5)));
        assert_eq!(conv.me.last_read_seq, Some(Seq::from(5)));

        // First marker on a fresh participant.
        assert!(conv.peer.advance_last_read(Seq::from(1)));
        assert_eq!(conv.peer.last_read_seq, Some(Seq::from(1)));
    }
}
