//! In-memory message store.
//!
//! `SimGateway` plays the REST side of the protocol: it owns the canonical
//! message log, assigns sequence numbers, serves cursor pages, and applies
//! read markers. Faults are scripted per operation so tests can exercise
//! every rejection path deterministically.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use parlor_proto::{
    ConversationPage, ConversationRecord, GatewayError, MarkReadRequest, MarkReadResponse,
    MessageRecord, Pagination, ParticipantRecord, Seq,
};

/// Gateway shared between several simulated clients.
pub type SharedSimGateway = Arc<Mutex<SimGateway>>;

/// Wrap a gateway for sharing between clients.
pub fn create_shared_gateway(gateway: SimGateway) -> SharedSimGateway {
    Arc::new(Mutex::new(gateway))
}

/// In-memory message store for one conversation.
pub struct SimGateway {
    conversation_id: String,
    created_at: i64,
    participants: Vec<ParticipantRecord>,
    /// Canonical log in ascending sequence order.
    messages: Vec<MessageRecord>,
    next_seq: Seq,
    fetch_faults: VecDeque<GatewayError>,
    post_faults: VecDeque<GatewayError>,
    mark_read_faults: VecDeque<GatewayError>,
}

impl SimGateway {
    /// Create a store for one conversation with the given participants.
    pub fn new(conversation_id: impl Into<String>, participants: Vec<ParticipantRecord>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            created_at: 1_700_000_000_000,
            participants,
            messages: Vec::new(),
            next_seq: Seq::from(0),
            fetch_faults: VecDeque::new(),
            post_faults: VecDeque::new(),
            mark_read_faults: VecDeque::new(),
        }
    }

    /// Script the next fetch to fail.
    pub fn fail_next_fetch(&mut self, error: GatewayError) {
        self.fetch_faults.push_back(error);
    }

    /// Script the next post to fail.
    pub fn fail_next_post(&mut self, error: GatewayError) {
        self.post_faults.push_back(error);
    }

    /// Script the next mark-read to fail.
    pub fn fail_next_mark_read(&mut self, error: GatewayError) {
        self.mark_read_faults.push_back(error);
    }

    /// Set a participant's presence flag.
    pub fn set_online(&mut self, user_id: &str, online: bool) {
        for p in &mut self.participants {
            if p.id == user_id {
                p.online = online;
            }
        }
    }

    /// Messages currently in the log.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// A participant's stored state.
    pub fn participant(&self, user_id: &str) -> Option<&ParticipantRecord> {
        self.participants.iter().find(|p| p.id == user_id)
    }

    /// Serve a page ending just before `cursor` (or the newest page when
    /// `cursor` is `None`), at most `limit` messages, ascending.
    pub fn fetch(
        &mut self,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<ConversationPage, GatewayError> {
        if let Some(error) = self.fetch_faults.pop_front() {
            return Err(error);
        }

        let end = match cursor {
            None => self.messages.len(),
            Some(raw) => raw.parse::<usize>().map_err(|_| GatewayError {
                status: 400,
                error: format!("invalid cursor: {raw}"),
                code: Some("INVALID_CURSOR".into()),
            })?,
        };
        let end = end.min(self.messages.len());
        let start = end.saturating_sub(limit as usize);

        Ok(ConversationPage {
            conversation: ConversationRecord {
                id: self.conversation_id.clone(),
                created_at: self.created_at,
                participants: self.participants.clone(),
            },
            messages: self.messages[start..end].to_vec(),
            pagination: Pagination {
                has_more: start > 0,
                next_cursor: (start > 0).then(|| start.to_string()),
            },
        })
    }

    /// Append a message to the log and assign it the next sequence number.
    pub fn post(&mut self, sender_id: &str, body: &str) -> Result<MessageRecord, GatewayError> {
        if let Some(error) = self.post_faults.pop_front() {
            return Err(error);
        }

        let Some(sender) = self.participants.iter().find(|p| p.id == sender_id).cloned() else {
            return Err(GatewayError {
                status: 403,
                error: format!("{sender_id} is not a participant"),
                code: Some("ACCESS_DENIED".into()),
            });
        };

        self.next_seq = self.next_seq.next();
        let record = MessageRecord {
            id: format!("msg-{}", self.next_seq),
            body: body.to_string(),
            sender_id: sender.id,
            sender_name: sender.name,
            sender_photo: sender.photo,
            sender_role: sender.role,
            seq: self.next_seq.clone(),
            created_at: self.created_at + self.messages.len() as i64 + 1,
        };
        self.messages.push(record.clone());
        tracing::debug!(id = %record.id, seq = %record.seq, "stored message");
        Ok(record)
    }

    /// Apply a read marker for `user_id` and return the resulting position.
    ///
    /// Markers only move forward; a stale request answers with the current
    /// marker unchanged.
    pub fn mark_read(
        &mut self,
        user_id: &str,
        request: &MarkReadRequest,
    ) -> Result<MarkReadResponse, GatewayError> {
        if let Some(error) = self.mark_read_faults.pop_front() {
            return Err(error);
        }

        let target: Option<Seq> = match request {
            MarkReadRequest::All { .. } => self.messages.last().map(|m| m.seq.clone()),
            MarkReadRequest::Ids { message_ids } => self
                .messages
                .iter()
                .filter(|m| message_ids.contains(&m.id))
                .map(|m| m.seq.clone())
                .max(),
        };

        let Some(participant) = self.participants.iter_mut().find(|p| p.id == user_id) else {
            return Err(GatewayError {
                status: 403,
                error: format!("{user_id} is not a participant"),
                code: Some("ACCESS_DENIED".into()),
            });
        };

        if let Some(target) = target
            && participant.last_read_seq.as_ref().is_none_or(|current| *current < target)
        {
            tracing::debug!(user = %participant.id, marker = %target, "advanced read marker");
            participant.last_read_seq = Some(target);
        }

        Ok(MarkReadResponse {
            last_read_seq: participant.last_read_seq.clone().unwrap_or_else(|| Seq::from(0)),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parlor_proto::Role;

    use super::*;

    fn participants() -> Vec<ParticipantRecord> {
        vec![
            ParticipantRecord {
                id: "u1".into(),
                name: "Ana".into(),
                photo: None,
                role: Role::Parent,
                last_read_seq: None,
                online: true,
            },
            ParticipantRecord {
                id: "u2".into(),
                name: "Bea".into(),
                photo: None,
                role: Role::Sitter,
                last_read_seq: None,
                online: true,
            },
        ]
    }

    #[test]
    fn post_assigns_increasing_seqs() {
        let mut gw = SimGateway::new("c1", participants());
        let a = gw.post("u1", "one").unwrap();
        let b = gw.post("u2", "two").unwrap();
        assert!(a.seq < b.seq);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn fetch_pages_backwards_with_cursor() {
        let mut gw = SimGateway::new("c1", participants());
        for n in 0..7 {
            gw.post("u1", &format!("m{n}")).unwrap();
        }

        let newest = gw.fetch(None, 3).unwrap();
        assert_eq!(newest.messages.len(), 3);
        assert_eq!(newest.messages[0].body, "m4");
        assert!(newest.pagination.has_more);

        let cursor = newest.pagination.next_cursor.unwrap();
        let older = gw.fetch(Some(&cursor), 3).unwrap();
        assert_eq!(older.messages[0].body, "m1");
        assert!(older.pagination.has_more);

        let cursor = older.pagination.next_cursor.unwrap();
        let oldest = gw.fetch(Some(&cursor), 3).unwrap();
        assert_eq!(oldest.messages.len(), 1);
        assert_eq!(oldest.messages[0].body, "m0");
        assert!(!oldest.pagination.has_more);
        assert!(oldest.pagination.next_cursor.is_none());
    }

    #[test]
    fn mark_read_never_regresses() {
        let mut gw = SimGateway::new("c1", participants());
        let first = gw.post("u2", "a").unwrap();
        let second = gw.post("u2", "b").unwrap();

        let resp = gw
            .mark_read("u1", &MarkReadRequest::Ids { message_ids: vec![second.id.clone()] })
            .unwrap();
        assert_eq!(resp.last_read_seq, second.seq);

        // A stale mark keeps the newer marker.
        let resp =
            gw.mark_read("u1", &MarkReadRequest::Ids { message_ids: vec![first.id] }).unwrap();
        assert_eq!(resp.last_read_seq, second.seq);
    }

    #[test]
    fn scripted_fault_fires_once() {
        let mut gw = SimGateway::new("c1", participants());
        gw.fail_next_post(GatewayError {
            status: 403,
            error: "upgrade required".into(),
            code: Some("PREMIUM_REQUIRED".into()),
        });

        let err = gw.post("u1", "blocked").unwrap_err();
        assert!(err.is_entitlement_gate());
        assert!(gw.post("u1", "fine").is_ok());
        assert_eq!(gw.message_count(), 1);
    }
}
