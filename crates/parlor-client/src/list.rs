//! Ordered message arena with identity-keyed lookup.
//!
//! Messages live in a `Vec` in arrival/creation order; a side index maps
//! each identity (temporary or server) to its position. Reconciliation swaps
//! a temporary key for a server key at the same position, so acknowledgment
//! order can never reorder the visible list.

use std::collections::HashMap;

use parlor_core::{Message, MessageId, TempId};

/// Index key over both identity forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Key {
    Temp(TempId),
    Server(String),
}

impl Key {
    fn of(id: &MessageId) -> Self {
        match id {
            MessageId::Temp(t) => Self::Temp(*t),
            MessageId::Server(s) => Self::Server(s.clone()),
        }
    }
}

/// The in-memory message list for one open conversation.
#[derive(Debug, Default)]
pub struct MessageList {
    entries: Vec<Message>,
    index: HashMap<Key, usize>,
}

impl MessageList {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list holds no messages.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Messages in arrival/creation order.
    pub fn messages(&self) -> &[Message] {
        &self.entries
    }

    /// Whether a message with this server id is present.
    pub fn contains_server(&self, id: &str) -> bool {
        self.index.contains_key(&Key::Server(id.to_string()))
    }

    /// Whether a pending message with this temporary id is present.
    pub fn contains_temp(&self, temp_id: TempId) -> bool {
        self.index.contains_key(&Key::Temp(temp_id))
    }

    /// Append a message.
    ///
    /// Returns `false` without modifying the list if its identity is already
    /// present (the dedup guarantee for dual arrival paths).
    pub fn push(&mut self, message: Message) -> bool {
        let key = Key::of(&message.id);
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(message);
        true
    }

    /// Prepend an older page, preserving its internal (chronological) order.
    ///
    /// Messages whose identity is already present are skipped. Returns how
    /// many were actually inserted.
    pub fn prepend(&mut self, older: Vec<Message>) -> usize {
        let mut fresh: Vec<Message> = Vec::with_capacity(older.len());
        for message in older {
            let key = Key::of(&message.id);
            if !self.index.contains_key(&key) && !fresh.iter().any(|m| m.id == message.id) {
                fresh.push(message);
            }
        }

        let inserted = fresh.len();
        if inserted == 0 {
            return 0;
        }

        fresh.append(&mut self.entries);
        self.entries = fresh;
        self.reindex();
        inserted
    }

    /// Swap a pending message's temporary key for its server identity, in
    /// place.
    ///
    /// The caller supplies the fully acknowledged replacement; position and
    /// neighbors are untouched. Returns `None` if the temporary id is
    /// unknown.
    pub fn reconcile(&mut self, temp_id: TempId, acked: Message) -> Option<&Message> {
        let position = self.index.remove(&Key::Temp(temp_id))?;
        self.index.insert(Key::of(&acked.id), position);
        self.entries[position] = acked;
        Some(&self.entries[position])
    }

    /// Remove a pending message, returning it for rollback.
    pub fn remove_temp(&mut self, temp_id: TempId) -> Option<Message> {
        let position = self.index.remove(&Key::Temp(temp_id))?;
        let message = self.entries.remove(position);
        self.reindex();
        Some(message)
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (position, message) in self.entries.iter().enumerate() {
            self.index.insert(Key::of(&message.id), position);
        }
    }
}
