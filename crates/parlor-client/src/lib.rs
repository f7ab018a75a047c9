//! Conversation synchronization client.
//!
//! Event-based state machine that keeps a single two-party conversation
//! consistent across its own optimistic local state, the REST message store,
//! and the broadcast channel shared with the peer.
//!
//! # Architecture
//!
//! The client is sans-IO: it receives events ([`ClientEvent`]), processes
//! them through pure state machine logic, and returns actions
//! ([`ClientAction`]) for the caller to execute. Network completions come
//! back as further events. This makes every interleaving of overlapping
//! asynchronous operations directly testable.
//!
//! # Components
//!
//! - [`Client`]: top-level state machine for one open conversation
//! - [`MessageList`]: ordered message arena with identity-keyed dedup
//! - [`ClientEvent`]: events fed into the client
//! - [`ClientAction`]: actions produced by the client

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod error;
mod event;
mod list;

pub use client::{Client, LocalIdentity, MAX_BODY_LEN};
pub use error::ClientError;
pub use event::{ClientAction, ClientEvent, FetchKind, GatewayRequest, SendFailure};
pub use list::MessageList;
pub use parlor_core::{Environment, Message, MessageId, Receipt, Role, Seq, TempId};
