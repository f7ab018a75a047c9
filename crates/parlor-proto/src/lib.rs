//! Wire contracts for the Parlor conversation sync protocol.
//!
//! A conversation is synchronized through two external collaborators, both
//! consumed through typed JSON contracts defined here:
//!
//! - The **Message Store Gateway**: REST endpoints for fetching a page of
//!   messages, posting a new message, and marking messages read.
//! - The **Broadcast Channel**: a topic-scoped publish/subscribe transport
//!   keyed by conversation id, used to push new-message and read-receipt
//!   events to the peer with lower latency than polling.
//!
//! Neither transport is owned by this workspace. The types here pin down the
//! contract shape so the client state machine and the simulation harness
//! speak exactly the same language as production drivers.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod broadcast;
pub mod errors;
pub mod gateway;
mod seq;

pub use broadcast::{BroadcastEvent, ChannelStatus};
pub use errors::{ProtocolError, Result};
pub use gateway::{
    ConversationPage, ConversationRecord, GatewayError, MarkReadRequest, MarkReadResponse,
    MessageRecord, PAGE_SIZE, PageRequest, Pagination, ParticipantRecord, PostMessageRequest,
    PostMessageResponse, Role,
};
pub use seq::Seq;
