//! Domain model for the Parlor conversation sync client.
//!
//! Pure data types shared by the client state machine and the view layer:
//! message identity and delivery lifecycle, conversation metadata, and the
//! [`env::Environment`] abstraction that decouples protocol logic from
//! system resources for deterministic testing.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
mod conversation;
mod message;

pub use conversation::{Conversation, Participant};
pub use env::Environment;
pub use message::{Delivery, Message, MessageId, Receipt, TempId};
pub use parlor_proto::{Role, Seq};
