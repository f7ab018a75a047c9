//! Error types for the client state machine.
//!
//! These are caller contract violations, not network failures: gateway and
//! channel errors arrive as data inside events and are resolved into state
//! changes, never returned as `Err`.

use parlor_core::TempId;
use thiserror::Error;

use crate::event::FetchKind;

/// Errors returned when the caller drives the state machine incorrectly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// `Open` arrived for a conversation that already loaded.
    #[error("conversation already open")]
    AlreadyOpen,

    /// An operation needs the initial page before it can run.
    #[error("cannot {operation} before the initial page loaded")]
    NotReady {
        /// Operation that was attempted.
        operation: &'static str,
    },

    /// A post completion referenced no in-flight send.
    #[error("no in-flight send for {temp_id}")]
    UnknownSend {
        /// The unmatched temporary id.
        temp_id: TempId,
    },

    /// A page completion arrived for a fetch that was never issued.
    #[error("no in-flight {kind:?} fetch")]
    UnexpectedFetch {
        /// The unmatched fetch kind.
        kind: FetchKind,
    },

    /// The store returned a conversation that is not a 1:1 thread
    /// containing the local participant.
    #[error("malformed conversation record for {conversation_id}")]
    MalformedConversation {
        /// The offending conversation id.
        conversation_id: String,
    },
}
