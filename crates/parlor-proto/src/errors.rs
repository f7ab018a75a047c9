//! Error types for wire contract handling.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while parsing or validating wire data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Sequence number was not a plain decimal string.
    #[error("invalid sequence number: {raw:?}")]
    InvalidSeq {
        /// The rejected input.
        raw: String,
    },
}
