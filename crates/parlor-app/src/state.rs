//! Observable view state types.
//!
//! The subset of conversation state needed for rendering the screen without
//! exposing the sync client's internals.

/// Where the viewer is within the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewport {
    /// Pinned at (or within the bottom threshold of) the newest message.
    #[default]
    AtBottom,
    /// Scrolled up into history.
    ScrolledUp,
}

/// Realtime connection indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionIndicator {
    /// Channel not yet established.
    #[default]
    Connecting,
    /// Broadcast channel live.
    Live,
    /// Channel down; updates arrive on reconnect refresh.
    Degraded,
}

/// Transient notice shown above the compose field. Dismissable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A send failed for a retryable reason.
    SendFailed {
        /// Error description.
        message: String,
    },
    /// A send was refused pending a plan upgrade.
    UpgradeRequired {
        /// Machine-readable refusal code.
        code: String,
    },
    /// The conversation cannot be displayed.
    ConversationUnavailable {
        /// Reason given by the store.
        reason: String,
    },
}
