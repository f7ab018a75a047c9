//! View input events.
//!
//! [`AppEvent`] is the full set of inputs that drive the [`crate::App`]
//! state machine. Events originate from two sources: viewer interactions
//! (scroll, compose, submit) and sync-client notifications translated by the
//! [`crate::Bridge`].

use parlor_client::SendFailure;

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Viewer scrolled the transcript.
    ///
    /// Drivers emit one synthetic measurement shortly after the first
    /// render, so a transcript too short to fill the viewport still
    /// triggers history loading.
    Scrolled {
        /// Distance in pixels from the top of the transcript.
        top_offset_px: u32,
        /// Distance in pixels from the bottom of the transcript.
        bottom_offset_px: u32,
    },

    /// Compose field content changed.
    ComposeChanged {
        /// Current field content.
        text: String,
    },

    /// Viewer submitted the compose field.
    Submit,

    /// Viewer dismissed the current notice.
    DismissNotice,

    /// Viewer navigated away.
    Quit,

    /// Initial page applied; the transcript is ready to display.
    Loaded {
        /// Messages now in the transcript.
        count: usize,
    },

    /// A message was appended to the end of the transcript.
    MessageAppended {
        /// Whether the local viewer sent it.
        own: bool,
    },

    /// Older messages were inserted at the start of the transcript.
    MessagesPrepended {
        /// How many were inserted.
        count: usize,
    },

    /// A message changed in place (ack, receipt, presence).
    MessageUpdated,

    /// A send was rolled back.
    SendFailed {
        /// The body that failed, for compose restoration.
        body: String,
        /// Why it failed.
        failure: SendFailure,
    },

    /// Broadcast channel liveness changed.
    ConnectionChanged {
        /// Whether the channel is live.
        live: bool,
    },

    /// The conversation cannot be displayed.
    ConversationClosed {
        /// Reason given by the store.
        reason: String,
    },

    /// A sync client invariant was violated.
    Error {
        /// Error description.
        message: String,
    },
}
