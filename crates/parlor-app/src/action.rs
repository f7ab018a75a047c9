//! View side-effects and intents.
//!
//! [`AppAction`] is the set of instructions produced by the [`crate::App`]
//! state machine for the runtime to execute. Scroll actions go straight to
//! the driver; conversation intents go through the [`crate::Bridge`].

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the screen.
    Render,

    /// Leave the conversation screen.
    Quit,

    /// Jump the transcript to the newest message.
    ScrollToBottom {
        /// Animate the scroll. Instant on first load, smooth afterwards.
        smooth: bool,
    },

    /// Keep the viewer's position stable across a history insertion.
    PreserveScrollOffset {
        /// Messages inserted above the viewport.
        prepended: usize,
    },

    /// Open the conversation and load the newest page.
    OpenConversation,

    /// Send a message.
    SendMessage {
        /// Message body.
        body: String,
    },

    /// The viewer approached the top of loaded history.
    NearTop,

    /// The viewer can see the bottom of the transcript.
    ViewedBottom,
}
