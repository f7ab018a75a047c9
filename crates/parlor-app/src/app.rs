//! View state machine.
//!
//! [`App`] manages the interactive state of the conversation screen,
//! completely decoupled from I/O and sync mechanics: scroll position,
//! the unread badge, the compose field, and the connection indicator.
//!
//! It is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.

use parlor_client::SendFailure;

use crate::{AppAction, AppEvent, ConnectionIndicator, Notice, Viewport};

/// Scroll distance from the top that triggers backward paging.
pub const TOP_THRESHOLD_PX: u32 = 100;

/// Scroll distance from the bottom within which the viewer counts as
/// pinned to the newest message.
pub const BOTTOM_THRESHOLD_PX: u32 = 50;

/// Unread counts above this render as a capped badge.
const BADGE_CAP: u32 = 9;

/// View state machine for one conversation screen.
///
/// No I/O dependencies. Fully testable in simulation.
#[derive(Debug, Clone, Default)]
pub struct App {
    /// Viewer position within the transcript.
    viewport: Viewport,
    /// Messages arrived while scrolled up.
    unread: u32,
    /// Compose field content.
    compose: String,
    /// Initial page applied.
    loaded: bool,
    /// The one-time instant scroll on first load already happened.
    did_initial_scroll: bool,
    /// Connection indicator.
    connection: ConnectionIndicator,
    /// Current notice. `None` if nothing to show.
    notice: Option<Notice>,
    /// Transient status line. `None` if no message.
    status: Option<String>,
}

impl App {
    /// Create a view in its pre-load state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Viewer position within the transcript.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Badge text for the unread counter. `None` when nothing is unread;
    /// counts above the cap render as `+9`.
    pub fn unread_badge(&self) -> Option<String> {
        match self.unread {
            0 => None,
            n if n <= BADGE_CAP => Some(n.to_string()),
            _ => Some(format!("+{BADGE_CAP}")),
        }
    }

    /// Compose field content.
    pub fn compose(&self) -> &str {
        &self.compose
    }

    /// Connection indicator.
    pub fn connection(&self) -> ConnectionIndicator {
        self.connection
    }

    /// Current notice, if any.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Transient status line, if any.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Whether the transcript is ready to display.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Start the conversation screen.
    pub fn open(&mut self) -> Vec<AppAction> {
        vec![AppAction::OpenConversation, AppAction::Render]
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Scrolled { top_offset_px, bottom_offset_px } => {
                self.handle_scrolled(top_offset_px, bottom_offset_px)
            },
            AppEvent::ComposeChanged { text } => {
                self.compose = text;
                vec![]
            },
            AppEvent::Submit => self.handle_submit(),
            AppEvent::DismissNotice => {
                self.notice = None;
                vec![AppAction::Render]
            },
            AppEvent::Quit => vec![AppAction::Quit],
            AppEvent::Loaded { count } => self.handle_loaded(count),
            AppEvent::MessageAppended { own } => self.handle_appended(own),
            AppEvent::MessagesPrepended { count } => {
                vec![AppAction::PreserveScrollOffset { prepended: count }, AppAction::Render]
            },
            AppEvent::MessageUpdated => vec![AppAction::Render],
            AppEvent::SendFailed { body, failure } => self.handle_send_failed(body, failure),
            AppEvent::ConnectionChanged { live } => {
                self.connection =
                    if live { ConnectionIndicator::Live } else { ConnectionIndicator::Degraded };
                vec![AppAction::Render]
            },
            AppEvent::ConversationClosed { reason } => {
                self.notice = Some(Notice::ConversationUnavailable { reason });
                vec![AppAction::Render, AppAction::Quit]
            },
            AppEvent::Error { message } => {
                self.status = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    fn handle_scrolled(&mut self, top_offset_px: u32, bottom_offset_px: u32) -> Vec<AppAction> {
        let previous = self.viewport;
        self.viewport = if bottom_offset_px <= BOTTOM_THRESHOLD_PX {
            Viewport::AtBottom
        } else {
            Viewport::ScrolledUp
        };

        let mut actions = Vec::new();

        if top_offset_px <= TOP_THRESHOLD_PX {
            actions.push(AppAction::NearTop);
        }

        if self.viewport == Viewport::AtBottom && previous == Viewport::ScrolledUp {
            self.unread = 0;
            actions.push(AppAction::ViewedBottom);
        }

        if self.viewport != previous {
            actions.push(AppAction::Render);
        }

        actions
    }

    fn handle_submit(&mut self) -> Vec<AppAction> {
        if self.compose.trim().is_empty() {
            return vec![];
        }

        // The field clears immediately; a rollback restores it.
        let body = std::mem::take(&mut self.compose);
        self.notice = None;

        vec![AppAction::SendMessage { body }, AppAction::Render]
    }

    fn handle_loaded(&mut self, count: usize) -> Vec<AppAction> {
        self.loaded = true;
        self.status = Some(format!("{count} messages"));

        let mut actions = Vec::new();
        if !self.did_initial_scroll {
            // One instant jump to the newest message; every later scroll
            // adjustment is smooth.
            self.did_initial_scroll = true;
            self.viewport = Viewport::AtBottom;
            self.unread = 0;
            actions.push(AppAction::ScrollToBottom { smooth: false });
        }
        actions.push(AppAction::Render);
        actions
    }

    fn handle_appended(&mut self, own: bool) -> Vec<AppAction> {
        if own {
            // Sender always follows their own message.
            let was_scrolled_up = self.viewport == Viewport::ScrolledUp;
            self.viewport = Viewport::AtBottom;
            let mut actions = Vec::new();
            if was_scrolled_up && self.unread > 0 {
                self.unread = 0;
                actions.push(AppAction::ViewedBottom);
            }
            actions.push(AppAction::ScrollToBottom { smooth: true });
            actions.push(AppAction::Render);
            return actions;
        }

        match self.viewport {
            Viewport::AtBottom => vec![
                AppAction::ViewedBottom,
                AppAction::ScrollToBottom { smooth: true },
                AppAction::Render,
            ],
            Viewport::ScrolledUp => {
                self.unread = self.unread.saturating_add(1);
                vec![AppAction::Render]
            },
        }
    }

    fn handle_send_failed(&mut self, body: String, failure: SendFailure) -> Vec<AppAction> {
        // Restore the draft unless the viewer already started a new one.
        if self.compose.is_empty() {
            self.compose = body;
        }

        self.notice = Some(match failure {
            SendFailure::EntitlementGate { code } => Notice::UpgradeRequired { code },
            SendFailure::Transient { error } => Notice::SendFailed { message: error.to_string() },
        });

        vec![AppAction::Render]
    }
}
