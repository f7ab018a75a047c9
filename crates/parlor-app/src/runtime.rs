//! Generic runtime for view orchestration.
//!
//! The Runtime drives the conversation screen's event loop, coordinating
//! between:
//! - [`App`]: view state machine
//! - [`Bridge`]: translation to the sync client
//! - [`Driver`]: platform-specific I/O

use parlor_client::{Environment, LocalIdentity};

use crate::{App, AppAction, AppEvent, Bridge, Driver};

/// Generic runtime that orchestrates App, Bridge, and Driver.
///
/// # Type Parameters
///
/// - `D`: platform-specific I/O driver
/// - `E`: environment for time and temp-id randomness
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    app: App,
    bridge: Bridge<E>,
}

impl<D, E> Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    /// Create a runtime for one conversation.
    pub fn new(driver: D, env: E, me: LocalIdentity, conversation_id: impl Into<String>) -> Self {
        let app = App::new();
        let bridge = Bridge::new(env, me, conversation_id);
        Self { driver, app, bridge }
    }

    /// Run the main event loop.
    ///
    /// Opens the conversation, then alternates between viewer events and
    /// sync client events until the view quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        let actions = self.app.open();
        if self.process_actions(actions).await? {
            self.driver.stop();
            return Ok(());
        }

        loop {
            let should_quit = self.process_cycle().await?;
            if should_quit {
                break;
            }
        }

        self.driver.stop();
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the view should quit.
    async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        if let Some(event) = self.driver.poll_event().await? {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }

        if let Some(event) = self.driver.recv().await {
            let events = self.bridge.handle_client_event(event);
            self.flush_outgoing().await?;
            if self.process_bridge_events(events).await? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending = initial;

        while !pending.is_empty() {
            for action in std::mem::take(&mut pending) {
                match action {
                    AppAction::Render => {
                        self.driver.render(&self.app, &self.bridge.transcript())?;
                    },
                    AppAction::Quit => return Ok(true),
                    AppAction::ScrollToBottom { smooth } => {
                        self.driver.scroll_to_bottom(smooth);
                    },
                    AppAction::PreserveScrollOffset { prepended } => {
                        self.driver.preserve_scroll_offset(prepended);
                    },

                    // Conversation intents go through the bridge
                    intent @ (AppAction::OpenConversation
                    | AppAction::SendMessage { .. }
                    | AppAction::NearTop
                    | AppAction::ViewedBottom) => {
                        let events = self.bridge.process_app_action(intent);
                        for event in events {
                            pending.extend(self.app.handle(event));
                        }
                        self.flush_outgoing().await?;
                    },
                }
            }
        }
        Ok(false)
    }

    /// Process events from Bridge back to App.
    async fn process_bridge_events(&mut self, events: Vec<AppEvent>) -> Result<bool, D::Error> {
        for event in events {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Perform all pending outbound side effects.
    async fn flush_outgoing(&mut self) -> Result<(), D::Error> {
        for outbound in self.bridge.take_outgoing() {
            self.driver.perform(outbound).await?;
        }
        Ok(())
    }

    /// The view state machine.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// The protocol bridge.
    pub fn bridge(&self) -> &Bridge<E> {
        &self.bridge
    }
}
