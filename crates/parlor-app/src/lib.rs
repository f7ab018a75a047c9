//! View layer for the conversation screen.
//!
//! Pure state machines and a generic runtime for the scroll, badge, and
//! compose behavior of an open conversation, enabling deterministic
//! simulation testing with the same code that runs in production.
//!
//! # Components
//!
//! - [`App`]: view state machine (scroll position, unread badge, compose)
//! - [`Bridge`]: translates view intents to sync client events and back
//! - [`Driver`]: trait for platform-specific I/O
//! - [`Runtime`]: generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
mod driver;
mod event;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::{App, BOTTOM_THRESHOLD_PX, TOP_THRESHOLD_PX};
pub use bridge::{Bridge, Outbound, Transcript};
pub use driver::Driver;
pub use event::AppEvent;
pub use runtime::Runtime;
pub use state::{ConnectionIndicator, Notice, Viewport};
