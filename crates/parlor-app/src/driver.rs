//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the view runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::future::Future;

use parlor_client::ClientEvent;

use crate::{App, AppEvent, Outbound, Transcript};

/// Abstracts I/O operations for the view runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic, so the same
/// orchestration code runs against production HTTP and in simulation.
///
/// # Implementations
///
/// - **Production**: REST calls to the message store, a realtime channel
///   subscription for broadcasts
/// - **Simulation**: an in-memory store and channel with scripted faults
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Poll for the next viewer event.
    ///
    /// Returns the next event or `None` if none are ready.
    fn poll_event(&mut self)
    -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Perform an outbound side effect.
    ///
    /// Gateway calls complete asynchronously; their results come back
    /// through [`recv`](Driver::recv) as client events.
    ///
    /// # Errors
    ///
    /// Returns an error only for unrecoverable transport faults. Gateway
    /// rejections are delivered as completion events, not errors.
    fn perform(&mut self, outbound: Outbound)
    -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Receive the next sync client event: a call completion, a broadcast,
    /// or a channel status change.
    ///
    /// Returns `None` when nothing is pending.
    fn recv(&mut self) -> impl Future<Output = Option<ClientEvent>> + Send;

    /// Jump the transcript viewport to the newest message.
    fn scroll_to_bottom(&mut self, smooth: bool);

    /// Compensate the viewport for messages inserted above it.
    fn preserve_scroll_offset(&mut self, prepended: usize);

    /// Render the view.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App, transcript: &Transcript<'_>) -> Result<(), Self::Error>;

    /// Tear down the channel subscription and clean up resources.
    fn stop(&mut self);
}
