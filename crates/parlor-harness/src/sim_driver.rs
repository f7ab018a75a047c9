//! Simulated I/O driver.
//!
//! `SimDriver` implements [`parlor_app::Driver`] against the in-memory
//! store and channel. Gateway calls complete synchronously into an inbox
//! that the runtime drains on its next cycle, which reproduces the
//! completion-as-event shape of the production driver without any real
//! asynchrony.

use std::{
    collections::VecDeque,
    convert::Infallible,
    sync::{Arc, Mutex},
};

use parlor_app::{App, AppEvent, Driver, Outbound, Transcript};
use parlor_client::{ClientEvent, GatewayRequest, LocalIdentity};
use parlor_proto::GatewayError;

use crate::{SharedSimGateway, sim_channel::SimEndpoint};

/// Simulated row height in pixels.
const ROW_PX: u32 = 24;
/// Simulated viewport height in pixels.
const VIEWPORT_PX: u32 = 760;

/// Observations recorded by a [`SimDriver`].
///
/// The runtime consumes the driver, so tests keep a clone of the probe to
/// assert on rendering and scrolling after the run finishes.
#[derive(Debug, Clone, Default)]
pub struct SimProbe {
    inner: Arc<Mutex<ProbeInner>>,
}

#[derive(Debug, Default)]
struct ProbeInner {
    renders: usize,
    transcript_len: usize,
    scrolls: Vec<bool>,
    stopped: bool,
}

impl SimProbe {
    /// Render calls so far.
    pub fn renders(&self) -> usize {
        self.inner.lock().map(|p| p.renders).unwrap_or_default()
    }

    /// Transcript length at the last render.
    pub fn transcript_len(&self) -> usize {
        self.inner.lock().map(|p| p.transcript_len).unwrap_or_default()
    }

    /// Smooth flags of every scroll-to-bottom command, in order.
    pub fn scrolls(&self) -> Vec<bool> {
        self.inner.lock().map(|p| p.scrolls.clone()).unwrap_or_default()
    }

    /// Whether the runtime tore the driver down.
    pub fn is_stopped(&self) -> bool {
        self.inner.lock().map(|p| p.stopped).unwrap_or_default()
    }
}

/// Driver wired to [`SimGateway`](crate::SimGateway) and
/// [`SimChannel`](crate::SimChannel).
pub struct SimDriver {
    me: LocalIdentity,
    gateway: SharedSimGateway,
    endpoint: SimEndpoint,
    viewer_events: VecDeque<AppEvent>,
    inbox: VecDeque<ClientEvent>,
    measured: bool,
    probe: SimProbe,
}

impl SimDriver {
    /// Create a driver for one participant.
    pub fn new(me: LocalIdentity, gateway: SharedSimGateway, endpoint: SimEndpoint) -> Self {
        Self {
            me,
            gateway,
            endpoint,
            viewer_events: VecDeque::new(),
            inbox: VecDeque::new(),
            measured: false,
            probe: SimProbe::default(),
        }
    }

    /// Queue a viewer event for the runtime to poll.
    pub fn queue_viewer_event(&mut self, event: AppEvent) {
        self.viewer_events.push_back(event);
    }

    /// Inject a client event (e.g. a channel status change).
    pub fn push_client_event(&mut self, event: ClientEvent) {
        self.inbox.push_back(event);
    }

    /// A handle to this driver's observations.
    pub fn probe(&self) -> SimProbe {
        self.probe.clone()
    }

    fn call_gateway(&mut self, request: GatewayRequest) {
        let event = match request {
            GatewayRequest::Fetch { kind, cursor, limit } => {
                let result = match self.gateway.lock() {
                    Ok(mut gateway) => gateway.fetch(cursor.as_deref(), limit),
                    Err(_) => Err(store_unavailable()),
                };
                ClientEvent::PageFetched { kind, result }
            },
            GatewayRequest::Post { temp_id, request } => {
                let result = match self.gateway.lock() {
                    Ok(mut gateway) => gateway.post(&self.me.user_id, &request.body),
                    Err(_) => Err(store_unavailable()),
                };
                ClientEvent::PostCompleted { temp_id, result }
            },
            GatewayRequest::MarkRead(request) => {
                let result = match self.gateway.lock() {
                    Ok(mut gateway) => gateway.mark_read(&self.me.user_id, &request),
                    Err(_) => Err(store_unavailable()),
                };
                ClientEvent::MarkReadCompleted { result }
            },
        };
        self.inbox.push_back(event);
    }
}

fn store_unavailable() -> GatewayError {
    GatewayError { status: 500, error: "store unavailable".into(), code: None }
}

impl Driver for SimDriver {
    type Error = Infallible;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        Ok(self.viewer_events.pop_front())
    }

    async fn perform(&mut self, outbound: Outbound) -> Result<(), Self::Error> {
        match outbound {
            Outbound::Gateway(request) => self.call_gateway(request),
            Outbound::Publish(event) => self.endpoint.publish(&event),
        }
        Ok(())
    }

    async fn recv(&mut self) -> Option<ClientEvent> {
        if let Some(event) = self.inbox.pop_front() {
            return Some(event);
        }
        self.endpoint.try_recv().map(ClientEvent::BroadcastReceived)
    }

    fn scroll_to_bottom(&mut self, smooth: bool) {
        if let Ok(mut probe) = self.probe.inner.lock() {
            probe.scrolls.push(smooth);
        }
    }

    fn preserve_scroll_offset(&mut self, _prepended: usize) {}

    fn render(&mut self, app: &App, transcript: &Transcript<'_>) -> Result<(), Self::Error> {
        if let Ok(mut probe) = self.probe.inner.lock() {
            probe.renders += 1;
            probe.transcript_len = transcript.messages.len();
        }
        // Browsers report the scroll position once the initial page paints;
        // emitting it here lets a transcript shorter than the viewport
        // trigger history loading immediately.
        if app.is_loaded() && !self.measured {
            self.measured = true;
            let content_px =
                u32::try_from(transcript.messages.len()).unwrap_or(u32::MAX).saturating_mul(ROW_PX);
            self.viewer_events.push_front(AppEvent::Scrolled {
                top_offset_px: content_px.saturating_sub(VIEWPORT_PX),
                bottom_offset_px: 0,
            });
        }
        Ok(())
    }

    fn stop(&mut self) {
        if let Ok(mut probe) = self.probe.inner.lock() {
            probe.stopped = true;
        }
    }
}
