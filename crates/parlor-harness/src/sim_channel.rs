//! Simulated broadcast channel.
//!
//! At-least-once fan-out between subscribed endpoints: every publish reaches
//! every endpoint (the publisher included, as real channels echo), may be
//! delivered twice under scripted duplication, and is lost entirely while
//! the channel is down.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use parlor_proto::BroadcastEvent;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Broadcast channel for one conversation.
#[derive(Debug, Clone)]
pub struct SimChannel {
    inner: Arc<Mutex<Broker>>,
}

#[derive(Debug)]
struct Broker {
    rng: ChaCha8Rng,
    /// Percent chance a delivery is duplicated.
    duplicate_percent: u8,
    /// While down, publishes are lost.
    down: bool,
    queues: Vec<VecDeque<BroadcastEvent>>,
}

/// One subscriber's endpoint on the channel.
#[derive(Debug, Clone)]
pub struct SimEndpoint {
    inner: Arc<Mutex<Broker>>,
    index: usize,
}

impl SimChannel {
    /// Create a channel with a fixed default seed.
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Create a channel from an explicit seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Broker {
                rng: ChaCha8Rng::seed_from_u64(seed),
                duplicate_percent: 0,
                down: false,
                queues: Vec::new(),
            })),
        }
    }

    /// Subscribe a new endpoint.
    pub fn endpoint(&self) -> SimEndpoint {
        let index = match self.inner.lock() {
            Ok(mut broker) => {
                broker.queues.push(VecDeque::new());
                broker.queues.len() - 1
            },
            Err(_) => 0,
        };
        SimEndpoint { inner: Arc::clone(&self.inner), index }
    }

    /// Take the channel down. Publishes are lost until it comes back.
    pub fn set_down(&self, down: bool) {
        if let Ok(mut broker) = self.inner.lock() {
            broker.down = down;
        }
    }

    /// Script a percent chance that each delivery arrives twice.
    pub fn set_duplication(&self, percent: u8) {
        if let Ok(mut broker) = self.inner.lock() {
            broker.duplicate_percent = percent.min(100);
        }
    }
}

impl Default for SimChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl SimEndpoint {
    /// Publish to every endpoint on the channel.
    pub fn publish(&self, event: &BroadcastEvent) {
        let Ok(mut broker) = self.inner.lock() else {
            return;
        };
        if broker.down {
            return;
        }

        let duplicate_percent = broker.duplicate_percent;
        for i in 0..broker.queues.len() {
            broker.queues[i].push_back(event.clone());
            if duplicate_percent > 0 {
                let roll: u8 = broker.rng.gen_range(0..100);
                if roll < duplicate_percent {
                    broker.queues[i].push_back(event.clone());
                }
            }
        }
    }

    /// Pop the next delivered event, if any.
    pub fn try_recv(&self) -> Option<BroadcastEvent> {
        self.inner.lock().ok().and_then(|mut broker| broker.queues[self.index].pop_front())
    }
}

#[cfg(test)]
mod tests {
    use parlor_proto::Seq;

    use super::*;

    fn read_status(seq: u64) -> BroadcastEvent {
        BroadcastEvent::ReadStatus { reader_id: "u2".into(), last_read_seq: Seq::from(seq) }
    }

    #[test]
    fn publish_reaches_all_endpoints_including_publisher() {
        let channel = SimChannel::new();
        let a = channel.endpoint();
        let b = channel.endpoint();

        a.publish(&read_status(1));

        assert!(a.try_recv().is_some());
        assert!(b.try_recv().is_some());
        assert!(b.try_recv().is_none());
    }

    #[test]
    fn downtime_loses_events() {
        let channel = SimChannel::new();
        let a = channel.endpoint();
        let b = channel.endpoint();

        channel.set_down(true);
        a.publish(&read_status(1));
        channel.set_down(false);
        a.publish(&read_status(2));

        let only = b.try_recv();
        assert!(matches!(
            only,
            Some(BroadcastEvent::ReadStatus { last_read_seq, .. }) if last_read_seq == Seq::from(2)
        ));
        assert!(b.try_recv().is_none());
    }

    #[test]
    fn full_duplication_doubles_deliveries() {
        let channel = SimChannel::new();
        channel.set_duplication(100);
        let a = channel.endpoint();

        a.publish(&read_status(1));

        assert!(a.try_recv().is_some());
        assert!(a.try_recv().is_some());
        assert!(a.try_recv().is_none());
    }
}
