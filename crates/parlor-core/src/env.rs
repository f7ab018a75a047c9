//! Environment abstraction for deterministic testing.
//!
//! Decouples the sync logic from system resources (wall clock, randomness).
//! Production drivers use real system time and OS entropy; the simulation
//! harness uses a manually advanced clock and a seeded RNG so every test run
//! is reproducible.

/// Abstract environment providing wall-clock time and randomness.
///
/// Implementations MUST guarantee:
///
/// - `unix_millis()` never goes backwards within one execution context
/// - `random_bytes()` uses cryptographically secure entropy in production
pub trait Environment: Clone + Send + Sync + 'static {
    /// Current wall-clock time in unix milliseconds.
    ///
    /// Used to stamp optimistic messages before the store assigns the
    /// authoritative timestamp.
    fn unix_millis(&self) -> i64;

    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u128`.
    ///
    /// Used for temporary message ids, where 128 bits of randomness makes
    /// in-session collisions practically impossible.
    fn random_u128(&self) -> u128 {
        let mut bytes = [0u8; 16];
        self.random_bytes(&mut bytes);
        u128::from_be_bytes(bytes)
    }
}

/// Test doubles for the environment.
pub mod test_utils {
    use std::sync::{
        Arc,
        atomic::{AtomicI64, AtomicU64, Ordering},
    };

    use super::Environment;

    /// Deterministic environment for unit tests.
    ///
    /// The clock starts at a fixed epoch and only moves when advanced.
    /// Random bytes come from a counter, so consecutive draws are distinct
    /// but reproducible.
    #[derive(Debug, Clone)]
    pub struct MockEnv {
        clock_ms: Arc<AtomicI64>,
        counter: Arc<AtomicU64>,
    }

    impl MockEnv {
        /// Create a mock environment at a fixed start time.
        pub fn new() -> Self {
            Self {
                clock_ms: Arc::new(AtomicI64::new(1_700_000_000_000)),
                counter: Arc::new(AtomicU64::new(1)),
            }
        }

        /// Advance the mock clock.
        pub fn advance_millis(&self, ms: i64) {
            self.clock_ms.fetch_add(ms, Ordering::SeqCst);
        }
    }

    impl Default for MockEnv {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Environment for MockEnv {
        fn unix_millis(&self) -> i64 {
            self.clock_ms.load(Ordering::SeqCst)
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            for chunk in buffer.chunks_mut(8) {
                let n = self.counter.fetch_add(1, Ordering::SeqCst);
                let bytes = n.to_be_bytes();
                let len = chunk.len();
                chunk.copy_from_slice(&bytes[..len]);
            }
        }
    }

}
