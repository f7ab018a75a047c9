//! Seeded simulation environment.
//!
//! Same seed, same run: temp ids and timestamps are fully reproducible, so
//! any failing interleaving can be replayed exactly.

use std::sync::{Arc, Mutex};

use parlor_core::Environment;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic [`Environment`] backed by a seeded RNG and a virtual clock.
///
/// Cloning shares the underlying state, so every client created from the
/// same `SimEnv` draws from one random stream and one clock.
#[derive(Debug, Clone)]
pub struct SimEnv {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug)]
struct Inner {
    rng: ChaCha8Rng,
    now_millis: i64,
}

impl SimEnv {
    /// Create an environment with a fixed default seed.
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Create an environment from an explicit seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                rng: ChaCha8Rng::seed_from_u64(seed),
                now_millis: 1_700_000_000_000,
            })),
        }
    }

    /// Advance the virtual clock.
    pub fn advance_millis(&self, millis: i64) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.now_millis += millis;
        }
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SimEnv {
    fn unix_millis(&self) -> i64 {
        self.inner.lock().map(|inner| inner.now_millis).unwrap_or_default()
    }

    fn random_bytes(&self, buf: &mut [u8]) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.rng.fill_bytes(buf);
        }
    }
}
