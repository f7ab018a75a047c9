//! Deterministic simulation harness for conversation sync testing.
//!
//! In-memory implementations of the message store and the broadcast channel,
//! plus a [`Driver`](parlor_app::Driver) implementation, for deterministic
//! and reproducible testing of the full client and view stack: no network,
//! no wall clock, every fault scripted.
//!
//! # Components
//!
//! - [`SimEnv`]: seeded environment (virtual clock, deterministic randomness)
//! - [`SimGateway`]: in-memory message store with scriptable failures
//! - [`SimChannel`]: at-least-once broadcast fan-out with scriptable
//!   duplication and outages
//! - [`SimDriver`]: wires a runtime to the simulated store and channel

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod sim_channel;
pub mod sim_driver;
pub mod sim_env;
pub mod sim_gateway;

pub use sim_channel::{SimChannel, SimEndpoint};
pub use sim_driver::{SimDriver, SimProbe};
pub use sim_env::SimEnv;
pub use sim_gateway::{SharedSimGateway, SimGateway, create_shared_gateway};
