//! The relay state machine.
//!
//! A [Relay] floods route probes, aggregates candidates at the destination, retraces the
//! cheapest path with a route-ack and forwards the payload along the reserved hops.
mod aggregation;
mod config;
mod events;
mod gas;
mod relay;
#[cfg(test)]
pub mod testing;

pub use aggregation::Aggregation;
pub use config::RelayConfig;
pub use events::{DropReason, RelayEvent, Subscribe};
pub use gas::{FlatCost, GasCost, MessageSizeCost};
pub use relay::*;
