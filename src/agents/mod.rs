//! Market agents: the aggregator and its prosumer customers.

pub mod aggregator;
/// Household consumer model.
pub mod household;
/// Prosumer-side signal storage and realignment.
pub mod intake;
pub mod types;
/// Wind generator model.
pub mod wind;

pub use aggregator::{Aggregator, AggregatorReport};
pub use household::Household;
pub use intake::SignalIntake;
pub use types::{Agent, AgentId, AgentIdentity, IdAllocator, Prosumer, TickContext};
pub use wind::WindGenerator;
