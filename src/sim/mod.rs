/// Market clock for tick management.
pub mod clock;
pub mod engine;
pub mod kpi;
/// Aggregator → prosumer relationships.
pub mod network;
pub mod population;
/// Per-tick stepping order.
pub mod schedule;
pub mod types;
