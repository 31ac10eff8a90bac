//! Tick-discretized retail energy market with aggregator price signals.

pub mod agents;
/// TOML scenario configuration and market construction.
pub mod config;
pub mod error;
pub mod io;
pub mod pricing;
pub mod signal;
/// Market engine, population, scheduling, and reporting.
pub mod sim;
