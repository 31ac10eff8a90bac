//! Core market types: timing configuration and per-tick records.

use std::fmt;

use crate::agents::AgentId;

/// Market timing configuration.
///
/// # Examples
///
/// ```
/// use tariff_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::new(48, 2, 42);
/// assert_eq!(cfg.dt_hours, 0.5);
/// assert_eq!(cfg.total_ticks(), 96);
/// ```
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Ticks in one repeating day.
    pub ticks_per_day: usize,
    /// Number of days to simulate.
    pub days: usize,
    /// Duration of one tick in hours, derived as `24.0 / ticks_per_day`.
    pub dt_hours: f32,
    /// Master random seed for reproducibility.
    pub seed: u64,
}

impl SimConfig {
    /// Creates a new timing configuration.
    ///
    /// # Panics
    ///
    /// Panics if `ticks_per_day` or `days` is zero.
    pub fn new(ticks_per_day: usize, days: usize, seed: u64) -> Self {
        assert!(ticks_per_day > 0, "ticks_per_day must be > 0");
        assert!(days > 0, "days must be > 0");
        Self {
            ticks_per_day,
            days,
            dt_hours: 24.0 / ticks_per_day as f32,
            seed,
        }
    }

    pub fn total_ticks(&self) -> usize {
        self.ticks_per_day * self.days
    }
}

/// What one aggregator did during a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorRecord {
    pub aggregator: AgentId,
    /// Aggregate net demand of its customers (kW).
    pub net_demand_kw: f32,
    /// Price applicable at this tick.
    pub price: f32,
    /// Prosumers that accepted a broadcast this tick, if one was sent.
    pub broadcast_receivers: Option<usize>,
}

/// Complete record of one market tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickRecord {
    pub tick: usize,
    /// Simulation time in hours.
    pub time_hr: f32,
    /// Index of the tick within its day.
    pub time_of_day: usize,
    /// Number of prosumers stepped.
    pub prosumers: usize,
    pub aggregators: Vec<AggregatorRecord>,
}

impl TickRecord {
    /// Sum of all aggregators' net demand (kW).
    pub fn total_demand_kw(&self) -> f32 {
        self.aggregators.iter().map(|a| a.net_demand_kw).sum()
    }

    pub fn broadcast_sent(&self) -> bool {
        self.aggregators
            .iter()
            .any(|a| a.broadcast_receivers.is_some())
    }
}

impl fmt::Display for TickRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>4} ({:>6.1}h) slot={:>3} | prosumers={}",
            self.tick, self.time_hr, self.time_of_day, self.prosumers
        )?;
        for a in &self.aggregators {
            write!(
                f,
                " | {}: demand={:>8.2} kW  price={:>8.2}",
                a.aggregator, a.net_demand_kw, a.price
            )?;
            if let Some(n) = a.broadcast_receivers {
                write!(f, "  broadcast->{n}")?;
            }
        }
        Ok(())
    }
}
