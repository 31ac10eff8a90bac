//! Common types and traits for market agents.

use std::fmt;

use rand::{Rng, rngs::StdRng};

use crate::signal::BroadcastSignal;

/// Unique identity number of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out agent ids in creation order.
///
/// One allocator is shared by everything built for a scenario, so ids are
/// unique across agent kinds.
///
/// # Examples
///
/// ```
/// use tariff_sim::agents::{AgentId, IdAllocator};
///
/// let mut ids = IdAllocator::default();
/// assert_eq!(ids.allocate(), AgentId(0));
/// assert_eq!(ids.allocate(), AgentId(1));
/// ```
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn allocate(&mut self) -> AgentId {
        let id = AgentId(self.next);
        self.next += 1;
        id
    }
}

/// Id and naming of an agent.
#[derive(Debug, Clone)]
pub struct AgentIdentity {
    id: AgentId,
    kind: &'static str,
    name: Option<String>,
}

impl AgentIdentity {
    /// Creates an identity with no explicit name.
    ///
    /// # Arguments
    ///
    /// * `id` - Allocated id
    /// * `kind` - Base name used until a name is set (e.g. `"household"`)
    pub fn new(id: AgentId, kind: &'static str) -> Self {
        Self {
            id,
            kind,
            name: None,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Explicit name if one was set, otherwise the kind's base name.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.kind)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }
}

impl fmt::Display for AgentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// Clock reading handed to agents on every call.
#[derive(Debug, Clone, Copy)]
pub struct TickContext {
    pub tick: usize,
    /// Ticks per day.
    pub period: usize,
}

impl TickContext {
    pub fn new(tick: usize, period: usize) -> Self {
        Self { tick, period }
    }

    /// Index of the current tick within its day.
    pub fn time_of_day(&self) -> usize {
        self.tick % self.period
    }
}

/// Anything the market can inspect.
pub trait Agent {
    fn identity(&self) -> &AgentIdentity;

    /// Consumption minus generation at the current tick (kW).
    ///
    /// Negative values are net generation.
    fn net_demand(&self) -> f32;
}

/// The capability set an aggregator requires of its customers.
pub trait Prosumer: Agent {
    /// Stores an incoming value signal, realigned to this agent's clock.
    ///
    /// Agents without a smart meter accept the call and keep no state.
    /// Returns `false` only when nothing of the signal is still valid.
    fn receive_value_signal(&mut self, signal: &BroadcastSignal, ctx: &TickContext) -> bool;
}

/// Gaussian noise via the Box-Muller transform.
///
/// Returns 0.0 when `std_dev <= 0`.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f32) -> f32 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f32 = rng.random::<f32>().clamp(1e-6, 1.0);
    let u2: f32 = rng.random::<f32>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
    z0 * std_dev
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn allocator_is_sequential() {
        let mut ids = IdAllocator::default();
        let a = ids.allocate();
        let b = ids.allocate();
        assert_eq!(a, AgentId(0));
        assert_eq!(b, AgentId(1));
    }

    #[test]
    fn name_defaults_to_kind() {
        let mut identity = AgentIdentity::new(AgentId(3), "household");
        assert_eq!(identity.name(), "household");
        identity.set_name("No. 7");
        assert_eq!(identity.name(), "No. 7");
        assert_eq!(identity.to_string(), "household #3");
    }

    #[test]
    fn time_of_day_wraps() {
        assert_eq!(TickContext::new(50, 48).time_of_day(), 2);
        assert_eq!(TickContext::new(48, 48).time_of_day(), 0);
    }

    #[test]
    fn zero_std_noise_is_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(gaussian_noise(&mut rng, 0.0), 0.0);
    }
}
