//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use tariff_sim::agents::{AgentId, AgentIdentity, Aggregator, Household, WindGenerator};
use tariff_sim::pricing::PricingPolicy;
use tariff_sim::sim::engine::Market;
use tariff_sim::sim::network::Adjacency;
use tariff_sim::sim::population::{Entity, Population};
use tariff_sim::sim::types::SimConfig;

/// Short test day: 4 ticks.
pub const TICKS_PER_DAY: usize = 4;

/// Two 4-tick days, seed 42.
pub fn default_config() -> SimConfig {
    SimConfig::new(TICKS_PER_DAY, 2, 42)
}

/// Household drawing exactly `kw` every tick.
pub fn fixed_household(id: u64, kw: f32) -> Household {
    Household::new(
        AgentIdentity::new(AgentId(id), "household"),
        kw,
        0.0,
        0.0,
        0.0,
        TICKS_PER_DAY,
        id,
    )
}

/// Wind turbine exporting exactly `kw` every tick.
///
/// Mean speed sits above rated speed and the AR(1) multiplier never moves.
pub fn steady_wind(id: u64, kw: f32) -> WindGenerator {
    WindGenerator::new(
        AgentIdentity::new(AgentId(id), "wind"),
        kw,
        15.0,
        1.0,
        0.0,
        3.0,
        12.0,
        25.0,
        id,
    )
}

/// Aggregator with a one-day flat base profile.
pub fn aggregator(id: u64, policy: PricingPolicy) -> Aggregator {
    Aggregator::new(
        AgentIdentity::new(AgentId(id), "aggregator"),
        &[1.0; TICKS_PER_DAY],
        1.0,
        TICKS_PER_DAY,
        policy,
        125.0,
    )
    .expect("non-empty base demand")
}

/// Aggregator #0 serving households of 2.0 and 3.0 kW and a 1.0 kW turbine.
///
/// Returns the market and the aggregator id.
pub fn three_prosumer_market(policy: PricingPolicy) -> (Market<Adjacency>, AgentId) {
    let mut population = Population::default();
    let mut network = Adjacency::default();
    let agg = population.insert(aggregator(0, policy));
    network.link(agg, population.insert(fixed_household(1, 2.0)));
    network.link(agg, population.insert(steady_wind(2, 1.0)));
    network.link(agg, population.insert(fixed_household(3, 3.0)));
    (Market::new(default_config(), population, network), agg)
}

/// Borrows the aggregator registered under `id`.
pub fn aggregator_in<'a>(market: &'a Market<Adjacency>, id: AgentId) -> &'a Aggregator {
    match market.population().get(id) {
        Some(Entity::Aggregator(a)) => a,
        other => panic!("expected aggregator at {id}, found {other:?}"),
    }
}
