//! Market engine that steps prosumers and aggregators tick by tick.

use log::info;

use crate::agents::{AgentId, TickContext};
use crate::error::{MarketError, Result};

use super::clock::Clock;
use super::network::Relationships;
use super::population::{Entity, Population};
use super::schedule::Scheduler;
use super::types::{AggregatorRecord, SimConfig, TickRecord};

/// Simulation engine owning the agents, their links, and the clock.
///
/// Generic over `N: Relationships` so any relationship source can drive
/// which prosumers each aggregator serves.
pub struct Market<N: Relationships> {
    config: SimConfig,
    population: Population,
    network: N,
    scheduler: Scheduler,
    clock: Clock,
}

impl<N: Relationships> Market<N> {
    /// Creates a market.
    ///
    /// # Arguments
    ///
    /// * `config` - Timing configuration; its seed drives the stepping order
    /// * `population` - Every agent taking part
    /// * `network` - Aggregator → prosumer links
    pub fn new(config: SimConfig, population: Population, network: N) -> Self {
        let clock = Clock::new(config.total_ticks());
        Self {
            scheduler: Scheduler::new(config.seed),
            config,
            population,
            network,
            clock,
        }
    }

    /// Executes one tick.
    ///
    /// All prosumers step first, in shuffled order; each aggregator then reads
    /// its complete customer set.
    ///
    /// # Errors
    ///
    /// Fails the tick on a link to an unknown or non-prosumer agent, or on a
    /// signal length violation. Aggregators already settled this tick keep
    /// their updates.
    pub fn step(&mut self, tick: usize) -> Result<TickRecord> {
        let ctx = TickContext::new(tick, self.config.ticks_per_day);
        let order = self.scheduler.order(
            &self.population.prosumer_ids(),
            &self.population.aggregator_ids(),
        );

        // 1. Prosumers update their own demand
        for id in &order.prosumers {
            if let Some(entity) = self.population.get_mut(*id) {
                entity.step_prosumer(&ctx);
            }
        }

        // 2. Aggregators settle, strictly after every prosumer
        let mut aggregators = Vec::with_capacity(order.aggregators.len());
        for id in order.aggregators {
            aggregators.push(self.settle_aggregator(id, &ctx)?);
        }

        Ok(TickRecord {
            tick,
            time_hr: tick as f32 * self.config.dt_hours,
            time_of_day: ctx.time_of_day(),
            prosumers: order.prosumers.len(),
            aggregators,
        })
    }

    /// Steps one aggregator against its linked customers.
    fn settle_aggregator(&mut self, id: AgentId, ctx: &TickContext) -> Result<AggregatorRecord> {
        let links = self.network.linked(id);
        if links.contains(&id) {
            return Err(MarketError::RelationshipTypeMismatch {
                aggregator: id,
                target: id,
                kind: "aggregator",
            });
        }

        // Taken out of the registry so its customers can be borrowed alongside it
        let mut aggregator = match self.population.remove(id) {
            Some(Entity::Aggregator(a)) => a,
            Some(other) => {
                self.population.insert(other);
                return Err(MarketError::UnknownAgent(id));
            }
            None => return Err(MarketError::UnknownAgent(id)),
        };

        let result = self
            .population
            .customers_mut(id, links)
            .and_then(|mut customers| {
                aggregator
                    .step(ctx, &mut customers)
                    .map_err(MarketError::from)
            });
        self.population.insert(aggregator);
        let report = result?;

        Ok(AggregatorRecord {
            aggregator: id,
            net_demand_kw: report.net_demand_kw,
            price: report.price,
            broadcast_receivers: report.broadcast_receivers,
        })
    }

    /// Runs every remaining tick and returns the records.
    ///
    /// # Errors
    ///
    /// Stops at the first failed tick.
    pub fn run(&mut self) -> Result<Vec<TickRecord>> {
        info!(
            "running {} ticks ({} per day) over {} agents",
            self.config.total_ticks(),
            self.config.ticks_per_day,
            self.population.len()
        );
        let mut records = Vec::with_capacity(self.config.total_ticks());
        while let Some(tick) = self.clock.tick() {
            records.push(self.step(tick)?);
        }
        info!("market run finished after {} ticks", records.len());
        Ok(records)
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}
