//! Registry of every agent taking part in the market.

use std::collections::BTreeMap;

use crate::agents::{
    Agent, AgentId, AgentIdentity, Aggregator, Household, Prosumer, TickContext, WindGenerator,
};
use crate::error::{MarketError, Result};

/// Any agent the market can hold.
#[derive(Debug, Clone)]
pub enum Entity {
    Household(Household),
    Wind(WindGenerator),
    Aggregator(Aggregator),
}

impl Entity {
    pub fn as_agent(&self) -> &dyn Agent {
        match self {
            Self::Household(h) => h,
            Self::Wind(w) => w,
            Self::Aggregator(a) => a,
        }
    }

    /// The prosumer capability, if this kind of agent has it.
    pub fn as_prosumer(&self) -> Option<&dyn Prosumer> {
        match self {
            Self::Household(h) => Some(h),
            Self::Wind(w) => Some(w),
            Self::Aggregator(_) => None,
        }
    }

    pub fn as_prosumer_mut(&mut self) -> Option<&mut dyn Prosumer> {
        match self {
            Self::Household(h) => Some(h),
            Self::Wind(w) => Some(w),
            Self::Aggregator(_) => None,
        }
    }

    pub fn identity(&self) -> &AgentIdentity {
        self.as_agent().identity()
    }

    pub fn net_demand(&self) -> f32 {
        self.as_agent().net_demand()
    }

    /// Advances a prosumer's own demand model; aggregators are stepped by the market.
    pub fn step_prosumer(&mut self, ctx: &TickContext) {
        match self {
            Self::Household(h) => h.step(ctx),
            Self::Wind(w) => w.step(ctx),
            Self::Aggregator(_) => {}
        }
    }
}

impl From<Household> for Entity {
    fn from(h: Household) -> Self {
        Self::Household(h)
    }
}

impl From<WindGenerator> for Entity {
    fn from(w: WindGenerator) -> Self {
        Self::Wind(w)
    }
}

impl From<Aggregator> for Entity {
    fn from(a: Aggregator) -> Self {
        Self::Aggregator(a)
    }
}

/// All agents keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Population {
    entities: BTreeMap<AgentId, Entity>,
}

impl Population {
    /// Registers an agent under its own id, replacing any previous holder of the id.
    pub fn insert(&mut self, entity: impl Into<Entity>) -> AgentId {
        let entity = entity.into();
        let id = entity.identity().id();
        self.entities.insert(id, entity);
        id
    }

    pub fn get(&self, id: AgentId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn remove(&mut self, id: AgentId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Ids of agents with the prosumer capability, in id order.
    pub fn prosumer_ids(&self) -> Vec<AgentId> {
        self.entities
            .iter()
            .filter(|(_, e)| e.as_prosumer().is_some())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Ids of aggregators, in id order.
    pub fn aggregator_ids(&self) -> Vec<AgentId> {
        self.entities
            .iter()
            .filter(|(_, e)| matches!(e, Entity::Aggregator(_)))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Mutable prosumer handles for every id in `links`.
    ///
    /// All links are checked before anything is handed out, so a bad edge
    /// never yields a partial customer list.
    ///
    /// # Errors
    ///
    /// - [`MarketError::UnknownAgent`] if a link points at no registered agent.
    /// - [`MarketError::RelationshipTypeMismatch`] if it points at an agent
    ///   without the prosumer capability.
    pub fn customers_mut(
        &mut self,
        aggregator: AgentId,
        links: &[AgentId],
    ) -> Result<Vec<&mut dyn Prosumer>> {
        for &target in links {
            let entity = self
                .entities
                .get(&target)
                .ok_or(MarketError::UnknownAgent(target))?;
            if entity.as_prosumer().is_none() {
                return Err(MarketError::RelationshipTypeMismatch {
                    aggregator,
                    target,
                    kind: entity.identity().kind(),
                });
            }
        }

        Ok(self
            .entities
            .iter_mut()
            .filter(|(id, _)| links.contains(*id))
            .filter_map(|(_, e)| e.as_prosumer_mut())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{DEFAULT_INITIAL_PRICE, PricingPolicy};

    fn household(id: u64) -> Household {
        Household::new(AgentIdentity::new(AgentId(id), "household"), 1.0, 0.0, 0.0, 0.0, 4, id)
    }

    fn aggregator(id: u64) -> Aggregator {
        Aggregator::new(
            AgentIdentity::new(AgentId(id), "aggregator"),
            &[1.0; 4],
            1.0,
            4,
            PricingPolicy::FlatRate { price: 1.0 },
            DEFAULT_INITIAL_PRICE,
        )
        .unwrap()
    }

    #[test]
    fn prosumers_and_aggregators_are_separated() {
        let mut pop = Population::default();
        pop.insert(aggregator(0));
        pop.insert(household(1));
        pop.insert(household(2));
        assert_eq!(pop.prosumer_ids(), vec![AgentId(1), AgentId(2)]);
        assert_eq!(pop.aggregator_ids(), vec![AgentId(0)]);
    }

    #[test]
    fn customers_resolve_linked_prosumers_only() {
        let mut pop = Population::default();
        pop.insert(household(1));
        pop.insert(household(2));
        pop.insert(household(3));
        let customers = pop.customers_mut(AgentId(0), &[AgentId(1), AgentId(3)]).unwrap();
        assert_eq!(customers.len(), 2);
    }

    #[test]
    fn link_to_aggregator_is_a_type_mismatch() {
        let mut pop = Population::default();
        pop.insert(household(1));
        pop.insert(aggregator(2));
        let err = pop
            .customers_mut(AgentId(0), &[AgentId(1), AgentId(2)])
            .err()
            .unwrap();
        assert!(matches!(
            err,
            MarketError::RelationshipTypeMismatch {
                target: AgentId(2),
                kind: "aggregator",
                ..
            }
        ));
    }

    #[test]
    fn dangling_link_is_unknown_agent() {
        let mut pop = Population::default();
        let err = pop.customers_mut(AgentId(0), &[AgentId(7)]).err().unwrap();
        assert!(matches!(err, MarketError::UnknownAgent(AgentId(7))));
    }
}
