use rand::seq::SliceRandom;
use rand::{SeedableRng, rngs::StdRng};

use crate::agents::AgentId;

/// Decides the order agents are stepped in within a tick.
///
/// Prosumers go first in a freshly shuffled order every tick; aggregators
/// always go last so they only ever see a complete set of demands.
#[derive(Debug, Clone)]
pub struct Scheduler {
    rng: StdRng,
}

impl Scheduler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Returns the stepping order for one tick.
    pub fn order(&mut self, prosumers: &[AgentId], aggregators: &[AgentId]) -> TickOrder {
        let mut shuffled = prosumers.to_vec();
        shuffled.shuffle(&mut self.rng);
        TickOrder {
            prosumers: shuffled,
            aggregators: aggregators.to_vec(),
        }
    }
}

/// Stepping order for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOrder {
    pub prosumers: Vec<AgentId>,
    pub aggregators: Vec<AgentId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(range: std::ops::Range<u64>) -> Vec<AgentId> {
        range.map(AgentId).collect()
    }

    #[test]
    fn order_is_a_permutation() {
        let mut scheduler = Scheduler::new(5);
        let order = scheduler.order(&ids(1..20), &ids(0..1));
        let mut sorted = order.prosumers.clone();
        sorted.sort();
        assert_eq!(sorted, ids(1..20));
        assert_eq!(order.aggregators, ids(0..1));
    }

    #[test]
    fn same_seed_same_order() {
        let mut a = Scheduler::new(11);
        let mut b = Scheduler::new(11);
        for _ in 0..5 {
            assert_eq!(a.order(&ids(0..10), &[]), b.order(&ids(0..10), &[]));
        }
    }
}
