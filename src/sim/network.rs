use std::collections::BTreeMap;

use crate::agents::AgentId;

/// Source of the aggregator → customer relationships.
pub trait Relationships {
    /// Agents linked from `from`, in a stable order.
    fn linked(&self, from: AgentId) -> &[AgentId];
}

/// Directed adjacency list of economic links.
///
/// # Examples
///
/// ```
/// use tariff_sim::agents::AgentId;
/// use tariff_sim::sim::network::{Adjacency, Relationships};
///
/// let mut net = Adjacency::default();
/// net.link(AgentId(0), AgentId(1));
/// net.link(AgentId(0), AgentId(2));
/// assert_eq!(net.linked(AgentId(0)), &[AgentId(1), AgentId(2)]);
/// assert!(net.linked(AgentId(1)).is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    edges: BTreeMap<AgentId, Vec<AgentId>>,
}

impl Adjacency {
    /// Adds an edge `from → to`. Duplicate edges are ignored.
    pub fn link(&mut self, from: AgentId, to: AgentId) {
        let targets = self.edges.entry(from).or_default();
        if !targets.contains(&to) {
            targets.push(to);
        }
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}

impl Relationships for Adjacency {
    fn linked(&self, from: AgentId) -> &[AgentId] {
        self.edges.get(&from).map(Vec::as_slice).unwrap_or(&[])
    }
}
