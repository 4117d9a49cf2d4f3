//! Graph solver - activates one node per mandatory group.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::{ConstraintGraph, Node};
use crate::random::RandomSource;

/// Active node per group name, as produced by [`GraphSolver::solve`].
pub type GraphSolution<P> = BTreeMap<String, Node<P>>;

/// Brings a constraint graph into a consistent state.
pub struct GraphSolver;

impl GraphSolver {
    /// Activate exactly one random node in every mandatory group.
    ///
    /// Groups are visited in declaration order and each draws one uniform
    /// index, so a fixed seed always yields the same activation. Nodes are
    /// mutated in place. The returned map holds the active node of every
    /// group; when an optional group has several active nodes the last one
    /// wins.
    ///
    /// Every mandatory group must contain a node. Empty ones are skipped and
    /// logged; check [`ConstraintGraph::empty_mandatory_groups`] beforehand.
    pub fn solve<P: Clone>(graph: &mut ConstraintGraph<P>, rs: &mut dyn RandomSource) -> GraphSolution<P> {
        for group in graph.groups_mut().iter_mut().filter(|g| g.is_mandatory()) {
            let count = group.nodes().len();
            if count == 0 {
                warn!(group = group.name(), "mandatory group has no nodes");
                continue;
            }
            let chosen = rs.uniform_index(count);
            for (index, node) in group.nodes_mut().iter_mut().enumerate() {
                node.set_active(index == chosen);
            }
            debug!(group = group.name(), index = chosen, "activated mandatory node");
        }

        Self::solution(graph)
    }

    /// Activate one random node in every non-empty optional group.
    ///
    /// Same visiting order and activation rules as [`GraphSolver::solve`];
    /// empty optional groups stay unfilled. Mandatory groups are untouched.
    pub fn fill_optional<P>(graph: &mut ConstraintGraph<P>, rs: &mut dyn RandomSource) {
        for group in graph.groups_mut().iter_mut().filter(|g| !g.is_mandatory()) {
            let count = group.nodes().len();
            if count == 0 {
                continue;
            }
            let chosen = rs.uniform_index(count);
            for (index, node) in group.nodes_mut().iter_mut().enumerate() {
                node.set_active(index == chosen);
            }
            debug!(group = group.name(), index = chosen, "activated optional node");
        }
    }

    /// Active node per group as the graph stands; the last active node of a
    /// group wins.
    pub fn solution<P: Clone>(graph: &ConstraintGraph<P>) -> GraphSolution<P> {
        let mut results = BTreeMap::new();
        for node in graph.active_nodes() {
            results.insert(node.group().to_string(), node.clone());
        }
        results
    }
}
