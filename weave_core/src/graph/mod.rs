//! Constraint graph - a template's requirement structure.
//!
//! The graph consists of:
//! - **Groups**: named sets of alternative nodes, declared in a fixed order
//! - **Nodes**: one alternative each, carrying a payload and an activation flag
//!
//! A mandatory group needs exactly one active node once solved; optional
//! groups are left to downstream logic.

mod solver;

pub use solver::*;

use serde::{Deserialize, Serialize};

/// One alternative inside a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node<P> {
    group: String,
    pub payload: P,
    active: bool,
}

impl<P> Node<P> {
    pub fn new(group: impl Into<String>, payload: P) -> Self {
        Self {
            group: group.into(),
            payload,
            active: false,
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// A named set of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGroup<P> {
    name: String,
    mandatory: bool,
    nodes: Vec<Node<P>>,
}

impl<P> NodeGroup<P> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn nodes(&self) -> &[Node<P>] {
        &self.nodes
    }

    pub fn active_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.active).count()
    }
}

/// Groups of alternative nodes in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintGraph<P> {
    groups: Vec<NodeGroup<P>>,
}

impl<P> Default for ConstraintGraph<P> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<P> ConstraintGraph<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a group. Declaring an existing group again only ever makes it
    /// mandatory, never optional.
    pub fn add_group(&mut self, name: impl Into<String>, mandatory: bool) {
        let name = name.into();
        match self.groups.iter_mut().find(|g| g.name == name) {
            Some(group) => group.mandatory |= mandatory,
            None => self.groups.push(NodeGroup {
                name,
                mandatory,
                nodes: Vec::new(),
            }),
        }
    }

    /// Add a node to its group, declaring the group as optional if needed.
    pub fn add_node(&mut self, node: Node<P>) {
        let group = node.group.clone();
        self.add_group(group.clone(), false);
        if let Some(target) = self.groups.iter_mut().find(|g| g.name == group) {
            target.nodes.push(node);
        }
    }

    pub fn groups(&self) -> &[NodeGroup<P>] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&NodeGroup<P>> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Mandatory groups in declaration order.
    pub fn mandatory_groups(&self) -> impl Iterator<Item = &NodeGroup<P>> {
        self.groups.iter().filter(|g| g.mandatory)
    }

    /// Names of mandatory groups without any node. Solving requires this to be empty.
    pub fn empty_mandatory_groups(&self) -> Vec<&str> {
        self.mandatory_groups()
            .filter(|g| g.nodes.is_empty())
            .map(|g| g.name.as_str())
            .collect()
    }

    /// Mark the node at `index` in `group` active. Returns false if it does not exist.
    pub fn activate_node(&mut self, group: &str, index: usize) -> bool {
        self.set_active(group, index, true)
    }

    pub fn deactivate_node(&mut self, group: &str, index: usize) -> bool {
        self.set_active(group, index, false)
    }

    fn set_active(&mut self, group: &str, index: usize, active: bool) -> bool {
        match self
            .groups
            .iter_mut()
            .find(|g| g.name == group)
            .and_then(|g| g.nodes.get_mut(index))
        {
            Some(node) => {
                node.active = active;
                true
            }
            None => false,
        }
    }

    /// All active nodes, group by group in declaration order.
    pub fn active_nodes(&self) -> impl Iterator<Item = &Node<P>> {
        self.groups.iter().flat_map(|g| g.nodes.iter()).filter(|n| n.active)
    }

    pub(crate) fn groups_mut(&mut self) -> &mut [NodeGroup<P>] {
        &mut self.groups
    }
}

impl<P> NodeGroup<P> {
    pub(crate) fn nodes_mut(&mut self) -> &mut [Node<P>] {
        &mut self.nodes
    }
}

impl<P> Node<P> {
    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}
