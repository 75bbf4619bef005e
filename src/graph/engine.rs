//! Graph - the node/link arena the simulation runs on.
//!
//! The Graph stores the diagram topology using petgraph's StableGraph, with
//! [`Node`] and [`Link`] records as the node and edge weights. Neither nodes
//! nor links own each other: both live in the arena and refer to each other by
//! stable id, so removing a node detaches its links without dangling handles.

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::{Directed, Direction};
use std::collections::{HashMap, HashSet};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::link::{Link, LinkId};
use super::node::{MIN_MASS, Node, NodeId};
use super::shape::NodeShape;
use crate::error::{LayoutError, Result};
use crate::force::ForceKind;

/// Shape area that corresponds to one unit of mass in [`MassMode::Size`].
pub const SIZE_MASS_UNIT: f32 = 1200.0;

/// How [`Graph::derive_masses`] computes node masses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MassMode {
    /// Every node weighs 1.
    #[default]
    Uniform,
    /// Proportional to the shape area.
    Size,
    /// One plus the number of nodes reachable through outgoing links.
    Subtree,
}

/// The diagram graph.
///
/// This struct manages:
/// - Topology via petgraph
/// - Node and link records (positions, velocities, force accumulators, flags)
/// - ID mapping between stable IDs and internal indices
pub struct Graph {
    /// The underlying graph structure.
    graph: StableGraph<Node, Link, Directed>,

    /// Map from stable NodeId to petgraph NodeIndex
    node_id_to_index: HashMap<NodeId, NodeIndex>,

    /// Map from stable LinkId to petgraph EdgeIndex
    link_id_to_index: HashMap<LinkId, EdgeIndex>,

    /// Next node ID to assign
    next_node_id: u32,

    /// Next link ID to assign
    next_link_id: u32,
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            node_id_to_index: HashMap::new(),
            link_id_to_index: HashMap::new(),
            next_node_id: 0,
            next_link_id: 0,
        }
    }

    /// Create a graph with pre-allocated capacity.
    pub fn with_capacity(node_capacity: usize, link_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(node_capacity, link_capacity),
            node_id_to_index: HashMap::with_capacity(node_capacity),
            link_id_to_index: HashMap::with_capacity(link_capacity),
            next_node_id: 0,
            next_link_id: 0,
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node centred at `position`.
    pub fn add_node(&mut self, position: Vec2, shape: NodeShape) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let index = self.graph.add_node(Node::new(id, position, shape));
        self.node_id_to_index.insert(id, index);
        id
    }

    /// Remove a node and all its incident links.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(index) = self.node_id_to_index.remove(&id) else {
            return false;
        };

        let incident: Vec<LinkId> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming))
            .map(|edge| edge.weight().id())
            .collect();
        for link_id in incident {
            self.link_id_to_index.remove(&link_id);
        }

        self.graph.remove_node(index);
        true
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_id_to_index.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_id_to_index
            .get(&id)
            .and_then(|&index| self.graph.node_weight(index))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let index = *self.node_id_to_index.get(&id)?;
        self.graph.node_weight_mut(index)
    }

    /// Like [`Graph::node_mut`] but reports a missing node as an error.
    pub fn try_node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.node_mut(id).ok_or(LayoutError::UnknownNode(id))
    }

    /// All nodes in arena order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.graph.node_weights_mut()
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes().map(Node::id).collect()
    }

    /// Move a node in the plane.
    pub fn set_node_position(&mut self, id: NodeId, position: Vec2) -> Result<()> {
        self.try_node_mut(id)?.set_position_2d(position);
        Ok(())
    }

    // =========================================================================
    // Filtered Views
    // =========================================================================

    fn filter_nodes(&self, predicate: impl Fn(&Node) -> bool) -> Vec<NodeId> {
        self.nodes()
            .filter(|node| predicate(node))
            .map(Node::id)
            .collect()
    }

    pub fn visible_nodes(&self) -> Vec<NodeId> {
        self.filter_nodes(Node::is_visible)
    }

    pub fn force_accepting_nodes(&self) -> Vec<NodeId> {
        self.filter_nodes(Node::accepts_forces)
    }

    pub fn force_exerting_nodes(&self) -> Vec<NodeId> {
        self.filter_nodes(Node::exerts_forces)
    }

    pub fn simulated_nodes(&self) -> Vec<NodeId> {
        self.filter_nodes(Node::is_simulated)
    }

    /// Whether any node is currently under pointer or external control.
    pub fn has_position_controlled_node(&self) -> bool {
        self.nodes().any(Node::is_position_controlled)
    }

    // =========================================================================
    // Link Operations
    // =========================================================================

    /// Add a link from `start` to `end`.
    ///
    /// Self-loops are accepted; they simply contribute no force.
    pub fn add_link(&mut self, start: NodeId, end: NodeId) -> Result<LinkId> {
        let start_index = *self
            .node_id_to_index
            .get(&start)
            .ok_or(LayoutError::UnknownNode(start))?;
        let end_index = *self
            .node_id_to_index
            .get(&end)
            .ok_or(LayoutError::UnknownNode(end))?;

        let id = LinkId(self.next_link_id);
        self.next_link_id += 1;

        let index = self.graph.add_edge(start_index, end_index, Link::new(id));
        self.link_id_to_index.insert(id, index);
        Ok(id)
    }

    /// Remove a link.
    pub fn remove_link(&mut self, id: LinkId) -> bool {
        match self.link_id_to_index.remove(&id) {
            Some(index) => self.graph.remove_edge(index).is_some(),
            None => false,
        }
    }

    /// Get the number of links.
    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.link_id_to_index
            .get(&id)
            .and_then(|&index| self.graph.edge_weight(index))
    }

    pub fn link_mut(&mut self, id: LinkId) -> Option<&mut Link> {
        let index = *self.link_id_to_index.get(&id)?;
        self.graph.edge_weight_mut(index)
    }

    /// Like [`Graph::link_mut`] but reports a missing link as an error.
    pub fn try_link_mut(&mut self, id: LinkId) -> Result<&mut Link> {
        self.link_mut(id).ok_or(LayoutError::UnknownLink(id))
    }

    /// The `(start, end)` nodes of a link.
    pub fn link_endpoints(&self, id: LinkId) -> Option<(NodeId, NodeId)> {
        let index = *self.link_id_to_index.get(&id)?;
        let (start, end) = self.graph.edge_endpoints(index)?;
        Some((self.graph[start].id(), self.graph[end].id()))
    }

    /// Links that are visible and whose endpoints are both visible.
    pub fn visible_links(&self) -> Vec<LinkId> {
        self.graph
            .edge_references()
            .filter(|edge| {
                edge.weight().is_visible()
                    && self.graph[edge.source()].is_visible()
                    && self.graph[edge.target()].is_visible()
            })
            .map(|edge| edge.weight().id())
            .collect()
    }

    /// Visible links whose endpoints still carry force.
    ///
    /// Unlike [`Graph::visible_links`], a link stays while a hidden endpoint
    /// fades out, so its forces ramp down with the endpoint's multiplier.
    pub fn force_links(&self) -> Vec<LinkId> {
        self.graph
            .edge_references()
            .filter(|edge| {
                edge.weight().is_visible()
                    && self.graph[edge.source()].force_multiplier() > 0.0
                    && self.graph[edge.target()].force_multiplier() > 0.0
            })
            .map(|edge| edge.weight().id())
            .collect()
    }

    /// Links starting or ending at `id`. A self-loop is listed once.
    pub fn incident_links(&self, id: NodeId) -> Vec<LinkId> {
        let Some(&index) = self.node_id_to_index.get(&id) else {
            return Vec::new();
        };
        let mut links: Vec<LinkId> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .map(|edge| edge.weight().id())
            .collect();
        links.extend(
            self.graph
                .edges_directed(index, Direction::Incoming)
                .filter(|edge| edge.source() != index)
                .map(|edge| edge.weight().id()),
        );
        links
    }

    /// Nodes sharing a link with `id`, in either direction.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        self.node_id_to_index
            .get(&id)
            .map(|&index| {
                self.graph
                    .neighbors_undirected(index)
                    .map(|n| self.graph[n].id())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Spread links that connect the same pair of nodes.
    ///
    /// Each group of `k` parallel links gets offsets symmetric around zero,
    /// `spacing` apart. A single link between a pair is straightened.
    pub fn assign_parallel_offsets(&mut self, spacing: f32) {
        let mut groups: HashMap<(NodeIndex, NodeIndex), Vec<(EdgeIndex, bool)>> = HashMap::new();
        for edge in self.graph.edge_references() {
            let (source, target) = (edge.source(), edge.target());
            if source == target {
                continue;
            }
            let reversed = source > target;
            let key = if reversed { (target, source) } else { (source, target) };
            groups.entry(key).or_default().push((edge.id(), reversed));
        }

        for members in groups.values() {
            let center = (members.len() as f32 - 1.0) * 0.5;
            for (slot, &(index, reversed)) in members.iter().enumerate() {
                let offset = (slot as f32 - center) * spacing;
                // the bend side flips with the link direction
                self.graph[index].bending_offset = if reversed { -offset } else { offset };
            }
        }
    }

    // =========================================================================
    // Simulation Support
    // =========================================================================

    /// Add into a node's accumulator. Unknown nodes are ignored.
    #[inline]
    pub(crate) fn add_force(&mut self, id: NodeId, kind: ForceKind, force: Vec3) {
        if let Some(node) = self.node_mut(id) {
            node.add_force(kind, force);
        }
    }

    /// Zero every node's per-kind accumulator.
    pub(crate) fn reset_forces(&mut self) {
        for node in self.graph.node_weights_mut() {
            node.reset_forces();
        }
    }

    pub(crate) fn advance_fades(&mut self, dt: f32) {
        for node in self.graph.node_weights_mut() {
            node.advance_fades(dt);
        }
    }

    /// Recompute every node's mass according to `mode`.
    pub fn derive_masses(&mut self, mode: MassMode) {
        let indices: Vec<NodeIndex> = self.graph.node_indices().collect();
        for index in indices {
            let mass = match mode {
                MassMode::Uniform => MIN_MASS,
                MassMode::Size => self.graph[index].shape.area() / SIZE_MASS_UNIT,
                MassMode::Subtree => 1.0 + self.count_descendants(index) as f32,
            };
            self.graph[index].set_mass(mass);
        }
    }

    /// Count nodes reachable through outgoing links, tolerating cycles.
    fn count_descendants(&self, root: NodeIndex) -> usize {
        let mut count = 0;
        let mut stack = vec![root];
        let mut visited = HashSet::new();
        visited.insert(root);
        while let Some(index) = stack.pop() {
            for child in self.graph.neighbors_directed(index, Direction::Outgoing) {
                if visited.insert(child) {
                    count += 1;
                    stack.push(child);
                }
            }
        }
        count
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Bounding box `(min, max)` of all visible nodes' outlines.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        self.nodes()
            .filter(|node| node.is_visible())
            .map(Node::bounding_box)
            .reduce(|(min_a, max_a), (min_b, max_b)| (min_a.min(min_b), max_a.max(max_b)))
    }

    /// Clear all nodes and links. Ids keep counting from where they were,
    /// so ids handed out before the clear never name a new node or link.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_id_to_index.clear();
        self.link_id_to_index.clear();
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
