//! R-tree based spatial index using the rstar crate.
//!
//! Entries are axis-aligned boxes: a node's bounding box for selection, or a
//! degenerate box at a node's centre for neighbourhood queries. The index is
//! a snapshot, built once per query batch.

use glam::Vec2;
use rstar::{AABB, RTree, RTreeObject};

use crate::graph::{Graph, NodeId};

/// A node's box in the spatial index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBox {
    /// The node identifier.
    pub id: NodeId,
    /// Top-left corner.
    pub min: Vec2,
    /// Bottom-right corner.
    pub max: Vec2,
}

impl NodeBox {
    pub fn new(id: NodeId, min: Vec2, max: Vec2) -> Self {
        Self {
            id,
            min: min.min(max),
            max: min.max(max),
        }
    }
}

impl RTreeObject for NodeBox {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min.to_array(), self.max.to_array())
    }
}

/// Spatial index for graph nodes.
#[derive(Debug)]
pub struct SpatialIndex {
    tree: RTree<NodeBox>,
}

impl SpatialIndex {
    /// Bulk load the bounding boxes of every visible node.
    pub fn from_graph(graph: &Graph) -> Self {
        let boxes = graph
            .nodes()
            .filter(|node| node.is_visible())
            .map(|node| {
                let (min, max) = node.bounding_box();
                NodeBox::new(node.id(), min, max)
            })
            .collect();
        Self {
            tree: RTree::bulk_load(boxes),
        }
    }

    /// Bulk load bare points, one per node.
    pub fn from_points(points: impl IntoIterator<Item = (NodeId, Vec2)>) -> Self {
        let boxes = points
            .into_iter()
            .map(|(id, point)| NodeBox::new(id, point, point))
            .collect();
        Self {
            tree: RTree::bulk_load(boxes),
        }
    }

    /// Find all nodes whose box intersects a rectangle.
    pub fn in_rect(&self, min: Vec2, max: Vec2) -> Vec<NodeId> {
        let envelope = AABB::from_corners(min.to_array(), max.to_array());
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|node| node.id)
            .collect()
    }

    /// Nodes whose box comes within `radius` of `center` along both axes.
    ///
    /// A superset of the nodes within `radius`; callers filter by distance.
    pub fn around(&self, center: Vec2, radius: f32) -> Vec<NodeId> {
        let reach = Vec2::splat(radius.max(0.0));
        self.in_rect(center - reach, center + reach)
    }
}
