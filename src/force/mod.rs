//! Force contributors.
//!
//! A contributor looks at the graph geometry and *adds* vectors into nodes'
//! per-[`ForceKind`] accumulators. Contributors never overwrite an
//! accumulator, so several contributors and many pairwise interactions can
//! target the same node within one tick.
//!
//! Each contributor reads a snapshot of the graph taken at the start of its
//! pass ([`bodies`] and [`segments`]) and writes only forces, so the order
//! contributors run in does not change the result.

mod attraction;
mod discrete_angles;
mod kind;
mod lane_capture;
mod link_crossing;
mod neighbour_connector;
mod node_to_link;
mod repulsion;
mod setting;

pub use attraction::{AttractionForce, RestLength};
pub use discrete_angles::DiscreteAngleForce;
pub use kind::{ForceKind, ForceVectors};
pub use lane_capture::LaneCaptureForce;
pub use link_crossing::LinkCrossingForce;
pub use neighbour_connector::NeighbourConnectorForce;
pub use node_to_link::NodeToLinkForce;
pub use repulsion::RepulsionForce;
pub use setting::{ForceSetting, ForceSettings};

use glam::{Vec2, Vec3};

use crate::graph::{Graph, LinkId, Node, NodeId, NodeShape};

/// Largest force magnitude a single interaction may contribute.
pub const MAX_FORCE: f32 = 1e4;

/// A pluggable source of forces.
pub trait ForceContributor {
    /// The accumulator slot this contributor writes to.
    fn kind(&self) -> ForceKind;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    fn settings(&self) -> &ForceSettings;

    fn settings_mut(&mut self) -> &mut ForceSettings;

    /// Add this tick's forces into the graph. Does nothing when disabled.
    fn update_forces(&self, graph: &mut Graph, viewport_width: f32, viewport_height: f32);
}

/// The default contributor set, in the order the simulator runs them.
pub fn default_contributors() -> Vec<Box<dyn ForceContributor>> {
    vec![
        Box::new(RepulsionForce::default()),
        Box::new(AttractionForce::default()),
        Box::new(DiscreteAngleForce::default()),
        Box::new(NeighbourConnectorForce::default()),
        Box::new(NodeToLinkForce::default()),
        Box::new(LinkCrossingForce::default()),
        Box::new(LaneCaptureForce::default()),
    ]
}

/// Clamp a signed scalar magnitude to `±MAX_FORCE`.
#[inline]
pub(crate) fn clamp_magnitude(magnitude: f32) -> f32 {
    magnitude.clamp(-MAX_FORCE, MAX_FORCE)
}

/// Read-only snapshot of a participating node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Body {
    pub id: NodeId,
    pub position: Vec3,
    pub shape: NodeShape,
    pub multiplier: f32,
    pub accepts: bool,
    pub exerts: bool,
}

impl Body {
    fn from_node(node: &Node) -> Self {
        Self {
            id: node.id(),
            position: node.position,
            shape: node.shape,
            multiplier: node.force_multiplier(),
            accepts: node.accepts_forces(),
            exerts: node.exerts_forces(),
        }
    }

    #[inline]
    pub fn xy(&self) -> Vec2 {
        self.position.truncate()
    }
}

/// Nodes that accept or exert forces this tick.
pub(crate) fn bodies(graph: &Graph) -> Vec<Body> {
    graph
        .nodes()
        .map(Body::from_node)
        .filter(|body| body.accepts || body.exerts)
        .collect()
}

/// Read-only snapshot of a visible, well-formed link.
#[derive(Debug, Clone)]
pub(crate) struct Segment {
    pub id: LinkId,
    pub start: Body,
    pub end: Body,
    pub preferred_angles: Vec<f32>,
    pub bending_offset: f32,
    pub label_footprint: f32,
}

impl Segment {
    #[inline]
    pub fn a(&self) -> Vec2 {
        self.start.xy()
    }

    #[inline]
    pub fn b(&self) -> Vec2 {
        self.end.xy()
    }

    /// Combined force multiplier of both endpoints.
    #[inline]
    pub fn factor(&self) -> f32 {
        self.start.multiplier * self.end.multiplier
    }

    pub fn touches(&self, id: NodeId) -> bool {
        self.start.id == id || self.end.id == id
    }

    pub fn shares_endpoint(&self, other: &Segment) -> bool {
        self.touches(other.start.id) || self.touches(other.end.id)
    }
}

/// Visible links with two distinct endpoints that still carry force.
/// Self-loops are skipped.
pub(crate) fn segments(graph: &Graph) -> Vec<Segment> {
    graph
        .force_links()
        .into_iter()
        .filter_map(|id| {
            let (start, end) = graph.link_endpoints(id)?;
            if start == end {
                log::trace!("skipping self-loop {id}");
                return None;
            }
            let link = graph.link(id)?;
            Some(Segment {
                id,
                start: Body::from_node(graph.node(start)?),
                end: Body::from_node(graph.node(end)?),
                preferred_angles: link.preferred_angles.clone(),
                bending_offset: link.bending_offset,
                label_footprint: link.label_footprint(),
            })
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::test_support::graph_with_points;
    use super::*;

    #[test]
    fn test_default_contributors_cover_every_kind() {
        let contributors = default_contributors();
        let kinds: Vec<ForceKind> = contributors.iter().map(|c| c.kind()).collect();
        for kind in ForceKind::ALL {
            assert!(kinds.contains(&kind), "missing {kind}");
        }
    }

    #[test]
    fn test_segments_skip_self_loops_and_hidden_links() {
        let (mut graph, ids) = graph_with_points(&[(0.0, 0.0), (10.0, 0.0)]);
        let kept = graph.add_link(ids[0], ids[1]).unwrap();
        graph.add_link(ids[0], ids[0]).unwrap();
        let hidden = graph.add_link(ids[1], ids[0]).unwrap();
        graph.try_link_mut(hidden).unwrap().set_visible(false);

        let segments = segments(&graph);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].id, kept);
        assert_eq!(segments[0].factor(), 1.0);
    }

    #[test]
    fn test_bodies_exclude_non_participants() {
        let (mut graph, ids) = graph_with_points(&[(0.0, 0.0), (10.0, 0.0)]);
        let node = graph.try_node_mut(ids[1]).unwrap();
        node.set_accepts_forces(false);
        node.set_exerts_forces(false);

        let bodies = bodies(&graph);
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0].id, ids[0]);
    }
}
