//! Node type and related structures.
//!
//! Nodes are the simulated point masses of the diagram. Each node has:
//! - A stable unique identifier (survives graph mutations)
//! - Position, velocity and acceleration (z is the crossing-avoidance depth)
//! - Mass, floored at 1
//! - A per-[`ForceKind`] force accumulator reset every tick
//! - Participation flags and the fade ramps that smooth their changes

use std::fmt;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::fade::Fade;
use super::shape::NodeShape;
use crate::force::{ForceKind, ForceVectors};

/// Smallest mass a node can have.
pub const MIN_MASS: f32 = 1.0;

/// Stable node identifier.
///
/// This ID remains valid even after other nodes are removed from the graph.
/// It wraps a u32 for efficient storage and WebAssembly interop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Node state flags packed into a single byte.
#[derive(Debug, Clone, Copy)]
pub struct NodeState {
    flags: u8,
}

impl NodeState {
    const HIDDEN: u8 = 0b0000_0001;
    const POSITION_CONTROLLED: u8 = 0b0000_0010;
    const ACCEPTS_FORCES: u8 = 0b0000_0100;
    const EXERTS_FORCES: u8 = 0b0000_1000;
    const ANIMATED: u8 = 0b0001_0000;

    /// Create a new default node state: visible, free, fully participating.
    #[inline]
    pub fn new() -> Self {
        Self {
            flags: Self::ACCEPTS_FORCES | Self::EXERTS_FORCES | Self::ANIMATED,
        }
    }

    #[inline]
    fn get(self, bit: u8) -> bool {
        self.flags & bit != 0
    }

    #[inline]
    fn set(&mut self, bit: u8, on: bool) {
        if on {
            self.flags |= bit;
        } else {
            self.flags &= !bit;
        }
    }

    /// Check if the node is hidden.
    #[inline]
    pub fn is_hidden(self) -> bool {
        self.get(Self::HIDDEN)
    }

    #[inline]
    pub fn set_hidden(&mut self, hidden: bool) {
        self.set(Self::HIDDEN, hidden);
    }

    /// Check if the node is dragged or otherwise pinned by external logic.
    #[inline]
    pub fn is_position_controlled(self) -> bool {
        self.get(Self::POSITION_CONTROLLED)
    }

    #[inline]
    pub fn set_position_controlled(&mut self, controlled: bool) {
        self.set(Self::POSITION_CONTROLLED, controlled);
    }

    #[inline]
    pub fn accepts_forces(self) -> bool {
        self.get(Self::ACCEPTS_FORCES)
    }

    #[inline]
    pub fn set_accepts_forces(&mut self, accepts: bool) {
        self.set(Self::ACCEPTS_FORCES, accepts);
    }

    #[inline]
    pub fn exerts_forces(self) -> bool {
        self.get(Self::EXERTS_FORCES)
    }

    #[inline]
    pub fn set_exerts_forces(&mut self, exerts: bool) {
        self.set(Self::EXERTS_FORCES, exerts);
    }

    /// Whether visibility/participation changes ramp instead of snapping.
    #[inline]
    pub fn is_animated(self) -> bool {
        self.get(Self::ANIMATED)
    }

    #[inline]
    pub fn set_animated(&mut self, animated: bool) {
        self.set(Self::ANIMATED, animated);
    }
}

impl Default for NodeState {
    fn default() -> Self {
        Self::new()
    }
}

/// A simulated point mass.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub shape: NodeShape,
    /// Lane tag used by lane capture.
    pub lane: Option<String>,
    mass: f32,
    forces: ForceVectors,
    state: NodeState,
    opacity: Fade,
    participation: Fade,
}

impl Node {
    pub(crate) fn new(id: NodeId, position: Vec2, shape: NodeShape) -> Self {
        Self {
            id,
            position: position.extend(0.0),
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            shape,
            lane: None,
            mass: MIN_MASS,
            forces: ForceVectors::default(),
            state: NodeState::new(),
            opacity: Fade::settled(true),
            participation: Fade::settled(true),
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Planar position, dropping the depth coordinate.
    #[inline]
    pub fn position_2d(&self) -> Vec2 {
        self.position.truncate()
    }

    /// Move the node in the plane, keeping its depth.
    pub fn set_position_2d(&mut self, position: Vec2) {
        self.position.x = position.x;
        self.position.y = position.y;
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Set the mass, floored at [`MIN_MASS`]. Non-finite values are ignored.
    pub fn set_mass(&mut self, mass: f32) {
        if mass.is_finite() {
            self.mass = mass.max(MIN_MASS);
        }
    }

    #[inline]
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Bounding box `(min, max)` around the current position.
    pub fn bounding_box(&self) -> (Vec2, Vec2) {
        self.shape.bounding_box(self.position_2d())
    }

    // =========================================================================
    // Participation
    // =========================================================================

    #[inline]
    pub fn is_visible(&self) -> bool {
        !self.state.is_hidden()
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.state.set_hidden(!visible);
        self.opacity.set_target(visible);
        self.update_participation_target();
    }

    #[inline]
    pub fn is_position_controlled(&self) -> bool {
        self.state.is_position_controlled()
    }

    pub fn set_position_controlled(&mut self, controlled: bool) {
        self.state.set_position_controlled(controlled);
    }

    /// Visible and not under pointer or external control.
    #[inline]
    pub fn is_simulated(&self) -> bool {
        self.is_visible() && !self.is_position_controlled()
    }

    /// Whether other nodes push and pull this one.
    #[inline]
    pub fn accepts_forces(&self) -> bool {
        self.state.accepts_forces() && self.is_visible()
    }

    pub fn set_accepts_forces(&mut self, accepts: bool) {
        self.state.set_accepts_forces(accepts);
        self.update_participation_target();
    }

    /// Whether this node pushes and pulls others.
    ///
    /// A node that was just hidden keeps exerting a fading force until its
    /// multiplier reaches zero.
    #[inline]
    pub fn exerts_forces(&self) -> bool {
        self.state.exerts_forces() && self.force_multiplier() > 0.0
    }

    pub fn set_exerts_forces(&mut self, exerts: bool) {
        self.state.set_exerts_forces(exerts);
        self.update_participation_target();
    }

    pub fn set_animated(&mut self, animated: bool) {
        self.state.set_animated(animated);
        self.opacity.set_animated(animated);
        self.participation.set_animated(animated);
    }

    fn update_participation_target(&mut self) {
        let participates =
            self.is_visible() && (self.state.accepts_forces() || self.state.exerts_forces());
        self.participation.set_target(participates);
    }

    /// Rendering opacity in `[0, 1]`.
    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity.value()
    }

    /// Scale applied to pairwise forces involving this node, in `[0, 1]`.
    #[inline]
    pub fn force_multiplier(&self) -> f32 {
        self.opacity.value() * self.participation.value()
    }

    /// Whether either ramp is still moving.
    pub fn is_fading(&self) -> bool {
        !self.opacity.is_settled() || !self.participation.is_settled()
    }

    pub(crate) fn advance_fades(&mut self, dt: f32) {
        self.opacity.advance(dt);
        self.participation.advance(dt);
    }

    // =========================================================================
    // Forces
    // =========================================================================

    /// Force accumulated under `kind` this tick (for debug overlays).
    #[inline]
    pub fn force(&self, kind: ForceKind) -> Vec3 {
        self.forces.get(kind)
    }

    #[inline]
    pub fn forces(&self) -> &ForceVectors {
        &self.forces
    }

    /// Sum of all per-kind forces.
    #[inline]
    pub fn total_force(&self) -> Vec3 {
        self.forces.total()
    }

    #[inline]
    pub(crate) fn add_force(&mut self, kind: ForceKind, force: Vec3) {
        self.forces.add(kind, force);
    }

    #[inline]
    pub(crate) fn reset_forces(&mut self) {
        self.forces.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> Node {
        Node::new(NodeId(0), Vec2::new(10.0, 20.0), NodeShape::Point)
    }

    #[test]
    fn test_node_id() {
        let id = NodeId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id.0, 42);
        assert_eq!(format!("{}", id), "Node(42)");
    }

    #[test]
    fn test_node_id_conversion() {
        let id: NodeId = 123.into();
        let raw: u32 = id.into();
        assert_eq!(raw, 123);
    }

    #[test]
    fn test_node_state_default() {
        let state = NodeState::new();
        assert!(!state.is_hidden());
        assert!(!state.is_position_controlled());
        assert!(state.accepts_forces());
        assert!(state.exerts_forces());
        assert!(state.is_animated());
    }

    #[test]
    fn test_node_state_flags_are_independent() {
        let mut state = NodeState::new();
        state.set_hidden(true);
        state.set_position_controlled(true);
        state.set_exerts_forces(false);

        assert!(state.is_hidden());
        assert!(state.is_position_controlled());
        assert!(state.accepts_forces());
        assert!(!state.exerts_forces());

        state.set_position_controlled(false);
        assert!(state.is_hidden());
        assert!(!state.is_position_controlled());
    }

    #[test]
    fn test_mass_floor() {
        let mut node = node();
        node.set_mass(0.0);
        assert_eq!(node.mass(), MIN_MASS);
        node.set_mass(5.0);
        assert_eq!(node.mass(), 5.0);
        node.set_mass(f32::NAN);
        assert_eq!(node.mass(), 5.0);
    }

    #[test]
    fn test_is_simulated() {
        let mut node = node();
        assert!(node.is_simulated());

        node.set_position_controlled(true);
        assert!(!node.is_simulated());

        node.set_position_controlled(false);
        node.set_visible(false);
        assert!(!node.is_simulated());
        assert!(!node.accepts_forces());
    }

    #[test]
    fn test_hidden_node_fades_out() {
        let mut node = node();
        node.set_visible(false);
        assert!(node.is_fading());
        assert_eq!(node.force_multiplier(), 1.0);
        assert!(node.exerts_forces());

        node.advance_fades(1.0);
        // both ramps are half way
        assert_eq!(node.force_multiplier(), 0.25);

        node.advance_fades(1.0);
        assert_eq!(node.force_multiplier(), 0.0);
        assert!(!node.exerts_forces());
        assert!(!node.is_fading());
    }

    #[test]
    fn test_unanimated_node_snaps() {
        let mut node = node();
        node.set_animated(false);
        node.set_exerts_forces(false);
        node.set_accepts_forces(false);
        assert_eq!(node.force_multiplier(), 0.0);
        assert_eq!(node.opacity(), 1.0);
    }

    #[test]
    fn test_forces_accumulate() {
        let mut node = node();
        node.add_force(ForceKind::Attraction, Vec3::X);
        node.add_force(ForceKind::Repulsion, Vec3::Y);
        assert_eq!(node.total_force(), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(node.force(ForceKind::Attraction), Vec3::X);

        node.reset_forces();
        assert_eq!(node.total_force(), Vec3::ZERO);
    }
}
