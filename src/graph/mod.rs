//! Graph data structures and operations.
//!
//! This module provides the node/link arena using petgraph's StableGraph for
//! stable node/link ids, together with the per-node records the simulation
//! reads and writes: shapes, fade ramps and force accumulators.

mod engine;
mod fade;
mod link;
mod node;
mod shape;

pub use engine::{Graph, MassMode, SIZE_MASS_UNIT};
pub use fade::{FADE_DURATION, Fade};
pub use link::{Link, LinkId, LinkState};
pub use node::{MIN_MASS, Node, NodeId, NodeState};
pub use shape::NodeShape;
