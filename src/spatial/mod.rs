//! Spatial indexing over node positions and bounding boxes.
//!
//! Backs rectangle selection and the repulsion horizon lookup.

mod rtree;

pub use rtree::SpatialIndex;
