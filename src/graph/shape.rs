//! Node shapes.
//!
//! A node's shape is a tagged variant rather than a type hierarchy. It answers
//! the few geometric questions the simulation and hit testing need: bounding
//! box, containment, and how far the boundary is from the centre.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::EPSILON;

/// The outline of a node, centred on the node position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeShape {
    /// A dimensionless point.
    Point,
    /// A circle, e.g. a state or an interface lollipop.
    Circle { radius: f32 },
    /// An axis-aligned box, e.g. a class or package.
    Rectangle { width: f32, height: f32 },
}

impl NodeShape {
    /// Half extents of the axis-aligned bounding box.
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            NodeShape::Point => Vec2::ZERO,
            NodeShape::Circle { radius } => Vec2::splat(radius.max(0.0)),
            NodeShape::Rectangle { width, height } => {
                Vec2::new(width.max(0.0), height.max(0.0)) * 0.5
            }
        }
    }

    /// Size of the bounding box.
    pub fn size(&self) -> Vec2 {
        self.half_extents() * 2.0
    }

    /// Area of the outline.
    pub fn area(&self) -> f32 {
        match *self {
            NodeShape::Point => 0.0,
            NodeShape::Circle { radius } => std::f32::consts::PI * radius * radius,
            NodeShape::Rectangle { width, height } => width.max(0.0) * height.max(0.0),
        }
    }

    /// Bounding box `(min, max)` for a shape centred at `center`.
    pub fn bounding_box(&self, center: Vec2) -> (Vec2, Vec2) {
        let half = self.half_extents();
        (center - half, center + half)
    }

    /// Whether `point` lies inside the outline centred at `center`.
    pub fn contains(&self, center: Vec2, point: Vec2) -> bool {
        let offset = point - center;
        match *self {
            NodeShape::Point => offset.length_squared() < EPSILON,
            NodeShape::Circle { radius } => offset.length_squared() <= radius * radius,
            NodeShape::Rectangle { .. } => {
                let half = self.half_extents();
                offset.x.abs() <= half.x && offset.y.abs() <= half.y
            }
        }
    }

    /// Distance from the centre to the boundary along `direction`.
    ///
    /// A zero direction has no boundary crossing and yields 0.
    pub fn extent_toward(&self, direction: Vec2) -> f32 {
        let Some(direction) = direction.try_normalize() else {
            return 0.0;
        };
        match *self {
            NodeShape::Point => 0.0,
            NodeShape::Circle { radius } => radius.max(0.0),
            NodeShape::Rectangle { .. } => {
                let half = self.half_extents();
                let tx = if direction.x.abs() > EPSILON {
                    half.x / direction.x.abs()
                } else {
                    f32::INFINITY
                };
                let ty = if direction.y.abs() > EPSILON {
                    half.y / direction.y.abs()
                } else {
                    f32::INFINITY
                };
                tx.min(ty)
            }
        }
    }

    /// Distance from `point` to the outline centred at `center`.
    ///
    /// Negative when the point is inside the shape.
    pub fn distance_to_edge(&self, center: Vec2, point: Vec2) -> f32 {
        let offset = point - center;
        offset.length() - self.extent_toward(offset)
    }
}

impl Default for NodeShape {
    fn default() -> Self {
        NodeShape::Rectangle {
            width: 40.0,
            height: 30.0,
        }
    }
}
