//! Link-crossing repulsion along the depth axis.
//!
//! When the planar projections of two links intersect, their endpoints are
//! pushed apart along z: the link already lying higher (by mean endpoint
//! depth) is pushed further up, the other one down. The separation is an
//! aesthetic heuristic, kept as an opaque `constant`-sized nudge.

use glam::Vec3;

use super::{ForceContributor, ForceKind, ForceSetting, ForceSettings, Segment, segments};
use crate::geometry::segment_intersection;
use crate::graph::Graph;

const CONSTANT: &str = "constant";

/// Depth separation of crossing links.
#[derive(Debug, Clone)]
pub struct LinkCrossingForce {
    enabled: bool,
    settings: ForceSettings,
}

impl Default for LinkCrossingForce {
    fn default() -> Self {
        Self {
            enabled: true,
            settings: ForceSettings::new().with(ForceSetting::new(CONSTANT, 0.0, 100.0, 2, 5.0)),
        }
    }
}

fn mean_depth(segment: &Segment) -> f32 {
    (segment.start.position.z + segment.end.position.z) * 0.5
}

fn push(graph: &mut Graph, segment: &Segment, force: Vec3) {
    for body in [segment.start, segment.end] {
        if body.accepts {
            graph.add_force(body.id, ForceKind::Link2LinkRepulsion, force);
        }
    }
}

impl ForceContributor for LinkCrossingForce {
    fn kind(&self) -> ForceKind {
        ForceKind::Link2LinkRepulsion
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn settings(&self) -> &ForceSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut ForceSettings {
        &mut self.settings
    }

    fn update_forces(&self, graph: &mut Graph, _viewport_width: f32, _viewport_height: f32) {
        if !self.enabled {
            return;
        }
        let constant = self.settings.value(CONSTANT);
        let segments = segments(graph);

        for (i, first) in segments.iter().enumerate() {
            for second in &segments[i + 1..] {
                // links meeting at a node touch but do not cross
                if first.shares_endpoint(second) {
                    continue;
                }
                if segment_intersection(first.a(), first.b(), second.a(), second.b()).is_none() {
                    continue;
                }
                let sign = if mean_depth(first) >= mean_depth(second) { 1.0 } else { -1.0 };
                let magnitude = constant * first.factor() * second.factor();
                let lift = Vec3::Z * (sign * magnitude);
                push(graph, first, lift);
                push(graph, second, -lift);
            }
        }
    }
}
