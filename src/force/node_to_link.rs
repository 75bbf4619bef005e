//! Node-to-link repulsion.
//!
//! Keeps nodes off links they are not part of. When a node's perpendicular
//! projection falls inside a link's segment and the clearance between the
//! node's outline and the link is below `horizon`, the node is pushed away
//! from the link and the link's endpoints are pushed the other way, split by
//! where along the segment the projection lands.

use super::{ForceContributor, ForceKind, ForceSetting, ForceSettings, bodies, clamp_magnitude, segments};
use crate::geometry::project_onto_segment;
use crate::graph::Graph;

const CONSTANT: &str = "constant";
const HORIZON: &str = "horizon";

/// Repulsion between nodes and the links passing close to them.
#[derive(Debug, Clone)]
pub struct NodeToLinkForce {
    enabled: bool,
    settings: ForceSettings,
}

impl Default for NodeToLinkForce {
    fn default() -> Self {
        Self {
            enabled: true,
            settings: ForceSettings::new()
                .with(ForceSetting::new(CONSTANT, 0.0, 1e5, 0, 2000.0))
                .with(ForceSetting::new(HORIZON, 0.0, 500.0, 0, 60.0)),
        }
    }
}

impl ForceContributor for NodeToLinkForce {
    fn kind(&self) -> ForceKind {
        ForceKind::Node2LinkRepulsion
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
        let horizon = self.settings.value(HORIZON);
        let bodies = bodies(graph);

        for segment in segments(graph) {
            for body in &bodies {
                if segment.touches(body.id) {
                    continue;
                }
                let point = body.xy();
                let Some(projection) = project_onto_segment(point, segment.a(), segment.b()) else {
                    continue;
                };
                // a node sitting exactly on the line has no side to be pushed to
                let Some(away) = (point - projection.foot).try_normalize() else {
                    continue;
                };
                let clearance = projection.distance - body.shape.extent_toward(away);
                if clearance >= horizon {
                    continue;
                }

                let magnitude =
                    clamp_magnitude(constant / clearance.max(1.0)) * body.multiplier * segment.factor();
                let push = away * magnitude;
                if body.accepts {
                    graph.add_force(body.id, ForceKind::Node2LinkRepulsion, push.extend(0.0));
                }
                if segment.start.accepts {
                    let share = -push * (1.0 - projection.t);
                    graph.add_force(segment.start.id, ForceKind::Node2LinkRepulsion, share.extend(0.0));
                }
                if segment.end.accepts {
                    let share = -push * projection.t;
                    graph.add_force(segment.end.id, ForceKind::Node2LinkRepulsion, share.extend(0.0));
                }
            }
        }
    }
}
