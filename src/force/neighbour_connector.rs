//! Neighbour-connector repulsion.
//!
//! Links leaving the same node are fanned out: for every pair of links
//! sharing a node, the far end of one link is pushed tangentially away from
//! the other link with magnitude `constant / max(angle, 1)^2`, the angle
//! measured in degrees at the shared node.

use std::collections::HashMap;

use super::{Body, ForceContributor, ForceKind, ForceSetting, ForceSettings, clamp_magnitude, segments};
use crate::geometry::angle_between;
use crate::graph::{Graph, NodeId};

const CONSTANT: &str = "constant";

/// Angular repulsion between links that share a node.
#[derive(Debug, Clone)]
pub struct NeighbourConnectorForce {
    enabled: bool,
    settings: ForceSettings,
}

impl Default for NeighbourConnectorForce {
    fn default() -> Self {
        Self {
            enabled: true,
            settings: ForceSettings::new().with(ForceSetting::new(CONSTANT, 0.0, 1e5, 0, 2000.0)),
        }
    }
}

impl ForceContributor for NeighbourConnectorForce {
    fn kind(&self) -> ForceKind {
        ForceKind::NeighbourConnectorRepulsion
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

        // shared node -> (shared body, far endpoints of its links)
        // parallel links to the same neighbour count once
        let mut fans: HashMap<NodeId, (Body, Vec<Body>)> = HashMap::new();
        for segment in segments(graph) {
            for (shared, far) in [(segment.start, segment.end), (segment.end, segment.start)] {
                let far_ends = &mut fans
                    .entry(shared.id)
                    .or_insert_with(|| (shared, Vec::new()))
                    .1;
                if !far_ends.iter().any(|known| known.id == far.id) {
                    far_ends.push(far);
                }
            }
        }

        for (shared, far_ends) in fans.values() {
            if far_ends.len() < 2 {
                continue;
            }
            for (i, pushed) in far_ends.iter().enumerate() {
                if !pushed.accepts {
                    continue;
                }
                let arm = pushed.xy() - shared.xy();
                let Some(tangent) = arm.perp().try_normalize() else {
                    continue;
                };
                for (j, other) in far_ends.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    let other_arm = other.xy() - shared.xy();
                    let Some(angle) = angle_between(arm, other_arm) else {
                        continue;
                    };
                    let away = if tangent.dot(other_arm) > 0.0 { -tangent } else { tangent };
                    let angle = angle.max(1.0);
                    let magnitude = clamp_magnitude(constant / (angle * angle))
                        * pushed.multiplier
                        * other.multiplier;
                    graph.add_force(
                        pushed.id,
                        ForceKind::NeighbourConnectorRepulsion,
                        (away * magnitude).extend(0.0),
                    );
                }
            }
        }
    }
}
