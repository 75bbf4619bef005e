//! Node repulsion (Coulomb's law).
//!
//! Every force-accepting node is pushed away from every force-exerting node
//! with magnitude `constant / max(distance, 1)^2`, scaled by both nodes' force
//! multipliers and clamped to [`MAX_FORCE`](super::MAX_FORCE). With a
//! `horizon` set, exerters are looked up in an R-tree built once per tick
//! and pairs farther apart than the horizon are skipped.

use std::collections::HashMap;

use glam::Vec2;

use super::{
    Body, ForceContributor, ForceKind, ForceSetting, ForceSettings, bodies, clamp_magnitude,
};
use crate::graph::{Graph, NodeId};
use crate::spatial::SpatialIndex;

const CONSTANT: &str = "constant";
const HORIZON: &str = "horizon";

/// Pairwise inverse-square repulsion between nodes.
#[derive(Debug, Clone)]
pub struct RepulsionForce {
    enabled: bool,
    settings: ForceSettings,
}

impl Default for RepulsionForce {
    fn default() -> Self {
        Self {
            enabled: true,
            settings: ForceSettings::new()
                .with(ForceSetting::new(CONSTANT, 0.0, 1e7, 0, 5e5))
                // 0 disables the cutoff
                .with(ForceSetting::new(HORIZON, 0.0, 1e4, 0, 0.0)),
        }
    }
}

impl RepulsionForce {
    /// Signed repulsion magnitude between two nodes `distance` apart.
    ///
    /// Negative values point away from the other node.
    pub fn magnitude(constant: f32, distance: f32) -> f32 {
        let distance = distance.max(1.0);
        clamp_magnitude(-constant / (distance * distance))
    }
}

impl ForceContributor for RepulsionForce {
    fn kind(&self) -> ForceKind {
        ForceKind::Repulsion
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
        let exerting: Vec<&Body> = bodies.iter().filter(|body| body.exerts).collect();

        // with a horizon, only nearby exerters are visited
        let nearby = (horizon > 0.0).then(|| {
            let index = SpatialIndex::from_points(exerting.iter().map(|body| (body.id, body.xy())));
            let by_id: HashMap<NodeId, &Body> =
                exerting.iter().map(|&body| (body.id, body)).collect();
            (index, by_id)
        });

        for acted in bodies.iter().filter(|body| body.accepts) {
            let others: Vec<&Body> = match &nearby {
                Some((index, by_id)) => index
                    .around(acted.xy(), horizon)
                    .into_iter()
                    .filter_map(|id| by_id.get(&id).copied())
                    .collect(),
                None => exerting.clone(),
            };

            let mut total = Vec2::ZERO;
            for other in others.into_iter().filter(|other| other.id != acted.id) {
                let delta = other.xy() - acted.xy();
                let distance = delta.length();
                if horizon > 0.0 && distance > horizon {
                    continue;
                }
                // coincident nodes have no direction to push along
                let Some(direction) = delta.try_normalize() else {
                    continue;
                };
                let scale = acted.multiplier * other.multiplier;
                total += direction * Self::magnitude(constant, distance) * scale;
            }
            graph.add_force(acted.id, ForceKind::Repulsion, total.extend(0.0));
        }
    }
}
