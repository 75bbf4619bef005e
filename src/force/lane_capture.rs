//! Lane capture.
//!
//! Nodes tagged with a lane are pulled horizontally into that lane. Lanes
//! split the viewport width into equal columns in order of first appearance;
//! each tagged node's left edge is pulled toward its lane's centre x with a
//! spring of strength `constant`. Disabled unless the host turns it on.

use super::{ForceContributor, ForceKind, ForceSetting, ForceSettings, clamp_magnitude};
use crate::graph::Graph;
use glam::Vec3;

const CONSTANT: &str = "constant";

/// Horizontal pull of tagged nodes toward their lane.
#[derive(Debug, Clone)]
pub struct LaneCaptureForce {
    enabled: bool,
    settings: ForceSettings,
}

impl Default for LaneCaptureForce {
    fn default() -> Self {
        Self {
            enabled: false,
            settings: ForceSettings::new().with(ForceSetting::new(CONSTANT, 0.0, 10.0, 3, 0.2)),
        }
    }
}

/// Distinct lane tags of visible nodes, in order of first appearance.
pub fn lane_order(graph: &Graph) -> Vec<String> {
    let mut lanes: Vec<String> = Vec::new();
    for node in graph.nodes().filter(|node| node.is_visible()) {
        if let Some(lane) = &node.lane {
            if !lanes.contains(lane) {
                lanes.push(lane.clone());
            }
        }
    }
    lanes
}

impl ForceContributor for LaneCaptureForce {
    fn kind(&self) -> ForceKind {
        ForceKind::LaneCapture
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

    fn update_forces(&self, graph: &mut Graph, viewport_width: f32, _viewport_height: f32) {
        if !self.enabled || viewport_width.is_nan() || viewport_width <= 0.0 {
            return;
        }
        let lanes = lane_order(graph);
        if lanes.is_empty() {
            return;
        }
        let constant = self.settings.value(CONSTANT);
        let lane_width = viewport_width / lanes.len() as f32;

        let pulls: Vec<_> = graph
            .nodes()
            .filter(|node| node.accepts_forces())
            .filter_map(|node| {
                let slot = lanes.iter().position(|lane| Some(lane) == node.lane.as_ref())?;
                let center = (slot as f32 + 0.5) * lane_width;
                let left_edge = node.bounding_box().0.x;
                let magnitude = clamp_magnitude(constant * (center - left_edge));
                Some((node.id(), magnitude * node.force_multiplier()))
            })
            .collect();

        for (id, magnitude) in pulls {
            graph.add_force(id, ForceKind::LaneCapture, Vec3::X * magnitude);
        }
    }
}
