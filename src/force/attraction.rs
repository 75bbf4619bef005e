//! Link attraction (Hooke's law).
//!
//! Each visible link acts as a spring between its endpoints. The force
//! magnitude is `constant * (length - rest_length)` along the chord, pulling
//! the endpoints together when stretched and apart when compressed. For bent
//! links the length is the arc length of the link's quadratic curve.

use serde::{Deserialize, Serialize};

use super::{ForceContributor, ForceKind, ForceSetting, ForceSettings, clamp_magnitude, segments};
use crate::geometry::{bent_control_point, quadratic_bezier_length};
use crate::graph::Graph;

const CONSTANT: &str = "constant";
const REST_LENGTH: &str = "restLength";

/// Where a spring's rest length comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RestLength {
    /// The `restLength` setting, shared by every link.
    #[default]
    Fixed,
    /// Each link's label footprint, so labels fit between the endpoints.
    LabelFootprint,
}

/// Spring attraction along links.
#[derive(Debug, Clone)]
pub struct AttractionForce {
    enabled: bool,
    rest_length: RestLength,
    settings: ForceSettings,
}

impl Default for AttractionForce {
    fn default() -> Self {
        Self {
            enabled: true,
            rest_length: RestLength::Fixed,
            settings: ForceSettings::new()
                .with(ForceSetting::new(CONSTANT, 0.0, 10.0, 3, 0.1))
                .with(ForceSetting::new(REST_LENGTH, 0.0, 1000.0, 0, 100.0)),
        }
    }
}

impl AttractionForce {
    pub fn rest_length_mode(&self) -> RestLength {
        self.rest_length
    }

    pub fn set_rest_length_mode(&mut self, mode: RestLength) {
        self.rest_length = mode;
    }

    /// Signed spring magnitude; positive pulls the endpoints together.
    pub fn magnitude(constant: f32, length: f32, rest_length: f32) -> f32 {
        clamp_magnitude(constant * (length - rest_length))
    }
}

impl ForceContributor for AttractionForce {
    fn kind(&self) -> ForceKind {
        ForceKind::Attraction
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
        let fixed_rest = self.settings.value(REST_LENGTH);

        for segment in segments(graph) {
            let (a, b) = (segment.a(), segment.b());
            // coincident endpoints give no direction
            let Some(direction) = (b - a).try_normalize() else {
                continue;
            };
            let length = if segment.bending_offset != 0.0 {
                let control = bent_control_point(a, b, segment.bending_offset);
                quadratic_bezier_length(a, control, b)
            } else {
                a.distance(b)
            };
            let rest = match self.rest_length {
                RestLength::Fixed => fixed_rest,
                RestLength::LabelFootprint => segment.label_footprint,
            };

            let pull = direction * Self::magnitude(constant, length, rest) * segment.factor();
            if segment.start.accepts {
                graph.add_force(segment.start.id, ForceKind::Attraction, pull.extend(0.0));
            }
            if segment.end.accepts {
                graph.add_force(segment.end.id, ForceKind::Attraction, (-pull).extend(0.0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::force::test_support::graph_with_points;
    use float_cmp::approx_eq;
    use glam::{Vec2, Vec3};

    fn spring(rest: f32) -> AttractionForce {
        let mut force = AttractionForce::default();
        force.settings_mut().set(REST_LENGTH, rest);
        force
    }

    #[test]
    fn test_scenario_rest_zero() {
        let (mut graph, ids) = graph_with_points(&[(0.0, 0.0), (100.0, 0.0)]);
        graph.add_link(ids[0], ids[1]).unwrap();
        spring(0.0).update_forces(&mut graph, 0.0, 0.0);

        let start = graph.node(ids[0]).unwrap().force(ForceKind::Attraction);
        let end = graph.node(ids[1]).unwrap().force(ForceKind::Attraction);
        assert!(approx_eq!(f32, start.x, 10.0, epsilon = 1e-4));
        assert!(approx_eq!(f32, end.x, -10.0, epsilon = 1e-4));
    }

    #[test]
    fn test_zero_at_rest_length() {
        let (mut graph, ids) = graph_with_points(&[(0.0, 0.0), (60.0, 80.0)]);
        graph.add_link(ids[0], ids[1]).unwrap();
        spring(100.0).update_forces(&mut graph, 0.0, 0.0);
        assert_eq!(graph.node(ids[0]).unwrap().total_force(), Vec3::ZERO);
    }

    #[test]
    fn test_direction_reverses_across_rest_length() {
        let stretched = AttractionForce::magnitude(0.1, 150.0, 100.0);
        let compressed = AttractionForce::magnitude(0.1, 50.0, 100.0);
        assert!(stretched > 0.0);
        assert!(compressed < 0.0);
    }

    #[test]
    fn test_coincident_endpoints_are_guarded() {
        let (mut graph, ids) = graph_with_points(&[(3.0, 3.0), (3.0, 3.0)]);
        graph.add_link(ids[0], ids[1]).unwrap();
        spring(100.0).update_forces(&mut graph, 0.0, 0.0);
        assert_eq!(graph.node(ids[0]).unwrap().total_force(), Vec3::ZERO);
    }

    #[test]
    fn test_spring_fades_with_a_hidden_endpoint() {
        let (mut graph, ids) = graph_with_points(&[(0.0, 0.0), (300.0, 0.0)]);
        graph.add_link(ids[0], ids[1]).unwrap();
        let force = spring(100.0);

        force.update_forces(&mut graph, 0.0, 0.0);
        let full = graph.node(ids[0]).unwrap().force(ForceKind::Attraction).x;
        assert!(approx_eq!(f32, full, 20.0, epsilon = 1e-4));

        graph.try_node_mut(ids[1]).unwrap().set_visible(false);
        graph.reset_forces();
        force.update_forces(&mut graph, 0.0, 0.0);
        let hidden = graph.node(ids[0]).unwrap().force(ForceKind::Attraction).x;
        assert!(approx_eq!(f32, hidden, full, epsilon = 1e-4));

        graph.advance_fades(1.0);
        graph.reset_forces();
        force.update_forces(&mut graph, 0.0, 0.0);
        let halfway = graph.node(ids[0]).unwrap().force(ForceKind::Attraction).x;
        let multiplier = graph.node(ids[1]).unwrap().force_multiplier();
        assert!(halfway > 0.0 && halfway < full);
        assert!(approx_eq!(f32, halfway, full * multiplier, epsilon = 1e-4));

        graph.advance_fades(1.0);
        graph.reset_forces();
        force.update_forces(&mut graph, 0.0, 0.0);
        assert_eq!(graph.node(ids[0]).unwrap().total_force(), Vec3::ZERO);
    }

    #[test]
    fn test_label_footprint_rest_length() {
        let (mut graph, ids) = graph_with_points(&[(0.0, 0.0), (50.0, 0.0)]);
        let link = graph.add_link(ids[0], ids[1]).unwrap();
        graph.try_link_mut(link).unwrap().label_size = Vec2::new(30.0, 40.0);

        let mut force = AttractionForce::default();
        force.set_rest_length_mode(RestLength::LabelFootprint);
        force.update_forces(&mut graph, 0.0, 0.0);
        assert_eq!(graph.node(ids[0]).unwrap().total_force(), Vec3::ZERO);
    }

    #[test]
    fn test_bent_link_pulls_harder() {
        let (mut graph, ids) = graph_with_points(&[(0.0, 0.0), (100.0, 0.0)]);
        let link = graph.add_link(ids[0], ids[1]).unwrap();
        graph.try_link_mut(link).unwrap().bending_offset = 25.0;
        spring(0.0).update_forces(&mut graph, 0.0, 0.0);

        let start = graph.node(ids[0]).unwrap().force(ForceKind::Attraction);
        assert!(start.x > 10.0);
        assert_eq!(start.y, 0.0);
    }

    #[test]
    fn test_non_accepting_endpoint_is_untouched() {
        let (mut graph, ids) = graph_with_points(&[(0.0, 0.0), (100.0, 0.0)]);
        graph.add_link(ids[0], ids[1]).unwrap();
        graph.try_node_mut(ids[1]).unwrap().set_accepts_forces(false);
        spring(0.0).update_forces(&mut graph, 0.0, 0.0);

        assert_eq!(graph.node(ids[1]).unwrap().total_force(), Vec3::ZERO);
        assert!(graph.node(ids[0]).unwrap().total_force().x > 0.0);
    }
}
