//! Discrete-angle moment.
//!
//! Links with preferred angles are turned toward the nearest one. The
//! deviation between the link's bearing and that angle becomes a torque
//! (`deviation * constant`, deviation in radians), applied as a tangential
//! force of `torque * half_length` at each endpoint in opposite directions.

use super::{ForceContributor, ForceKind, ForceSetting, ForceSettings, clamp_magnitude, segments};
use crate::geometry::{bearing_degrees, signed_angle_delta};
use crate::graph::Graph;

const CONSTANT: &str = "constant";

/// Deviations smaller than this many degrees count as aligned.
const ALIGNED_TOLERANCE: f32 = 1e-4;

/// Restoring torque toward each link's nearest preferred angle.
#[derive(Debug, Clone)]
pub struct DiscreteAngleForce {
    enabled: bool,
    settings: ForceSettings,
}

impl Default for DiscreteAngleForce {
    fn default() -> Self {
        Self {
            enabled: true,
            settings: ForceSettings::new().with(ForceSetting::new(CONSTANT, 0.0, 10.0, 3, 0.5)),
        }
    }
}

/// Signed deviation in degrees of `bearing` from the closest of `preferred`.
///
/// Positive when the bearing is counter-clockwise of the preferred angle.
pub fn deviation_from_nearest(bearing: f32, preferred: &[f32]) -> Option<f32> {
    preferred
        .iter()
        .map(|&angle| signed_angle_delta(angle, bearing))
        .min_by(|a, b| a.abs().total_cmp(&b.abs()))
}

impl ForceContributor for DiscreteAngleForce {
    fn kind(&self) -> ForceKind {
        ForceKind::DiscreteAngles
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

        for segment in segments(graph) {
            if segment.preferred_angles.is_empty() {
                continue;
            }
            let chord = segment.b() - segment.a();
            let (Some(bearing), Some(direction)) = (bearing_degrees(chord), chord.try_normalize())
            else {
                continue;
            };
            let Some(deviation) = deviation_from_nearest(bearing, &segment.preferred_angles) else {
                continue;
            };
            if deviation.abs() < ALIGNED_TOLERANCE {
                continue;
            }

            let torque = deviation.to_radians() * constant;
            let half_length = chord.length() * 0.5;
            let magnitude = clamp_magnitude(torque * half_length) * segment.factor();

            // perp() turns counter-clockwise, the direction that grows the bearing
            let tangent = direction.perp() * magnitude;
            if segment.start.accepts {
                graph.add_force(segment.start.id, ForceKind::DiscreteAngles, tangent.extend(0.0));
            }
            if segment.end.accepts {
                graph.add_force(segment.end.id, ForceKind::DiscreteAngles, (-tangent).extend(0.0));
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

    fn run(points: &[(f32, f32)], angles: &[f32]) -> (Vec3, Vec3) {
        let (mut graph, ids) = graph_with_points(points);
        let link = graph.add_link(ids[0], ids[1]).unwrap();
        graph.try_link_mut(link).unwrap().preferred_angles = angles.to_vec();
        DiscreteAngleForce::default().update_forces(&mut graph, 0.0, 0.0);
        (
            graph.node(ids[0]).unwrap().force(ForceKind::DiscreteAngles),
            graph.node(ids[1]).unwrap().force(ForceKind::DiscreteAngles),
        )
    }

    #[test]
    fn test_nearest_deviation() {
        assert_eq!(deviation_from_nearest(10.0, &[0.0, 90.0]), Some(10.0));
        assert_eq!(deviation_from_nearest(80.0, &[0.0, 90.0]), Some(-10.0));
        assert!(approx_eq!(
            f32,
            deviation_from_nearest(355.0, &[0.0, 180.0]).unwrap(),
            -5.0,
            epsilon = 1e-4
        ));
        assert_eq!(deviation_from_nearest(10.0, &[]), None);
    }

    #[test]
    fn test_zero_at_preferred_angle() {
        let (start, end) = run(&[(0.0, 0.0), (0.0, 100.0)], &[0.0, 90.0]);
        assert_eq!(start, Vec3::ZERO);
        assert_eq!(end, Vec3::ZERO);
    }

    #[test]
    fn test_no_preferred_angles_no_force() {
        let (start, end) = run(&[(0.0, 0.0), (100.0, 37.0)], &[]);
        assert_eq!(start, Vec3::ZERO);
        assert_eq!(end, Vec3::ZERO);
    }

    #[test]
    fn test_torque_rotates_toward_preferred() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(100.0, 20.0);
        let (start, end) = run(&[(a.x, a.y), (b.x, b.y)], &[0.0]);

        // opposite tangential forces
        assert!(approx_eq!(f32, (start + end).length(), 0.0, epsilon = 1e-3));
        assert!(approx_eq!(f32, end.truncate().dot(b - a), 0.0, epsilon = 1e-2));

        // nudging the endpoints along their forces reduces the bearing
        let before = bearing_degrees(b - a).unwrap();
        let after = bearing_degrees((b + end.truncate() * 1e-3) - (a + start.truncate() * 1e-3))
            .unwrap();
        assert!(after < before);
    }

    #[test]
    fn test_coincident_endpoints_are_skipped() {
        let (start, end) = run(&[(4.0, 4.0), (4.0, 4.0)], &[45.0]);
        assert_eq!(start, Vec3::ZERO);
        assert_eq!(end, Vec3::ZERO);
    }
}
