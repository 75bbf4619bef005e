//! Planar geometry helpers shared by the force contributors.
//!
//! Every helper returns `None` (or a neutral value) instead of dividing by a
//! vanishing length, so callers can treat degenerate input as "no force".

use glam::Vec2;

/// Lengths and denominators below this are treated as zero.
pub const EPSILON: f32 = 1e-6;

/// Bearing of a direction in degrees, normalized to `[0, 360)`.
///
/// Returns `None` for a zero-length direction.
pub fn bearing_degrees(direction: Vec2) -> Option<f32> {
    if direction.length_squared() < EPSILON * EPSILON {
        return None;
    }
    let degrees = direction.y.atan2(direction.x).to_degrees();
    Some(normalize_degrees(degrees))
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Signed shortest rotation from `from` to `to`, in degrees within `(-180, 180]`.
pub fn signed_angle_delta(from: f32, to: f32) -> f32 {
    let delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 { delta - 360.0 } else { delta }
}

/// Unsigned angle between two directions in degrees (`0..=180`).
pub fn angle_between(a: Vec2, b: Vec2) -> Option<f32> {
    let a = a.try_normalize()?;
    let b = b.try_normalize()?;
    Some(a.dot(b).clamp(-1.0, 1.0).acos().to_degrees())
}

/// Intersection of the segments `a0..a1` and `b0..b1`.
///
/// Returns the interpolation parameters `(t, u)` along each segment when both
/// lie in `[0, 1]`. Parallel and degenerate segments never intersect.
pub fn segment_intersection(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> Option<(f32, f32)> {
    let r = a1 - a0;
    let s = b1 - b0;
    let denominator = r.perp_dot(s);
    if denominator.abs() < EPSILON {
        return None;
    }

    let offset = b0 - a0;
    let t = offset.perp_dot(s) / denominator;
    let u = offset.perp_dot(r) / denominator;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some((t, u))
    } else {
        None
    }
}

/// Foot of the perpendicular from a point onto a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    /// Interpolation parameter of the foot along the segment, in `[0, 1]`.
    pub t: f32,
    /// The foot point itself.
    pub foot: Vec2,
    /// Distance from the point to the foot.
    pub distance: f32,
}

/// Project `point` onto the segment `a..b`.
///
/// Only succeeds when the projection falls within the segment, i.e. both the
/// angle at `a` and the angle at `b` are at most 90 degrees.
pub fn project_onto_segment(point: Vec2, a: Vec2, b: Vec2) -> Option<SegmentProjection> {
    let ab = b - a;
    let length_squared = ab.length_squared();
    if length_squared < EPSILON {
        return None;
    }
    if (point - a).dot(ab) < 0.0 || (point - b).dot(-ab) < 0.0 {
        return None;
    }

    let t = ((point - a).dot(ab) / length_squared).clamp(0.0, 1.0);
    let foot = a + ab * t;
    Some(SegmentProjection {
        t,
        foot,
        distance: point.distance(foot),
    })
}

/// Control point of the quadratic curve used for a link bent by `offset`.
///
/// The curve's apex ends up `offset` away from the chord midpoint, on the
/// counter-clockwise side of `start -> end` for positive offsets.
pub fn bent_control_point(start: Vec2, end: Vec2, offset: f32) -> Vec2 {
    let midpoint = (start + end) * 0.5;
    match (end - start).try_normalize() {
        Some(direction) => midpoint + direction.perp() * (2.0 * offset),
        None => midpoint,
    }
}

/// Arc length of the quadratic Bezier curve `p0, control, p2`.
///
/// Uses the closed form and falls back to the chord when the curve is
/// (nearly) a straight line or the closed form is not finite.
pub fn quadratic_bezier_length(p0: Vec2, control: Vec2, p2: Vec2) -> f32 {
    let chord = p0.distance(p2);
    let a = p0 - 2.0 * control + p2;
    let b = 2.0 * (control - p0);

    let qa = 4.0 * a.dot(a);
    let qb = 4.0 * a.dot(b);
    let qc = b.dot(b);
    if qa < EPSILON || qc < EPSILON {
        return chord;
    }

    let sabc = 2.0 * (qa + qb + qc).sqrt();
    let a2 = qa.sqrt();
    let a32 = 2.0 * qa * a2;
    let c2 = 2.0 * qc.sqrt();
    let ba = qb / a2;

    let log_denominator = ba + c2;
    let log_numerator = 2.0 * a2 + ba + sabc;
    if log_denominator.abs() < EPSILON || log_numerator / log_denominator <= 0.0 {
        return polyline_length(p0, control, p2);
    }

    let length = (a32 * sabc
        + a2 * qb * (sabc - c2)
        + (4.0 * qc * qa - qb * qb) * (log_numerator / log_denominator).ln())
        / (4.0 * a32);

    if length.is_finite() && length >= chord - EPSILON {
        length
    } else {
        polyline_length(p0, control, p2)
    }
}

/// Average of the chord and control polygon, a cheap bound-respecting estimate.
fn polyline_length(p0: Vec2, control: Vec2, p2: Vec2) -> f32 {
    let chord = p0.distance(p2);
    let polygon = p0.distance(control) + control.distance(p2);
    (chord + polygon) * 0.5
}
