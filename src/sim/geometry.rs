//! Swept blade geometry
//!
//! The blade is a line segment from the arm end to the blade tip. Hits are
//! found by solving where the segment's supporting line enters or leaves the
//! target circle, so a blade crossing a target within a single frame still
//! registers.

use glam::Vec2;

/// Squared length below which a segment is treated as a point
const DEGENERATE_LEN_SQ: f32 = 1e-8;

/// Test whether the segment `seg_start -> seg_end` touches a circle.
///
/// Solves `a t² + b t + c = 0` for the segment parameter and reports a hit
/// when either root lies in the closed interval `[0, 1]`. Tangent and
/// endpoint-on-boundary contacts count as hits.
pub fn sweep_hits_circle(seg_start: Vec2, seg_end: Vec2, center: Vec2, radius: f32) -> bool {
    let d = seg_end - seg_start;
    let f = seg_start - center;

    let a = d.length_squared();
    if a < DEGENERATE_LEN_SQ {
        return f.length_squared() <= radius * radius;
    }

    let b = 2.0 * f.dot(d);
    let c = f.length_squared() - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return false;
    }

    let root = discriminant.sqrt();
    let t1 = (-b - root) / (2.0 * a);
    let t2 = (-b + root) / (2.0 * a);

    (0.0..=1.0).contains(&t1) || (0.0..=1.0).contains(&t2)
}

/// Closest distance from `point` to the segment `a -> b`
pub fn distance_to_segment(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let line = b - a;
    let len_sq = line.length_squared();
    if len_sq < DEGENERATE_LEN_SQ {
        return point.distance(a);
    }
    let t = ((point - a).dot(line) / len_sq).clamp(0.0, 1.0);
    point.distance(a + line * t)
}

/// Circle overlap test (strict, touching circles do not overlap)
#[inline]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance(b) < radius_a + radius_b
}
