//! Angle, quadratic and arc helpers

use super::Vec2;
use std::f32::consts::PI;

/// Converts an angle given in degrees, as stored in the table data, to radians
#[inline]
pub fn ang_to_rad(degrees: f32) -> f32 {
    degrees * (PI / 180.0)
}

#[inline]
pub fn rad_to_ang(radians: f32) -> f32 {
    radians * (180.0 / PI)
}

/// Solves `a·x² + b·x + c = 0` for real roots, smallest first.
///
/// Returns `None` when there is no real solution. A zero `a` degrades to the
/// linear equation, which yields the same root twice.
pub fn solve_quadratic(a: f32, b: f32, c: f32) -> Option<(f32, f32)> {
    if a == 0.0 {
        if b == 0.0 {
            return None;
        }
        let root = -c / b;
        return Some((root, root));
    }
    let discr = b * b - 4.0 * a * c;
    if discr < 0.0 {
        return None;
    }
    let sqrt_discr = discr.sqrt();
    // numerically stable variant, avoids cancellation when b ~ sqrt_discr
    let sign = if b >= 0.0 { 1.0 } else { -1.0 };
    let q = -0.5 * (b + sign * sqrt_discr);
    let (r1, r2) = if q == 0.0 {
        (0.0, 0.0)
    } else {
        (q / a, c / q)
    };
    Some(if r1 <= r2 { (r1, r2) } else { (r2, r1) })
}

/// Samples `segments + 1` points along an arc around `center`.
///
/// Angles are in radians, measured counter-clockwise from the +x axis. The first
/// point lies at `start_angle` and the last at `end_angle`.
pub fn arc_points(
    center: Vec2,
    radius: f32,
    start_angle: f32,
    end_angle: f32,
    segments: usize,
) -> Vec<Vec2> {
    let segments = segments.max(1);
    let step = (end_angle - start_angle) / segments as f32;
    (0..=segments)
        .map(|i| {
            let (sin, cos) = (start_angle + step * i as f32).sin_cos();
            Vec2::new(center.x + cos * radius, center.y + sin * radius)
        })
        .collect()
}
