use super::FlipperConfig;
use crate::config::TableSettings;
use crate::math::{Vec2, ang_to_rad, arc_points};
use log::warn;
use serde::Serialize;
use std::f32::consts::{FRAC_PI_2, PI};

/// Smallest radius any part of a flipper can have
pub const MIN_RADIUS: f32 = 0.01;

/// Added to the end angle when it equals the start angle
pub const ANGLE_EPSILON: f32 = 0.0001;

/// Static flipper parameters, derived once from the configuration.
///
/// Angles are in radians. An angle of 0 points up the table (-y) and grows clockwise
/// as seen from above, so the direction at angle `a` is `(sin a, -cos a)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlipperGeometry {
    pub center: Vec2,
    pub base_radius: f32,
    pub end_radius: f32,
    /// Distance between the base and the tip circle centers
    pub flipper_radius: f32,
    pub angle_start: f32,
    pub angle_end: f32,
    pub angle_min: f32,
    pub angle_max: f32,
    pub z_low: f32,
    pub z_high: f32,
    pub mass: f32,
    /// Rod rotating around one end, `1/3 m r²`
    pub inertia: f32,
    /// Angle between the flipper axis and its face normals
    pub face_normal_offset: f32,
    /// Normal of the right face at angle 0
    pub zero_angle_normal: Vec2,
    pub strength: f32,
    pub return_ratio: f32,
    pub ramp_up: f32,
    pub torque_damping: f32,
    pub torque_damping_angle: f32,
}

impl FlipperGeometry {
    pub fn new(config: &FlipperConfig, surface_height: f32, settings: &TableSettings) -> Self {
        let base_radius = clamp_radius(config.base_radius, "base radius", &config.name);
        let end_radius = clamp_radius(config.end_radius, "end radius", &config.name);
        let flipper_radius = clamp_radius(
            flipper_radius(config, settings.difficulty),
            "flipper radius",
            &config.name,
        );

        let angle_start = finite_angle(config.start_angle, "start angle", &config.name);
        let mut angle_end = finite_angle(config.end_angle, "end angle", &config.name);
        if angle_end == angle_start {
            warn!(
                "Flipper {} has the same start and end angle, adding {ANGLE_EPSILON} rad",
                config.name
            );
            // at large angles the epsilon is below the f32 resolution, step at least one ulp
            angle_end = angle_start + ANGLE_EPSILON.max(angle_start.abs() * f32::EPSILON);
        }

        let mass = if config.mass > 0.0 {
            config.mass
        } else {
            warn!(
                "Flipper {} has invalid mass {}, using 1",
                config.name, config.mass
            );
            1.0
        };

        let fa = ((base_radius - end_radius) / flipper_radius)
            .clamp(-1.0, 1.0)
            .asin();
        let face_normal_offset = FRAC_PI_2 - fa;

        Self {
            center: config.center,
            base_radius,
            end_radius,
            flipper_radius,
            angle_start,
            angle_end,
            angle_min: angle_start.min(angle_end),
            angle_max: angle_start.max(angle_end),
            z_low: surface_height,
            z_high: surface_height + config.height,
            mass,
            inertia: mass * flipper_radius * flipper_radius / 3.0,
            face_normal_offset,
            zero_angle_normal: Vec2::new(face_normal_offset.sin(), -face_normal_offset.cos()),
            strength: config.strength,
            return_ratio: config.return_,
            ramp_up: config.ramp_up,
            torque_damping: config.torque_damping,
            torque_damping_angle: config.torque_damping_angle,
        }
    }

    /// `+1` when the flipper swings clockwise towards its end angle, `-1` otherwise
    pub fn direction(&self) -> f32 {
        if self.angle_end >= self.angle_start {
            1.0
        } else {
            -1.0
        }
    }

    pub fn span(&self) -> f32 {
        self.angle_end - self.angle_start
    }

    /// Center of the tip circle at `angle`
    pub fn tip_center(&self, angle: f32) -> Vec2 {
        self.center + direction(angle) * self.flipper_radius
    }

    /// 2D hull of the flipper at `angle`, counter-clockwise, `segments` per arc.
    ///
    /// Walks around the back of the base circle, along the left face, around the tip
    /// and back along the right face.
    pub fn outline(&self, angle: f32, segments: usize) -> Vec<Vec2> {
        let off = self.face_normal_offset;
        // arc_points measures from +x, flipper angles from -y
        let to_arc = |a: f32| a - FRAC_PI_2;
        let mut points = arc_points(
            self.center,
            self.base_radius,
            to_arc(angle + off),
            to_arc(angle + 2.0 * PI - off),
            segments,
        );
        points.extend(arc_points(
            self.tip_center(angle),
            self.end_radius,
            to_arc(angle - off),
            to_arc(angle + off),
            segments,
        ));
        points
    }
}

fn direction(angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(sin, -cos)
}

/// Flippers with a minimum radius get shorter as the difficulty goes up, but never so
/// short that the tip circle swallows the base circle.
fn flipper_radius(config: &FlipperConfig, difficulty: f32) -> f32 {
    let max = config.flipper_radius_max;
    let min = config.flipper_radius_min;
    if min > 0.0 && max > min {
        let radius = max - (max - min) * difficulty.clamp(0.0, 1.0);
        radius.max(config.base_radius - config.end_radius + 0.05)
    } else {
        max
    }
}

/// Angle in radians, 0 for values that are not finite
fn finite_angle(degrees: f32, what: &str, name: &str) -> f32 {
    let radians = ang_to_rad(degrees);
    if radians.is_finite() {
        radians
    } else {
        warn!("Flipper {name} has {what} {degrees}, using 0");
        0.0
    }
}

fn clamp_radius(value: f32, what: &str, name: &str) -> f32 {
    if value >= MIN_RADIUS {
        value
    } else {
        warn!("Flipper {name} has {what} {value}, clamping to {MIN_RADIUS}");
        MIN_RADIUS
    }
}
