//! Flipper motion model
//!
//! A [`FlipperMover`] owns the static [`FlipperGeometry`] and the live [`FlipperState`]
//! of one flipper. The actual torque integration belongs to the collision solver: it
//! reads the rotate command, works out an angular speed and feeds it back through
//! [`FlipperMover::step`]. Everything else only sees [`FlipperSnapshot`]s.
//!
//! ```
//! use vpin_physics::config::TableSettings;
//! use vpin_physics::flipper::{FlipperConfig, FlipperEvent, FlipperMover};
//!
//! let mut flipper = FlipperMover::new(&FlipperConfig::default(), 0.0, &TableSettings::default(), 1);
//! flipper.rotate_to_end();
//! let mut event = None;
//! while event.is_none() {
//!     event = flipper.step(-20.0, 0.001);
//! }
//! assert_eq!(event, Some(FlipperEvent::EndOfStroke));
//! ```

mod geometry;

pub use geometry::{ANGLE_EPSILON, FlipperGeometry, MIN_RADIUS};

use crate::collider::{Collider, ColliderInfo, ItemType, PhysicsMaterial};
use crate::config::TableSettings;
use crate::math::{Vec2, solve_quadratic};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Physics relevant flipper settings, angles in degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlipperConfig {
    pub name: String,
    pub center: Vec2,
    pub base_radius: f32,
    pub end_radius: f32,
    pub flipper_radius_max: f32,
    /// When set, the difficulty shortens the flipper down to this radius
    pub flipper_radius_min: f32,
    #[serde(rename = "return")]
    pub return_: f32,
    pub start_angle: f32,
    pub end_angle: f32,
    pub mass: f32,
    pub strength: f32,
    pub elasticity: f32,
    pub elasticity_falloff: f32,
    pub friction: f32,
    pub scatter: f32,
    pub ramp_up: f32,
    pub torque_damping: f32,
    pub torque_damping_angle: f32,
    pub height: f32,
    pub surface: String,
    pub override_physics: bool,
    pub is_enabled: bool,
}

impl Default for FlipperConfig {
    fn default() -> Self {
        Self {
            name: String::default(),
            center: Vec2::default(),
            base_radius: 21.5,
            end_radius: 13.0,
            flipper_radius_max: 130.0,
            flipper_radius_min: 0.0,
            return_: 0.058,
            start_angle: 121.0,
            end_angle: 70.0,
            mass: 1.0,
            strength: 2200.0,
            elasticity: 0.8,
            elasticity_falloff: 0.43,
            friction: 0.6,
            scatter: 0.0,
            ramp_up: 3.0,
            torque_damping: 0.75,
            torque_damping_angle: 6.0,
            height: 50.0,
            surface: String::default(),
            override_physics: false,
            is_enabled: true,
        }
    }
}

impl FlipperConfig {
    pub fn material(&self) -> PhysicsMaterial {
        PhysicsMaterial {
            elasticity: self.elasticity,
            elasticity_falloff: self.elasticity_falloff,
            friction: self.friction,
            scatter: self.scatter,
        }
    }
}

/// Where the solver should drive the flipper
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i8)]
pub enum RotateCommand {
    ToStart = -1,
    #[default]
    Idle = 0,
    ToEnd = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipperEvent {
    /// Reached the end angle while rotating towards it
    EndOfStroke,
    /// Back at the start angle after a release
    BeginOfStroke,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlipperState {
    /// Radians
    pub angle: f32,
    /// Radians per second
    pub angular_speed: f32,
    pub solenoid: bool,
    pub rotate: RotateCommand,
    /// Simulation time in seconds of the last solenoid change or stroke event
    pub last_transition_time: f32,
    pub is_in_contact: bool,
}

/// Read-only view of a flipper for renderers and scripts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlipperSnapshot {
    pub item_id: u32,
    pub angle: f32,
    pub angular_speed: f32,
    pub solenoid: bool,
    pub rotate: RotateCommand,
    pub stroke_fraction: f32,
    pub is_in_contact: bool,
}

#[derive(Debug, Clone)]
pub struct FlipperMover {
    geometry: FlipperGeometry,
    info: ColliderInfo,
    state: FlipperState,
    elapsed: f32,
}

impl FlipperMover {
    pub fn new(
        config: &FlipperConfig,
        surface_height: f32,
        settings: &TableSettings,
        item_id: u32,
    ) -> Self {
        let geometry = FlipperGeometry::new(config, surface_height, settings);
        let material = PhysicsMaterial::resolve(
            config.material(),
            config.override_physics,
            &settings.physics_override,
        );
        let info = ColliderInfo {
            fire_events: true,
            is_enabled: config.is_enabled,
            ..ColliderInfo::new(item_id, ItemType::Flipper).with_material(material)
        };
        let state = FlipperState {
            angle: geometry.angle_start,
            angular_speed: 0.0,
            solenoid: false,
            rotate: RotateCommand::Idle,
            last_transition_time: 0.0,
            is_in_contact: false,
        };
        Self {
            geometry,
            info,
            state,
            elapsed: 0.0,
        }
    }

    pub fn geometry(&self) -> &FlipperGeometry {
        &self.geometry
    }

    pub fn info(&self) -> &ColliderInfo {
        &self.info
    }

    pub fn state(&self) -> &FlipperState {
        &self.state
    }

    /// The pivot circle, which does not move with the flipper
    pub fn base_collider(&self) -> Collider {
        Collider::circle(
            self.geometry.center,
            self.geometry.base_radius,
            self.geometry.z_low,
            self.geometry.z_high,
            self.info,
        )
    }

    pub fn colliders(&self) -> Vec<Collider> {
        vec![self.base_collider()]
    }

    pub fn set_solenoid_state(&mut self, energized: bool) {
        if self.state.solenoid != energized {
            self.state.last_transition_time = self.elapsed;
        }
        self.state.solenoid = energized;
    }

    pub fn rotate_to_end(&mut self) {
        self.state.rotate = RotateCommand::ToEnd;
        self.set_solenoid_state(true);
    }

    pub fn rotate_to_start(&mut self) {
        self.state.rotate = RotateCommand::ToStart;
        self.set_solenoid_state(false);
    }

    pub fn set_in_contact(&mut self, in_contact: bool) {
        self.state.is_in_contact = in_contact;
    }

    pub fn target_angle(&self) -> f32 {
        if self.state.solenoid {
            self.geometry.angle_end
        } else {
            self.geometry.angle_start
        }
    }

    /// Advances the angle by `angular_speed` for `dtime` seconds.
    ///
    /// The angle stays within the flipper's range and the speed drops to zero at the
    /// stops. Hitting the stop the flipper was commanded to reports the matching event
    /// and resets the command to idle.
    pub fn step(&mut self, angular_speed: f32, dtime: f32) -> Option<FlipperEvent> {
        self.elapsed += dtime;
        let geometry = &self.geometry;
        let state = &mut self.state;
        state.angular_speed = angular_speed;
        state.angle += angular_speed * dtime;

        let hit_stop = if state.angle >= geometry.angle_max {
            state.angle = geometry.angle_max;
            angular_speed > 0.0
        } else if state.angle <= geometry.angle_min {
            state.angle = geometry.angle_min;
            angular_speed < 0.0
        } else {
            false
        };
        if !hit_stop {
            return None;
        }
        state.angular_speed = 0.0;

        let at_end = state.angle == geometry.angle_end;
        let event = match (at_end, state.rotate) {
            (true, RotateCommand::ToEnd) => FlipperEvent::EndOfStroke,
            (false, RotateCommand::ToStart) => FlipperEvent::BeginOfStroke,
            _ => return None,
        };
        state.rotate = RotateCommand::Idle;
        state.last_transition_time = self.elapsed;
        Some(event)
    }

    /// 0 at the start angle, 1 at the end angle
    pub fn stroke_fraction(&self) -> f32 {
        let span = self.geometry.span();
        if span == 0.0 {
            return 0.0;
        }
        (self.state.angle - self.geometry.angle_start) / span
    }

    /// Seconds until the flipper reaches `target` at constant angular acceleration,
    /// `None` if it never does.
    pub fn time_to_angle(&self, target: f32, angular_acceleration: f32) -> Option<f32> {
        let delta = target - self.state.angle;
        if delta == 0.0 {
            return Some(0.0);
        }
        let (t1, t2) = solve_quadratic(
            0.5 * angular_acceleration,
            self.state.angular_speed,
            -delta,
        )?;
        [t1, t2].into_iter().find(|t| *t >= 0.0)
    }

    /// 2D hull at the current angle, see [`FlipperGeometry::outline`]
    pub fn outline(&self, segments: usize) -> Vec<Vec2> {
        self.geometry.outline(self.state.angle, segments)
    }

    pub fn snapshot(&self) -> FlipperSnapshot {
        FlipperSnapshot {
            item_id: self.info.item_id,
            angle: self.state.angle,
            angular_speed: self.state.angular_speed,
            solenoid: self.state.solenoid,
            rotate: self.state.rotate,
            stroke_fraction: self.stroke_fraction(),
            is_in_contact: self.state.is_in_contact,
        }
    }
}
