//! Plunger motion model
//!
//! The plunger travels along the table's y axis. Pulled all the way back its tip sits
//! at `begin_y`, the configured center. Fired all the way it reaches `end_y`, one
//! stroke further up the table. At rest it waits at the park position in between.
//!
//! The travel is sampled into a fixed number of frames, which the renderer and the
//! collision boundary share.

pub mod desc;
pub mod mesh;

use crate::collider::{Collider, ColliderInfo, ItemType, PhysicsMaterial};
use crate::config::TableSettings;
use crate::math::Vec2;
use crate::mesh::Mesh;
use desc::PlungerDesc;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Inset of the side lines, keeps them apart from the corner joints
const SIDE_INSET: f32 = 0.0001;

/// Height of the collision boundary above the surface
const BOUNDARY_HEIGHT: f32 = 50.0;

/// Longest accepted stroke, far beyond any real table length
pub const MAX_STROKE: f32 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(test, derive(fake::Dummy))]
pub enum PlungerType {
    Modern = 1,
    Flat = 2,
    Custom = 3,
}

/// Serialize to lowercase string
impl Serialize for PlungerType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PlungerType::Modern => serializer.serialize_str("modern"),
            PlungerType::Flat => serializer.serialize_str("flat"),
            PlungerType::Custom => serializer.serialize_str("custom"),
        }
    }
}

/// Deserialize from lowercase string
/// or from the number used in table files
impl<'de> Deserialize<'de> for PlungerType {
    fn deserialize<D>(deserializer: D) -> Result<PlungerType, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PlungerTypeVisitor;

        impl serde::de::Visitor<'_> for PlungerTypeVisitor {
            type Value = PlungerType;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a string or number representing a PlungerType")
            }

            fn visit_u64<E>(self, value: u64) -> Result<PlungerType, E>
            where
                E: serde::de::Error,
            {
                match value {
                    1 => Ok(PlungerType::Modern),
                    2 => Ok(PlungerType::Flat),
                    3 => Ok(PlungerType::Custom),
                    _ => Err(serde::de::Error::invalid_value(
                        serde::de::Unexpected::Unsigned(value),
                        &"1, 2, or 3",
                    )),
                }
            }

            fn visit_str<E>(self, value: &str) -> Result<PlungerType, E>
            where
                E: serde::de::Error,
            {
                match value {
                    "modern" => Ok(PlungerType::Modern),
                    "flat" => Ok(PlungerType::Flat),
                    "custom" => Ok(PlungerType::Custom),
                    _ => Err(serde::de::Error::unknown_variant(
                        value,
                        &["modern", "flat", "custom"],
                    )),
                }
            }
        }

        deserializer.deserialize_any(PlungerTypeVisitor)
    }
}

/// Physics relevant plunger settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlungerConfig {
    pub name: String,
    pub center: Vec2,
    /// Half the width of the lane, also the radius unit of the lathe
    pub width: f32,
    pub height: f32,
    pub z_adjust: f32,
    pub stroke: f32,
    /// VP units per millisecond
    pub speed_pull: f32,
    /// VP units per millisecond
    pub speed_fire: f32,
    #[serde(rename = "type")]
    pub plunger_type: PlungerType,
    /// Rest position as a fraction of the stroke, measured from the fully fired end
    pub park_position: f32,
    pub tip_shape: String,
    pub rod_diam: f32,
    pub ring_gap: f32,
    pub ring_diam: f32,
    pub ring_width: f32,
    pub spring_diam: f32,
    pub spring_gauge: f32,
    pub spring_loops: f32,
    pub spring_end_loops: f32,
    pub surface: String,
    pub is_enabled: bool,
}

impl Default for PlungerConfig {
    fn default() -> Self {
        Self {
            name: String::default(),
            center: Vec2::default(),
            width: 25.0,
            height: 20.0,
            z_adjust: 0.0,
            stroke: 80.0,
            speed_pull: 0.5,
            speed_fire: 80.0,
            plunger_type: PlungerType::Modern,
            park_position: 0.5 / 3.0,
            tip_shape: "0 .34; 2 .6; 3 .64; 5 .7; 7 .84; 8 .88; 9 .9; 11 .92; 14 .92; 39 .84"
                .to_string(),
            rod_diam: 0.6,
            ring_gap: 2.0,
            ring_diam: 0.94,
            ring_width: 3.0,
            spring_diam: 0.77,
            spring_gauge: 1.38,
            spring_loops: 8.0,
            spring_end_loops: 2.5,
            surface: String::default(),
            is_enabled: true,
        }
    }
}

/// Static plunger parameters, derived once from the configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlungerGeometry {
    pub center: Vec2,
    pub width: f32,
    /// Tip position when pulled all the way back
    pub begin_y: f32,
    /// Tip position when fired all the way, also the frame top
    pub end_y: f32,
    pub stroke: f32,
    pub frame_count: u32,
    /// Tip travel per frame, negative or zero
    pub frame_dy: f32,
    pub rest_position: f32,
    /// Left and right edge of the collision boundary
    pub x: f32,
    pub x2: f32,
    /// Base line of the collision boundary
    pub y: f32,
    pub z_low: f32,
    pub z_high: f32,
    /// Height of the rod axis
    pub z_axis: f32,
    pub speed_pull: f32,
    pub speed_fire: f32,
    pub desc: PlungerDesc,
}

impl PlungerGeometry {
    pub fn new(config: &PlungerConfig, surface_height: f32) -> Self {
        let stroke = if (0.0..=MAX_STROKE).contains(&config.stroke) {
            config.stroke
        } else if config.stroke > MAX_STROKE {
            warn!(
                "Plunger {} has stroke {}, clamping to {MAX_STROKE}",
                config.name, config.stroke
            );
            MAX_STROKE
        } else {
            warn!(
                "Plunger {} has invalid stroke {}, using 0",
                config.name, config.stroke
            );
            0.0
        };
        let park = if (0.0..=1.0).contains(&config.park_position) {
            config.park_position
        } else {
            warn!(
                "Plunger {} has park position {} outside 0..1, clamping",
                config.name, config.park_position
            );
            config.park_position.clamp(0.0, 1.0)
        };

        let begin_y = config.center.y;
        let end_y = begin_y - stroke;
        let frame_count = ((stroke * (25.0 / 80.0)) as u32 + 1).max(1);
        let frame_dy = if frame_count > 1 {
            (end_y - begin_y) / (frame_count - 1) as f32
        } else {
            0.0
        };

        Self {
            center: config.center,
            width: config.width,
            begin_y,
            end_y,
            stroke,
            frame_count,
            frame_dy,
            rest_position: end_y + park * stroke,
            x: config.center.x - config.width,
            x2: config.center.x + config.width,
            y: config.center.y + config.height,
            z_low: surface_height,
            z_high: surface_height + BOUNDARY_HEIGHT,
            z_axis: surface_height + config.z_adjust + config.width,
            speed_pull: config.speed_pull,
            speed_fire: config.speed_fire,
            desc: PlungerDesc::for_config(config),
        }
    }

    pub fn frame_top(&self) -> f32 {
        self.end_y
    }

    /// Tip y of a render frame, frame 0 is pulled all the way back
    pub fn frame_y(&self, frame: u32) -> f32 {
        let frame = frame.min(self.frame_count - 1);
        self.begin_y + frame as f32 * self.frame_dy
    }

    /// Boundary position for a collision frame, from the rest position at frame 0 to
    /// the frame top at the last frame
    pub fn collision_position(&self, frame: u32) -> f32 {
        if self.frame_count <= 1 {
            return self.rest_position;
        }
        let t = frame.min(self.frame_count - 1) as f32 / (self.frame_count - 1) as f32;
        self.rest_position * (1.0 - t) + self.frame_top() * t
    }

    /// Closest render frame for a tip position
    pub fn frame_for_position(&self, position: f32) -> u32 {
        if self.frame_dy == 0.0 {
            return 0;
        }
        let frame = ((position - self.begin_y) / self.frame_dy).round();
        frame.clamp(0.0, (self.frame_count - 1) as f32) as u32
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlungerAction {
    #[default]
    Resting,
    Pulling,
    Firing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlungerState {
    /// Tip y
    pub position: f32,
    /// VP units per millisecond, positive towards the player
    pub speed: f32,
    pub action: PlungerAction,
    /// Simulation time in seconds of the last action change
    pub last_transition_time: f32,
}

/// Read-only view of a plunger for renderers and scripts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlungerSnapshot {
    pub item_id: u32,
    pub position: f32,
    pub speed: f32,
    pub action: PlungerAction,
    pub frame: u32,
}

#[derive(Debug, Clone)]
pub struct PlungerMover {
    geometry: PlungerGeometry,
    info: ColliderInfo,
    state: PlungerState,
    elapsed: f32,
}

impl PlungerMover {
    pub fn new(
        config: &PlungerConfig,
        surface_height: f32,
        settings: &TableSettings,
        item_id: u32,
    ) -> Self {
        let geometry = PlungerGeometry::new(config, surface_height);
        let info = ColliderInfo {
            is_enabled: config.is_enabled,
            ..ColliderInfo::new(item_id, ItemType::Plunger)
                .with_material(PhysicsMaterial::resolve(
                    PhysicsMaterial::default(),
                    false,
                    &settings.physics_override,
                ))
        };
        let state = PlungerState {
            position: geometry.rest_position,
            speed: 0.0,
            action: PlungerAction::Resting,
            last_transition_time: 0.0,
        };
        Self {
            geometry,
            info,
            state,
            elapsed: 0.0,
        }
    }

    pub fn geometry(&self) -> &PlungerGeometry {
        &self.geometry
    }

    pub fn info(&self) -> &ColliderInfo {
        &self.info
    }

    pub fn state(&self) -> &PlungerState {
        &self.state
    }

    pub fn frame_y(&self, frame: u32) -> f32 {
        self.geometry.frame_y(frame)
    }

    pub fn current_frame(&self) -> u32 {
        self.geometry.frame_for_position(self.state.position)
    }

    /// Boundary of a collision frame, see [`Self::boundary_at`]
    pub fn collision_boundary(&self, frame: u32) -> Vec<Collider> {
        self.boundary_at(self.geometry.collision_position(frame))
    }

    /// Collision boundary with the tip at `position`.
    ///
    /// The first three colliders are static: the base line and its two corner joints.
    /// The other five move with the tip: two side lines, the end line and its two
    /// corner joints. The lines run counter-clockwise so their normals face outwards.
    pub fn boundary_at(&self, position: f32) -> Vec<Collider> {
        let PlungerGeometry {
            x,
            x2,
            y,
            z_low,
            z_high,
            ..
        } = self.geometry;
        let info = self.info;
        let line = |v1: Vec2, v2: Vec2| Collider::line_seg(v1, v2, z_low, z_high, info);
        let joint = |xy: Vec2| Collider::line_z(xy, z_low, z_high, info);

        vec![
            line(Vec2::new(x, y), Vec2::new(x2, y)),
            joint(Vec2::new(x, y)),
            joint(Vec2::new(x2, y)),
            line(
                Vec2::new(x2 - SIDE_INSET, y),
                Vec2::new(x2 - SIDE_INSET, position),
            ),
            line(
                Vec2::new(x + SIDE_INSET, position),
                Vec2::new(x + SIDE_INSET, y),
            ),
            line(Vec2::new(x2, position), Vec2::new(x, position)),
            joint(Vec2::new(x, position)),
            joint(Vec2::new(x2, position)),
        ]
    }

    pub fn pull_back(&mut self) {
        self.set_action(PlungerAction::Pulling);
    }

    pub fn release(&mut self) {
        self.set_action(PlungerAction::Firing);
    }

    fn set_action(&mut self, action: PlungerAction) {
        if self.state.action != action {
            self.state.action = action;
            self.state.last_transition_time = self.elapsed;
        }
    }

    /// Moves the tip for `dtime` seconds.
    ///
    /// Pulling travels back to `begin_y` and holds there. Firing travels to the frame
    /// top, after which the plunger rests and springs back to its park position.
    pub fn step(&mut self, dtime: f32) {
        self.elapsed += dtime;
        let ms = dtime * 1000.0;
        let g = &self.geometry;
        let position = self.state.position;

        let (position, speed) = match self.state.action {
            PlungerAction::Pulling => {
                let p = (position + g.speed_pull * ms).min(g.begin_y);
                (p, if p < g.begin_y { g.speed_pull } else { 0.0 })
            }
            PlungerAction::Firing => {
                let p = (position - g.speed_fire * ms).max(g.frame_top());
                (p, if p > g.frame_top() { -g.speed_fire } else { 0.0 })
            }
            PlungerAction::Resting => {
                let rest = g.rest_position;
                let travel = g.speed_pull * ms;
                if position < rest {
                    ((position + travel).min(rest), g.speed_pull)
                } else if position > rest {
                    ((position - travel).max(rest), -g.speed_pull)
                } else {
                    (rest, 0.0)
                }
            }
        };
        self.state.position = position;
        self.state.speed = if position == self.geometry.rest_position
            && self.state.action == PlungerAction::Resting
        {
            0.0
        } else {
            speed
        };

        if self.state.action == PlungerAction::Firing && position <= self.geometry.frame_top() {
            self.set_action(PlungerAction::Resting);
        }
    }

    /// Render mesh of the rod at the current position, `None` for flat plungers
    pub fn lathe_mesh(&self) -> Option<Mesh> {
        mesh::lathe_mesh(&self.geometry, self.state.position)
    }

    /// Render mesh with the tip where collision frame `frame` puts it
    pub fn lathe_mesh_at_frame(&self, frame: u32) -> Option<Mesh> {
        mesh::lathe_mesh(&self.geometry, self.geometry.collision_position(frame))
    }

    pub fn snapshot(&self) -> PlungerSnapshot {
        PlungerSnapshot {
            item_id: self.info.item_id,
            position: self.state.position,
            speed: self.state.speed,
            action: self.state.action,
            frame: self.current_frame(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collider::LineSegCollider;
    use fake::{Fake, Faker};
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    fn mover(config: &PlungerConfig) -> PlungerMover {
        PlungerMover::new(config, 0.0, &TableSettings::default(), 2)
    }

    fn default_mover() -> PlungerMover {
        mover(&PlungerConfig {
            center: Vec2::new(900.0, 1800.0),
            ..PlungerConfig::default()
        })
    }

    fn line_segs(colliders: &[Collider]) -> Vec<&LineSegCollider> {
        colliders
            .iter()
            .filter_map(|c| match c {
                Collider::LineSeg(l) => Some(l),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_default_geometry() {
        let plunger = default_mover();
        let g = plunger.geometry();
        assert_eq!(g.begin_y, 1800.0);
        assert_eq!(g.end_y, 1720.0);
        assert_eq!(g.frame_count, 26);
        assert_eq!(g.frame_dy, -3.2);
        assert!((g.rest_position - (1720.0 + 80.0 / 6.0)).abs() < 1e-3);
        assert_eq!((g.x, g.x2, g.y), (875.0, 925.0, 1820.0));
        assert_eq!((g.z_low, g.z_high), (0.0, 50.0));
        assert_eq!(plunger.state().position, g.rest_position);
    }

    #[test]
    fn test_frame_y_is_monotonic() {
        for stroke in [0.0, 1.0, 3.2, 10.0, 80.0, 200.0] {
            let plunger = mover(&PlungerConfig {
                stroke,
                ..PlungerConfig::default()
            });
            let g = plunger.geometry();
            assert_eq!(plunger.frame_y(0), g.begin_y);
            for f in 1..g.frame_count {
                assert!(plunger.frame_y(f) <= plunger.frame_y(f - 1));
            }
            if g.frame_count > 1 {
                let last = plunger.frame_y(g.frame_count - 1);
                assert!((last - g.end_y).abs() < 1e-3, "{stroke}: {last}");
            }
        }
    }

    #[test]
    fn test_zero_stroke_has_one_frame() {
        let plunger = mover(&PlungerConfig {
            stroke: 0.0,
            ..PlungerConfig::default()
        });
        assert_eq!(plunger.geometry().frame_count, 1);
        assert_eq!(plunger.geometry().frame_dy, 0.0);
        assert_eq!(plunger.frame_y(5), plunger.geometry().begin_y);
        assert_eq!(plunger.current_frame(), 0);
    }

    #[test]
    fn test_negative_stroke_is_clamped() {
        let plunger = mover(&PlungerConfig {
            stroke: -30.0,
            ..PlungerConfig::default()
        });
        assert_eq!(plunger.geometry().stroke, 0.0);
        assert_eq!(plunger.geometry().frame_count, 1);
    }

    #[test]
    fn test_huge_and_non_finite_strokes_are_clamped() {
        for stroke in [2.0e10, f32::INFINITY, f32::MAX] {
            let plunger = mover(&PlungerConfig {
                stroke,
                ..PlungerConfig::default()
            });
            let g = plunger.geometry();
            assert_eq!(g.stroke, MAX_STROKE, "{stroke}");
            assert_eq!(g.frame_count, 3126);
            let last = g.frame_count - 1;
            assert!((plunger.frame_y(last) - g.end_y).abs() < 1e-2);
            assert_eq!(plunger.collision_boundary(last).len(), 8);
        }
        let plunger = mover(&PlungerConfig {
            stroke: f32::NAN,
            ..PlungerConfig::default()
        });
        assert_eq!(plunger.geometry().stroke, 0.0);
        assert_eq!(plunger.geometry().frame_count, 1);
    }

    #[test]
    fn test_boundary_layout() {
        let plunger = default_mover();
        let boundary = plunger.collision_boundary(0);
        assert_eq!(boundary.len(), 8);
        assert_eq!(line_segs(&boundary).len(), 4);
        let joints = boundary
            .iter()
            .filter(|c| matches!(c, Collider::LineZ(_)))
            .count();
        assert_eq!(joints, 4);
        assert!(boundary.iter().all(|c| c.info().item_id == 2));
        assert!(
            boundary
                .iter()
                .all(|c| c.info().item_type == ItemType::Plunger)
        );

        let rest = plunger.geometry().rest_position;
        let end_line = line_segs(&boundary)[3];
        assert_eq!((end_line.v1.y, end_line.v2.y), (rest, rest));

        let last = plunger.collision_boundary(plunger.geometry().frame_count - 1);
        let end_line = line_segs(&last)[3];
        assert_eq!(end_line.v1.y, plunger.geometry().end_y);
        // the static part does not move
        assert_eq!(&boundary[..3], &last[..3]);
    }

    #[test]
    fn test_boundary_normals_face_outwards() {
        let plunger = default_mover();
        let position = plunger.geometry().rest_position;
        let center = Vec2::new(900.0, (position + plunger.geometry().y) / 2.0);
        for line in line_segs(&plunger.boundary_at(position)) {
            let mid = (line.v1 + line.v2) * 0.5;
            assert!(line.normal.dot(&(mid - center)) > 0.0, "{line:?}");
        }
    }

    #[test]
    fn test_pull_fire_and_return() {
        let mut plunger = default_mover();
        let g = plunger.geometry().clone();

        plunger.pull_back();
        for _ in 0..100 {
            plunger.step(0.01);
        }
        assert_eq!(plunger.state().position, g.begin_y);
        assert_eq!(plunger.state().speed, 0.0);
        assert_eq!(plunger.current_frame(), 0);

        plunger.release();
        plunger.step(0.0005);
        assert!(plunger.state().position < g.begin_y);
        assert_eq!(plunger.state().speed, -g.speed_fire);
        plunger.step(0.01);
        assert_eq!(plunger.state().position, g.end_y);
        assert_eq!(plunger.state().action, PlungerAction::Resting);
        assert_eq!(plunger.current_frame(), g.frame_count - 1);

        for _ in 0..100 {
            plunger.step(0.01);
        }
        assert_eq!(plunger.state().position, g.rest_position);
        assert_eq!(plunger.state().speed, 0.0);
    }

    #[test]
    fn test_travel_stays_in_range() {
        let mut plunger = default_mover();
        let (top, begin) = (plunger.geometry().end_y, plunger.geometry().begin_y);
        for i in 0..500 {
            match i % 70 {
                0 => plunger.pull_back(),
                40 => plunger.release(),
                _ => {}
            }
            plunger.step(0.003);
            let p = plunger.state().position;
            assert!((top..=begin).contains(&p), "{p}");
            assert!(plunger.current_frame() < plunger.geometry().frame_count);
        }
    }

    #[test]
    fn test_random_type_builds() {
        for _ in 0..20 {
            let plunger_type: PlungerType = Faker.fake();
            let plunger = mover(&PlungerConfig {
                plunger_type,
                ..PlungerConfig::default()
            });
            assert_eq!(
                plunger.geometry().desc.is_empty(),
                plunger_type == PlungerType::Flat
            );
            assert_eq!(plunger.collision_boundary(3).len(), 8);
        }
    }

    #[test]
    fn test_plunger_type_serde() -> TestResult {
        assert_eq!(serde_json::to_string(&PlungerType::Custom)?, "\"custom\"");
        let from_str: PlungerType = serde_json::from_str("\"flat\"")?;
        assert_eq!(from_str, PlungerType::Flat);
        let from_number: PlungerType = serde_json::from_str("1")?;
        assert_eq!(from_number, PlungerType::Modern);
        assert!(serde_json::from_str::<PlungerType>("4").is_err());
        assert!(serde_json::from_str::<PlungerType>("\"round\"").is_err());
        Ok(())
    }

    #[test]
    fn test_snapshot_json() -> TestResult {
        let mut plunger = default_mover();
        plunger.pull_back();
        plunger.step(0.01);
        let json = serde_json::to_value(plunger.snapshot())?;
        assert_eq!(json["action"], "pulling");
        assert_eq!(json["item_id"], 2);
        Ok(())
    }
}
