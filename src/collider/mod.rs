//! Collidable shapes handed to the collision solver
//!
//! Every shape is a variant of the closed [`Collider`] enum and carries a
//! [`ColliderInfo`] tag pointing back at the table part it was generated for.
//! The solver routes hit callbacks through that tag; it never owns the part.
//!
//! | Variant    | VPinball hit object | Used by                              |
//! |------------|---------------------|--------------------------------------|
//! | `Point`    | HitPoint            | mesh vertices                        |
//! | `Line`     | HitLine3D           | mesh edges                           |
//! | `LineSeg`  | LineSeg             | plunger boundary lines               |
//! | `Circle`   | HitCircle           | flipper base                         |
//! | `Triangle` | HitTriangle         | mesh faces                           |
//! | `LineZ`    | HitLineZ            | plunger joints (vertical lines)      |

pub mod edges;
pub mod generator;

use crate::math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

pub use edges::EdgeSet;
pub use generator::{
    MIN_REDUCED_VERTEX_COUNT, generate_colliders, generate_primitive_colliders,
    reduced_vertex_count,
};

/// Kind of table part a collider belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Flipper,
    Plunger,
    Primitive,
    Rubber,
    Ramp,
    Wall,
}

/// Surface response of a collider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsMaterial {
    pub elasticity: f32,
    pub elasticity_falloff: f32,
    pub friction: f32,
    /// Scatter angle in degrees
    pub scatter: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            elasticity: 0.3,
            elasticity_falloff: 0.0,
            friction: 0.3,
            scatter: 0.0,
        }
    }
}

impl PhysicsMaterial {
    /// Picks the material a part ends up with.
    ///
    /// When physics are overridden, either on the part or for the whole table, the
    /// table's override values replace the part's own values.
    pub fn resolve(
        part: PhysicsMaterial,
        part_overrides: bool,
        table: &PhysicsOverride,
    ) -> PhysicsMaterial {
        if part_overrides || table.enabled {
            table.material
        } else {
            part
        }
    }
}

/// Table wide physics override settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsOverride {
    /// Forces the override on every part, not only on parts that ask for it
    pub enabled: bool,
    pub material: PhysicsMaterial,
}

/// Back reference from a collider to its owning table part
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderInfo {
    pub item_id: u32,
    pub item_type: ItemType,
    pub material: PhysicsMaterial,
    /// Whether hits fire script events
    pub fire_events: bool,
    /// Minimum hit speed for an event to be fired
    pub threshold: f32,
    pub is_enabled: bool,
}

impl ColliderInfo {
    pub fn new(item_id: u32, item_type: ItemType) -> Self {
        Self {
            item_id,
            item_type,
            material: PhysicsMaterial::default(),
            fire_events: false,
            threshold: 2.0,
            is_enabled: true,
        }
    }

    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }
}

/// Axis aligned bounding box used by broad phase consumers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    fn from_points(points: &[Vec3]) -> Self {
        let mut min = Vec3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Vec3::new(f32::MIN, f32::MIN, f32::MIN);
        for p in points {
            min = Vec3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = Vec3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }
        Self { min, max }
    }

    pub fn contains(&self, p: Vec3) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointCollider {
    pub p: Vec3,
    pub info: ColliderInfo,
}

/// Segment between two points in 3D, typically a mesh edge
#[derive(Debug, Clone, PartialEq)]
pub struct Line3DCollider {
    pub v1: Vec3,
    pub v2: Vec3,
    pub info: ColliderInfo,
}

/// Segment on the playfield plane, extruded over a z-range
#[derive(Debug, Clone, PartialEq)]
pub struct LineSegCollider {
    pub v1: Vec2,
    pub v2: Vec2,
    /// Unit normal, pointing to the right when walking from `v1` to `v2`
    pub normal: Vec2,
    pub length: f32,
    pub z_low: f32,
    pub z_high: f32,
    pub info: ColliderInfo,
}

impl LineSegCollider {
    pub fn new(v1: Vec2, v2: Vec2, z_low: f32, z_high: f32, info: ColliderInfo) -> Self {
        let vt = v1 - v2;
        let length = vt.length();
        let normal = if length > 0.0 {
            Vec2::new(vt.y / length, -vt.x / length)
        } else {
            Vec2::default()
        };
        Self {
            v1,
            v2,
            normal,
            length,
            z_low,
            z_high,
            info,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleCollider {
    pub center: Vec2,
    pub radius: f32,
    pub z_low: f32,
    pub z_high: f32,
    pub info: ColliderInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriangleCollider {
    /// Counter-clockwise in physics convention
    pub rgv: [Vec3; 3],
    pub normal: Vec3,
    pub info: ColliderInfo,
}

impl TriangleCollider {
    pub fn new(rgv: [Vec3; 3], info: ColliderInfo) -> Self {
        let e0 = rgv[2] - rgv[0];
        let e1 = rgv[1] - rgv[0];
        let normal = Vec3::cross(&e0, &e1).normalize();
        Self { rgv, normal, info }
    }

    /// Zero area triangles have no usable normal
    pub fn is_degenerate(&self) -> bool {
        self.normal == Vec3::default() || !self.normal.length().is_finite()
    }
}

/// Vertical line through `xy`, clipped to a z-range
#[derive(Debug, Clone, PartialEq)]
pub struct LineZCollider {
    pub xy: Vec2,
    pub z_low: f32,
    pub z_high: f32,
    pub info: ColliderInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Collider {
    Point(PointCollider),
    Line(Line3DCollider),
    LineSeg(LineSegCollider),
    Circle(CircleCollider),
    Triangle(TriangleCollider),
    LineZ(LineZCollider),
}

impl Collider {
    pub fn point(p: Vec3, info: ColliderInfo) -> Self {
        Collider::Point(PointCollider { p, info })
    }

    pub fn line(v1: Vec3, v2: Vec3, info: ColliderInfo) -> Self {
        Collider::Line(Line3DCollider { v1, v2, info })
    }

    pub fn line_seg(v1: Vec2, v2: Vec2, z_low: f32, z_high: f32, info: ColliderInfo) -> Self {
        Collider::LineSeg(LineSegCollider::new(v1, v2, z_low, z_high, info))
    }

    pub fn circle(center: Vec2, radius: f32, z_low: f32, z_high: f32, info: ColliderInfo) -> Self {
        Collider::Circle(CircleCollider {
            center,
            radius,
            z_low,
            z_high,
            info,
        })
    }

    pub fn line_z(xy: Vec2, z_low: f32, z_high: f32, info: ColliderInfo) -> Self {
        Collider::LineZ(LineZCollider {
            xy,
            z_low,
            z_high,
            info,
        })
    }

    pub fn info(&self) -> &ColliderInfo {
        match self {
            Collider::Point(c) => &c.info,
            Collider::Line(c) => &c.info,
            Collider::LineSeg(c) => &c.info,
            Collider::Circle(c) => &c.info,
            Collider::Triangle(c) => &c.info,
            Collider::LineZ(c) => &c.info,
        }
    }

    pub fn aabb(&self) -> Aabb {
        match self {
            Collider::Point(c) => Aabb::from_points(&[c.p]),
            Collider::Line(c) => Aabb::from_points(&[c.v1, c.v2]),
            Collider::LineSeg(c) => Aabb::from_points(&[
                Vec3::new(c.v1.x, c.v1.y, c.z_low),
                Vec3::new(c.v2.x, c.v2.y, c.z_high),
            ]),
            Collider::Circle(c) => Aabb {
                min: Vec3::new(c.center.x - c.radius, c.center.y - c.radius, c.z_low),
                max: Vec3::new(c.center.x + c.radius, c.center.y + c.radius, c.z_high),
            },
            Collider::Triangle(c) => Aabb::from_points(&c.rgv),
            Collider::LineZ(c) => Aabb {
                min: Vec3::new(c.xy.x, c.xy.y, c.z_low),
                max: Vec3::new(c.xy.x, c.xy.y, c.z_high),
            },
        }
    }
}
