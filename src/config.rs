//! Table configuration
//!
//! The import layer hands us the physics relevant part settings as JSON. Every field
//! has the VPinball default, so partial documents are fine.
//!
//! ```json
//! {
//!   "table": { "difficulty": 0.2 },
//!   "flippers": [{ "name": "LeftFlipper", "center": { "x": 278, "y": 1655 } }],
//!   "plungers": [{ "name": "Plunger", "type": "custom" }],
//!   "primitives": [{ "name": "Post", "item_type": "rubber", "size": { "x": 1, "y": 1, "z": 1 } }]
//! }
//! ```

use crate::collider::{ColliderInfo, ItemType, PhysicsMaterial, PhysicsOverride};
use crate::flipper::FlipperConfig;
use crate::math::Vec3;
use crate::plunger::PlungerConfig;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Json(error) => Some(error),
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Json(error) => write!(f, "JSON error: {error}"),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        ConfigError::Json(error)
    }
}

/// Table wide settings that influence every part
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    /// Global difficulty, 0 (easy) to 1 (hard). Shortens flippers that have a minimum radius.
    pub difficulty: f32,
    pub physics_override: PhysicsOverride,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            difficulty: 0.2,
            physics_override: PhysicsOverride::default(),
        }
    }
}

/// A mesh based part: primitive, rubber or ramp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimitiveConfig {
    /// Also the key of the part's mesh
    pub name: String,
    pub item_type: ItemType,
    pub position: Vec3,
    pub size: Vec3,
    /// Rotation around x, y and z in degrees
    pub rotation: Vec3,
    pub surface: String,
    pub collision_reduction_factor: f32,
    pub is_collidable: bool,
    pub is_toy: bool,
    pub hit_event: bool,
    pub threshold: f32,
    pub material: PhysicsMaterial,
    pub override_physics: bool,
}

impl Default for PrimitiveConfig {
    fn default() -> Self {
        Self {
            name: String::default(),
            item_type: ItemType::Primitive,
            position: Vec3::default(),
            size: Vec3::new(100.0, 100.0, 100.0),
            rotation: Vec3::default(),
            surface: String::default(),
            collision_reduction_factor: 0.0,
            is_collidable: true,
            is_toy: false,
            hit_event: true,
            threshold: 2.0,
            material: PhysicsMaterial {
                elasticity: 0.3,
                elasticity_falloff: 0.5,
                friction: 0.3,
                scatter: 0.0,
            },
            override_physics: false,
        }
    }
}

impl PrimitiveConfig {
    pub fn collider_info(&self, item_id: u32, settings: &TableSettings) -> ColliderInfo {
        ColliderInfo {
            fire_events: self.hit_event,
            threshold: self.threshold,
            ..ColliderInfo::new(item_id, self.item_type).with_material(PhysicsMaterial::resolve(
                self.material,
                self.override_physics,
                &settings.physics_override,
            ))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub table: TableSettings,
    pub flippers: Vec<FlipperConfig>,
    pub plungers: Vec<PlungerConfig>,
    pub primitives: Vec<PrimitiveConfig>,
}

impl TableConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plunger::PlungerType;
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    #[test]
    fn test_empty_document_uses_defaults() -> TestResult {
        let config = TableConfig::from_json_str("{}")?;
        assert_eq!(config, TableConfig::default());
        assert_eq!(config.table.difficulty, 0.2);
        Ok(())
    }

    #[test]
    fn test_partial_parts() -> TestResult {
        let config = TableConfig::from_json_str(
            r#"{
                "table": { "difficulty": 0.5, "physics_override": { "enabled": true } },
                "flippers": [{ "name": "LeftFlipper", "center": { "x": 278, "y": 1655 } }],
                "plungers": [{ "name": "Plunger", "type": 3 }],
                "primitives": [{ "name": "Post", "item_type": "rubber" }]
            }"#,
        )?;
        assert_eq!(config.table.difficulty, 0.5);
        assert!(config.table.physics_override.enabled);
        assert_eq!(config.flippers[0].name, "LeftFlipper");
        assert_eq!(config.flippers[0].base_radius, 21.5);
        assert_eq!(config.plungers[0].plunger_type, PlungerType::Custom);
        assert_eq!(config.primitives[0].item_type, ItemType::Rubber);
        assert_eq!(config.primitives[0].size, Vec3::new(100.0, 100.0, 100.0));
        Ok(())
    }

    #[test]
    fn test_json_round_trip() -> TestResult {
        let config = TableConfig {
            flippers: vec![FlipperConfig::default()],
            plungers: vec![PlungerConfig::default()],
            primitives: vec![PrimitiveConfig::default()],
            ..TableConfig::default()
        };
        let json = config.to_json_string()?;
        assert_eq!(TableConfig::from_json_str(&json)?, config);
        Ok(())
    }

    #[test]
    fn test_invalid_json() {
        let result = TableConfig::from_json_str("{ \"flippers\": 12 }");
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_collider_info_resolves_material() {
        let primitive = PrimitiveConfig::default();
        let mut settings = TableSettings::default();
        let info = primitive.collider_info(4, &settings);
        assert_eq!(info.material, primitive.material);
        assert!(info.fire_events);

        settings.physics_override.enabled = true;
        let info = primitive.collider_info(4, &settings);
        assert_eq!(info.material, settings.physics_override.material);
        assert_eq!(info.item_type, ItemType::Primitive);
    }
}
