//! Table setup pass
//!
//! Builds the movers for every flipper and plunger and the colliders for every mesh
//! based part of a [`TableConfig`]. Mesh parts are independent of each other, so with
//! the `parallel` feature their colliders are generated on the rayon thread pool.

use crate::collider::{Collider, generate_primitive_colliders};
use crate::config::{PrimitiveConfig, TableConfig};
use crate::flipper::FlipperMover;
use crate::mesh::Mesh;
use crate::plunger::PlungerMover;
use log::{info, warn};
use std::collections::HashMap;
use tracing::instrument;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Height lookup for the surfaces parts are placed on
pub trait SurfaceHeight: Sync {
    /// Height of `surface` at `(x, y)`. An empty name means the playfield.
    fn surface_height(&self, surface: &str, x: f32, y: f32) -> f32;
}

/// Playfield and surfaces that are level everywhere
#[derive(Debug, Clone, Default)]
pub struct FlatPlayfield {
    pub playfield_height: f32,
    pub surfaces: HashMap<String, f32>,
}

impl FlatPlayfield {
    pub fn new(playfield_height: f32) -> Self {
        Self {
            playfield_height,
            surfaces: HashMap::new(),
        }
    }

    pub fn with_surface(mut self, name: &str, height: f32) -> Self {
        self.surfaces.insert(name.to_string(), height);
        self
    }
}

impl SurfaceHeight for FlatPlayfield {
    fn surface_height(&self, surface: &str, _x: f32, _y: f32) -> f32 {
        if surface.is_empty() {
            return self.playfield_height;
        }
        match self.surfaces.get(surface) {
            Some(height) => *height,
            None => {
                warn!("Unknown surface '{surface}', using the playfield height");
                self.playfield_height
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableSetup {
    pub flippers: Vec<FlipperMover>,
    pub plungers: Vec<PlungerMover>,
    /// Colliders of the mesh based parts, in configuration order
    pub colliders: Vec<Collider>,
}

impl TableSetup {
    /// Mesh colliders plus the flipper bases and the plunger boundaries at rest
    pub fn all_colliders(&self) -> Vec<Collider> {
        let mut all = self.colliders.clone();
        all.extend(self.flippers.iter().flat_map(FlipperMover::colliders));
        all.extend(self.plungers.iter().flat_map(|p| p.collision_boundary(0)));
        all
    }
}

/// Builds movers and colliders for a whole table.
///
/// Item ids are assigned in order: flippers first, then plungers, then mesh parts.
/// Mesh parts are looked up by name in `meshes`; parts without a mesh are skipped.
#[instrument(skip_all, fields(
    flippers = config.flippers.len(),
    plungers = config.plungers.len(),
    primitives = config.primitives.len()
))]
pub fn setup_table(
    config: &TableConfig,
    meshes: &HashMap<String, Mesh>,
    surface: &dyn SurfaceHeight,
) -> TableSetup {
    let settings = &config.table;
    let mut next_id = 0u32;
    let mut take_id = || {
        let id = next_id;
        next_id += 1;
        id
    };

    let flippers: Vec<FlipperMover> = config
        .flippers
        .iter()
        .map(|f| {
            let height = surface.surface_height(&f.surface, f.center.x, f.center.y);
            FlipperMover::new(f, height, settings, take_id())
        })
        .collect();

    let plungers: Vec<PlungerMover> = config
        .plungers
        .iter()
        .map(|p| {
            let height = surface.surface_height(&p.surface, p.center.x, p.center.y);
            PlungerMover::new(p, height, settings, take_id())
        })
        .collect();

    let first_primitive_id = take_id();
    let generate = |(index, primitive): (usize, &PrimitiveConfig)| -> Vec<Collider> {
        let item_id = first_primitive_id + index as u32;
        let Some(mesh) = meshes.get(&primitive.name) else {
            warn!("No mesh for {:?} {}", primitive.item_type, primitive.name);
            return Vec::new();
        };
        let height = surface.surface_height(
            &primitive.surface,
            primitive.position.x,
            primitive.position.y,
        );
        let info = primitive.collider_info(item_id, settings);
        generate_primitive_colliders(primitive, mesh, height, info)
    };

    #[cfg(feature = "parallel")]
    let per_part: Vec<Vec<Collider>> = config
        .primitives
        .par_iter()
        .enumerate()
        .map(generate)
        .collect();

    #[cfg(not(feature = "parallel"))]
    let per_part: Vec<Vec<Collider>> = config
        .primitives
        .iter()
        .enumerate()
        .map(generate)
        .collect();

    let colliders: Vec<Collider> = per_part.into_iter().flatten().collect();
    info!(
        "Table set up with {} flippers, {} plungers and {} mesh colliders",
        flippers.len(),
        plungers.len(),
        colliders.len()
    );
    TableSetup {
        flippers,
        plungers,
        colliders,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collider::ItemType;
    use crate::flipper::FlipperConfig;
    use crate::math::{Vec2, Vec3};
    use crate::mesh::{Face, MeshVertex};
    use crate::plunger::PlungerConfig;
    use pretty_assertions::assert_eq;

    fn triangle() -> Mesh {
        Mesh::new(
            vec![
                MeshVertex::default(),
                MeshVertex {
                    x: 1.0,
                    ..MeshVertex::default()
                },
                MeshVertex {
                    y: 1.0,
                    ..MeshVertex::default()
                },
            ],
            vec![Face::new(0, 1, 2)],
        )
    }

    #[test]
    fn test_flat_playfield() {
        let playfield = FlatPlayfield::new(5.0).with_surface("Apron", 30.0);
        assert_eq!(playfield.surface_height("", 1.0, 2.0), 5.0);
        assert_eq!(playfield.surface_height("Apron", 1.0, 2.0), 30.0);
        assert_eq!(playfield.surface_height("Missing", 1.0, 2.0), 5.0);
    }

    #[test]
    fn test_setup_assigns_ids_and_heights() {
        let config = TableConfig {
            flippers: vec![
                FlipperConfig {
                    name: "Left".to_string(),
                    center: Vec2::new(278.0, 1655.0),
                    ..FlipperConfig::default()
                },
                FlipperConfig {
                    name: "Upper".to_string(),
                    surface: "Apron".to_string(),
                    ..FlipperConfig::default()
                },
            ],
            plungers: vec![PlungerConfig::default()],
            primitives: vec![
                PrimitiveConfig {
                    name: "Post".to_string(),
                    size: Vec3::new(1.0, 1.0, 1.0),
                    ..PrimitiveConfig::default()
                },
                PrimitiveConfig {
                    name: "NoMesh".to_string(),
                    ..PrimitiveConfig::default()
                },
                PrimitiveConfig {
                    name: "Rubber".to_string(),
                    item_type: ItemType::Rubber,
                    size: Vec3::new(1.0, 1.0, 1.0),
                    ..PrimitiveConfig::default()
                },
            ],
            ..TableConfig::default()
        };
        let meshes = HashMap::from([
            ("Post".to_string(), triangle()),
            ("Rubber".to_string(), triangle()),
        ]);
        let playfield = FlatPlayfield::new(0.0).with_surface("Apron", 40.0);

        let setup = setup_table(&config, &meshes, &playfield);

        assert_eq!(setup.flippers.len(), 2);
        assert_eq!(setup.flippers[0].info().item_id, 0);
        assert_eq!(setup.flippers[1].info().item_id, 1);
        assert_eq!(setup.flippers[1].geometry().z_low, 40.0);
        assert_eq!(setup.plungers[0].info().item_id, 2);

        // one triangle, three edges and three points per mesh part
        assert_eq!(setup.colliders.len(), 14);
        let ids: Vec<u32> = setup.colliders.iter().map(|c| c.info().item_id).collect();
        assert_eq!(&ids[..7], &[3; 7]);
        assert_eq!(&ids[7..], &[5; 7]);
        assert_eq!(setup.colliders[7].info().item_type, ItemType::Rubber);

        assert_eq!(setup.all_colliders().len(), 14 + 2 + 8);
    }

    #[test]
    fn test_empty_table() {
        let setup = setup_table(
            &TableConfig::default(),
            &HashMap::new(),
            &FlatPlayfield::default(),
        );
        assert!(setup.flippers.is_empty());
        assert!(setup.all_colliders().is_empty());
    }
}
