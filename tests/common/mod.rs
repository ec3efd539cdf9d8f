#![allow(dead_code)]

mod tracing_duration_filter;

use std::collections::HashSet;
use std::f32::consts::PI;
use std::sync::Once;
use std::time::Duration;
use tracing_duration_filter::DurationFilterLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;
use vpin_physics::mesh::{Face, Mesh, MeshVertex};

/// Routes `log` records and tracing spans to the test output, filtered by `RUST_LOG`
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_log::LogTracer::init();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .with(DurationFilterLayer::new(Duration::from_millis(500)));
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

fn vertex(x: f32, y: f32, z: f32) -> MeshVertex {
    let len = (x * x + y * y + z * z).sqrt().max(f32::EPSILON);
    MeshVertex {
        x,
        y,
        z,
        nx: x / len,
        ny: y / len,
        nz: z / len,
        ..MeshVertex::default()
    }
}

/// Cube with 8 shared vertices and 12 triangles, centered on the origin
pub fn cube(size: f32) -> Mesh {
    let h = size / 2.0;
    let vertices = (0..8)
        .map(|i| {
            let sign = |bit: u32| if i & (1 << bit) != 0 { h } else { -h };
            vertex(sign(0), sign(1), sign(2))
        })
        .collect();
    let faces = [
        [0, 2, 3],
        [0, 3, 1],
        [4, 5, 7],
        [4, 7, 6],
        [0, 1, 5],
        [0, 5, 4],
        [2, 6, 7],
        [2, 7, 3],
        [0, 4, 6],
        [0, 6, 2],
        [1, 3, 7],
        [1, 7, 5],
    ]
    .into_iter()
    .map(|[a, b, c]| Face::new(a, b, c))
    .collect();
    Mesh::new(vertices, faces)
}

/// Closed UV sphere with a single vertex at each pole
pub fn uv_sphere(radius: f32, rings: u32, segments: u32) -> Mesh {
    let mut vertices = vec![vertex(0.0, 0.0, radius)];
    for ring in 1..rings {
        let theta = PI * ring as f32 / rings as f32;
        for segment in 0..segments {
            let phi = 2.0 * PI * segment as f32 / segments as f32;
            vertices.push(vertex(
                radius * theta.sin() * phi.cos(),
                radius * theta.sin() * phi.sin(),
                radius * theta.cos(),
            ));
        }
    }
    let bottom = vertices.len() as u32;
    vertices.push(vertex(0.0, 0.0, -radius));

    let ring_start = |ring: u32| 1 + (ring - 1) * segments;
    let mut faces = Vec::new();
    for s in 0..segments {
        let next = (s + 1) % segments;
        faces.push(Face::new(0, ring_start(1) + s, ring_start(1) + next));
        let last = ring_start(rings - 1);
        faces.push(Face::new(bottom, last + next, last + s));
    }
    for ring in 1..rings - 1 {
        let a = ring_start(ring);
        let b = ring_start(ring + 1);
        for s in 0..segments {
            let next = (s + 1) % segments;
            faces.push(Face::new(a + s, b + s, b + next));
            faces.push(Face::new(a + s, b + next, a + next));
        }
    }
    Mesh::new(vertices, faces)
}

/// Distinct undirected edges, counted the slow and obvious way
pub fn brute_force_edge_count(mesh: &Mesh) -> usize {
    let mut edges = HashSet::new();
    for face in &mesh.faces {
        let [a, b, c] = face.indices();
        for (i, j) in [(a, b), (b, c), (c, a)] {
            if i != j {
                edges.insert((i.min(j), i.max(j)));
            }
        }
    }
    edges.len()
}
