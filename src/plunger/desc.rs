//! Lathe descriptors
//!
//! A plunger rod is a solid of revolution. Its profile is a list of stations running
//! from the tip (y = 0) back towards the player. Radii are fractions of the plunger
//! width, so the same profile fits any plunger size.
//!
//! Texture V bands: tip 0.00-0.24, ring 0.25-0.50, rod 0.51-0.75, spring 0.76-0.98.

use super::{PlungerConfig, PlungerType};
use log::warn;
use serde::Serialize;

/// One station of the lathe profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlungerCoord {
    /// Radius as a fraction of the plunger width
    pub r: f32,
    /// Distance from the tip
    pub y: f32,
    pub tv: f32,
    /// Normal, `nx` radial and `ny` along the axis
    pub nx: f32,
    pub ny: f32,
}

impl PlungerCoord {
    pub const fn new(r: f32, y: f32, tv: f32, nx: f32, ny: f32) -> Self {
        Self { r, y, tv, nx, ny }
    }
}

/// Profile of the modern plunger: rounded tip, ring and rod
pub const MODERN_COORDS: [PlungerCoord; 7] = [
    PlungerCoord::new(0.20, 0.0, 0.00, 1.0, 0.0),
    PlungerCoord::new(0.30, 3.0, 0.11, 1.0, 0.0),
    PlungerCoord::new(0.35, 5.0, 0.14, 1.0, 0.0),
    PlungerCoord::new(0.35, 23.0, 0.19, 1.0, 0.0),
    PlungerCoord::new(0.45, 23.0, 0.21, 0.8, 0.0),
    PlungerCoord::new(0.25, 24.0, 0.25, 0.3, 0.0),
    PlungerCoord::new(0.25, 100.0, 1.00, 0.3, 0.0),
];

/// Lathe profile plus what a renderer needs to add the spring
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlungerDesc {
    /// Ordered by non-decreasing `y`, empty for flat plungers
    pub coords: Vec<PlungerCoord>,
    /// Absolute table y where the rod ends
    pub rod_bottom_y: f32,
    pub spring_gauge: f32,
    pub spring_radius: f32,
    pub spring_loops: f32,
    pub spring_end_loops: f32,
}

impl PlungerDesc {
    pub fn for_config(config: &PlungerConfig) -> Self {
        match config.plunger_type {
            PlungerType::Modern => Self::modern(config),
            PlungerType::Flat => Self::flat(config),
            PlungerType::Custom => Self::custom(config),
        }
    }

    pub fn modern(config: &PlungerConfig) -> Self {
        Self::with_coords(config, MODERN_COORDS.to_vec())
    }

    /// Flat plungers are drawn as a billboard, there is no lathe
    pub fn flat(config: &PlungerConfig) -> Self {
        Self::with_coords(config, Vec::new())
    }

    /// Builds the profile from the tip shape string and the ring and rod settings.
    ///
    /// The tip shape is a `;` separated list of `y diameter` pairs, for example
    /// `"0 .34; 2 .6; 3 .64"`. Diameters are fractions of the plunger width. Values
    /// that do not parse become 0, and a station never lies before the previous one.
    pub fn custom(config: &PlungerConfig) -> Self {
        let r_rod = config.rod_diam * 0.5;
        let r_ring = config.ring_diam * 0.5;

        let mut coords = parse_tip_shape(&config.tip_shape);
        let tip_len = coords.last().map_or(0.0, |c| c.y);
        set_tip_texture_and_normals(&mut coords, tip_len, config.width);

        let mut stations = Stations { coords };
        // where the tip meets the rod
        stations.push(r_rod, tip_len, 0.24, 1.0, 0.0);

        // gap between the tip and the ring
        let mut y = tip_len + config.ring_gap;
        stations.push(r_rod, y, 0.51, 1.0, 0.0);

        // ring: front face, outside, back face
        stations.push(r_rod, y, 0.26, 0.0, -1.0);
        stations.push(r_ring, y, 0.33, 0.0, -1.0);
        stations.push(r_ring, y, 0.33, 1.0, 0.0);
        y += config.ring_width;
        stations.push(r_ring, y, 0.42, 1.0, 0.0);
        stations.push(r_ring, y, 0.42, 0.0, 1.0);
        stations.push(r_rod, y, 0.49, 0.0, 1.0);

        // rod, long enough to reach the bottom when fully pushed forward
        stations.push(r_rod, y, 0.51, 1.0, 0.0);
        stations.push(r_rod, y.max(config.stroke + config.height), 0.74, 1.0, 0.0);

        Self::with_coords(config, stations.coords)
    }

    fn with_coords(config: &PlungerConfig, coords: Vec<PlungerCoord>) -> Self {
        Self {
            coords,
            rod_bottom_y: config.center.y + config.height,
            spring_gauge: config.spring_gauge,
            spring_radius: config.spring_diam * 0.5,
            spring_loops: config.spring_loops,
            spring_end_loops: config.spring_end_loops,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// Keeps the profile ordered while stations are appended
struct Stations {
    coords: Vec<PlungerCoord>,
}

impl Stations {
    fn push(&mut self, r: f32, y: f32, tv: f32, nx: f32, ny: f32) {
        let y = self.coords.last().map_or(y, |prev| y.max(prev.y));
        self.coords.push(PlungerCoord::new(r, y, tv, nx, ny));
    }
}

fn parse_tip_shape(tip_shape: &str) -> Vec<PlungerCoord> {
    let mut coords: Vec<PlungerCoord> = Vec::new();
    for segment in tip_shape.split(';') {
        let mut tokens = segment.split_whitespace();
        let Some(y_token) = tokens.next() else {
            continue;
        };
        let mut y = parse_lenient(y_token);
        let r = tokens.next().map_or(0.0, parse_lenient) * 0.5;
        if let Some(prev) = coords.last()
            && y < prev.y
        {
            y = prev.y;
        }
        coords.push(PlungerCoord::new(r, y, 0.0, 1.0, 0.0));
    }
    coords
}

/// Parses a number from a tip shape token, 0 when it is not a number
fn parse_lenient(token: &str) -> f32 {
    let prefixed;
    let token = if token.starts_with('.') {
        prefixed = format!("0{token}");
        prefixed.as_str()
    } else {
        token
    };
    match token.parse::<f32>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            warn!("Invalid number '{token}' in plunger tip shape, using 0");
            0.0
        }
    }
}

/// Texture V spreads over the tip band by distance from the front. Each normal is
/// perpendicular to the chord between the neighbouring stations.
fn set_tip_texture_and_normals(coords: &mut [PlungerCoord], tip_len: f32, width: f32) {
    let n = coords.len();
    for i in 0..n {
        let prev = coords[i.saturating_sub(1)];
        let next = coords[(i + 1).min(n - 1)];
        let th = (next.y - prev.y).atan2((next.r - prev.r) * width);
        let c = &mut coords[i];
        c.tv = if tip_len > 0.0 {
            0.24 * c.y / tip_len
        } else {
            0.0
        };
        c.nx = th.sin();
        c.ny = -th.cos();
    }
}
