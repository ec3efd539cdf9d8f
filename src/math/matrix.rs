//! Affine transforms for mesh based parts
//!
//! Follows VPinball's row-major matrices with pre-multiplication convention:
//! `A * B` applies `A` first, then `B`. Translation lives in the fourth row.

use super::Vec3;
use std::ops::Mul;

/// 4x4 matrix for affine transformations of 3D vectors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3D {
    /// Row-major 4x4 matrix data
    pub m: [[f32; 4]; 4],
}

impl Default for Matrix3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix3D {
    pub const fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        Self { m: rows }
    }

    pub const fn identity() -> Self {
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn rotate_x(ang_rad: f32) -> Self {
        let (sin, cos) = ang_rad.sin_cos();
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, cos, sin, 0.0],
            [0.0, -sin, cos, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn rotate_y(ang_rad: f32) -> Self {
        let (sin, cos) = ang_rad.sin_cos();
        Self::from_rows([
            [cos, 0.0, -sin, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [sin, 0.0, cos, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn rotate_z(ang_rad: f32) -> Self {
        let (sin, cos) = ang_rad.sin_cos();
        Self::from_rows([
            [cos, sin, 0.0, 0.0],
            [-sin, cos, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub const fn scale(sx: f32, sy: f32, sz: f32) -> Self {
        Self::from_rows([
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, sz, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub const fn translate(x: f32, y: f32, z: f32) -> Self {
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [x, y, z, 1.0],
        ])
    }

    /// World transform of a primitive: scale, rotate X/Y/Z (degrees), then translate.
    ///
    /// `position.z` is expected to already include the height of the surface the part
    /// sits on.
    pub fn primitive_transform(position: Vec3, size: Vec3, rotation_deg: Vec3) -> Self {
        Self::scale(size.x, size.y, size.z)
            * Self::rotate_x(rotation_deg.x.to_radians())
            * Self::rotate_y(rotation_deg.y.to_radians())
            * Self::rotate_z(rotation_deg.z.to_radians())
            * Self::translate(position.x, position.y, position.z)
    }

    /// Transform a point (with perspective divide)
    pub fn transform_point(&self, v: Vec3) -> Vec3 {
        let xp = self.m[0][0] * v.x + self.m[1][0] * v.y + self.m[2][0] * v.z + self.m[3][0];
        let yp = self.m[0][1] * v.x + self.m[1][1] * v.y + self.m[2][1] * v.z + self.m[3][1];
        let zp = self.m[0][2] * v.x + self.m[1][2] * v.y + self.m[2][2] * v.z + self.m[3][2];
        let wp = self.m[0][3] * v.x + self.m[1][3] * v.y + self.m[2][3] * v.z + self.m[3][3];

        let inv_wp = 1.0 / wp;
        Vec3::new(xp * inv_wp, yp * inv_wp, zp * inv_wp)
    }

    /// Transform a direction, ignoring translation
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.m[0][0] * v.x + self.m[1][0] * v.y + self.m[2][0] * v.z,
            self.m[0][1] * v.x + self.m[1][1] * v.y + self.m[2][1] * v.z,
            self.m[0][2] * v.x + self.m[1][2] * v.y + self.m[2][2] * v.z,
        )
    }
}

impl Mul for Matrix3D {
    type Output = Matrix3D;

    fn mul(self, mult: Matrix3D) -> Matrix3D {
        let mut result = [[0.0f32; 4]; 4];
        for (i, row) in result.iter_mut().enumerate() {
            for (l, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.m[i][k] * mult.m[k][l]).sum();
            }
        }
        Matrix3D { m: result }
    }
}
