// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Equirectangular projection helpers
//!
//! Columns map to longitude `u` in `[-π, π)` and rows map to latitude `v`
//! in `(-π/2, π/2)`, positive above the horizon. Pixel centers sit at
//! `+0.5`, so column 0 does not map exactly to `-π`.
//!
//! Horizontal positions are expressed on a fixed "floor canvas": a virtual
//! top-down image whose center is the camera. A point at horizontal
//! distance `c` along longitude `u` lands at
//! `(c·sin u + W/2 − 0.5, −c·cos u + H/2 − 0.5)`.

use nalgebra::{Point2, Vector2};
use std::f64::consts::PI;

/// Size of an equirectangular image in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Equirect {
    pub width: usize,
    pub height: usize,
}

impl Equirect {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Longitude of a (possibly fractional) column
    #[inline]
    pub fn column_to_u(&self, column: f64) -> f64 {
        ((column + 0.5) / self.width as f64 - 0.5) * 2.0 * PI
    }

    /// Latitude of a (possibly fractional) row, positive upwards
    #[inline]
    pub fn row_to_v(&self, row: f64) -> f64 {
        -((row + 0.5) / self.height as f64 - 0.5) * PI
    }

    #[inline]
    pub fn u_to_column(&self, u: f64) -> f64 {
        (u / (2.0 * PI) + 0.5) * self.width as f64 - 0.5
    }

    #[inline]
    pub fn v_to_row(&self, v: f64) -> f64 {
        (-v / PI + 0.5) * self.height as f64 - 0.5
    }
}

/// Unit horizontal direction of longitude `u` in the floor frame
#[inline]
pub fn horizontal_direction(u: f64) -> Vector2<f64> {
    Vector2::new(u.sin(), -u.cos())
}

/// Virtual top-down canvas the floor plan is drawn on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorCanvas {
    pub width: f64,
    pub height: f64,
}

impl Default for FloorCanvas {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 512.0,
        }
    }
}

impl FloorCanvas {
    /// Canvas position of the camera
    #[inline]
    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.width / 2.0 - 0.5, self.height / 2.0 - 0.5)
    }

    /// Project an image pixel lying on the horizontal plane at height `z`
    /// onto the canvas.
    ///
    /// Pixels on the horizon (or on the wrong side of it for the sign of
    /// `z`) yield non-finite or mirrored coordinates; callers keep boundary
    /// rows clipped away from the horizon.
    pub fn project_pixel(&self, pano: &Equirect, column: f64, row: f64, z: f64) -> Point2<f64> {
        let u = pano.column_to_u(column);
        let v = pano.row_to_v(row);
        let c = z / v.tan();
        self.center() + horizontal_direction(u) * c
    }

    /// Inverse of [`project_pixel`](Self::project_pixel): image
    /// `(column, row)` of a canvas point on the plane at height `z`
    pub fn unproject_point(&self, pano: &Equirect, point: &Point2<f64>, z: f64) -> (f64, f64) {
        let d = point - self.center();
        let u = d.x.atan2(-d.y);
        let v = (z / d.norm()).atan();
        (pano.u_to_column(u), pano.v_to_row(v))
    }

    /// Where the ray of longitude `u` crosses the wall `x = x_wall`;
    /// returns that point's canvas `y`
    pub fn y_on_x_wall(&self, x_wall: f64, u: f64) -> f64 {
        let center = self.center();
        let c = (x_wall - center.x) / u.sin();
        -c * u.cos() + center.y
    }

    /// Where the ray of longitude `u` crosses the wall `y = y_wall`;
    /// returns that point's canvas `x`
    pub fn x_on_y_wall(&self, y_wall: f64, u: f64) -> f64 {
        let center = self.center();
        let c = -(y_wall - center.y) / u.cos();
        c * u.sin() + center.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_column_longitude_roundtrip() {
        let pano = Equirect::new(1024, 512);
        for column in [0.0, 100.25, 511.5, 1023.0] {
            let u = pano.column_to_u(column);
            assert!((-PI..PI).contains(&u));
            assert_relative_eq!(pano.u_to_column(u), column, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_row_latitude_sign() {
        let pano = Equirect::new(1024, 512);
        assert!(pano.row_to_v(10.0) > 0.0);
        assert!(pano.row_to_v(500.0) < 0.0);
        assert_relative_eq!(pano.row_to_v(255.5), 0.0, epsilon = 1e-12);
        assert_relative_eq!(pano.v_to_row(pano.row_to_v(42.0)), 42.0, epsilon = 1e-9);
    }

    #[test]
    fn test_project_unproject_roundtrip() {
        let pano = Equirect::new(1024, 512);
        let canvas = FloorCanvas::default();
        let point = canvas.project_pixel(&pano, 300.0, 180.0, 50.0);
        let (column, row) = canvas.unproject_point(&pano, &point, 50.0);
        assert_relative_eq!(column, 300.0, epsilon = 1e-6);
        assert_relative_eq!(row, 180.0, epsilon = 1e-6);
    }

    #[test]
    fn test_wall_solvers_agree_with_projection() {
        let pano = Equirect::new(1024, 512);
        let canvas = FloorCanvas::default();
        let u = pano.column_to_u(200.0);
        let point = canvas.project_pixel(&pano, 200.0, 150.0, 50.0);

        assert_relative_eq!(canvas.y_on_x_wall(point.x, u), point.y, epsilon = 1e-6);
        assert_relative_eq!(canvas.x_on_y_wall(point.y, u), point.x, epsilon = 1e-6);
    }
}
