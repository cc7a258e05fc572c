// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-pixel depth from a layout prediction
//!
//! Corners are lifted into a metric frame centred on the camera using a
//! fixed camera height: the floor row of a corner gives its horizontal
//! distance, the ceiling row then gives the ceiling height. Each column's
//! horizontal ray is cast against the footprint, and every pixel is
//! classified by comparing its latitude with the ceiling and floor lines.

use crate::error::{LayoutError, Result};
use crate::types::LayoutPrediction;
use layout_lite_geometry::{horizontal_direction, ray_ring_distance, Equirect, Grid, Point2, Point3};

/// Surface a pixel sees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Floor,
    Ceiling,
    Wall,
}

/// Depth and surface class for every pixel of a panorama
#[derive(Debug, Clone)]
pub struct DepthMap {
    pano: Equirect,
    /// Distance from the camera along each pixel's ray
    pub depth: Grid<f64>,
    pub surface: Grid<Surface>,
    /// Horizontal distance to the nearest wall, per column
    pub wall_distance: Vec<f64>,
    /// Ceiling height above the camera
    pub ceiling_height: f64,
    /// Camera height above the floor
    pub camera_height: f64,
}

impl DepthMap {
    pub fn width(&self) -> usize {
        self.pano.width
    }

    pub fn height(&self) -> usize {
        self.pano.height
    }

    pub fn floor_mask(&self) -> Grid<bool> {
        self.surface.map(|&s| s == Surface::Floor)
    }

    pub fn ceiling_mask(&self) -> Grid<bool> {
        self.surface.map(|&s| s == Surface::Ceiling)
    }

    pub fn wall_mask(&self) -> Grid<bool> {
        self.surface.map(|&s| s == Surface::Wall)
    }

    /// Back-project a pixel to a 3D point (camera at the origin, Z up)
    pub fn point(&self, row: usize, col: usize) -> Point3<f64> {
        let u = self.pano.column_to_u(col as f64);
        let v = self.pano.row_to_v(row as f64);
        let d = *self.depth.get(row, col);
        let (z, c) = (d * v.sin(), d * v.cos());
        Point3::new(c * u.sin(), -c * u.cos(), z)
    }

    /// Back-project every pixel
    pub fn points(&self) -> Grid<Point3<f64>> {
        Grid::from_fn(self.width(), self.height(), |row, col| self.point(row, col))
    }
}

/// Footprint corners in metres around the camera, and the ceiling height
fn lift_corners(
    pano: &Equirect,
    prediction: &LayoutPrediction,
    camera_height: f64,
) -> Result<(Vec<Point2<f64>>, f64)> {
    let (w, h) = (pano.width as f64, pano.height as f64);
    let mut footprint = Vec::with_capacity(prediction.corner_count());
    let mut ceiling_sum = 0.0;

    for (i, (ceiling, floor)) in prediction.corner_pairs().enumerate() {
        let v_floor = pano.row_to_v(floor[1] * h);
        let v_ceiling = pano.row_to_v(ceiling[1] * h);
        if v_floor >= 0.0 || v_ceiling <= 0.0 {
            return Err(LayoutError::InvalidLayout(format!(
                "corner {} does not straddle the horizon",
                i
            )));
        }

        let u = pano.column_to_u(floor[0] * w);
        let distance = camera_height / (-v_floor).tan();
        footprint.push(Point2::<f64>::origin() + horizontal_direction(u) * distance);
        ceiling_sum += distance * v_ceiling.tan();
    }

    Ok((footprint, ceiling_sum / prediction.corner_count() as f64))
}

/// Compute the depth map of a `width × height` panorama
pub fn layout_depth(
    prediction: &LayoutPrediction,
    width: usize,
    height: usize,
    camera_height: f64,
) -> Result<DepthMap> {
    prediction.validate()?;
    let pano = Equirect::new(width, height);
    let (footprint, ceiling_height) = lift_corners(&pano, prediction, camera_height)?;

    let origin = Point2::<f64>::origin();
    let wall_distance = (0..width)
        .map(|col| {
            let dir = horizontal_direction(pano.column_to_u(col as f64));
            ray_ring_distance(&origin, &dir, &footprint)
                .ok_or(LayoutError::CameraOutsideLayout { column: col })
        })
        .collect::<Result<Vec<f64>>>()?;

    let mut depth = Grid::filled(width, height, 0.0);
    let mut surface = Grid::filled(width, height, Surface::Wall);
    for (col, &dist) in wall_distance.iter().enumerate() {
        let ceiling_v = ceiling_height.atan2(dist);
        let floor_v = -camera_height.atan2(dist);
        for row in 0..height {
            let v = pano.row_to_v(row as f64);
            let (kind, d) = if v > ceiling_v {
                (Surface::Ceiling, ceiling_height / v.sin())
            } else if v < floor_v {
                (Surface::Floor, camera_height / -v.sin())
            } else {
                (Surface::Wall, dist / v.cos())
            };
            depth.set(row, col, d);
            surface.set(row, col, kind);
        }
    }

    tracing::debug!(width, height, ceiling_height, "depth map computed");

    Ok(DepthMap {
        pano,
        depth,
        surface,
        wall_distance,
        ceiling_height,
        camera_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    /// Square room of half-size `half` around the camera
    fn square_prediction(pano: &Equirect, half: f64, camera: f64, ceiling: f64) -> LayoutPrediction {
        let d = half * 2f64.sqrt();
        let mut uv = Vec::new();
        for k in [-3.0, -1.0, 1.0, 3.0] {
            let x = pano.u_to_column(k * FRAC_PI_4) / pano.width as f64;
            let top = pano.v_to_row((ceiling / d).atan()) / pano.height as f64;
            let bottom = pano.v_to_row(-(camera / d).atan()) / pano.height as f64;
            uv.push([x, top]);
            uv.push([x, bottom]);
        }
        LayoutPrediction {
            z0: 50.0,
            z1: -80.0,
            uv,
        }
    }

    #[test]
    fn test_square_room_depth() {
        let pano = Equirect::new(256, 128);
        let prediction = square_prediction(&pano, 2.0, 1.6, 1.2);
        let map = layout_depth(&prediction, 256, 128, 1.6).unwrap();

        assert_relative_eq!(map.ceiling_height, 1.2, epsilon = 1e-9);
        // Column 128 looks almost straight at the y = -2 wall
        let u = pano.column_to_u(128.0);
        assert_relative_eq!(map.wall_distance[128], 2.0 / u.cos(), epsilon = 1e-9);

        assert_eq!(*map.surface.get(0, 128), Surface::Ceiling);
        assert_eq!(*map.surface.get(127, 128), Surface::Floor);
        assert_eq!(*map.surface.get(64, 128), Surface::Wall);

        let total = map.floor_mask().count() + map.ceiling_mask().count() + map.wall_mask().count();
        assert_eq!(total, 256 * 128);
    }

    #[test]
    fn test_points_lie_on_room_surfaces() {
        let pano = Equirect::new(128, 64);
        let prediction = square_prediction(&pano, 2.0, 1.6, 1.2);
        let map = layout_depth(&prediction, 128, 64, 1.6).unwrap();

        for row in 0..64 {
            for col in 0..128 {
                let p = map.point(row, col);
                match map.surface.get(row, col) {
                    Surface::Ceiling => assert_relative_eq!(p.z, 1.2, epsilon = 1e-9),
                    Surface::Floor => assert_relative_eq!(p.z, -1.6, epsilon = 1e-9),
                    Surface::Wall => {
                        let on_wall = (p.x.abs() - 2.0).abs() < 1e-6 || (p.y.abs() - 2.0).abs() < 1e-6;
                        assert!(on_wall, "({}, {}) -> {:?}", row, col, p);
                    }
                }
            }
        }
    }

    #[test]
    fn test_camera_outside_footprint() {
        let pano = Equirect::new(64, 32);
        let mut prediction = square_prediction(&pano, 2.0, 1.6, 1.2);
        // Squash every corner into a narrow wedge of longitudes
        for (i, uv) in prediction.uv.iter_mut().enumerate() {
            uv[0] = 0.45 + 0.01 * (i / 2) as f64;
        }
        assert!(matches!(
            layout_depth(&prediction, 64, 32, 1.6),
            Err(LayoutError::CameraOutsideLayout { .. })
        ));
    }

    #[test]
    fn test_corner_on_wrong_side_of_horizon() {
        let pano = Equirect::new(64, 32);
        let mut prediction = square_prediction(&pano, 2.0, 1.6, 1.2);
        prediction.uv[1][1] = 0.2;
        assert!(matches!(
            layout_depth(&prediction, 64, 32, 1.6),
            Err(LayoutError::InvalidLayout(_))
        ));
    }
}
