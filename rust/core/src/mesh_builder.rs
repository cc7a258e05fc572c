// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room mesh assembly from a depth map and a texture
//!
//! Every non-ceiling pixel becomes a candidate vertex. Triangles come from
//! three 3×3 templates matched against the validity mask; only pixels that
//! some triangle references are kept as vertices. The first column is
//! repeated past the last one so the mesh closes across the panorama seam.

use crate::depth::{layout_depth, DepthMap};
use crate::error::{LayoutError, Result};
use crate::types::LayoutPrediction;
use image::RgbImage;
use layout_lite_geometry::{flip_kernel, Grid, Kernel3, Mesh};

/// A triangle shape on the pixel grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriangleTemplate {
    /// Cells the triangle needs, centred on its anchor pixel
    pub kernel: Kernel3,
    /// `(d_row, d_col)` of the three corners in winding order
    pub corners: [(usize, usize); 3],
}

/// `(p, p+↓, p+↘)`
pub const LOWER: TriangleTemplate = TriangleTemplate {
    kernel: [[0, 0, 0], [0, 1, 0], [0, 1, 1]],
    corners: [(0, 0), (1, 0), (1, 1)],
};

/// `(p, p+↘, p+→)`
pub const UPPER: TriangleTemplate = TriangleTemplate {
    kernel: [[0, 0, 0], [0, 1, 1], [0, 0, 1]],
    corners: [(0, 0), (1, 1), (0, 1)],
};

/// `(p, p+↓, p+→)`, used only where neither other template fits
pub const SADDLE: TriangleTemplate = TriangleTemplate {
    kernel: [[0, 0, 0], [0, 1, 1], [0, 1, 0]],
    corners: [(0, 0), (1, 0), (0, 1)],
};

impl TriangleTemplate {
    /// Anchor pixels where all three corners are valid
    pub fn matches(&self, mask: &Grid<bool>) -> Grid<bool> {
        mask.correlate3(&self.kernel).map(|&hits| hits == 3)
    }

    /// Pixels used as a corner by any of `anchors`
    fn referenced(&self, anchors: &Grid<bool>) -> Grid<bool> {
        anchors.correlate3(&flip_kernel(&self.kernel)).map(|&hits| hits > 0)
    }
}

/// Triangles over a pixel mask
#[derive(Debug, Clone, PartialEq)]
pub struct Triangulation {
    /// `(row, col)` of each vertex, in row-major order
    pub vertices: Vec<(usize, usize)>,
    /// Front faces: all lower, then all upper, then all saddle triangles
    pub faces: Vec<[u32; 3]>,
}

/// Triangulate the valid pixels of `mask`
pub fn triangulate_mask(mask: &Grid<bool>) -> Triangulation {
    let lower = LOWER.matches(mask);
    let upper = UPPER.matches(mask);
    let saddle = SADDLE.matches(mask);
    let saddle = Grid::from_fn(mask.width(), mask.height(), |r, c| {
        *saddle.get(r, c) && !*lower.get(r, c) && !*upper.get(r, c)
    });
    let passes = [(LOWER, &lower), (UPPER, &upper), (SADDLE, &saddle)];

    let referenced: Vec<Grid<bool>> = passes.iter().map(|(t, m)| t.referenced(m)).collect();
    let mut vertices = Vec::new();
    let ids = Grid::from_fn(mask.width(), mask.height(), |r, c| {
        if referenced.iter().any(|g| *g.get(r, c)) {
            vertices.push((r, c));
            Some((vertices.len() - 1) as u32)
        } else {
            None
        }
    });

    let mut faces = Vec::new();
    for (template, anchors) in passes {
        for r in 0..mask.height() {
            for c in 0..mask.width() {
                if !*anchors.get(r, c) {
                    continue;
                }
                let id = |(dr, dc): (usize, usize)| {
                    ids.get_signed((r + dr) as isize, (c + dc) as isize).copied().flatten()
                };
                let [a, b, d] = template.corners;
                if let (Some(a), Some(b), Some(d)) = (id(a), id(b), id(d)) {
                    faces.push([a, b, d]);
                }
            }
        }
    }

    Triangulation { vertices, faces }
}

/// Pixels allowed in the mesh: everything except the ceiling, with the
/// first column repeated at the end
pub fn mesh_mask(depth: &DepthMap) -> Grid<bool> {
    depth.ceiling_mask().not().with_wrapped_column()
}

/// Build a double-sided colored mesh from a depth map and its texture
pub fn mesh_from_depth(depth: &DepthMap, texture: &RgbImage) -> Result<Mesh> {
    let (width, height) = (depth.width(), depth.height());
    if texture.width() as usize != width || texture.height() as usize != height {
        return Err(LayoutError::shape(
            "texture",
            format!("{}x{}", width, height),
            format!("{}x{}", texture.width(), texture.height()),
        ));
    }

    let points = depth.points().with_wrapped_column();
    let colors = Grid::from_fn(width, height, |r, c| {
        let p = texture.get_pixel(c as u32, r as u32).0;
        [p[0] as f32 / 255.0, p[1] as f32 / 255.0, p[2] as f32 / 255.0]
    })
    .with_wrapped_column();

    let triangulation = triangulate_mask(&mesh_mask(depth));
    let mut mesh = Mesh::with_capacity(triangulation.vertices.len(), triangulation.faces.len() * 6);
    for &(r, c) in &triangulation.vertices {
        mesh.add_vertex(*points.get(r, c), *colors.get(r, c));
    }
    for &[a, b, c] in &triangulation.faces {
        mesh.add_triangle(a, b, c);
    }
    mesh.add_back_faces();
    mesh.validate()?;

    tracing::debug!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "room mesh built"
    );

    Ok(mesh)
}

/// Build the room mesh for a texture and its layout prediction
pub fn build_room_mesh(
    texture: &RgbImage,
    prediction: &LayoutPrediction,
    camera_height: f64,
) -> Result<Mesh> {
    let depth = layout_depth(
        prediction,
        texture.width() as usize,
        texture.height() as usize,
        camera_height,
    )?;
    mesh_from_depth(&depth, texture)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(rows: &[&[u8]]) -> Grid<bool> {
        Grid::from_fn(rows[0].len(), rows.len(), |r, c| rows[r][c] == 1)
    }

    #[test]
    fn test_full_block_uses_lower_and_upper() {
        let tri = triangulate_mask(&mask(&[&[1, 1], &[1, 1]]));
        assert_eq!(tri.vertices, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert_eq!(tri.faces, vec![[0, 2, 3], [0, 3, 1]]);
    }

    #[test]
    fn test_saddle_only_without_diagonal() {
        let tri = triangulate_mask(&mask(&[&[1, 1], &[1, 0]]));
        assert_eq!(tri.vertices, vec![(0, 0), (0, 1), (1, 0)]);
        assert_eq!(tri.faces, vec![[0, 2, 1]]);
    }

    #[test]
    fn test_missing_anchor_yields_nothing() {
        let tri = triangulate_mask(&mask(&[&[0, 1], &[1, 1]]));
        assert!(tri.vertices.is_empty());
        assert!(tri.faces.is_empty());
    }

    #[test]
    fn test_isolated_pixels_are_dropped() {
        let tri = triangulate_mask(&mask(&[&[1, 0, 1], &[0, 0, 0], &[1, 0, 1]]));
        assert!(tri.vertices.is_empty());
    }

    #[test]
    fn test_faces_grouped_by_template() {
        let tri = triangulate_mask(&mask(&[&[1, 1, 1], &[1, 1, 0]]));
        // lower at (0,0); upper at (0,0); saddle at (0,1)
        assert_eq!(tri.faces.len(), 3);
        assert_eq!(tri.faces[2], [1, 4, 2]);
    }

    #[test]
    fn test_vertex_ids_are_row_major() {
        let tri = triangulate_mask(&Grid::filled(5, 4, true));
        let mut sorted = tri.vertices.clone();
        sorted.sort();
        assert_eq!(tri.vertices, sorted);
        assert_eq!(tri.vertices.len(), 20);
        // Two triangles per 2x2 block
        assert_eq!(tri.faces.len(), 2 * 4 * 3);
    }
}
