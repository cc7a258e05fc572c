// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Depth and mesh generation from a reconstructed layout

mod common;

use approx::assert_relative_eq;
use common::square_signals;
use image::{Rgb, RgbImage};
use layout_lite_core::mesh_builder::mesh_mask;
use layout_lite_core::{
    build_room_mesh, layout_depth, reconstruct_layout, triangulate_mask, LayoutError,
    LayoutPrediction, PostProcessConfig, Surface,
};
use layout_lite_geometry::{obj_string, ObjAxes};

const TEX_W: u32 = 256;
const TEX_H: u32 = 128;

fn square_prediction() -> LayoutPrediction {
    reconstruct_layout(&square_signals(), &PostProcessConfig::default())
        .unwrap()
        .prediction
}

fn texture() -> RgbImage {
    RgbImage::from_pixel(TEX_W, TEX_H, Rgb([255, 128, 0]))
}

#[test]
fn mesh_is_deterministic() {
    let prediction = square_prediction();
    let a = build_room_mesh(&texture(), &prediction, 1.6).unwrap();
    let b = build_room_mesh(&texture(), &prediction, 1.6).unwrap();
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn mesh_excludes_ceiling_and_wraps_seam() {
    let prediction = square_prediction();
    let depth = layout_depth(&prediction, TEX_W as usize, TEX_H as usize, 1.6).unwrap();
    let triangulation = triangulate_mask(&mesh_mask(&depth));

    assert!(!triangulation.faces.is_empty());
    for &(r, c) in &triangulation.vertices {
        let col = c % TEX_W as usize;
        assert_ne!(*depth.surface.get(r, col), Surface::Ceiling);
    }
    assert!(triangulation
        .vertices
        .iter()
        .any(|&(_, c)| c == TEX_W as usize));

    let mesh = build_room_mesh(&texture(), &prediction, 1.6).unwrap();
    assert_eq!(mesh.vertex_count(), triangulation.vertices.len());
    assert_eq!(mesh.triangle_count(), 2 * triangulation.faces.len());
}

#[test]
fn vertex_colors_come_from_texture() {
    let mesh = build_room_mesh(&texture(), &square_prediction(), 1.6).unwrap();
    for c in mesh.colors.chunks_exact(3) {
        assert_relative_eq!(c[0], 1.0);
        assert_relative_eq!(c[1], 128.0 / 255.0);
        assert_relative_eq!(c[2], 0.0);
    }
}

#[test]
fn floor_sits_at_camera_height() {
    let mesh = build_room_mesh(&texture(), &square_prediction(), 1.6).unwrap();
    let (min, max) = mesh.bounds();
    assert_relative_eq!(min.z, -1.6, epsilon = 1e-4);
    // Ceiling pixels are dropped but walls reach up to the ceiling line
    assert!(max.z > 0.0);
}

#[test]
fn obj_export_lists_vertices_and_faces() {
    let mesh = build_room_mesh(&texture(), &square_prediction(), 1.6).unwrap();
    let obj = obj_string(&mesh, ObjAxes::ZUp).unwrap();

    let vertices = obj.lines().filter(|l| l.starts_with("v ")).count();
    let faces = obj.lines().filter(|l| l.starts_with("f ")).count();
    assert_eq!(vertices, mesh.vertex_count());
    assert_eq!(faces, mesh.triangle_count());
}

#[test]
fn texture_must_match_depth_size() {
    let prediction = square_prediction();
    let depth = layout_depth(&prediction, 64, 32, 1.6).unwrap();
    let err = layout_lite_core::mesh_from_depth(&depth, &texture()).unwrap_err();
    assert!(matches!(err, LayoutError::ShapeMismatch { .. }));
}
