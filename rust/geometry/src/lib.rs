// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Layout-Lite Geometry
//!
//! Geometry building blocks for turning panorama layouts into meshes:
//! equirectangular projection math, footprint polygon predicates, dense
//! grids for per-pixel masks, and colored triangle meshes with OBJ export.

pub mod equirect;
pub mod error;
pub mod export;
pub mod grid;
pub mod mesh;
pub mod polygon;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use equirect::{horizontal_direction, Equirect, FloorCanvas};
pub use error::{Error, Result};
pub use export::{obj_string, write_obj, write_obj_file, ObjAxes};
pub use grid::{flip_kernel, Grid, Kernel3};
pub use mesh::Mesh;
pub use polygon::{is_simple_polygon, ray_ring_distance, segments_intersect, signed_area};
