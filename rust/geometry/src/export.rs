// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wavefront OBJ export with per-vertex colors
//!
//! Colors use the widespread `v x y z r g b` extension, which three.js,
//! Blender and MeshLab all read.

use crate::error::Result;
use crate::mesh::Mesh;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Axis convention of the written file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjAxes {
    /// Write positions as stored (Z up)
    #[default]
    ZUp,
    /// Swap to the usual OBJ convention: `(x, y, z) -> (x, z, -y)`
    YUp,
}

/// Write a mesh as OBJ text
pub fn write_obj<W: Write>(mesh: &Mesh, axes: ObjAxes, out: &mut W) -> Result<()> {
    writeln!(out, "# Generated by layout-lite")?;
    writeln!(
        out,
        "# {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    )?;
    if axes == ObjAxes::YUp {
        writeln!(out, "# Coordinate system: Y-up (OBJ convention)")?;
    }
    writeln!(out, "o room")?;

    for (p, c) in mesh
        .positions
        .chunks_exact(3)
        .zip(mesh.colors.chunks_exact(3))
    {
        let (x, y, z) = match axes {
            ObjAxes::ZUp => (p[0], p[1], p[2]),
            ObjAxes::YUp => (p[0], p[2], -p[1]),
        };
        writeln!(
            out,
            "v {:.6} {:.6} {:.6} {:.6} {:.6} {:.6}",
            x, y, z, c[0], c[1], c[2]
        )?;
    }

    // OBJ indices are 1-based
    for tri in mesh.indices.chunks_exact(3) {
        writeln!(out, "f {} {} {}", tri[0] + 1, tri[1] + 1, tri[2] + 1)?;
    }

    Ok(())
}

/// Render a mesh to an OBJ string
pub fn obj_string(mesh: &Mesh, axes: ObjAxes) -> Result<String> {
    let mut buf = Vec::with_capacity(mesh.vertex_count() * 64 + mesh.triangle_count() * 24);
    write_obj(mesh, axes, &mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}

/// Write a mesh to an OBJ file on disk
pub fn write_obj_file(mesh: &Mesh, axes: ObjAxes, path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    write_obj(mesh, axes, &mut out)?;
    out.flush()?;
    Ok(())
}
