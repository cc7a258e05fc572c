// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OBJ room mesh export.

use super::extract_fields;
use crate::error::ApiError;
use crate::types::MeshOptions;
use crate::AppState;
use axum::{
    extract::{Multipart, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use layout_lite_core::{build_room_mesh, decode_rgb, LayoutPrediction};
use layout_lite_geometry::{obj_string, ObjAxes};

/// POST /api/v1/mesh - Texture plus prediction record to an OBJ mesh.
///
/// Multipart fields: `file` (panorama image) and `prediction`
/// (JSON `{z0, z1, uv}`).
pub async fn export_mesh(
    State(state): State<AppState>,
    Query(options): Query<MeshOptions>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut fields = extract_fields(
        &mut multipart,
        &["file", "prediction"],
        state.config.max_file_size_bytes(),
        state.config.max_file_size_mb,
    )
    .await?;
    let image = fields.remove("file").ok_or(ApiError::MissingField("file"))?;
    let prediction = fields
        .remove("prediction")
        .ok_or(ApiError::MissingField("prediction"))?;
    let prediction = std::str::from_utf8(&prediction)
        .map_err(|e| ApiError::BadRequest(format!("prediction is not UTF-8: {e}")))?;
    let prediction = LayoutPrediction::from_json(prediction)?;

    if !options.camera_height.is_finite() || options.camera_height <= 0.0 {
        return Err(ApiError::BadRequest("camera_height must be positive".into()));
    }

    let obj = tokio::task::spawn_blocking(move || -> Result<String, ApiError> {
        let texture = decode_rgb(&image)?;
        let mesh = build_room_mesh(&texture, &prediction, options.camera_height)?;
        tracing::info!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "Room mesh built"
        );
        let axes = if options.y_up { ObjAxes::YUp } else { ObjAxes::ZUp };
        Ok(obj_string(&mesh, axes)?)
    })
    .await??;

    Ok((
        [
            (header::CONTENT_TYPE, "model/obj"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"room.obj\""),
        ],
        obj,
    )
        .into_response())
}
