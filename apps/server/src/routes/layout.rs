// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Post-processing of raw network output.

use crate::error::ApiError;
use crate::types::{LayoutRequest, LayoutResponse};
use axum::Json;
use layout_lite_core::postprocess;

/// POST /api/v1/layout - Raw network output to a layout prediction.
pub async fn post_layout(Json(request): Json<LayoutRequest>) -> Result<Json<LayoutResponse>, ApiError> {
    let LayoutRequest { output, config } = request;
    let layout =
        tokio::task::spawn_blocking(move || postprocess(&output, &config)).await??;

    tracing::debug!(
        corners = layout.corners.len(),
        outcome = ?layout.outcome,
        "Layout post-processed"
    );
    Ok(Json(LayoutResponse::from(layout)))
}
