// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Layout prediction for uploaded panoramas.

use super::extract_fields;
use crate::error::ApiError;
use crate::services::{cache::DiskCache, predict_layout};
use crate::types::{PredictOptions, PredictResponse};
use crate::AppState;
use axum::{
    extract::{Multipart, Query, State},
    Json,
};

/// Cache key for an upload under the current settings.
fn cache_key(state: &AppState, data: &[u8], force_cuboid: bool) -> String {
    let settings = format!(
        "force_cuboid={};tta_flip={};tta_rotate={:?}",
        force_cuboid, state.config.tta_flip, state.config.tta_rotate
    );
    DiskCache::generate_key(&[data, settings.as_bytes()])
}

/// POST /api/v1/predict - Panorama upload to layout prediction.
pub async fn predict(
    State(state): State<AppState>,
    Query(options): Query<PredictOptions>,
    mut multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    let mut fields = extract_fields(
        &mut multipart,
        &["file"],
        state.config.max_file_size_bytes(),
        state.config.max_file_size_mb,
    )
    .await?;
    let data = fields.remove("file").ok_or(ApiError::MissingField("file"))?;

    let cache_key = cache_key(&state, &data, options.force_cuboid);

    if !options.skip_cache {
        if let Some(mut cached) = state.cache.get::<PredictResponse>(&cache_key).await? {
            tracing::info!(cache_key = %cache_key, "Cache HIT");
            cached.stats.from_cache = true;
            return Ok(Json(cached));
        }
    }

    tracing::info!(cache_key = %cache_key, size = data.len(), "Cache MISS - predicting");

    let (layout, stats) = predict_layout(&state, data.to_vec(), options.force_cuboid).await?;
    let response = PredictResponse {
        cache_key: cache_key.clone(),
        layout,
        stats,
    };

    // Cache result (background)
    let cache = state.cache.clone();
    let response_clone = response.clone();
    tokio::spawn(async move {
        if let Err(e) = cache.set(&cache_key, &response_clone).await {
            tracing::error!(error = %e, "Failed to cache result");
        }
    });

    Ok(Json(response))
}
