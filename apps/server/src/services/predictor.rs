// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Image to layout prediction: preprocess, remote inference, post-process.

use crate::error::ApiError;
use crate::types::{LayoutResponse, ProcessingStats};
use crate::AppState;
use layout_lite_core::{
    augment, decode_rgb, mean_intensity, postprocess_augmented, resize_for_network, to_tensor,
    Augmentation, PostProcessConfig, TensorBatch,
};
use std::time::Instant;

/// Network input ready to send.
struct PreparedInput {
    batch: TensorBatch,
    augmentations: Vec<Augmentation>,
    width: u32,
    height: u32,
}

/// Predict the layout of an encoded panorama.
pub async fn predict_layout(
    state: &AppState,
    data: Vec<u8>,
    force_cuboid: bool,
) -> Result<(LayoutResponse, ProcessingStats), ApiError> {
    if !state.inference.is_configured() {
        return Err(ApiError::InferenceUnavailable);
    }
    let total_start = Instant::now();

    // Decode and resize on the blocking pool
    let flip = state.config.tta_flip;
    let rotations = state.config.tta_rotate.clone();
    let prepared = tokio::task::spawn_blocking(move || -> Result<PreparedInput, ApiError> {
        let image = decode_rgb(&data)?;
        let (width, height) = image.dimensions();
        tracing::info!(
            image_mean_intensity = mean_intensity(&image),
            image_area = width as u64 * height as u64,
            "METRIC"
        );
        let tensor = to_tensor(&resize_for_network(&image));
        let (batch, augmentations) = augment(&tensor, flip, &rotations);
        Ok(PreparedInput {
            batch,
            augmentations,
            width,
            height,
        })
    })
    .await??;
    let preprocess_time_ms = total_start.elapsed().as_millis() as u64;

    let inference_start = Instant::now();
    let outputs = state.inference.infer(&prepared.batch).await?;
    let inference_time_ms = inference_start.elapsed().as_millis() as u64;

    let postprocess_start = Instant::now();
    let config = PostProcessConfig {
        force_cuboid,
        input_width: prepared.batch.width,
        input_height: prepared.batch.height,
        ..PostProcessConfig::default()
    };
    let augmentations = prepared.augmentations;
    let layout = tokio::task::spawn_blocking(move || {
        postprocess_augmented(&outputs, &augmentations, &config)
    })
    .await??
    .into_iter()
    .next()
    .ok_or_else(|| ApiError::Inference("Inference returned no outputs".into()))?;
    let postprocess_time_ms = postprocess_start.elapsed().as_millis() as u64;

    tracing::info!(
        corners = layout.corners.len(),
        outcome = ?layout.outcome,
        inference_time_ms,
        "Layout predicted"
    );

    let stats = ProcessingStats {
        image_width: prepared.width,
        image_height: prepared.height,
        batch_size: prepared.batch.batch,
        preprocess_time_ms,
        inference_time_ms,
        postprocess_time_ms,
        total_time_ms: total_start.elapsed().as_millis() as u64,
        from_cache: false,
    };
    Ok((LayoutResponse::from(layout), stats))
}
