// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response types for the API.

use layout_lite_core::{
    LayoutCorner, LayoutPrediction, LayoutReconstruction, ReconstructionOutcome, WallLine,
};
use serde::{Deserialize, Serialize};

/// Reconstructed layout of one panorama.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutResponse {
    /// Prediction record `{z0, z1, uv}`.
    pub prediction: LayoutPrediction,
    /// Which reconstruction path produced the layout.
    pub outcome: ReconstructionOutcome,
    /// Corner positions in pixels of the network input.
    pub corners: Vec<LayoutCorner>,
    /// Wall lines on the floor canvas, in loop order.
    pub walls: Vec<WallLine>,
    /// Number of corner peaks detected.
    pub peak_count: usize,
}

impl From<LayoutReconstruction> for LayoutResponse {
    fn from(layout: LayoutReconstruction) -> Self {
        Self {
            peak_count: layout.peaks.len(),
            prediction: layout.prediction,
            outcome: layout.outcome,
            corners: layout.corners,
            walls: layout.walls.walls,
        }
    }
}

/// Full prediction response for an uploaded panorama.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Cache key for this result (SHA256 of the upload and options).
    pub cache_key: String,
    pub layout: LayoutResponse,
    /// Processing statistics.
    pub stats: ProcessingStats,
}

/// Processing statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Uploaded image size in pixels.
    pub image_width: u32,
    pub image_height: u32,
    /// Copies sent to the network (original plus augmentations).
    pub batch_size: usize,
    /// Time spent decoding and resizing (ms).
    pub preprocess_time_ms: u64,
    /// Time spent waiting for the network (ms).
    pub inference_time_ms: u64,
    /// Time spent in post-processing (ms).
    pub postprocess_time_ms: u64,
    /// Total processing time (ms).
    pub total_time_ms: u64,
    /// Whether result was from cache.
    pub from_cache: bool,
}
