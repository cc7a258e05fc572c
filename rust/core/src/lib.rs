// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room layout reconstruction from 360° panoramas
//!
//! This crate turns the per-column output of a HorizonNet-style layout
//! network into a room:
//! 1. Decoding boundary latitudes and corner logits into pixel signals
//! 2. Finding corner peaks and fitting a Manhattan wall loop, with a cuboid
//!    fallback when the loop is unusable
//! 3. Casting the layout into a per-pixel depth map
//! 4. Triangulating the textured room into a colored mesh
//!
//! # Usage
//!
//! ```rust,ignore
//! use layout_lite_core::{postprocess, build_room_mesh, PostProcessConfig, RawNetworkOutput};
//!
//! let raw: RawNetworkOutput = serde_json::from_str(&json)?;
//! let layout = postprocess(&raw, &PostProcessConfig::default())?;
//! let mesh = build_room_mesh(&texture, &layout.prediction, 1.6)?;
//! ```

pub mod augment;
pub mod depth;
pub mod error;
pub mod image_ops;
pub mod mesh_builder;
pub mod peaks;
pub mod planes;
pub mod reconstruct;
pub mod signals;
pub mod types;
pub mod wall_loop;

// Re-export commonly used types and functions
pub use augment::{augment, merge_augmented, Augmentation, TensorBatch};
pub use depth::{layout_depth, DepthMap, Surface};
pub use error::{LayoutError, Result};
pub use image_ops::{decode_rgb, load_rgb, mean_intensity, resize_for_network, to_tensor};
pub use mesh_builder::{build_room_mesh, mesh_from_depth, triangulate_mask, Triangulation};
pub use peaks::{find_peaks, Peak};
pub use reconstruct::{reconstruct_layout, LayoutReconstruction};
pub use signals::{LayoutSignals, RawNetworkBatch, RawNetworkOutput};
pub use types::{
    FallbackReason, LayoutCorner, LayoutPrediction, PostProcessConfig, ReconstructionOutcome,
};
pub use wall_loop::{WallAxis, WallFitter, WallLine, WallLoop};

/// Decode one raw network output and reconstruct its layout
pub fn postprocess(raw: &RawNetworkOutput, config: &PostProcessConfig) -> Result<LayoutReconstruction> {
    let signals = LayoutSignals::decode(raw, config.input_height)?;
    reconstruct_layout(&signals, config)
}

/// Reconstruct layouts from an augmented batch of network outputs
///
/// `outputs` must follow the order produced by [`augment`].
pub fn postprocess_augmented(
    outputs: &[RawNetworkOutput],
    augmentations: &[Augmentation],
    config: &PostProcessConfig,
) -> Result<Vec<LayoutReconstruction>> {
    merge_augmented(outputs, augmentations, config.input_height)?
        .iter()
        .map(|signals| reconstruct_layout(signals, config))
        .collect()
}
