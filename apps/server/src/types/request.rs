// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request types for the API.

use layout_lite_core::{PostProcessConfig, RawNetworkOutput};
use serde::Deserialize;

/// Body of `POST /api/v1/layout`: raw network output plus optional settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutRequest {
    #[serde(flatten)]
    pub output: RawNetworkOutput,

    /// Post-processing settings; defaults apply when omitted.
    #[serde(default)]
    pub config: PostProcessConfig,
}

/// Query options for prediction requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictOptions {
    /// Skip cache lookup if true.
    #[serde(default)]
    pub skip_cache: bool,

    /// Fit a four-wall room directly.
    #[serde(default)]
    pub force_cuboid: bool,
}

/// Query options for mesh export.
#[derive(Debug, Clone, Deserialize)]
pub struct MeshOptions {
    /// Camera height above the floor in metres.
    #[serde(default = "default_camera_height")]
    pub camera_height: f64,

    /// Write Y-up coordinates instead of Z-up.
    #[serde(default)]
    pub y_up: bool,
}

fn default_camera_height() -> f64 {
    PostProcessConfig::default().camera_height
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            camera_height: default_camera_height(),
            y_up: false,
        }
    }
}
