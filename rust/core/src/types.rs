// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for panorama layout reconstruction

use crate::error::{LayoutError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the layout post-processing pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcessConfig {
    /// Network input width in pixels
    pub input_width: usize,
    /// Network input height in pixels
    pub input_height: usize,
    /// Height of the plane the ceiling boundary is projected on
    pub z0: f64,
    /// Peak separation radius as a fraction of `4 · W`
    pub peak_radius_ratio: f64,
    /// Corner probability a peak must strictly exceed
    pub min_peak_value: f64,
    /// Optional cap on the number of corner peaks
    pub max_peaks: Option<usize>,
    /// Wall vote tolerance as a fraction of `|z1|`
    pub tolerance_ratio: f64,
    /// Skip the general reconstruction and fit a cuboid directly
    pub force_cuboid: bool,
    /// Camera height above the floor, in meters
    pub camera_height: f64,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            input_width: 1024,
            input_height: 512,
            z0: 50.0,
            peak_radius_ratio: 0.05,
            min_peak_value: 0.05,
            max_peaks: None,
            tolerance_ratio: 0.16 / 1.6,
            force_cuboid: false,
            camera_height: 1.6,
        }
    }
}

impl PostProcessConfig {
    /// Peak separation radius for a signal of `width` columns
    pub fn peak_radius(&self, width: usize) -> usize {
        (width as f64 * self.peak_radius_ratio / 4.0).round() as usize
    }

    /// Wall vote tolerance for a fitted second plane height
    pub fn tolerance(&self, z1: f64) -> f64 {
        (self.tolerance_ratio * z1).abs()
    }
}

/// Layout prediction record: plane heights plus normalised corner positions
///
/// `uv` holds two entries per corner: the corner on the z0 plane (ceiling
/// boundary) then the same corner on the z1 plane (floor boundary), each as
/// `[column / W, row / H]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPrediction {
    pub z0: f64,
    pub z1: f64,
    pub uv: Vec<[f64; 2]>,
}

impl LayoutPrediction {
    /// Number of layout corners
    pub fn corner_count(&self) -> usize {
        self.uv.len() / 2
    }

    /// Iterate `(ceiling_uv, floor_uv)` pairs per corner
    pub fn corner_pairs(&self) -> impl Iterator<Item = (&[f64; 2], &[f64; 2])> {
        self.uv.chunks_exact(2).map(|pair| (&pair[0], &pair[1]))
    }

    /// Check the record can describe a room
    pub fn validate(&self) -> Result<()> {
        if self.uv.len() % 2 != 0 {
            return Err(LayoutError::InvalidLayout(format!(
                "uv holds {} entries, expected two per corner",
                self.uv.len()
            )));
        }
        if self.corner_count() < 3 {
            return Err(LayoutError::InvalidLayout(format!(
                "{} corners cannot enclose a room",
                self.corner_count()
            )));
        }
        if !self.z0.is_finite()
            || !self.z1.is_finite()
            || self.uv.iter().flatten().any(|v| !v.is_finite())
        {
            return Err(LayoutError::InvalidLayout(
                "non-finite value in prediction".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let prediction: Self = serde_json::from_str(text)?;
        prediction.validate()?;
        Ok(prediction)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Why the general reconstruction was abandoned for a cuboid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The general wall loop produced a self-intersecting footprint
    SelfIntersecting,
    /// Fewer than four corner peaks cleared the threshold
    TooFewPeaks,
}

/// Which reconstruction path produced a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum ReconstructionOutcome {
    General,
    CuboidFallback { reason: FallbackReason },
    ForcedCuboid,
}

impl ReconstructionOutcome {
    pub fn is_cuboid(&self) -> bool {
        !matches!(self, ReconstructionOutcome::General)
    }
}

/// A layout corner in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutCorner {
    pub column: f64,
    pub ceiling_row: f64,
    pub floor_row: f64,
}
