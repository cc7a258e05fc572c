// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Network output decoding
//!
//! The network emits, per image column, the ceiling and floor boundary
//! latitudes in radians (positive downwards) and a corner logit. Decoding
//! turns those into clipped pixel rows and corner probabilities.

use crate::error::{LayoutError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Raw output of the network for a single image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNetworkOutput {
    /// Boundary latitudes `[ceiling, floor]`, each of length W
    #[serde(rename = "y_bon")]
    pub boundary: Vec<Vec<f32>>,
    /// Corner logits, length W
    #[serde(rename = "y_cor")]
    pub corner_logits: Vec<f32>,
}

impl RawNetworkOutput {
    /// Number of columns, after checking both signals agree
    pub fn width(&self) -> Result<usize> {
        if self.boundary.len() != 2 {
            return Err(LayoutError::shape(
                "boundary channels",
                2,
                self.boundary.len(),
            ));
        }
        let width = self.corner_logits.len();
        if width == 0 {
            return Err(LayoutError::shape("corner signal", "at least 1 column", 0));
        }
        for channel in &self.boundary {
            if channel.len() != width {
                return Err(LayoutError::shape("boundary columns", width, channel.len()));
            }
        }
        Ok(width)
    }
}

/// Batched network output as served by a remote inference endpoint
///
/// `y_bon` is `[N][2][W]`, `y_cor` is `[N][1][W]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNetworkBatch {
    pub y_bon: Vec<Vec<Vec<f32>>>,
    pub y_cor: Vec<Vec<Vec<f32>>>,
}

impl RawNetworkBatch {
    /// Split into per-image outputs
    pub fn into_outputs(self) -> Result<Vec<RawNetworkOutput>> {
        if self.y_bon.len() != self.y_cor.len() {
            return Err(LayoutError::shape(
                "batch size",
                self.y_bon.len(),
                self.y_cor.len(),
            ));
        }
        self.y_bon
            .into_iter()
            .zip(self.y_cor)
            .map(|(boundary, mut corner)| {
                if corner.len() != 1 {
                    return Err(LayoutError::shape("corner channels", 1, corner.len()));
                }
                let output = RawNetworkOutput {
                    boundary,
                    corner_logits: corner.remove(0),
                };
                output.width()?;
                Ok(output)
            })
            .collect()
    }
}

#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Boundary latitude (radians, positive down) to a fractional pixel row
#[inline]
pub fn latitude_to_row(v: f64, height: usize) -> f64 {
    (v / PI + 0.5) * height as f64 - 0.5
}

/// Decoded per-column layout signals
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSignals {
    /// Ceiling boundary row per column, within `[1, H/2 − 1]`
    pub ceiling: Vec<f64>,
    /// Floor boundary row per column, within `[H/2 + 1, H − 2]`
    pub floor: Vec<f64>,
    /// Corner probability per column
    pub corner: Vec<f64>,
    /// Image height the rows refer to
    pub height: usize,
}

impl LayoutSignals {
    /// Decode one raw network output for an image of `height` rows
    pub fn decode(raw: &RawNetworkOutput, height: usize) -> Result<Self> {
        raw.width()?;
        let widen = |s: &[f32]| s.iter().map(|&v| v as f64).collect::<Vec<_>>();
        let corner = raw.corner_logits.iter().map(|&v| sigmoid(v as f64)).collect();
        Self::from_latitudes(
            &widen(&raw.boundary[0]),
            &widen(&raw.boundary[1]),
            corner,
            height,
        )
    }

    /// Build from boundary latitudes and corner probabilities
    pub fn from_latitudes(
        ceiling: &[f64],
        floor: &[f64],
        corner: Vec<f64>,
        height: usize,
    ) -> Result<Self> {
        if height < 4 {
            return Err(LayoutError::shape("image height", "at least 4 rows", height));
        }
        let half = height as f64 / 2.0;
        let ceiling = ceiling
            .iter()
            .map(|&v| latitude_to_row(v, height).clamp(1.0, half - 1.0))
            .collect();
        let floor = floor
            .iter()
            .map(|&v| latitude_to_row(v, height).clamp(half + 1.0, height as f64 - 2.0))
            .collect();
        Self::new(ceiling, floor, corner, height)
    }

    /// Wrap already-decoded rows and probabilities
    pub fn new(ceiling: Vec<f64>, floor: Vec<f64>, corner: Vec<f64>, height: usize) -> Result<Self> {
        let width = corner.len();
        if width == 0 {
            return Err(LayoutError::shape("corner signal", "at least 1 column", 0));
        }
        if ceiling.len() != width {
            return Err(LayoutError::shape("ceiling boundary", width, ceiling.len()));
        }
        if floor.len() != width {
            return Err(LayoutError::shape("floor boundary", width, floor.len()));
        }
        Ok(Self {
            ceiling,
            floor,
            corner,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.corner.len()
    }
}
