// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Test-time augmentation
//!
//! A batch is extended with horizontally flipped and cyclically rolled
//! copies. After inference each copy's output is mapped back to the
//! original column order and the copies are averaged.

use crate::error::{LayoutError, Result};
use crate::signals::{sigmoid, LayoutSignals, RawNetworkOutput};
use serde::{Deserialize, Serialize};

/// Dense `[N, C, H, W]` float tensor
#[derive(Debug, Clone, PartialEq)]
pub struct TensorBatch {
    pub batch: usize,
    pub channels: usize,
    pub height: usize,
    pub width: usize,
    pub data: Vec<f32>,
}

impl TensorBatch {
    pub fn new(batch: usize, channels: usize, height: usize, width: usize, data: Vec<f32>) -> Result<Self> {
        let expected = batch * channels * height * width;
        if data.len() != expected {
            return Err(LayoutError::shape("tensor data", expected, data.len()));
        }
        Ok(Self {
            batch,
            channels,
            height,
            width,
            data,
        })
    }

    pub fn shape(&self) -> [usize; 4] {
        [self.batch, self.channels, self.height, self.width]
    }

    /// Shape as sent in the `X-Tensor-Shape` header
    pub fn shape_header(&self) -> String {
        let [n, c, h, w] = self.shape();
        format!("{},{},{},{}", n, c, h, w)
    }

    /// Little-endian f32 bytes
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn rows(&self) -> std::slice::ChunksExact<'_, f32> {
        self.data.chunks_exact(self.width.max(1))
    }
}

/// A transform applied along the column axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Augmentation {
    Identity,
    Flip,
    /// Cyclic roll: column `i` moves to `i + shift`
    Roll { shift: isize },
}

impl Augmentation {
    /// Apply to one row of columns
    pub fn apply<T: Copy>(&self, row: &[T]) -> Vec<T> {
        match *self {
            Augmentation::Identity => row.to_vec(),
            Augmentation::Flip => row.iter().rev().copied().collect(),
            Augmentation::Roll { shift } => roll(row, shift),
        }
    }

    /// Undo on one row of columns
    pub fn undo<T: Copy>(&self, row: &[T]) -> Vec<T> {
        match *self {
            Augmentation::Roll { shift } => roll(row, -shift),
            other => other.apply(row),
        }
    }
}

fn roll<T: Copy>(row: &[T], shift: isize) -> Vec<T> {
    let n = row.len();
    if n == 0 {
        return Vec::new();
    }
    let k = shift.rem_euclid(n as isize) as usize;
    let mut out = Vec::with_capacity(n);
    out.extend_from_slice(&row[n - k..]);
    out.extend_from_slice(&row[..n - k]);
    out
}

/// Extend a batch with its augmented copies
///
/// The result holds the original batch, then the flipped batch when `flip`
/// is set, then one rolled batch per entry of `rotations` (a fraction of the
/// width, rounded to whole columns).
pub fn augment(input: &TensorBatch, flip: bool, rotations: &[f64]) -> (TensorBatch, Vec<Augmentation>) {
    let mut augmentations = vec![Augmentation::Identity];
    if flip {
        augmentations.push(Augmentation::Flip);
    }
    for &fraction in rotations {
        let shift = (fraction * input.width as f64).round_ties_even() as isize;
        augmentations.push(Augmentation::Roll { shift });
    }

    let mut data = Vec::with_capacity(input.data.len() * augmentations.len());
    for aug in &augmentations {
        for row in input.rows() {
            data.extend(aug.apply(row));
        }
    }

    let batch = TensorBatch {
        batch: input.batch * augmentations.len(),
        channels: input.channels,
        height: input.height,
        width: input.width,
        data,
    };
    (batch, augmentations)
}

/// Undo the augmentations on the network outputs and average the copies
///
/// `outputs` are ordered as produced by [`augment`]: all images of the
/// first augmentation, then all images of the second, and so on. Corner
/// logits are turned into probabilities before averaging. Returns one set
/// of signals per original image.
pub fn merge_augmented(
    outputs: &[RawNetworkOutput],
    augmentations: &[Augmentation],
    height: usize,
) -> Result<Vec<LayoutSignals>> {
    if augmentations.is_empty() || outputs.len() % augmentations.len() != 0 {
        return Err(LayoutError::shape(
            "augmented outputs",
            format!("a multiple of {}", augmentations.len()),
            outputs.len(),
        ));
    }
    let images = outputs.len() / augmentations.len();
    let copies = augmentations.len() as f64;

    (0..images)
        .map(|image| {
            let width = outputs[image].width()?;
            let mut ceiling = vec![0.0; width];
            let mut floor = vec![0.0; width];
            let mut corner = vec![0.0; width];

            for (a, aug) in augmentations.iter().enumerate() {
                let output = &outputs[a * images + image];
                let w = output.width()?;
                if w != width {
                    return Err(LayoutError::shape("augmented output columns", width, w));
                }
                let probabilities: Vec<f64> = output
                    .corner_logits
                    .iter()
                    .map(|&v| sigmoid(v as f64))
                    .collect();

                for (sum, value) in [
                    (&mut ceiling, aug.undo(&output.boundary[0])),
                    (&mut floor, aug.undo(&output.boundary[1])),
                ] {
                    for (s, v) in sum.iter_mut().zip(value) {
                        *s += v as f64 / copies;
                    }
                }
                for (s, v) in corner.iter_mut().zip(aug.undo(&probabilities)) {
                    *s += v / copies;
                }
            }

            LayoutSignals::from_latitudes(&ceiling, &floor, corner, height)
        })
        .collect()
}
