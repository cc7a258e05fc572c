// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Image loading and network input preparation

use crate::augment::TensorBatch;
use crate::error::Result;
use image::imageops::FilterType;
use image::{ImageReader, RgbImage};
use std::path::Path;

/// Network input size
pub const NETWORK_WIDTH: u32 = 1024;
pub const NETWORK_HEIGHT: u32 = 512;

/// Open an image file as RGB, dropping any alpha channel
pub fn load_rgb(path: impl AsRef<Path>) -> Result<RgbImage> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(img.to_rgb8())
}

/// Decode encoded image bytes (PNG or JPEG) as RGB
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage> {
    Ok(image::load_from_memory(bytes)?.to_rgb8())
}

/// Resize to the network input size with bicubic (Catmull-Rom) filtering
pub fn resize_for_network(image: &RgbImage) -> RgbImage {
    if image.dimensions() == (NETWORK_WIDTH, NETWORK_HEIGHT) {
        return image.clone();
    }
    image::imageops::resize(image, NETWORK_WIDTH, NETWORK_HEIGHT, FilterType::CatmullRom)
}

/// `[1, 3, H, W]` tensor with values in `[0, 1]`
pub fn to_tensor(image: &RgbImage) -> TensorBatch {
    let (w, h) = (image.width() as usize, image.height() as usize);
    let mut data = vec![0.0f32; 3 * h * w];
    for (x, y, pixel) in image.enumerate_pixels() {
        let i = y as usize * w + x as usize;
        for c in 0..3 {
            data[c * h * w + i] = pixel.0[c] as f32 / 255.0;
        }
    }
    TensorBatch {
        batch: 1,
        channels: 3,
        height: h,
        width: w,
        data,
    }
}

/// Mean of the first channel, reported as a request metric
pub fn mean_intensity(image: &RgbImage) -> f64 {
    let count = (image.width() as u64 * image.height() as u64).max(1);
    let sum: u64 = image.pixels().map(|p| p.0[0] as u64).sum();
    sum as f64 / count as f64
}
