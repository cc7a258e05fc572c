// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for layout reconstruction
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors that can occur while turning network output into a room
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Shape mismatch for {what}: expected {expected}, got {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: String,
        found: String,
    },

    #[error("Insufficient peaks: found {found}, need at least {required}")]
    InsufficientPeaks { found: usize, required: usize },

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Camera lies outside the layout footprint (no wall hit at column {column})")]
    CameraOutsideLayout { column: usize },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] layout_lite_geometry::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LayoutError {
    pub(crate) fn shape(what: &'static str, expected: impl ToString, found: impl ToString) -> Self {
        LayoutError::ShapeMismatch {
            what,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}
