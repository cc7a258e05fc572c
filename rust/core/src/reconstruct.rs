// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Layout reconstruction: signals to prediction record
//!
//! Runs the general wall loop first and falls back to a cuboid built from
//! the four strongest corner peaks when the general loop cannot be used.

use crate::error::{LayoutError, Result};
use crate::peaks::{find_peaks, peak_columns, Peak};
use crate::planes::{estimate_second_plane, rows_on_second_plane};
use crate::signals::LayoutSignals;
use crate::types::{
    FallbackReason, LayoutCorner, LayoutPrediction, PostProcessConfig, ReconstructionOutcome,
};
use crate::wall_loop::{WallFitter, WallLoop};
use layout_lite_geometry::{Equirect, FloorCanvas};
use serde::Serialize;

/// Minimum number of peaks for a room
const MIN_CORNERS: usize = 4;

/// Full result of a reconstruction
#[derive(Debug, Clone, Serialize)]
pub struct LayoutReconstruction {
    pub prediction: LayoutPrediction,
    pub corners: Vec<LayoutCorner>,
    pub walls: WallLoop,
    pub peaks: Vec<Peak>,
    pub outcome: ReconstructionOutcome,
}

/// Reconstruct the room layout from decoded signals
pub fn reconstruct_layout(
    signals: &LayoutSignals,
    config: &PostProcessConfig,
) -> Result<LayoutReconstruction> {
    let width = signals.width();
    let pano = Equirect::new(width, signals.height);
    let z0 = config.z0;
    let z1 = estimate_second_plane(&pano, &signals.ceiling, &signals.floor, z0)?;
    let tolerance = config.tolerance(z1);
    let radius = config.peak_radius(width);

    tracing::debug!(width, z1, tolerance, radius, "fitting wall loop");

    let fitter = WallFitter::new(pano, FloorCanvas::default(), &signals.ceiling, z0, tolerance);

    let (walls, peaks, outcome) = if config.force_cuboid {
        let (walls, peaks) = fit_cuboid(&fitter, signals, radius)?;
        (walls, peaks, ReconstructionOutcome::ForcedCuboid)
    } else {
        let peaks = find_peaks(&signals.corner, radius, config.min_peak_value, config.max_peaks);
        let reason = if peaks.len() < MIN_CORNERS {
            Some(FallbackReason::TooFewPeaks)
        } else {
            None
        };

        let general = if reason.is_none() {
            let walls = fitter.general(&peak_columns(&peaks))?;
            walls.is_valid().then_some(walls)
        } else {
            None
        };

        match general {
            Some(walls) => (walls, peaks, ReconstructionOutcome::General),
            None => {
                let reason = reason.unwrap_or(FallbackReason::SelfIntersecting);
                tracing::warn!(
                    peaks = peaks.len(),
                    ?reason,
                    "general layout rejected, falling back to cuboid"
                );
                let (walls, peaks) = fit_cuboid(&fitter, signals, radius)?;
                (walls, peaks, ReconstructionOutcome::CuboidFallback { reason })
            }
        }
    };

    let pixels = fitter.corner_pixels(&walls, z0);
    let ceiling_rows: Vec<f64> = pixels.iter().map(|&(_, row)| row).collect();
    let floor_rows = rows_on_second_plane(&pano, &ceiling_rows, z0, z1);

    let corners: Vec<LayoutCorner> = pixels
        .iter()
        .zip(&floor_rows)
        .map(|(&(column, ceiling_row), &floor_row)| LayoutCorner {
            column,
            ceiling_row,
            floor_row,
        })
        .collect();

    let (w, h) = (width as f64, signals.height as f64);
    let uv = corners
        .iter()
        .flat_map(|c| [[c.column / w, c.ceiling_row / h], [c.column / w, c.floor_row / h]])
        .collect();

    tracing::debug!(corners = corners.len(), ?outcome, "layout reconstructed");

    Ok(LayoutReconstruction {
        prediction: LayoutPrediction { z0, z1, uv },
        corners,
        walls,
        peaks,
        outcome,
    })
}

fn fit_cuboid(
    fitter: &WallFitter,
    signals: &LayoutSignals,
    radius: usize,
) -> Result<(WallLoop, Vec<Peak>)> {
    let peaks = find_peaks(&signals.corner, radius, 0.0, Some(MIN_CORNERS));
    if peaks.len() < MIN_CORNERS {
        return Err(LayoutError::InsufficientPeaks {
            found: peaks.len(),
            required: MIN_CORNERS,
        });
    }
    let walls = fitter.cuboid(&peak_columns(&peaks))?;
    if !walls.is_valid() {
        return Err(LayoutError::InvalidLayout(
            "cuboid footprint is degenerate".to_string(),
        ));
    }
    Ok((walls, peaks))
}
