// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synthetic rooms for pipeline tests

#![allow(dead_code)]

use layout_lite_core::wall_loop::wall_groups;
use layout_lite_core::{LayoutSignals, RawNetworkOutput, WallAxis};
use layout_lite_geometry::{horizontal_direction, Equirect};
use std::f64::consts::PI;

pub const WIDTH: usize = 1024;
pub const HEIGHT: usize = 512;
pub const Z0: f64 = 50.0;
pub const Z1: f64 = -80.0;

/// Canvas center of the default floor canvas
pub const CENTER: (f64, f64) = (511.5, 255.5);

/// Corner columns of a square room of half-size 100 around the camera
pub const SQUARE_PEAKS: [usize; 4] = [128, 384, 640, 896];

/// Walls of that square room, one per peak group, offsets from the camera
pub const SQUARE_WALLS: [(WallAxis, f64); 4] = [
    (WallAxis::Y, 100.0),
    (WallAxis::X, -100.0),
    (WallAxis::Y, -100.0),
    (WallAxis::X, 100.0),
];

pub fn pano() -> Equirect {
    Equirect::new(WIDTH, HEIGHT)
}

/// Ceiling and floor boundary rows for walls assigned to peak groups
pub fn boundary_rows(peaks: &[usize], walls: &[(WallAxis, f64)]) -> (Vec<f64>, Vec<f64>) {
    let pano = pano();
    let groups = wall_groups(peaks, WIDTH);
    let mut ceiling = Vec::with_capacity(WIDTH);
    let mut floor = Vec::with_capacity(WIDTH);
    for (col, &group) in groups.iter().enumerate() {
        let dir = horizontal_direction(pano.column_to_u(col as f64));
        let (axis, offset) = walls[group];
        let t = match axis {
            WallAxis::X => offset / dir.x,
            WallAxis::Y => offset / dir.y,
        };
        assert!(t > 0.0, "column {} does not face its wall", col);
        ceiling.push(pano.v_to_row((Z0 / t).atan()));
        floor.push(pano.v_to_row((Z1 / t).atan()));
    }
    (ceiling, floor)
}

/// Corner probabilities: zero except at the given columns
pub fn corner_signal(peaks: &[(usize, f64)]) -> Vec<f64> {
    let mut signal = vec![0.0; WIDTH];
    for &(col, value) in peaks {
        signal[col] = value;
    }
    signal
}

pub fn signals(peaks: &[(usize, f64)], walls_peaks: &[usize], walls: &[(WallAxis, f64)]) -> LayoutSignals {
    let (ceiling, floor) = boundary_rows(walls_peaks, walls);
    LayoutSignals::new(ceiling, floor, corner_signal(peaks), HEIGHT).unwrap()
}

pub fn square_signals() -> LayoutSignals {
    let peaks: Vec<(usize, f64)> = SQUARE_PEAKS.iter().map(|&c| (c, 0.9)).collect();
    signals(&peaks, &SQUARE_PEAKS, &SQUARE_WALLS)
}

/// Encode decoded signals back into raw network output
pub fn raw_output(signals: &LayoutSignals) -> RawNetworkOutput {
    let latitude = |row: f64| (((row + 0.5) / HEIGHT as f64 - 0.5) * PI) as f32;
    let logit = |p: f64| {
        let p = p.clamp(1e-4, 1.0 - 1e-4);
        (p / (1.0 - p)).ln() as f32
    };
    RawNetworkOutput {
        boundary: vec![
            signals.ceiling.iter().map(|&r| latitude(r)).collect(),
            signals.floor.iter().map(|&r| latitude(r)).collect(),
        ],
        corner_logits: signals.corner.iter().map(|&p| logit(p)).collect(),
    }
}
