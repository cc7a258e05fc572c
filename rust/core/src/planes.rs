// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Horizontal plane fitting between the ceiling and floor boundaries
//!
//! The ceiling boundary is assumed to lie on the plane `z = z0`. For each
//! column that fixes the horizontal wall distance `c0 = z0 / tan v0`, and the
//! floor boundary at the same column then gives an estimate `c0 · tan v1` of
//! the second plane's height.

use crate::error::{LayoutError, Result};
use layout_lite_geometry::Equirect;

/// Linear-interpolated percentile of an ascending slice (`p` in 0..=100)
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = (p / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
        }
    }
}

/// Mean of the values lying between two percentiles (inclusive)
pub fn mean_percentile(values: &[f64], low: f64, high: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    let lo = percentile(&sorted, low);
    let hi = percentile(&sorted, high);

    let kept: Vec<f64> = sorted.into_iter().filter(|&v| v >= lo && v <= hi).collect();
    if kept.is_empty() {
        return None;
    }
    Some(kept.iter().sum::<f64>() / kept.len() as f64)
}

/// Estimate the second plane height from per-column boundary rows
pub fn estimate_second_plane(
    pano: &Equirect,
    ceiling_rows: &[f64],
    floor_rows: &[f64],
    z0: f64,
) -> Result<f64> {
    if ceiling_rows.len() != floor_rows.len() {
        return Err(LayoutError::shape(
            "floor boundary",
            ceiling_rows.len(),
            floor_rows.len(),
        ));
    }

    let estimates: Vec<f64> = ceiling_rows
        .iter()
        .zip(floor_rows)
        .map(|(&r0, &r1)| {
            let c0 = z0 / pano.row_to_v(r0).tan();
            c0 * pano.row_to_v(r1).tan()
        })
        .collect();

    mean_percentile(&estimates, 25.0, 75.0).ok_or_else(|| {
        LayoutError::InvalidLayout("no finite plane height estimate".to_string())
    })
}

/// Rows where corners seen at `rows0` on the z0 plane appear on the z1 plane
pub fn rows_on_second_plane(pano: &Equirect, rows0: &[f64], z0: f64, z1: f64) -> Vec<f64> {
    rows0
        .iter()
        .map(|&r0| {
            let c0 = z0 / pano.row_to_v(r0).tan();
            pano.v_to_row(z1.atan2(c0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(percentile(&sorted, 25.0), 1.75);
        assert_relative_eq!(percentile(&sorted, 75.0), 3.25);
        assert_relative_eq!(percentile(&sorted, 0.0), 1.0);
        assert_relative_eq!(percentile(&sorted, 100.0), 4.0);
    }

    #[test]
    fn test_mean_percentile_drops_tails() {
        let values = [100.0, 2.0, 3.0, -50.0, 4.0, 5.0, 3.5, 2.5];
        let mean = mean_percentile(&values, 25.0, 75.0).unwrap();
        // quartiles are 2.375 and 4.25
        assert_relative_eq!(mean, (2.5 + 3.0 + 3.5 + 4.0) / 4.0, epsilon = 1e-12);
        assert!(mean_percentile(&[], 25.0, 75.0).is_none());
    }

    #[test]
    fn test_second_plane_recovers_floor_height() {
        let pano = Equirect::new(1024, 512);
        let (z0, z1) = (50.0, -80.0);
        let distances: Vec<f64> = (0..1024).map(|i| 100.0 + (i % 37) as f64).collect();
        let ceiling: Vec<f64> = distances.iter().map(|c| pano.v_to_row((z0 / c).atan())).collect();
        let floor: Vec<f64> = distances.iter().map(|c| pano.v_to_row((z1 / c).atan())).collect();

        let estimate = estimate_second_plane(&pano, &ceiling, &floor, z0).unwrap();
        assert_relative_eq!(estimate, z1, epsilon = 1e-6);

        let rows = rows_on_second_plane(&pano, &ceiling[..3], z0, z1);
        for (row, expected) in rows.iter().zip(&floor[..3]) {
            assert_relative_eq!(*row, *expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_second_plane_length_mismatch() {
        let pano = Equirect::new(4, 8);
        assert!(estimate_second_plane(&pano, &[1.0, 2.0], &[6.0], 50.0).is_err());
    }
}
