// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Corner peak detection on the cyclic corner-probability signal

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A local maximum of the corner signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub column: usize,
    pub value: f64,
}

/// Find cyclic local maxima, sorted by column
///
/// A column is a peak when its value is strictly above `min_value`, strictly
/// greater than every earlier column in the window `[i − radius, i + radius]`
/// (wrapping around the panorama seam) and at least every later one. Flat
/// plateaus therefore produce a single peak, and any two peaks are more than
/// `radius` columns apart.
///
/// With `max_count`, only the highest peaks are kept (equal values prefer the
/// lower column) before re-sorting by column.
pub fn find_peaks(
    signal: &[f64],
    radius: usize,
    min_value: f64,
    max_count: Option<usize>,
) -> Vec<Peak> {
    let width = signal.len();
    if width == 0 {
        return Vec::new();
    }

    let mut peaks: Vec<Peak> = (0..width)
        .filter(|&i| signal[i] > min_value && is_window_max(signal, i, radius))
        .map(|i| Peak {
            column: i,
            value: signal[i],
        })
        .collect();

    if let Some(count) = max_count {
        if peaks.len() > count {
            peaks.sort_by(|a, b| {
                b.value
                    .partial_cmp(&a.value)
                    .unwrap_or(Ordering::Equal)
                    .then(a.column.cmp(&b.column))
            });
            peaks.truncate(count);
            peaks.sort_by_key(|p| p.column);
        }
    }

    peaks
}

fn is_window_max(signal: &[f64], i: usize, radius: usize) -> bool {
    let width = signal.len();
    let value = signal[i];
    for offset in 1..=radius {
        let before = (i + width - offset % width) % width;
        let after = (i + offset) % width;
        if before != i && signal[before] >= value {
            return false;
        }
        if after != i && signal[after] > value {
            return false;
        }
    }
    true
}

/// Columns of a peak list
pub fn peak_columns(peaks: &[Peak]) -> Vec<usize> {
    peaks.iter().map(|p| p.column).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bumps(width: usize, at: &[(usize, f64)]) -> Vec<f64> {
        let mut signal = vec![0.0; width];
        for &(column, value) in at {
            signal[column] = value;
        }
        signal
    }

    #[test]
    fn test_simple_peaks_sorted_by_column() {
        let signal = bumps(100, &[(70, 0.9), (10, 0.5), (40, 0.7)]);
        let peaks = find_peaks(&signal, 5, 0.05, None);
        assert_eq!(peak_columns(&peaks), vec![10, 40, 70]);
        assert_eq!(peaks[2].value, 0.9);
    }

    #[test]
    fn test_threshold_is_strict() {
        let signal = bumps(50, &[(10, 0.05), (30, 0.06)]);
        let peaks = find_peaks(&signal, 3, 0.05, None);
        assert_eq!(peak_columns(&peaks), vec![30]);
    }

    #[test]
    fn test_nearby_weaker_peak_is_suppressed() {
        let signal = bumps(100, &[(20, 0.9), (24, 0.8), (40, 0.6)]);
        let peaks = find_peaks(&signal, 5, 0.0, None);
        assert_eq!(peak_columns(&peaks), vec![20, 40]);
    }

    #[test]
    fn test_window_wraps_around_seam() {
        let signal = bumps(100, &[(1, 0.6), (98, 0.9)]);
        let peaks = find_peaks(&signal, 5, 0.0, None);
        assert_eq!(peak_columns(&peaks), vec![98]);
    }

    #[test]
    fn test_plateau_yields_single_peak() {
        let mut signal = vec![0.0; 60];
        for v in &mut signal[10..14] {
            *v = 0.7;
        }
        let peaks = find_peaks(&signal, 3, 0.0, None);
        assert_eq!(peak_columns(&peaks), vec![10]);
    }

    #[test]
    fn test_peaks_are_more_than_radius_apart() {
        let signal: Vec<f64> = (0..256)
            .map(|i| 0.5 + 0.5 * ((i as f64) * 0.37).sin() * ((i as f64) * 0.05).cos())
            .collect();
        let radius = 7;
        let peaks = find_peaks(&signal, radius, 0.0, None);
        assert!(!peaks.is_empty());
        for pair in peaks.windows(2) {
            assert!(pair[1].column - pair[0].column > radius);
        }
        let wrap = peaks[0].column + signal.len() - peaks[peaks.len() - 1].column;
        assert!(peaks.len() == 1 || wrap > radius);
    }

    #[test]
    fn test_cap_keeps_highest_then_sorts() {
        let signal = bumps(
            200,
            &[(10, 0.3), (50, 0.9), (90, 0.4), (130, 0.8), (170, 0.7)],
        );
        let peaks = find_peaks(&signal, 5, 0.0, Some(3));
        assert_eq!(peak_columns(&peaks), vec![50, 130, 170]);
    }

    #[test]
    fn test_cap_ties_prefer_lower_column() {
        let signal = bumps(120, &[(10, 0.5), (50, 0.5), (90, 0.5)]);
        let peaks = find_peaks(&signal, 5, 0.0, Some(2));
        assert_eq!(peak_columns(&peaks), vec![10, 50]);
    }

    #[test]
    fn test_empty_and_flat_signals() {
        assert!(find_peaks(&[], 3, 0.0, None).is_empty());
        assert!(find_peaks(&[0.0; 32], 3, 0.05, None).is_empty());
    }
}
