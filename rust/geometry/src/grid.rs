// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dense row-major 2D grids
//!
//! Per-pixel data (depth, surface masks, vertex ids) is stored as a flat
//! `Vec` indexed by `row * width + col`. The helpers here mirror the few
//! array operations mask triangulation needs: 3×3 correlation with zero
//! padding and cyclic column wrapping.

/// 3×3 correlation kernel, indexed `[row][col]` with the center at `[1][1]`
pub type Kernel3 = [[u8; 3]; 3];

/// Dense row-major grid
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Create a grid filled with `value`
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Append a copy of the first column as an extra last column
    ///
    /// Used to close the 360° seam of a panorama before meshing.
    pub fn with_wrapped_column(&self) -> Self {
        let width = self.width + 1;
        let mut data = Vec::with_capacity(width * self.height);
        for row in self.data.chunks_exact(self.width.max(1)) {
            data.extend_from_slice(row);
            if let Some(first) = row.first() {
                data.push(first.clone());
            }
        }
        Self {
            width,
            height: self.height,
            data,
        }
    }
}

impl<T> Grid<T> {
    /// Build a grid from a per-cell function `f(row, col)`
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col));
            }
        }
        Self { width, height, data }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> &T {
        &self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.width + col] = value;
    }

    /// Bounds-checked access with signed coordinates
    #[inline]
    pub fn get_signed(&self, row: isize, col: isize) -> Option<&T> {
        if row < 0 || col < 0 || row as usize >= self.height || col as usize >= self.width {
            None
        } else {
            Some(self.get(row as usize, col as usize))
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Element-wise transform
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl Grid<bool> {
    /// Number of `true` cells
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Element-wise NOT
    pub fn not(&self) -> Grid<bool> {
        self.map(|&v| !v)
    }

    /// Same-size 3×3 cross-correlation with zero padding
    ///
    /// `out[r][c] = Σ kernel[i][j] · self[r + i − 1][c + j − 1]`
    pub fn correlate3(&self, kernel: &Kernel3) -> Grid<u8> {
        Grid::from_fn(self.width, self.height, |row, col| {
            let mut sum = 0u8;
            for (i, kernel_row) in kernel.iter().enumerate() {
                for (j, &weight) in kernel_row.iter().enumerate() {
                    if weight == 0 {
                        continue;
                    }
                    let r = row as isize + i as isize - 1;
                    let c = col as isize + j as isize - 1;
                    if let Some(&true) = self.get_signed(r, c) {
                        sum += weight;
                    }
                }
            }
            sum
        })
    }
}

/// Kernel rotated by 180°, turning a correlation into a convolution
pub fn flip_kernel(kernel: &Kernel3) -> Kernel3 {
    let mut flipped = [[0u8; 3]; 3];
    for (i, row) in kernel.iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            flipped[2 - i][2 - j] = value;
        }
    }
    flipped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(rows: &[&[u8]]) -> Grid<bool> {
        let height = rows.len();
        let width = rows[0].len();
        Grid::from_fn(width, height, |r, c| rows[r][c] == 1)
    }

    #[test]
    fn test_wrapped_column_duplicates_first() {
        let grid = Grid::from_fn(3, 2, |r, c| r * 10 + c);
        let wrapped = grid.with_wrapped_column();
        assert_eq!(wrapped.width(), 4);
        assert_eq!(wrapped.as_slice(), &[0, 1, 2, 0, 10, 11, 12, 10]);
    }

    #[test]
    fn test_correlate_counts_template_hits() {
        let m = mask(&[&[1, 1, 0], &[1, 1, 0], &[0, 0, 0]]);
        // lower triangle: self, below, below-right
        let lower: Kernel3 = [[0, 0, 0], [0, 1, 0], [0, 1, 1]];
        let out = m.correlate3(&lower);
        assert_eq!(*out.get(0, 0), 3);
        assert_eq!(*out.get(0, 1), 2);
        assert_eq!(*out.get(1, 0), 1);
    }

    #[test]
    fn test_flip_kernel() {
        let k: Kernel3 = [[1, 2, 3], [4, 5, 6], [7, 8, 9]];
        assert_eq!(flip_kernel(&k), [[9, 8, 7], [6, 5, 4], [3, 2, 1]]);
    }

    #[test]
    fn test_not_and_count() {
        let a = mask(&[&[1, 0], &[1, 1]]);
        assert_eq!(a.not().count(), 1);
    }
}
