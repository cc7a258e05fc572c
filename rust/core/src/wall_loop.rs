// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Manhattan wall-loop reconstruction
//!
//! Every column's ceiling boundary pixel is projected onto the floor canvas
//! at height z0. Corner peaks split the columns into wall groups; each group
//! votes for an axis-aligned wall line, and the loop is then repaired so
//! that consecutive walls alternate between the two axes.

use crate::error::{LayoutError, Result};
use layout_lite_geometry::{is_simple_polygon, Equirect, FloorCanvas, Point2};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Minimum fraction of a group a vote window must cover
const MIN_WINDOW_FRACTION: f64 = 0.4;

/// Score penalty applied when a wall is postponed
const POSTPONE_PENALTY: f64 = 100.0;

/// Axis a wall line is perpendicular to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallAxis {
    /// Wall lies on `x = value`
    X,
    /// Wall lies on `y = value`
    Y,
}

impl WallAxis {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            WallAxis::X => 0,
            WallAxis::Y => 1,
        }
    }

    #[inline]
    pub fn other(self) -> Self {
        match self {
            WallAxis::X => WallAxis::Y,
            WallAxis::Y => WallAxis::X,
        }
    }

    #[inline]
    fn coordinate(self, point: &Point2<f64>) -> f64 {
        match self {
            WallAxis::X => point.x,
            WallAxis::Y => point.y,
        }
    }
}

/// An axis-aligned wall line on the floor canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallLine {
    pub axis: WallAxis,
    pub value: f64,
}

impl WallLine {
    pub fn new(axis: WallAxis, value: f64) -> Self {
        Self { axis, value }
    }
}

/// Result of a robust 1-D vote over a group's coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vote {
    /// Fitted coordinate
    pub fit: f64,
    /// Fraction of samples inside the winning window, 0 when none qualified
    pub score: f64,
    /// Mean absolute deviation of all samples from the fit
    pub l1: f64,
}

impl Vote {
    /// `(score, -l1)` ordering used to pick a wall's axis
    fn beats(&self, other: &Vote) -> bool {
        match self.score.partial_cmp(&other.score) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => -self.l1 > -other.l1,
            _ => false,
        }
    }
}

/// Vote for the coordinate most samples agree on
///
/// The winning window is the longest run of sorted samples whose span stays
/// within `tol` and that covers at least 40 % of them; the earliest window
/// wins ties. Without such a window, or with fewer samples than `tol`, the
/// median is used and the score is zero.
pub fn vote(values: &[f64], tol: f64) -> Vote {
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n == 0 {
        return Vote {
            fit: f64::NAN,
            score: 0.0,
            l1: f64::NAN,
        };
    }

    let mut best: Option<(usize, usize)> = None;
    let mut end = 0;
    for start in 0..n {
        end = end.max(start);
        while end + 1 < n && sorted[end + 1] - sorted[start] + 1e-9 <= tol {
            end += 1;
        }
        let len = end - start + 1;
        let qualifies = len as f64 >= MIN_WINDOW_FRACTION * n as f64;
        if qualifies && best.map_or(true, |(s, e)| len > e - s + 1) {
            best = Some((start, end));
        }
    }

    let (fit, score) = match best {
        Some((s, e)) if (n as f64) >= tol => {
            let window = &sorted[s..=e];
            let mean = window.iter().sum::<f64>() / window.len() as f64;
            (mean, window.len() as f64 / n as f64)
        }
        _ => (median(&sorted), 0.0),
    };

    let l1 = sorted.iter().map(|v| (v - fit).abs()).sum::<f64>() / n as f64;
    Vote { fit, score, l1 }
}

fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Group id per column for ascending peak columns
///
/// Group `j` (for `j ≥ 1`) covers `[peak_{j−1}, peak_j)`; group 0 covers the
/// remainder, wrapping across the seam.
pub fn wall_groups(peaks: &[usize], width: usize) -> Vec<usize> {
    let mut groups = vec![0usize; width];
    let mut next = 0;
    let mut current = 0;
    for (column, group) in groups.iter_mut().enumerate() {
        while next < peaks.len() && peaks[next] <= column {
            next += 1;
            current = next;
        }
        *group = if current == peaks.len() { 0 } else { current };
    }
    groups
}

/// Ordered loop of axis-aligned walls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallLoop {
    pub walls: Vec<WallLine>,
}

impl WallLoop {
    /// Footprint polygon; vertex `i` joins wall `i − 1` and wall `i`
    pub fn footprint(&self) -> Vec<Point2<f64>> {
        let n = self.walls.len();
        (0..n)
            .map(|i| {
                let current = self.walls[i];
                let previous = self.walls[(i + n - 1) % n];
                let mut xy = [0.0; 2];
                xy[current.axis.index()] = current.value;
                xy[previous.axis.index()] = previous.value;
                Point2::new(xy[0], xy[1])
            })
            .collect()
    }

    /// Whether the footprint is a simple polygon
    pub fn is_valid(&self) -> bool {
        is_simple_polygon(&self.footprint())
    }

    /// Corner `j` joins wall `j` and wall `j + 1`
    pub fn corners(&self) -> Vec<Point2<f64>> {
        let n = self.walls.len();
        (0..n)
            .map(|j| {
                let wall = self.walls[j];
                let next = self.walls[(j + 1) % n];
                match wall.axis {
                    WallAxis::Y => Point2::new(next.value, wall.value),
                    WallAxis::X => Point2::new(wall.value, next.value),
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }
}

/// Wall under construction
#[derive(Debug, Clone, Copy)]
struct Candidate {
    line: WallLine,
    score: f64,
    /// Column group the wall was voted from; `None` for inferred walls
    group: Option<usize>,
    /// Longitude of the ray where the wall starts
    u0: f64,
    /// Longitude of the ray where the wall ends
    u1: f64,
    pending: bool,
}

impl Candidate {
    fn inferred(axis: WallAxis, value: f64, u: f64) -> Self {
        Self {
            line: WallLine::new(axis, value),
            score: 0.0,
            group: None,
            u0: u,
            u1: u,
            pending: false,
        }
    }
}

/// Fits wall loops to the projected ceiling boundary
#[derive(Debug, Clone)]
pub struct WallFitter {
    pano: Equirect,
    canvas: FloorCanvas,
    points: Vec<Point2<f64>>,
    tolerance: f64,
}

impl WallFitter {
    /// Project each column's ceiling row onto the plane at height `z0`
    pub fn new(pano: Equirect, canvas: FloorCanvas, ceiling_rows: &[f64], z0: f64, tolerance: f64) -> Self {
        let points = ceiling_rows
            .iter()
            .enumerate()
            .map(|(column, &row)| canvas.project_pixel(&pano, column as f64, row, z0))
            .collect();
        Self::from_points(pano, canvas, points, tolerance)
    }

    /// Use already projected boundary points, one per column
    pub fn from_points(pano: Equirect, canvas: FloorCanvas, points: Vec<Point2<f64>>, tolerance: f64) -> Self {
        Self {
            pano,
            canvas,
            points,
            tolerance,
        }
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    fn group_coordinates(&self, groups: &[usize], group: usize, axis: WallAxis) -> Vec<f64> {
        self.points
            .iter()
            .zip(groups)
            .filter(|(_, &g)| g == group)
            .map(|(p, _)| axis.coordinate(p))
            .collect()
    }

    fn votes(&self, peaks: &[usize], groups: &[usize]) -> Vec<(Vote, Vote)> {
        (0..peaks.len())
            .map(|j| {
                let xs = self.group_coordinates(groups, j, WallAxis::X);
                let ys = self.group_coordinates(groups, j, WallAxis::Y);
                (vote(&xs, self.tolerance), vote(&ys, self.tolerance))
            })
            .collect()
    }

    fn check_peaks(&self, peaks: &[usize], required: usize) -> Result<()> {
        if peaks.len() < required {
            return Err(LayoutError::InsufficientPeaks {
                found: peaks.len(),
                required,
            });
        }
        if let Some(&bad) = peaks.iter().find(|&&c| c >= self.points.len()) {
            return Err(LayoutError::InvalidLayout(format!(
                "peak column {} outside {} columns",
                bad,
                self.points.len()
            )));
        }
        Ok(())
    }

    /// Fit a general Manhattan loop, one wall per peak gap plus any walls
    /// needed to make consecutive axes alternate
    pub fn general(&self, peaks: &[usize]) -> Result<WallLoop> {
        self.check_peaks(peaks, 3)?;
        let groups = wall_groups(peaks, self.points.len());
        let n = peaks.len();

        let candidates = self
            .votes(peaks, &groups)
            .into_iter()
            .enumerate()
            .map(|(j, (vx, vy))| {
                let (axis, vote) = if vx.beats(&vy) {
                    (WallAxis::X, vx)
                } else {
                    (WallAxis::Y, vy)
                };
                Candidate {
                    line: WallLine::new(axis, vote.fit),
                    score: vote.score,
                    group: Some(j),
                    u0: self.pano.column_to_u(peaks[(j + n - 1) % n] as f64),
                    u1: self.pano.column_to_u(peaks[j] as f64),
                    pending: true,
                }
            })
            .collect();

        let walls = self.resolve_alternation(candidates, &groups);
        Ok(WallLoop {
            walls: walls.into_iter().map(|c| c.line).collect(),
        })
    }

    /// Fit a four-wall loop with forced X/Y alternation
    pub fn cuboid(&self, peaks: &[usize]) -> Result<WallLoop> {
        self.check_peaks(peaks, 4)?;
        if peaks.len() != 4 {
            return Err(LayoutError::InvalidLayout(format!(
                "cuboid needs exactly 4 peaks, got {}",
                peaks.len()
            )));
        }
        let groups = wall_groups(peaks, self.points.len());
        let votes = self.votes(peaks, &groups);

        // Positive parity score favours X walls at even positions
        let mut parity = [0.0; 2];
        for (j, (vx, vy)) in votes.iter().enumerate() {
            if vx.beats(vy) {
                parity[j % 2] += vx.score;
            } else {
                parity[j % 2] -= vy.score;
            }
        }
        // Ties put Y walls at even positions
        let even_axis = if parity[0] > parity[1] {
            WallAxis::X
        } else {
            WallAxis::Y
        };

        let walls = votes
            .iter()
            .enumerate()
            .map(|(j, (vx, vy))| {
                let axis = if j % 2 == 0 { even_axis } else { even_axis.other() };
                let vote = match axis {
                    WallAxis::X => vx,
                    WallAxis::Y => vy,
                };
                WallLine::new(axis, vote.fit)
            })
            .collect();

        Ok(WallLoop { walls })
    }

    /// Point on `wall` hit by the ray of longitude `u`, as the coordinate a
    /// perpendicular wall through it would take
    fn perpendicular_through(&self, wall: &WallLine, u: f64) -> WallLine {
        match wall.axis {
            WallAxis::X => WallLine::new(WallAxis::Y, self.canvas.y_on_x_wall(wall.value, u)),
            WallAxis::Y => WallLine::new(WallAxis::X, self.canvas.x_on_y_wall(wall.value, u)),
        }
    }

    /// Resolve walls from the highest score down until every wall is fixed
    fn resolve_alternation(&self, mut walls: Vec<Candidate>, groups: &[usize]) -> Vec<Candidate> {
        loop {
            let mut tbd: Option<usize> = None;
            for (i, wall) in walls.iter().enumerate() {
                if wall.pending && tbd.map_or(true, |t| wall.score > walls[t].score) {
                    tbd = Some(i);
                }
            }
            let Some(tbd) = tbd else {
                break;
            };

            walls[tbd].pending = false;
            let len = walls.len();
            let prev = (tbd + len - 1) % len;
            let next = (tbd + 1) % len;
            let pending_neighbours = walls[prev].pending as usize + walls[next].pending as usize;

            if pending_neighbours == 2 {
                continue;
            }

            let axis = walls[tbd].line.axis;
            if pending_neighbours == 1 {
                let conflicts = (!walls[prev].pending && walls[prev].line.axis == axis)
                    || (!walls[next].pending && walls[next].line.axis == axis);
                if !conflicts {
                    continue;
                }
                if walls[tbd].score >= -1.0 {
                    walls[tbd].pending = true;
                    walls[tbd].score -= POSTPONE_PENALTY;
                } else {
                    let (insert_at, anchor, u) = if !walls[prev].pending {
                        (tbd, walls[prev], walls[prev].u1)
                    } else {
                        (next, walls[next], walls[next].u0)
                    };
                    let line = self.perpendicular_through(&anchor.line, u);
                    walls.insert(insert_at, Candidate::inferred(line.axis, line.value, u));
                }
                continue;
            }

            let (p, q) = (walls[prev], walls[next]);
            if p.line.axis == q.line.axis {
                if axis == p.line.axis {
                    // Three walls on one axis: turn the middle one
                    let flipped = axis.other();
                    walls[tbd].line.axis = flipped;
                    if let Some(group) = walls[tbd].group {
                        let coords = self.group_coordinates(groups, group, flipped);
                        if !coords.is_empty() {
                            walls[tbd].line.value =
                                coords.iter().sum::<f64>() / coords.len() as f64;
                        }
                    }
                }
            } else {
                // Neighbours on different axes need two walls between them
                let first = self.perpendicular_through(&p.line, p.u1);
                let second = self.perpendicular_through(&q.line, q.u0);
                walls.splice(
                    tbd..=tbd,
                    [
                        Candidate::inferred(first.axis, first.value, p.u1),
                        Candidate::inferred(second.axis, second.value, q.u0),
                    ],
                );
            }
        }
        walls
    }

    /// Image `(column, row)` of each corner on the z0 plane, rotated so the
    /// smallest column comes first
    pub fn corner_pixels(&self, walls: &WallLoop, z0: f64) -> Vec<(f64, f64)> {
        let mut pixels: Vec<(f64, f64)> = walls
            .corners()
            .iter()
            .map(|p| self.canvas.unproject_point(&self.pano, p, z0))
            .collect();

        let mut first = 0;
        for (i, &(column, _)) in pixels.iter().enumerate() {
            if column < pixels[first].0 {
                first = i;
            }
        }
        pixels.rotate_left(first);
        pixels
    }
}
