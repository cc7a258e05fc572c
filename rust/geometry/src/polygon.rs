// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D polygon predicates for layout footprints
//!
//! Footprints are small (a handful of vertices), so every check here is a
//! direct O(n²) scan over edge pairs.

use nalgebra::{Point2, Vector2};

/// Epsilon for floating point comparisons in 2D operations
const EPSILON_2D: f64 = 1e-9;

/// Minimum area threshold - polygons smaller than this are considered degenerate
const MIN_AREA_THRESHOLD: f64 = 1e-10;

/// Compute the signed area of a 2D contour
/// Positive = counter-clockwise, Negative = clockwise
pub fn signed_area(contour: &[Point2<f64>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    let n = contour.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i].x * contour[j].y;
        area -= contour[j].x * contour[i].y;
    }

    area * 0.5
}

#[inline]
fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Orientation of `c` relative to the directed line `a -> b`:
/// 1 = left, -1 = right, 0 = collinear
fn orientation(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> i8 {
    let value = cross(&(b - a), &(c - a));
    let scale = (b - a).norm().max((c - a).norm()).max(1.0);
    if value.abs() <= EPSILON_2D * scale * scale {
        0
    } else if value > 0.0 {
        1
    } else {
        -1
    }
}

/// `c` lies within the bounding box of segment `a b` (used for collinear cases)
fn within_segment_box(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> bool {
    c.x <= a.x.max(b.x) + EPSILON_2D
        && c.x + EPSILON_2D >= a.x.min(b.x)
        && c.y <= a.y.max(b.y) + EPSILON_2D
        && c.y + EPSILON_2D >= a.y.min(b.y)
}

/// Closed-segment intersection test, touching endpoints included
pub fn segments_intersect(
    p1: &Point2<f64>,
    p2: &Point2<f64>,
    q1: &Point2<f64>,
    q2: &Point2<f64>,
) -> bool {
    let o1 = orientation(p1, p2, q1);
    let o2 = orientation(p1, p2, q2);
    let o3 = orientation(q1, q2, p1);
    let o4 = orientation(q1, q2, p2);

    if o1 != o2 && o3 != o4 && o1 != 0 && o2 != 0 && o3 != 0 && o4 != 0 {
        return true;
    }

    (o1 == 0 && within_segment_box(p1, p2, q1))
        || (o2 == 0 && within_segment_box(p1, p2, q2))
        || (o3 == 0 && within_segment_box(q1, q2, p1))
        || (o4 == 0 && within_segment_box(q1, q2, p2))
}

/// Drop consecutive duplicate vertices (including the closing pair)
fn dedup_ring(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut ring: Vec<Point2<f64>> = Vec::with_capacity(contour.len());
    for p in contour {
        if ring
            .last()
            .map_or(true, |last: &Point2<f64>| (p - last).norm() > EPSILON_2D)
        {
            ring.push(*p);
        }
    }
    while ring.len() > 1 && (ring[0] - ring[ring.len() - 1]).norm() <= EPSILON_2D {
        ring.pop();
    }
    ring
}

/// Check that a closed ring is a valid simple polygon
///
/// Repeated consecutive vertices are tolerated. The ring must keep at least
/// three distinct vertices, enclose a non-zero area, and no two edges may
/// meet except adjacent edges at their shared vertex. An adjacent pair that
/// folds back onto itself (a spike) is rejected.
pub fn is_simple_polygon(contour: &[Point2<f64>]) -> bool {
    if contour.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return false;
    }

    let ring = dedup_ring(contour);
    let n = ring.len();
    if n < 3 || signed_area(&ring).abs() <= MIN_AREA_THRESHOLD {
        return false;
    }

    for i in 0..n {
        let a1 = ring[i];
        let a2 = ring[(i + 1) % n];
        for j in (i + 1)..n {
            let b1 = ring[j];
            let b2 = ring[(j + 1) % n];

            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            if adjacent {
                // Shared vertex is fine; a spike folds one edge back over the other
                let (shared, other_a, other_b) = if j == i + 1 {
                    (a2, a1, b2)
                } else {
                    (a1, a2, b1)
                };
                let da = other_a - shared;
                let db = other_b - shared;
                if orientation(&shared, &other_a, &other_b) == 0 && da.dot(&db) > 0.0 {
                    return false;
                }
                continue;
            }

            if segments_intersect(&a1, &a2, &b1, &b2) {
                return false;
            }
        }
    }

    true
}

/// Distance along a ray from `origin` in direction `dir` to segment `a b`
///
/// Returns `None` when the ray misses the segment or hits it behind the
/// origin.
pub fn ray_segment_distance(
    origin: &Point2<f64>,
    dir: &Vector2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
) -> Option<f64> {
    let edge = b - a;
    let denom = cross(dir, &edge);
    if denom.abs() <= EPSILON_2D {
        return None;
    }

    let to_a = a - origin;
    let t = cross(&to_a, &edge) / denom;
    let s = cross(&to_a, dir) / denom;

    if t > EPSILON_2D && (-EPSILON_2D..=1.0 + EPSILON_2D).contains(&s) {
        Some(t)
    } else {
        None
    }
}

/// Nearest positive hit of a ray against the edges of a closed ring
pub fn ray_ring_distance(origin: &Point2<f64>, dir: &Vector2<f64>, ring: &[Point2<f64>]) -> Option<f64> {
    let n = ring.len();
    (0..n)
        .filter_map(|i| ray_segment_distance(origin, dir, &ring[i], &ring[(i + 1) % n]))
        .min_by(|a, b| a.total_cmp(b))
}
