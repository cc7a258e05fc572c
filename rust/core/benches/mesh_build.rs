// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Benchmark of the post-processing and mesh stages on a synthetic room.
//!
//! Run with: cargo bench -p layout-lite-core --bench mesh_build

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{Rgb, RgbImage};
use layout_lite_core::{
    build_room_mesh, layout_depth, reconstruct_layout, LayoutPrediction, LayoutSignals,
    PostProcessConfig,
};
use layout_lite_geometry::Equirect;
use std::f64::consts::FRAC_PI_4;

const CAMERA_HEIGHT: f64 = 1.6;

/// Rectangular room `half_x × half_y` around the camera, ceiling 1.2 above it
fn room_prediction(pano: &Equirect, half_x: f64, half_y: f64) -> LayoutPrediction {
    let corners = [(-half_x, -half_y), (half_x, -half_y), (half_x, half_y), (-half_x, half_y)];
    let mut uv = Vec::new();
    for (x, y) in corners {
        let d = f64::hypot(x, y);
        let u = f64::atan2(x, -y);
        let col = pano.u_to_column(u) / pano.width as f64;
        uv.push([col, pano.v_to_row((1.2 / d).atan()) / pano.height as f64]);
        uv.push([col, pano.v_to_row(-(CAMERA_HEIGHT / d).atan()) / pano.height as f64]);
    }
    LayoutPrediction {
        z0: 50.0,
        z1: -80.0,
        uv,
    }
}

/// Signals of a square room seen from its centre
fn square_signals(width: usize, height: usize) -> LayoutSignals {
    let pano = Equirect::new(width, height);
    let mut ceiling = Vec::with_capacity(width);
    let mut floor = Vec::with_capacity(width);
    let mut corner = vec![0.0; width];
    for col in 0..width {
        let u = pano.column_to_u(col as f64);
        // Distance to the square's boundary along this column
        let t = 1.0 / u.sin().abs().max(u.cos().abs());
        ceiling.push(pano.v_to_row((50.0 / (100.0 * t)).atan()));
        floor.push(pano.v_to_row((-80.0 / (100.0 * t)).atan()));
    }
    for k in [-3.0, -1.0, 1.0, 3.0] {
        let col = pano.u_to_column(k * FRAC_PI_4).round() as usize % width;
        corner[col] = 0.9;
    }
    LayoutSignals::new(ceiling, floor, corner, height).expect("valid signals")
}

fn bench_reconstruct(c: &mut Criterion) {
    let signals = square_signals(1024, 512);
    let config = PostProcessConfig::default();
    c.bench_function("reconstruct_layout_1024", |b| {
        b.iter(|| reconstruct_layout(black_box(&signals), black_box(&config)))
    });
}

fn bench_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("room_mesh");
    group.sample_size(10);

    for (w, h) in [(256usize, 128usize), (512, 256), (1024, 512)] {
        let pano = Equirect::new(w, h);
        let prediction = room_prediction(&pano, 2.5, 1.8);
        let texture = RgbImage::from_pixel(w as u32, h as u32, Rgb([180, 170, 160]));

        group.bench_with_input(BenchmarkId::new("depth", w), &prediction, |b, p| {
            b.iter(|| layout_depth(black_box(p), w, h, CAMERA_HEIGHT))
        });
        group.bench_with_input(BenchmarkId::new("mesh", w), &prediction, |b, p| {
            b.iter(|| build_room_mesh(black_box(&texture), black_box(p), CAMERA_HEIGHT))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reconstruct, bench_mesh);
criterion_main!(benches);
