// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: Turn a panorama and its layout into a colored room mesh (OBJ)
//!
//! The layout comes either from a saved prediction record or from raw
//! network output, which is post-processed first.
//!
//! Usage:
//!   pano-to-3d <image_path> (--prediction <json> | --network-output <json>) [options]

use layout_lite_core::{
    build_room_mesh, load_rgb, postprocess, LayoutPrediction, PostProcessConfig,
    RawNetworkOutput, ReconstructionOutcome,
};
use layout_lite_geometry::{write_obj_file, ObjAxes};
use std::env;
use std::fs;
use std::process;

enum LayoutSource {
    Prediction(String),
    NetworkOutput(String),
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let image_path = &args[1];

    // Parse options
    let mut source: Option<LayoutSource> = None;
    let mut output_path = String::from("room.obj");
    let mut save_prediction: Option<String> = None;
    let mut force_cuboid = false;
    let mut y_up = false;
    let mut camera_height: f64 = PostProcessConfig::default().camera_height;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--prediction" => {
                i += 1;
                source = Some(LayoutSource::Prediction(required_value(&args, i, "--prediction")));
            }
            "--network-output" => {
                i += 1;
                source = Some(LayoutSource::NetworkOutput(required_value(
                    &args,
                    i,
                    "--network-output",
                )));
            }
            "--output" => {
                i += 1;
                output_path = required_value(&args, i, "--output");
            }
            "--save-prediction" => {
                i += 1;
                save_prediction = Some(required_value(&args, i, "--save-prediction"));
            }
            "--camera-height" => {
                i += 1;
                camera_height = required_value(&args, i, "--camera-height")
                    .parse()
                    .unwrap_or_else(|_| fail("Invalid camera height value"));
            }
            "--force-cuboid" => {
                force_cuboid = true;
            }
            "--y-up" => {
                y_up = true;
            }
            other => {
                eprintln!("Unknown option: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let Some(source) = source else {
        eprintln!("Error: one of --prediction or --network-output is required");
        print_usage();
        process::exit(1);
    };

    println!("=== Panorama to 3D Room ===");
    println!();

    // Step 1: Load texture
    println!("[1/4] Loading image: {}", image_path);
    let texture = load_rgb(image_path)
        .unwrap_or_else(|e| fail(&format!("Cannot load image '{}': {}", image_path, e)));
    println!("  Image size: {}x{} pixels", texture.width(), texture.height());

    // Step 2: Obtain the layout
    let prediction = match source {
        LayoutSource::Prediction(path) => {
            println!("[2/4] Loading prediction: {}", path);
            let text = read_text(&path);
            LayoutPrediction::from_json(&text)
                .unwrap_or_else(|e| fail(&format!("Invalid prediction '{}': {}", path, e)))
        }
        LayoutSource::NetworkOutput(path) => {
            println!("[2/4] Post-processing network output: {}", path);
            let text = read_text(&path);
            let raw: RawNetworkOutput = serde_json::from_str(&text)
                .unwrap_or_else(|e| fail(&format!("Invalid network output '{}': {}", path, e)));
            let config = PostProcessConfig {
                force_cuboid,
                camera_height,
                ..PostProcessConfig::default()
            };
            let layout = postprocess(&raw, &config)
                .unwrap_or_else(|e| fail(&format!("Layout reconstruction failed: {}", e)));

            println!("  Corner peaks: {}", layout.peaks.len());
            match layout.outcome {
                ReconstructionOutcome::General => println!("  Path: general wall loop"),
                ReconstructionOutcome::CuboidFallback { reason } => {
                    println!("  Path: cuboid fallback ({:?})", reason)
                }
                ReconstructionOutcome::ForcedCuboid => println!("  Path: forced cuboid"),
            }
            println!("  Walls: {}", layout.walls.len());
            layout.prediction
        }
    };
    println!(
        "  Layout: {} corners, z0={:.2} z1={:.2}",
        prediction.corner_count(),
        prediction.z0,
        prediction.z1
    );

    if let Some(path) = &save_prediction {
        let json = prediction
            .to_json()
            .unwrap_or_else(|e| fail(&format!("Cannot serialize prediction: {}", e)));
        fs::write(path, json)
            .unwrap_or_else(|e| fail(&format!("Cannot write prediction '{}': {}", path, e)));
        println!("  Saved prediction: {}", path);
    }

    // Step 3: Depth and mesh
    println!("[3/4] Building room mesh (camera height {:.2}m)...", camera_height);
    let mesh = build_room_mesh(&texture, &prediction, camera_height)
        .unwrap_or_else(|e| fail(&format!("Mesh generation failed: {}", e)));

    // Step 4: Export
    println!("[4/4] Writing OBJ file: {}", output_path);
    let axes = if y_up { ObjAxes::YUp } else { ObjAxes::ZUp };
    write_obj_file(&mesh, axes, &output_path)
        .unwrap_or_else(|e| fail(&format!("Cannot write output file '{}': {}", output_path, e)));

    // Print summary
    let (min, max) = mesh.bounds();
    println!();
    println!("=== Room Summary ===");
    println!("  Extent: {:.2}m x {:.2}m x {:.2}m", max.x - min.x, max.y - min.y, max.z - min.z);
    println!(
        "  Mesh: {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    println!();
    println!("Done! Open {} in a 3D viewer.", output_path);
}

fn required_value(args: &[String], i: usize, flag: &str) -> String {
    args.get(i)
        .cloned()
        .unwrap_or_else(|| fail(&format!("{} expects a value", flag)))
}

fn read_text(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| fail(&format!("Cannot read '{}': {}", path, e)))
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn print_usage() {
    println!("pano-to-3d: Build a colored 3D room mesh from a 360° panorama");
    println!();
    println!("Usage:");
    println!("  pano-to-3d <image_path> --prediction <json> [options]");
    println!("  pano-to-3d <image_path> --network-output <json> [options]");
    println!();
    println!("Layout source (one required):");
    println!("  --prediction <path>       Prediction record {{\"z0\", \"z1\", \"uv\"}}");
    println!("  --network-output <path>   Raw network output {{\"y_bon\", \"y_cor\"}}");
    println!();
    println!("Options:");
    println!("  --output <path>           Output OBJ file (default: room.obj)");
    println!("  --save-prediction <path>  Also write the prediction record");
    println!("  --camera-height <m>       Camera height above the floor (default: 1.6)");
    println!("  --force-cuboid            Fit a four-wall room directly");
    println!("  --y-up                    Write Y-up coordinates instead of Z-up");
    println!("  --help, -h                Show this help");
}
