// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Layout-Lite Server - room layout prediction for 360° panoramas.
//!
//! This server wraps the layout post-processing pipeline in a REST API.
//! The layout network itself runs elsewhere and is reached over HTTP
//! (`INFERENCE_URL`). It supports:
//!
//! - Post-processing raw network output into a prediction record
//! - Full prediction from an uploaded panorama, with caching
//! - OBJ room mesh export from a texture and a prediction
//!
//! # Endpoints
//!
//! - `GET /api/v1/health` - Health check
//! - `POST /api/v1/layout` - Raw network output to prediction (JSON)
//! - `POST /api/v1/predict` - Panorama upload to prediction (multipart)
//! - `POST /api/v1/mesh` - Texture + prediction to OBJ (multipart)
//! - `POST /api/v1/invoke` - Lambda-style prediction event
//! - `GET /api/v1/cache/:key` - Retrieve cached prediction

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod config;
mod error;
mod routes;
mod services;
mod types;

use config::Config;
use services::{DiskCache, InferenceClient};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<DiskCache>,
    pub config: Arc<Config>,
    pub inference: Arc<InferenceClient>,
}

impl AppState {
    pub async fn new(config: Config) -> Self {
        let cache = Arc::new(DiskCache::new(&config.cache_dir).await);
        let inference = Arc::new(InferenceClient::new(&config));
        Self {
            cache,
            config: Arc::new(config),
            inference,
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    CorsLayer::permissive().allow_origin(AllowOrigin::list(origins))
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();
    Router::new()
        // Root endpoint - API information
        .route("/", get(routes::health::info))
        // Health check
        .route("/api/v1/health", get(routes::health::check))
        // Layout endpoints
        .route("/api/v1/layout", post(routes::layout::post_layout))
        .route("/api/v1/predict", post(routes::predict::predict))
        .route("/api/v1/mesh", post(routes::mesh::export_mesh))
        .route("/api/v1/invoke", post(routes::invoke::invoke))
        // Cache endpoints
        .route("/api/v1/cache/:key", get(routes::cache::get_cached))
        // Middleware
        .layer(DefaultBodyLimit::max(config.max_file_size_bytes()))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config))
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,tower_http=debug,layout_lite_server=debug".into()),
        )
        .pretty()
        .init();

    let config = Config::from_env();

    tracing::info!(
        port = config.port,
        cache_dir = %config.cache_dir,
        max_file_size_mb = config.max_file_size_mb,
        inference_url = config.inference_url.as_deref().unwrap_or("<none>"),
        tta_flip = config.tta_flip,
        tta_rotate = ?config.tta_rotate,
        "Starting Layout-Lite Server"
    );
    if config.inference_url.is_none() {
        tracing::warn!("INFERENCE_URL is not set; /predict and /invoke will return 503");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = build_router(AppState::new(config).await);

    tracing::info!("Listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::f64::consts::PI;
    use tower::ServiceExt;

    async fn test_state(name: &str) -> AppState {
        let dir = std::env::temp_dir().join(format!("layout-lite-{}-{}", name, std::process::id()));
        let mut config = Config::from_lookup(|_| None);
        config.cache_dir = dir.to_string_lossy().into_owned();
        AppState::new(config).await
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// Network output of a square room seen from its centre
    fn square_room_output() -> Value {
        let w = 1024usize;
        let mut ceiling = Vec::with_capacity(w);
        let mut floor = Vec::with_capacity(w);
        let mut corner = vec![-9.0f32; w];
        for col in 0..w {
            let u = ((col as f64 + 0.5) / w as f64 - 0.5) * 2.0 * PI;
            let t = 100.0 / u.sin().abs().max(u.cos().abs());
            // Latitudes grow downward
            ceiling.push(-(50.0 / t).atan() as f32);
            floor.push((80.0 / t).atan() as f32);
        }
        for col in [128, 384, 640, 896] {
            corner[col] = 2.2;
        }
        json!({"y_bon": [ceiling, floor], "y_cor": corner})
    }

    /// Four alternating walls, 100 units from the canvas centre
    fn assert_square_walls(walls: &Value) {
        let walls = walls.as_array().unwrap();
        assert_eq!(walls.len(), 4);
        for (i, wall) in walls.iter().enumerate() {
            assert_ne!(wall["axis"], walls[(i + 1) % 4]["axis"]);
            let value = wall["value"].as_f64().unwrap();
            assert!(
                [155.5, 355.5, 411.5, 611.5].iter().any(|e| (value - e).abs() < 2.0),
                "wall {} at {}",
                i,
                value
            );
        }
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state("health").await);
        let (status, body) = send(app, Request::get("/api/v1/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["inference"], false);
    }

    #[tokio::test]
    async fn test_layout_from_raw_output() {
        let app = build_router(test_state("layout").await);
        let (status, body) = send(app, post_json("/api/v1/layout", square_room_output())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"]["path"], "general");
        assert_eq!(body["corners"].as_array().unwrap().len(), 4);
        assert_eq!(body["prediction"]["uv"].as_array().unwrap().len(), 8);
        assert!((body["prediction"]["z1"].as_f64().unwrap() + 80.0).abs() < 2.0);
        assert_square_walls(&body["walls"]);
    }

    #[tokio::test]
    async fn test_layout_forced_cuboid() {
        let app = build_router(test_state("cuboid").await);
        let mut request = square_room_output();
        request["config"] = json!({"force_cuboid": true});
        let (status, body) = send(app, post_json("/api/v1/layout", request)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"]["path"], "forced_cuboid");
        assert_eq!(body["corners"].as_array().unwrap().len(), 4);
        assert_square_walls(&body["walls"]);
    }

    #[tokio::test]
    async fn test_layout_shape_mismatch() {
        let app = build_router(test_state("mismatch").await);
        let request = json!({"y_bon": [[0.1, 0.2], [-0.1, -0.2]], "y_cor": [0.0, 0.0, 0.0]});
        let (status, body) = send(app, post_json("/api/v1/layout", request)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_invoke_without_image() {
        let app = build_router(test_state("invoke").await);
        let (status, body) = send(app, post_json("/api/v1/invoke", json!({"body": "{}"}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"statusCode": 400, "message": "neither image_url nor image found in event"})
        );
    }

    #[tokio::test]
    async fn test_invoke_without_inference_backend() {
        let app = build_router(test_state("backend").await);
        let (status, body) = send(app, post_json("/api/v1/invoke", json!({"image": "aGVsbG8="}))).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "INFERENCE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_unknown_cache_key() {
        let app = build_router(test_state("cachemiss").await);
        let (status, body) = send(app, Request::get("/api/v1/cache/deadbeef").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
