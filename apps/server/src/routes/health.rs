// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Health check endpoint.

use crate::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: &'static str,
    /// Whether prediction routes can reach a network.
    pub inference: bool,
}

/// API information response.
#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub endpoints: Vec<EndpointInfo>,
}

/// Endpoint information.
#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

/// GET /api/v1/health - Health check endpoint.
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: "layout-lite-server",
        inference: state.inference.is_configured(),
    })
}

/// GET / - API information endpoint.
pub async fn info() -> Json<ApiInfoResponse> {
    let endpoint = |method, path, description| EndpointInfo {
        method,
        path,
        description,
    };
    Json(ApiInfoResponse {
        service: "layout-lite-server",
        version: env!("CARGO_PKG_VERSION"),
        description: "Room layout prediction and meshing for 360° panoramas",
        endpoints: vec![
            endpoint("GET", "/api/v1/health", "Health check endpoint"),
            endpoint("POST", "/api/v1/layout", "Post-process raw network output"),
            endpoint("POST", "/api/v1/predict", "Predict the layout of an uploaded panorama"),
            endpoint("POST", "/api/v1/mesh", "Build an OBJ room mesh from a texture and prediction"),
            endpoint("POST", "/api/v1/invoke", "Lambda-style prediction event"),
            endpoint("GET", "/api/v1/cache/:key", "Retrieve cached prediction"),
        ],
    })
}
