// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client for the remote layout network.
//!
//! The request body is the little-endian f32 input batch, described by an
//! `X-Tensor-Shape: N,C,H,W` header. The response is JSON
//! `{"y_bon": [N][2][W], "y_cor": [N][1][W]}`.

use crate::config::Config;
use crate::error::ApiError;
use bytes::Bytes;
use layout_lite_core::{RawNetworkBatch, RawNetworkOutput, TensorBatch};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use std::time::Duration;

/// Header carrying the input batch shape.
pub const TENSOR_SHAPE_HEADER: &str = "x-tensor-shape";

/// HTTP client for inference and image downloads.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    url: Option<String>,
    http: reqwest::Client,
}

impl InferenceClient {
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self {
            url: config.inference_url.clone(),
            http,
        }
    }

    /// Whether an inference endpoint is configured.
    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// Run the network on a batch, returning one output per batch entry.
    pub async fn infer(&self, batch: &TensorBatch) -> Result<Vec<RawNetworkOutput>, ApiError> {
        let url = self.url.as_deref().ok_or(ApiError::InferenceUnavailable)?;
        let shape = HeaderValue::from_str(&batch.shape_header())
            .map_err(|e| ApiError::Internal(format!("Invalid shape header: {e}")))?;

        tracing::debug!(url = %url, shape = %batch.shape_header(), "Sending inference request");
        let resp = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(TENSOR_SHAPE_HEADER, shape)
            .body(Bytes::from(batch.to_le_bytes()))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ApiError::Inference(format!(
                "Inference failed with status {}",
                resp.status()
            )));
        }

        let raw: RawNetworkBatch = resp
            .json()
            .await
            .map_err(|e| ApiError::Inference(format!("Inference response parse failed: {e}")))?;
        let outputs = raw.into_outputs()?;
        if outputs.len() != batch.batch {
            return Err(ApiError::Inference(format!(
                "Expected {} outputs, got {}",
                batch.batch,
                outputs.len()
            )));
        }
        Ok(outputs)
    }

    /// Download an image referenced by URL.
    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        tracing::info!(url = %url, "Fetching image");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Cannot fetch image_url: {e}")))?;
        if !resp.status().is_success() {
            return Err(ApiError::BadRequest(format!(
                "Fetching image_url returned status {}",
                resp.status()
            )));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Cannot read image_url body: {e}")))?;
        Ok(bytes.to_vec())
    }
}
