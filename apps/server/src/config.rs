// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server configuration loaded from environment variables.

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on.
    pub port: u16,
    /// Directory for cache storage.
    pub cache_dir: String,
    /// Maximum upload size in MB.
    pub max_file_size_mb: usize,
    /// Request timeout in seconds (also bounds the inference call).
    pub request_timeout_secs: u64,
    /// Remote layout network endpoint. Prediction routes fail without it.
    pub inference_url: Option<String>,
    /// Add a horizontally flipped copy to each inference batch.
    pub tta_flip: bool,
    /// Extra rolled copies, as fractions of the panorama width.
    pub tta_rotate: Vec<f64>,
    /// Allowed CORS origins (comma-separated, or "*" for all).
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: get("PORT")
                .unwrap_or_else(|| "8080".into())
                .parse()
                .unwrap_or(8080),
            cache_dir: get("CACHE_DIR").unwrap_or_else(|| {
                // Docker images ship /app/cache; local runs use ./.cache
                if std::path::Path::new("/.dockerenv").exists() {
                    "/app/cache".into()
                } else {
                    std::env::current_dir()
                        .ok()
                        .and_then(|dir| dir.join(".cache").to_str().map(|s| s.to_string()))
                        .unwrap_or_else(|| "./.cache".into())
                }
            }),
            max_file_size_mb: get("MAX_FILE_SIZE_MB")
                .unwrap_or_else(|| "50".into())
                .parse()
                .unwrap_or(50),
            request_timeout_secs: get("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|| "120".into())
                .parse()
                .unwrap_or(120),
            inference_url: get("INFERENCE_URL")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            tta_flip: get("TTA_FLIP")
                .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            tta_rotate: get("TTA_ROTATE")
                .unwrap_or_default()
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect(),
            cors_origins: get("CORS_ORIGINS")
                .unwrap_or_else(|| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Upload limit in bytes.
    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
