// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Disk-based cache of prediction results using cacache.

use crate::error::ApiError;
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Content-addressable disk cache.
#[derive(Debug, Clone)]
pub struct DiskCache {
    cache_dir: PathBuf,
}

impl DiskCache {
    /// Create a new cache in the specified directory.
    pub async fn new(cache_dir: &str) -> Self {
        let path = PathBuf::from(cache_dir);

        if let Err(e) = tokio::fs::create_dir_all(&path).await {
            tracing::warn!(
                error = %e,
                path = %path.display(),
                "Failed to create cache directory"
            );
        }

        Self { cache_dir: path }
    }

    /// Cache key from the upload and everything else that changes the result.
    ///
    /// Parts are length-prefixed so that moving bytes between them changes the key.
    pub fn generate_key(parts: &[&[u8]]) -> String {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        hex::encode(hasher.finalize())
    }

    /// Get a cached value by key.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ApiError> {
        match cacache::read(&self.cache_dir, key).await {
            Ok(data) => {
                let value: T = serde_json::from_slice(&data)?;
                Ok(Some(value))
            }
            Err(cacache::Error::EntryNotFound(_, _)) => Ok(None),
            Err(e) => Err(ApiError::Cache(e.to_string())),
        }
    }

    /// Set a cached value.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ApiError> {
        let data = serde_json::to_vec(value)?;
        cacache::write(&self.cache_dir, key, &data).await?;
        tracing::debug!(key = %key, size = data.len(), "Cached result");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_depends_on_part_boundaries() {
        let a = DiskCache::generate_key(&[b"ab", b"c"]);
        let b = DiskCache::generate_key(&[b"a", b"bc"]);
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert_eq!(a, DiskCache::generate_key(&[b"ab", b"c"]));
    }

    #[tokio::test]
    async fn test_round_trip_and_miss() {
        let dir = std::env::temp_dir().join(format!("layout-lite-cache-{}", std::process::id()));
        let cache = DiskCache::new(dir.to_str().unwrap()).await;

        assert!(cache.get::<Vec<u32>>("missing").await.unwrap().is_none());
        cache.set("numbers", &vec![1u32, 2, 3]).await.unwrap();
        assert_eq!(cache.get::<Vec<u32>>("numbers").await.unwrap(), Some(vec![1, 2, 3]));

        let _ = std::fs::remove_dir_all(dir);
    }
}
