// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP route handlers.

pub mod cache;
pub mod health;
pub mod invoke;
pub mod layout;
pub mod mesh;
pub mod predict;

use crate::error::ApiError;
use axum::extract::Multipart;
use bytes::Bytes;
use std::collections::HashMap;

/// Collect the named fields of a multipart request, ignoring all others.
pub(crate) async fn extract_fields(
    multipart: &mut Multipart,
    names: &[&'static str],
    max_bytes: usize,
    max_mb: usize,
) -> Result<HashMap<&'static str, Bytes>, ApiError> {
    let mut fields = HashMap::new();
    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        tracing::debug!(field_name = %field_name, "Processing multipart field");

        if let Some(&name) = names.iter().find(|n| **n == field_name) {
            let bytes = field.bytes().await?;
            if bytes.len() > max_bytes {
                return Err(ApiError::FileTooLarge { max_mb });
            }
            tracing::debug!(field = name, size = bytes.len(), "Extracted multipart field");
            fields.insert(name, bytes);
        }
    }
    Ok(fields)
}
