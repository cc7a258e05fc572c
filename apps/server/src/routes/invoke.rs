// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lambda-style prediction events.
//!
//! An event carries either `image_url` or `image` (base64, optionally as a
//! data URL). The event itself, or its `body`, may arrive as a JSON string.
//! Success returns the bare prediction record; an event without an image
//! returns `{"statusCode": 400, "message": ...}`.

use crate::error::ApiError;
use crate::services::predict_layout;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::Value;

pub const MISSING_IMAGE_MESSAGE: &str = "neither image_url nor image found in event";

/// Where the event's image comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Url(String),
    Inline(Vec<u8>),
}

fn from_string(value: Value) -> Result<Value, ApiError> {
    match value {
        Value::String(text) => serde_json::from_str(&text)
            .map_err(|e| ApiError::BadRequest(format!("event is not valid JSON: {e}"))),
        other => Ok(other),
    }
}

/// Decode a base64 image, accepting `data:<mime>;base64,` prefixes.
pub fn decode_image_field(image: &str) -> Result<Vec<u8>, ApiError> {
    let payload = match image.split_once("base64,") {
        Some((_, data)) => data,
        None => image,
    };
    BASE64
        .decode(payload.trim())
        .map_err(|e| ApiError::BadRequest(format!("image is not valid base64: {e}")))
}

/// Find the image source in an event.
pub fn parse_event(event: Value) -> Result<Option<ImageSource>, ApiError> {
    let mut event = from_string(event)?;
    if let Some(body) = event.get_mut("body").map(Value::take) {
        event = from_string(body)?;
    }

    if let Some(url) = event.get("image_url").and_then(Value::as_str) {
        return Ok(Some(ImageSource::Url(url.to_string())));
    }
    match event.get("image").and_then(Value::as_str) {
        Some(image) => Ok(Some(ImageSource::Inline(decode_image_field(image)?))),
        None => Ok(None),
    }
}

/// POST /api/v1/invoke - Lambda-style prediction event.
pub async fn invoke(State(state): State<AppState>, Json(event): Json<Value>) -> Result<Response, ApiError> {
    tracing::info!("Loading image");
    let data = match parse_event(event)? {
        Some(ImageSource::Url(url)) => state.inference.fetch_image(&url).await?,
        Some(ImageSource::Inline(data)) => {
            tracing::info!("Reading image from event");
            data
        }
        None => {
            let body = serde_json::json!({
                "statusCode": 400,
                "message": MISSING_IMAGE_MESSAGE,
            });
            return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
        }
    };

    let (layout, _) = predict_layout(&state, data, false).await?;
    Ok(Json(layout.prediction).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_takes_precedence() {
        let event = json!({"image_url": "https://example.test/pano.jpg", "image": "AAAA"});
        assert_eq!(
            parse_event(event).unwrap(),
            Some(ImageSource::Url("https://example.test/pano.jpg".into()))
        );
    }

    #[test]
    fn test_body_as_json_string() {
        let event = json!({"body": "{\"image\": \"aGVsbG8=\"}"});
        assert_eq!(
            parse_event(event).unwrap(),
            Some(ImageSource::Inline(b"hello".to_vec()))
        );
    }

    #[test]
    fn test_whole_event_as_string() {
        let event = Value::String("{\"body\": {\"image_url\": \"s3://bucket/key.png\"}}".into());
        assert_eq!(
            parse_event(event).unwrap(),
            Some(ImageSource::Url("s3://bucket/key.png".into()))
        );
    }

    #[test]
    fn test_data_url_prefix_is_stripped() {
        assert_eq!(
            decode_image_field("data:image/png;base64,aGVsbG8=").unwrap(),
            b"hello".to_vec()
        );
    }

    #[test]
    fn test_missing_image() {
        assert_eq!(parse_event(json!({"other": 1})).unwrap(), None);
        assert!(parse_event(json!({"image": "***"})).is_err());
    }
}
