use super::types::{ApiError, DescribeRequest};
use crate::provider::{
    DEFAULT_MAX_TOKENS, Description, ImageEncoding, ImagePayload, InferenceInput,
    InferenceProvider,
};
use axum::{body::Bytes, extract::State, http::StatusCode, response::Json};
use base64::{
    Engine, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

const DATA_URI_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";

/// Browsers emit both padded and unpadded payloads.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn InferenceProvider>,
}

pub async fn describe(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Description>, ApiError> {
    let request_id = Uuid::new_v4();

    let input = match build_input(&body, state.provider.image_encoding()) {
        Ok(input) => input,
        Err(e) => {
            warn!("Rejected describe request {}: {:?}", request_id, e);
            return Err(e);
        }
    };

    info!(
        "Describe request {}: prompt of {} chars, max_tokens {}",
        request_id,
        input.prompt.chars().count(),
        input.max_tokens
    );

    match state.provider.infer(input).await {
        Ok(description) => {
            info!("Describe request {} completed", request_id);
            Ok(Json(description))
        }
        Err(e) => {
            error!("Describe request {} failed: {}", request_id, e);
            Err(e.into())
        }
    }
}

pub async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

/// Validates the raw body and shapes the image the way `encoding` asks for.
pub fn build_input(body: &[u8], encoding: ImageEncoding) -> Result<InferenceInput, ApiError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| ApiError::InvalidJson)?;
    let request: DescribeRequest =
        serde_json::from_value(value).map_err(|e| ApiError::InvalidBody(e.to_string()))?;

    let (image, prompt) = match (request.image, request.prompt) {
        (Some(image), Some(prompt)) if !image.is_empty() && !prompt.is_empty() => {
            (image, prompt)
        }
        _ => return Err(ApiError::MissingFields),
    };

    if !is_image_data_uri(&image) {
        return Err(ApiError::InvalidImageFormat);
    }

    let image = match encoding {
        ImageEncoding::Bytes => ImagePayload::Bytes(decode_data_uri(&image)?),
        ImageEncoding::DataUri => ImagePayload::DataUri(image),
    };

    Ok(InferenceInput {
        prompt,
        image,
        max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
    })
}

pub fn is_image_data_uri(image: &str) -> bool {
    image.starts_with(DATA_URI_PREFIX) && image.contains(BASE64_MARKER)
}

/// Decodes everything after the first comma of a data URI.
pub fn decode_data_uri(image: &str) -> Result<Vec<u8>, ApiError> {
    let (_, payload) = image
        .split_once(',')
        .ok_or(ApiError::InvalidImageFormat)?;
    PAYLOAD_ENGINE
        .decode(payload)
        .map_err(|_| ApiError::UndecodableImage)
}
