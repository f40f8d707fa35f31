use crate::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

pub const INVALID_JSON: &str = "Invalid JSON in request body";
pub const MISSING_FIELDS: &str = "Missing image (base64 data URI) or prompt in request body";
pub const INVALID_IMAGE_FORMAT: &str =
    "Invalid image format. Expected a base64 data URI (data:image/<type>;base64,<data>)";
pub const UNDECODABLE_IMAGE: &str = "Failed to decode base64 image data.";
pub const MODEL_ERROR_PREFIX: &str = "AI model error: ";
pub const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, Deserialize)]
pub struct DescribeRequest {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Every way a describe request can fail, mapped onto an HTTP answer.
#[derive(Debug)]
pub enum ApiError {
    InvalidJson,
    InvalidBody(String),
    MissingFields,
    InvalidImageFormat,
    UndecodableImage,
    Model { status: StatusCode, details: String },
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson
            | Self::InvalidBody(_)
            | Self::MissingFields
            | Self::InvalidImageFormat
            | Self::UndecodableImage => StatusCode::BAD_REQUEST,
            Self::Model { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(self) -> ErrorResponse {
        let (message, error) = match self {
            Self::InvalidJson => (INVALID_JSON.to_string(), None),
            Self::InvalidBody(reason) => (format!("Invalid request body: {}", reason), None),
            Self::MissingFields => (MISSING_FIELDS.to_string(), None),
            Self::InvalidImageFormat => (INVALID_IMAGE_FORMAT.to_string(), None),
            Self::UndecodableImage => (UNDECODABLE_IMAGE.to_string(), None),
            Self::Model { details, .. } => (format!("{}{}", MODEL_ERROR_PREFIX, details), None),
            Self::Internal(error) => (INTERNAL_ERROR.to_string(), Some(error)),
        };
        ErrorResponse { message, error }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Model { status, details } => {
                let status = status
                    .and_then(|code| StatusCode::from_u16(code).ok())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                Self::Model { status, details }
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_model_error_keeps_downstream_status() {
        let api_error = ApiError::from(Error::model(Some(401), "Authentication error"));

        assert_eq!(api_error.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            serde_json::to_value(api_error.body()).unwrap(),
            json!({"message": "AI model error: Authentication error"})
        );
    }

    #[test]
    fn test_model_error_without_status_is_500() {
        let api_error = ApiError::from(Error::model(None, "binding failed"));

        assert_eq!(api_error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_error_carries_detail() {
        let api_error = ApiError::from(Error::internal("connection reset"));

        assert_eq!(api_error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            serde_json::to_value(api_error.body()).unwrap(),
            json!({
                "message": "Internal server error",
                "error": "Internal error: connection reset"
            })
        );
    }

    #[test]
    fn test_client_errors_are_400() {
        for api_error in [
            ApiError::InvalidJson,
            ApiError::InvalidBody("prompt: invalid type".to_string()),
            ApiError::MissingFields,
            ApiError::InvalidImageFormat,
            ApiError::UndecodableImage,
        ] {
            assert_eq!(api_error.status(), StatusCode::BAD_REQUEST);
        }
    }
}
