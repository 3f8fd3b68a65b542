use axum::{
    extract::multipart::MultipartError,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use size_fit::ImagingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("File too large: {size} bytes (max {max})")]
    FileTooLarge { size: usize, max: usize },

    #[error("File type not allowed: {0}")]
    FileTypeNotAllowed(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid image: {0}")]
    Decode(String),

    #[error("Malformed upload: {0}")]
    Multipart(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Too many requests, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ImagingError> for ApiError {
    fn from(e: ImagingError) -> Self {
        match e {
            ImagingError::Decode(msg) => ApiError::Decode(msg),
            ImagingError::UnsupportedFormat(name) => ApiError::UnsupportedFormat(name),
            ImagingError::DimensionsTooLarge { .. } => ApiError::InvalidField {
                field: "file",
                reason: e.to_string(),
            },
            ImagingError::InvalidTarget(_) => ApiError::InvalidField {
                field: "size",
                reason: e.to_string(),
            },
            ImagingError::Encode(_) | ImagingError::Cancelled => {
                ApiError::Processing(e.to_string())
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(e.body_text())
        } else {
            ApiError::Multipart(e.body_text())
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_)
            | ApiError::InvalidField { .. }
            | ApiError::FileTooLarge { .. }
            | ApiError::FileTypeNotAllowed(_)
            | ApiError::UnsupportedFormat(_)
            | ApiError::Decode(_)
            | ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Processing(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Server-side details stay in the logs
        let message = match &self {
            ApiError::Processing(detail) => {
                tracing::error!(error = %detail, "Image processing failed");
                "Error processing image".to_string()
            }
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error");
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "error": message,
        }));

        match self {
            ApiError::RateLimited { retry_after_secs } => (
                status,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                body,
            )
                .into_response(),
            _ => (status, body).into_response(),
        }
    }
}
