use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use utoipa::ToSchema;

use super::upload::Upload;
use crate::error::ApiError;
use crate::models::AppConfig;
use crate::services::{converted_filename, ImageService};

/// Multipart form accepted by /convert-image/
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ConvertImageForm {
    /// Image to convert
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    /// Target format: jpeg, jpg, png, gif, webp, bmp, tiff or tif
    #[schema(example = "webp")]
    format: String,
}

/// Convert an image to another format in a single pass
#[utoipa::path(
    post,
    path = "/convert-image/",
    request_body(content = ConvertImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image in the requested format"),
        (status = 400, description = "Unsupported format, invalid upload or image"),
        (status = 429, description = "Rate limit exceeded"),
        (status = 500, description = "Conversion failed"),
    ),
    tag = "Images"
)]
pub async fn handle_convert_image(
    State(config): State<Arc<AppConfig>>,
    State(images): State<Arc<ImageService>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = Upload::read(multipart, &config).await?;
    // Resolved before decoding
    let format = upload.format()?;

    tracing::info!(
        file_name = ?upload.file_name,
        size_bytes = upload.bytes.len(),
        format = %format,
        "Convert request received"
    );

    let converted = images.convert(upload.bytes, format).await?;

    tracing::info!(
        format = %format,
        size_bytes = converted.bytes.len(),
        "Image converted"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, converted.media_type().to_string()),
            (header::CONTENT_LENGTH, converted.bytes.len().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", converted_filename(format)),
            ),
        ],
        Bytes::from(converted.bytes),
    )
        .into_response())
}
