use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use utoipa::ToSchema;

use super::upload::Upload;
use crate::error::ApiError;
use crate::models::AppConfig;
use crate::services::{processed_filename, ImageService};

pub const X_FINAL_SIZE_KB: HeaderName = HeaderName::from_static("x-final-size-kb");
pub const X_FINAL_QUALITY: HeaderName = HeaderName::from_static("x-final-quality");
pub const X_FINAL_DIMENSIONS: HeaderName = HeaderName::from_static("x-final-dimensions");
pub const X_SEARCH_ITERATIONS: HeaderName = HeaderName::from_static("x-search-iterations");
pub const X_SEARCH_CONVERGED: HeaderName = HeaderName::from_static("x-search-converged");

/// Multipart form accepted by /process-image/
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ProcessImageForm {
    /// Image to shrink or grow (JPEG, PNG, GIF, WEBP, BMP, TIFF)
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    /// Target size in KB, 10 to 1000 (default 100)
    size: Option<u32>,
}

/// Re-encode an image as a JPEG of approximately the requested size
///
/// Quality is lowered first, then dimensions. Small images are scaled up
/// until they reach the target. When the target cannot be met within the
/// search budget, the closest result is returned and
/// `X-Search-Converged` is `false`.
#[utoipa::path(
    post,
    path = "/process-image/",
    request_body(content = ProcessImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "JPEG close to the target size", content_type = "image/jpeg",
            headers(
                ("X-Final-Size-KB" = String, description = "Size of the returned JPEG in KB"),
                ("X-Final-Quality" = u8, description = "JPEG quality used"),
                ("X-Final-Dimensions" = String, description = "Output dimensions as WIDTHxHEIGHT"),
                ("X-Search-Iterations" = usize, description = "Encodes performed"),
                ("X-Search-Converged" = bool, description = "Whether the size is within tolerance"),
            )),
        (status = 400, description = "Invalid upload, size or image"),
        (status = 429, description = "Rate limit exceeded"),
        (status = 500, description = "Processing failed"),
    ),
    tag = "Images"
)]
pub async fn handle_process_image(
    State(config): State<Arc<AppConfig>>,
    State(images): State<Arc<ImageService>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = Upload::read(multipart, &config).await?;
    let target_kb = upload.target_size(&config)?;

    tracing::info!(
        file_name = ?upload.file_name,
        size_bytes = upload.bytes.len(),
        target_kb,
        "Process request received"
    );

    let filename = processed_filename(upload.file_name.as_deref(), &upload.bytes);
    let outcome = images.process(upload.bytes, target_kb).await?;
    let report = &outcome.report;
    let chosen = report.chosen;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/jpeg".to_string()),
            (header::CONTENT_LENGTH, outcome.bytes.len().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
            (X_FINAL_SIZE_KB, format!("{:.2}", chosen.size_kb)),
            (X_FINAL_QUALITY, chosen.quality.to_string()),
            (
                X_FINAL_DIMENSIONS,
                format!("{}x{}", chosen.width, chosen.height),
            ),
            (X_SEARCH_ITERATIONS, report.iterations().to_string()),
            (X_SEARCH_CONVERGED, report.status.is_converged().to_string()),
        ],
        Bytes::from(outcome.bytes),
    )
        .into_response())
}
