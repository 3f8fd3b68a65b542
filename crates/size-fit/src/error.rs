use thiserror::Error;

/// Errors produced by decoding, normalizing, searching and converting.
#[derive(Debug, Error)]
pub enum ImagingError {
    #[error("Could not decode image: {0}")]
    Decode(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Image dimensions {width}x{height} exceed maximum {max_width}x{max_height}")]
    DimensionsTooLarge {
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },

    #[error("Invalid target size: {0} KB")]
    InvalidTarget(u32),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Processing cancelled")]
    Cancelled,
}

impl ImagingError {
    /// True for errors caused by the caller's input rather than by processing.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ImagingError::Decode(_)
                | ImagingError::UnsupportedFormat(_)
                | ImagingError::DimensionsTooLarge { .. }
                | ImagingError::InvalidTarget(_)
        )
    }
}

impl From<image::ImageError> for ImagingError {
    fn from(e: image::ImageError) -> Self {
        // Encode paths map their errors explicitly; whatever reaches this
        // conversion came from reading the upload.
        match e {
            image::ImageError::Encoding(_) | image::ImageError::Parameter(_) => {
                ImagingError::Encode(e.to_string())
            }
            other => ImagingError::Decode(other.to_string()),
        }
    }
}

impl From<jpeg_encoder::EncodingError> for ImagingError {
    fn from(e: jpeg_encoder::EncodingError) -> Self {
        ImagingError::Encode(e.to_string())
    }
}
