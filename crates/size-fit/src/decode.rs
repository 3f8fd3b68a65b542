use image::{DynamicImage, ImageReader};
use std::io::Cursor;

use crate::error::ImagingError;

/// Largest image the decoder will accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_width: 8000,
            max_height: 8000,
        }
    }
}

/// Decode an uploaded image, sniffing the format from its content.
///
/// Dimensions are read from the header first so an oversized image is
/// rejected before any pixel buffer is allocated.
pub fn decode(bytes: &[u8], limits: DecodeLimits) -> Result<DynamicImage, ImagingError> {
    let (width, height) = reader(bytes)?.into_dimensions()?;
    if width > limits.max_width || height > limits.max_height {
        return Err(ImagingError::DimensionsTooLarge {
            width,
            height,
            max_width: limits.max_width,
            max_height: limits.max_height,
        });
    }

    let image = reader(bytes)?.decode()?;
    tracing::debug!(
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "Decoded image"
    );
    Ok(image)
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, ImagingError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImagingError::Decode(e.to_string()))?;
    if reader.format().is_none() {
        return Err(ImagingError::Decode("unrecognized image format".to_string()));
    }
    Ok(reader)
}
