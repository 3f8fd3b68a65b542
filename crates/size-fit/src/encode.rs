//! JPEG encoding used by the size search.

use image::RgbImage;
use jpeg_encoder::{ColorType, Encoder};

use crate::error::ImagingError;

/// Encodes an RGB image to JPEG at a given quality.
///
/// The search only depends on this trait, so tests can drive it with an
/// encoder whose output size is a known function of dimensions and quality.
pub trait JpegEncode: Send + Sync {
    fn encode(&self, image: &RgbImage, quality: u8) -> Result<Vec<u8>, ImagingError>;
}

/// Baseline JPEG with optimized Huffman tables.
///
/// Optimized tables shrink the output without touching quantization, so the
/// meaning of the quality number is unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptimizedJpegEncoder;

impl JpegEncode for OptimizedJpegEncoder {
    fn encode(&self, image: &RgbImage, quality: u8) -> Result<Vec<u8>, ImagingError> {
        let (width, height) = image.dimensions();
        let (w, h) = match (u16::try_from(width), u16::try_from(height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
            _ => {
                return Err(ImagingError::Encode(format!(
                    "JPEG cannot encode {width}x{height}"
                )))
            }
        };

        let mut buf = Vec::new();
        let mut encoder = Encoder::new(&mut buf, quality.clamp(1, 100));
        encoder.set_optimized_huffman_tables(true);
        encoder.encode(image.as_raw(), w, h, ColorType::Rgb)?;
        Ok(buf)
    }
}
