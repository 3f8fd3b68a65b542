//! Single-pass re-encoding into a requested format.
//!
//! Unlike the size search, alpha is dropped here with a plain RGB conversion:
//! a transparent pixel keeps whatever color its RGB channels hold instead of
//! being matted onto white.

use image::DynamicImage;
use std::io::Cursor;

use crate::decode::{decode, DecodeLimits};
use crate::error::ImagingError;
use crate::format::ConvertFormat;
use crate::normalize::ColorMode;

#[derive(Debug, Clone)]
pub struct Converted {
    pub bytes: Vec<u8>,
    pub format: ConvertFormat,
}

impl Converted {
    pub fn media_type(&self) -> &'static str {
        self.format.media_type()
    }

    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }
}

/// Resolve `format_name`, decode `bytes` and re-encode.
///
/// The format name is checked before decoding so an unsupported request
/// never pays for a decode.
pub fn convert_bytes(
    bytes: &[u8],
    format_name: &str,
    limits: DecodeLimits,
) -> Result<Converted, ImagingError> {
    let format = ConvertFormat::parse(format_name)?;
    let image = decode(bytes, limits)?;
    convert(image, format)
}

pub fn convert(image: DynamicImage, format: ConvertFormat) -> Result<Converted, ImagingError> {
    let source_mode = ColorMode::of(&image);
    let prepared = prepare(image, format);
    tracing::debug!(
        ?format,
        ?source_mode,
        color = ?prepared.color(),
        "Converting image"
    );

    let mut buf = Cursor::new(Vec::new());
    prepared
        .write_to(&mut buf, format.image_format())
        .map_err(|e| ImagingError::Encode(e.to_string()))?;

    Ok(Converted {
        bytes: buf.into_inner(),
        format,
    })
}

/// Drop alpha where the format calls for it, then fit the pixel layout to
/// what the encoder accepts.
fn prepare(image: DynamicImage, format: ConvertFormat) -> DynamicImage {
    let image = if format.strips_alpha() && ColorMode::of(&image).has_alpha() {
        DynamicImage::ImageRgb8(image.into_rgb8())
    } else {
        image
    };

    match (format, image) {
        (ConvertFormat::Jpeg | ConvertFormat::Bmp, img @ DynamicImage::ImageLuma8(_)) => img,
        (ConvertFormat::Jpeg | ConvertFormat::Bmp, DynamicImage::ImageLuma16(img)) => {
            DynamicImage::ImageLuma8(DynamicImage::ImageLuma16(img).into_luma8())
        }
        (ConvertFormat::Jpeg | ConvertFormat::Bmp | ConvertFormat::WebP, img) => {
            to_rgb8(img)
        }
        (ConvertFormat::Gif, img) => DynamicImage::ImageRgba8(img.into_rgba8()),
        (ConvertFormat::Tiff, img @ (DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLumaA16(_))) => {
            DynamicImage::ImageRgba8(img.into_rgba8())
        }
        (ConvertFormat::Png | ConvertFormat::Tiff, img @ DynamicImage::ImageRgb32F(_)) => {
            DynamicImage::ImageRgb16(img.into_rgb16())
        }
        (ConvertFormat::Png | ConvertFormat::Tiff, img @ DynamicImage::ImageRgba32F(_)) => {
            DynamicImage::ImageRgba16(img.into_rgba16())
        }
        (_, img) => img,
    }
}

fn to_rgb8(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgb8(_) => image,
        other => DynamicImage::ImageRgb8(other.into_rgb8()),
    }
}
