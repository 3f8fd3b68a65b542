//! Color-mode normalization for JPEG encoding.
//!
//! Baseline JPEG has no alpha channel and no palette, so every decoded image
//! is reduced to 8-bit RGB before the size search runs. Transparent pixels
//! are composited onto white, which is what people expect when they export an
//! image for viewing.

use image::{DynamicImage, Rgb, RgbImage, RgbaImage};

/// Channel layout of a decoded image.
///
/// Palette images never show up here: the decoder expands the palette, so a
/// palette PNG arrives as `TruecolorAlpha` when it has transparency and as
/// `Truecolor` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    TruecolorAlpha,
    Truecolor,
    GrayscaleAlpha,
    Grayscale,
    /// 16-bit or floating point RGB without alpha
    Other,
}

impl ColorMode {
    pub fn of(image: &DynamicImage) -> Self {
        match image {
            DynamicImage::ImageRgba8(_)
            | DynamicImage::ImageRgba16(_)
            | DynamicImage::ImageRgba32F(_) => ColorMode::TruecolorAlpha,
            DynamicImage::ImageRgb8(_) => ColorMode::Truecolor,
            DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLumaA16(_) => {
                ColorMode::GrayscaleAlpha
            }
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageLuma16(_) => ColorMode::Grayscale,
            _ => ColorMode::Other,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, ColorMode::TruecolorAlpha | ColorMode::GrayscaleAlpha)
    }
}

/// Reduce an image to 8-bit RGB.
///
/// - grayscale with alpha: alpha dropped, gray expanded to RGB
/// - RGBA: composited onto opaque white using alpha as the mask
/// - RGB8: returned as is
/// - anything else: plain conversion to RGB8
pub fn normalize(image: DynamicImage) -> RgbImage {
    let mode = ColorMode::of(&image);
    tracing::debug!(?mode, width = image.width(), height = image.height(), "Normalizing color mode");

    match (mode, image) {
        (_, DynamicImage::ImageRgb8(rgb)) => rgb,
        (ColorMode::TruecolorAlpha, image) => composite_on_white(&image.into_rgba8()),
        (_, image) => image.into_rgb8(),
    }
}

/// Alpha-blend every pixel over a white background.
fn composite_on_white(rgba: &RgbaImage) -> RgbImage {
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = Rgb([blend(r, a), blend(g, a), blend(b, a)]);
    }
    out
}

#[inline]
fn blend(channel: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((channel as u32 * a + 255 * (255 - a) + 127) / 255) as u8
}
