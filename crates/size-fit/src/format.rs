use image::ImageFormat;
use std::fmt;
use std::str::FromStr;

use crate::error::ImagingError;

/// Output formats accepted by the direct conversion path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConvertFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
    Bmp,
    Tiff,
}

impl ConvertFormat {
    pub const ALL: [ConvertFormat; 6] = [
        ConvertFormat::Jpeg,
        ConvertFormat::Png,
        ConvertFormat::Gif,
        ConvertFormat::WebP,
        ConvertFormat::Bmp,
        ConvertFormat::Tiff,
    ];

    /// Resolve a user-supplied format name, ignoring case.
    pub fn parse(name: &str) -> Result<Self, ImagingError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(ConvertFormat::Jpeg),
            "png" => Ok(ConvertFormat::Png),
            "gif" => Ok(ConvertFormat::Gif),
            "webp" => Ok(ConvertFormat::WebP),
            "bmp" => Ok(ConvertFormat::Bmp),
            "tiff" | "tif" => Ok(ConvertFormat::Tiff),
            _ => Err(ImagingError::UnsupportedFormat(name.to_string())),
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            ConvertFormat::Jpeg => "image/jpeg",
            ConvertFormat::Png => "image/png",
            ConvertFormat::Gif => "image/gif",
            ConvertFormat::WebP => "image/webp",
            ConvertFormat::Bmp => "image/bmp",
            ConvertFormat::Tiff => "image/tiff",
        }
    }

    /// File extension for download names. JPEG is always `jpg`.
    pub fn extension(self) -> &'static str {
        match self {
            ConvertFormat::Jpeg => "jpg",
            ConvertFormat::Png => "png",
            ConvertFormat::Gif => "gif",
            ConvertFormat::WebP => "webp",
            ConvertFormat::Bmp => "bmp",
            ConvertFormat::Tiff => "tiff",
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            ConvertFormat::Jpeg => ImageFormat::Jpeg,
            ConvertFormat::Png => ImageFormat::Png,
            ConvertFormat::Gif => ImageFormat::Gif,
            ConvertFormat::WebP => ImageFormat::WebP,
            ConvertFormat::Bmp => ImageFormat::Bmp,
            ConvertFormat::Tiff => ImageFormat::Tiff,
        }
    }

    /// Formats whose encoders cannot carry alpha in the conversion path.
    pub fn strips_alpha(self) -> bool {
        matches!(
            self,
            ConvertFormat::Jpeg | ConvertFormat::Bmp | ConvertFormat::WebP
        )
    }
}

impl FromStr for ConvertFormat {
    type Err = ImagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ConvertFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
