//! size-fit: fit an image into a byte budget, or re-encode it.
//!
//! Two entry points, independent of any transport:
//!
//! - [`process_image`]: decode, normalize to RGB and run the
//!   [`SizeSearch`] until the JPEG lands within ±2 KB of the target.
//! - [`convert_bytes`]: re-encode into one of the [`ConvertFormat`]s in a
//!   single pass.
//!
//! ```
//! use image::{ImageFormat, Rgb, RgbImage};
//! use size_fit::{process_image, CancelFlag, DecodeLimits, SizeSearch, SearchOptions};
//! use std::io::Cursor;
//!
//! let mut png = Vec::new();
//! RgbImage::from_pixel(64, 64, Rgb([255, 0, 0]))
//!     .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
//!     .unwrap();
//! let search = SizeSearch::new(SearchOptions {
//!     max_dimension: 512,
//!     ..SearchOptions::default()
//! });
//! let outcome = process_image(&png, 10, &search, DecodeLimits::default(), &CancelFlag::new()).unwrap();
//!
//! assert_eq!(&outcome.bytes[0..2], &[0xFF, 0xD8]);
//! ```
//!
//! Everything here is synchronous and CPU-bound. Callers in async code are
//! expected to run it on a blocking thread.

pub mod convert;
pub mod decode;
pub mod encode;
pub mod error;
pub mod format;
pub mod normalize;
pub mod search;

pub use convert::{convert, convert_bytes, Converted};
pub use decode::{decode, DecodeLimits};
pub use encode::{JpegEncode, OptimizedJpegEncoder};
pub use error::ImagingError;
pub use format::ConvertFormat;
pub use normalize::{normalize, ColorMode};
pub use search::{
    Attempt, CancelFlag, SearchOptions, SearchOutcome, SearchReport, SearchStatus, SizeSearch,
};

/// Decode `bytes`, normalize the color mode and search for `target_kb`.
pub fn process_image<E: JpegEncode>(
    bytes: &[u8],
    target_kb: u32,
    search: &SizeSearch<E>,
    limits: DecodeLimits,
    cancel: &CancelFlag,
) -> Result<SearchOutcome, ImagingError> {
    let image = decode(bytes, limits)?;
    let rgb = normalize(image);
    search.run(rgb, target_kb, cancel)
}
