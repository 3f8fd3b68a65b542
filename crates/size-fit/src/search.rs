//! Target-size search over JPEG quality and image dimensions.
//!
//! The search starts at the highest quality and walks quality down in
//! 5-point steps while the output is too large. Once quality bottoms out it
//! shrinks the image by 10% and starts again from the top. Output that is too
//! small grows the image by 10% and raises quality. Quality changes are cheap
//! and keep more detail than resampling, so they are always tried first.
//!
//! The loop ends when the encoded size is within the tolerance window. It also
//! ends when the iteration cap is reached or a `(width, height, quality)`
//! state repeats, since a repeated state means the deterministic encoder is
//! cycling. In those two cases the attempt closest to the target is returned
//! with [`SearchStatus::SizeUnreachable`].

use image::imageops::{self, FilterType};
use image::RgbImage;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::encode::{JpegEncode, OptimizedJpegEncoder};
use crate::error::ImagingError;

/// Tuning knobs for [`SizeSearch`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Accepted absolute distance from the target, in KB
    pub tolerance_kb: f64,
    pub min_quality: u8,
    /// Starting quality, and the cap when quality is raised
    pub max_quality: u8,
    pub quality_step: u8,
    pub downscale_factor: f64,
    pub upscale_factor: f64,
    pub max_iterations: usize,
    /// Upscaling never takes a side beyond this
    pub max_dimension: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            tolerance_kb: 2.0,
            min_quality: 10,
            max_quality: 95,
            quality_step: 5,
            downscale_factor: 0.9,
            upscale_factor: 1.1,
            max_iterations: 100,
            max_dimension: 8000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Converged,
    /// Cap or stall reached; the closest attempt was returned instead
    SizeUnreachable,
}

impl SearchStatus {
    pub fn is_converged(self) -> bool {
        self == SearchStatus::Converged
    }
}

/// One encode of the search loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attempt {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub size_kb: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub target_kb: u32,
    pub status: SearchStatus,
    /// The attempt whose bytes were returned
    pub chosen: Attempt,
    /// Every attempt in order
    pub attempts: Vec<Attempt>,
}

impl SearchReport {
    pub fn iterations(&self) -> usize {
        self.attempts.len()
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub bytes: Vec<u8>,
    pub report: SearchReport,
}

/// Shared flag that stops a running search between iterations.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct SizeSearch<E = OptimizedJpegEncoder> {
    encoder: E,
    options: SearchOptions,
}

impl SizeSearch<OptimizedJpegEncoder> {
    pub fn new(options: SearchOptions) -> Self {
        Self::with_encoder(OptimizedJpegEncoder, options)
    }
}

impl Default for SizeSearch<OptimizedJpegEncoder> {
    fn default() -> Self {
        Self::new(SearchOptions::default())
    }
}

impl<E: JpegEncode> SizeSearch<E> {
    pub fn with_encoder(encoder: E, options: SearchOptions) -> Self {
        Self { encoder, options }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Encode `image` as JPEG as close to `target_kb` as the search can get.
    ///
    /// The image is owned and only ever replaced by resampled copies, so the
    /// caller's decoded original is never touched.
    pub fn run(
        &self,
        image: RgbImage,
        target_kb: u32,
        cancel: &CancelFlag,
    ) -> Result<SearchOutcome, ImagingError> {
        if target_kb == 0 {
            return Err(ImagingError::InvalidTarget(target_kb));
        }

        let opts = &self.options;
        let target = f64::from(target_kb);
        let mut image = image;
        let mut quality = opts.max_quality;
        let mut attempts: Vec<Attempt> = Vec::new();
        let mut visited = HashSet::new();
        let mut best: Option<(Vec<u8>, Attempt)> = None;

        for _ in 0..opts.max_iterations.max(1) {
            if cancel.is_cancelled() {
                tracing::info!(iterations = attempts.len(), "Size search cancelled");
                return Err(ImagingError::Cancelled);
            }

            let (width, height) = image.dimensions();
            if !visited.insert((width, height, quality)) {
                tracing::debug!(width, height, quality, "Search state repeated, stopping");
                break;
            }

            let bytes = self.encoder.encode(&image, quality)?;
            let attempt = Attempt {
                width,
                height,
                quality,
                size_kb: bytes.len() as f64 / 1024.0,
            };
            attempts.push(attempt);
            tracing::debug!(
                iteration = attempts.len(),
                width,
                height,
                quality,
                size_kb = attempt.size_kb,
                target_kb,
                "Search attempt"
            );

            let distance = (attempt.size_kb - target).abs();
            if distance <= opts.tolerance_kb {
                return Ok(finish(bytes, attempt, SearchStatus::Converged, target_kb, attempts));
            }

            let closer = best
                .as_ref()
                .map_or(true, |(_, b)| distance < (b.size_kb - target).abs());
            if closer {
                best = Some((bytes, attempt));
            }

            if attempt.size_kb > target {
                if quality > opts.min_quality {
                    quality = quality.saturating_sub(opts.quality_step).max(opts.min_quality);
                } else {
                    image = rescale(image, opts.downscale_factor);
                    quality = opts.max_quality;
                }
            } else {
                let (w, h) = (
                    scaled(width, opts.upscale_factor),
                    scaled(height, opts.upscale_factor),
                );
                if w.max(h) <= opts.max_dimension {
                    image = rescale(image, opts.upscale_factor);
                }
                quality = quality.saturating_add(opts.quality_step).min(opts.max_quality);
            }
        }

        let (bytes, chosen) = best.ok_or_else(|| {
            ImagingError::Encode("size search made no attempts".to_string())
        })?;
        Ok(finish(bytes, chosen, SearchStatus::SizeUnreachable, target_kb, attempts))
    }
}

fn finish(
    bytes: Vec<u8>,
    chosen: Attempt,
    status: SearchStatus,
    target_kb: u32,
    attempts: Vec<Attempt>,
) -> SearchOutcome {
    match status {
        SearchStatus::Converged => tracing::info!(
            target_kb,
            size_kb = chosen.size_kb,
            quality = chosen.quality,
            width = chosen.width,
            height = chosen.height,
            iterations = attempts.len(),
            "Size search converged"
        ),
        SearchStatus::SizeUnreachable => tracing::warn!(
            target_kb,
            size_kb = chosen.size_kb,
            quality = chosen.quality,
            width = chosen.width,
            height = chosen.height,
            iterations = attempts.len(),
            "Target size unreachable, returning closest attempt"
        ),
    }
    SearchOutcome {
        bytes,
        report: SearchReport {
            target_kb,
            status,
            chosen,
            attempts,
        },
    }
}

/// Multiply a dimension and truncate, never going below one pixel.
fn scaled(dim: u32, factor: f64) -> u32 {
    ((f64::from(dim) * factor) as u32).max(1)
}

fn rescale(image: RgbImage, factor: f64) -> RgbImage {
    let (width, height) = image.dimensions();
    let (w, h) = (scaled(width, factor), scaled(height, factor));
    if (w, h) == (width, height) {
        return image;
    }
    imageops::resize(&image, w, h, FilterType::Lanczos3)
}
