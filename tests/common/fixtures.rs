//! Test fixtures: generated images and hand-built multipart bodies.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

const BOUNDARY: &str = "imgfit-test-boundary-7MA4YWxkTrZu0gW";

/// Builder for a `multipart/form-data` request body
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self { body: Vec::new() }
    }

    /// Add a file part
    pub fn file(mut self, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Add a plain text field
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    /// Close the form and return the raw body
    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

fn encode(image: RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut buf), format)
        .expect("encode fixture");
    buf
}

/// Single-color PNG
pub fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    encode(
        RgbaImage::from_pixel(width, height, Rgba(rgba)),
        ImageFormat::Png,
    )
}

/// Gradient with deterministic noise and a checkerboard of partial
/// transparency, so it compresses like a photo and carries alpha
pub fn photo_like_png(width: u32, height: u32, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
    let image = RgbaImage::from_fn(width, height, |x, y| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let noise = (state >> 26) as u8;
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        let b = ((x + y) * 127 / (width + height).max(1)) as u8;
        let a = if (x / 32 + y / 32) % 2 == 0 { 255 } else { 160 };
        Rgba([
            r.saturating_add(noise),
            g.saturating_add(noise),
            b.saturating_add(noise),
            a,
        ])
    });
    encode(image, ImageFormat::Png)
}

/// Smooth shading with faint grain and an alpha border, closer to a large
/// camera photo than `photo_like_png` whose heavy noise dominates the JPEG
pub fn smooth_photo_png(width: u32, height: u32, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
    let (w, h) = (width.max(1) as f32, height.max(1) as f32);
    let image = RgbaImage::from_fn(width, height, |x, y| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let grain = (state >> 30) as f32;
        let (u, v) = (x as f32 / w, y as f32 / h);
        let sky = 0.5 + 0.5 * (u * 3.1 + v * 1.7).sin();
        let hills = 0.5 + 0.5 * (u * 7.3 - v * 4.9).cos();
        let shade = |base: f32, amount: f32| (base + amount + grain).clamp(0.0, 255.0) as u8;
        let (bx, by) = (width / 20, height / 20);
        let edge = x < bx || y < by || x >= width - bx || y >= height - by;
        Rgba([
            shade(40.0, 170.0 * sky),
            shade(60.0, 120.0 * hills),
            shade(90.0, 140.0 * (1.0 - v) * sky),
            if edge { 0 } else { 255 },
        ])
    });
    encode(image, ImageFormat::Png)
}

/// Dimensions of an encoded image
pub fn dimensions(bytes: &[u8]) -> (u32, u32) {
    let image = image::load_from_memory(bytes).expect("decode response");
    (image.width(), image.height())
}
