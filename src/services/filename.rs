use sha2::{Digest, Sha256};
use size_fit::ConvertFormat;

const MAX_STEM_LEN: usize = 64;

/// Download name for a size-targeted JPEG: `processed_<stem>.jpg`
///
/// The stem comes from the uploaded filename, reduced to ASCII letters,
/// digits, `-` and `_`. When nothing usable is left the stem is a short
/// SHA-256 of the upload instead.
pub fn processed_filename(original: Option<&str>, content: &[u8]) -> String {
    let stem = original
        .map(sanitized_stem)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| content_hash(content));
    format!("processed_{stem}.jpg")
}

/// Download name for a converted image
pub fn converted_filename(format: ConvertFormat) -> String {
    format!("converted.{}", format.extension())
}

fn sanitized_stem(name: &str) -> String {
    // Browsers on Windows may send the full client path
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    };
    stem.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(MAX_STEM_LEN)
        .collect()
}

fn content_hash(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    hex::encode(&digest[..6])
}
