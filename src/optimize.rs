//! Image optimization: JPEG re-encoding under a size budget, content
//! hashing and deterministic renaming.

use crate::error::{CleanupError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Maximum acceptable encoded size: 1 MiB.
pub const SIZE_BUDGET: usize = 1024 * 1024;

/// Quality the encoder starts at.
pub const INITIAL_QUALITY: u8 = 95;

/// Quality below which the size budget is no longer pursued.
pub const QUALITY_FLOOR: u8 = 10;

/// Length of the hash prefix embedded in optimized filenames.
pub const HASH_LEN: usize = 8;

/// Result of optimizing one image, held in memory until the pipeline
/// decides whether to write it.
#[derive(Debug)]
pub struct OptimizedImage {
    /// Final encoded bytes.
    pub bytes: Vec<u8>,
    /// Quality the encoder settled on; `None` when the source was already
    /// a JPEG within budget and its bytes were kept verbatim.
    pub quality: Option<u8>,
    /// True when even the quality floor could not get under the budget.
    pub over_budget: bool,
}

impl OptimizedImage {
    /// Truncated SHA-256 of the final bytes.
    pub fn hash(&self) -> String {
        content_hash(&self.bytes)
    }
}

/// Truncated SHA-256 hex digest of a byte slice.
pub fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = String::with_capacity(HASH_LEN);
    for byte in digest.iter().take(HASH_LEN.div_ceil(2)) {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex.truncate(HASH_LEN);
    hex
}

/// Strip characters unsafe for filenames from a note stem.
///
/// Whitespace is removed outright; anything outside `[A-Za-z0-9._-]` is
/// dropped. An empty result falls back to `img`.
pub fn sanitize_stem(stem: &str) -> String {
    let sanitized: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    if sanitized.is_empty() {
        "img".to_string()
    } else {
        sanitized
    }
}

/// Derive the optimized filename from a note stem and a content hash.
pub fn optimized_name(note_stem: &str, hash: &str) -> String {
    format!("{}-{}.jpg", sanitize_stem(note_stem), hash)
}

fn has_jpeg_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            e == "jpg" || e == "jpeg"
        })
        .unwrap_or(false)
}

/// Whether a file is already in its final optimized state: a JPEG named
/// with the truncated hash of its own content.
///
/// This is what makes a second run over the tool's output a no-op. No size
/// check: a floor-quality output that still exceeds the budget is as final
/// as it will ever get, and reprocessing it would rename it forever.
pub fn is_already_optimized(path: &Path) -> bool {
    if !has_jpeg_extension(path) {
        return false;
    }

    let Ok(bytes) = std::fs::read(path) else {
        return false;
    };

    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    let Some((_, suffix)) = stem.rsplit_once('-') else {
        return false;
    };
    if suffix.len() != HASH_LEN || !suffix.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }

    suffix.eq_ignore_ascii_case(&content_hash(&bytes))
}

/// Flatten transparency onto a white background and convert to RGB.
fn flatten_to_rgb(img: DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let a = a as u16;
        let blend = |c: u8| ((c as u16 * a + 255 * (255 - a)) / 255) as u8;
        rgb.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    rgb
}

fn encode_jpeg(img: &RgbImage, quality: u8, path: &Path) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder
        .encode_image(img)
        .map_err(|e| CleanupError::Encode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(buf)
}

/// Next quality step: drop faster the further the result is over budget.
fn next_quality(quality: u8, size: usize, budget: usize) -> u8 {
    let step = if size > budget * 2 {
        10
    } else if size * 2 > budget * 3 {
        5
    } else {
        3
    };
    quality.saturating_sub(step).max(QUALITY_FLOOR)
}

/// Re-encode at decreasing quality until the output fits the budget or the
/// quality floor is reached. Returns the final bytes, the quality settled
/// on, and whether the result still exceeds the budget.
fn encode_under_budget(
    rgb: &RgbImage,
    path: &Path,
    budget: usize,
) -> Result<(Vec<u8>, u8, bool)> {
    let mut quality = INITIAL_QUALITY;
    let mut bytes = encode_jpeg(rgb, quality, path)?;

    while bytes.len() > budget && quality > QUALITY_FLOOR {
        quality = next_quality(quality, bytes.len(), budget);
        bytes = encode_jpeg(rgb, quality, path)?;
    }

    let over_budget = bytes.len() > budget;
    Ok((bytes, quality, over_budget))
}

/// Decode an image file and re-encode it as a JPEG within the size budget.
///
/// A source that is already a JPEG within budget is returned byte-for-byte,
/// so optimization never degrades an image that needs nothing but a rename.
/// When the quality floor is reached and the result still exceeds the
/// budget, the floor encoding is accepted (best effort).
pub fn optimize(path: &Path) -> Result<OptimizedImage> {
    let data = std::fs::read(path).map_err(|e| CleanupError::Decode {
        path: path.to_path_buf(),
        source: image::ImageError::IoError(e),
    })?;

    if has_jpeg_extension(path) && data.len() <= SIZE_BUDGET {
        return Ok(OptimizedImage {
            bytes: data,
            quality: None,
            over_budget: false,
        });
    }

    let img = image::load_from_memory(&data).map_err(|e| CleanupError::Decode {
        path: path.to_path_buf(),
        source: e,
    })?;
    let rgb = flatten_to_rgb(img);

    let (bytes, quality, over_budget) = encode_under_budget(&rgb, path, SIZE_BUDGET)?;
    Ok(OptimizedImage {
        bytes,
        quality: Some(quality),
        over_budget,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn noise_image(width: u32, height: u32) -> RgbImage {
        // Deterministic pseudo-random fill; noise compresses poorly, which
        // exercises the quality loop.
        let mut state: u32 = 0x2545_f491;
        RgbImage::from_fn(width, height, |_, _| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let b = state.to_le_bytes();
            Rgb([b[0], b[1], b[2]])
        })
    }

    #[test]
    fn test_content_hash_stable_and_truncated() {
        let h = content_hash(b"hello");
        assert_eq!(h.len(), HASH_LEN);
        assert_eq!(h, content_hash(b"hello"));
        assert_ne!(h, content_hash(b"hello!"));
        // sha256("hello") starts with 2cf24dba
        assert_eq!(h, "2cf24dba");
    }

    #[test]
    fn test_sanitize_stem() {
        assert_eq!(sanitize_stem("My Note"), "MyNote");
        assert_eq!(sanitize_stem("notes/日記 #1!"), "notes1");
        assert_eq!(sanitize_stem("a_b-c.d"), "a_b-c.d");
        assert_eq!(sanitize_stem("   "), "img");
    }

    #[test]
    fn test_optimized_name() {
        assert_eq!(
            optimized_name("My Note", "deadbeef"),
            "MyNote-deadbeef.jpg"
        );
    }

    #[test]
    fn test_optimize_png_within_budget() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("small.png");
        noise_image(64, 64).save(&path).unwrap();

        let optimized = optimize(&path).unwrap();
        assert!(optimized.bytes.len() <= SIZE_BUDGET);
        assert!(!optimized.over_budget);
        assert_eq!(optimized.quality, Some(INITIAL_QUALITY));
        // Output must decode as JPEG
        let format = image::guess_format(&optimized.bytes).unwrap();
        assert_eq!(format, image::ImageFormat::Jpeg);
    }

    #[test]
    fn test_optimize_keeps_small_jpeg_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.jpg");
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, 80)
            .encode_image(&noise_image(32, 32))
            .unwrap();
        std::fs::write(&path, &bytes).unwrap();

        let optimized = optimize(&path).unwrap();
        assert_eq!(optimized.quality, None);
        assert_eq!(optimized.bytes, bytes);
    }

    #[test]
    fn test_optimize_corrupt_file_fails_with_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image at all").unwrap();

        let result = optimize(&path);
        assert!(matches!(result, Err(CleanupError::Decode { .. })));
    }

    #[test]
    fn test_flatten_alpha_onto_white() {
        let rgba = image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 0]));
        let rgb = flatten_to_rgb(DynamicImage::ImageRgba8(rgba));
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([255, 255, 255]));

        let rgba = image::RgbaImage::from_pixel(1, 1, image::Rgba([10, 20, 30, 255]));
        let rgb = flatten_to_rgb(DynamicImage::ImageRgba8(rgba));
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_next_quality_schedule() {
        assert_eq!(next_quality(95, SIZE_BUDGET * 3, SIZE_BUDGET), 85);
        assert_eq!(
            next_quality(95, SIZE_BUDGET + SIZE_BUDGET * 3 / 4, SIZE_BUDGET),
            90
        );
        assert_eq!(next_quality(95, SIZE_BUDGET + 100, SIZE_BUDGET), 92);
        // Never goes below the floor
        assert_eq!(next_quality(12, SIZE_BUDGET * 10, SIZE_BUDGET), QUALITY_FLOOR);
    }

    #[test]
    fn test_quality_floor_accepts_over_budget_result() {
        // Noise at the floor quality cannot fit a budget this small, so the
        // loop must walk all the way down and accept the result anyway.
        let rgb = noise_image(64, 64);
        let (bytes, quality, over_budget) =
            encode_under_budget(&rgb, Path::new("noise.jpg"), 256).unwrap();

        assert_eq!(quality, QUALITY_FLOOR);
        assert!(over_budget);
        assert!(bytes.len() > 256);
        // Floor output is still a valid JPEG
        let format = image::guess_format(&bytes).unwrap();
        assert_eq!(format, image::ImageFormat::Jpeg);
    }

    #[test]
    fn test_is_already_optimized_roundtrip() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("photo.png");
        noise_image(64, 64).save(&source).unwrap();

        let optimized = optimize(&source).unwrap();
        let name = optimized_name("note", &optimized.hash());
        let target = dir.path().join(&name);
        std::fs::write(&target, &optimized.bytes).unwrap();

        assert!(is_already_optimized(&target));
        assert!(!is_already_optimized(&source));
    }

    #[test]
    fn test_is_already_optimized_rejects_wrong_hash() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("note-00000000.jpg");
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, 80)
            .encode_image(&noise_image(16, 16))
            .unwrap();
        std::fs::write(&path, &bytes).unwrap();

        assert!(!is_already_optimized(&path));
    }

    #[test]
    fn test_is_already_optimized_rejects_plain_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, b"\xff\xd8\xff").unwrap();
        assert!(!is_already_optimized(&path));
    }
}
