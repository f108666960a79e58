//! Dominant display-color extraction for uploaded images.
//!
//! Categories and stories carry a single representative color derived from
//! their artwork, used by clients for placeholder backgrounds. The
//! extractor favors saturated mid-lightness pixels over background grays,
//! so a photo with a small vivid subject still yields a usable accent
//! color rather than the average of its backdrop.

use std::collections::HashMap;

use crate::error::CoreError;

/// Color recorded when no image is supplied or extraction fails.
pub const FALLBACK_COLOR: &str = "#000000";

/// Images are downscaled to at most this many pixels per side before
/// sampling. Keeps extraction cheap for large uploads.
const SAMPLE_SIZE: u32 = 64;

/// Bits kept per channel when bucketing similar colors together.
const QUANT_BITS: u32 = 4;

#[derive(Default)]
struct Bucket {
    weight: f32,
    r: u64,
    g: u64,
    b: u64,
    count: u64,
}

/// Derive the dominant color of an encoded image as a `#rrggbb` hex string.
///
/// Returns `Validation` when the bytes are not a decodable image; callers
/// on the upload path treat that as "no color" and fall back to
/// [`FALLBACK_COLOR`] rather than failing the whole operation.
pub fn dominant_color(bytes: &[u8]) -> Result<String, CoreError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| CoreError::Validation(format!("unreadable image: {e}")))?;
    let small = img.thumbnail(SAMPLE_SIZE, SAMPLE_SIZE).to_rgb8();

    let mut buckets: HashMap<u16, Bucket> = HashMap::new();
    for pixel in small.pixels() {
        let [r, g, b] = pixel.0;
        let bucket = buckets.entry(quantize(r, g, b)).or_default();
        bucket.weight += pixel_weight(r, g, b);
        bucket.r += u64::from(r);
        bucket.g += u64::from(g);
        bucket.b += u64::from(b);
        bucket.count += 1;
    }

    let best = buckets
        .into_values()
        .max_by(|a, b| a.weight.total_cmp(&b.weight));

    match best {
        Some(bucket) if bucket.count > 0 => {
            let r = (bucket.r / bucket.count) as u8;
            let g = (bucket.g / bucket.count) as u8;
            let b = (bucket.b / bucket.count) as u8;
            Ok(format!("#{r:02x}{g:02x}{b:02x}"))
        }
        _ => Ok(FALLBACK_COLOR.to_string()),
    }
}

fn quantize(r: u8, g: u8, b: u8) -> u16 {
    let shift = 8 - QUANT_BITS;
    (u16::from(r >> shift) << (2 * QUANT_BITS))
        | (u16::from(g >> shift) << QUANT_BITS)
        | u16::from(b >> shift)
}

/// Weight a pixel by how "swatch-like" it is: saturated colors count more,
/// near-black and near-white pixels count less.
fn pixel_weight(r: u8, g: u8, b: u8) -> f32 {
    let max = r.max(g).max(b) as f32 / 255.0;
    let min = r.min(g).min(b) as f32 / 255.0;
    let lightness = (max + min) / 2.0;
    let saturation = if max > 0.0 { (max - min) / max } else { 0.0 };

    // Parabolic falloff toward pure black/white; 1.0 at mid-lightness.
    let balance = 1.0 - (2.0 * lightness - 1.0).powi(2);
    0.05 + saturation * 2.0 * balance.max(0.0)
}
