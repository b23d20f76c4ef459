//! Photometric stages: brightness, contrast and hue/saturation.
//!
//! Each function takes the source image by reference and returns a new image.
//! Arithmetic is done in `f64` and every sample is rounded and clamped back
//! to `0..=255`. A neutral magnitude returns an exact copy.

use serde::{Deserialize, Serialize};

use crate::raster::RasterImage;

/// Center value used by the contrast stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContrastPivot {
    /// Whole-image mean of each channel.
    #[default]
    ChannelMean,
    /// Fixed 127.5 for every channel.
    Midpoint,
}

/// Hue degrees per unit of offset; an offset of 255 is one full turn.
const HUE_DEGREES_PER_UNIT: f64 = 360.0 / 255.0;

#[inline]
fn to_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn map_samples(image: &RasterImage, f: impl Fn(usize, u8) -> u8) -> RasterImage {
    let pixels = image
        .pixels
        .iter()
        .enumerate()
        .map(|(i, &v)| f(i % 3, v))
        .collect();
    RasterImage::from_parts(image.width, image.height, pixels)
}

/// Multiply every sample by `factor`.
///
/// Formula: `output = clamp(round(input * factor))`
///
/// # Example
///
/// ```ignore
/// let img = RasterImage::filled(1, 1, [100, 200, 0]);
/// let out = apply_brightness(&img, 2.0);
/// assert_eq!(out.pixel(0, 0), [200, 255, 0]);
/// ```
pub fn apply_brightness(image: &RasterImage, factor: f64) -> RasterImage {
    if factor == 1.0 {
        return image.clone();
    }
    map_samples(image, |_, v| to_u8(v as f64 * factor))
}

/// Scale each channel around its pivot.
///
/// Formula: `output = pivot + factor * (input - pivot)`
pub fn apply_contrast(image: &RasterImage, factor: f64, pivot: ContrastPivot) -> RasterImage {
    if factor == 1.0 {
        return image.clone();
    }
    let centers = match pivot {
        ContrastPivot::ChannelMean => channel_means(image),
        ContrastPivot::Midpoint => [127.5; 3],
    };
    map_samples(image, |c, v| {
        let center = centers[c];
        to_u8(center + factor * (v as f64 - center))
    })
}

/// Per-channel mean over the whole image.
pub fn channel_means(image: &RasterImage) -> [f64; 3] {
    let mut sums = [0u64; 3];
    for px in image.pixels.chunks_exact(3) {
        sums[0] += px[0] as u64;
        sums[1] += px[1] as u64;
        sums[2] += px[2] as u64;
    }
    let n = image.pixel_count().max(1) as f64;
    [sums[0] as f64 / n, sums[1] as f64 / n, sums[2] as f64 / n]
}

/// Shift hue and saturation in HSV space by the same `offset`.
///
/// Saturation is treated on a 0-255 scale: `offset` is added and the result
/// clamped. Hue rotates by `offset * 360 / 255` degrees and wraps around the
/// color wheel. Value is untouched.
pub fn apply_hue_saturation(image: &RasterImage, offset: f64) -> RasterImage {
    if offset == 0.0 {
        return image.clone();
    }
    let hue_shift = offset * HUE_DEGREES_PER_UNIT;

    let mut pixels = Vec::with_capacity(image.pixels.len());
    for px in image.pixels.chunks_exact(3) {
        let (h, s, v) = rgb_to_hsv(px[0], px[1], px[2]);
        let h = (h + hue_shift).rem_euclid(360.0);
        let s = ((s * 255.0 + offset).clamp(0.0, 255.0)) / 255.0;
        let (r, g, b) = hsv_to_rgb(h, s, v);
        pixels.extend_from_slice(&[to_u8(r * 255.0), to_u8(g * 255.0), to_u8(b * 255.0)]);
    }
    RasterImage::from_parts(image.width, image.height, pixels)
}

/// Convert 8-bit RGB to HSV with hue in degrees `[0, 360)` and s, v in `[0, 1]`.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max == 0.0 { 0.0 } else { delta / max };

    (h, s, max)
}

/// Convert HSV back to normalized RGB in `[0, 1]`.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    let c = v * s;
    let hp = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    (r + m, g + m, b + m)
}
