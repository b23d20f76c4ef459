//! Bilinear sampling with an explicit edge fill policy.
//!
//! Coordinates are continuous: pixel `(i, j)` covers `[i, i+1) x [j, j+1)` and
//! its center sits at `(i + 0.5, j + 0.5)`. A sample point inside the image
//! area is interpolated from the four nearest pixel centers; a point outside
//! it is resolved by [`FillMode`].

use serde::{Deserialize, Serialize};

use crate::raster::RasterImage;

/// What geometric stages paint where no source pixel maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FillMode {
    /// A constant color.
    Constant { rgb: [u8; 3] },
    /// The nearest edge pixel.
    Replicate,
}

impl Default for FillMode {
    /// Black.
    fn default() -> Self {
        FillMode::Constant { rgb: [0, 0, 0] }
    }
}

impl FillMode {
    pub const BLACK: FillMode = FillMode::Constant { rgb: [0, 0, 0] };
}

#[inline]
fn get_pixel_f64(image: &RasterImage, px: usize, py: usize) -> [f64; 3] {
    let idx = (py * image.width as usize + px) * 3;
    [
        image.pixels[idx] as f64,
        image.pixels[idx + 1] as f64,
        image.pixels[idx + 2] as f64,
    ]
}

/// Sample the image at continuous coordinates `(x, y)`.
pub fn sample_bilinear(image: &RasterImage, x: f64, y: f64, fill: FillMode) -> [u8; 3] {
    let (w, h) = (image.width as f64, image.height as f64);

    if let FillMode::Constant { rgb } = fill {
        if !(0.0..=w).contains(&x) || !(0.0..=h).contains(&y) {
            return rgb;
        }
    }

    // Shift from area coordinates to pixel-center coordinates
    let sx = x - 0.5;
    let sy = y - 0.5;

    let max_x = image.width as i64 - 1;
    let max_y = image.height as i64 - 1;

    let fx0 = sx.floor();
    let fy0 = sy.floor();
    // Fractional distances
    let fx = (sx - fx0).clamp(0.0, 1.0);
    let fy = (sy - fy0).clamp(0.0, 1.0);

    let clamp_x = |v: f64| (v as i64).clamp(0, max_x) as usize;
    let clamp_y = |v: f64| (v as i64).clamp(0, max_y) as usize;
    let x0 = clamp_x(fx0);
    let x1 = clamp_x(fx0 + 1.0);
    let y0 = clamp_y(fy0);
    let y1 = clamp_y(fy0 + 1.0);

    let p00 = get_pixel_f64(image, x0, y0);
    let p10 = get_pixel_f64(image, x1, y0);
    let p01 = get_pixel_f64(image, x0, y1);
    let p11 = get_pixel_f64(image, x1, y1);

    // Bilinear interpolation formula
    let mut result = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.round().clamp(0.0, 255.0) as u8;
    }

    result
}
