//! Canvas-preserving affine warps: translate, shear and scale.
//!
//! Warps use inverse mapping: for each destination pixel center we compute
//! the source point it came from and sample it with [`sample_bilinear`].
//! The output always has the input's dimensions.
//!
//! Forward transforms are expressed in continuous image coordinates with the
//! origin at the top-left corner and y pointing down:
//!
//! ```text
//! x' = a*x + b*y + c
//! y' = d*x + e*y + f
//! ```

use super::sample::{sample_bilinear, FillMode};
use crate::raster::RasterImage;

/// 2D affine map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 0.0,
        e: 1.0,
        f: 0.0,
    };

    pub fn translation(tx: f64, ty: f64) -> Self {
        Affine {
            c: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    /// Counter-clockwise rotation (as seen on screen) about `(cx, cy)`.
    pub fn rotation_about(angle_degrees: f64, cx: f64, cy: f64) -> Self {
        let (sin, cos) = angle_degrees.to_radians().sin_cos();
        Affine {
            a: cos,
            b: sin,
            c: cx - cos * cx - sin * cy,
            d: -sin,
            e: cos,
            f: cy + sin * cx - cos * cy,
        }
    }

    /// Horizontal shear about the row `cy`: `x' = x + tan(angle) * (y - cy)`.
    pub fn shear_x_about(angle_degrees: f64, cy: f64) -> Self {
        let k = angle_degrees.to_radians().tan();
        Affine {
            b: k,
            c: -k * cy,
            ..Self::IDENTITY
        }
    }

    /// Uniform scale about `(cx, cy)`.
    pub fn scale_about(s: f64, cx: f64, cy: f64) -> Self {
        Affine {
            a: s,
            c: cx - s * cx,
            e: s,
            f: cy - s * cy,
            ..Self::IDENTITY
        }
    }

    /// Apply the map to a point.
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.b * y + self.c,
            self.d * x + self.e * y + self.f,
        )
    }

    /// Inverse map, or `None` when the linear part is singular.
    pub fn inverse(&self) -> Option<Affine> {
        let det = self.a * self.e - self.b * self.d;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let a = self.e / det;
        let b = -self.b / det;
        let d = -self.d / det;
        let e = self.a / det;
        Some(Affine {
            a,
            b,
            c: -(a * self.c + b * self.f),
            d,
            e,
            f: -(d * self.c + e * self.f),
        })
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Warp an image by a forward affine map, keeping its canvas size.
///
/// A singular map collapses the content to a line or point, so the output is
/// uniform: the fill color, or the center pixel under [`FillMode::Replicate`].
pub fn warp_affine(image: &RasterImage, forward: &Affine, fill: FillMode) -> RasterImage {
    if forward.is_identity() {
        return image.clone();
    }

    let Some(inverse) = forward.inverse() else {
        let color = match fill {
            FillMode::Constant { rgb } => rgb,
            FillMode::Replicate => image.pixel(image.width / 2, image.height / 2),
        };
        return RasterImage::filled(image.width, image.height, color);
    };

    let (w, h) = (image.width, image.height);
    let mut output = vec![0u8; w as usize * h as usize * 3];

    for dst_y in 0..h {
        for dst_x in 0..w {
            let (src_x, src_y) = inverse.apply(dst_x as f64 + 0.5, dst_y as f64 + 0.5);
            let pixel = sample_bilinear(image, src_x, src_y, fill);

            let dst_idx = (dst_y as usize * w as usize + dst_x as usize) * 3;
            output[dst_idx..dst_idx + 3].copy_from_slice(&pixel);
        }
    }

    RasterImage::from_parts(w, h, output)
}

/// Move the content right by `fraction * width` and down by `fraction * height`.
pub fn apply_translate(image: &RasterImage, fraction: f64, fill: FillMode) -> RasterImage {
    if fraction == 0.0 {
        return image.clone();
    }
    let tx = fraction * image.width as f64;
    let ty = fraction * image.height as f64;
    warp_affine(image, &Affine::translation(tx, ty), fill)
}

/// Shear horizontally by `angle_degrees` about the image's middle row.
pub fn apply_shear(image: &RasterImage, angle_degrees: f64, fill: FillMode) -> RasterImage {
    if angle_degrees == 0.0 {
        return image.clone();
    }
    let cy = image.height as f64 / 2.0;
    warp_affine(image, &Affine::shear_x_about(angle_degrees, cy), fill)
}

/// Scale uniformly by `factor` about the image center.
pub fn apply_scale(image: &RasterImage, factor: f64, fill: FillMode) -> RasterImage {
    if factor == 1.0 {
        return image.clone();
    }
    let cx = image.width as f64 / 2.0;
    let cy = image.height as f64 / 2.0;
    warp_affine(image, &Affine::scale_about(factor, cx, cy), fill)
}
