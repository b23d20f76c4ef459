//! The in-memory pixel grid every stage consumes and produces.

use crate::error::{Result, TransformError};

/// Number of samples per pixel inside the pipeline.
pub const RGB_CHANNELS: usize = 3;

/// Samples per pixel of an RGBA buffer, accepted at construction time only.
pub const RGBA_CHANNELS: usize = 4;

/// An 8-bit RGB image.
///
/// The sample buffer is row-major, 3 bytes per pixel, and its length is always
/// `width * height * 3`. Both dimensions are at least 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) pixels: Vec<u8>,
}

impl RasterImage {
    /// Create an image from RGB sample data.
    ///
    /// # Errors
    ///
    /// Returns `TransformError::UnsupportedImageFormat` if a dimension is zero
    /// or the buffer length does not match `width * height * 3`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        Self::from_samples(width, height, RGB_CHANNELS, pixels)
    }

    /// Create an image from interleaved samples with 3 (RGB) or 4 (RGBA) channels.
    ///
    /// RGBA input has its alpha channel dropped, so the result is always RGB.
    ///
    /// # Errors
    ///
    /// Returns `TransformError::UnsupportedImageFormat` for any other channel
    /// count, zero dimensions or a buffer of the wrong length.
    pub fn from_samples(width: u32, height: u32, channels: usize, samples: Vec<u8>) -> Result<Self> {
        if channels != RGB_CHANNELS && channels != RGBA_CHANNELS {
            return Err(TransformError::UnsupportedImageFormat {
                channels,
                reason: "expected 3 (RGB) or 4 (RGBA) channels".to_string(),
            });
        }
        if width == 0 || height == 0 {
            return Err(TransformError::UnsupportedImageFormat {
                channels,
                reason: format!("empty image {}x{}", width, height),
            });
        }

        let expected = width as usize * height as usize * channels;
        if samples.len() != expected {
            return Err(TransformError::UnsupportedImageFormat {
                channels,
                reason: format!("expected {} samples, got {}", expected, samples.len()),
            });
        }

        let pixels = if channels == RGBA_CHANNELS {
            samples
                .chunks_exact(RGBA_CHANNELS)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect()
        } else {
            samples
        };

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create an image where every pixel has the same color.
    ///
    /// Zero dimensions are raised to 1.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let pixels = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * RGB_CHANNELS)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Internal constructor for stages that build correctly-sized buffers.
    pub(crate) fn from_parts(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * RGB_CHANNELS,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a RasterImage from an image::RgbImage.
    ///
    /// # Errors
    ///
    /// Fails for a zero-sized buffer.
    pub fn from_rgb_image(img: image::RgbImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }

    /// Convert any decoded image into the pipeline's RGB form.
    ///
    /// Transparency is discarded; grayscale and 16-bit sources are expanded
    /// to 8-bit RGB.
    pub fn from_dynamic(img: &image::DynamicImage) -> Result<Self> {
        match img {
            image::DynamicImage::ImageRgba8(rgba) => {
                let (width, height) = rgba.dimensions();
                Self::from_samples(width, height, RGBA_CHANNELS, rgba.as_raw().clone())
            }
            other => Self::from_rgb_image(other.to_rgb8()),
        }
    }

    /// Convert to an image::RgbImage for further processing.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Always 3: alpha is stripped on construction.
    pub fn channels(&self) -> usize {
        RGB_CHANNELS
    }

    /// RGB sample data in row-major order.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Get the RGB value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = (y as usize * self.width as usize + x as usize) * RGB_CHANNELS;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
