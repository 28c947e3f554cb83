//! Image preprocessing for OCR.

use std::path::Path;

use image::{GrayImage, Luma};
use tracing::debug;

use crate::error::InvexError;
use crate::models::config::PreprocessConfig;

/// Binarizes and denoises grayscale scans before recognition.
///
/// Two fixed steps: Gaussian-weighted adaptive thresholding, which copes with
/// uneven illumination across the page, followed by a small Gaussian blur to
/// soften speckle left by binarization.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePreprocessor {
    /// Adaptive threshold neighbourhood size.
    block_size: u32,
    /// Constant subtracted from the weighted local mean.
    offset: f32,
    /// Blur kernel size.
    blur_kernel: u32,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings (block 11, offset 2, 3x3 blur).
    pub fn new() -> Self {
        Self {
            block_size: 11,
            offset: 2.0,
            blur_kernel: 3,
        }
    }

    /// Create a preprocessor from configuration, rejecting even or too small kernels.
    pub fn from_config(config: &PreprocessConfig) -> Result<Self, InvexError> {
        check_kernel("block_size", config.block_size)?;
        check_kernel("blur_kernel", config.blur_kernel)?;

        Ok(Self {
            block_size: config.block_size,
            offset: config.offset,
            blur_kernel: config.blur_kernel,
        })
    }

    /// Load an image file as grayscale and preprocess it.
    pub fn load(&self, path: &Path) -> Result<GrayImage, InvexError> {
        let image = image::open(path)?.to_luma8();
        Ok(self.preprocess(&image))
    }

    /// Threshold then blur. Output has the input dimensions.
    pub fn preprocess(&self, image: &GrayImage) -> GrayImage {
        let (width, height) = image.dimensions();
        debug!(
            "Preprocessing {}x{} image (block={}, offset={}, blur={})",
            width, height, self.block_size, self.offset, self.blur_kernel
        );

        let binary = self.adaptive_threshold(image);
        self.blur(&binary)
    }

    fn adaptive_threshold(&self, image: &GrayImage) -> GrayImage {
        let (width, height) = image.dimensions();
        let kernel = gaussian_kernel(self.block_size);
        let local_mean = convolve_separable(image, &kernel, Border::Replicate);

        let mut result = GrayImage::new(width, height);
        for (x, y, pixel) in image.enumerate_pixels() {
            // The weighted mean is rounded to a pixel value before comparison.
            let mean = local_mean[(y * width + x) as usize].round();
            let output = if pixel[0] as f32 > mean - self.offset { 255 } else { 0 };
            result.put_pixel(x, y, Luma([output]));
        }

        result
    }

    fn blur(&self, image: &GrayImage) -> GrayImage {
        let (width, height) = image.dimensions();
        let kernel = gaussian_kernel(self.blur_kernel);
        let blurred = convolve_separable(image, &kernel, Border::Reflect101);

        GrayImage::from_fn(width, height, |x, y| {
            let value = blurred[(y * width + x) as usize].round().clamp(0.0, 255.0);
            Luma([value as u8])
        })
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

fn check_kernel(name: &str, size: u32) -> Result<(), InvexError> {
    if size < 3 || size % 2 == 0 {
        return Err(InvexError::Config(format!(
            "preprocessing.{} must be odd and at least 3, got {}",
            name, size
        )));
    }
    Ok(())
}

/// Normalized 1-D Gaussian weights for an odd kernel size.
///
/// Sigma is derived from the size: `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
fn gaussian_kernel(size: u32) -> Vec<f32> {
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f32;

    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// How out-of-range taps are mapped back into the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Border {
    /// `aaa|abcd|ddd`
    Replicate,
    /// `dcb|abcd|cba`, the edge pixel itself is not repeated.
    Reflect101,
}

impl Border {
    fn index(self, i: i64, len: i64) -> i64 {
        match self {
            Border::Replicate => i.clamp(0, len - 1),
            Border::Reflect101 if len == 1 => 0,
            Border::Reflect101 => {
                let period = 2 * (len - 1);
                let m = i.rem_euclid(period);
                if m < len { m } else { period - m }
            }
        }
    }
}

/// Convolve rows then columns with the same kernel. Returns a row-major
/// plane of the filtered values.
fn convolve_separable(image: &GrayImage, kernel: &[f32], border: Border) -> Vec<f32> {
    let (width, height) = image.dimensions();
    let (w, h) = (width as i64, height as i64);
    let half = (kernel.len() / 2) as i64;

    let mut horizontal = vec![0.0f32; (width * height) as usize];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = border.index(x + k as i64 - half, w);
                acc += weight * image.get_pixel(sx as u32, y as u32)[0] as f32;
            }
            horizontal[(y * w + x) as usize] = acc;
        }
    }

    let mut output = vec![0.0f32; (width * height) as usize];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, weight) in kernel.iter().enumerate() {
                let sy = border.index(y + k as i64 - half, h);
                acc += weight * horizontal[(sy * w + x) as usize];
            }
            output[(y * w + x) as usize] = acc;
        }
    }

    output
}
