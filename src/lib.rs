//! Separable Gaussian blur for packed 8-bit RGBA images.
//!
//! Pixels are `u32` values holding four 8-bit channels (RGBA, BGRA or any
//! other order; every channel, alpha included, is blurred the same way). The
//! blur is a fixed 7-tap Gaussian applied as two 1-D passes. Each pass
//! convolves rows and writes its output transposed, so the second pass
//! blurs the original columns and puts the image back in its original
//! orientation.
//!
//! Three interchangeable backends run the inner loop: 128-bit lanes
//! (`f32x4`), 256-bit lanes (`f32x8`) and a scalar baseline. They share one
//! generic implementation and agree to within one step per channel.
//!
//! # Example
//!
//! ```
//! use rgba_blur::{blur, BlurConfig};
//!
//! let (width, height) = (16, 16);
//! let mut image = vec![0u32; width * height];
//! image[8 * width + 8] = 0xffff_ffff;
//! let mut scratch = vec![0u32; width * height];
//!
//! blur(&mut image, &mut scratch, width, height, &BlurConfig::new(1.0)).unwrap();
//! assert!(image[8 * width + 8] < 0xffff_ffff);
//! assert_ne!(image[8 * width + 9], 0);
//! ```
//!
//! # Features
//!
//! - `rayon`: process each pass in parallel column blocks.

mod blur;
mod kernel;

pub use blur::{
    blur, blur_simd128, blur_simd256, horizontal_pass, Backend, Blur, BlurConfig, MIN_DIMENSION,
};
pub use kernel::{gaussian_weights, Kernel, KERNEL_RADIUS, KERNEL_SIZE};

use thiserror::Error;

/// Errors that can occur when blurring an image.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum BlurError {
    #[error("Sigma must be positive and finite, got {0}")]
    InvalidSigma(f32),

    #[error("Image of {width}x{height} is too small, each blurred axis needs at least {min} pixels")]
    ImageTooSmall {
        width: usize,
        height: usize,
        min: usize,
    },

    #[error("Buffer holds {actual} pixels, expected {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("Image dimensions {width}x{height} overflow usize")]
    DimensionOverflow { width: usize, height: usize },
}
