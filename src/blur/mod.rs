mod lanes;
mod transpose_pass;

use std::sync::OnceLock;

use crate::kernel::{Kernel, KERNEL_RADIUS};
use crate::BlurError;

/// Smallest row length (and, for a full blur, column length) that reflect
/// padding can serve: the outermost tap at offset `-KERNEL_RADIUS` mirrors to
/// index `KERNEL_RADIUS`, which must exist.
pub const MIN_DIMENSION: usize = KERNEL_RADIUS + 1;

/// Vector width used for the convolution inner loop.
///
/// All backends compute the same convolution. Output is identical or within
/// one step per channel, from float summation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Plain `f32` per-channel loop, no vector types.
    Scalar,
    /// 128-bit lanes (`f32x4`): one pixel per multiply-add.
    Simd128,
    /// 256-bit lanes (`f32x8`): two pixels per multiply-add.
    Simd256,
}

impl Backend {
    /// Picks the widest backend the running CPU executes natively.
    ///
    /// The answer is computed once and cached for the life of the process.
    #[must_use]
    pub fn detect() -> Self {
        static DETECTED: OnceLock<Backend> = OnceLock::new();
        *DETECTED.get_or_init(|| {
            let backend = if has_native_256() {
                Backend::Simd256
            } else {
                Backend::Simd128
            };
            log::debug!("selected {:?} blur backend", backend);
            backend
        })
    }

    /// Register width in bits, or `None` for [`Backend::Scalar`].
    #[must_use]
    pub const fn lane_bits(self) -> Option<usize> {
        match self {
            Backend::Scalar => None,
            Backend::Simd128 => Some(128),
            Backend::Simd256 => Some(256),
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::detect()
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn has_native_256() -> bool {
    is_x86_feature_detected!("avx")
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn has_native_256() -> bool {
    false
}

/// Blur settings: Gaussian sigma plus the backend that runs the passes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlurConfig {
    pub sigma: f32,
    pub backend: Backend,
}

impl BlurConfig {
    /// Uses the backend from [`Backend::detect`].
    #[must_use]
    pub fn new(sigma: f32) -> Self {
        Self {
            sigma,
            backend: Backend::detect(),
        }
    }

    #[must_use]
    pub fn scalar(sigma: f32) -> Self {
        Self::new(sigma).with_backend(Backend::Scalar)
    }

    #[must_use]
    pub fn simd128(sigma: f32) -> Self {
        Self::new(sigma).with_backend(Backend::Simd128)
    }

    #[must_use]
    pub fn simd256(sigma: f32) -> Self {
        Self::new(sigma).with_backend(Backend::Simd256)
    }

    #[must_use]
    pub const fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }
}

fn pixel_count(width: usize, height: usize) -> Result<usize, BlurError> {
    width
        .checked_mul(height)
        .ok_or(BlurError::DimensionOverflow { width, height })
}

fn check_len(buffer: &[u32], expected: usize) -> Result<(), BlurError> {
    if buffer.len() != expected {
        return Err(BlurError::BufferSizeMismatch {
            expected,
            actual: buffer.len(),
        });
    }
    Ok(())
}

/// Checks the dimensions of a full (two-pass) blur.
fn validate_blur(width: usize, height: usize) -> Result<usize, BlurError> {
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return Err(BlurError::ImageTooSmall {
            width,
            height,
            min: MIN_DIMENSION,
        });
    }
    pixel_count(width, height)
}

#[inline]
fn run_pass(
    backend: Backend,
    src: &[u32],
    dst: &mut [u32],
    kernel: &Kernel,
    width: usize,
    height: usize,
) {
    match backend {
        Backend::Scalar => transpose_pass::pass_scalar(src, dst, kernel, width, height),
        Backend::Simd128 => transpose_pass::pass_simd128(src, dst, kernel, width, height),
        Backend::Simd256 => transpose_pass::pass_simd256(src, dst, kernel, width, height),
    }
}

/// Convolves each row of `src` with `kernel` and writes the result transposed.
///
/// `src` is `width` pixels wide and `height` rows tall. The output pixel for
/// source `(row, column)` lands at `dst[height * column + row]`, so `dst`
/// reads as a `height`-wide, `width`-tall image. Pixels closer than
/// [`KERNEL_RADIUS`] to the left or right edge are convolved with reflected
/// neighbours.
///
/// # Errors
/// - [`BlurError::ImageTooSmall`] if `width < MIN_DIMENSION` or `height == 0`
/// - [`BlurError::DimensionOverflow`] if `width * height` overflows
/// - [`BlurError::BufferSizeMismatch`] if either buffer is not `width * height` long
pub fn horizontal_pass(
    src: &[u32],
    dst: &mut [u32],
    kernel: &Kernel,
    width: usize,
    height: usize,
    backend: Backend,
) -> Result<(), BlurError> {
    if width < MIN_DIMENSION || height == 0 {
        return Err(BlurError::ImageTooSmall {
            width,
            height,
            min: MIN_DIMENSION,
        });
    }
    let len = pixel_count(width, height)?;
    check_len(src, len)?;
    check_len(dst, len)?;

    run_pass(backend, src, dst, kernel, width, height);
    Ok(())
}

/// Blurs `image` in place, using `scratch` for the transposed intermediate.
///
/// Pass one convolves rows of `image` into `scratch`; pass two convolves rows
/// of `scratch` (the original columns) back into `image`, which restores the
/// original orientation. `scratch` is overwritten.
///
/// # Errors
/// - [`BlurError::InvalidSigma`] if `config.sigma` is not positive and finite
/// - [`BlurError::ImageTooSmall`] if either dimension is below [`MIN_DIMENSION`]
/// - [`BlurError::DimensionOverflow`] if `width * height` overflows
/// - [`BlurError::BufferSizeMismatch`] if either buffer is not `width * height` long
pub fn blur(
    image: &mut [u32],
    scratch: &mut [u32],
    width: usize,
    height: usize,
    config: &BlurConfig,
) -> Result<(), BlurError> {
    let kernel = Kernel::new(config.sigma)?;
    let len = validate_blur(width, height)?;
    check_len(image, len)?;
    check_len(scratch, len)?;

    log::trace!(
        "blur {}x{} sigma={} backend={:?}",
        width,
        height,
        config.sigma,
        config.backend
    );
    run_pass(config.backend, image, scratch, &kernel, width, height);
    run_pass(config.backend, scratch, image, &kernel, height, width);
    Ok(())
}

/// [`blur`] on 128-bit lanes.
///
/// # Errors
/// Same as [`blur`].
pub fn blur_simd128(
    image: &mut [u32],
    scratch: &mut [u32],
    width: usize,
    height: usize,
    sigma: f32,
) -> Result<(), BlurError> {
    blur(image, scratch, width, height, &BlurConfig::simd128(sigma))
}

/// [`blur`] on 256-bit lanes.
///
/// # Errors
/// Same as [`blur`].
pub fn blur_simd256(
    image: &mut [u32],
    scratch: &mut [u32],
    width: usize,
    height: usize,
    sigma: f32,
) -> Result<(), BlurError> {
    blur(image, scratch, width, height, &BlurConfig::simd256(sigma))
}

/// Structure handling image blur.
///
/// Owns the scratch buffer for the transposed intermediate so repeated blurs
/// of same-sized images do not allocate.
///
/// Note that the width and height of the image passed to [blur][Self::blur] needs to exactly
/// match the width and height of this instance. If you reduce the image size (e.g. via
/// downscaling), [`shrink_to`][Self::shrink_to] can be used to resize the internal buffer.
pub struct Blur {
    scratch: Vec<u32>,
    backend: Backend,
    width: usize,
    height: usize,
}

impl Blur {
    /// Create a new [Blur] for images of the given width and height.
    /// This pre-allocates the scratch buffer and picks [`Backend::detect`].
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_backend(width, height, Backend::detect())
    }

    /// Like [`Blur::new`] with an explicit backend.
    ///
    /// Dimensions whose product overflows allocate nothing; the error is
    /// reported by the first [`blur`][Self::blur] call.
    #[must_use]
    pub fn with_backend(width: usize, height: usize, backend: Backend) -> Self {
        Blur {
            scratch: vec![0; width.checked_mul(height).unwrap_or(0)],
            backend,
            width,
            height,
        }
    }

    /// Truncates the scratch buffer to fit images of the given width and height.
    ///
    /// This will [truncate][Vec::truncate] the internal buffer
    /// without affecting the allocated memory.
    pub fn shrink_to(&mut self, width: usize, height: usize) {
        self.scratch.truncate(width.saturating_mul(height));
        self.width = width;
        self.height = height;
    }

    #[must_use]
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Blur `image` in place.
    ///
    /// # Errors
    /// Same as [`blur`](crate::blur()).
    pub fn blur(&mut self, image: &mut [u32], sigma: f32) -> Result<(), BlurError> {
        let config = BlurConfig::new(sigma).with_backend(self.backend);
        blur(image, &mut self.scratch, self.width, self.height, &config)
    }

    /// Blur `src` into `dst`, leaving `src` untouched.
    ///
    /// # Errors
    /// Same as [`blur`](crate::blur()).
    pub fn blur_into(
        &mut self,
        src: &[u32],
        dst: &mut [u32],
        sigma: f32,
    ) -> Result<(), BlurError> {
        let kernel = Kernel::new(sigma)?;
        let len = validate_blur(self.width, self.height)?;
        check_len(src, len)?;
        check_len(dst, len)?;
        check_len(&self.scratch, len)?;

        let (width, height) = (self.width, self.height);
        run_pass(self.backend, src, &mut self.scratch, &kernel, width, height);
        run_pass(self.backend, &self.scratch, dst, &kernel, height, width);
        Ok(())
    }
}
