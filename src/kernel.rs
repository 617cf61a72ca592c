//! Fixed-size 1-D Gaussian kernel.
//!
//! Both passes of the blur use the same 7-tap kernel; the vertical direction
//! is handled by transposing the image between passes, not by a second kernel.

use num_traits::{Float, FloatConst};

use crate::BlurError;

/// Number of taps in the convolution kernel.
pub const KERNEL_SIZE: usize = 7;

/// Distance from the center tap to either end of the kernel.
pub const KERNEL_RADIUS: usize = KERNEL_SIZE / 2;

/// Computes normalized Gaussian weights for the given sigma.
///
/// Tap `i` samples the Gaussian at `x = KERNEL_RADIUS - i`, so the result is
/// symmetric (`w[i] == w[KERNEL_SIZE - 1 - i]`). The weights are divided by
/// their sum afterwards, which makes them add up to one even though the
/// Gaussian is truncated at the kernel radius.
///
/// `sigma` is not validated here; use [`Kernel::new`] for checked input.
#[must_use]
pub fn gaussian_weights<F>(sigma: F) -> [F; KERNEL_SIZE]
where
    F: Float + FloatConst + From<i8>,
{
    let two_sigma_sq = (F::one() + F::one()) * sigma * sigma;
    let coeff = F::one() / (F::PI() * two_sigma_sq).sqrt();

    let mut weights = [F::zero(); KERNEL_SIZE];
    for (i, weight) in weights.iter_mut().enumerate() {
        let x: F = (KERNEL_RADIUS as i8 - i as i8).into();
        *weight = coeff * (-(x * x) / two_sigma_sq).exp();
    }

    let sum = weights.iter().fold(F::zero(), |acc, &w| acc + w);
    weights.iter_mut().for_each(|w| *w = *w / sum);
    weights
}

/// A 7-tap convolution kernel shared by both blur passes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kernel {
    weights: [f32; KERNEL_SIZE],
}

impl Kernel {
    /// Builds a normalized Gaussian kernel.
    ///
    /// # Errors
    /// Returns [`BlurError::InvalidSigma`] if `sigma` is not positive and finite.
    pub fn new(sigma: f32) -> Result<Self, BlurError> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(BlurError::InvalidSigma(sigma));
        }
        Ok(Self {
            weights: gaussian_weights(sigma),
        })
    }

    /// Wraps caller-supplied weights as-is.
    ///
    /// The weights are not normalized. Sums above one brighten the image and
    /// negative weights darken it; either way every channel saturates to
    /// `0..=255` instead of wrapping.
    #[must_use]
    pub const fn from_weights(weights: [f32; KERNEL_SIZE]) -> Self {
        Self { weights }
    }

    /// Uniform averaging kernel.
    #[must_use]
    pub fn box_filter() -> Self {
        Self {
            weights: [1.0 / KERNEL_SIZE as f32; KERNEL_SIZE],
        }
    }

    /// Returns the kernel weights, leftmost tap first.
    #[must_use]
    pub const fn weights(&self) -> &[f32; KERNEL_SIZE] {
        &self.weights
    }
}
