//! Lane-width abstraction for the convolution inner loop.
//!
//! A pixel is 4 channels, so a 128-bit `f32x4` holds exactly one widened
//! pixel and a 256-bit `f32x8` holds two. The convolution is written once
//! against [`PixelLanes`] and instantiated for both widths; the 7th tap that
//! does not fill a whole `f32x8` is accumulated on the 128-bit tail.

use wide::{f32x4, f32x8};

use crate::kernel::{Kernel, KERNEL_SIZE};

/// Widens a packed pixel to one `f32` per channel.
#[inline(always)]
pub(crate) fn unpack(pixel: u32) -> [f32; 4] {
    let [c0, c1, c2, c3] = pixel.to_le_bytes();
    [f32::from(c0), f32::from(c1), f32::from(c2), f32::from(c3)]
}

/// Saturates, rounds to nearest (ties to even) and repacks one pixel.
#[inline(always)]
pub(crate) fn pack(acc: f32x4) -> u32 {
    let clamped = acc.max(f32x4::splat(0.0)).min(f32x4::splat(255.0));
    let [c0, c1, c2, c3] = clamped.round_int().to_array();
    u32::from_le_bytes([c0 as u8, c1 as u8, c2 as u8, c3 as u8])
}

/// A vector of `f32` lanes holding [`PIXELS`](Self::PIXELS) widened pixels.
pub(crate) trait PixelLanes: Copy + Send + Sync {
    /// Pixels per vector.
    const PIXELS: usize;

    fn zero() -> Self;

    /// Broadcasts `weights[p]` across the channels of pixel slot `p`.
    fn splat_taps(weights: &[f32]) -> Self;

    /// Loads `pixels.len() == PIXELS` pixels.
    fn load(pixels: &[u32]) -> Self;

    /// `self * weights + acc`
    fn mul_add(self, weights: Self, acc: Self) -> Self;

    /// Sums the pixel slots into a single 4-channel vector.
    fn fold(self) -> f32x4;
}

impl PixelLanes for f32x4 {
    const PIXELS: usize = 1;

    #[inline(always)]
    fn zero() -> Self {
        f32x4::splat(0.0)
    }

    #[inline(always)]
    fn splat_taps(weights: &[f32]) -> Self {
        f32x4::splat(weights[0])
    }

    #[inline(always)]
    fn load(pixels: &[u32]) -> Self {
        f32x4::new(unpack(pixels[0]))
    }

    #[inline(always)]
    fn mul_add(self, weights: Self, acc: Self) -> Self {
        f32x4::mul_add(self, weights, acc)
    }

    #[inline(always)]
    fn fold(self) -> f32x4 {
        self
    }
}

impl PixelLanes for f32x8 {
    const PIXELS: usize = 2;

    #[inline(always)]
    fn zero() -> Self {
        f32x8::splat(0.0)
    }

    #[inline(always)]
    fn splat_taps(weights: &[f32]) -> Self {
        let (lo, hi) = (weights[0], weights[1]);
        f32x8::new([lo, lo, lo, lo, hi, hi, hi, hi])
    }

    #[inline(always)]
    fn load(pixels: &[u32]) -> Self {
        let [a0, a1, a2, a3] = unpack(pixels[0]);
        let [b0, b1, b2, b3] = unpack(pixels[1]);
        f32x8::new([a0, a1, a2, a3, b0, b1, b2, b3])
    }

    #[inline(always)]
    fn mul_add(self, weights: Self, acc: Self) -> Self {
        f32x8::mul_add(self, weights, acc)
    }

    #[inline(always)]
    fn fold(self) -> f32x4 {
        let v = self.to_array();
        f32x4::new([v[0], v[1], v[2], v[3]]) + f32x4::new([v[4], v[5], v[6], v[7]])
    }
}

/// Converts a pixel window into one output pixel.
pub(crate) trait Convolve: Sync {
    fn convolve(&self, window: &[u32; KERNEL_SIZE]) -> u32;
}

/// Kernel weights pre-broadcast for lane width `L`.
///
/// Only the first `KERNEL_SIZE / L::PIXELS` entries of `lanes` are used; the
/// remaining taps live in `tail` and go through the 128-bit path.
pub(crate) struct Taps<L: PixelLanes> {
    lanes: [L; KERNEL_SIZE],
    tail: [f32; KERNEL_SIZE],
    full: usize,
}

impl<L: PixelLanes> Taps<L> {
    pub(crate) fn new(kernel: &Kernel) -> Self {
        let weights = kernel.weights();
        let full = KERNEL_SIZE / L::PIXELS * L::PIXELS;

        let mut lanes = [L::zero(); KERNEL_SIZE];
        for (lane, chunk) in lanes.iter_mut().zip(weights[..full].chunks_exact(L::PIXELS)) {
            *lane = L::splat_taps(chunk);
        }

        Self {
            lanes,
            tail: *weights,
            full,
        }
    }
}

impl<L: PixelLanes> Convolve for Taps<L> {
    #[inline(always)]
    fn convolve(&self, window: &[u32; KERNEL_SIZE]) -> u32 {
        let mut acc = L::zero();
        for (pixels, &weights) in window[..self.full]
            .chunks_exact(L::PIXELS)
            .zip(self.lanes.iter())
        {
            acc = L::load(pixels).mul_add(weights, acc);
        }

        let mut sum = acc.fold();
        for (&pixel, &weight) in window[self.full..].iter().zip(&self.tail[self.full..]) {
            sum = f32x4::new(unpack(pixel)).mul_add(f32x4::splat(weight), sum);
        }
        pack(sum)
    }
}

/// Plain per-channel accumulation without vector types.
pub(crate) struct ScalarTaps {
    weights: [f32; KERNEL_SIZE],
}

impl ScalarTaps {
    pub(crate) fn new(kernel: &Kernel) -> Self {
        Self {
            weights: *kernel.weights(),
        }
    }
}

impl Convolve for ScalarTaps {
    #[inline(always)]
    fn convolve(&self, window: &[u32; KERNEL_SIZE]) -> u32 {
        let mut sum = [0f32; 4];
        for (&pixel, &weight) in window.iter().zip(&self.weights) {
            for (acc, value) in sum.iter_mut().zip(unpack(pixel)) {
                *acc += value * weight;
            }
        }
        let [c0, c1, c2, c3] = sum.map(|v| v.clamp(0.0, 255.0).round_ties_even() as u8);
        u32::from_le_bytes([c0, c1, c2, c3])
    }
}
