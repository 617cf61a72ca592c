//! Shared helpers for the blur integration tests.
//!
//! The reference blur uses direct 2-D indexing, an
//! explicit vertical pass instead of transposition, and per-channel scalar
//! arithmetic in tap order. With the crate's f32 weights it performs the same
//! float operations as the scalar backend, so that backend must match it
//! exactly and the SIMD backends within one step.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rgba_blur::{Kernel, KERNEL_RADIUS, KERNEL_SIZE};

/// Builds a packed pixel from four channel values.
pub fn rgba(c0: u8, c1: u8, c2: u8, c3: u8) -> u32 {
    u32::from_le_bytes([c0, c1, c2, c3])
}

/// Channel `c` of a packed pixel.
pub fn channel(pixel: u32, c: usize) -> u8 {
    pixel.to_le_bytes()[c]
}

/// Deterministic random image.
pub fn random_image(width: usize, height: usize, seed: u64) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..width * height).map(|_| rng.gen::<u32>()).collect()
}

/// Image whose four channels carry unrelated patterns: a horizontal ramp,
/// a vertical ramp, a checkerboard and random noise.
pub fn mixed_pattern_image(width: usize, height: usize, seed: u64) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let ramp_h = (x * 255 / (width - 1)) as u8;
            let ramp_v = (y * 255 / (height - 1)) as u8;
            let checker = if (x / 2 + y / 2) % 2 == 0 { 230 } else { 20 };
            data.push(rgba(ramp_h, ramp_v, checker, rng.gen()));
        }
    }
    data
}

fn reflect(offset: isize, len: usize) -> usize {
    let last = len as isize - 1;
    if offset < 0 {
        (-offset) as usize
    } else if offset > last {
        (2 * last - offset) as usize
    } else {
        offset as usize
    }
}

fn narrow(v: f32) -> u8 {
    v.clamp(0.0, 255.0).round_ties_even() as u8
}

/// Convolves one channel plane along x, without transposing.
fn convolve_rows(
    plane: &[u8],
    width: usize,
    height: usize,
    weights: &[f32; KERNEL_SIZE],
) -> Vec<u8> {
    let mut out = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0f32;
            for (k, &w) in weights.iter().enumerate() {
                let sx = reflect(x as isize + k as isize - KERNEL_RADIUS as isize, width);
                sum += f32::from(plane[y * width + sx]) * w;
            }
            out[y * width + x] = narrow(sum);
        }
    }
    out
}

/// Convolves one channel plane along y.
fn convolve_columns(
    plane: &[u8],
    width: usize,
    height: usize,
    weights: &[f32; KERNEL_SIZE],
) -> Vec<u8> {
    let mut out = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0f32;
            for (k, &w) in weights.iter().enumerate() {
                let sy = reflect(y as isize + k as isize - KERNEL_RADIUS as isize, height);
                sum += f32::from(plane[sy * width + x]) * w;
            }
            out[y * width + x] = narrow(sum);
        }
    }
    out
}

/// Blurs a single 8-bit plane with a rows-then-columns separable convolution.
pub fn reference_blur_plane(
    plane: &[u8],
    width: usize,
    height: usize,
    kernel: &Kernel,
) -> Vec<u8> {
    let rows = convolve_rows(plane, width, height, kernel.weights());
    convolve_columns(&rows, width, height, kernel.weights())
}

/// Splits an image into its four channel planes.
pub fn split_planes(image: &[u32]) -> [Vec<u8>; 4] {
    std::array::from_fn(|c| image.iter().map(|&p| channel(p, c)).collect())
}

/// Reference 2-D blur of a packed image, channel by channel.
pub fn reference_blur(image: &[u32], width: usize, height: usize, kernel: &Kernel) -> Vec<u32> {
    let planes = split_planes(image).map(|p| reference_blur_plane(&p, width, height, kernel));
    (0..width * height)
        .map(|i| rgba(planes[0][i], planes[1][i], planes[2][i], planes[3][i]))
        .collect()
}

/// Largest per-channel difference between two images.
pub fn max_channel_diff(a: &[u32], b: &[u32]) -> u8 {
    assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .flat_map(|(&x, &y)| {
            x.to_le_bytes()
                .into_iter()
                .zip(y.to_le_bytes())
                .map(|(p, q)| p.abs_diff(q))
        })
        .max()
        .unwrap_or(0)
}
