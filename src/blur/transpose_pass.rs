//! Transposing 1-D convolution pass.
//!
//! Convolves every source row with the 7-tap kernel and writes the result to
//! the transposed position `dst[height * column + row]`. Running the pass a
//! second time on its own output, with width and height swapped, blurs the
//! other axis and restores the original orientation.
//!
//! Work is split over blocks of destination rows (one destination row per
//! source column), so each block writes a disjoint slice of `dst` and the
//! blocks can be processed in parallel.

use multiversion::multiversion;
use wide::{f32x4, f32x8};

use super::lanes::{Convolve, ScalarTaps, Taps};
use crate::kernel::{Kernel, KERNEL_RADIUS, KERNEL_SIZE};

/// Source columns handled per block.
const COLUMN_BLOCK: usize = 64;

/// Maps an offset that may fall outside `0..len` back into the row by
/// reflecting across the edge pixel (the edge itself is not repeated).
///
/// Requires `len > KERNEL_RADIUS` so a single reflection always lands in range.
#[inline(always)]
pub(crate) fn reflect(offset: isize, len: usize) -> usize {
    let last = len as isize - 1;
    let reflected = if offset < 0 {
        -offset
    } else if offset > last {
        2 * last - offset
    } else {
        offset
    };
    reflected as usize
}

/// Collects the 7 pixels centred on `column`.
#[inline(always)]
pub(crate) fn gather(row: &[u32], column: usize) -> [u32; KERNEL_SIZE] {
    let width = row.len();
    let mut window = [0u32; KERNEL_SIZE];
    if column >= KERNEL_RADIUS && column + KERNEL_RADIUS < width {
        window.copy_from_slice(&row[column - KERNEL_RADIUS..=column + KERNEL_RADIUS]);
    } else {
        let start = column as isize - KERNEL_RADIUS as isize;
        for (tap, px) in window.iter_mut().enumerate() {
            *px = row[reflect(start + tap as isize, width)];
        }
    }
    window
}

/// Fills `out`, the destination rows for source columns starting at
/// `first_column`. Each destination row is `height` pixels long.
#[inline(always)]
fn column_block<C: Convolve>(
    taps: &C,
    src: &[u32],
    out: &mut [u32],
    width: usize,
    height: usize,
    first_column: usize,
) {
    let columns = out.len() / height;
    for (row, line) in src.chunks_exact(width).enumerate() {
        for i in 0..columns {
            out[i * height + row] = taps.convolve(&gather(line, first_column + i));
        }
    }
}

#[multiversion(targets("x86_64+avx2+fma", "x86_64+sse2", "aarch64+neon"))]
fn column_block_x4(
    taps: &Taps<f32x4>,
    src: &[u32],
    out: &mut [u32],
    width: usize,
    height: usize,
    first_column: usize,
) {
    column_block(taps, src, out, width, height, first_column);
}

#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse2", "aarch64+neon"))]
fn column_block_x8(
    taps: &Taps<f32x8>,
    src: &[u32],
    out: &mut [u32],
    width: usize,
    height: usize,
    first_column: usize,
) {
    column_block(taps, src, out, width, height, first_column);
}

fn column_block_scalar(
    taps: &ScalarTaps,
    src: &[u32],
    out: &mut [u32],
    width: usize,
    height: usize,
    first_column: usize,
) {
    column_block(taps, src, out, width, height, first_column);
}

#[inline(always)]
fn run_blocks<C, F>(
    taps: &C,
    src: &[u32],
    dst: &mut [u32],
    width: usize,
    height: usize,
    block: F,
) where
    C: Convolve,
    F: Fn(&C, &[u32], &mut [u32], usize, usize, usize) + Sync,
{
    debug_assert_eq!(src.len(), width * height);
    debug_assert_eq!(dst.len(), width * height);

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        dst.par_chunks_mut(COLUMN_BLOCK * height)
            .enumerate()
            .for_each(|(index, out)| block(taps, src, out, width, height, index * COLUMN_BLOCK));
    }

    #[cfg(not(feature = "rayon"))]
    {
        dst.chunks_mut(COLUMN_BLOCK * height)
            .enumerate()
            .for_each(|(index, out)| block(taps, src, out, width, height, index * COLUMN_BLOCK));
    }
}

/// 128-bit lanes: one pixel per multiply-add.
pub(crate) fn pass_simd128(
    src: &[u32],
    dst: &mut [u32],
    kernel: &Kernel,
    width: usize,
    height: usize,
) {
    let taps = Taps::<f32x4>::new(kernel);
    run_blocks(&taps, src, dst, width, height, column_block_x4);
}

/// 256-bit lanes: two pixels per multiply-add, 7th tap on the 128-bit tail.
pub(crate) fn pass_simd256(
    src: &[u32],
    dst: &mut [u32],
    kernel: &Kernel,
    width: usize,
    height: usize,
) {
    let taps = Taps::<f32x8>::new(kernel);
    run_blocks(&taps, src, dst, width, height, column_block_x8);
}

pub(crate) fn pass_scalar(
    src: &[u32],
    dst: &mut [u32],
    kernel: &Kernel,
    width: usize,
    height: usize,
) {
    let taps = ScalarTaps::new(kernel);
    run_blocks(&taps, src, dst, width, height, column_block_scalar);
}
