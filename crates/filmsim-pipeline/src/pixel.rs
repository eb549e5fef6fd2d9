//! Per-pixel arithmetic shared by every stage, and the two row-parallel
//! drivers the stages are built on.
//!
//! All channel math happens in `f64` and is written back through
//! [`quantize`], so each stage observes the integer output of the one
//! before it.
//!
//! Luminance uses the BT.601 weights everywhere. Expressions are plain
//! multiply-adds in source order (no fused `mul_add`) so results do not
//! depend on whether the target has FMA.

#![allow(clippy::suboptimal_flops)]

use rayon::prelude::*;

use crate::types::{Dimensions, RgbaImage};

/// BT.601 red weight.
pub const LUMA_R: f64 = 0.299;
/// BT.601 green weight.
pub const LUMA_G: f64 = 0.587;
/// BT.601 blue weight.
pub const LUMA_B: f64 = 0.114;

/// Bytes per RGBA pixel.
const CHANNELS: usize = 4;

/// Perceptual luminance `0.299R + 0.587G + 0.114B`.
#[must_use]
#[inline]
pub fn luminance(r: f64, g: f64, b: f64) -> f64 {
    LUMA_R * r + LUMA_G * g + LUMA_B * b
}

/// Luminance of an 8-bit RGB triple.
#[must_use]
#[inline]
pub fn luminance_u8([r, g, b]: [u8; 3]) -> f64 {
    luminance(f64::from(r), f64::from(g), f64::from(b))
}

/// Store a channel value as `u8`: clamp to `[0, 255]`, then round to
/// nearest with ties to even.
///
/// NaN maps to 0.
#[must_use]
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn quantize(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round_ties_even() as u8
}

/// Move each channel toward (`factor < 1`) or away from (`factor > 1`)
/// the pixel's gray value `luma`: `luma + (c - luma) * factor`.
#[must_use]
#[inline]
pub fn saturate(rgb: [f64; 3], luma: f64, factor: f64) -> [u8; 3] {
    rgb.map(|c| quantize(luma + (c - luma) * factor))
}

/// Widen an 8-bit RGB triple to `f64`.
#[must_use]
#[inline]
pub fn to_f64(rgb: [u8; 3]) -> [f64; 3] {
    rgb.map(f64::from)
}

/// Apply `f` to the RGB channels of every pixel, rows in parallel.
///
/// Alpha is neither read nor written. Zero-area images are a no-op.
pub(crate) fn map_rgb<F>(image: &mut RgbaImage, f: F)
where
    F: Fn([u8; 3]) -> [u8; 3] + Sync,
{
    let row_len = image.width() as usize * CHANNELS;
    if row_len == 0 || image.height() == 0 {
        return;
    }

    let buffer: &mut [u8] = image;
    buffer.par_chunks_exact_mut(row_len).for_each(|row| {
        for px in row.chunks_exact_mut(CHANNELS) {
            let [r, g, b] = f([px[0], px[1], px[2]]);
            px[0] = r;
            px[1] = g;
            px[2] = b;
        }
    });
}

/// Read-only view of a pre-stage snapshot for neighborhood lookups.
pub(crate) struct Snapshot<'a> {
    data: &'a [u8],
    stride: usize,
}

impl Snapshot<'_> {
    /// Channel value at byte offset `index`, shifted by `dx` pixels
    /// horizontally and `dy` rows vertically.
    ///
    /// Callers only pass offsets that stay inside the image (interior
    /// pixels with `|dx|, |dy| <= 1`).
    #[inline]
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub(crate) fn at(&self, index: usize, dx: isize, dy: isize) -> f64 {
        let offset = dy * self.stride as isize + dx * CHANNELS as isize;
        f64::from(self.data[(index as isize + offset) as usize])
    }
}

/// Recompute every interior pixel's RGB channels from a snapshot of the
/// image taken before the stage began, rows in parallel.
///
/// `kernel(snapshot, index)` receives the byte offset of one channel of
/// one interior pixel and returns the new (unclamped) value. The
/// 1-pixel border is left untouched, so images narrower or shorter
/// than 3 pixels are not modified at all. The snapshot lives only for
/// the duration of this call.
pub(crate) fn apply_stencil<F>(image: &mut RgbaImage, kernel: F)
where
    F: Fn(&Snapshot<'_>, usize) -> f64 + Sync,
{
    if !Dimensions::of(image).has_interior() {
        return;
    }
    let (width, height) = (image.width() as usize, image.height() as usize);

    let stride = width * CHANNELS;
    let copy = image.as_raw().clone();
    let snapshot = Snapshot {
        data: &copy,
        stride,
    };

    let buffer: &mut [u8] = image;
    buffer
        .par_chunks_exact_mut(stride)
        .enumerate()
        .skip(1)
        .take(height - 2)
        .for_each(|(y, row)| {
            for x in 1..width - 1 {
                for c in 0..3 {
                    let column = x * CHANNELS + c;
                    row[column] = quantize(kernel(&snapshot, y * stride + column));
                }
            }
        });
}
