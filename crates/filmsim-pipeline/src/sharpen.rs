//! Sharpness: 3x3 box-blur unsharp mask.
//!
//! Runs as its own pass over the fully adjusted buffer. Each interior
//! channel moves away from (positive sharpness) or toward (negative) the
//! mean of its 3x3 neighborhood, read from a snapshot taken when the
//! pass starts.

#![allow(clippy::suboptimal_flops)]

use crate::pixel::apply_stencil;
use crate::types::RgbaImage;

/// Mask weight per positive sharpness step.
const SHARPEN_STEP: f64 = 0.3;
/// Mask weight per negative sharpness step.
const SOFTEN_STEP: f64 = 0.2;

/// Unsharp mask weight for a sharpness setting.
#[must_use]
pub fn amount(sharpness: i32) -> f64 {
    let step = if sharpness > 0 {
        SHARPEN_STEP
    } else {
        SOFTEN_STEP
    };
    f64::from(sharpness) * step
}

/// Apply the sharpness pass in place. `sharpness == 0` is skipped.
pub fn sharpen(image: &mut RgbaImage, sharpness: i32) {
    if sharpness == 0 {
        log::trace!("sharpness: 0, skipped");
        return;
    }

    let amount = amount(sharpness);
    log::debug!("sharpness: {sharpness:+} (amount {amount:.1})");
    apply_stencil(image, |snapshot, i| {
        let mut sum = 0.0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                sum += snapshot.at(i, dx, dy);
            }
        }
        let center = snapshot.at(i, 0, 0);
        center + (center - sum / 9.0) * amount
    });
}
