//! Clarity: 4-neighbor high-pass boost.
//!
//! Each interior channel is pushed away from the mean of its up, down,
//! left and right neighbors by `clarity * 0.15`. Negative clarity pulls
//! toward the mean, softening local contrast. Neighbors are read from a
//! snapshot taken when the stage starts.

#![allow(clippy::suboptimal_flops)]

use crate::pixel::apply_stencil;
use crate::types::RgbaImage;

/// Weight per clarity step.
const STEP: f64 = 0.15;

/// Apply clarity in place. `clarity == 0` is skipped.
pub fn apply_clarity(image: &mut RgbaImage, clarity: i32) {
    if clarity == 0 {
        log::trace!("clarity: 0, skipped");
        return;
    }

    let factor = f64::from(clarity) * STEP;
    log::debug!("clarity: {clarity:+} (factor {factor:.2})");
    apply_stencil(image, |snapshot, i| {
        let center = snapshot.at(i, 0, 0);
        let neighbors = snapshot.at(i, 0, -1)
            + snapshot.at(i, 0, 1)
            + snapshot.at(i, -1, 0)
            + snapshot.at(i, 1, 0);
        center + (center - neighbors / 4.0) * factor
    });
}
