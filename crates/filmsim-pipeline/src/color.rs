//! Color (saturation) adjustment.
//!
//! `factor = 1 + color * 0.1`; each channel moves away from (positive)
//! or toward (negative) the pixel's luminance.

use crate::pixel::{luminance_u8, map_rgb, saturate, to_f64};
use crate::types::RgbaImage;

/// Saturation change per color step.
const STEP: f64 = 0.1;

/// Saturation multiplier for a color setting.
#[must_use]
pub fn saturation_factor(color: i32) -> f64 {
    1.0 + f64::from(color) * STEP
}

/// Apply the color adjustment in place. `color == 0` is skipped.
pub fn adjust_color(image: &mut RgbaImage, color: i32) {
    if color == 0 {
        log::trace!("color: 0, skipped");
        return;
    }

    let factor = saturation_factor(color);
    log::debug!("color: {color:+} (saturation x{factor:.1})");
    map_rgb(image, |rgb| saturate(to_f64(rgb), luminance_u8(rgb), factor));
}
