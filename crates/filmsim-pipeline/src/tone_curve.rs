//! Highlight/shadow tone curve.
//!
//! Each pixel's luminance decides which half of the curve applies. Above
//! the midpoint the gain ramps from 1 at `Y = 127` up to the highlight
//! factor at `Y = 255`; at or below it the gain ramps from the shadow
//! factor at black to 1 at `Y = 127`. The gain multiplies all three
//! channels, so hue is kept while brightness moves.

#![allow(clippy::suboptimal_flops)]

use crate::pixel::{luminance, map_rgb, quantize, to_f64};
use crate::types::RgbaImage;

/// Luminance at which the curve switches from shadows to highlights.
/// This value itself counts as a shadow.
const MIDPOINT: f64 = 127.0;

/// Factor change per highlight/shadow step.
const STEP: f64 = 0.15;

/// Gain for a pixel of luminance `y`.
#[must_use]
pub fn gain(y: f64, highlights: i32, shadows: i32) -> f64 {
    if y > MIDPOINT {
        let highlight_factor = 1.0 + f64::from(highlights) * STEP;
        let t = (y - MIDPOINT) / 128.0;
        1.0 + t * (highlight_factor - 1.0)
    } else {
        let shadow_factor = 1.0 + f64::from(shadows) * STEP;
        let t = y / MIDPOINT;
        shadow_factor + t * (1.0 - shadow_factor)
    }
}

/// Apply the tone curve in place.
///
/// Runs for every recipe; with `highlights == shadows == 0` every gain
/// is exactly 1.
pub fn apply_tone_curve(image: &mut RgbaImage, highlights: i32, shadows: i32) {
    log::debug!("tone curve: highlights {highlights:+}, shadows {shadows:+}");
    map_rgb(image, |rgb| {
        let [r, g, b] = to_f64(rgb);
        let k = gain(luminance(r, g, b), highlights, shadows);
        [quantize(r * k), quantize(g * k), quantize(b * k)]
    });
}
