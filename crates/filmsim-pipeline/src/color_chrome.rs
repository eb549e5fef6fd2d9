//! Color chrome effect.
//!
//! Deepens color in the mid-tones. Pixels with luminance strictly inside
//! `(40, 215)` have their channels pushed away from `Y`, with a gain that
//! peaks at `Y = 127.5` and falls off toward both ends of the range.
//! Neutral gray is left where it is. Independently, the blue
//! variant boosts the blue channel of pixels where blue dominates.
//!
//! Both parts see the pixel as it was when the stage reached it: the
//! blue test and the boosted value use the pre-chroma channels, and the
//! blue result replaces whatever the chroma part wrote to blue.

#![allow(clippy::suboptimal_flops)]

use crate::pixel::{luminance, map_rgb, quantize, saturate, to_f64};
use crate::recipe::EffectLevel;
use crate::types::RgbaImage;

/// Luminance bounds (exclusive) of the affected mid-tone band.
const BAND: (f64, f64) = (40.0, 215.0);

/// Center of the band weight.
const CENTER: f64 = 127.5;

/// Chroma gain at full weight for each level.
#[must_use]
pub const fn chroma_strength(level: EffectLevel) -> f64 {
    match level {
        EffectLevel::Off => 1.0,
        EffectLevel::Weak => 1.1,
        EffectLevel::Strong => 1.2,
    }
}

/// Blue channel multiplier for each level.
#[must_use]
pub const fn blue_strength(level: EffectLevel) -> f64 {
    match level {
        EffectLevel::Off => 1.0,
        EffectLevel::Weak => 1.15,
        EffectLevel::Strong => 1.3,
    }
}

/// Map one RGB triple through the color chrome effect.
#[must_use]
pub fn chrome_pixel(rgb: [u8; 3], chroma: EffectLevel, blue: EffectLevel) -> [u8; 3] {
    let [r, g, b] = to_f64(rgb);
    let y = luminance(r, g, b);
    if y <= BAND.0 || y >= BAND.1 {
        return rgb;
    }

    let mut out = rgb;
    if !chroma.is_off() {
        let t = 1.0 - (y - CENTER).abs() / CENTER;
        let factor = 1.0 + t * (chroma_strength(chroma) - 1.0) * 0.5;
        out = saturate([r, g, b], y, factor);
    }
    if !blue.is_off() && b > r && b > g {
        out[2] = quantize(b * blue_strength(blue));
    }
    out
}

/// Apply color chrome in place. Skipped when both levels are off.
pub fn apply_color_chrome(image: &mut RgbaImage, chroma: EffectLevel, blue: EffectLevel) {
    if chroma.is_off() && blue.is_off() {
        log::trace!("color chrome: off, skipped");
        return;
    }

    log::debug!("color chrome: {chroma}, blue {blue}");
    map_rgb(image, |rgb| chrome_pixel(rgb, chroma, blue));
}
