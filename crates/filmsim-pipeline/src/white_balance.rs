//! White balance shift.
//!
//! Scales red by `1 + red * 0.02` and blue by `1 + blue * 0.02`; green is
//! never touched. A `{0, 0}` shift is skipped entirely.

use crate::pixel::{map_rgb, quantize};
use crate::recipe::WhiteBalanceShift;
use crate::types::RgbaImage;

/// Gain per unit of shift.
const STEP: f64 = 0.02;

/// Red and blue multipliers for a shift.
#[must_use]
pub fn gains(shift: WhiteBalanceShift) -> (f64, f64) {
    (
        1.0 + f64::from(shift.red) * STEP,
        1.0 + f64::from(shift.blue) * STEP,
    )
}

/// Apply the white balance shift in place.
pub fn apply_white_balance(image: &mut RgbaImage, shift: WhiteBalanceShift) {
    if shift.is_neutral() {
        log::trace!("white balance: neutral, skipped");
        return;
    }

    let (red_gain, blue_gain) = gains(shift);
    log::debug!(
        "white balance: red {:+} (x{red_gain:.2}), blue {:+} (x{blue_gain:.2})",
        shift.red,
        shift.blue,
    );
    map_rgb(image, |[r, g, b]| {
        [
            quantize(f64::from(r) * red_gain),
            g,
            quantize(f64::from(b) * blue_gain),
        ]
    });
}
