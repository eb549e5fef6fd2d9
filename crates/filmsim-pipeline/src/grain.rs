//! Film grain: monochromatic additive noise.
//!
//! Every pixel draws one uniform sample in `[-s/2, s/2)` and adds it to
//! R, G and B alike, so grain changes brightness without introducing
//! color speckle. `s` is 15 for strong grain and 8 for weak.
//!
//! Rows are processed in parallel with one generator per row. With
//! [`GrainSeed::Fixed`] each row's generator is seeded from the seed and
//! the row index, so the output does not depend on how rayon schedules
//! rows. [`GrainSeed::Entropy`] uses the worker thread's `rand::rng()`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::pixel::quantize;
use crate::recipe::EffectLevel;
use crate::types::{GrainSeed, RgbaImage};

/// Odd 64-bit constant (golden ratio) used to spread row indices across
/// the seed space.
const ROW_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Peak-to-peak noise amplitude for a grain level, or `None` when off.
#[must_use]
pub const fn strength(level: EffectLevel) -> Option<f64> {
    match level {
        EffectLevel::Off => None,
        EffectLevel::Weak => Some(8.0),
        EffectLevel::Strong => Some(15.0),
    }
}

/// Seed for one row's generator.
const fn row_seed(seed: u64, row: usize) -> u64 {
    seed ^ (row as u64).wrapping_mul(ROW_MIX)
}

/// Add grain to one row of RGBA pixels.
fn grain_row<R: Rng + ?Sized>(row: &mut [u8], rng: &mut R, strength: f64) {
    for px in row.chunks_exact_mut(4) {
        let noise = (rng.random::<f64>() - 0.5) * strength;
        for channel in &mut px[..3] {
            *channel = quantize(f64::from(*channel) + noise);
        }
    }
}

/// Apply grain in place. [`EffectLevel::Off`] is skipped.
pub fn add_grain(image: &mut RgbaImage, level: EffectLevel, seed: GrainSeed) {
    let Some(strength) = strength(level) else {
        log::trace!("grain: off, skipped");
        return;
    };

    let row_len = image.width() as usize * 4;
    if row_len == 0 || image.height() == 0 {
        return;
    }

    log::debug!("grain: {level} (strength {strength}, seed {seed:?})");
    let buffer: &mut [u8] = image;
    let rows = buffer.par_chunks_exact_mut(row_len).enumerate();
    match seed {
        GrainSeed::Entropy => rows.for_each(|(_, row)| {
            grain_row(row, &mut rand::rng(), strength);
        }),
        GrainSeed::Fixed(seed) => rows.for_each(|(y, row)| {
            let mut rng = StdRng::seed_from_u64(row_seed(seed, y));
            grain_row(row, &mut rng, strength);
        }),
    }
}
