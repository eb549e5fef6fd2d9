//! Film simulation base look.
//!
//! First transform stage. Each [`FilmSimulation`] is a fixed per-pixel
//! color mapping that sets the overall character of the stock before the
//! recipe's finer adjustments are applied:
//!
//! - classic chrome mutes color by blending 15% of the luminance back in;
//! - pro neg std warms slightly with per-channel gains;
//! - eterna mutes harder with a 20% luminance blend;
//! - velvia pushes every channel away from gray by 1.4x.

#![allow(clippy::suboptimal_flops)]

use crate::pixel::{luminance, map_rgb, quantize, saturate, to_f64};
use crate::recipe::FilmSimulation;
use crate::types::RgbaImage;

/// Velvia saturation boost.
const VELVIA_SATURATION: f64 = 1.4;

/// Per-channel gains for pro neg std.
const PRO_NEG_GAINS: [f64; 3] = [1.05, 1.02, 0.98];

/// Map one RGB triple through a film simulation.
#[must_use]
pub fn simulate_pixel(simulation: FilmSimulation, rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = to_f64(rgb);
    match simulation {
        FilmSimulation::ClassicChrome => blend_toward_gray([r, g, b], 0.85, 0.15),
        FilmSimulation::Eterna => blend_toward_gray([r, g, b], 0.8, 0.2),
        FilmSimulation::ProNegStd => [
            quantize(r * PRO_NEG_GAINS[0]),
            quantize(g * PRO_NEG_GAINS[1]),
            quantize(b * PRO_NEG_GAINS[2]),
        ],
        FilmSimulation::Velvia => saturate([r, g, b], luminance(r, g, b), VELVIA_SATURATION),
    }
}

/// `keep * c + mix * Y` per channel.
fn blend_toward_gray(rgb: [f64; 3], keep: f64, mix: f64) -> [u8; 3] {
    let gray = luminance(rgb[0], rgb[1], rgb[2]);
    rgb.map(|c| quantize(c * keep + gray * mix))
}

/// Apply the film simulation base look to every pixel in place.
pub fn simulate_film(image: &mut RgbaImage, simulation: FilmSimulation) {
    log::debug!("film simulation: {simulation}");
    map_rgb(image, |rgb| simulate_pixel(simulation, rgb));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_is_fixed_under_velvia() {
        let mut img = RgbaImage::from_pixel(100, 100, image::Rgba([255, 255, 255, 255]));
        let before = img.clone();
        simulate_film(&mut img, FilmSimulation::Velvia);
        assert_eq!(img, before);
    }

    #[test]
    fn gray_is_fixed_under_blending_looks() {
        for sim in [
            FilmSimulation::ClassicChrome,
            FilmSimulation::Eterna,
            FilmSimulation::Velvia,
        ] {
            assert_eq!(simulate_pixel(sim, [128, 128, 128]), [128, 128, 128], "{sim}");
        }
    }

    #[test]
    fn classic_chrome_mutes_red() {
        // Y = 76.245; 0.85*255 + 0.15*76.245 = 228.18675
        // G and B: 0.15*76.245 = 11.43675
        assert_eq!(
            simulate_pixel(FilmSimulation::ClassicChrome, [255, 0, 0]),
            [228, 11, 11]
        );
    }

    #[test]
    fn eterna_mutes_more_than_classic_chrome() {
        let chrome = simulate_pixel(FilmSimulation::ClassicChrome, [255, 0, 0]);
        let eterna = simulate_pixel(FilmSimulation::Eterna, [255, 0, 0]);
        assert!(eterna[0] < chrome[0]);
        assert!(eterna[1] > chrome[1]);
    }

    #[test]
    fn pro_neg_applies_channel_gains() {
        // 100*1.05 = 105, 100*1.02 = 102, 100*0.98 = 98
        assert_eq!(
            simulate_pixel(FilmSimulation::ProNegStd, [100, 100, 100]),
            [105, 102, 98]
        );
        // Red saturates.
        assert_eq!(simulate_pixel(FilmSimulation::ProNegStd, [250, 0, 0])[0], 255);
    }

    #[test]
    fn velvia_pushes_away_from_gray() {
        let [r, g, b] = simulate_pixel(FilmSimulation::Velvia, [200, 100, 50]);
        assert!(r > 200);
        assert!(b < 50);
        assert!(g < 110, "g = {g}");
    }

    #[test]
    fn alpha_is_preserved() {
        let mut img = RgbaImage::from_fn(4, 4, |x, y| {
            image::Rgba([200, 30, 90, u8::try_from(x * 4 + y).unwrap_or(0)])
        });
        let alphas: Vec<u8> = img.pixels().map(|p| p.0[3]).collect();
        for sim in FilmSimulation::ALL {
            simulate_film(&mut img, sim);
        }
        let after: Vec<u8> = img.pixels().map(|p| p.0[3]).collect();
        assert_eq!(alphas, after);
    }
}
