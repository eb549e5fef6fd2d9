//! filmsim-pipeline: Film-recipe pixel pipeline (sans-IO).
//!
//! Applies a named film recipe to an RGBA raster through a fixed
//! sequence of in-place stages:
//! film simulation -> white balance -> tone curve -> color ->
//! color chrome -> clarity -> grain -> sharpness.
//!
//! This crate has **no I/O dependencies**. It operates on in-memory
//! byte slices and pixel buffers; encoding and file naming live in
//! `filmsim-export`.
//!
//! Every stage is parallelised across rows with `rayon` and finishes
//! before the next one starts. Stages log their parameters through the
//! `log` facade; no logger is installed here.

pub mod clarity;
pub mod color;
pub mod color_chrome;
pub mod decode;
pub mod diagnostics;
pub mod film_simulation;
pub mod grain;
pub mod pipeline;
pub mod pixel;
pub mod recipe;
pub mod sharpen;
pub mod tone_curve;
pub mod types;
pub mod white_balance;

pub use pipeline::Pipeline;
pub use recipe::{
    DEFAULT_RECIPE_ID, DynamicRange, EffectLevel, FilmSimulation, RECIPES, Recipe, RecipeEntry,
    WhiteBalanceShift,
};
pub use types::{
    Dimensions, GrainSeed, PipelineConfig, PipelineError, ProcessResult, RgbaImage,
};

/// Apply `recipe` to `image` in place and return the same buffer.
///
/// Stage order is fixed:
///
/// 1. Film simulation base look
/// 2. White balance shift
/// 3. Tone curve
/// 4. Color adjustment
/// 5. Color chrome
/// 6. Clarity (4-neighbor high-pass, interior pixels only)
/// 7. Grain
/// 8. Sharpness (3x3 unsharp mask, interior pixels only)
///
/// Alpha is never read or written. The recipe is not validated; out of
/// range values are used as-is and every channel is clamped. A
/// zero-area image is returned unchanged.
pub fn transform<'a>(
    image: &'a mut RgbaImage,
    recipe: &Recipe,
    grain_seed: GrainSeed,
) -> &'a mut RgbaImage {
    log::debug!(
        "transform {}x{} with {:?}",
        image.width(),
        image.height(),
        recipe.name
    );
    film_simulation::simulate_film(image, recipe.film_simulation);
    white_balance::apply_white_balance(image, recipe.white_balance_shift);
    tone_curve::apply_tone_curve(image, recipe.highlights, recipe.shadows);
    color::adjust_color(image, recipe.color);
    color_chrome::apply_color_chrome(image, recipe.color_chrome, recipe.color_chrome_blue);
    clarity::apply_clarity(image, recipe.clarity);
    grain::add_grain(image, recipe.grain, grain_seed);
    sharpen::sharpen(image, recipe.sharpness);
    image
}

/// Decode image bytes and run the full pipeline.
///
/// Takes raw image bytes (JPEG, PNG, WebP) and a configuration, and
/// returns both the decoded original and the transformed buffer.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::UnsupportedFormat`] for formats other than
/// JPEG, PNG and WebP.
/// Returns [`PipelineError::ImageDecode`] if the data cannot be decoded.
pub fn process(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<ProcessResult, PipelineError> {
    let original = decode::decode_rgba(image_bytes)?;
    let mut transformed = original.clone();
    transform(&mut transformed, &config.recipe, config.grain_seed);
    Ok(ProcessResult {
        recipe_name: config.recipe.name.to_string(),
        dimensions: Dimensions::of(&original),
        original,
        transformed,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn photo(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([
                u8::try_from((x * 7 + y * 3) % 256).unwrap(),
                u8::try_from((x * 2 + y * 11) % 256).unwrap(),
                u8::try_from((x * 13 + y * 5) % 256).unwrap(),
                u8::try_from((x + y) % 256).unwrap(),
            ])
        })
    }

    fn png(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    /// A recipe far outside every documented range.
    fn adversarial() -> Recipe {
        Recipe {
            film_simulation: FilmSimulation::Velvia,
            highlights: 40,
            shadows: -40,
            color: 50,
            sharpness: 30,
            grain: EffectLevel::Strong,
            white_balance_shift: WhiteBalanceShift::new(90, -90),
            color_chrome: EffectLevel::Strong,
            color_chrome_blue: EffectLevel::Strong,
            clarity: -50,
            ..Recipe::default()
        }
    }

    #[test]
    fn alpha_is_bit_identical_for_every_recipe() {
        let base = photo(23, 17);
        for entry in &RECIPES {
            let mut img = base.clone();
            transform(&mut img, &entry.recipe, GrainSeed::Entropy);
            for (a, b) in img.pixels().zip(base.pixels()) {
                assert_eq!(a.0[3], b.0[3], "recipe {}", entry.id);
            }
        }
    }

    #[test]
    fn adversarial_recipe_does_not_panic_and_keeps_alpha() {
        let base = photo(16, 16);
        let mut img = base.clone();
        let recipe = adversarial();
        assert!(recipe.validate().is_err());
        transform(&mut img, &recipe, GrainSeed::Fixed(1));
        assert_eq!(img.dimensions(), base.dimensions());
        assert!(img.pixels().zip(base.pixels()).all(|(a, b)| a.0[3] == b.0[3]));
    }

    #[test]
    fn two_by_two_gray_with_default_recipe() {
        let mut img = RgbaImage::from_pixel(2, 2, image::Rgba([128, 128, 128, 255]));
        transform(&mut img, &Recipe::default(), GrainSeed::Entropy);
        assert_eq!(img.dimensions(), (2, 2));
    }

    #[test]
    fn zero_area_is_noop() {
        let mut img = RgbaImage::new(0, 0);
        transform(&mut img, &adversarial(), GrainSeed::Entropy);
        assert!(img.as_raw().is_empty());
        let mut img = RgbaImage::new(5, 0);
        transform(&mut img, &adversarial(), GrainSeed::Entropy);
        assert_eq!(img.dimensions(), (5, 0));
    }

    #[test]
    fn neutral_recipe_is_identity_for_non_base_stages() {
        // With every optional stage off, only the film simulation moves
        // pixels. White is fixed under velvia, so the whole run is an
        // identity on a white image.
        let mut img = RgbaImage::from_pixel(100, 100, image::Rgba([255, 255, 255, 255]));
        let before = img.clone();
        transform(
            &mut img,
            &Recipe::neutral(FilmSimulation::Velvia),
            GrainSeed::Entropy,
        );
        assert_eq!(img, before);
    }

    #[test]
    fn grain_off_runs_are_deterministic() {
        let base = photo(30, 20);
        for id in ["123-chrome", "fuji-astia"] {
            let recipe = recipe::lookup(id).unwrap();
            assert!(recipe.grain.is_off());
            let mut a = base.clone();
            let mut b = base.clone();
            transform(&mut a, recipe, GrainSeed::Entropy);
            transform(&mut b, recipe, GrainSeed::Entropy);
            assert_eq!(a, b, "recipe {id}");
        }
    }

    #[test]
    fn fixed_seed_runs_are_deterministic() {
        let base = photo(30, 20);
        let recipe = recipe::lookup("nightwalker").unwrap();
        let mut a = base.clone();
        let mut b = base;
        transform(&mut a, recipe, GrainSeed::Fixed(2024));
        transform(&mut b, recipe, GrainSeed::Fixed(2024));
        assert_eq!(a, b);
    }

    #[test]
    fn process_keeps_original_and_dimensions() {
        let base = photo(12, 7);
        let config = PipelineConfig::from_recipe_id("kodak-portra-400")
            .unwrap()
            .with_grain_seed(GrainSeed::Fixed(8));
        let result = process(&png(&base), &config).unwrap();
        assert_eq!(result.original, base);
        assert_eq!(
            result.dimensions,
            Dimensions {
                width: 12,
                height: 7
            }
        );
        assert_eq!(result.recipe_name, "Kodak Portra 400");

        let mut expected = base;
        transform(&mut expected, &config.recipe, config.grain_seed);
        assert_eq!(result.transformed, expected);
    }

    #[test]
    fn process_empty_input() {
        let result = process(&[], &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn process_corrupt_input() {
        let result = process(&[0xFF, 0x00], &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn transform_returns_same_buffer() {
        let mut img = photo(4, 4);
        let ptr = img.as_ptr();
        let out = transform(&mut img, &Recipe::default(), GrainSeed::Fixed(0));
        assert_eq!(out.as_ptr(), ptr);
    }
}
