//! Integration test: run every built-in recipe end to end.
//!
//! decode -> transform -> JPEG encode -> decode, checking that each
//! recipe keeps dimensions, produces a valid JPEG and actually changes
//! the image.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use filmsim_pipeline::{GrainSeed, PipelineConfig, RECIPES, RgbaImage};

/// A synthetic "photo": smooth color gradients with a bright blue sky
/// band, a dark band and some high-frequency texture.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn test_scene(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let fx = f64::from(x) / f64::from(width);
        let fy = f64::from(y) / f64::from(height);
        let texture = if (x + y) % 3 == 0 { 12.0 } else { 0.0 };
        let channel = |v: f64| v.clamp(0.0, 255.0) as u8;
        if fy < 0.3 {
            image::Rgba([
                channel(60.0 + 40.0 * fx),
                channel(110.0 + 30.0 * fx),
                channel(200.0 + texture),
                255,
            ])
        } else if fy > 0.85 {
            image::Rgba([channel(20.0 + texture), channel(18.0), channel(25.0), 255])
        } else {
            image::Rgba([
                channel(180.0 * fx + texture),
                channel(140.0 * (1.0 - fy) + 40.0),
                channel(90.0 + 60.0 * fy),
                255,
            ])
        }
    })
}

#[test]
fn every_recipe_round_trips_through_jpeg() {
    let scene = test_scene(64, 48);
    let input = filmsim_export::encode_png(&scene).unwrap();

    for entry in &RECIPES {
        let config = PipelineConfig::from_recipe_id(entry.id)
            .unwrap()
            .with_grain_seed(GrainSeed::Fixed(2024));
        let result = filmsim_pipeline::process(&input, &config)
            .unwrap_or_else(|e| panic!("{} failed: {e}", entry.id));

        assert_eq!(result.original, scene, "{}: original altered", entry.id);
        assert_ne!(
            result.transformed, scene,
            "{}: recipe had no visible effect",
            entry.id
        );

        let jpeg =
            filmsim_export::encode_jpeg(&result.transformed, filmsim_export::JPEG_QUALITY)
                .unwrap();
        let decoded = filmsim_pipeline::decode::decode_rgba(&jpeg)
            .unwrap_or_else(|e| panic!("{}: JPEG did not decode: {e}", entry.id));
        assert_eq!(decoded.dimensions(), scene.dimensions(), "{}", entry.id);
        assert!(decoded.pixels().all(|p| p.0[3] == 255));

        let name = filmsim_export::download_filename(entry.id, 1_234);
        assert_eq!(name, format!("fujifilm-{}-1234.jpg", entry.id));
    }
}

#[test]
fn every_recipe_previews_successfully() {
    let input = filmsim_export::encode_png(&test_scene(20, 20)).unwrap();
    for entry in &RECIPES {
        let config = PipelineConfig {
            recipe: entry.recipe.clone(),
            grain_seed: GrainSeed::Entropy,
        };
        let preview = filmsim_export::render_preview(&input, &config);
        assert!(
            preview.is_transformed(),
            "{}: {:?}",
            entry.id,
            preview.error()
        );
    }
}

#[test]
fn seeded_output_is_reproducible_across_runs() {
    let input = filmsim_export::encode_png(&test_scene(40, 30)).unwrap();
    let config = PipelineConfig::from_recipe_id("cinematic-eterna")
        .unwrap()
        .with_grain_seed(GrainSeed::Fixed(77));
    let a = filmsim_pipeline::process(&input, &config).unwrap();
    let b = filmsim_pipeline::process(&input, &config).unwrap();
    assert_eq!(a.transformed, b.transformed);

    let jpeg_a = filmsim_export::encode_jpeg(&a.transformed, 98).unwrap();
    let jpeg_b = filmsim_export::encode_jpeg(&b.transformed, 98).unwrap();
    assert_eq!(jpeg_a, jpeg_b);
}

#[test]
fn webp_input_is_accepted() {
    let scene = test_scene(8, 8);
    let mut webp = Vec::new();
    image::codecs::webp::WebPEncoder::new_lossless(&mut webp)
        .encode(
            scene.as_raw(),
            scene.width(),
            scene.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
    let result = filmsim_pipeline::process(&webp, &PipelineConfig::default()).unwrap();
    assert_eq!(result.original, scene);
}
