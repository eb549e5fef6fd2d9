//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate buffer before continuing.
//!
//! Unlike [`crate::process`] which runs every stage in one call,
//! [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use filmsim_pipeline::{Pipeline, PipelineConfig, PipelineError};
//! # fn run(jpeg: Vec<u8>) -> Result<(), PipelineError> {
//! let result = Pipeline::new(jpeg, PipelineConfig::default())
//!     .decode()?
//!     .simulate_film()
//!     .white_balance()
//!     .tone_curve()
//!     .adjust_color()
//!     .color_chrome()
//!     .clarity()
//!     .grain()
//!     .sharpen()
//!     .into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline
//! state. Only decoding can fail. The working buffer is moved from
//! state to state and mutated in place; the decoded original is kept
//! alongside it for before/after comparison.

use crate::diagnostics::StageMetrics;
use crate::types::{Dimensions, PipelineConfig, PipelineError, ProcessResult, RgbaImage};

/// Buffers and config carried by every state after decoding.
struct Working {
    config: PipelineConfig,
    original: RgbaImage,
    image: RgbaImage,
}

impl Working {
    fn into_result(self) -> ProcessResult {
        ProcessResult {
            recipe_name: self.config.recipe.name.into_owned(),
            dimensions: Dimensions::of(&self.image),
            original: self.original,
            transformed: self.image,
        }
    }
}

/// Define a post-decode pipeline state with the shared accessors.
macro_rules! raster_stage {
    ($(#[$meta:meta])* $name:ident, $hint:literal) => {
        $(#[$meta])*
        #[must_use = $hint]
        pub struct $name {
            working: Working,
        }

        impl $name {
            /// The working buffer as left by this stage.
            #[must_use]
            pub const fn image(&self) -> &RgbaImage {
                &self.working.image
            }

            /// The decoded input, untouched.
            #[must_use]
            pub const fn original(&self) -> &RgbaImage {
                &self.working.original
            }

            /// The configuration this pipeline runs with.
            #[must_use]
            pub const fn config(&self) -> &PipelineConfig {
                &self.working.config
            }

            /// Image dimensions.
            #[must_use]
            pub fn dimensions(&self) -> Dimensions {
                Dimensions::of(&self.working.image)
            }
        }
    };
}

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
///
/// The source image bytes and config are stored but not yet touched.
/// Call [`decode`](Self::decode) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing, call .decode() to continue"]
pub struct Pending {
    config: PipelineConfig,
    source: Vec<u8>,
}

impl Pending {
    /// The raw source image bytes.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Decode the source image and advance to the [`Decoded`] stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyInput`] if the source bytes are
    /// empty, [`PipelineError::UnsupportedFormat`] for formats other
    /// than JPEG, PNG and WebP, and [`PipelineError::ImageDecode`] if
    /// the data cannot be decoded.
    pub fn decode(self) -> Result<Decoded, PipelineError> {
        let source_len = self.source.len();
        let original = crate::decode::decode_rgba(&self.source)?;
        log::debug!(
            "decoded {source_len} bytes to {}x{}",
            original.width(),
            original.height()
        );
        Ok(Decoded {
            working: Working {
                config: self.config,
                image: original.clone(),
                original,
            },
            source_len,
        })
    }
}

// ───────────────────────── Stage 1: Decoded ──────────────────────────

/// Pipeline state after decoding the source image to RGBA8.
///
/// Call [`simulate_film`](Self::simulate_film) to advance.
#[must_use = "pipeline stages are consumed by advancing, call .simulate_film() to continue"]
pub struct Decoded {
    working: Working,
    source_len: usize,
}

impl Decoded {
    /// The decoded RGBA image.
    #[must_use]
    pub const fn original(&self) -> &RgbaImage {
        &self.working.original
    }

    /// Image dimensions.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::of(&self.working.original)
    }

    /// Apply the film simulation base look.
    pub fn simulate_film(mut self) -> FilmSimulated {
        let w = &mut self.working;
        crate::film_simulation::simulate_film(&mut w.image, w.config.recipe.film_simulation);
        FilmSimulated {
            working: self.working,
        }
    }
}

// ─────────────────────── Stages 2..=9: transforms ────────────────────

raster_stage!(
    /// Pipeline state after the film simulation base look.
    FilmSimulated,
    "pipeline stages are consumed by advancing, call .white_balance() to continue"
);

impl FilmSimulated {
    /// Apply the white balance shift.
    pub fn white_balance(mut self) -> WhiteBalanced {
        let w = &mut self.working;
        crate::white_balance::apply_white_balance(&mut w.image, w.config.recipe.white_balance_shift);
        WhiteBalanced {
            working: self.working,
        }
    }
}

raster_stage!(
    /// Pipeline state after the white balance shift.
    WhiteBalanced,
    "pipeline stages are consumed by advancing, call .tone_curve() to continue"
);

impl WhiteBalanced {
    /// Apply the highlight/shadow tone curve.
    pub fn tone_curve(mut self) -> ToneCurved {
        let w = &mut self.working;
        crate::tone_curve::apply_tone_curve(
            &mut w.image,
            w.config.recipe.highlights,
            w.config.recipe.shadows,
        );
        ToneCurved {
            working: self.working,
        }
    }
}

raster_stage!(
    /// Pipeline state after the tone curve.
    ToneCurved,
    "pipeline stages are consumed by advancing, call .adjust_color() to continue"
);

impl ToneCurved {
    /// Apply the color (saturation) adjustment.
    pub fn adjust_color(mut self) -> ColorAdjusted {
        let w = &mut self.working;
        crate::color::adjust_color(&mut w.image, w.config.recipe.color);
        ColorAdjusted {
            working: self.working,
        }
    }
}

raster_stage!(
    /// Pipeline state after the color adjustment.
    ColorAdjusted,
    "pipeline stages are consumed by advancing, call .color_chrome() to continue"
);

impl ColorAdjusted {
    /// Apply the color chrome effect.
    pub fn color_chrome(mut self) -> ChromeApplied {
        let w = &mut self.working;
        crate::color_chrome::apply_color_chrome(
            &mut w.image,
            w.config.recipe.color_chrome,
            w.config.recipe.color_chrome_blue,
        );
        ChromeApplied {
            working: self.working,
        }
    }
}

raster_stage!(
    /// Pipeline state after the color chrome effect.
    ChromeApplied,
    "pipeline stages are consumed by advancing, call .clarity() to continue"
);

impl ChromeApplied {
    /// Apply clarity.
    pub fn clarity(mut self) -> Clarified {
        let w = &mut self.working;
        crate::clarity::apply_clarity(&mut w.image, w.config.recipe.clarity);
        Clarified {
            working: self.working,
        }
    }
}

raster_stage!(
    /// Pipeline state after clarity.
    Clarified,
    "pipeline stages are consumed by advancing, call .grain() to continue"
);

impl Clarified {
    /// Add film grain.
    pub fn grain(mut self) -> Grained {
        let w = &mut self.working;
        crate::grain::add_grain(&mut w.image, w.config.recipe.grain, w.config.grain_seed);
        Grained {
            working: self.working,
        }
    }
}

raster_stage!(
    /// Pipeline state after grain.
    Grained,
    "pipeline stages are consumed by advancing, call .sharpen() to continue"
);

impl Grained {
    /// Run the sharpness pass over the finished buffer.
    pub fn sharpen(mut self) -> Sharpened {
        let w = &mut self.working;
        crate::sharpen::sharpen(&mut w.image, w.config.recipe.sharpness);
        Sharpened {
            working: self.working,
        }
    }
}

raster_stage!(
    /// Final pipeline state: every stage has run.
    ///
    /// Call [`into_result`](Self::into_result) to take the buffers.
    Sharpened,
    "call .into_result() to take the transformed image"
);

impl Sharpened {
    /// Consume the pipeline and return the original and transformed
    /// buffers.
    #[must_use]
    pub fn into_result(self) -> ProcessResult {
        self.working.into_result()
    }
}

// ──────────────────── PipelineStage trait + Stage enum ────────────────

/// Total number of stages in the pipeline (source, decode and the eight
/// transforms).
pub const STAGE_COUNT: usize = 10;

/// The output produced by a single pipeline stage.
#[must_use]
pub enum StageOutput<'a> {
    /// Source image bytes (not yet decoded).
    Source {
        /// The raw image bytes.
        bytes: &'a [u8],
    },
    /// The working buffer after this stage. For the decode stage this
    /// is the decoded original.
    Raster {
        /// The RGBA buffer.
        image: &'a RgbaImage,
    },
}

/// Trait implemented by every pipeline stage, enabling uniform iteration.
///
/// Both the typed API (individual stage structs) and the dynamic API
/// ([`Stage`] enum) are available. This trait bridges the two: each
/// stage struct implements it, and [`Stage`] delegates to whichever
/// variant it holds.
pub trait PipelineStage: Sized {
    /// Human-readable name of this stage (e.g. `"source"`, `"grain"`).
    const NAME: &str;

    /// Zero-based index of this stage (`0` for Pending through `9` for
    /// Sharpened).
    const INDEX: usize;

    /// The output this stage produced.
    fn output(&self) -> StageOutput<'_>;

    /// Stage parameters for diagnostics.
    ///
    /// Returns `None` for the initial [`Pending`] stage which has not
    /// yet performed any processing.
    fn metrics(&self) -> Option<StageMetrics>;

    /// Advance to the next stage.
    ///
    /// Returns `Ok(Some(stage))` on success, `Ok(None)` if already at
    /// the final stage, or `Err` if decoding fails.
    ///
    /// # Errors
    ///
    /// Returns the decode errors of [`Pending::decode`].
    fn next(self) -> Result<Option<Stage>, PipelineError>;

    /// Run all remaining stages to completion.
    ///
    /// # Errors
    ///
    /// Returns the decode errors of [`Pending::decode`] when called on
    /// [`Pending`].
    fn complete(self) -> Result<ProcessResult, PipelineError>;
}

impl PipelineStage for Pending {
    const NAME: &str = "source";
    const INDEX: usize = 0;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Source {
            bytes: &self.source,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        None
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(Stage::Decoded(self.decode()?)))
    }

    fn complete(self) -> Result<ProcessResult, PipelineError> {
        self.decode()?.complete()
    }
}

impl PipelineStage for Decoded {
    const NAME: &str = "decode";
    const INDEX: usize = 1;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Raster {
            image: &self.working.original,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        let dimensions = self.dimensions();
        Some(StageMetrics::Decode {
            input_bytes: self.source_len,
            width: dimensions.width,
            height: dimensions.height,
            pixel_count: dimensions.pixel_count(),
        })
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(Stage::FilmSimulated(self.simulate_film())))
    }

    fn complete(self) -> Result<ProcessResult, PipelineError> {
        self.simulate_film().complete()
    }
}

/// Implement [`PipelineStage`] for a transform state.
macro_rules! transform_stage {
    ($ty:ident, $name:literal, $index:literal, $advance:ident => $variant:ident, $metrics:expr) => {
        impl PipelineStage for $ty {
            const NAME: &str = $name;
            const INDEX: usize = $index;

            fn output(&self) -> StageOutput<'_> {
                StageOutput::Raster {
                    image: &self.working.image,
                }
            }

            fn metrics(&self) -> Option<StageMetrics> {
                let metrics: fn(&PipelineConfig) -> StageMetrics = $metrics;
                Some(metrics(&self.working.config))
            }

            fn next(self) -> Result<Option<Stage>, PipelineError> {
                Ok(Some(Stage::$variant(self.$advance())))
            }

            fn complete(self) -> Result<ProcessResult, PipelineError> {
                self.$advance().complete()
            }
        }
    };
}

transform_stage!(
    FilmSimulated, "film_simulation", 2, white_balance => WhiteBalanced,
    |c| StageMetrics::FilmSimulation {
        simulation: c.recipe.film_simulation,
    }
);

transform_stage!(
    WhiteBalanced, "white_balance", 3, tone_curve => ToneCurved,
    |c| StageMetrics::WhiteBalance {
        red: c.recipe.white_balance_shift.red,
        blue: c.recipe.white_balance_shift.blue,
        skipped: c.recipe.white_balance_shift.is_neutral(),
    }
);

transform_stage!(
    ToneCurved, "tone_curve", 4, adjust_color => ColorAdjusted,
    |c| StageMetrics::ToneCurve {
        highlights: c.recipe.highlights,
        shadows: c.recipe.shadows,
    }
);

transform_stage!(
    ColorAdjusted, "color", 5, color_chrome => ChromeApplied,
    |c| StageMetrics::Color {
        color: c.recipe.color,
        saturation: crate::color::saturation_factor(c.recipe.color),
        skipped: c.recipe.color == 0,
    }
);

transform_stage!(
    ChromeApplied, "color_chrome", 6, clarity => Clarified,
    |c| StageMetrics::ColorChrome {
        chroma: c.recipe.color_chrome,
        blue: c.recipe.color_chrome_blue,
        skipped: c.recipe.color_chrome.is_off() && c.recipe.color_chrome_blue.is_off(),
    }
);

transform_stage!(
    Clarified, "clarity", 7, grain => Grained,
    |c| StageMetrics::Clarity {
        clarity: c.recipe.clarity,
        skipped: c.recipe.clarity == 0,
    }
);

transform_stage!(
    Grained, "grain", 8, sharpen => Sharpened,
    |c| StageMetrics::Grain {
        level: c.recipe.grain,
        seed: c.grain_seed,
        skipped: c.recipe.grain.is_off(),
    }
);

impl PipelineStage for Sharpened {
    const NAME: &str = "sharpness";
    const INDEX: usize = 9;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Raster {
            image: &self.working.image,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        let sharpness = self.working.config.recipe.sharpness;
        Some(StageMetrics::Sharpness {
            sharpness,
            amount: crate::sharpen::amount(sharpness),
            skipped: sharpness == 0,
        })
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(None)
    }

    fn complete(self) -> Result<ProcessResult, PipelineError> {
        Ok(self.into_result())
    }
}

/// Enum wrapping all pipeline stages for uniform, loopable access.
///
/// Use [`From`] conversions to enter the dynamic API from any typed
/// stage, then call [`advance`](Self::advance) in a loop:
///
/// ```rust
/// # use filmsim_pipeline::{Pipeline, PipelineConfig, PipelineError};
/// # use filmsim_pipeline::pipeline::{Stage, Advance};
/// # fn run(png: Vec<u8>) -> Result<(), PipelineError> {
/// let mut stage: Stage = Pipeline::new(png, PipelineConfig::default()).into();
/// loop {
///     match stage.advance()? {
///         Advance::Next(next) => stage = next,
///         Advance::Complete(done) => { stage = done; break; }
///     }
/// }
/// let result = stage.complete()?;
/// # Ok(())
/// # }
/// ```
#[must_use]
pub enum Stage {
    /// See [`Pending`].
    Pending(Pending),
    /// See [`Decoded`].
    Decoded(Decoded),
    /// See [`FilmSimulated`].
    FilmSimulated(FilmSimulated),
    /// See [`WhiteBalanced`].
    WhiteBalanced(WhiteBalanced),
    /// See [`ToneCurved`].
    ToneCurved(ToneCurved),
    /// See [`ColorAdjusted`].
    ColorAdjusted(ColorAdjusted),
    /// See [`ChromeApplied`].
    ChromeApplied(ChromeApplied),
    /// See [`Clarified`].
    Clarified(Clarified),
    /// See [`Grained`].
    Grained(Grained),
    /// See [`Sharpened`].
    Sharpened(Sharpened),
}

/// Compile-time guard: adding a [`Stage`] variant makes this match
/// non-exhaustive until [`STAGE_COUNT`] is revisited.
#[allow(dead_code, clippy::match_same_arms)]
const fn _stage_count_guard(s: &Stage) {
    match s {
        Stage::Pending(_)
        | Stage::Decoded(_)
        | Stage::FilmSimulated(_)
        | Stage::WhiteBalanced(_)
        | Stage::ToneCurved(_)
        | Stage::ColorAdjusted(_)
        | Stage::ChromeApplied(_)
        | Stage::Clarified(_)
        | Stage::Grained(_)
        | Stage::Sharpened(_) => {}
    }
}

/// Result of [`Stage::advance`]: either the next stage or the
/// completed final stage returned unchanged.
#[must_use]
pub enum Advance {
    /// The pipeline advanced to this next stage.
    Next(Stage),
    /// The pipeline was already at the final stage, returned unchanged.
    Complete(Stage),
}

/// Delegate a method call to whichever `Stage` variant is active.
macro_rules! delegate {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        match $self {
            Self::Pending(s) => s.$method($($arg),*),
            Self::Decoded(s) => s.$method($($arg),*),
            Self::FilmSimulated(s) => s.$method($($arg),*),
            Self::WhiteBalanced(s) => s.$method($($arg),*),
            Self::ToneCurved(s) => s.$method($($arg),*),
            Self::ColorAdjusted(s) => s.$method($($arg),*),
            Self::ChromeApplied(s) => s.$method($($arg),*),
            Self::Clarified(s) => s.$method($($arg),*),
            Self::Grained(s) => s.$method($($arg),*),
            Self::Sharpened(s) => s.$method($($arg),*),
        }
    };
}

impl Stage {
    /// Human-readable name of the current stage.
    #[must_use]
    pub fn name(&self) -> &'static str {
        delegate!(self, name)
    }

    /// Zero-based index of the current stage.
    #[must_use]
    pub fn index(&self) -> usize {
        delegate!(self, index)
    }

    /// The output this stage produced.
    pub fn output(&self) -> StageOutput<'_> {
        delegate!(self, output)
    }

    /// The current RGBA buffer, or `None` before decoding.
    #[must_use]
    pub fn image(&self) -> Option<&RgbaImage> {
        match self.output() {
            StageOutput::Source { .. } => None,
            StageOutput::Raster { image } => Some(image),
        }
    }

    /// Stage parameters for diagnostics. `None` for `Pending`.
    #[must_use]
    pub fn metrics(&self) -> Option<StageMetrics> {
        delegate!(self, metrics)
    }

    /// Whether the pipeline is at the final stage.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Sharpened(_))
    }

    /// Advance to the next stage.
    ///
    /// Returns `Ok(Some(next_stage))` on success, `Ok(None)` if
    /// already complete (the `Sharpened` value is consumed), or `Err`
    /// if decoding fails.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if decoding fails.
    pub fn next(self) -> Result<Option<Self>, PipelineError> {
        delegate!(self, next)
    }

    /// Advance to the next stage, returning `self` unchanged if
    /// already complete.
    ///
    /// Unlike [`next`](Self::next), which consumes the final stage and
    /// returns `Ok(None)`, `advance()` returns [`Advance::Complete`] with
    /// the final stage so you can still call
    /// [`complete`](Self::complete) on it.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if decoding fails.
    pub fn advance(self) -> Result<Advance, PipelineError> {
        if self.is_complete() {
            return Ok(Advance::Complete(self));
        }
        // Only `Sharpened` returns `None` from next(), and it is handled
        // above.
        #[allow(clippy::unreachable)]
        let next = self
            .next()?
            .unwrap_or_else(|| unreachable!("non-complete stage returned None from next()"));
        Ok(Advance::Next(next))
    }

    /// Run all remaining stages to completion.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if decoding has not happened yet and
    /// fails.
    pub fn complete(self) -> Result<ProcessResult, PipelineError> {
        delegate!(self, complete)
    }
}

// `PipelineStage`'s associated constants aren't reachable through
// `self`, so the delegate macro goes through this helper.
trait StageMetadata {
    fn name(&self) -> &'static str;
    fn index(&self) -> usize;
}

impl<T: PipelineStage> StageMetadata for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn index(&self) -> usize {
        T::INDEX
    }
}

macro_rules! stage_from {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for Stage {
                fn from(s: $ty) -> Self {
                    Self::$ty(s)
                }
            }
        )*
    };
}

stage_from!(
    Pending,
    Decoded,
    FilmSimulated,
    WhiteBalanced,
    ToneCurved,
    ColorAdjusted,
    ChromeApplied,
    Clarified,
    Grained,
    Sharpened,
);

// ───────────────────── Pipeline entry point ──────────────────────────

/// Incremental film-recipe pipeline.
///
/// Created via [`Pipeline::new`], which stores the source image and
/// config without doing any processing. Each stage method consumes the
/// current state and returns the next, making it a compile-time error
/// to skip stages or call them out of order.
pub struct Pipeline;

impl Pipeline {
    /// Create a new pipeline from source image bytes and config.
    ///
    /// No processing is performed. Call
    /// [`.decode()`](Pending::decode) (or convert to a [`Stage`] and
    /// loop) to begin.
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(image_bytes: Vec<u8>, config: PipelineConfig) -> Pending {
        Pending {
            config,
            source: image_bytes,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::recipe;
    use crate::types::GrainSeed;

    /// A colorful gradient PNG with partial transparency.
    fn gradient_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([
                u8::try_from(x * 255 / width.max(1)).unwrap(),
                u8::try_from(y * 255 / height.max(1)).unwrap(),
                u8::try_from((x + y) % 256).unwrap(),
                u8::try_from(128 + (x % 128)).unwrap(),
            ])
        });
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

    fn seeded(id: &str) -> PipelineConfig {
        PipelineConfig::from_recipe_id(id)
            .unwrap()
            .with_grain_seed(GrainSeed::Fixed(11))
    }

    #[test]
    fn typed_chain_matches_transform() {
        let png = gradient_png(24, 16);
        let config = seeded("nightwalker");
        let result = Pipeline::new(png, config.clone())
            .decode()
            .unwrap()
            .simulate_film()
            .white_balance()
            .tone_curve()
            .adjust_color()
            .color_chrome()
            .clarity()
            .grain()
            .sharpen()
            .into_result();

        let mut expected = result.original.clone();
        crate::transform(&mut expected, &config.recipe, config.grain_seed);
        assert_eq!(result.transformed, expected);
        assert_eq!(result.recipe_name, "Nightwalker");
        assert_eq!(
            result.dimensions,
            Dimensions {
                width: 24,
                height: 16
            }
        );
    }

    #[test]
    fn original_is_kept_untouched() {
        let png = gradient_png(8, 8);
        let decoded = crate::decode::decode_rgba(&png).unwrap();
        let result = Pipeline::new(png, seeded("nano-banana-pro"))
            .decode()
            .unwrap()
            .complete()
            .unwrap();
        assert_eq!(result.original, decoded);
        assert_ne!(result.transformed, decoded);
    }

    #[test]
    fn decode_error_surfaces_from_pending() {
        let result = Pipeline::new(Vec::new(), PipelineConfig::default()).decode();
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn loop_visits_every_stage_in_order() {
        let mut stage: Stage = Pipeline::new(gradient_png(6, 6), seeded("kodak-gold-200")).into();
        let mut names = vec![stage.name()];
        loop {
            match stage.advance().unwrap() {
                Advance::Next(next) => {
                    assert_eq!(next.index(), names.len());
                    names.push(next.name());
                    stage = next;
                }
                Advance::Complete(done) => {
                    stage = done;
                    break;
                }
            }
        }
        assert_eq!(names.len(), STAGE_COUNT);
        assert_eq!(
            names,
            [
                "source",
                "decode",
                "film_simulation",
                "white_balance",
                "tone_curve",
                "color",
                "color_chrome",
                "clarity",
                "grain",
                "sharpness",
            ]
        );
        assert!(stage.is_complete());
        let result = stage.complete().unwrap();
        assert_eq!(result.recipe_name, "Kodak Gold 200");
    }

    #[test]
    fn next_on_final_stage_returns_none() {
        let stage: Stage = Pipeline::new(gradient_png(4, 4), seeded("fuji-astia"))
            .decode()
            .unwrap()
            .simulate_film()
            .white_balance()
            .tone_curve()
            .adjust_color()
            .color_chrome()
            .clarity()
            .grain()
            .sharpen()
            .into();
        assert!(stage.next().unwrap().is_none());
    }

    #[test]
    fn complete_from_pending_equals_full_chain() {
        let png = gradient_png(12, 9);
        let via_stage: Stage = Pipeline::new(png.clone(), seeded("pro-neg-hi")).into();
        let a = via_stage.complete().unwrap();
        let b = crate::process(&png, &seeded("pro-neg-hi")).unwrap();
        assert_eq!(a.transformed, b.transformed);
    }

    #[test]
    fn metrics_reflect_recipe() {
        let mut stage: Stage = Pipeline::new(gradient_png(5, 5), seeded("eastman-color")).into();
        assert!(stage.metrics().is_none());
        assert!(stage.image().is_none());

        let mut seen = Vec::new();
        while let Advance::Next(next) = stage.advance().unwrap() {
            seen.push(next.metrics().unwrap());
            assert!(next.image().is_some());
            stage = next;
        }

        // eastman-color has both chrome levels off and grain weak.
        assert!(seen.iter().any(|m| matches!(
            m,
            StageMetrics::ColorChrome { skipped: true, .. }
        )));
        assert!(seen.iter().any(|m| matches!(
            m,
            StageMetrics::Grain {
                skipped: false,
                level: recipe::EffectLevel::Weak,
                ..
            }
        )));
        assert!(seen.iter().any(|m| matches!(
            m,
            StageMetrics::Decode {
                width: 5,
                height: 5,
                pixel_count: 25,
                ..
            }
        )));
    }
}
