//! Shared types for the filmsim pipeline.

use serde::{Deserialize, Serialize};

use crate::recipe::Recipe;

/// Re-export `RgbaImage` so downstream crates can hold pixel buffers
/// without depending on `image` directly.
///
/// This is the pipeline's working buffer: row-major RGBA8 with its own
/// width and height. Stages mutate the RGB channels in place and never
/// touch alpha.
pub use image::RgbaImage;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Dimensions of an image buffer.
    #[must_use]
    pub fn of(image: &RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }

    /// Total pixel count (`width * height`).
    #[must_use]
    pub fn pixel_count(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Whether the image has at least one pixel not on the outer
    /// 1-pixel border. Neighborhood stages only write interior pixels.
    #[must_use]
    pub const fn has_interior(self) -> bool {
        self.width >= 3 && self.height >= 3
    }
}

/// Where the grain stage draws its random samples from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrainSeed {
    /// Thread-local entropy-seeded generator; output differs per run.
    #[default]
    Entropy,
    /// Deterministic per-row generators derived from this seed. Output
    /// is identical across runs and thread counts.
    Fixed(u64),
}

/// Configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// The film recipe to apply.
    pub recipe: Recipe,

    /// Random source for the grain stage.
    #[serde(default)]
    pub grain_seed: GrainSeed,
}

impl PipelineConfig {
    /// Build a config from a built-in recipe identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnknownRecipe`] if the identifier is not
    /// in the recipe table.
    pub fn from_recipe_id(id: &str) -> Result<Self, PipelineError> {
        Ok(Self {
            recipe: crate::recipe::lookup(id)?.clone(),
            grain_seed: GrainSeed::default(),
        })
    }

    /// Replace the grain seed.
    #[must_use]
    pub const fn with_grain_seed(mut self, grain_seed: GrainSeed) -> Self {
        self.grain_seed = grain_seed;
        self
    }
}

/// Result of running the full pipeline on encoded image bytes.
///
/// Keeps the decoded original alongside the transformed buffer so a
/// caller can show a before/after comparison or fall back to the
/// original.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Display name of the recipe that was applied.
    pub recipe_name: String,
    /// Decoded input, untouched.
    pub original: RgbaImage,
    /// Output of the last stage.
    pub transformed: RgbaImage,
    /// Image dimensions (identical for both buffers).
    pub dimensions: Dimensions,
}

/// Errors that can occur during pipeline processing.
///
/// The pixel stages themselves cannot fail; every variant comes from
/// decoding the input or resolving the recipe.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The input was recognised but is not JPEG, PNG or WebP.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// No built-in recipe has this identifier.
    #[error("unknown recipe: {0}")]
    UnknownRecipe(String),

    /// A recipe field is outside its documented range.
    #[error("invalid recipe: {0}")]
    InvalidRecipe(String),
}
