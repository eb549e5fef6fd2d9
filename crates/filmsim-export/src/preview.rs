//! Render a recipe preview with fallback to the original image.
//!
//! [`render_preview`] decodes, transforms and encodes in one call. If
//! any step fails the caller still gets something to show: the
//! untouched input bytes, together with the error that prevented the
//! transform.

use filmsim_pipeline::{Dimensions, PipelineConfig, PipelineError};

use crate::encode::{EncodeError, JPEG_QUALITY, encode_jpeg};

/// Why a preview fell back to the original image.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// Decoding the input failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Encoding the transformed image failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Outcome of [`render_preview`].
#[derive(Debug)]
pub enum Preview {
    /// The recipe was applied.
    Transformed {
        /// JPEG-encoded transformed image.
        jpeg: Vec<u8>,
        /// Image dimensions.
        dimensions: Dimensions,
    },
    /// Processing failed; the input is returned as-is.
    Original {
        /// The input bytes, unchanged.
        bytes: Vec<u8>,
        /// What went wrong.
        error: PreviewError,
    },
}

impl Preview {
    /// Bytes to display: the JPEG on success, the input on fallback.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Transformed { jpeg, .. } => jpeg,
            Self::Original { bytes, .. } => bytes,
        }
    }

    /// Whether the recipe was applied.
    #[must_use]
    pub const fn is_transformed(&self) -> bool {
        matches!(self, Self::Transformed { .. })
    }

    /// The failure, if this is a fallback.
    #[must_use]
    pub const fn error(&self) -> Option<&PreviewError> {
        match self {
            Self::Transformed { .. } => None,
            Self::Original { error, .. } => Some(error),
        }
    }
}

fn render(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<(Vec<u8>, Dimensions), PreviewError> {
    let result = filmsim_pipeline::process(image_bytes, config)?;
    let jpeg = encode_jpeg(&result.transformed, JPEG_QUALITY)?;
    Ok((jpeg, result.dimensions))
}

/// Apply `config` to `image_bytes` and encode the result as JPEG.
///
/// Never fails: on any error the input bytes are returned unchanged in
/// [`Preview::Original`] along with the error, which is also logged.
#[must_use]
pub fn render_preview(image_bytes: &[u8], config: &PipelineConfig) -> Preview {
    match render(image_bytes, config) {
        Ok((jpeg, dimensions)) => Preview::Transformed { jpeg, dimensions },
        Err(error) => {
            log::warn!(
                "preview with {:?} failed, showing original: {error}",
                config.recipe.name
            );
            Preview::Original {
                bytes: image_bytes.to_vec(),
                error,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use filmsim_pipeline::{GrainSeed, RgbaImage};

    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([
                u8::try_from(x * 20).unwrap(),
                u8::try_from(y * 20).unwrap(),
                128,
                255,
            ])
        });
        crate::encode::encode_png(&img).unwrap()
    }

    #[test]
    fn successful_preview_is_jpeg() {
        let config = PipelineConfig::from_recipe_id("kodak-gold-200")
            .unwrap()
            .with_grain_seed(GrainSeed::Fixed(1));
        let preview = render_preview(&png(10, 10), &config);
        assert!(preview.is_transformed());
        assert!(preview.error().is_none());
        assert_eq!(&preview.bytes()[..2], &[0xFF, 0xD8]);
        assert!(matches!(
            preview,
            Preview::Transformed {
                dimensions: Dimensions {
                    width: 10,
                    height: 10
                },
                ..
            }
        ));
    }

    #[test]
    fn corrupt_input_falls_back_to_original() {
        let garbage = vec![0x00, 0x01, 0x02, 0x03];
        let preview = render_preview(&garbage, &PipelineConfig::default());
        assert!(!preview.is_transformed());
        assert_eq!(preview.bytes(), garbage.as_slice());
        assert!(matches!(
            preview.error(),
            Some(PreviewError::Pipeline(PipelineError::ImageDecode(_)))
        ));
    }

    #[test]
    fn empty_input_falls_back_with_error() {
        let preview = render_preview(&[], &PipelineConfig::default());
        assert!(matches!(
            preview,
            Preview::Original {
                error: PreviewError::Pipeline(PipelineError::EmptyInput),
                ..
            }
        ));
    }

    #[test]
    fn error_message_is_passed_through() {
        let preview = render_preview(&[], &PipelineConfig::default());
        assert_eq!(
            preview.error().unwrap().to_string(),
            "input image data is empty"
        );
    }
}
