//! Image decoding.
//!
//! Accepts raw image bytes (JPEG, PNG, WebP) and produces the RGBA8
//! buffer the stages operate on. The format is sniffed from the content,
//! not from a file name. Other formats the `image` crate can recognise
//! (GIF, BMP, ...) are rejected with
//! [`PipelineError::UnsupportedFormat`].

use image::{DynamicImage, ImageFormat};

use crate::types::{PipelineError, RgbaImage};

/// Formats accepted as pipeline input.
pub const SUPPORTED_FORMATS: [ImageFormat; 3] =
    [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::WebP];

/// Decode raw image bytes into a [`DynamicImage`].
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the format cannot be
/// determined or the data is corrupt.
/// Returns [`PipelineError::UnsupportedFormat`] for recognised formats
/// other than JPEG, PNG and WebP.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let format = image::guess_format(bytes)?;
    if !SUPPORTED_FORMATS.contains(&format) {
        return Err(PipelineError::UnsupportedFormat(format!("{format:?}")));
    }

    Ok(image::load_from_memory_with_format(bytes, format)?)
}

/// Decode raw image bytes straight into an RGBA8 buffer.
///
/// Images without an alpha channel get alpha 255.
///
/// # Errors
///
/// Same as [`decode`].
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, PipelineError> {
    Ok(decode(bytes)?.to_rgba8())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Helper: encode an RGBA image as PNG bytes.
    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
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

    #[test]
    fn empty_input_returns_error() {
        let result = decode(&[]);
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn truncated_png_returns_image_decode_error() {
        let img = RgbaImage::from_pixel(8, 8, image::Rgba([1, 2, 3, 255]));
        let png = png_bytes(&img);
        let result = decode(&png[..png.len() / 2]);
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn gif_is_rejected_as_unsupported() {
        let mut bytes = b"GIF89a".to_vec();
        bytes.extend_from_slice(&[0; 32]);
        let result = decode(&bytes);
        assert!(
            matches!(result, Err(PipelineError::UnsupportedFormat(ref f)) if f == "Gif"),
            "got {result:?}"
        );
    }

    #[test]
    fn png_round_trips_pixels_and_alpha() {
        let img = RgbaImage::from_fn(3, 2, |x, y| {
            image::Rgba([
                u8::try_from(x * 40).unwrap(),
                u8::try_from(y * 90).unwrap(),
                77,
                u8::try_from(100 + x).unwrap(),
            ])
        });
        let decoded = decode_rgba(&png_bytes(&img)).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn jpeg_decodes_with_opaque_alpha() {
        let rgb = image::RgbImage::from_pixel(9, 5, image::Rgb([120, 130, 140]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 95);
        image::ImageEncoder::write_image(
            encoder,
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();

        let decoded = decode_rgba(&buf).unwrap();
        assert_eq!(decoded.dimensions(), (9, 5));
        assert!(decoded.pixels().all(|p| p.0[3] == 255));
    }
}
