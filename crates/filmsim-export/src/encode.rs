//! Raster encoders.
//!
//! JPEG has no alpha channel, so RGBA buffers are flattened to RGB by
//! dropping alpha before encoding. Nothing is composited over a
//! background: semi-transparent and fully transparent pixels are
//! exported as if they were opaque, with their stored RGB values.
//! PNG keeps all four channels.

use filmsim_pipeline::RgbaImage;
use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};

/// JPEG quality used for downloads.
pub const JPEG_QUALITY: u8 = 98;

/// Errors that can occur while encoding an output image.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The JPEG encoder rejected the image.
    #[error("failed to encode JPEG: {0}")]
    Jpeg(#[source] image::ImageError),

    /// The PNG encoder rejected the image.
    #[error("failed to encode PNG: {0}")]
    Png(#[source] image::ImageError),

    /// The image has zero width or height.
    #[error("cannot encode an empty image")]
    EmptyImage,
}

fn ensure_not_empty(image: &RgbaImage) -> Result<(), EncodeError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(EncodeError::EmptyImage);
    }
    Ok(())
}

/// Encode an RGBA buffer as JPEG, discarding alpha.
///
/// Every pixel is written with its RGB values as stored, whatever its
/// alpha.
///
/// `quality` is clamped to `1..=100`; pass [`JPEG_QUALITY`] for the
/// download setting.
///
/// # Errors
///
/// Returns [`EncodeError::EmptyImage`] for zero-area buffers and
/// [`EncodeError::Jpeg`] if the encoder fails.
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    ensure_not_empty(image)?;

    let rgb: RgbImage = image.convert();
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    encoder
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(EncodeError::Jpeg)?;

    log::debug!(
        "encoded {}x{} JPEG at quality {quality}: {} bytes",
        rgb.width(),
        rgb.height(),
        buf.len()
    );
    Ok(buf)
}

/// Encode an RGBA buffer as PNG.
///
/// # Errors
///
/// Returns [`EncodeError::EmptyImage`] for zero-area buffers and
/// [`EncodeError::Png`] if the encoder fails.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, EncodeError> {
    ensure_not_empty(image)?;

    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(EncodeError::Png)?;
    Ok(buf)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> RgbaImage {
        RgbaImage::from_fn(16, 12, |x, y| {
            image::Rgba([
                u8::try_from(x * 15).unwrap(),
                u8::try_from(y * 20).unwrap(),
                100,
                u8::try_from(x * 10 + y).unwrap(),
            ])
        })
    }

    #[test]
    fn jpeg_has_soi_marker_and_decodes_opaque() {
        let jpeg = encode_jpeg(&sample(), JPEG_QUALITY).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 12));
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn jpeg_exports_transparent_pixels_as_opaque() {
        let img = RgbaImage::from_fn(16, 16, |x, _| {
            let alpha = if x < 8 { 0 } else { 40 };
            image::Rgba([200, 40, 40, alpha])
        });
        let jpeg = encode_jpeg(&img, JPEG_QUALITY).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap().to_rgb8();
        for p in decoded.pixels() {
            let [r, g, b] = p.0;
            assert!(r.abs_diff(200) <= 4 && g.abs_diff(40) <= 4 && b.abs_diff(40) <= 4, "{:?}", p.0);
        }
    }

    #[test]
    fn jpeg_quality_affects_size() {
        let img = sample();
        let high = encode_jpeg(&img, 98).unwrap();
        let low = encode_jpeg(&img, 10).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn jpeg_quality_zero_is_clamped() {
        assert!(encode_jpeg(&sample(), 0).is_ok());
    }

    #[test]
    fn png_round_trips_exactly() {
        let img = sample();
        let png = encode_png(&img).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn empty_image_is_rejected() {
        let empty = RgbaImage::new(0, 4);
        assert!(matches!(encode_jpeg(&empty, 98), Err(EncodeError::EmptyImage)));
        assert!(matches!(encode_png(&empty), Err(EncodeError::EmptyImage)));
    }
}
