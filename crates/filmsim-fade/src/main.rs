//! Generate a before/after comparison image for a film recipe.
//!
//! Two layouts are supported: a slider-style split (original left of the
//! divider, recipe output right of it) and a smooth linear fade between
//! the two along a rotatable gradient.

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use filmsim_pipeline::{DEFAULT_RECIPE_ID, GrainSeed, PipelineConfig, RgbaImage};
use image::Rgba;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

/// Generate a before/after comparison image: the decoded original and
/// the recipe output, either split by a divider or blended smoothly.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Input image path (JPEG, PNG, WebP).
    input: PathBuf,

    /// Output image path. `.jpg`/`.jpeg` writes JPEG, anything else PNG.
    #[arg(short, long)]
    output: PathBuf,

    /// Built-in recipe identifier.
    #[arg(long, default_value = DEFAULT_RECIPE_ID)]
    recipe: String,

    /// Fixed grain seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Comparison layout.
    #[arg(long, value_enum, default_value_t = Mode::Split)]
    mode: Mode,

    /// Split position as a percentage of image width (split mode).
    #[arg(long, value_name = "PERCENT", default_value_t = 50.0)]
    position: f64,

    /// Center point of the fade gradient as "X,Y" percentages of image
    /// width and height (fade mode).
    #[arg(long, value_name = "X,Y", default_value = "50,50")]
    fade_center: String,

    /// Clockwise rotation of the fade gradient direction in degrees.
    /// 0 = horizontal left-to-right, 90 = top-to-bottom.
    #[arg(long, value_name = "DEG", default_value_t = 0.0)]
    fade_angle: f64,
}

/// Comparison layout selection.
#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Hard split with a divider line and a round handle.
    Split,
    /// Linear blend along a gradient.
    Fade,
}

// ---------------------------------------------------------------------------
// Fade parameters
// ---------------------------------------------------------------------------

/// Controls the direction, position, and orientation of the blend gradient.
struct FadeParams {
    /// Center of the fade as fractions (0.0–1.0) of image width / height.
    center_x: f64,
    center_y: f64,
    /// Clockwise rotation angle in radians.
    angle_rad: f64,
}

impl FadeParams {
    /// Parse `--fade-center "X,Y"` (percentages) and `--fade-angle` (degrees).
    fn parse(center: &str, angle_deg: f64) -> Result<Self, String> {
        let (x_str, y_str) = center
            .split_once(',')
            .ok_or_else(|| format!("fade-center must be 'X,Y', got: '{center}'"))?;

        let x_pct: f64 = x_str
            .trim()
            .parse()
            .map_err(|e| format!("invalid fade-center X '{x_str}': {e}"))?;
        let y_pct: f64 = y_str
            .trim()
            .parse()
            .map_err(|e| format!("invalid fade-center Y '{y_str}': {e}"))?;

        Ok(Self {
            center_x: x_pct / 100.0,
            center_y: y_pct / 100.0,
            angle_rad: angle_deg.to_radians(),
        })
    }
}

// ---------------------------------------------------------------------------
// Split layout
// ---------------------------------------------------------------------------

/// Column at which the transformed image starts, for `position` percent.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn split_column(width: u32, position: f64) -> Result<u32, String> {
    if !(0.0..=100.0).contains(&position) {
        return Err(format!("position must be within 0..=100, got {position}"));
    }
    let column = (position / 100.0 * f64::from(width)).round() as u32;
    Ok(column.min(width))
}

/// Original pixels left of `column`, transformed pixels from `column` on.
fn split_images(original: &RgbaImage, transformed: &RgbaImage, column: u32) -> RgbaImage {
    RgbaImage::from_fn(original.width(), original.height(), |x, y| {
        if x < column {
            *original.get_pixel(x, y)
        } else {
            *transformed.get_pixel(x, y)
        }
    })
}

#[allow(clippy::cast_possible_truncation)]
fn premultiply(c: u8, a: u8) -> u8 {
    ((u16::from(c) * u16::from(a) + 127) / 255) as u8
}

#[allow(clippy::cast_possible_truncation)]
fn unpremultiply(c: u8, a: u8) -> u8 {
    if a == 0 {
        0
    } else {
        (u16::from(c) * 255 / u16::from(a)).min(255) as u8
    }
}

/// Draw the slider divider and its circular handle over `image` at
/// `column`.
///
/// The image goes through a premultiplied `tiny-skia` pixmap and back.
/// Returns the image unchanged if it has zero area.
#[allow(clippy::cast_precision_loss)]
fn draw_divider(image: RgbaImage, column: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let Some(mut pixmap) = Pixmap::new(width, height) else {
        return image;
    };
    for (dst, src) in pixmap.data_mut().chunks_exact_mut(4).zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        dst.copy_from_slice(&[premultiply(r, a), premultiply(g, a), premultiply(b, a), a]);
    }

    let w = width as f32;
    let h = height as f32;
    let x = column as f32;
    let line_width = (w / 400.0).max(2.0);
    let radius = (w.min(h) / 30.0).max(6.0);

    let mut white = Paint::default();
    white.set_color_rgba8(255, 255, 255, 255);
    white.anti_alias = true;

    let mut outline = Paint::default();
    outline.set_color_rgba8(0, 0, 0, 160);
    outline.anti_alias = true;

    if let Some(rect) = Rect::from_xywh(x - line_width / 2.0, 0.0, line_width, h) {
        pixmap.fill_rect(rect, &white, Transform::identity(), None);
    }

    if let Some(handle) = PathBuilder::from_circle(x, h / 2.0, radius) {
        let stroke = Stroke {
            width: line_width / 2.0,
            ..Stroke::default()
        };
        pixmap.fill_path(
            &handle,
            &white,
            FillRule::Winding,
            Transform::identity(),
            None,
        );
        pixmap.stroke_path(&handle, &outline, &stroke, Transform::identity(), None);
    }

    let data = pixmap.data();
    RgbaImage::from_fn(width, height, |px, py| {
        let off = (py as usize * width as usize + px as usize) * 4;
        let a = data[off + 3];
        Rgba([
            unpremultiply(data[off], a),
            unpremultiply(data[off + 1], a),
            unpremultiply(data[off + 2], a),
            a,
        ])
    })
}

// ---------------------------------------------------------------------------
// Fade layout
// ---------------------------------------------------------------------------

/// Blend two RGBA images along a directed linear gradient.
///
/// The gradient is centred on `fade.center_x/y` (as fractions of the image
/// dimensions) and rotated by `fade.angle_rad` clockwise.  `t = 0.5` falls
/// exactly on the centre point; the gradient extends symmetrically to the
/// farthest image corner in each direction.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend_images(original: &RgbaImage, transformed: &RgbaImage, fade: &FadeParams) -> RgbaImage {
    let (width, height) = original.dimensions();

    let w = f64::from(width);
    let h = f64::from(height);
    let cx = fade.center_x * w;
    let cy = fade.center_y * h;
    let cos_a = fade.angle_rad.cos();
    let sin_a = fade.angle_rad.sin();

    let half_extent = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)]
        .iter()
        .map(|&(x, y)| (x - cx).mul_add(cos_a, (y - cy) * sin_a).abs())
        .fold(0.0_f64, f64::max);

    let inv_extent = if half_extent > f64::EPSILON {
        0.5 / half_extent
    } else {
        0.0
    };

    RgbaImage::from_fn(width, height, |x_px, y_px| {
        let proj = (f64::from(x_px) - cx).mul_add(cos_a, (f64::from(y_px) - cy) * sin_a);
        let t = proj.mul_add(inv_extent, 0.5).clamp(0.0, 1.0);

        let orig = original.get_pixel(x_px, y_px);
        let done = transformed.get_pixel(x_px, y_px);

        let blend = |o: u8, p: u8| -> u8 {
            let val = f64::from(o).mul_add(1.0 - t, f64::from(p) * t);
            val.round().clamp(0.0, 255.0) as u8
        };

        Rgba([
            blend(orig[0], done[0]),
            blend(orig[1], done[1]),
            blend(orig[2], done[2]),
            blend(orig[3], done[3]),
        ])
    })
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn is_jpeg_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
}

fn encode_for(path: &Path, image: &RgbaImage) -> Result<Vec<u8>, filmsim_export::EncodeError> {
    if is_jpeg_path(path) {
        filmsim_export::encode_jpeg(image, filmsim_export::JPEG_QUALITY)
    } else {
        filmsim_export::encode_png(image)
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut config = PipelineConfig::from_recipe_id(&args.recipe)?;
    if let Some(seed) = args.seed {
        config = config.with_grain_seed(GrainSeed::Fixed(seed));
    }

    eprintln!("Reading image from {}", args.input.display());
    let image_bytes = std::fs::read(&args.input)?;

    eprintln!("Applying recipe {:?}...", config.recipe.name);
    let result = filmsim_pipeline::process(&image_bytes, &config)?;
    let (width, height) = (result.dimensions.width, result.dimensions.height);
    eprintln!("Image: {width}x{height}");

    let composite = match args.mode {
        Mode::Split => {
            let column = split_column(width, args.position).map_err(|e| format!("--position: {e}"))?;
            eprintln!("Split at column {column} ({:.1}%)", args.position);
            let split = split_images(&result.original, &result.transformed, column);
            draw_divider(split, column)
        }
        Mode::Fade => {
            let fade = FadeParams::parse(&args.fade_center, args.fade_angle)
                .map_err(|e| format!("--fade-center / --fade-angle: {e}"))?;
            eprintln!(
                "Fade center: ({:.0}%, {:.0}%), angle: {:.1}°",
                fade.center_x * 100.0,
                fade.center_y * 100.0,
                args.fade_angle,
            );
            blend_images(&result.original, &result.transformed, &fade)
        }
    };

    let bytes = encode_for(&args.output, &composite)?;
    eprintln!("Saving to {} ({} bytes)", args.output.display(), bytes.len());
    std::fs::write(&args.output, bytes)?;

    eprintln!("Done.");
    Ok(())
}
