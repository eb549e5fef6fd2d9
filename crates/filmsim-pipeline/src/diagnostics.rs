//! Pipeline diagnostics: timing, parameters and pixel statistics for
//! each stage.
//!
//! [`process_staged_with_diagnostics`] drives the [`Stage`] loop and
//! records, per stage, the wall-clock duration, the parameters the stage
//! ran with, whether it was skipped, and how it changed the buffer
//! (pixels whose RGB changed, mean luminance before and after).
//!
//! Time is read through the [`Clock`] trait so callers supply their own
//! source: [`WebClock`] uses the `web-time` crate (`performance.now()`
//! on WASM, `std::time::Instant` on native).
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::{Advance, Pipeline, STAGE_COUNT, Stage};
use crate::pixel::luminance_u8;
use crate::recipe::{EffectLevel, FilmSimulation};
use crate::types::{GrainSeed, PipelineConfig, PipelineError, ProcessResult, RgbaImage};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// [`Clock`] backed by [`web_time::Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WebClock;

impl Clock for WebClock {
    type Instant = web_time::Instant;

    fn now(&self) -> web_time::Instant {
        web_time::Instant::now()
    }

    fn elapsed(&self, since: &web_time::Instant) -> Duration {
        since.elapsed()
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// One entry per executed stage, in pipeline order, starting with
    /// decode.
    pub stages: Vec<StageDiagnostics>,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Whole-run summary.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Stage name (see [`PipelineStage::NAME`](crate::pipeline::PipelineStage::NAME)).
    pub name: String,
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Parameters the stage ran with.
    pub metrics: StageMetrics,
    /// How the stage changed the buffer. `None` for decode.
    pub changes: Option<ChangeStats>,
}

/// Effect of one stage on the working buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChangeStats {
    /// Pixels whose R, G or B differs after the stage.
    pub changed_pixels: u64,
    /// Mean luminance before the stage.
    pub mean_luminance_before: f64,
    /// Mean luminance after the stage.
    pub mean_luminance_after: f64,
}

impl ChangeStats {
    /// Compare a buffer before and after a stage.
    #[must_use]
    pub fn between(before: &RgbaImage, after: &RgbaImage) -> Self {
        Self {
            changed_pixels: changed_pixels(before, after),
            mean_luminance_before: mean_luminance(before),
            mean_luminance_after: mean_luminance(after),
        }
    }
}

/// Stage parameters, one variant per stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
        /// Total pixel count (`width * height`).
        pixel_count: u64,
    },
    /// Film simulation base look.
    FilmSimulation {
        /// The simulation applied.
        simulation: FilmSimulation,
    },
    /// White balance shift.
    WhiteBalance {
        /// Red shift.
        red: i32,
        /// Blue shift.
        blue: i32,
        /// `true` for a `{0, 0}` shift.
        skipped: bool,
    },
    /// Tone curve.
    ToneCurve {
        /// Highlight setting.
        highlights: i32,
        /// Shadow setting.
        shadows: i32,
    },
    /// Color adjustment.
    Color {
        /// Color setting.
        color: i32,
        /// Resulting saturation multiplier.
        saturation: f64,
        /// `true` when `color == 0`.
        skipped: bool,
    },
    /// Color chrome effect.
    ColorChrome {
        /// Chroma level.
        chroma: EffectLevel,
        /// Blue level.
        blue: EffectLevel,
        /// `true` when both levels are off.
        skipped: bool,
    },
    /// Clarity.
    Clarity {
        /// Clarity setting.
        clarity: i32,
        /// `true` when `clarity == 0`.
        skipped: bool,
    },
    /// Grain.
    Grain {
        /// Grain level.
        level: EffectLevel,
        /// Random source.
        seed: GrainSeed,
        /// `true` when grain is off.
        skipped: bool,
    },
    /// Sharpness pass.
    Sharpness {
        /// Sharpness setting.
        sharpness: i32,
        /// Unsharp mask weight.
        amount: f64,
        /// `true` when `sharpness == 0`.
        skipped: bool,
    },
}

impl StageMetrics {
    /// Whether the stage left the buffer alone because its setting
    /// was neutral.
    #[must_use]
    pub const fn skipped(&self) -> bool {
        match self {
            Self::WhiteBalance { skipped, .. }
            | Self::Color { skipped, .. }
            | Self::ColorChrome { skipped, .. }
            | Self::Clarity { skipped, .. }
            | Self::Grain { skipped, .. }
            | Self::Sharpness { skipped, .. } => *skipped,
            Self::Decode { .. } | Self::FilmSimulation { .. } | Self::ToneCurve { .. } => false,
        }
    }
}

/// High-level summary for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Display name of the recipe.
    pub recipe_name: String,
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Original versus final buffer.
    pub overall: ChangeStats,
}

impl PipelineDiagnostics {
    /// Duration of the named stage, if it ran.
    #[must_use]
    pub fn stage_duration(&self, name: &str) -> Option<Duration> {
        self.stages
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.duration)
    }

    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!("Recipe: {}", self.summary.recipe_name));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<18} {:>10} {:>8} {:>10}  {}",
            "Stage", "Duration", "% Total", "Changed", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        for stage in &self.stages {
            let ms = duration_ms(stage.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let changed = stage
                .changes
                .map_or_else(|| "-".to_string(), |c| c.changed_pixels.to_string());
            let details = format_metrics(&stage.metrics, stage.changes.as_ref());
            lines.push(format!(
                "{:<18} {ms:>8.3}ms {pct:>7.1}% {changed:>10}  {details}",
                stage.name
            ));
        }

        let overall = &self.summary.overall;
        lines.push(String::new());
        lines.push(format!(
            "Changed pixels: {}  |  Mean luminance: {:.1} -> {:.1}",
            overall.changed_pixels, overall.mean_luminance_before, overall.mean_luminance_after,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics, changes: Option<&ChangeStats>) -> String {
    if metrics.skipped() {
        return "skipped".to_string();
    }

    let params = match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
            ..
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::FilmSimulation { simulation } => simulation.to_string(),
        StageMetrics::WhiteBalance { red, blue, .. } => format!("red={red:+} blue={blue:+}"),
        StageMetrics::ToneCurve {
            highlights,
            shadows,
        } => format!("highlights={highlights:+} shadows={shadows:+}"),
        StageMetrics::Color {
            color, saturation, ..
        } => format!("color={color:+} (x{saturation:.1})"),
        StageMetrics::ColorChrome { chroma, blue, .. } => format!("chroma={chroma} blue={blue}"),
        StageMetrics::Clarity { clarity, .. } => format!("clarity={clarity:+}"),
        StageMetrics::Grain { level, seed, .. } => match seed {
            GrainSeed::Entropy => level.to_string(),
            GrainSeed::Fixed(seed) => format!("{level} seed={seed}"),
        },
        StageMetrics::Sharpness {
            sharpness, amount, ..
        } => format!("sharpness={sharpness:+} (amount {amount:.1})"),
    };

    match changes {
        Some(c) => format!(
            "{params}  Y {:.1}->{:.1}",
            c.mean_luminance_before, c.mean_luminance_after
        ),
        None => params,
    }
}

/// Number of pixels whose RGB channels differ between two equally sized
/// buffers. Alpha is ignored.
pub(crate) fn changed_pixels(before: &RgbaImage, after: &RgbaImage) -> u64 {
    before
        .pixels()
        .zip(after.pixels())
        .map(|(a, b)| u64::from(a.0[..3] != b.0[..3]))
        .sum()
}

/// Mean BT.601 luminance over every pixel. `0.0` for an empty image.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean_luminance(image: &RgbaImage) -> f64 {
    let count = u64::from(image.width()) * u64::from(image.height());
    if count == 0 {
        return 0.0;
    }
    let total: f64 = image
        .pixels()
        .map(|p| luminance_u8([p.0[0], p.0[1], p.0[2]]))
        .sum();
    total / count as f64
}

/// Run the full pipeline, collecting diagnostics for every stage.
///
/// The buffer is cloned before each stage to measure what changed;
/// the clone happens outside the timed region.
///
/// # Errors
///
/// Returns the decode errors of [`crate::pipeline::Pending::decode`].
pub fn process_staged_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    config: &PipelineConfig,
    clock: &C,
) -> Result<(ProcessResult, PipelineDiagnostics), PipelineError> {
    let total_start = clock.now();
    let mut stage: Stage = Pipeline::new(image_bytes.to_vec(), config.clone()).into();
    let mut stages = Vec::with_capacity(STAGE_COUNT - 1);

    loop {
        let before = stage.image().cloned();
        let start = clock.now();
        let next = match stage.advance()? {
            Advance::Next(next) => next,
            Advance::Complete(done) => {
                stage = done;
                break;
            }
        };
        let duration = clock.elapsed(&start);

        if let Some(metrics) = next.metrics() {
            let changes = before
                .as_ref()
                .zip(next.image())
                .map(|(b, a)| ChangeStats::between(b, a));
            stages.push(StageDiagnostics {
                name: next.name().to_string(),
                duration,
                metrics,
                changes,
            });
        }
        stage = next;
    }

    let result = stage.complete()?;
    let total_duration = clock.elapsed(&total_start);

    let summary = PipelineSummary {
        recipe_name: result.recipe_name.clone(),
        image_width: result.dimensions.width,
        image_height: result.dimensions.height,
        pixel_count: result.dimensions.pixel_count(),
        overall: ChangeStats::between(&result.original, &result.transformed),
    };

    Ok((
        result,
        PipelineDiagnostics {
            stages,
            total_duration,
            summary,
        },
    ))
}
