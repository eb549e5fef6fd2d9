//! filmsim-bench: CLI tool for recipe experimentation and diagnostics.
//!
//! Runs the film pipeline on a given image file with a built-in or
//! custom recipe, printing detailed per-stage diagnostics. Useful for:
//!
//! - Comparing how recipes change luminance and how many pixels each
//!   stage touches
//! - Measuring per-stage durations to identify bottlenecks
//! - Producing reproducible output files with a fixed grain seed
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin filmsim-bench -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use filmsim_pipeline::diagnostics::{Clock, PipelineDiagnostics};
use filmsim_pipeline::pipeline::{
    ChromeApplied, Clarified, ColorAdjusted, Decoded, FilmSimulated, Grained, PipelineStage,
    Sharpened, ToneCurved, WhiteBalanced,
};
use filmsim_pipeline::{DEFAULT_RECIPE_ID, GrainSeed, PipelineConfig, RECIPES, Recipe, RgbaImage};

/// Film recipe experimentation and diagnostics for filmsim.
///
/// Runs the film pipeline on a given image with a chosen recipe and
/// prints detailed per-stage timing and pixel-change diagnostics.
#[derive(Parser)]
#[command(name = "filmsim-bench", version)]
struct Cli {
    /// Path to the input image (JPEG, PNG, WebP).
    #[arg(required_unless_present = "list_recipes")]
    image_path: Option<PathBuf>,

    /// Built-in recipe identifier.
    #[arg(long, default_value = DEFAULT_RECIPE_ID)]
    recipe: String,

    /// Custom recipe as a JSON string. Takes precedence over `--recipe`.
    #[arg(long)]
    recipe_json: Option<String>,

    /// Fixed grain seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Write the transformed image of the first run to this path.
    /// `.png` writes PNG, anything else JPEG at download quality.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, `--recipe`, `--recipe-json` and `--seed` are
    /// ignored. The JSON must be a valid `PipelineConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// List the built-in recipes and exit.
    #[arg(long)]
    list_recipes: bool,
}

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// other recipe flags are ignored.  Otherwise the recipe comes from
/// `--recipe-json` or the `--recipe` table lookup, and `--seed` fixes
/// the grain.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    let recipe: Recipe = match cli.recipe_json {
        Some(ref json) => {
            serde_json::from_str(json).map_err(|e| format!("Error parsing --recipe-json: {e}"))?
        }
        None => filmsim_pipeline::recipe::lookup(&cli.recipe)
            .map_err(|e| format!("{e} (see --list-recipes)"))?
            .clone(),
    };

    if let Err(e) = recipe.validate() {
        log::warn!("{e}; running anyway");
    }

    Ok(PipelineConfig {
        recipe,
        grain_seed: cli.seed.map_or(GrainSeed::Entropy, GrainSeed::Fixed),
    })
}

fn print_recipes() {
    for entry in &RECIPES {
        println!(
            "{:<20} {:<20} {}",
            entry.id, entry.recipe.name, entry.recipe.film_simulation
        );
    }
}

/// Recipe identifier used to name downloads: the table id when the
/// recipe came from the table, otherwise `custom`.
fn download_id(config: &PipelineConfig) -> &'static str {
    RECIPES
        .iter()
        .find(|entry| entry.recipe == config.recipe)
        .map_or("custom", |entry| entry.id)
}

fn write_output(path: &Path, image: &RgbaImage) -> Result<usize, String> {
    let is_png = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    let bytes = if is_png {
        filmsim_export::encode_png(image)
    } else {
        filmsim_export::encode_jpeg(image, filmsim_export::JPEG_QUALITY)
    }
    .map_err(|e| e.to_string())?;
    std::fs::write(path, &bytes).map_err(|e| e.to_string())?;
    Ok(bytes.len())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list_recipes {
        print_recipes();
        return ExitCode::SUCCESS;
    }

    let Some(ref image_path) = cli.image_path else {
        eprintln!("No input image given");
        return ExitCode::FAILURE;
    };

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", image_path.display());
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Image: {} ({} bytes)",
        image_path.display(),
        image_bytes.len(),
    );
    eprintln!("Config: {config:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        match filmsim_pipeline::diagnostics::process_staged_with_diagnostics(
            &image_bytes,
            &config,
            &StdClock,
        ) {
            Ok((result, diagnostics)) => {
                if cli.json {
                    match serde_json::to_string_pretty(&diagnostics) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    println!("{}", diagnostics.report());
                }

                // Write output on the first run only.
                if run == 0
                    && let Some(ref output_path) = cli.output
                {
                    match write_output(output_path, &result.transformed) {
                        Ok(len) => {
                            eprintln!(
                                "Output written to {} ({len} bytes, download name {})",
                                output_path.display(),
                                filmsim_export::download_filename_now(download_id(&config)),
                            );
                        }
                        Err(e) => {
                            eprintln!("Error writing output to {}: {e}", output_path.display());
                        }
                    }
                }

                all_diagnostics.push(diagnostics);
            }
            Err(e) => {
                eprintln!("Pipeline error: {e}");
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    // Print summary when multiple runs.
    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Display label and diagnostics name of every timed stage, in order.
const TIMED_STAGES: [(&str, &str); 9] = [
    ("Decode", Decoded::NAME),
    ("Film Simulation", FilmSimulated::NAME),
    ("White Balance", WhiteBalanced::NAME),
    ("Tone Curve", ToneCurved::NAME),
    ("Color", ColorAdjusted::NAME),
    ("Color Chrome", ChromeApplied::NAME),
    ("Clarity", Clarified::NAME),
    ("Grain", Grained::NAME),
    ("Sharpness", Sharpened::NAME),
];

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[PipelineDiagnostics]) {
    debug_assert!(!all_diagnostics.is_empty(), "no diagnostics to summarize");

    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    // Per-stage means.
    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));

    for (label, name) in TIMED_STAGES {
        let stage_durations: Vec<f64> = all_diagnostics
            .iter()
            .filter_map(|d| d.stage_duration(name))
            .map(|dur| dur.as_secs_f64() * 1000.0)
            .collect();

        if stage_durations.is_empty() {
            continue;
        }

        let stage_mean = stage_durations.iter().sum::<f64>() / stage_durations.len() as f64;
        println!("{label:<24} {stage_mean:>10.3}ms");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("filmsim-bench").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn default_recipe_with_entropy_grain() {
        let config = config_from_cli(&parse(&["in.png"])).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn recipe_and_seed_flags() {
        let config =
            config_from_cli(&parse(&["in.png", "--recipe", "kodak-portra-400", "--seed", "9"])).unwrap();
        assert_eq!(config.recipe.name, "Kodak Portra 400");
        assert_eq!(config.grain_seed, GrainSeed::Fixed(9));
        assert_eq!(download_id(&config), "kodak-portra-400");
    }

    #[test]
    fn unknown_recipe_is_an_error() {
        let err = config_from_cli(&parse(&["in.png", "--recipe", "nope"])).unwrap_err();
        assert!(err.contains("nope"), "{err}");
    }

    #[test]
    fn recipe_json_overrides_recipe_id() {
        let json = serde_json::to_string(&Recipe::default()).unwrap();
        let cli = parse(&["in.png", "--recipe", "kodak-portra-400", "--recipe-json", &json]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.recipe, Recipe::default());
    }

    #[test]
    fn config_json_overrides_everything() {
        let expected = PipelineConfig::from_recipe_id("cinematic-eterna")
            .unwrap()
            .with_grain_seed(GrainSeed::Fixed(3));
        let json = serde_json::to_string(&expected).unwrap();
        let cli = parse(&["in.png", "--seed", "100", "--config-json", &json]);
        assert_eq!(config_from_cli(&cli).unwrap(), expected);
    }

    #[test]
    fn custom_recipe_downloads_as_custom() {
        let mut config = PipelineConfig::default();
        config.recipe.clarity = 5;
        config.recipe.name = "Mine".into();
        assert_eq!(download_id(&config), "custom");
    }

    #[test]
    fn list_recipes_needs_no_image() {
        let cli = parse(&["--list-recipes"]);
        assert!(cli.list_recipes);
        assert!(cli.image_path.is_none());
    }

    #[test]
    fn image_is_required_otherwise() {
        assert!(Cli::try_parse_from(["filmsim-bench"]).is_err());
    }
}
