//! kirinuki-bench: CLI tool for cutout parameter experimentation and timings.
//!
//! Runs the mask post-processing stages (feather + composite) on a given
//! image with a mask, printing per-stage durations. Useful for:
//!
//! - Tuning the feather radius against real photographs
//! - Measuring stage durations at various image sizes
//! - Eyeballing cutout quality by writing the result to a PNG
//!
//! The mask comes either from a grayscale PNG (`--mask`, nonzero pixels are
//! foreground) or from thresholding the input image's luma when no mask file
//! is given.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin kirinuki-bench -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use kirinuki_mask::{GrayImage, RgbaImage, composite_cutout, feather_mask};
use serde::Serialize;

/// Cutout parameter experimentation and timings for kirinuki.
///
/// Feathers a mask and composites it over the input image with configurable
/// parameters, printing per-stage timing diagnostics.
#[derive(Parser)]
#[command(name = "kirinuki-bench", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Grayscale mask PNG (nonzero = foreground). Must match the image size.
    ///
    /// When omitted, a mask is synthesized by thresholding the input
    /// image's luma against `--threshold`.
    #[arg(long)]
    mask: Option<PathBuf>,

    /// Luma threshold for the synthesized mask (used without `--mask`).
    #[arg(long, default_value_t = 128)]
    threshold: u8,

    /// Feather radius in pixels (0 disables feathering).
    #[arg(long, default_value_t = kirinuki_mask::DEFAULT_RADIUS)]
    radius: u32,

    /// Write the resulting cutout PNG to file.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output timings as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,
}

/// Per-run stage timings in milliseconds.
#[derive(Serialize)]
struct RunTimings {
    feather_ms: f64,
    composite_ms: f64,
    total_ms: f64,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return std::process::ExitCode::FAILURE;
        }
    };

    let source: RgbaImage = match image::load_from_memory(&image_bytes) {
        Ok(img) => img.into_rgba8(),
        Err(e) => {
            eprintln!("Error decoding {}: {e}", cli.image_path.display());
            return std::process::ExitCode::FAILURE;
        }
    };

    let mask = match load_mask(&cli, &source) {
        Ok(mask) => mask,
        Err(msg) => {
            eprintln!("{msg}");
            return std::process::ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Image: {} ({}x{}, {} bytes)",
        cli.image_path.display(),
        source.width(),
        source.height(),
        image_bytes.len(),
    );
    eprintln!("Feather radius: {}", cli.radius);
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_timings = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        let feather_start = Instant::now();
        let feathered = feather_mask(&mask, cli.radius);
        let feather_ms = feather_start.elapsed().as_secs_f64() * 1000.0;

        let composite_start = Instant::now();
        let cutout = match composite_cutout(&source, &feathered) {
            Ok(cutout) => cutout,
            Err(e) => {
                eprintln!("Composite error: {e}");
                return std::process::ExitCode::FAILURE;
            }
        };
        let composite_ms = composite_start.elapsed().as_secs_f64() * 1000.0;

        let timings = RunTimings {
            feather_ms,
            composite_ms,
            total_ms: feather_ms + composite_ms,
        };

        if cli.json {
            match serde_json::to_string_pretty(&timings) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Error serializing timings: {e}");
                    return std::process::ExitCode::FAILURE;
                }
            }
        } else {
            if cli.runs > 1 {
                println!("--- Run {}/{} ---", run + 1, cli.runs);
            }
            println!("Feather:   {feather_ms:>10.3}ms");
            println!("Composite: {composite_ms:>10.3}ms");
            println!("Total:     {:>10.3}ms", timings.total_ms);
        }

        // Write the cutout on the first run only.
        if run == 0
            && let Some(ref output) = cli.output
        {
            match cutout.save(output) {
                Ok(()) => eprintln!("Cutout written to {}", output.display()),
                Err(e) => {
                    eprintln!("Error writing cutout to {}: {e}", output.display());
                    return std::process::ExitCode::FAILURE;
                }
            }
        }

        all_timings.push(timings);
    }

    if cli.runs > 1 && !cli.json {
        print_multi_run_summary(&all_timings);
    }

    std::process::ExitCode::SUCCESS
}

/// Load the mask from `--mask`, or synthesize one by thresholding luma.
fn load_mask(cli: &Cli, source: &RgbaImage) -> Result<GrayImage, String> {
    let Some(ref mask_path) = cli.mask else {
        let luma = image::DynamicImage::ImageRgba8(source.clone()).into_luma8();
        return Ok(GrayImage::from_fn(luma.width(), luma.height(), |x, y| {
            if luma.get_pixel(x, y).0[0] >= cli.threshold {
                image::Luma([255])
            } else {
                image::Luma([0])
            }
        }));
    };

    let mask = image::open(mask_path)
        .map_err(|e| format!("Error decoding mask {}: {e}", mask_path.display()))?
        .into_luma8();

    if mask.dimensions() != source.dimensions() {
        return Err(format!(
            "Mask size {}x{} does not match image size {}x{}",
            mask.width(),
            mask.height(),
            source.width(),
            source.height(),
        ));
    }

    Ok(mask)
}

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_timings: &[RunTimings]) {
    println!();
    println!("Summary ({} runs)\n{}", all_timings.len(), "=".repeat(40));

    for (name, extractor) in [
        ("Feather", (|t| t.feather_ms) as fn(&RunTimings) -> f64),
        ("Composite", |t| t.composite_ms),
        ("Total", |t| t.total_ms),
    ] {
        let durations: Vec<f64> = all_timings.iter().map(extractor).collect();
        let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
        let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
        let mean = durations.iter().sum::<f64>() / durations.len() as f64;
        println!("{name:<10} min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");
    }
}
