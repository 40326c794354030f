use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pagefinder::{DebugOutput, Pipeline, PipelineConfig, load_image, save_image};

#[derive(Parser)]
#[command(name = "pagefinder")]
#[command(about = "Find a page in a photo and flatten it")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Write the rectified page to this file
    #[arg(short, long, value_name = "OUT")]
    output: Option<PathBuf>,

    /// Lower edge detector threshold
    #[arg(long)]
    low: Option<f32>,

    /// Upper edge detector threshold
    #[arg(long)]
    high: Option<f32>,

    /// Ignore contours enclosing this area or less
    #[arg(long)]
    min_area: Option<f64>,

    /// Working resolution width bound
    #[arg(long)]
    max_width: Option<u32>,

    /// Working resolution height bound
    #[arg(long)]
    max_height: Option<u32>,

    /// JSON file with pipeline settings; flags take precedence
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(low) = self.low {
            config.canny_low = low;
        }
        if let Some(high) = self.high {
            config.canny_high = high;
        }
        if let Some(min_area) = self.min_area {
            config.min_contour_area = min_area;
        }
        if let Some(max_width) = self.max_width {
            config.max_width = max_width;
        }
        if let Some(max_height) = self.max_height {
            config.max_height = max_height;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = args.pipeline_config()?;
    let debug_out = args
        .debug_out
        .clone()
        .map(DebugOutput::prepare)
        .transpose()?;

    let img = load_image(&args.image_path)
        .with_context(|| format!("Failed to load image {}", args.image_path.display()))?;
    info!(width = img.width(), height = img.height(), "Image loaded");

    let pipeline = Pipeline::new(config);
    let detection = pipeline.detect(&img)?;
    let rectified = match detection.rectify() {
        Ok(page) => page,
        Err(err) => {
            // Keep the stage images around for inspection.
            if let Some(out) = &debug_out {
                out.write(&detection, None)?;
            }
            return Err(err.into());
        }
    };
    if let Some(out) = &debug_out {
        let written = out.write(&detection, rectified.as_ref())?;
        info!(count = written.len(), dir = %out.dir().display(), "Debug images saved");
    }

    match (detection.quad(), rectified) {
        (Some(quad), Some(page)) => {
            let [tr, tl, bl, br] = *quad.corners();
            println!(
                "Corners (tr, tl, bl, br): ({}, {}) ({}, {}) ({}, {}) ({}, {})",
                tr.x, tr.y, tl.x, tl.y, bl.x, bl.y, br.x, br.y
            );
            println!("Rectified size: {}x{}", page.width(), page.height());
            if let Some(path) = &args.output {
                save_image(&page, path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Saved {}", path.display());
            }
        }
        _ => println!("no document detected"),
    }

    Ok(())
}
