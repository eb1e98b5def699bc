use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rawroi_rs::image_pipeline::{
    CaptureImporter, ProcessorConfig, RawLoaderImporter, RoiProcessor, RoiRequest, replay_bundle,
};
use rawroi_rs::logger;
use tracing::info;

#[derive(Parser)]
#[command(name = "rawroi")]
#[command(version, about = "RAW region-of-interest colorimetry", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure the ROI described by a request JSON file
    Process {
        /// Request JSON
        #[arg(short, long, value_name = "FILE")]
        request: PathBuf,

        /// Response JSON, stdout when omitted
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Directory receiving debug bundles
        #[arg(long, value_name = "DIR")]
        debug_root: Option<PathBuf>,

        /// Gamma used when the request carries none
        #[arg(long, value_name = "FLOAT")]
        gamma: Option<f64>,
    },

    /// Rerun the pipeline over a recorded debug bundle
    Replay {
        /// Bundle zip written by a debug dump
        #[arg(short, long, value_name = "FILE")]
        bundle: PathBuf,
    },

    /// Convert a RAW container into a RAW16 buffer plus metadata JSON
    Import {
        /// RAW or DNG file
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Directory receiving `<name>.raw` and `<name>.json`
        #[arg(short, long, value_name = "DIR")]
        output_dir: PathBuf,

        /// Output file stem, defaults to the input's
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
    },
}

fn write_json(output: Option<&Path>, json: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, json).with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}

fn cmd_process(
    request_path: PathBuf,
    output: Option<PathBuf>,
    debug_root: Option<PathBuf>,
    gamma: Option<f64>,
) -> Result<()> {
    let body = fs::read_to_string(&request_path)
        .with_context(|| format!("Failed to read request {}", request_path.display()))?;
    let request: RoiRequest = serde_json::from_str(&body)
        .with_context(|| format!("Invalid request JSON in {}", request_path.display()))?;

    let mut builder = ProcessorConfig::builder();
    if let Some(root) = debug_root {
        builder = builder.debug_root(root);
    }
    if let Some(gamma) = gamma {
        builder = builder.default_gamma(gamma);
    }
    let processor = RoiProcessor::new(builder.build());
    info!(
        default_gamma = processor.config().default_gamma,
        debug_root = ?processor.config().debug_root,
        "ROI processor initialized"
    );

    let response = processor.process(&request).context("ROI processing failed")?;
    write_json(output.as_deref(), &serde_json::to_string_pretty(&response)?)
}

fn cmd_replay(bundle: PathBuf) -> Result<()> {
    let report = replay_bundle(&bundle)
        .with_context(|| format!("Failed to replay {}", bundle.display()))?;
    write_json(None, &serde_json::to_string_pretty(&report)?)
}

fn cmd_import(input: PathBuf, output_dir: PathBuf, name: Option<String>) -> Result<()> {
    let data = fs::read(&input).with_context(|| format!("Failed to read {}", input.display()))?;
    let capture = RawLoaderImporter
        .import(&data)
        .with_context(|| format!("Failed to decode {}", input.display()))?;

    let stem = name
        .or_else(|| input.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "capture".to_string());
    let (raw_path, metadata_path) = capture.write_to(&output_dir, &stem)?;

    info!(
        width = capture.width,
        height = capture.height,
        raw = %raw_path.display(),
        metadata = %metadata_path.display(),
        "Import complete"
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(if cli.verbose { "debug" } else { "info" });

    match cli.command {
        Commands::Process {
            request,
            output,
            debug_root,
            gamma,
        } => cmd_process(request, output, debug_root, gamma),
        Commands::Replay { bundle } => cmd_replay(bundle),
        Commands::Import {
            input,
            output_dir,
            name,
        } => cmd_import(input, output_dir, name),
    }
}
