use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pixelrot::{FileDefaults, OutputKind, Overrides, RunConfig, SystemTools};

/// Digitally rot an image by repeated lossy re-encoding.
#[derive(Parser, Debug)]
#[command(name = "pixelrot", version)]
struct Cli {
    /// Input image.
    input: PathBuf,

    /// Output file; output type is inferred from the extension
    /// (jpeg/jpg/png/bmp/tiff/tif are stills, anything else is a video).
    output: PathBuf,

    /// Max number of iterations [default: 100].
    #[arg(short = 'n', long = "number", value_name = "N")]
    max_iterations: Option<u32>,

    /// Max width of the resulting image [default: 480].
    #[arg(long, value_name = "PIXELS")]
    width: Option<u32>,

    /// Max height of the resulting image [default: 320].
    #[arg(long, value_name = "PIXELS")]
    height: Option<u32>,

    /// Lower bound of the per-iteration JPEG quality sample, 1-100
    /// [default: 85].
    #[arg(long, alias = "minq", value_name = "N")]
    min_quality: Option<u8>,

    /// Upper bound of the per-iteration JPEG quality sample, 1-100
    /// [default: 95].
    #[arg(long, alias = "maxq", value_name = "N")]
    max_quality: Option<u8>,

    /// Video framerate; ignored when the output is a still image
    /// [default: 30].
    #[arg(short = 'f', long, value_name = "N")]
    framerate: Option<u32>,

    /// YAML file supplying defaults for any option not given above.
    #[arg(short = 'c', long, value_name = "FILE", default_value = "config.yaml")]
    config: PathBuf,

    /// Log every external tool invocation.
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let file_defaults = FileDefaults::load(&cli.config)?;
    let overrides = Overrides {
        max_iterations: cli.max_iterations,
        max_width: cli.width,
        max_height: cli.height,
        min_quality: cli.min_quality,
        max_quality: cli.max_quality,
        framerate: cli.framerate,
    };
    let cfg = RunConfig::resolve(cli.input, cli.output, &overrides, &file_defaults.defaults);

    let tools = SystemTools;
    tools.preflight(cfg.output_kind() == OutputKind::Video)?;

    let report = pixelrot::run(&cfg, &tools, &mut rand::rng())?;

    eprintln!(
        "wrote {} ({}x{}, {} iteration{}{})",
        report.output.display(),
        report.target_width,
        report.target_height,
        report.iterations_run,
        if report.iterations_run == 1 { "" } else { "s" },
        if report.converged { ", converged" } else { "" },
    );
    Ok(())
}
