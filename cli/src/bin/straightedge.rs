use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use std::path::{Path, PathBuf};
use straightedge::{DetectionCommand, DetectorConfig};
use straightedge_cli::{emit, load_config, run_detection, schema_json, OutputFormat};
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract contours and straight segments from an image
    Detect {
        /// Path to the input image
        #[arg(short, long)]
        input: PathBuf,
        /// Detector configuration (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Which outputs to produce
        #[arg(long, default_value = "detect_all")]
        command: DetectionCommand,
        /// Output format; inferred from the output extension when omitted
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
        /// Where to write the result (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the default detector configuration
    Config {
        /// Path to save the configuration (.toml or .json)
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the JSON schema of the detector configuration
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Detect { input, config, command, format, output } => {
            detect(input, config.as_deref(), *command, *format, output.as_deref())?;
        }
        Commands::Config { output } => {
            DetectorConfig::default().to_file(output)?;
            info!("Default configuration written to {:?}", output);
        }
        Commands::Schema => {
            emit(&schema_json()?, None)?;
        }
    }

    Ok(())
}

fn detect(
    input: &Path,
    config: Option<&Path>,
    command: DetectionCommand,
    format: Option<OutputFormat>,
    output: Option<&Path>,
) -> Result<()> {
    let config = load_config(config)?;
    info!("Detecting edges in {:?} ({})", input, command.description());

    let detection = run_detection(input, &config, command)?;
    info!(
        contours = detection.contours.len(),
        segments = detection.segments.len(),
        scale = detection.scale,
        "Detection finished"
    );

    let format = format
        .or_else(|| output.and_then(OutputFormat::from_path))
        .unwrap_or_default();
    emit(&format.render(&detection)?, output)?;
    Ok(())
}
