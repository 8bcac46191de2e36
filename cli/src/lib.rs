use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use straightedge::{DetectionCommand, DetectionSession, DetectorConfig, FrameDetection, Pipeline, StraightedgeError};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Straightedge(#[from] StraightedgeError),
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

/// Serialization of a detection written by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain serde form of the detection
    #[default]
    Json,
    /// FeatureCollection of LineString features
    Geojson,
}

impl OutputFormat {
    /// Guess the format from an output file name
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("geojson") => Some(Self::Geojson),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }

    pub fn render(&self, detection: &FrameDetection) -> Result<String, CliError> {
        Ok(match self {
            Self::Json => detection.to_json()?,
            Self::Geojson => detection.to_geojson_string()?,
        })
    }
}

/// Configuration from `path`, or the defaults when none is given
pub fn load_config(path: Option<&Path>) -> Result<DetectorConfig, CliError> {
    match path {
        Some(path) => {
            info!("Loading detector configuration from {:?}", path);
            Ok(DetectorConfig::from_file(path)?)
        }
        None => Ok(DetectorConfig::default()),
    }
}

/// Load `input` and run `command` with a pipeline built from `config`
pub fn run_detection(
    input: &Path,
    config: &DetectorConfig,
    command: DetectionCommand,
) -> Result<FrameDetection, CliError> {
    let mut session = DetectionSession::with_pipeline(Pipeline::from_config(config));
    session.load_image(input)?;
    debug!(%command, "running detection");
    Ok(session.execute(command, &config.detection)?)
}

/// Write `content` to `output`, or print it when no path is given
pub fn emit(content: &str, output: Option<&Path>) -> Result<(), CliError> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)?;
            info!("Wrote {:?}", path);
        }
        None => println!("{content}"),
    }
    Ok(())
}

pub fn schema_json() -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(&DetectorConfig::schema())?)
}
