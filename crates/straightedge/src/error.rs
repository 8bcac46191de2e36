use thiserror::Error;

#[derive(Error, Debug)]
pub enum StraightedgeError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Invalid mask: {0}")]
    InvalidMask(String),

    #[error("No frame loaded")]
    NoFrameLoaded,

    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

pub type Result<T> = std::result::Result<T, StraightedgeError>;
