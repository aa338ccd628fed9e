use thiserror::Error;

/// Top-level error type for the coverage engine.
#[derive(Debug, Error)]
pub enum PolycoverError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Coverage(#[from] CoverageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors raised while ingesting line geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("polyline needs at least 2 vertices, got {0}")]
    TooFewPoints(usize),

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("feature {0} is already loaded")]
    DuplicateFeature(String),
}

/// Locally recoverable conditions hit while selecting or erasing coverage.
///
/// None of these abort a batch: the affected line is skipped and the
/// remaining candidates are still processed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoverageError {
    #[error("geometry missing for feature {feature_id} line {line_index}")]
    GeometryMissing {
        feature_id: String,
        line_index: usize,
    },

    #[error("degenerate interval [{start}, {end}]")]
    DegenerateInterval { start: f64, end: f64 },

    #[error("meter range [{start}, {end}] is outside [0, {total}]")]
    OutOfRange { start: f64, end: f64, total: f64 },
}

/// Errors related to engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised by persistence backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage payload is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for results using [`PolycoverError`].
pub type Result<T> = std::result::Result<T, PolycoverError>;
