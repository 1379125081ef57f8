//! Error types for the cmirr library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum CmirrError {
    #[error("The given table doesn't have taxonomy")]
    MissingTaxonomy,

    #[error("Observation '{0}' has no taxonomy")]
    ObservationWithoutTaxonomy(String),

    #[error("Field '{field}' of observation '{id}' is not a list of ranks")]
    InvalidTaxonomy { id: String, field: String },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Duplicate {axis} ID '{id}'")]
    DuplicateId { axis: String, id: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, CmirrError>;
