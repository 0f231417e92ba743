//! Custom error types for driftwatch

use thiserror::Error;

/// Main error type for driftwatch operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Snapshot not found for topic '{topic}' on {date}")]
    MissingSnapshot { topic: String, date: String },

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("No overlapping samples for topic '{0}'")]
    EmptyOverlap(String),

    #[error("Empty embeddings for topic '{0}'")]
    EmptyEmbeddings(String),

    #[error("Model training failed: {0}")]
    ModelTraining(String),

    #[error("Malformed drift report: {0}")]
    MalformedReport(String),

    #[error("No drift summary found in {0}")]
    NoSummary(String),

    #[error("Already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Result type alias for driftwatch
pub type Result<T> = std::result::Result<T, Error>;
