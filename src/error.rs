//! Error types for Synheart Lumen

use thiserror::Error;

/// Errors that can occur while loading configuration or decoding inputs.
///
/// The per-tick computation itself never fails; these errors surface only at
/// load time or at the boundary where callers hand raw documents to the crate.
#[derive(Debug, Error)]
pub enum LightingError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Malformed metrics snapshot: {0}")]
    SnapshotError(String),

    #[error("Unknown actuator: {0}")]
    UnknownActuator(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
