// Error kinds raised by the conversion engine.

use crate::types::SchemaVersion;

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// A resource in the batch is not at the version the batch claims to start from.
    #[error("Resource api version {declared} is different from requested api version: {requested}")]
    VersionMismatch { declared: String, requested: String },
    #[error("Conversion from '{from}' to '{to}' is not supported")]
    UnsupportedTargetVersion {
        from: SchemaVersion,
        to: SchemaVersion,
    },
    #[error("Unknown schema version: '{0}'")]
    UnknownVersion(String),
    /// The spec of a single resource could not be parsed or transformed.
    #[error("{0}")]
    Document(String),
    /// Service/ingress configuration contradicts itself.
    #[error("{0}")]
    Structural(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ConversionError {
    fn from(e: serde_json::Error) -> Self {
        ConversionError::Document(e.to_string())
    }
}

impl From<serde_yaml::Error> for ConversionError {
    fn from(e: serde_yaml::Error) -> Self {
        ConversionError::Serialization(e.to_string())
    }
}
