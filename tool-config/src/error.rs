//! Configuration error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading settings or resolving a selection.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings file could not be read.
    #[error("failed to read tool settings from {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Settings document was not valid YAML for the schema.
    #[error("invalid tool settings: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Tier name did not match `core`, `extended`, or `complete`.
    #[error("unknown tool tier `{0}` (expected core, extended, or complete)")]
    UnknownTier(String),

    /// Selected service has no tier lists in the settings.
    #[error("unknown service `{name}`")]
    UnknownService {
        /// Service name as supplied by the selection.
        name: String,
    },
}
