//! Settings loaders.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::schema::ToolSettings;

/// Parses settings from a YAML document.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] when the document does not match the
/// settings schema.
pub fn parse(yaml: &str) -> ConfigResult<ToolSettings> {
    if yaml.trim().is_empty() {
        return Ok(ToolSettings::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

/// Loads settings from a YAML file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read and
/// [`ConfigError::Parse`] when its contents do not match the schema.
pub fn load(path: impl AsRef<Path>) -> ConfigResult<ToolSettings> {
    let path = path.as_ref();
    let yaml = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = parse(&yaml)?;
    debug!(
        path = %path.display(),
        services = settings.services().count(),
        "loaded tool settings"
    );
    Ok(settings)
}
