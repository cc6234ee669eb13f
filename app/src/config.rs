//! RON parameter files for the landscape binary.

use std::path::Path;

use landscape::LandscapeParameters;
use tracing::info;

/// Errors that can occur when loading or saving a parameter file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read parameters: {0}")]
    ReadError(#[source] std::io::Error),

    #[error("failed to write parameters: {0}")]
    WriteError(#[source] std::io::Error),

    #[error("failed to parse parameters: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    #[error("failed to serialize parameters: {0}")]
    SerializeError(#[source] ron::Error),
}

/// Load parameters from `path`, falling back to defaults when it does not exist.
///
/// Missing fields and sections take their default values.
pub fn load_or_default(path: &Path) -> Result<LandscapeParameters, ConfigError> {
    if !path.exists() {
        info!(path = %path.display(), "no parameter file, using defaults");
        return Ok(LandscapeParameters::default());
    }
    let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
    let params = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
    info!(path = %path.display(), "loaded parameters");
    Ok(params)
}

/// Write `params` to `path` as pretty RON, creating parent directories.
pub fn save(params: &LandscapeParameters, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(ConfigError::WriteError)?;
    }
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .separate_tuple_members(true)
        .enumerate_arrays(false);
    let serialized =
        ron::ser::to_string_pretty(params, pretty).map_err(ConfigError::SerializeError)?;
    std::fs::write(path, serialized).map_err(ConfigError::WriteError)?;
    info!(path = %path.display(), "wrote parameters");
    Ok(())
}
