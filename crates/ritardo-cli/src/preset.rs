//! TOML preset files for engine parameters.
//!
//! A preset is a [`ParamSnapshot`] on disk. Values out of range are clamped
//! when the snapshot is applied to the engine, so a hand-edited file cannot
//! break processing - only unreadable or malformed files are errors.

use std::path::Path;

use ritardo_engine::ParamSnapshot;
use thiserror::Error;

/// Errors from preset file handling.
#[derive(Debug, Error)]
pub enum PresetError {
    /// The preset file could not be read.
    #[error("failed to read preset {path}: {source}")]
    Read {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The preset file could not be written.
    #[error("failed to write preset {path}: {source}")]
    Write {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file was not valid preset TOML.
    #[error("malformed preset: {0}")]
    Parse(#[from] toml::de::Error),

    /// The snapshot could not be serialized.
    #[error("failed to serialize preset: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Load a parameter snapshot from a TOML file.
pub fn load(path: impl AsRef<Path>) -> Result<ParamSnapshot, PresetError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| PresetError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Save a parameter snapshot to a TOML file.
pub fn save(snapshot: &ParamSnapshot, path: impl AsRef<Path>) -> Result<(), PresetError> {
    let path = path.as_ref();
    let content = toml::to_string_pretty(snapshot)?;
    std::fs::write(path, content).map_err(|source| PresetError::Write {
        path: path.display().to_string(),
        source,
    })
}
