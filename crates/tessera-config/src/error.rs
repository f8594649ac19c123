//! Configuration error types.

use tessera_mesh::MeshSettingsError;
use tessera_terrain::{ClassifyError, SettingsError, SurfaceTableError};

/// Errors that can occur when loading, saving, parsing or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize config to RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    #[error("invalid terrain settings: {0}")]
    Terrain(#[from] SettingsError),

    #[error("invalid mesh settings: {0}")]
    Mesh(#[from] MeshSettingsError),

    #[error("invalid surface bands: {0}")]
    Bands(#[from] SurfaceTableError),

    #[error("invalid world settings: {0}")]
    World(#[from] ClassifyError),

    /// A value outside its allowed range.
    #[error("invalid config: {0}")]
    Invalid(String),
}
