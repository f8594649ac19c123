//! Mesh settings validation errors.

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MeshSettingsError {
    /// World scale must be a positive, finite number.
    #[error("mesh scale must be positive and finite, got {0}")]
    InvalidScale(f32),
    /// Flat-shaded chunk size index out of the supported range.
    #[error("flat chunk size index {index} out of range 0..{supported}")]
    FlatChunkSize { index: usize, supported: usize },
    /// Smooth-shaded chunk size index out of the supported range.
    #[error("smooth chunk size index {index} out of range 0..{supported}")]
    SmoothChunkSize { index: usize, supported: usize },
    /// Level of detail outside `0..SUPPORTED_LOD_COUNT`.
    #[error("level of detail {lod} out of range 0..{supported}")]
    LevelOfDetail { lod: usize, supported: usize },
}
