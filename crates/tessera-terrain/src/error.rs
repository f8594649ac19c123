//! Error types for settings validation, surface tables and classification.

/// Invalid generation settings.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SettingsError {
    /// Noise needs at least one octave.
    #[error("octave count must be positive")]
    NoOctaves,
    /// Noise scale must be a positive, finite number.
    #[error("noise scale must be positive and finite, got {0}")]
    InvalidScale(f32),
    /// Persistence outside `[0, 1]`.
    #[error("persistence must lie in [0, 1], got {0}")]
    InvalidPersistence(f32),
    /// Lacunarity below 1.
    #[error("lacunarity must be at least 1, got {0}")]
    InvalidLacunarity(f32),
    /// A remap curve needs at least one key.
    #[error("remap curve has no keys")]
    EmptyCurve,
    /// Curve keys must have strictly increasing times and non-decreasing values.
    #[error("remap curve is not monotonic at key {0}")]
    NonMonotonicCurve(usize),
}

/// Errors raised when building a surface band table.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SurfaceTableError {
    /// A band with this name is already registered.
    #[error("duplicate surface name: {0}")]
    DuplicateName(String),
    /// Bands must be registered in ascending order of starting height.
    #[error("surface {name} starts at {start}, below the previous band at {previous}")]
    OutOfOrder {
        name: String,
        start: f32,
        previous: f32,
    },
}

/// Errors raised while deriving classifier parameters.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ClassifyError {
    /// Growth and sea-level bands are derived from the first four entries.
    #[error("at least {required} surface bands are required, got {actual}")]
    TooFewBands { required: usize, actual: usize },
    /// Elevation is normalized by the global maximum height.
    #[error("max global height must be positive, got {0}")]
    InvalidMaxHeight(f32),
}
