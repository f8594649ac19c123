//! World data: banded surface definitions and per-cell climate classification.
//!
//! Elevation is normalized against a global maximum height and then mapped to
//! temperature, moisture and a blended surface class using the growth bands
//! derived from the surface table.

mod band;
mod classifier;

pub use band::{GrowthBands, SurfaceBand, SurfaceTable, default_surface_bands};
pub use classifier::{
    ClassifierParams, MIN_SURFACE_BANDS, WEIGHT_SMOOTHING_RADII, WorldData, classify,
};
