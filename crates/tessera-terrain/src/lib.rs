//! Procedural terrain data: noise, height maps, climate classification and scatter.

mod curve;
mod error;
mod falloff;
mod field;
mod hash_grid;
mod heightmap;
mod noise_field;
mod scatter;
mod smoothing;

pub mod async_generation;
pub mod debug_viz;
pub mod remap;
pub mod world;

pub use async_generation::{
    GeneratedTile, TileCoord, TileGenerator, TileRecipe, TileTask, generate_tile_sync,
};
pub use curve::{CurveKey, RemapCurve};
pub use error::{ClassifyError, SettingsError, SurfaceTableError};
pub use falloff::{falloff_curve, falloff_field};
pub use field::{ClassField, LayeredField, ScalarField};
pub use hash_grid::{HashGrid, HashGridSettings};
pub use heightmap::{
    FalloffMode, HEIGHT_SMOOTHING_RADIUS, HeightMap, HeightMapSettings, build_height_map,
    flat_height_map,
};
pub use noise_field::{ESTIMATE_DIVISOR, NoiseSettings, NormalizeMode, sample_noise_field};
pub use scatter::{
    Habitat, HeightMapProbe, POINT_HABITAT_MARGIN, PlantProfile, PointCloud, ProbeHit,
    ScatterContext, ScatterPoint, SurfaceProbe, TREE_HABITAT_MARGIN, TreeInstance,
    point_cloud_at_height, point_cloud_from_probe, sample_field, tree_cloud_from_probe,
};
pub use smoothing::{smooth, smooth_layers};
pub use world::{
    ClassifierParams, GrowthBands, SurfaceBand, SurfaceTable, WorldData, classify,
    default_surface_bands,
};
