//! Terrain meshing: bordered height grids to indexed triangle meshes with
//! level-of-detail simplification, plus a background meshing pipeline.

pub mod async_mesh;
pub mod builder;
pub mod error;
pub mod mesh_data;
pub mod settings;

pub use async_mesh::{MeshingPipeline, MeshingResult, MeshingTask};
pub use builder::{build_mesh, vertices_per_line};
pub use error::MeshSettingsError;
pub use mesh_data::{MeshData, TerrainVertex, VertexIndex};
pub use settings::{
    MeshSettings, SUPPORTED_CHUNK_SIZES, SUPPORTED_FLAT_SIZES, SUPPORTED_LOD_COUNT,
    SUPPORTED_SMOOTH_SIZES, lod_stride,
};
