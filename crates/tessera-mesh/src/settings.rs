//! Mesh settings: world scale, shading mode and the supported chunk sizes.

use serde::{Deserialize, Serialize};

use crate::error::MeshSettingsError;

/// Number of supported levels of detail.
pub const SUPPORTED_LOD_COUNT: usize = 5;
/// Flat-shaded meshes use only the first few chunk sizes.
pub const SUPPORTED_FLAT_SIZES: usize = 3;
pub const SUPPORTED_SMOOTH_SIZES: usize = 9;
/// Chunk edge lengths in cells. Every size is divisible by each LOD stride.
pub const SUPPORTED_CHUNK_SIZES: [usize; SUPPORTED_SMOOTH_SIZES] =
    [48, 72, 96, 120, 144, 168, 192, 216, 240];

/// Grid stride for a level of detail: 1 at LOD 0, otherwise `2 * lod`.
#[inline]
pub const fn lod_stride(lod: usize) -> usize {
    if lod == 0 { 1 } else { lod * 2 }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshSettings {
    /// World units per grid cell.
    pub scale: f32,
    pub flat_shading: bool,
    pub flat_chunk_size_index: usize,
    pub smooth_chunk_size_index: usize,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            scale: 4.0,
            flat_shading: false,
            flat_chunk_size_index: 0,
            smooth_chunk_size_index: 0,
        }
    }
}

impl MeshSettings {
    pub fn validate(&self) -> Result<(), MeshSettingsError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(MeshSettingsError::InvalidScale(self.scale));
        }
        if self.flat_chunk_size_index >= SUPPORTED_FLAT_SIZES {
            return Err(MeshSettingsError::FlatChunkSize {
                index: self.flat_chunk_size_index,
                supported: SUPPORTED_FLAT_SIZES,
            });
        }
        if self.smooth_chunk_size_index >= SUPPORTED_SMOOTH_SIZES {
            return Err(MeshSettingsError::SmoothChunkSize {
                index: self.smooth_chunk_size_index,
                supported: SUPPORTED_SMOOTH_SIZES,
            });
        }
        Ok(())
    }

    /// Reject a level of detail the builder does not support.
    pub fn check_lod(lod: usize) -> Result<(), MeshSettingsError> {
        if lod >= SUPPORTED_LOD_COUNT {
            return Err(MeshSettingsError::LevelOfDetail {
                lod,
                supported: SUPPORTED_LOD_COUNT,
            });
        }
        Ok(())
    }

    /// Chunk size selected by the active shading mode.
    ///
    /// # Panics
    ///
    /// Panics if the active size index is out of range; call
    /// [`validate`](Self::validate) first.
    pub fn chunk_size(&self) -> usize {
        let index = if self.flat_shading {
            self.flat_chunk_size_index
        } else {
            self.smooth_chunk_size_index
        };
        SUPPORTED_CHUNK_SIZES[index]
    }

    /// Samples per side of the bordered height grid, including the two
    /// normal-only border samples.
    pub fn chunk_resolution(&self) -> usize {
        self.chunk_size() + 1
    }

    /// Edge length of the emitted mesh in world units.
    pub fn mesh_world_size(&self) -> f32 {
        (self.chunk_resolution() - 3) as f32 * self.scale
    }

    /// Noise-space distance between neighboring tile centers.
    ///
    /// Neighbors share their outermost interior row of samples.
    pub fn tile_step(&self) -> f32 {
        (self.chunk_resolution() - 3) as f32
    }
}
