//! Terrain mesh buffers and the interleaved vertex format used for upload.

use glam::Vec3;

/// Interleaved terrain vertex: position, normal and UV.
///
/// Layout (32 bytes total):
///   - `[0..12]`  position `[f32; 3]`
///   - `[12..24]` normal `[f32; 3]`
///   - `[24..32]` uv `[f32; 2]`
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 32]);

/// Index of a grid point while a mesh is being built.
///
/// Interior points become real vertices. Border points only contribute to
/// normals and never appear in the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexIndex {
    Interior(u32),
    Border(u32),
}

impl VertexIndex {
    pub fn interior(self) -> Option<u32> {
        match self {
            Self::Interior(i) => Some(i),
            Self::Border(_) => None,
        }
    }

    pub fn is_border(self) -> bool {
        matches!(self, Self::Border(_))
    }
}

/// A finished terrain mesh.
///
/// Smooth meshes share vertices between triangles. Flat meshes give every
/// triangle its own three vertices, so `indices` is `0..n`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    /// Per-vertex normals. Present for smooth meshes; flat meshes compute
    /// theirs on demand through [`flat_normals`](Self::flat_normals).
    pub normals: Option<Vec<[f32; 3]>>,
    pub indices: Vec<u32>,
    pub flat_shaded: bool,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Unit face normal of triangle `t`, wound counter-clockwise seen from above.
    pub fn face_normal(&self, t: usize) -> Vec3 {
        let [a, b, c] = self.triangle(t).map(|i| Vec3::from(self.positions[i as usize]));
        (b - a).cross(c - a).normalize_or_zero()
    }

    pub fn triangle(&self, t: usize) -> [u32; 3] {
        [
            self.indices[t * 3],
            self.indices[t * 3 + 1],
            self.indices[t * 3 + 2],
        ]
    }

    /// One normal per vertex taken from the face it belongs to.
    ///
    /// Meant for flat meshes. On a shared-vertex mesh the last face touching a
    /// vertex wins.
    pub fn flat_normals(&self) -> Vec<[f32; 3]> {
        let mut normals = vec![[0.0; 3]; self.positions.len()];
        for t in 0..self.triangle_count() {
            let normal = self.face_normal(t).to_array();
            for i in self.triangle(t) {
                normals[i as usize] = normal;
            }
        }
        normals
    }

    /// Normals ready for rendering: stored smooth normals or computed flat ones.
    pub fn resolved_normals(&self) -> Vec<[f32; 3]> {
        match &self.normals {
            Some(normals) => normals.clone(),
            None => self.flat_normals(),
        }
    }

    /// Interleave positions, normals and UVs into one vertex buffer.
    pub fn interleaved(&self) -> Vec<TerrainVertex> {
        let normals = self.resolved_normals();
        self.positions
            .iter()
            .zip(&normals)
            .zip(&self.uvs)
            .map(|((&position, &normal), &uv)| TerrainVertex {
                position,
                normal,
                uv,
            })
            .collect()
    }

    /// Position data as bytes (zero-copy).
    pub fn as_position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Index data as bytes (zero-copy).
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
