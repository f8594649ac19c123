//! Height grid to triangle mesh.
//!
//! The input grid carries a one-sample border on every side. Border samples
//! shape the normals of the outermost real vertices so that neighboring tiles
//! shade continuously, but they never become vertices themselves.

use std::time::Instant;

use glam::Vec3;
use tessera_terrain::ScalarField;
use tracing::debug;

use crate::mesh_data::{MeshData, VertexIndex};
use crate::settings::{MeshSettings, SUPPORTED_LOD_COUNT, lod_stride};

/// Grid points visited at `stride`, with their vertex indices.
struct IndexGrid {
    points_per_line: usize,
    indices: Vec<VertexIndex>,
}

impl IndexGrid {
    fn new(bordered: usize, stride: usize) -> Self {
        let points_per_line = (bordered - 1) / stride + 1;
        let mut indices = Vec::with_capacity(points_per_line * points_per_line);
        let (mut interior, mut border) = (0u32, 0u32);
        for z in (0..bordered).step_by(stride) {
            for x in (0..bordered).step_by(stride) {
                let on_border = x == 0 || z == 0 || x == bordered - 1 || z == bordered - 1;
                if on_border {
                    indices.push(VertexIndex::Border(border));
                    border += 1;
                } else {
                    indices.push(VertexIndex::Interior(interior));
                    interior += 1;
                }
            }
        }
        Self {
            points_per_line,
            indices,
        }
    }

    /// Index at grid step `(i, j)`, i.e. sample `(i * stride, j * stride)`.
    fn at(&self, i: usize, j: usize) -> VertexIndex {
        self.indices[j * self.points_per_line + i]
    }
}

/// Build the mesh for a bordered, square height grid at level of detail `lod`.
///
/// # Panics
///
/// Panics if the grid is not square, is smaller than 3 samples per side,
/// `lod >= SUPPORTED_LOD_COUNT`, or the LOD stride does not divide
/// `size - 1`.
pub fn build_mesh(heights: &ScalarField, settings: &MeshSettings, lod: usize) -> MeshData {
    let start = Instant::now();
    let (bordered, length) = heights.dimensions();
    assert_eq!(
        bordered, length,
        "height grid must be square, got {bordered}x{length}"
    );
    assert!(bordered >= 3, "height grid must be at least 3x3, got {bordered}");
    assert!(
        lod < SUPPORTED_LOD_COUNT,
        "level of detail {lod} out of range 0..{SUPPORTED_LOD_COUNT}"
    );
    let stride = lod_stride(lod);
    assert!(
        (bordered - 1) % stride == 0 && bordered > 2 * stride,
        "stride {stride} (LOD {lod}) does not fit a grid of {bordered}"
    );

    let grid = IndexGrid::new(bordered, stride);
    let mesh_size = (bordered - 2 * stride) as f32;
    let interior_size = (bordered - 2) as f32;
    let top_left_x = (interior_size - 1.0) / -2.0;
    let top_left_z = (interior_size - 1.0) / 2.0;

    let mut positions = Vec::new();
    let mut uvs = Vec::new();
    let mut border_positions = Vec::new();
    let mut triangles: Vec<[VertexIndex; 3]> = Vec::new();

    let last = grid.points_per_line - 1;
    for j in 0..grid.points_per_line {
        for i in 0..grid.points_per_line {
            let (x, z) = (i * stride, j * stride);
            let uv = [
                (x as f32 - stride as f32) / mesh_size,
                (z as f32 - stride as f32) / mesh_size,
            ];
            let position = [
                (top_left_x + uv[0] * interior_size) * settings.scale,
                heights.get(x, z),
                (top_left_z - uv[1] * interior_size) * settings.scale,
            ];
            match grid.at(i, j) {
                VertexIndex::Interior(_) => {
                    positions.push(position);
                    uvs.push(uv);
                }
                VertexIndex::Border(_) => border_positions.push(position),
            }

            if i < last && j < last {
                let a = grid.at(i, j);
                let b = grid.at(i + 1, j);
                let c = grid.at(i, j + 1);
                let d = grid.at(i + 1, j + 1);
                triangles.push([a, d, c]);
                triangles.push([d, a, b]);
            }
        }
    }

    let position_of = |index: VertexIndex| -> Vec3 {
        match index {
            VertexIndex::Interior(i) => Vec3::from(positions[i as usize]),
            VertexIndex::Border(i) => Vec3::from(border_positions[i as usize]),
        }
    };

    let visible: Vec<[u32; 3]> = triangles
        .iter()
        .filter_map(|tri| {
            Some([tri[0].interior()?, tri[1].interior()?, tri[2].interior()?])
        })
        .collect();

    let mesh = if settings.flat_shading {
        let mut flat_positions = Vec::with_capacity(visible.len() * 3);
        let mut flat_uvs = Vec::with_capacity(visible.len() * 3);
        for &i in visible.iter().flatten() {
            flat_positions.push(positions[i as usize]);
            flat_uvs.push(uvs[i as usize]);
        }
        MeshData {
            indices: (0..flat_positions.len() as u32).collect(),
            positions: flat_positions,
            uvs: flat_uvs,
            normals: None,
            flat_shaded: true,
        }
    } else {
        // Unnormalized cross products weight each face by its area.
        let mut sums = vec![Vec3::ZERO; positions.len()];
        for tri in &triangles {
            let [a, b, c] = tri.map(position_of);
            let face = (b - a).cross(c - a);
            for index in tri {
                if let VertexIndex::Interior(i) = index {
                    sums[*i as usize] += face;
                }
            }
        }
        let normals = sums.iter().map(|n| n.normalize_or_zero().to_array()).collect();
        MeshData {
            indices: visible.into_iter().flatten().collect(),
            positions,
            uvs,
            normals: Some(normals),
            flat_shaded: false,
        }
    };

    debug!(
        size = bordered,
        lod,
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        flat = mesh.flat_shaded,
        build_time_us = start.elapsed().as_micros() as u64,
        "Built terrain mesh"
    );
    mesh
}

/// Vertices per side of the emitted mesh for a bordered grid of `bordered`
/// samples at `lod`.
///
/// # Panics
///
/// Panics if the grid cannot hold one interior vertex at the LOD stride.
pub fn vertices_per_line(bordered: usize, lod: usize) -> usize {
    let stride = lod_stride(lod);
    assert!(
        bordered > 2 * stride,
        "stride {stride} (LOD {lod}) does not fit a grid of {bordered}"
    );
    (bordered - 2 * stride - 1) / stride + 1
}
