//! Writers for generated artifacts: PNG debug images and Wavefront OBJ meshes.

use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use glam::Vec3;
use tessera_mesh::MeshData;
use tessera_terrain::{PointCloud, debug_viz::DebugImage};

pub fn save_png(image: &DebugImage, path: &Path) -> Result<(), Box<dyn Error>> {
    let buffer = image::RgbaImage::from_raw(image.width, image.height, image.pixels.clone())
        .ok_or("debug image buffer does not match its dimensions")?;
    buffer.save(path)?;
    Ok(())
}

pub fn load_png(path: &Path) -> Result<DebugImage, Box<dyn Error>> {
    let buffer = image::open(path)?.into_rgba8();
    let (width, height) = buffer.dimensions();
    DebugImage::from_rgba(width, height, buffer.into_raw())
        .ok_or_else(|| format!("{} has an unexpected pixel layout", path.display()).into())
}

/// Write `mesh` translated by `offset`. Smooth meshes include their normals.
pub fn write_mesh_obj(mesh: &MeshData, offset: Vec3, path: &Path) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for p in &mesh.positions {
        let p = Vec3::from(*p) + offset;
        writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for uv in &mesh.uvs {
        writeln!(out, "vt {} {}", uv[0], uv[1])?;
    }
    if let Some(normals) = &mesh.normals {
        for n in normals {
            writeln!(out, "vn {} {} {}", n[0], n[1], n[2])?;
        }
        for t in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle(t).map(|i| i + 1);
            writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
        }
    } else {
        for t in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle(t).map(|i| i + 1);
            writeln!(out, "f {a}/{a} {b}/{b} {c}/{c}")?;
        }
    }
    out.flush()
}

/// Write a point cloud as colored OBJ vertices.
pub fn write_points_obj(cloud: &PointCloud, offset: Vec3, path: &Path) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for point in &cloud.points {
        let p = point.position + offset;
        let [r, g, b, _] = point.color;
        writeln!(out, "v {} {} {} {r} {g} {b}", p.x, p.y, p.z)?;
    }
    out.flush()
}
