//! Deterministic scatter of vegetation points and tree instances over a tile.
//!
//! Candidates are drawn from a generator seeded per call, filtered by the
//! profile's density and habitat, and then dropped onto the ground through a
//! [`SurfaceProbe`]. The probe stands in for whatever collision query the host
//! has; [`HeightMapProbe`] answers it from a [`HeightMap`].

use glam::{EulerRot, Quat, Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::field::ScalarField;
use crate::hash_grid::HashGrid;
use crate::heightmap::HeightMap;
use crate::remap::map;
use crate::world::{GrowthBands, WorldData};

/// Clearance from growth limits for point clouds, in world units.
pub const POINT_HABITAT_MARGIN: f32 = 1.0;
/// Clearance from growth limits for trees, in world units.
pub const TREE_HABITAT_MARGIN: f32 = 2.5;
/// Points sit this far below the probed surface.
const POINT_SINK: f32 = 0.01;
/// Trees sink a random depth in this range.
const TREE_SINK: (f32, f32) = (1.0, 2.0);
/// Maximum tree tilt in degrees, and the relative scale variation.
const TREE_VARIATION: f32 = 0.5;

/// Elevation band a plant species grows in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Habitat {
    /// Between the growth limits.
    #[default]
    Terrestrial,
    /// Between sea level and just above the lower growth limit.
    Marine,
    /// Below sea level.
    Aquatic,
}

/// Placement and tint parameters for one plant species.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantProfile {
    pub name: String,
    pub habitat: Habitat,
    /// Fraction of candidates kept, in `[0, 1]`.
    pub density: f32,
    /// Coherent-hash threshold below which a plant uses the unhealthy palette.
    pub disease_prevalence: f32,
    pub healthy_dark: [f32; 4],
    pub healthy_bright: [f32; 4],
    pub unhealthy_dark: [f32; 4],
    pub unhealthy_bright: [f32; 4],
}

impl Default for PlantProfile {
    fn default() -> Self {
        Self {
            name: "grass".to_owned(),
            habitat: Habitat::Terrestrial,
            density: 0.5,
            disease_prevalence: 0.2,
            healthy_dark: [0.18, 0.35, 0.08, 1.0],
            healthy_bright: [0.45, 0.7, 0.2, 1.0],
            unhealthy_dark: [0.35, 0.3, 0.1, 1.0],
            unhealthy_bright: [0.7, 0.6, 0.25, 1.0],
        }
    }
}

/// One scattered point, positioned relative to the tile center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterPoint {
    pub index: u32,
    pub position: Vec3,
    pub uv: Vec2,
    /// Surface normal, scaled to vary blade size.
    pub normal: Vec3,
    pub color: [f32; 4],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointCloud {
    pub points: Vec<ScatterPoint>,
}

impl PointCloud {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn push(&mut self, position: Vec3, uv: Vec2, normal: Vec3, color: [f32; 4]) {
        let index = self.points.len() as u32;
        self.points.push(ScatterPoint {
            index,
            position,
            uv,
            normal,
            color,
        });
    }
}

/// A placed tree in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeInstance {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

/// Where a downward probe met the ground.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeHit {
    pub point: Vec3,
    pub normal: Vec3,
}

/// Vertical ground queries at world `(x, z)`.
pub trait SurfaceProbe {
    /// The ground under `(x, z)`, if any.
    fn ground(&self, x: f32, z: f32) -> Option<ProbeHit>;

    /// Whether a no-grow obstacle covers `(x, z)`.
    fn obstructed(&self, _x: f32, _z: f32) -> bool {
        false
    }
}

/// Answers probes from a height map laid out on the XZ plane.
///
/// Cell `(i, j)` sits at world `(origin.x + i * cell_size, origin.y - j * cell_size)`,
/// with grid `y` running along world `-z` as in the terrain mesh.
#[derive(Clone, Debug)]
pub struct HeightMapProbe<'a> {
    map: &'a HeightMap,
    origin: Vec2,
    cell_size: f32,
    obstacles: Vec<(Vec2, f32)>,
}

impl<'a> HeightMapProbe<'a> {
    /// A probe whose first cell sits at world `(origin.x, origin.y)`.
    pub fn new(map: &'a HeightMap, origin: Vec2, cell_size: f32) -> Self {
        assert!(cell_size > 0.0, "probe cell size must be positive");
        Self {
            map,
            origin,
            cell_size,
            obstacles: Vec::new(),
        }
    }

    /// A probe whose grid is centered on `center`, matching a mesh built
    /// from the same map with `cell_size` as its scale.
    pub fn centered(map: &'a HeightMap, center: Vec2, cell_size: f32) -> Self {
        let (w, l) = map.values.dimensions();
        let half = Vec2::new((w - 1) as f32, (l - 1) as f32) * 0.5 * cell_size;
        Self::new(map, Vec2::new(center.x - half.x, center.y + half.y), cell_size)
    }

    /// Add a circular no-grow zone.
    pub fn with_obstacle(mut self, center: Vec2, radius: f32) -> Self {
        self.obstacles.push((center, radius));
        self
    }

    fn height_at_grid(&self, gx: f32, gz: f32) -> f32 {
        sample_field(&self.map.values, gx, gz)
    }
}

impl SurfaceProbe for HeightMapProbe<'_> {
    fn ground(&self, x: f32, z: f32) -> Option<ProbeHit> {
        let (w, l) = self.map.values.dimensions();
        let gx = (x - self.origin.x) / self.cell_size;
        let gz = (self.origin.y - z) / self.cell_size;
        if gx < 0.0 || gz < 0.0 || gx > (w - 1) as f32 || gz > (l - 1) as f32 {
            return None;
        }

        let height = self.height_at_grid(gx, gz);
        let dhdx = (self.height_at_grid(gx + 1.0, gz) - self.height_at_grid(gx - 1.0, gz))
            / (2.0 * self.cell_size);
        // Grid rows advance toward -z.
        let dhdz = (self.height_at_grid(gx, gz - 1.0) - self.height_at_grid(gx, gz + 1.0))
            / (2.0 * self.cell_size);

        Some(ProbeHit {
            point: Vec3::new(x, height, z),
            normal: Vec3::new(-dhdx, 1.0, -dhdz).normalize(),
        })
    }

    fn obstructed(&self, x: f32, z: f32) -> bool {
        let p = Vec2::new(x, z);
        self.obstacles
            .iter()
            .any(|&(center, radius)| center.distance_squared(p) <= radius * radius)
    }
}

/// Bilinear sample of `field` at fractional grid coordinates, clamped to the edges.
pub fn sample_field(field: &ScalarField, x: f32, z: f32) -> f32 {
    let (w, l) = field.dimensions();
    let x = x.clamp(0.0, (w - 1) as f32);
    let z = z.clamp(0.0, (l - 1) as f32);
    let x0 = x.floor() as usize;
    let z0 = z.floor() as usize;
    let x1 = (x0 + 1).min(w - 1);
    let z1 = (z0 + 1).min(l - 1);
    let tx = x - x0 as f32;
    let tz = z - z0 as f32;

    let top = field.get(x0, z0) + (field.get(x1, z0) - field.get(x0, z0)) * tx;
    let bottom = field.get(x0, z1) + (field.get(x1, z1) - field.get(x0, z1)) * tx;
    top + (bottom - top) * tz
}

/// Tile-wide inputs shared by the probe-based samplers.
#[derive(Clone, Copy, Debug)]
pub struct ScatterContext<'a> {
    pub world: &'a WorldData,
    pub growth: GrowthBands,
    pub max_global_height: f32,
    /// Tile edge length in world units.
    pub tile_resolution: usize,
    /// World distance between neighboring world-data cells.
    pub cell_size: f32,
}

impl ScatterContext<'_> {
    /// Normalized elevation at a world position near `center`, with the
    /// world data laid out like [`HeightMapProbe::centered`].
    fn elevation_at(&self, center: Vec2, x: f32, z: f32) -> f32 {
        let elevation = &self.world.elevation;
        let half_x = (elevation.width() - 1) as f32 * 0.5;
        let half_z = (elevation.length() - 1) as f32 * 0.5;
        sample_field(
            elevation,
            (x - center.x) / self.cell_size + half_x,
            half_z - (z - center.y) / self.cell_size,
        )
    }

    fn allows(&self, habitat: Habitat, elevation: f32, margin: f32) -> bool {
        self.growth
            .habitat_allows(habitat, elevation, margin / self.max_global_height)
    }
}

fn jitter(rng: &mut ChaCha8Rng, amount: f32) -> f32 {
    if amount > 0.0 {
        rng.random_range(-amount..amount)
    } else {
        0.0
    }
}

fn lerp_color(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t)
}

/// A jittered `resolution x resolution` grid of points at a fixed height.
///
/// Positions are relative to `sample_center`. Normals point down and every
/// point is white.
pub fn point_cloud_at_height(
    resolution: usize,
    seed: i32,
    sample_center: Vec2,
    height: f32,
    tile_resolution: usize,
) -> PointCloud {
    let mut rng = ChaCha8Rng::seed_from_u64(seed as i64 as u64);
    let mut cloud = PointCloud::default();
    if resolution == 0 {
        return cloud;
    }
    let tile = tile_resolution as f32;
    let spacing = tile / resolution as f32;
    let noise = spacing * 0.25;

    for z in 0..resolution {
        for x in 0..resolution {
            let real = Vec2::new(x as f32 * spacing, z as f32 * spacing);
            let offset = Vec2::new(jitter(&mut rng, noise), jitter(&mut rng, noise));
            let local = real - Vec2::splat(tile * 0.5) + offset;
            let origin = sample_center + local;

            cloud.push(
                Vec3::new(origin.x - sample_center.x, height, origin.y - sample_center.y),
                (real + offset) / tile,
                Vec3::NEG_Y,
                [1.0; 4],
            );
        }
    }
    cloud
}

/// A jittered grid of vegetation points dropped onto the ground through `probe`.
///
/// Points are skipped by the density hash, the habitat band, obstacles, and
/// missed probes. Positions are relative to `sample_center`.
pub fn point_cloud_from_probe(
    resolution: usize,
    seed: i32,
    sample_center: Vec2,
    context: &ScatterContext<'_>,
    profile: &PlantProfile,
    probe: &impl SurfaceProbe,
    hash: &HashGrid,
) -> PointCloud {
    let mut rng = ChaCha8Rng::seed_from_u64(seed as i64 as u64);
    let mut cloud = PointCloud::default();
    if resolution == 0 {
        return cloud;
    }
    let tile = context.tile_resolution as f32;
    let spacing = tile / resolution as f32;
    let noise = spacing * 0.25;

    for z in 0..resolution {
        for x in 0..resolution {
            let real = Vec2::new(x as f32 * spacing, z as f32 * spacing);
            let offset = Vec2::new(jitter(&mut rng, noise), jitter(&mut rng, noise));
            let origin = sample_center + real - Vec2::splat(tile * 0.5) + offset;

            if profile.density < hash.absolute(Vec3::new(origin.x, 0.0, origin.y)) {
                continue;
            }
            let elevation = context.elevation_at(sample_center, origin.x, origin.y);
            if !context.allows(profile.habitat, elevation, POINT_HABITAT_MARGIN) {
                continue;
            }
            if probe.obstructed(origin.x, origin.y) {
                continue;
            }
            let Some(hit) = probe.ground(origin.x, origin.y) else {
                continue;
            };

            let position = Vec3::new(
                hit.point.x - sample_center.x,
                hit.point.y - POINT_SINK,
                hit.point.z - sample_center.y,
            );
            let perlin = hash.coherent(position);
            let normal = hit.normal * map(perlin, 0.25, 0.75, 0.5, 1.25);
            let (dark, bright) = if perlin <= profile.disease_prevalence {
                (profile.unhealthy_dark, profile.unhealthy_bright)
            } else {
                (profile.healthy_dark, profile.healthy_bright)
            };
            let color = lerp_color(dark, bright, hash.absolute(position));

            cloud.push(position, (real + offset) / tile, normal, color);
        }
    }
    cloud
}

/// Randomly placed tree instances over the tile around `sample_center`.
///
/// Makes `round(tile_resolution / 2 * density)` attempts. Positions are in
/// world space.
pub fn tree_cloud_from_probe(
    seed: i32,
    sample_center: Vec2,
    context: &ScatterContext<'_>,
    profile: &PlantProfile,
    probe: &impl SurfaceProbe,
) -> Vec<TreeInstance> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed as i64 as u64);
    let tile = context.tile_resolution as f32;
    let attempts = (tile * 0.5 * profile.density).round().max(0.0) as usize;
    let mut trees = Vec::new();

    for _ in 0..attempts {
        let x = sample_center.x + tile * rng.random_range(-0.5..0.5);
        let z = sample_center.y + tile * rng.random_range(-0.5..0.5);

        let elevation = context.elevation_at(sample_center, x, z);
        if !context.allows(profile.habitat, elevation, TREE_HABITAT_MARGIN) {
            continue;
        }
        if probe.obstructed(x, z) {
            continue;
        }
        let Some(hit) = probe.ground(x, z) else {
            continue;
        };

        let sink = rng.random_range(TREE_SINK.0..TREE_SINK.1);
        let tilt_x = jitter(&mut rng, TREE_VARIATION);
        let yaw = rng.random_range(0.0..360.0_f32);
        let tilt_z = jitter(&mut rng, TREE_VARIATION);
        let scale = rng.random_range(1.0 - TREE_VARIATION..1.0 + TREE_VARIATION);

        trees.push(TreeInstance {
            position: hit.point - Vec3::Y * sink,
            rotation: Quat::from_euler(
                EulerRot::YXZ,
                yaw.to_radians(),
                tilt_x.to_radians(),
                tilt_z.to_radians(),
            ),
            scale: Vec3::splat(scale),
        });
    }
    trees
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightmap::flat_height_map;
    use crate::world::{ClassifierParams, SurfaceTable, classify, default_surface_bands};

    const TILE: usize = 32;

    struct Fixture {
        map: HeightMap,
        world: WorldData,
        params: ClassifierParams,
    }

    /// A flat tile at normalized elevation `level` with max height 100.
    fn fixture(level: f32) -> Fixture {
        let table = SurfaceTable::from_bands(default_surface_bands()).unwrap();
        let params = ClassifierParams::from_bands(&table, 100.0).unwrap();
        let map = flat_height_map(TILE + 1, TILE + 1, level * 100.0);
        let world = classify(&map.values, &table, &params);
        Fixture { map, world, params }
    }

    fn context(f: &Fixture) -> ScatterContext<'_> {
        ScatterContext {
            world: &f.world,
            growth: f.params.growth,
            max_global_height: f.params.max_global_height,
            tile_resolution: TILE,
            cell_size: 1.0,
        }
    }

    #[test]
    fn test_sample_field_bilinear_and_clamped() {
        let field = ScalarField::from_vec(2, 2, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(sample_field(&field, 0.5, 0.0), 0.5);
        assert_eq!(sample_field(&field, 0.5, 0.5), 1.5);
        assert_eq!(sample_field(&field, -4.0, 9.0), 2.0);
    }

    #[test]
    fn test_height_map_probe_flat_ground() {
        let map = flat_height_map(9, 9, 4.0);
        let probe = HeightMapProbe::centered(&map, Vec2::ZERO, 1.0);
        let hit = probe.ground(1.5, -2.0).expect("inside the map");
        assert_eq!(hit.point, Vec3::new(1.5, 4.0, -2.0));
        assert!((hit.normal - Vec3::Y).length() < 1e-6);
        assert!(probe.ground(10.0, 0.0).is_none(), "outside the map");
    }

    #[test]
    fn test_height_map_probe_slope_normal() {
        let map = HeightMap::from_field(ScalarField::from_fn(5, 5, |x, _| x as f32));
        let probe = HeightMapProbe::new(&map, Vec2::ZERO, 1.0);
        let hit = probe.ground(2.0, -2.0).unwrap();
        let expected = Vec3::new(-1.0, 1.0, 0.0).normalize();
        assert!((hit.normal - expected).length() < 1e-5, "got {}", hit.normal);
        assert!(probe.ground(2.0, 2.0).is_none(), "rows run toward -z");
    }

    #[test]
    fn test_height_map_probe_rows_run_toward_negative_z() {
        // Height equals the row index, so the ground rises toward -z.
        let map = HeightMap::from_field(ScalarField::from_fn(9, 9, |_, z| z as f32));
        let probe = HeightMapProbe::centered(&map, Vec2::ZERO, 1.0);

        let north = probe.ground(0.0, 2.0).unwrap();
        assert!((north.point.y - 2.0).abs() < 1e-5, "got {}", north.point.y);
        let south = probe.ground(0.0, -3.0).unwrap();
        assert!((south.point.y - 7.0).abs() < 1e-5, "got {}", south.point.y);

        let expected = Vec3::new(0.0, 1.0, 1.0).normalize();
        assert!((north.normal - expected).length() < 1e-5, "got {}", north.normal);
    }

    #[test]
    fn test_height_map_probe_cell_size() {
        let map = HeightMap::from_field(ScalarField::from_fn(9, 9, |_, z| z as f32));
        let probe = HeightMapProbe::centered(&map, Vec2::new(100.0, -40.0), 4.0);
        // Row 2 lies two cells toward +z from the center row.
        let hit = probe.ground(100.0, -40.0 + 8.0).unwrap();
        assert!((hit.point.y - 2.0).abs() < 1e-5, "got {}", hit.point.y);
        assert!(probe.ground(100.0, -40.0 + 17.0).is_none());
    }

    #[test]
    fn test_elevation_follows_probe_layout() {
        let table = SurfaceTable::from_bands(default_surface_bands()).unwrap();
        let params = ClassifierParams::from_bands(&table, 100.0).unwrap();
        let map = HeightMap::from_field(ScalarField::from_fn(9, 9, |_, z| z as f32 * 10.0));
        let world = classify(&map.values, &table, &params);
        let context = ScatterContext {
            world: &world,
            growth: params.growth,
            max_global_height: params.max_global_height,
            tile_resolution: 8,
            cell_size: 2.0,
        };
        let center = Vec2::new(5.0, 5.0);
        // World z = 5 + 2 * 2 is row 2.
        let elevation = context.elevation_at(center, 5.0, 9.0);
        assert!(
            (elevation - world.elevation.get(4, 2)).abs() < 1e-6,
            "got {elevation}"
        );
    }

    #[test]
    fn test_point_cloud_at_height_grid() {
        let cloud = point_cloud_at_height(8, 1, Vec2::new(100.0, 50.0), 3.0, TILE);
        assert_eq!(cloud.len(), 64);
        for (i, p) in cloud.points.iter().enumerate() {
            assert_eq!(p.index as usize, i);
            assert_eq!(p.position.y, 3.0);
            assert_eq!(p.normal, Vec3::NEG_Y);
            assert!(p.position.x.abs() <= TILE as f32 * 0.5 + 1.0);
        }
        let again = point_cloud_at_height(8, 1, Vec2::new(100.0, 50.0), 3.0, TILE);
        assert_eq!(cloud, again);
    }

    #[test]
    fn test_point_cloud_from_probe_on_grass() {
        let f = fixture(0.5);
        let probe = HeightMapProbe::centered(&f.map, Vec2::ZERO, 1.0);
        let hash = HashGrid::new(1, 64, 1.0);
        let profile = PlantProfile {
            density: 1.0,
            ..Default::default()
        };
        let cloud = point_cloud_from_probe(16, 3, Vec2::ZERO, &context(&f), &profile, &probe, &hash);
        assert!(!cloud.is_empty(), "grass on flat growth-band ground");
        for p in &cloud.points {
            assert!((p.position.y - (50.0 - POINT_SINK)).abs() < 1e-4);
            // map(perlin, 0.25, 0.75, 0.5, 1.25) over perlin in [0, 1].
            let scale = p.normal.length();
            assert!((0.125 - 1e-4..=1.625 + 1e-4).contains(&scale), "normal scale {scale}");
        }

        let again = point_cloud_from_probe(16, 3, Vec2::ZERO, &context(&f), &profile, &probe, &hash);
        assert_eq!(cloud, again, "probe scatter must be deterministic");
    }

    #[test]
    fn test_point_cloud_respects_habitat_and_density() {
        let f = fixture(0.5);
        let probe = HeightMapProbe::centered(&f.map, Vec2::ZERO, 1.0);
        let hash = HashGrid::new(1, 64, 1.0);

        let aquatic = PlantProfile {
            habitat: Habitat::Aquatic,
            density: 1.0,
            ..Default::default()
        };
        let cloud = point_cloud_from_probe(16, 3, Vec2::ZERO, &context(&f), &aquatic, &probe, &hash);
        assert!(cloud.is_empty(), "aquatic plants must not grow on grass");

        let sparse = PlantProfile {
            density: 0.25,
            ..Default::default()
        };
        let dense = PlantProfile {
            density: 1.0,
            ..Default::default()
        };
        let few = point_cloud_from_probe(16, 3, Vec2::ZERO, &context(&f), &sparse, &probe, &hash);
        let many = point_cloud_from_probe(16, 3, Vec2::ZERO, &context(&f), &dense, &probe, &hash);
        assert!(few.len() < many.len());
    }

    #[test]
    fn test_obstacles_block_points() {
        let f = fixture(0.5);
        let probe = HeightMapProbe::centered(&f.map, Vec2::ZERO, 1.0).with_obstacle(Vec2::ZERO, 100.0);
        let hash = HashGrid::new(1, 64, 1.0);
        let profile = PlantProfile {
            density: 1.0,
            ..Default::default()
        };
        let cloud = point_cloud_from_probe(8, 3, Vec2::ZERO, &context(&f), &profile, &probe, &hash);
        assert!(cloud.is_empty());
    }

    #[test]
    fn test_tree_cloud_variation_bounds() {
        let f = fixture(0.5);
        let probe = HeightMapProbe::centered(&f.map, Vec2::ZERO, 1.0);
        let profile = PlantProfile {
            density: 1.0,
            ..Default::default()
        };
        let trees = tree_cloud_from_probe(9, Vec2::ZERO, &context(&f), &profile, &probe);
        assert!(!trees.is_empty());
        assert!(trees.len() <= TILE / 2);
        for tree in &trees {
            let sink = 50.0 - tree.position.y;
            assert!((1.0 - 1e-4..=2.0 + 1e-4).contains(&sink), "sink {sink}");
            assert!((0.5..1.5).contains(&tree.scale.x), "scale {}", tree.scale.x);
            let up = tree.rotation * Vec3::Y;
            assert!(up.y > 0.999, "trees may only tilt slightly, up = {up}");
        }
        let again = tree_cloud_from_probe(9, Vec2::ZERO, &context(&f), &profile, &probe);
        assert_eq!(trees, again);
    }

    #[test]
    fn test_tree_cloud_zero_density() {
        let f = fixture(0.5);
        let probe = HeightMapProbe::centered(&f.map, Vec2::ZERO, 1.0);
        let profile = PlantProfile {
            density: 0.0,
            ..Default::default()
        };
        assert!(tree_cloud_from_probe(9, Vec2::ZERO, &context(&f), &profile, &probe).is_empty());
    }
}
