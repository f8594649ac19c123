//! Tessera demo: generates a square of terrain tiles and writes debug images,
//! meshes and scatter point clouds to the output directory.

mod export;

use std::collections::VecDeque;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use glam::{Vec2, Vec3};
use tessera_config::{CliArgs, Config};
use tessera_mesh::{MeshSettings, MeshingPipeline, MeshingResult, MeshingTask};
use tessera_terrain::debug_viz::{
    render_deep_gradient, render_gradient, render_surface, render_world_data,
    world_data_from_image,
};
use tessera_terrain::{
    ClassifierParams, GeneratedTile, HashGrid, HeightMapProbe, ScatterContext, SurfaceTable,
    TileCoord, TileGenerator, TileRecipe, TileTask, build_height_map, classify,
    point_cloud_at_height, point_cloud_from_probe, tree_cloud_from_probe,
};
use tracing::{info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(2);

fn tile_name(coord: TileCoord) -> String {
    format!("tile_{}_{}", coord.x, coord.y)
}

/// Per-tile seed so neighboring tiles scatter differently.
fn tile_seed(seed: i32, coord: TileCoord) -> i32 {
    seed.wrapping_add(coord.x.wrapping_mul(7919))
        .wrapping_add(coord.y.wrapping_mul(104_729))
}

/// World-space offset of a tile's mesh. Grid `y` runs along world `-z`.
fn tile_offset(coord: TileCoord, mesh: &MeshSettings) -> Vec3 {
    let size = mesh.mesh_world_size();
    Vec3::new(coord.x as f32 * size, 0.0, -(coord.y as f32) * size)
}

fn generate_tiles(recipe: &Arc<TileRecipe>, radius: i32) -> Result<Vec<GeneratedTile>, Box<dyn Error>> {
    let generator = TileGenerator::with_defaults()?;
    let mut queue: VecDeque<TileTask> = (-radius..=radius)
        .flat_map(|y| (-radius..=radius).map(move |x| TileCoord::new(x, y)))
        .map(|coord| TileTask {
            coord,
            recipe: Arc::clone(recipe),
            preview: false,
        })
        .collect();
    let expected = queue.len();
    let mut tiles = Vec::with_capacity(expected);

    loop {
        while let Some(task) = queue.pop_front() {
            if let Err(task) = generator.submit(task) {
                queue.push_front(task);
                break;
            }
        }
        tiles.extend(generator.drain_results());
        if queue.is_empty() && generator.in_flight_count() == 0 {
            tiles.extend(generator.drain_results());
            break;
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    if tiles.len() != expected {
        return Err(format!("generated {} of {expected} tiles", tiles.len()).into());
    }
    tiles.sort_by_key(|tile| tile.coord);
    Ok(tiles)
}

fn write_tile_images(tile: &GeneratedTile, bands: &SurfaceTable, out: &Path) -> Result<(), Box<dyn Error>> {
    let name = tile_name(tile.coord);
    let map = &tile.height_map;
    export::save_png(
        &render_deep_gradient(&map.values, false, map.min, map.max),
        &out.join(format!("{name}_height.png")),
    )?;
    export::save_png(
        &render_gradient(&tile.world.temperature, [0, 0, 255, 255], [255, 64, 0, 255], 0.0, 1.0),
        &out.join(format!("{name}_temperature.png")),
    )?;
    export::save_png(
        &render_world_data(&tile.world),
        &out.join(format!("{name}_world.png")),
    )?;
    if let Some(surface) = &tile.world.surface {
        export::save_png(
            &render_surface(surface, bands),
            &out.join(format!("{name}_surface.png")),
        )?;
    }
    Ok(())
}

fn mesh_tiles(tiles: &[GeneratedTile], config: &Config, out: &Path) -> Result<(), Box<dyn Error>> {
    let workers = num_cpus::get().max(2);
    let mut pipeline = MeshingPipeline::new(workers, tiles.len().max(1))?;
    let settings = Arc::new(config.mesh.clone());
    let lod = config.output.lod;

    let mut submitted = 0;
    for tile in tiles {
        let task = MeshingTask {
            coord: tile.coord,
            lod,
            heights: Arc::new(tile.height_map.values.clone()),
            settings: Arc::clone(&settings),
        };
        if pipeline.submit(task) {
            submitted += 1;
        } else {
            warn!(x = tile.coord.x, y = tile.coord.y, "Meshing budget exhausted, tile skipped");
        }
    }

    let mut written = 0;
    while written < submitted && pipeline.in_flight_count() > 0 {
        for result in pipeline.drain_results() {
            write_mesh(&result, &settings, out)?;
            written += 1;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
    // Joining the workers makes every sent result visible.
    pipeline.shutdown();
    for result in pipeline.drain_results() {
        write_mesh(&result, &settings, out)?;
        written += 1;
    }

    if written != submitted {
        return Err(format!("meshed {written} of {submitted} tiles").into());
    }
    Ok(())
}

fn write_mesh(result: &MeshingResult, settings: &MeshSettings, out: &Path) -> Result<(), Box<dyn Error>> {
    let path = out.join(format!("{}_lod{}.obj", tile_name(result.coord), result.lod));
    export::write_mesh_obj(&result.mesh, tile_offset(result.coord, settings), &path)?;
    info!(
        x = result.coord.x,
        y = result.coord.y,
        vertices = result.mesh.vertex_count(),
        triangles = result.mesh.triangle_count(),
        "Wrote mesh"
    );
    Ok(())
}

fn scatter_tile(
    tile: &GeneratedTile,
    config: &Config,
    params: &ClassifierParams,
    hash: &HashGrid,
    out: &Path,
) -> Result<(), Box<dyn Error>> {
    // Scatter in the same world frame as the tile's mesh.
    let offset = tile_offset(tile.coord, &config.mesh);
    let center = Vec2::new(offset.x, offset.z);
    let tile_resolution = config.mesh.mesh_world_size().round() as usize;
    let seed = tile_seed(config.terrain.noise.seed, tile.coord);
    let probe = HeightMapProbe::centered(&tile.height_map, center, config.mesh.scale);
    let context = ScatterContext {
        world: &tile.world,
        growth: params.growth,
        max_global_height: params.max_global_height,
        tile_resolution,
        cell_size: config.mesh.scale,
    };
    let name = tile_name(tile.coord);

    for profile in &config.scatter.profiles {
        let points = point_cloud_from_probe(
            config.scatter.point_resolution,
            seed,
            center,
            &context,
            profile,
            &probe,
            hash,
        );
        let trees = tree_cloud_from_probe(seed, center, &context, profile, &probe);
        export::write_points_obj(&points, offset, &out.join(format!("{name}_{}.obj", profile.name)))?;
        info!(
            x = tile.coord.x,
            y = tile.coord.y,
            profile = %profile.name,
            points = points.len(),
            trees = trees.len(),
            "Scattered vegetation"
        );
    }

    let water_height = params.growth.sea_level * params.max_global_height;
    let water = point_cloud_at_height(
        config.scatter.point_resolution,
        seed,
        center,
        water_height,
        tile_resolution,
    );
    export::write_points_obj(&water, offset, &out.join(format!("{name}_water.obj")))?;
    Ok(())
}

/// Classify one large map around the origin at the configured data
/// resolution and check the packed image decodes back.
fn write_overview(
    config: &Config,
    bands: &SurfaceTable,
    params: &ClassifierParams,
    out: &Path,
) -> Result<(), Box<dyn Error>> {
    let map = build_height_map(&config.terrain, Vec2::ZERO, config.world.data_resolution, false);
    let world = classify(&map.values, bands, params);
    let path = out.join("overview_world.png");
    export::save_png(&render_world_data(&world), &path)?;

    let decoded = world_data_from_image(&export::load_png(&path)?);
    let max_error = decoded
        .moisture
        .values()
        .iter()
        .zip(world.moisture.values())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0f32, f32::max);
    info!(
        resolution = config.world.data_resolution,
        max_error, "Wrote overview world data"
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(Config::default_dir)
        .ok_or("no config directory available, pass --config")?;

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    tessera_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    config.validate()?;
    let out = config.output.directory.clone();
    std::fs::create_dir_all(&out)?;

    let start = Instant::now();
    let bands = config.surface_table()?;
    let params = config.classifier_params()?;
    let recipe = Arc::new(TileRecipe {
        height: config.terrain.clone(),
        bands: bands.clone(),
        classifier: params,
        resolution: config.mesh.chunk_resolution(),
        tile_step: config.mesh.tile_step(),
    });

    let tiles = generate_tiles(&recipe, config.output.tile_radius as i32)?;
    info!(count = tiles.len(), "Generated tiles");

    let hash = HashGrid::from_settings(&config.scatter.hash);
    for tile in &tiles {
        write_tile_images(tile, &bands, &out)?;
        scatter_tile(tile, &config, &params, &hash, &out)?;
    }
    mesh_tiles(&tiles, &config, &out)?;
    write_overview(&config, &bands, &params, &out)?;

    info!(
        output = %out.display(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Done"
    );
    Ok(())
}
