//! Background tile generation on a worker pool.
//!
//! Each task carries everything needed to build one tile's height map and
//! world data. Workers share the recipe through an `Arc` and never touch any
//! other shared state, since every generator seeds its own PRNG.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, bounded};
use dashmap::DashMap;
use glam::Vec2;
use tracing::debug;

use crate::heightmap::{HeightMap, HeightMapSettings, build_height_map};
use crate::world::{ClassifierParams, SurfaceTable, WorldData, classify};

/// Integer position of a tile in the tile grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Noise-space center of this tile when neighbors are `step` apart.
    pub fn center(self, step: f32) -> Vec2 {
        Vec2::new(self.x as f32 * step, self.y as f32 * step)
    }
}

/// Shared generation parameters for every tile in a batch.
#[derive(Clone, Debug)]
pub struct TileRecipe {
    pub height: HeightMapSettings,
    pub bands: SurfaceTable,
    pub classifier: ClassifierParams,
    /// Samples per side of each height map.
    pub resolution: usize,
    /// Distance between neighboring tile centers in noise space.
    pub tile_step: f32,
}

/// A request to generate one tile.
#[derive(Clone, Debug)]
pub struct TileTask {
    pub coord: TileCoord,
    pub recipe: Arc<TileRecipe>,
    pub preview: bool,
}

/// A finished tile.
#[derive(Debug)]
pub struct GeneratedTile {
    pub coord: TileCoord,
    pub height_map: HeightMap,
    pub world: WorldData,
    /// Generation time in microseconds.
    pub generation_time_us: u64,
}

struct QueuedTask {
    task: TileTask,
    cancelled: Arc<AtomicBool>,
}

/// Generates tiles on background threads and hands them back through a channel.
pub struct TileGenerator {
    task_sender: Sender<QueuedTask>,
    result_receiver: Receiver<GeneratedTile>,
    /// Cancellation flag per queued or running tile.
    active_tasks: Arc<DashMap<TileCoord, Arc<AtomicBool>>>,
    in_flight: Arc<AtomicU64>,
}

impl TileGenerator {
    /// Spawn `thread_count` workers.
    ///
    /// At most `max_concurrent * 2` tasks can be queued; finished tiles wait
    /// in a channel of `result_capacity` until drained.
    ///
    /// # Errors
    ///
    /// Returns the OS error if a worker thread cannot be spawned.
    pub fn new(
        thread_count: usize,
        max_concurrent: usize,
        result_capacity: usize,
    ) -> std::io::Result<Self> {
        let (task_sender, task_receiver) = bounded::<QueuedTask>(max_concurrent * 2);
        let (result_sender, result_receiver) = bounded::<GeneratedTile>(result_capacity);
        let in_flight = Arc::new(AtomicU64::new(0));

        for index in 0..thread_count {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);

            std::thread::Builder::new()
                .name(format!("tile-gen-{index}"))
                .spawn(move || {
                    while let Ok(queued) = receiver.recv() {
                        if queued.cancelled.load(Ordering::Relaxed) {
                            debug!(
                                x = queued.task.coord.x,
                                y = queued.task.coord.y,
                                "Skipped cancelled tile"
                            );
                            in_flight.fetch_sub(1, Ordering::Relaxed);
                            continue;
                        }

                        let tile = generate_tile_sync(&queued.task);

                        if !queued.cancelled.load(Ordering::Relaxed) {
                            let _ = sender.send(tile);
                        }
                        in_flight.fetch_sub(1, Ordering::Relaxed);
                    }
                })?;
        }

        Ok(Self {
            task_sender,
            result_receiver,
            active_tasks: Arc::new(DashMap::new()),
            in_flight,
        })
    }

    /// A generator sized to the machine, leaving two cores free.
    pub fn with_defaults() -> std::io::Result<Self> {
        let cpus = num_cpus::get().max(2);
        let threads = (cpus - 2).max(1);
        Self::new(threads, 64, 128)
    }

    /// Queue a tile.
    ///
    /// Returns the task back if the queue is full.
    #[allow(clippy::result_large_err)]
    pub fn submit(&self, task: TileTask) -> Result<(), TileTask> {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.active_tasks.insert(task.coord, Arc::clone(&cancelled));
        self.in_flight.fetch_add(1, Ordering::Relaxed);

        self.task_sender
            .try_send(QueuedTask { task, cancelled })
            .map_err(|e| {
                self.in_flight.fetch_sub(1, Ordering::Relaxed);
                let queued = e.into_inner();
                self.active_tasks.remove(&queued.task.coord);
                queued.task
            })
    }

    /// Cancel a queued or running tile. Finished tiles are unaffected.
    pub fn cancel(&self, coord: &TileCoord) {
        if let Some((_, cancelled)) = self.active_tasks.remove(coord) {
            cancelled.store(true, Ordering::Relaxed);
        }
    }

    /// Take every finished tile without blocking.
    pub fn drain_results(&self) -> Vec<GeneratedTile> {
        let mut results = Vec::new();
        while let Ok(tile) = self.result_receiver.try_recv() {
            self.active_tasks.remove(&tile.coord);
            results.push(tile);
        }
        results
    }

    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn is_pending(&self, coord: &TileCoord) -> bool {
        self.active_tasks.contains_key(coord)
    }
}

/// Build one tile on the calling thread.
pub fn generate_tile_sync(task: &TileTask) -> GeneratedTile {
    let start = Instant::now();
    let recipe = &task.recipe;
    let center = task.coord.center(recipe.tile_step);
    let height_map = build_height_map(&recipe.height, center, recipe.resolution, task.preview);
    let world = classify(&height_map.values, &recipe.bands, &recipe.classifier);
    let generation_time_us = start.elapsed().as_micros() as u64;

    debug!(
        x = task.coord.x,
        y = task.coord.y,
        resolution = recipe.resolution,
        generation_time_us,
        "Generated tile"
    );

    GeneratedTile {
        coord: task.coord,
        height_map,
        world,
        generation_time_us,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::noise_field::NoiseSettings;
    use crate::world::default_surface_bands;

    fn recipe() -> Arc<TileRecipe> {
        let bands = SurfaceTable::from_bands(default_surface_bands()).unwrap();
        let height = HeightMapSettings {
            noise: NoiseSettings {
                octaves: 3,
                ..Default::default()
            },
            ..Default::default()
        };
        let classifier = ClassifierParams::from_bands(&bands, height.max_height()).unwrap();
        Arc::new(TileRecipe {
            height,
            bands,
            classifier,
            resolution: 17,
            tile_step: 16.0,
        })
    }

    fn task(x: i32, y: i32, recipe: &Arc<TileRecipe>) -> TileTask {
        TileTask {
            coord: TileCoord::new(x, y),
            recipe: Arc::clone(recipe),
            preview: false,
        }
    }

    fn collect(generator: &TileGenerator, expected: usize) -> Vec<GeneratedTile> {
        let mut results = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(30);
        while results.len() < expected && Instant::now() < deadline {
            results.extend(generator.drain_results());
            std::thread::sleep(Duration::from_millis(5));
        }
        results
    }

    #[test]
    fn test_sync_generation_is_deterministic() {
        let recipe = recipe();
        let a = generate_tile_sync(&task(2, -1, &recipe));
        let b = generate_tile_sync(&task(2, -1, &recipe));
        assert_eq!(a.height_map, b.height_map);
        assert_eq!(a.world, b.world);
    }

    #[test]
    fn test_concurrent_generation_matches_sync() {
        let recipe = recipe();
        let generator = TileGenerator::new(4, 32, 64).unwrap();

        let mut submitted = 0;
        for x in -2..2 {
            for y in -2..2 {
                if generator.submit(task(x, y, &recipe)).is_ok() {
                    submitted += 1;
                }
            }
        }

        let results = collect(&generator, submitted);
        assert_eq!(results.len(), submitted, "got {}/{submitted} tiles", results.len());
        for tile in results {
            let expected = generate_tile_sync(&task(tile.coord.x, tile.coord.y, &recipe));
            assert_eq!(
                tile.height_map, expected.height_map,
                "worker output differs from sync output at {:?}",
                tile.coord
            );
        }
    }

    #[test]
    fn test_cancel_clears_pending() {
        let recipe = recipe();
        let generator = TileGenerator::new(1, 8, 16).unwrap();
        let coord = TileCoord::new(9, 9);
        generator.submit(task(9, 9, &recipe)).unwrap();
        assert!(generator.is_pending(&coord));
        generator.cancel(&coord);
        assert!(!generator.is_pending(&coord));

        // The task may already have finished before the flag was set.
        let deadline = Instant::now() + Duration::from_secs(10);
        while generator.in_flight_count() > 0 && Instant::now() < deadline {
            let _ = generator.drain_results();
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(generator.in_flight_count(), 0);
    }

    #[test]
    fn test_tile_center() {
        assert_eq!(TileCoord::new(2, -3).center(10.0), Vec2::new(20.0, -30.0));
    }
}
