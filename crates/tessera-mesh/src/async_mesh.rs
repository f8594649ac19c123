//! Asynchronous meshing pipeline: builds tile meshes on a thread pool and
//! delivers them through a channel.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use tessera_terrain::{ScalarField, TileCoord};
use tracing::error;

use crate::builder::build_mesh;
use crate::mesh_data::MeshData;
use crate::settings::MeshSettings;

/// A self-contained meshing task that can run on any thread.
///
/// Heights and settings are shared read-only, so one height map can be
/// meshed at several levels of detail without copying.
pub struct MeshingTask {
    pub coord: TileCoord,
    pub lod: usize,
    /// Bordered height grid of the tile.
    pub heights: Arc<ScalarField>,
    pub settings: Arc<MeshSettings>,
}

/// The result of a completed meshing task.
pub struct MeshingResult {
    pub coord: TileCoord,
    pub lod: usize,
    pub mesh: MeshData,
}

/// Meshing pipeline backed by a thread pool.
///
/// Callers submit [`MeshingTask`]s and collect [`MeshingResult`]s with
/// [`drain_results`](Self::drain_results) without blocking.
pub struct MeshingPipeline {
    task_sender: Option<crossbeam_channel::Sender<MeshingTask>>,
    result_receiver: crossbeam_channel::Receiver<MeshingResult>,
    worker_handles: Vec<JoinHandle<()>>,
    /// Maximum number of tasks that can be in flight at once.
    budget: usize,
    in_flight: Arc<AtomicUsize>,
}

impl MeshingPipeline {
    /// Spawn `worker_count` threads with room for `budget` in-flight tasks.
    ///
    /// # Errors
    ///
    /// Returns the OS error if a worker thread cannot be spawned.
    pub fn new(worker_count: usize, budget: usize) -> std::io::Result<Self> {
        let (task_tx, task_rx) = crossbeam_channel::bounded::<MeshingTask>(budget);
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(worker_count);
        for index in 0..worker_count {
            let rx = task_rx.clone();
            let tx = result_tx.clone();
            let flight = Arc::clone(&in_flight);

            let handle = std::thread::Builder::new()
                .name(format!("mesh-{index}"))
                .spawn(move || {
                    while let Ok(task) = rx.recv() {
                        let built = catch_unwind(AssertUnwindSafe(|| {
                            build_mesh(&task.heights, &task.settings, task.lod)
                        }));
                        match built {
                            Ok(mesh) => {
                                let _ = tx.send(MeshingResult {
                                    coord: task.coord,
                                    lod: task.lod,
                                    mesh,
                                });
                            }
                            Err(_) => error!(
                                x = task.coord.x,
                                y = task.coord.y,
                                lod = task.lod,
                                "Meshing task panicked, no result"
                            ),
                        }
                        flight.fetch_sub(1, Ordering::Relaxed);
                    }
                })?;
            handles.push(handle);
        }

        Ok(Self {
            task_sender: Some(task_tx),
            result_receiver: result_rx,
            worker_handles: handles,
            budget,
            in_flight,
        })
    }

    /// Submit a meshing task. Returns `false` if the budget is exhausted
    /// or the pipeline has been shut down.
    ///
    /// A task whose build panics is logged and dropped without a result;
    /// it still leaves the in-flight count.
    pub fn submit(&self, task: MeshingTask) -> bool {
        let sender = match &self.task_sender {
            Some(s) => s,
            None => return false,
        };
        if self.in_flight.load(Ordering::Relaxed) >= self.budget {
            return false;
        }
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        if sender.send(task).is_err() {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Take every finished mesh without blocking.
    pub fn drain_results(&self) -> Vec<MeshingResult> {
        let mut results = Vec::new();
        while let Ok(result) = self.result_receiver.try_recv() {
            results.push(result);
        }
        results
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Close the task channel and join every worker.
    pub fn shutdown(&mut self) {
        self.task_sender.take();
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for MeshingPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}
