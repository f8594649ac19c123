//! Command-line argument parsing for the Tessera generator.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Tessera command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "tessera", about = "Procedural terrain tile generator")]
pub struct CliArgs {
    /// Noise seed.
    #[arg(long, allow_negative_numbers = true)]
    pub seed: Option<i32>,

    /// Samples per side of the world-data images.
    #[arg(long)]
    pub resolution: Option<usize>,

    /// Mesh level of detail (0-4).
    #[arg(long)]
    pub lod: Option<usize>,

    /// Emit flat-shaded meshes.
    #[arg(long)]
    pub flat_shading: bool,

    /// Tiles generated in each direction from the origin.
    #[arg(long)]
    pub tiles: Option<u32>,

    /// Output directory for images and meshes.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.terrain.noise.seed = seed;
            self.scatter.hash.seed = seed;
        }
        if let Some(resolution) = args.resolution {
            self.world.data_resolution = resolution;
        }
        if let Some(lod) = args.lod {
            self.output.lod = lod;
        }
        if args.flat_shading {
            self.mesh.flat_shading = true;
        }
        if let Some(tiles) = args.tiles {
            self.output.tile_radius = tiles;
        }
        if let Some(ref dir) = args.output {
            self.output.directory = dir.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
