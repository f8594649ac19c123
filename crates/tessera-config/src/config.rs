//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tessera_mesh::MeshSettings;
use tessera_terrain::{
    ClassifierParams, HashGridSettings, HeightMapSettings, PlantProfile, SurfaceBand,
    SurfaceTable, default_surface_bands,
};

use crate::error::ConfigError;

/// File name used inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Top-level generator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Noise, curve and falloff settings for height maps.
    pub terrain: HeightMapSettings,
    pub mesh: MeshSettings,
    /// Surface bands and climate classification.
    pub world: WorldConfig,
    /// Plant profiles and hash grid for scattering.
    pub scatter: ScatterConfig,
    pub output: OutputConfig,
    pub debug: DebugConfig,
}

/// Surface bands and classification inputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Ordered by starting height; at least four are needed to classify.
    pub bands: Vec<SurfaceBand>,
    /// Height that maps to normalized elevation 1. Derived from the terrain
    /// curve and multiplier when unset.
    pub max_global_height: Option<f32>,
    /// Samples per side of the world-data images.
    pub data_resolution: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            bands: default_surface_bands(),
            max_global_height: None,
            data_resolution: 256,
        }
    }
}

/// Scatter sampling configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScatterConfig {
    pub profiles: Vec<PlantProfile>,
    pub hash: HashGridSettings,
    /// Points per side of each point-cloud grid.
    pub point_resolution: usize,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            profiles: vec![PlantProfile::default()],
            hash: HashGridSettings::default(),
            point_resolution: 64,
        }
    }
}

/// Where and how much to generate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for generated images and meshes.
    pub directory: PathBuf,
    /// Tiles generated in each direction from the origin tile.
    pub tile_radius: u32,
    /// Level of detail of emitted meshes.
    pub lod: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            tile_radius: 1,
            lod: 0,
        }
    }
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Derived values ---

impl Config {
    /// The configured bands as a lookup table.
    pub fn surface_table(&self) -> Result<SurfaceTable, ConfigError> {
        Ok(SurfaceTable::from_bands(self.world.bands.iter().cloned())?)
    }

    /// Explicit max height, or the highest the terrain settings can produce.
    pub fn max_global_height(&self) -> f32 {
        self.world
            .max_global_height
            .unwrap_or_else(|| self.terrain.max_height())
    }

    pub fn classifier_params(&self) -> Result<ClassifierParams, ConfigError> {
        let table = self.surface_table()?;
        Ok(ClassifierParams::from_bands(&table, self.max_global_height())?)
    }

    /// Check every section, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.terrain.validate()?;
        self.mesh.validate()?;
        MeshSettings::check_lod(self.output.lod)?;
        self.classifier_params()?;
        if self.world.data_resolution == 0 {
            return Err(ConfigError::Invalid(
                "world.data_resolution must be at least 1".to_string(),
            ));
        }
        if self.scatter.hash.resolution == 0 {
            return Err(ConfigError::Invalid(
                "scatter.hash.resolution must be at least 1".to_string(),
            ));
        }
        for profile in &self.scatter.profiles {
            if !(0.0..=1.0).contains(&profile.density) {
                return Err(ConfigError::Invalid(format!(
                    "profile '{}' density {} outside 0..=1",
                    profile.name, profile.density
                )));
            }
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Default config directory under the platform config dir.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("tessera"))
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
