//! Surface bands and the growth/sea-level reference heights derived from them.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{ClassifyError, SurfaceTableError};
use crate::remap::lerp;
use crate::scatter::Habitat;

use super::classifier::MIN_SURFACE_BANDS;

/// Clearance below sea level that marine and aquatic habitats respect.
const SEA_LEVEL_CLEARANCE: f32 = 0.002;

/// One surface class, active from `starting_height` up to the next band.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceBand {
    /// Unique name (e.g. "shallow_water").
    pub name: String,
    /// Normalized elevation in `[0, 1]` where this band begins.
    pub starting_height: f32,
    /// RGBA color used by preview renders.
    pub color: [u8; 4],
}

impl SurfaceBand {
    pub fn new(name: impl Into<String>, starting_height: f32, color: [u8; 4]) -> Self {
        Self {
            name: name.into(),
            starting_height,
            color,
        }
    }
}

/// The stock five-band table: two water bands, grass, rock and snow.
pub fn default_surface_bands() -> Vec<SurfaceBand> {
    vec![
        SurfaceBand::new("deep_water", 0.0, [24, 54, 140, 255]),
        SurfaceBand::new("shallow_water", 0.15, [54, 103, 199, 255]),
        SurfaceBand::new("grass", 0.3, [86, 152, 23, 255]),
        SurfaceBand::new("rock", 0.75, [98, 84, 70, 255]),
        SurfaceBand::new("snow", 0.9, [245, 245, 250, 255]),
    ]
}

/// Ordered surface bands with name lookup.
#[derive(Clone, Debug, Default)]
pub struct SurfaceTable {
    bands: Vec<SurfaceBand>,
    name_to_index: HashMap<String, usize>,
}

impl SurfaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from bands listed lowest first.
    pub fn from_bands(bands: impl IntoIterator<Item = SurfaceBand>) -> Result<Self, SurfaceTableError> {
        let mut table = Self::new();
        for band in bands {
            table.register(band)?;
        }
        Ok(table)
    }

    /// Append a band above the current topmost one, returning its class index.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceTableError::DuplicateName`] for a repeated name and
    /// [`SurfaceTableError::OutOfOrder`] if the band starts below the previous one.
    pub fn register(&mut self, band: SurfaceBand) -> Result<usize, SurfaceTableError> {
        if self.name_to_index.contains_key(&band.name) {
            return Err(SurfaceTableError::DuplicateName(band.name));
        }
        if let Some(previous) = self.bands.last() {
            if band.starting_height < previous.starting_height {
                return Err(SurfaceTableError::OutOfOrder {
                    name: band.name,
                    start: band.starting_height,
                    previous: previous.starting_height,
                });
            }
        }
        let index = self.bands.len();
        self.name_to_index.insert(band.name.clone(), index);
        self.bands.push(band);
        Ok(index)
    }

    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn get(&self, index: usize) -> &SurfaceBand {
        &self.bands[index]
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    pub fn bands(&self) -> &[SurfaceBand] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Class index of the last band starting at or below `elevation`.
    pub fn class_at(&self, elevation: f32) -> Option<usize> {
        self.bands
            .iter()
            .rposition(|band| band.starting_height <= elevation)
    }
}

/// Normalized reference heights used for climate and habitat decisions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrowthBands {
    pub min_growth: f32,
    pub max_growth: f32,
    pub sea_level: f32,
}

impl GrowthBands {
    /// Derive the reference heights from the third and fourth bands.
    ///
    /// Sea level sits 90% of the way from the second band to the third.
    pub fn from_surface_bands(table: &SurfaceTable) -> Result<Self, ClassifyError> {
        if table.len() < MIN_SURFACE_BANDS {
            return Err(ClassifyError::TooFewBands {
                required: MIN_SURFACE_BANDS,
                actual: table.len(),
            });
        }
        let start = |i: usize| table.get(i).starting_height;
        Ok(Self {
            min_growth: start(2),
            max_growth: start(3),
            sea_level: lerp(start(1), start(2), 0.9),
        })
    }

    /// Whether a plant with `habitat` may grow at normalized `elevation`.
    ///
    /// `margin` is the clearance from the growth limits, already divided by
    /// the global maximum height.
    pub fn habitat_allows(&self, habitat: Habitat, elevation: f32, margin: f32) -> bool {
        match habitat {
            Habitat::Terrestrial => {
                elevation >= self.min_growth + margin && elevation <= self.max_growth - margin
            }
            Habitat::Marine => {
                elevation <= self.min_growth + margin
                    && elevation >= self.sea_level - SEA_LEVEL_CLEARANCE
            }
            Habitat::Aquatic => elevation <= self.sea_level - SEA_LEVEL_CLEARANCE,
        }
    }
}
