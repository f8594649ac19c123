//! Elevation to temperature, moisture and blended surface weights.

use std::time::Instant;

use tracing::debug;

use crate::error::ClassifyError;
use crate::field::{ClassField, LayeredField, ScalarField};
use crate::remap::{map, map_to_center};
use crate::smoothing::smooth_layers;

use super::band::{GrowthBands, SurfaceTable};

/// Growth and sea-level heights come from the first four bands.
pub const MIN_SURFACE_BANDS: usize = 4;

/// Kernel radii applied in sequence to the one-hot weight layers.
pub const WEIGHT_SMOOTHING_RADII: [usize; 3] = [0, 1, 2];

/// Temperature at the edges of the growth band.
const TEMPERATURE_COOL: f32 = 0.25;
/// Temperature at sea level.
const TEMPERATURE_WARM: f32 = 0.75;
/// Moisture at the lower edge of the growth band.
const MOISTURE_GROWTH: f32 = 0.75;

/// Inputs to [`classify`] besides the elevation grid and the band table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassifierParams {
    /// Heights are divided by this to normalize elevation into `[0, 1]`.
    pub max_global_height: f32,
    pub growth: GrowthBands,
}

impl ClassifierParams {
    /// Derive growth bands from `table`.
    pub fn from_bands(table: &SurfaceTable, max_global_height: f32) -> Result<Self, ClassifyError> {
        if !(max_global_height > 0.0) {
            return Err(ClassifyError::InvalidMaxHeight(max_global_height));
        }
        Ok(Self {
            max_global_height,
            growth: GrowthBands::from_surface_bands(table)?,
        })
    }
}

/// Co-indexed per-cell layers describing one tile.
///
/// `surface` and `weights` are absent when the data was decoded from a packed
/// preview image.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldData {
    /// Elevation normalized by the global maximum height.
    pub elevation: ScalarField,
    pub temperature: ScalarField,
    pub moisture: ScalarField,
    pub surface: Option<ClassField>,
    /// One layer per surface band. One-hot and then blurred, so a cell's
    /// weights need not sum to exactly 1.
    pub weights: Option<LayeredField>,
}

impl WorldData {
    pub fn width(&self) -> usize {
        self.elevation.width()
    }

    pub fn length(&self) -> usize {
        self.elevation.length()
    }
}

fn temperature_at(e: f32, growth: &GrowthBands) -> f32 {
    if e >= growth.max_growth {
        map(e, growth.max_growth, 1.0, TEMPERATURE_COOL, 0.0)
    } else if e <= growth.min_growth {
        map(e, 0.0, growth.min_growth, 0.0, TEMPERATURE_COOL)
    } else {
        map_to_center(
            e,
            growth.sea_level,
            growth.min_growth,
            growth.max_growth,
            TEMPERATURE_COOL,
            TEMPERATURE_WARM,
        )
    }
}

fn moisture_at(e: f32, growth: &GrowthBands) -> f32 {
    if e >= growth.max_growth {
        0.0
    } else if e <= growth.sea_level {
        1.0
    } else if e < growth.min_growth {
        map(e, growth.sea_level, growth.min_growth, 1.0, MOISTURE_GROWTH)
    } else {
        map(e, growth.min_growth, growth.max_growth, MOISTURE_GROWTH, 0.0)
    }
}

/// Classify every cell of `heights`.
///
/// Cells below every band get class 0 and all-zero weights.
///
/// # Panics
///
/// Panics if `bands` is empty.
pub fn classify(heights: &ScalarField, bands: &SurfaceTable, params: &ClassifierParams) -> WorldData {
    assert!(!bands.is_empty(), "surface table must not be empty");
    let start = Instant::now();
    let (width, length) = heights.dimensions();
    let growth = &params.growth;

    let elevation = ScalarField::from_fn(width, length, |x, y| {
        heights.get(x, y) / params.max_global_height
    });
    let mut temperature = ScalarField::new(width, length);
    let mut moisture = ScalarField::new(width, length);
    let mut surface = ClassField::new(width, length);
    let mut weights = LayeredField::new(width, length, bands.len());

    for y in 0..length {
        for x in 0..width {
            let e = elevation.get(x, y);
            temperature.set(x, y, temperature_at(e, growth));
            moisture.set(x, y, moisture_at(e, growth));
            if let Some(class) = bands.class_at(e) {
                surface.set(x, y, class);
                weights.set(x, y, class, 1.0);
            }
        }
    }

    for radius in WEIGHT_SMOOTHING_RADII {
        weights = smooth_layers(&weights, radius);
    }

    debug!(
        width,
        length,
        classes = bands.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "Classified world data"
    );

    WorldData {
        elevation,
        temperature,
        moisture,
        surface: Some(surface),
        weights: Some(weights),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::default_surface_bands;

    fn table() -> SurfaceTable {
        SurfaceTable::from_bands(default_surface_bands()).unwrap()
    }

    fn params(max: f32) -> ClassifierParams {
        ClassifierParams::from_bands(&table(), max).unwrap()
    }

    #[test]
    fn test_flat_sea_level_is_wet_shallow_water() {
        let params = params(1.0);
        let heights = ScalarField::filled(8, 8, params.growth.sea_level);
        let world = classify(&heights, &table(), &params);

        assert!(world.moisture.values().iter().all(|&m| m == 1.0));
        let surface = world.surface.expect("classify fills the surface layer");
        let shallow = table().lookup_by_name("shallow_water").unwrap();
        assert!(
            surface.values().iter().all(|&c| c == shallow),
            "sea level should classify as the band just below it"
        );
    }

    #[test]
    fn test_elevation_normalized_by_global_max() {
        let heights = ScalarField::filled(4, 4, 25.0);
        let world = classify(&heights, &table(), &params(100.0));
        assert!(world.elevation.values().iter().all(|&e| (e - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_climate_ranges() {
        let heights = ScalarField::from_fn(64, 1, |x, _| x as f32 / 63.0);
        let world = classify(&heights, &table(), &params(1.0));
        for x in 0..64 {
            let t = world.temperature.get(x, 0);
            let m = world.moisture.get(x, 0);
            assert!((0.0..=1.0).contains(&t), "temperature {t} out of range at {x}");
            assert!((0.0..=1.0).contains(&m), "moisture {m} out of range at {x}");
        }
        assert_eq!(world.temperature.get(63, 0), 0.0, "peaks are coldest");
        assert_eq!(world.moisture.get(63, 0), 0.0, "peaks are driest");
        assert_eq!(world.moisture.get(0, 0), 1.0, "sea floor is wettest");
    }

    #[test]
    fn test_temperature_pivots() {
        let growth = params(1.0).growth;
        assert!((temperature_at(growth.min_growth, &growth) - TEMPERATURE_COOL).abs() < 1e-6);
        assert!((temperature_at(growth.max_growth, &growth) - TEMPERATURE_COOL).abs() < 1e-6);
        assert_eq!(temperature_at(0.0, &growth), 0.0);
    }

    #[test]
    fn test_weights_blend_at_boundary() {
        // Left half grass, right half rock.
        let heights = ScalarField::from_fn(16, 4, |x, _| if x < 8 { 0.5 } else { 0.8 });
        let world = classify(&heights, &table(), &params(1.0));
        let weights = world.weights.unwrap();
        let grass = 2;
        let rock = 3;

        assert_eq!(weights.get(0, 0, grass), 1.0);
        assert_eq!(weights.get(15, 0, rock), 1.0);
        let g = weights.get(7, 2, grass);
        let r = weights.get(7, 2, rock);
        assert!(g > 0.0 && g < 1.0, "grass weight {g} should be blended");
        assert!(r > 0.0 && r < 1.0, "rock weight {r} should be blended");
        assert!((g + r - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_below_every_band_has_zero_weights() {
        let table = SurfaceTable::from_bands(vec![
            crate::world::SurfaceBand::new("a", 0.2, [0; 4]),
            crate::world::SurfaceBand::new("b", 0.4, [0; 4]),
            crate::world::SurfaceBand::new("c", 0.6, [0; 4]),
            crate::world::SurfaceBand::new("d", 0.8, [0; 4]),
        ])
        .unwrap();
        let params = ClassifierParams::from_bands(&table, 1.0).unwrap();
        let world = classify(&ScalarField::filled(3, 3, 0.1), &table, &params);
        assert!(world.surface.unwrap().values().iter().all(|&c| c == 0));
        let weights = world.weights.unwrap();
        assert!(weights.cell(1, 1).iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_invalid_max_height() {
        assert_eq!(
            ClassifierParams::from_bands(&table(), 0.0),
            Err(ClassifyError::InvalidMaxHeight(0.0))
        );
    }
}
