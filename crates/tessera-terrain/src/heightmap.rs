//! Height map builder: noise, smoothing, falloff, remap curve and multiplier.

use std::time::Instant;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::curve::RemapCurve;
use crate::error::SettingsError;
use crate::falloff::falloff_field;
use crate::field::ScalarField;
use crate::noise_field::{NoiseSettings, sample_noise_field};
use crate::remap::map;
use crate::smoothing::smooth;

/// Kernel radius applied to raw noise and to the falloff mask.
pub const HEIGHT_SMOOTHING_RADIUS: usize = 3;

/// Shape bias applied after smoothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FalloffMode {
    #[default]
    None,
    /// Subtract the mask so the tile sinks toward its edges.
    Island,
    /// Add the mask so the tile rises toward its edges.
    Crater,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightMapSettings {
    pub noise: NoiseSettings,
    pub height_multiplier: f32,
    pub height_curve: RemapCurve,
    pub falloff: FalloffMode,
}

impl Default for HeightMapSettings {
    fn default() -> Self {
        Self {
            noise: NoiseSettings::default(),
            height_multiplier: 30.0,
            height_curve: RemapCurve::linear(),
            falloff: FalloffMode::None,
        }
    }
}

impl HeightMapSettings {
    /// Lowest height the curve and multiplier can produce.
    pub fn min_height(&self) -> f32 {
        self.height_multiplier * self.height_curve.evaluate(0.0)
    }

    /// Highest height the curve and multiplier can produce.
    pub fn max_height(&self) -> f32 {
        self.height_multiplier * self.height_curve.evaluate(1.0)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.noise.validate()
    }
}

/// Elevation samples plus the extrema actually observed in them.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightMap {
    pub values: ScalarField,
    pub min: f32,
    pub max: f32,
}

impl HeightMap {
    /// Wrap a field, computing its observed extrema.
    pub fn from_field(values: ScalarField) -> Self {
        let (min, max) = values.min_max();
        Self { values, min, max }
    }

    pub fn resolution(&self) -> usize {
        self.values.width()
    }
}

/// Build a `resolution x resolution` height map for the tile at `center`.
///
/// Noise is sampled [`HEIGHT_SMOOTHING_RADIUS`] cells past every edge and
/// cropped after smoothing, so edge cells blur over real neighbor samples.
/// In Global and Estimate modes, tiles whose centers differ by
/// `resolution - 3` agree on their shared mesh edge.
///
/// # Panics
///
/// Panics if `resolution` is zero or the noise settings violate the
/// sampler's contract.
pub fn build_height_map(
    settings: &HeightMapSettings,
    center: Vec2,
    resolution: usize,
    preview: bool,
) -> HeightMap {
    let start = Instant::now();
    assert!(resolution > 0, "height map resolution must be positive");
    let padded = resolution + 2 * HEIGHT_SMOOTHING_RADIUS;
    let noise = sample_noise_field(&settings.noise, center, padded, padded, preview);
    let mut values = smooth(&noise, HEIGHT_SMOOTHING_RADIUS).crop(
        HEIGHT_SMOOTHING_RADIUS,
        HEIGHT_SMOOTHING_RADIUS,
        resolution,
        resolution,
    );

    if settings.falloff != FalloffMode::None {
        let mask = smooth(&falloff_field(resolution), HEIGHT_SMOOTHING_RADIUS);
        for (v, &f) in values.values_mut().iter_mut().zip(mask.values()) {
            *v = match settings.falloff {
                FalloffMode::Island => map(*v - f, -1.0, 1.0, 0.0, 1.0),
                FalloffMode::Crater => map(*v + f, 0.0, 2.0, 0.0, 1.0),
                FalloffMode::None => *v,
            };
        }
    }

    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for v in values.values_mut() {
        *v = settings.height_curve.evaluate(*v) * settings.height_multiplier;
        min = min.min(*v);
        max = max.max(*v);
    }

    debug!(
        resolution,
        center_x = center.x,
        center_y = center.y,
        min,
        max,
        elapsed_us = start.elapsed().as_micros() as u64,
        "Built height map"
    );

    HeightMap { values, min, max }
}

/// A height map with every cell at `level`.
pub fn flat_height_map(width: usize, length: usize, level: f32) -> HeightMap {
    HeightMap {
        values: ScalarField::filled(width, length, level),
        min: level,
        max: level,
    }
}
