//! Seeded grids of random values, sampled by world position with wrap-around.
//!
//! Scatter placement uses these to gate density and vary tint without drawing
//! from a generator per point, so the same world position always yields the
//! same value regardless of which tile asks.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::field::ScalarField;
use crate::noise_field::{NoiseSettings, NormalizeMode, sample_noise_field};

/// Configuration for a [`HashGrid`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashGridSettings {
    pub seed: i32,
    /// Cells per side; sampling wraps at this period.
    pub resolution: usize,
    /// World-to-cell scale applied before wrapping.
    pub scale: f32,
}

impl Default for HashGridSettings {
    fn default() -> Self {
        Self {
            seed: 6754,
            resolution: 256,
            scale: 1.0,
        }
    }
}

/// Four co-indexed random grids of the same resolution.
#[derive(Clone, Debug)]
pub struct HashGrid {
    resolution: usize,
    scale: f32,
    boolean: Vec<bool>,
    absolute: ScalarField,
    signed: ScalarField,
    coherent: ScalarField,
}

impl HashGrid {
    /// # Panics
    ///
    /// Panics if `resolution` is zero.
    pub fn new(seed: i32, resolution: usize, scale: f32) -> Self {
        assert!(resolution > 0, "hash grid resolution must be positive");
        let mut rng = ChaCha8Rng::seed_from_u64(seed as i64 as u64);
        let cells = resolution * resolution;

        let boolean = (0..cells).map(|_| rng.random_bool(0.5)).collect();
        let absolute = ScalarField::from_fn(resolution, resolution, |_, _| rng.random::<f32>());
        let signed = ScalarField::from_fn(resolution, resolution, |_, _| {
            rng.random_range(-1.0_f32..1.0)
        });

        let coherent_settings = NoiseSettings {
            normalize_mode: NormalizeMode::Local,
            seed,
            octaves: 4,
            scale: (resolution as f32 / 8.0).max(1.0),
            ..Default::default()
        };
        let coherent =
            sample_noise_field(&coherent_settings, Vec2::ZERO, resolution, resolution, false);

        Self {
            resolution,
            scale,
            boolean,
            absolute,
            signed,
            coherent,
        }
    }

    pub fn from_settings(settings: &HashGridSettings) -> Self {
        Self::new(settings.seed, settings.resolution, settings.scale)
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Wrapped cell for a world position; only `x` and `z` are used.
    #[inline]
    fn cell(&self, position: Vec3) -> (usize, usize) {
        let res = self.resolution as i64;
        let wrap = |v: f32| ((v * self.scale) as i64).rem_euclid(res) as usize;
        (wrap(position.x), wrap(position.z))
    }

    /// A fair coin per cell.
    pub fn boolean(&self, position: Vec3) -> bool {
        let (x, z) = self.cell(position);
        self.boolean[z * self.resolution + x]
    }

    /// Uniform value in `[0, 1)`.
    pub fn absolute(&self, position: Vec3) -> f32 {
        let (x, z) = self.cell(position);
        self.absolute.get(x, z)
    }

    /// Uniform value in `[-1, 1)`.
    pub fn signed(&self, position: Vec3) -> f32 {
        let (x, z) = self.cell(position);
        self.signed.get(x, z)
    }

    /// Spatially coherent value in `[0, 1]`.
    pub fn coherent(&self, position: Vec3) -> f32 {
        let (x, z) = self.cell(position);
        self.coherent.get(x, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_grid() {
        let a = HashGrid::new(7, 32, 1.0);
        let b = HashGrid::new(7, 32, 1.0);
        for i in 0..32 {
            let p = Vec3::new(i as f32 * 3.1, 0.0, i as f32 * 1.7);
            assert_eq!(a.absolute(p), b.absolute(p));
            assert_eq!(a.signed(p), b.signed(p));
            assert_eq!(a.boolean(p), b.boolean(p));
            assert_eq!(a.coherent(p), b.coherent(p));
        }
    }

    #[test]
    fn test_wraps_at_resolution() {
        let grid = HashGrid::new(3, 16, 1.0);
        let p = Vec3::new(5.0, 100.0, 9.0);
        let wrapped = Vec3::new(5.0 + 16.0, -3.0, 9.0 - 32.0);
        assert_eq!(grid.absolute(p), grid.absolute(wrapped));
        assert_eq!(grid.signed(p), grid.signed(wrapped));
    }

    #[test]
    fn test_negative_positions_stay_in_range() {
        let grid = HashGrid::new(11, 8, 2.0);
        for i in -40..40 {
            let p = Vec3::new(i as f32 * 0.7, 0.0, -(i as f32) * 1.3);
            let a = grid.absolute(p);
            let s = grid.signed(p);
            let c = grid.coherent(p);
            assert!((0.0..1.0).contains(&a), "absolute {a} out of range");
            assert!((-1.0..1.0).contains(&s), "signed {s} out of range");
            assert!((0.0..=1.0).contains(&c), "coherent {c} out of range");
        }
    }

    #[test]
    fn test_signed_covers_negative_values() {
        let grid = HashGrid::new(5, 16, 1.0);
        let negatives = (0..16)
            .flat_map(|x| (0..16).map(move |z| (x, z)))
            .filter(|&(x, z)| grid.signed(Vec3::new(x as f32, 0.0, z as f32)) < 0.0)
            .count();
        assert!(negatives > 0, "signed grid never went negative");
    }
}
