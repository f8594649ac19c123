//! Monotonic remap curve applied to normalized height samples.
//!
//! The curve is an immutable list of keys evaluated by piecewise-linear
//! interpolation. Evaluation is a pure function of the keys, so one curve can
//! be shared freely between generation threads.

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// A single `(time, value)` control point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
}

impl CurveKey {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Sampled monotonic curve. Inputs outside the key range clamp to the end values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CurveKey>", into = "Vec<CurveKey>")]
pub struct RemapCurve {
    keys: Vec<CurveKey>,
}

impl RemapCurve {
    /// Build a curve from keys.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::EmptyCurve`] for an empty key list and
    /// [`SettingsError::NonMonotonicCurve`] if times are not strictly
    /// increasing or values decrease.
    pub fn new(keys: Vec<CurveKey>) -> Result<Self, SettingsError> {
        if keys.is_empty() {
            return Err(SettingsError::EmptyCurve);
        }
        for (i, pair) in keys.windows(2).enumerate() {
            if pair[1].time <= pair[0].time || pair[1].value < pair[0].value {
                return Err(SettingsError::NonMonotonicCurve(i + 1));
            }
        }
        Ok(Self { keys })
    }

    /// The identity curve on `[0, 1]`.
    pub fn linear() -> Self {
        Self {
            keys: vec![CurveKey::new(0.0, 0.0), CurveKey::new(1.0, 1.0)],
        }
    }

    /// Sample a monotonic function at `samples` evenly spaced points on `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Fails if `f` is not monotonic over the sampled points.
    pub fn sampled(samples: usize, f: impl Fn(f32) -> f32) -> Result<Self, SettingsError> {
        let samples = samples.max(2);
        let keys = (0..samples)
            .map(|i| {
                let t = i as f32 / (samples - 1) as f32;
                CurveKey::new(t, f(t))
            })
            .collect();
        Self::new(keys)
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Evaluate the curve at `t`.
    pub fn evaluate(&self, t: f32) -> f32 {
        let first = self.keys[0];
        let last = self.keys[self.keys.len() - 1];
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // First key with time > t; t lies strictly inside the key range here.
        let upper = self.keys.partition_point(|k| k.time <= t);
        let a = self.keys[upper - 1];
        let b = self.keys[upper];
        let s = (t - a.time) / (b.time - a.time);
        a.value + (b.value - a.value) * s
    }
}

impl Default for RemapCurve {
    fn default() -> Self {
        Self::linear()
    }
}

impl TryFrom<Vec<CurveKey>> for RemapCurve {
    type Error = SettingsError;

    fn try_from(keys: Vec<CurveKey>) -> Result<Self, Self::Error> {
        Self::new(keys)
    }
}

impl From<RemapCurve> for Vec<CurveKey> {
    fn from(curve: RemapCurve) -> Self {
        curve.keys
    }
}
