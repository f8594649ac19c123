//! Square radial falloff mask used to carve island and crater shapes.

use crate::field::ScalarField;

/// Steepness of the falloff transition.
pub const FALLOFF_STEEPNESS: f32 = 3.0;
/// Shift of the transition toward the tile edge.
pub const FALLOFF_SHIFT: f32 = 2.2;

/// Ease `t` in `[0, 1]` so the center stays near 0 and the edge approaches 1.
#[inline]
pub fn falloff_curve(t: f32) -> f32 {
    let a = FALLOFF_STEEPNESS;
    let b = FALLOFF_SHIFT;
    let num = libm::powf(t, a);
    let den = num + libm::powf(b - b * t, a);
    if den <= 0.0 { 0.0 } else { num / den }
}

/// Build a `resolution x resolution` mask of Chebyshev distance from the center.
///
/// # Panics
///
/// Panics if `resolution` is zero.
pub fn falloff_field(resolution: usize) -> ScalarField {
    assert!(resolution > 0, "falloff resolution must be positive");
    let res = resolution as f32;
    ScalarField::from_fn(resolution, resolution, |x, y| {
        let fx = x as f32 / res * 2.0 - 1.0;
        let fy = y as f32 / res * 2.0 - 1.0;
        falloff_curve(fx.abs().max(fy.abs()))
    })
}
