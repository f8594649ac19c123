//! Scalar range remapping helpers shared by the generators.

/// Ranges narrower than this are treated as degenerate.
pub const RANGE_EPSILON: f32 = 1e-6;

/// Linearly map `value` from `[from_min, from_max]` to `[to_min, to_max]`.
///
/// The result is not clamped. A degenerate source range maps everything to `to_min`.
#[inline]
pub fn map(value: f32, from_min: f32, from_max: f32, to_min: f32, to_max: f32) -> f32 {
    let span = from_max - from_min;
    if span.abs() < RANGE_EPSILON {
        return to_min;
    }
    (value - from_min) * (to_max - to_min) / span + to_min
}

/// Map `value` around a pivot.
///
/// Values in `[from_min, center)` go to `[to_min, to_max]`. Values in
/// `[center, from_max]` fold back from `to_max` down to `to_min`. The output
/// peaks at the pivot and falls off on both sides with independent slopes.
#[inline]
pub fn map_to_center(
    value: f32,
    center: f32,
    from_min: f32,
    from_max: f32,
    to_min: f32,
    to_max: f32,
) -> f32 {
    if value >= center {
        map(value, center, from_max, to_max, to_min)
    } else {
        map(value, from_min, center, to_min, to_max)
    }
}

/// Position of `value` within `[a, b]`, clamped to `[0, 1]`.
///
/// Returns 0 when `a == b`.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() < RANGE_EPSILON {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_endpoints() {
        assert_eq!(map(0.0, 0.0, 1.0, 10.0, 20.0), 10.0);
        assert_eq!(map(1.0, 0.0, 1.0, 10.0, 20.0), 20.0);
        assert_eq!(map(-1.0, -1.0, 1.0, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_map_is_unclamped() {
        assert_eq!(map(2.0, 0.0, 1.0, 0.0, 1.0), 2.0);
    }

    #[test]
    fn test_map_degenerate_range() {
        assert_eq!(map(5.0, 3.0, 3.0, 0.25, 0.75), 0.25);
    }

    #[test]
    fn test_map_to_center_peaks_at_pivot() {
        let peak = map_to_center(0.5, 0.5, 0.2, 0.9, 0.25, 0.75);
        assert!((peak - 0.75).abs() < 1e-6);

        let low = map_to_center(0.2, 0.5, 0.2, 0.9, 0.25, 0.75);
        let high = map_to_center(0.9, 0.5, 0.2, 0.9, 0.25, 0.75);
        assert!((low - 0.25).abs() < 1e-6);
        assert!((high - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_inverse_lerp_clamps() {
        assert_eq!(inverse_lerp(0.0, 2.0, 1.0), 0.5);
        assert_eq!(inverse_lerp(0.0, 2.0, 5.0), 1.0);
        assert_eq!(inverse_lerp(0.0, 2.0, -5.0), 0.0);
        assert_eq!(inverse_lerp(1.0, 1.0, 1.0), 0.0);
    }
}
