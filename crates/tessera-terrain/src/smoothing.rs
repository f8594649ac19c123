//! Separable box blur over scalar and layered fields.
//!
//! Both passes use a sliding running sum, so the cost per pass is
//! O(width * length) regardless of the kernel radius. Taps that fall outside
//! the grid are clamped to the nearest edge cell.

use crate::field::{LayeredField, ScalarField};

/// Blur `field` with a `(2r + 1) x (2r + 1)` box kernel.
///
/// `smooth(field, 0)` returns an identical copy.
pub fn smooth(field: &ScalarField, kernel_radius: usize) -> ScalarField {
    let (width, length) = field.dimensions();
    let mut out = vec![0.0; width * length];
    box_blur(width, length, kernel_radius, field.values(), &mut out);
    ScalarField::from_vec(width, length, out)
}

/// Blur every layer of `field` independently with the same kernel.
pub fn smooth_layers(field: &LayeredField, kernel_radius: usize) -> LayeredField {
    let mut out = LayeredField::new(field.width(), field.length(), field.depth());
    for layer in 0..field.depth() {
        let blurred = smooth(&field.layer(layer), kernel_radius);
        out.set_layer(layer, &blurred);
    }
    out
}

#[inline]
fn clamp_tap(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

fn box_blur(width: usize, length: usize, radius: usize, src: &[f32], dst: &mut [f32]) {
    let r = radius as isize;
    let kernel = (2 * radius + 1) as f64;
    let norm = kernel * kernel;

    let mut horizontal = vec![0.0_f64; width * length];
    for y in 0..length {
        let row = &src[y * width..(y + 1) * width];
        let out = &mut horizontal[y * width..(y + 1) * width];

        let mut sum = 0.0_f64;
        for dx in -r..=r {
            sum += row[clamp_tap(dx, width)] as f64;
        }
        out[0] = sum;

        for x in 1..width {
            let remove = clamp_tap(x as isize - r - 1, width);
            let add = clamp_tap(x as isize + r, width);
            sum = sum - row[remove] as f64 + row[add] as f64;
            out[x] = sum;
        }
    }

    for x in 0..width {
        let column = |y: usize| horizontal[y * width + x];

        let mut sum = 0.0_f64;
        for dy in -r..=r {
            sum += column(clamp_tap(dy, length));
        }
        dst[x] = (sum / norm) as f32;

        for y in 1..length {
            let remove = clamp_tap(y as isize - r - 1, length);
            let add = clamp_tap(y as isize + r, length);
            sum = sum - column(remove) + column(add);
            dst[y * width + x] = (sum / norm) as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, length: usize) -> ScalarField {
        ScalarField::from_fn(width, length, |x, y| {
            ((x * 7 + y * 13) % 11) as f32 * 0.37 - 1.5
        })
    }

    fn naive_blur(field: &ScalarField, radius: usize) -> ScalarField {
        let (w, l) = field.dimensions();
        let r = radius as isize;
        let n = ((2 * radius + 1) * (2 * radius + 1)) as f64;
        ScalarField::from_fn(w, l, |x, y| {
            let mut sum = 0.0_f64;
            for dy in -r..=r {
                for dx in -r..=r {
                    let sx = clamp_tap(x as isize + dx, w);
                    let sy = clamp_tap(y as isize + dy, l);
                    sum += field.get(sx, sy) as f64;
                }
            }
            (sum / n) as f32
        })
    }

    #[test]
    fn test_radius_zero_is_identity() {
        let field = ramp(9, 6);
        let smoothed = smooth(&field, 0);
        assert_eq!(smoothed, field, "radius 0 must return the input unchanged");
    }

    #[test]
    fn test_matches_naive_clamped_convolution() {
        let field = ramp(12, 7);
        for radius in 1..=4 {
            let fast = smooth(&field, radius);
            let slow = naive_blur(&field, radius);
            for (a, b) in fast.values().iter().zip(slow.values()) {
                assert!(
                    (a - b).abs() < 1e-5,
                    "running sum diverged from convolution at radius {radius}: {a} vs {b}"
                );
            }
        }
    }

    #[test]
    fn test_output_stays_within_input_bounds() {
        let field = ramp(16, 16);
        let (lo, hi) = field.min_max();
        for radius in [1, 2, 3, 8, 20] {
            let smoothed = smooth(&field, radius);
            for &v in smoothed.values() {
                assert!(
                    v >= lo - 1e-5 && v <= hi + 1e-5,
                    "value {v} escaped [{lo}, {hi}] at radius {radius}"
                );
            }
        }
    }

    #[test]
    fn test_constant_field_unchanged() {
        let field = ScalarField::filled(10, 5, 0.42);
        let smoothed = smooth(&field, 3);
        for &v in smoothed.values() {
            assert!((v - 0.42).abs() < 1e-6, "constant field drifted to {v}");
        }
    }

    #[test]
    fn test_symmetric_input_gives_symmetric_output() {
        // A field symmetric under transpose must stay symmetric; this catches
        // any asymmetry between the horizontal and vertical passes.
        let field = ScalarField::from_fn(8, 8, |x, y| ((x * y) % 5) as f32);
        let smoothed = smooth(&field, 2);
        for y in 0..8 {
            for x in 0..8 {
                assert!(
                    (smoothed.get(x, y) - smoothed.get(y, x)).abs() < 1e-5,
                    "asymmetric result at ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn test_kernel_wider_than_field() {
        let field = ScalarField::from_vec(2, 1, vec![0.0, 1.0]);
        let smoothed = smooth(&field, 5);
        let (lo, hi) = smoothed.min_max();
        assert!(lo >= 0.0 && hi <= 1.0);
    }

    #[test]
    fn test_layers_are_blurred_independently() {
        let mut layered = LayeredField::new(6, 6, 2);
        layered.set(3, 3, 0, 1.0);
        let smoothed = smooth_layers(&layered, 1);

        assert!((smoothed.get(3, 3, 0) - 1.0 / 9.0).abs() < 1e-6);
        assert!((smoothed.get(2, 2, 0) - 1.0 / 9.0).abs() < 1e-6);
        for y in 0..6 {
            for x in 0..6 {
                assert_eq!(smoothed.get(x, y, 1), 0.0, "layer 1 must stay empty");
            }
        }
    }
}
