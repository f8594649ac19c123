//! Fixed-size grids of per-cell terrain values.
//!
//! Every grid is stored flat in row-major order and addressed as `[x, y]`
//! (plus `layer` for [`LayeredField`]), where `x` runs along the width and
//! `y` along the length.

/// A 2D grid of `f32` values (elevation, temperature, moisture, falloff, ...).
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarField {
    width: usize,
    length: usize,
    values: Vec<f32>,
}

impl ScalarField {
    /// Create a zero-filled field.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `length` is zero.
    pub fn new(width: usize, length: usize) -> Self {
        Self::filled(width, length, 0.0)
    }

    /// Create a field with every cell set to `value`.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `length` is zero.
    pub fn filled(width: usize, length: usize, value: f32) -> Self {
        assert!(
            width > 0 && length > 0,
            "field dimensions must be positive, got {width}x{length}"
        );
        Self {
            width,
            length,
            values: vec![value; width * length],
        }
    }

    /// Create a field by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: usize, length: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut field = Self::new(width, length);
        for y in 0..length {
            for x in 0..width {
                field.values[y * width + x] = f(x, y);
            }
        }
        field
    }

    /// Wrap an existing row-major buffer.
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != width * length` or either dimension is zero.
    pub fn from_vec(width: usize, length: usize, values: Vec<f32>) -> Self {
        assert!(
            width > 0 && length > 0,
            "field dimensions must be positive, got {width}x{length}"
        );
        assert_eq!(
            values.len(),
            width * length,
            "buffer of {} values does not match {width}x{length}",
            values.len()
        );
        Self {
            width,
            length,
            values,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Returns `(width, length)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.length)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        let idx = self.index(x, y);
        self.values[idx] = value;
    }

    /// Row-major cell values.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }

    pub fn into_values(self) -> Vec<f32> {
        self.values
    }

    /// Smallest and largest cell value.
    pub fn min_max(&self) -> (f32, f32) {
        self.values
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    /// Copy the `width x length` window whose first cell is `(x0, y0)`.
    ///
    /// # Panics
    ///
    /// Panics if the window does not fit inside the field.
    pub fn crop(&self, x0: usize, y0: usize, width: usize, length: usize) -> Self {
        assert!(
            x0 + width <= self.width && y0 + length <= self.length,
            "crop {width}x{length} at ({x0}, {y0}) exceeds {}x{} field",
            self.width,
            self.length
        );
        Self::from_fn(width, length, |x, y| self.get(x0 + x, y0 + y))
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            x < self.width && y < self.length,
            "({x}, {y}) outside {}x{} field",
            self.width,
            self.length
        );
        y * self.width + x
    }
}

/// A stack of co-indexed 2D layers, addressed as `[x, y, layer]`.
///
/// Used for per-surface blend weights where every cell carries one value per
/// surface class.
#[derive(Clone, Debug, PartialEq)]
pub struct LayeredField {
    width: usize,
    length: usize,
    depth: usize,
    values: Vec<f32>,
}

impl LayeredField {
    /// Create a zero-filled layered field.
    ///
    /// # Panics
    ///
    /// Panics if any dimension is zero.
    pub fn new(width: usize, length: usize, depth: usize) -> Self {
        assert!(
            width > 0 && length > 0 && depth > 0,
            "layered field dimensions must be positive, got {width}x{length}x{depth}"
        );
        Self {
            width,
            length,
            depth,
            values: vec![0.0; width * length * depth],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of layers per cell.
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, layer: usize) -> f32 {
        self.values[self.index(x, y, layer)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, layer: usize, value: f32) {
        let idx = self.index(x, y, layer);
        self.values[idx] = value;
    }

    /// All layer values of one cell.
    pub fn cell(&self, x: usize, y: usize) -> &[f32] {
        let start = self.index(x, y, 0);
        &self.values[start..start + self.depth]
    }

    /// Copy one layer out as a standalone [`ScalarField`].
    pub fn layer(&self, layer: usize) -> ScalarField {
        assert!(layer < self.depth, "layer {layer} out of {}", self.depth);
        ScalarField::from_fn(self.width, self.length, |x, y| self.get(x, y, layer))
    }

    /// Overwrite one layer from a field of matching dimensions.
    pub fn set_layer(&mut self, layer: usize, field: &ScalarField) {
        assert_eq!(
            field.dimensions(),
            (self.width, self.length),
            "layer dimensions do not match"
        );
        for y in 0..self.length {
            for x in 0..self.width {
                self.set(x, y, layer, field.get(x, y));
            }
        }
    }

    #[inline]
    fn index(&self, x: usize, y: usize, layer: usize) -> usize {
        debug_assert!(x < self.width && y < self.length && layer < self.depth);
        (y * self.width + x) * self.depth + layer
    }
}

/// A 2D grid of surface-class indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassField {
    width: usize,
    length: usize,
    values: Vec<usize>,
}

impl ClassField {
    pub fn new(width: usize, length: usize) -> Self {
        assert!(
            width > 0 && length > 0,
            "field dimensions must be positive, got {width}x{length}"
        );
        Self {
            width,
            length,
            values: vec![0; width * length],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn length(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> usize {
        self.values[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, class: usize) {
        self.values[y * self.width + x] = class;
    }

    pub fn values(&self) -> &[usize] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_layout() {
        let field = ScalarField::from_fn(3, 2, |x, y| (y * 10 + x) as f32);
        assert_eq!(field.values(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        assert_eq!(field.get(2, 1), 12.0);
    }

    #[test]
    fn test_min_max() {
        let field = ScalarField::from_vec(2, 2, vec![3.0, -1.0, 7.5, 0.0]);
        assert_eq!(field.min_max(), (-1.0, 7.5));
    }

    #[test]
    fn test_crop_window() {
        let field = ScalarField::from_fn(4, 3, |x, y| (y * 10 + x) as f32);
        let window = field.crop(1, 1, 2, 2);
        assert_eq!(window.values(), &[11.0, 12.0, 21.0, 22.0]);
    }

    #[test]
    #[should_panic(expected = "exceeds")]
    fn test_crop_out_of_bounds() {
        let _ = ScalarField::new(4, 4).crop(3, 0, 2, 2);
    }

    #[test]
    #[should_panic(expected = "dimensions must be positive")]
    fn test_zero_dimension_rejected() {
        let _ = ScalarField::new(0, 4);
    }

    #[test]
    #[should_panic(expected = "does not match")]
    fn test_from_vec_length_mismatch() {
        let _ = ScalarField::from_vec(2, 2, vec![0.0; 3]);
    }

    #[test]
    fn test_layered_cell_and_layer_views() {
        let mut field = LayeredField::new(2, 2, 3);
        field.set(1, 0, 2, 5.0);
        assert_eq!(field.cell(1, 0), &[0.0, 0.0, 5.0]);

        let layer = field.layer(2);
        assert_eq!(layer.get(1, 0), 5.0);
        assert_eq!(layer.get(0, 0), 0.0);

        let mut other = LayeredField::new(2, 2, 3);
        other.set_layer(2, &layer);
        assert_eq!(other, field);
    }
}
