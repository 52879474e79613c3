//! Grid data field and the value-inversion transform
//!
//! A field is an `xres × yres` grid of doubles stored row by row. The
//! inversion maps every value through `x ↦ min + max − x`, reversing the
//! order of values within the field's own range while preserving the range
//! itself.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("field dimensions {xres}x{yres} do not match {len} data values")]
    DimensionMismatch { xres: usize, yres: usize, len: usize },

    #[error("field dimensions must be nonzero, got {xres}x{yres}")]
    EmptyField { xres: usize, yres: usize },
}

/// A two-dimensional grid of double-precision values
#[derive(Debug, Clone, PartialEq)]
pub struct DataField {
    xres: usize,
    yres: usize,
    data: Vec<f64>,
}

impl DataField {
    /// Creates a field, validating that the data length matches the
    /// dimensions and that the grid is not empty.
    pub fn new(xres: usize, yres: usize, data: Vec<f64>) -> Result<Self, FieldError> {
        if xres == 0 || yres == 0 {
            return Err(FieldError::EmptyField { xres, yres });
        }
        if xres * yres != data.len() {
            return Err(FieldError::DimensionMismatch {
                xres,
                yres,
                len: data.len(),
            });
        }
        Ok(Self { xres, yres, data })
    }

    /// Horizontal resolution in samples
    pub fn xres(&self) -> usize {
        self.xres
    }

    /// Vertical resolution in samples
    pub fn yres(&self) -> usize {
        self.yres
    }

    /// The raw sample values, row by row
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Returns `(min, max)` over all samples.
    ///
    /// The constructor guarantees at least one sample, so the fold always
    /// has a starting value.
    pub fn value_range(&self) -> (f64, f64) {
        let first = self.data[0];
        self.data
            .iter()
            .skip(1)
            .fold((first, first), |(min, max), &v| (min.min(v), max.max(v)))
    }

    /// Inverts all values across the field's own range in place:
    /// `x ↦ min + max − x`.
    ///
    /// A constant field maps to itself, and the value range is unchanged.
    pub fn invert_values(&mut self) {
        let (min, max) = self.value_range();
        let mirror = min + max;
        for v in &mut self.data {
            *v = mirror - *v;
        }
    }
}
