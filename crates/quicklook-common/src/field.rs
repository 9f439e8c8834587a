//! Two-dimensional derived fields.

use crate::bbox::BoundingBox;

/// A 2D field ready for rendering.
///
/// Values are row-major with row 0 at `extent.min_y` (the southern edge for
/// WRF and IOAPI grids). Missing cells are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field2D {
    /// Name of the field (e.g. "wind_speed_10m", "emiss").
    pub name: String,
    /// The grid values.
    pub data: Vec<f32>,
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    /// Coordinate extent of the grid.
    pub extent: BoundingBox,
    /// Physical units copied from the source variable.
    pub units: Option<String>,
}

impl Field2D {
    /// Create a new field.
    pub fn new(
        name: impl Into<String>,
        data: Vec<f32>,
        width: usize,
        height: usize,
        extent: BoundingBox,
        units: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data,
            width,
            height,
            extent,
            units,
        }
    }

    /// `(height, width)`, the order NetCDF lists the dimensions in.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Get the value at a specific grid coordinate.
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }

    /// Minimum and maximum over finite values, or `None` if there are none.
    pub fn finite_range(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// True when no cell holds a finite value.
    pub fn is_all_missing(&self) -> bool {
        !self.data.iter().any(|v| v.is_finite())
    }

    /// Replace the extent, keeping the data.
    pub fn with_extent(mut self, extent: BoundingBox) -> Self {
        self.extent = extent;
        self
    }
}
