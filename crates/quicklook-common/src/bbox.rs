//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A planar bounding box.
///
/// For lon/lat grids the coordinates are in degrees; for grids without
/// coordinate variables they are grid indices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Extent spanned by grid indices, `(0, 0)` to `(width, height)`.
    pub fn grid_index(width: usize, height: usize) -> Self {
        Self::new(0.0, 0.0, width as f64, height as f64)
    }

    /// Smallest box containing every finite `(x, y)` pair.
    ///
    /// Returns `None` when no pair is finite.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut bbox: Option<Self> = None;
        for (x, y) in points {
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            bbox = Some(match bbox {
                None => Self::new(x, y, x, y),
                Some(b) => Self::new(b.min_x.min(x), b.min_y.min(y), b.max_x.max(x), b.max_y.max(y)),
            });
        }
        bbox
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// True unless every bound is finite and `min < max` on both axes.
    pub fn is_degenerate(&self) -> bool {
        let finite = self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite();
        !finite || self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_skips_nan() {
        let bbox = BoundingBox::from_points(vec![
            (1.0, 5.0),
            (f64::NAN, 100.0),
            (-2.0, 3.0),
        ])
        .unwrap();
        assert_eq!(bbox, BoundingBox::new(-2.0, 3.0, 1.0, 5.0));
    }

    #[test]
    fn test_degenerate() {
        assert!(BoundingBox::new(0.0, 0.0, 0.0, 1.0).is_degenerate());
        assert!(BoundingBox::new(0.0, 2.0, 1.0, 1.0).is_degenerate());
        assert!(BoundingBox::new(0.0, 0.0, f64::INFINITY, 1.0).is_degenerate());
        assert!(!BoundingBox::new(-148.0, 64.0, -147.0, 65.0).is_degenerate());
    }
}
