//! Boundary outlines drawn over quicklook images.

use crate::bbox::BoundingBox;

/// A named polyline in the same planar coordinates as the field it is
/// drawn over. No projection is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

impl Outline {
    pub fn new(name: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    /// Fewer than two points cannot be drawn.
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn bbox(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.points.iter().copied())
    }
}
