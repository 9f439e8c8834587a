//! Outline overlay in the field's planar coordinates.
//!
//! Outlines are placed with the same linear mapping as the raster. No map
//! projection is applied, so lon/lat outlines drawn over a Lambert grid are
//! an approximation.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_line_segment_mut;
use quicklook_common::{BoundingBox, Outline};
use tracing::debug;

use crate::gradient::Color;

/// Contrasts with both colormaps.
pub const OUTLINE_COLOR: Color = Color::rgb(255, 0, 255);

/// Maps planar coordinates onto a pixel rectangle, north up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub extent: BoundingBox,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn to_pixel(&self, x: f64, y: f64) -> (f32, f32) {
        let fx = (x - self.extent.min_x) / self.extent.width();
        let fy = (self.extent.max_y - y) / self.extent.height();
        (
            self.left + fx as f32 * self.width,
            self.top + fy as f32 * self.height,
        )
    }

    /// Clip a pixel-space segment to the viewport rectangle
    /// (Liang-Barsky). `None` when no part of it is inside.
    pub fn clip(&self, a: (f32, f32), b: (f32, f32)) -> Option<((f32, f32), (f32, f32))> {
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let (mut t0, mut t1) = (0.0f32, 1.0f32);
        let edges = [
            (-dx, a.0 - self.left),
            (dx, self.left + self.width - a.0),
            (-dy, a.1 - self.top),
            (dy, self.top + self.height - a.1),
        ];

        for (p, q) in edges {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }

        Some(((a.0 + t0 * dx, a.1 + t0 * dy), (a.0 + t1 * dx, a.1 + t1 * dy)))
    }
}

/// Draw each outline as a polyline. Returns the number of segments drawn.
///
/// Segments with a non-finite end are skipped. The rest are clipped to the
/// viewport, so nothing is drawn over the margins.
pub fn draw_outlines(canvas: &mut RgbaImage, viewport: &Viewport, outlines: &[Outline]) -> usize {
    let color = Rgba(OUTLINE_COLOR.to_rgba());
    let mut segments = 0;

    for outline in outlines {
        for pair in outline.points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if ![a.0, a.1, b.0, b.1].iter().all(|v| v.is_finite()) {
                continue;
            }
            let start = viewport.to_pixel(a.0, a.1);
            let end = viewport.to_pixel(b.0, b.1);
            let Some((start, end)) = viewport.clip(start, end) else {
                continue;
            };
            draw_line_segment_mut(canvas, start, end, color);
            segments += 1;
        }
        debug!(outline = %outline.name, points = outline.points.len(), "Drew outline");
    }

    segments
}
