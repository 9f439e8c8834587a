//! Quicklook composition: raster, colorbar, outlines, PNG file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use quicklook_common::{Field2D, Outline};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use crate::error::{RenderError, RenderResult};
use crate::gradient::{render_grid, Color, Colormap};
use crate::overlay::{draw_outlines, Viewport};
use crate::png;

const BACKGROUND: Color = Color::rgb(255, 255, 255);
const FRAME: Color = Color::rgb(0, 0, 0);
const MARGIN: u32 = 20;
const COLORBAR_GAP: u32 = 20;
const COLORBAR_WIDTH: u32 = 24;
const COLORBAR_TICKS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Defaults to [`Colormap::for_field`].
    pub colormap: Option<Colormap>,
    /// Long side of the raster in pixels. Cells are square and at least
    /// one pixel, so small grids come out smaller.
    pub target_size: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            colormap: None,
            target_size: 600,
        }
    }
}

/// What [`render`] wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Finite data range the colormap was stretched over.
    pub range: (f32, f32),
    pub outline_segments: usize,
}

/// Render `field` to a PNG at `output_path` with default options.
pub fn render(
    field: &Field2D,
    output_path: &Path,
    boundary: Option<&[Outline]>,
) -> RenderResult<Rendered> {
    render_with(field, output_path, boundary, &RenderOptions::default())
}

#[instrument(skip(field, boundary, options), fields(field = %field.name))]
pub fn render_with(
    field: &Field2D,
    output_path: &Path,
    boundary: Option<&[Outline]>,
    options: &RenderOptions,
) -> RenderResult<Rendered> {
    let (canvas, range, outline_segments) = compose(field, boundary, options)?;
    let (width, height) = canvas.dimensions();

    let bytes = png::encode_auto(canvas.as_raw(), width as usize, height as usize)?;
    write_atomic(output_path, &bytes)?;

    info!(
        path = %output_path.display(),
        width,
        height,
        min = range.0,
        max = range.1,
        "Wrote quicklook"
    );

    Ok(Rendered {
        path: output_path.to_path_buf(),
        width,
        height,
        range,
        outline_segments,
    })
}

/// Check the field and draw the full image in memory.
pub fn compose(
    field: &Field2D,
    boundary: Option<&[Outline]>,
    options: &RenderOptions,
) -> RenderResult<(RgbaImage, (f32, f32), usize)> {
    if field.width == 0 || field.height == 0 || field.data.len() != field.width * field.height {
        return Err(RenderError::BadShape {
            field: field.name.clone(),
            len: field.data.len(),
            width: field.width,
            height: field.height,
        });
    }
    if field.extent.is_degenerate() {
        return Err(RenderError::DegenerateExtent {
            field: field.name.clone(),
            extent: field.extent,
        });
    }
    let (min, max) = field
        .finite_range()
        .ok_or_else(|| RenderError::NoData(field.name.clone()))?;

    let colormap = options.colormap.unwrap_or_else(|| Colormap::for_field(&field.name));
    let cell = (options.target_size / field.width.max(field.height) as u32).max(1);
    let plot_w = field.width as u32 * cell;
    let plot_h = field.height as u32 * cell;
    let bar_left = MARGIN + plot_w + COLORBAR_GAP;

    let mut canvas = RgbaImage::from_pixel(
        bar_left + COLORBAR_WIDTH + MARGIN,
        plot_h + 2 * MARGIN,
        Rgba(BACKGROUND.to_rgba()),
    );

    let cells = render_grid(&field.data, min, max, colormap);

    // Row 0 is the southern edge, drawn at the bottom.
    for row in 0..field.height {
        let top = MARGIN + (field.height - 1 - row) as u32 * cell;
        for col in 0..field.width {
            let i = (row * field.width + col) * 4;
            let color = Rgba([cells[i], cells[i + 1], cells[i + 2], cells[i + 3]]);
            let rect = Rect::at((MARGIN + col as u32 * cell) as i32, top as i32).of_size(cell, cell);
            draw_filled_rect_mut(&mut canvas, rect, color);
        }
    }

    let segments = match boundary {
        Some(outlines) => {
            let viewport = Viewport {
                extent: field.extent,
                left: MARGIN as f32,
                top: MARGIN as f32,
                width: plot_w as f32,
                height: plot_h as f32,
            };
            draw_outlines(&mut canvas, &viewport, outlines)
        }
        None => 0,
    };

    draw_colorbar(&mut canvas, bar_left, plot_h, colormap, min, max);

    let frame = Rgba(FRAME.to_rgba());
    draw_hollow_rect_mut(
        &mut canvas,
        Rect::at(MARGIN as i32 - 1, MARGIN as i32 - 1).of_size(plot_w + 2, plot_h + 2),
        frame,
    );

    debug!(cell, plot_w, plot_h, ?colormap, "Composed quicklook");
    Ok((canvas, (min, max), segments))
}

/// Vertical bar, maximum at the top, with evenly spaced ticks.
fn draw_colorbar(canvas: &mut RgbaImage, left: u32, height: u32, colormap: Colormap, min: f32, max: f32) {
    let steps = height.saturating_sub(1).max(1) as f32;
    for y in 0..height {
        let value = max - (max - min) * y as f32 / steps;
        let color = Rgba(colormap.color(value, min, max).to_rgba());
        let rect = Rect::at(left as i32, (MARGIN + y) as i32).of_size(COLORBAR_WIDTH, 1);
        draw_filled_rect_mut(canvas, rect, color);
    }

    let frame = Rgba(FRAME.to_rgba());
    draw_hollow_rect_mut(
        canvas,
        Rect::at(left as i32 - 1, MARGIN as i32 - 1).of_size(COLORBAR_WIDTH + 2, height + 2),
        frame,
    );
    for tick in 0..COLORBAR_TICKS {
        let y = MARGIN + (height.saturating_sub(1) * tick) / (COLORBAR_TICKS - 1);
        let rect = Rect::at((left + COLORBAR_WIDTH + 1) as i32, y as i32).of_size(4, 1);
        draw_filled_rect_mut(canvas, rect, frame);
    }
}

/// Write through a temporary file in the destination directory, so a
/// failed run never leaves a partial PNG behind.
fn write_atomic(path: &Path, bytes: &[u8]) -> RenderResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let failed = |source: std::io::Error| RenderError::Write {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(dir).map_err(failed)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(failed)?;
    tmp.write_all(bytes).map_err(failed)?;
    tmp.as_file().sync_all().map_err(failed)?;
    tmp.persist(path).map_err(|e| failed(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quicklook_common::BoundingBox;

    fn field(data: Vec<f32>, w: usize, h: usize) -> Field2D {
        Field2D::new("emiss", data, w, h, BoundingBox::grid_index(w, h), None)
    }

    #[test]
    fn test_south_row_at_bottom() {
        let f = field(vec![0.0, 0.0, 1.0, 1.0], 2, 2);
        let opts = RenderOptions {
            colormap: Some(Colormap::Viridis),
            target_size: 10,
        };
        let (canvas, range, _) = compose(&f, None, &opts).unwrap();
        assert_eq!(range, (0.0, 1.0));

        let low = Colormap::Viridis.color(0.0, 0.0, 1.0).to_rgba();
        let high = Colormap::Viridis.color(1.0, 0.0, 1.0).to_rgba();
        // Top-left cell shows row 1, bottom-left shows row 0.
        assert_eq!(canvas.get_pixel(MARGIN + 2, MARGIN + 2).0, high);
        assert_eq!(canvas.get_pixel(MARGIN + 2, MARGIN + 7).0, low);
    }

    #[test]
    fn test_canvas_size() {
        let f = field(vec![1.0; 8 * 6], 8, 6);
        let (canvas, _, _) = compose(&f, None, &RenderOptions::default()).unwrap();
        // 600 / 8 = 75 px cells
        assert_eq!(
            canvas.dimensions(),
            (MARGIN + 600 + COLORBAR_GAP + COLORBAR_WIDTH + MARGIN, 450 + 2 * MARGIN)
        );
    }

    #[test]
    fn test_bad_shape() {
        let f = field(vec![1.0; 3], 2, 2);
        assert!(matches!(
            compose(&f, None, &RenderOptions::default()),
            Err(RenderError::BadShape { len: 3, .. })
        ));
    }

    #[test]
    fn test_write_atomic_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.png");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert_eq!(fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }
}
