//! End-to-end tests for quicklook rendering.

use std::fs;

use quicklook_common::{BoundingBox, Field2D, Outline, QuicklookError};
use renderer::png::{encode_auto, PNG_SIGNATURE};
use renderer::{render, render_with, Colormap, RenderError, RenderOptions};
use test_utils::generators::{create_banded_rgba_pixels, create_grid_with_nans};
use test_utils::temp_test_dir;

fn alaska_field(name: &str, data: Vec<f32>, width: usize, height: usize) -> Field2D {
    Field2D::new(
        name,
        data,
        width,
        height,
        BoundingBox::new(-148.5, 64.0, -146.75, 65.25),
        Some("m s-1".to_string()),
    )
}

// ============================================================================
// Successful renders
// ============================================================================

#[test]
fn test_render_writes_png() {
    let dir = temp_test_dir();
    let path = dir.path().join("outputs").join("wind_h00.png");
    let data: Vec<f32> = (0..48).map(|i| i as f32 * 0.5).collect();
    let field = alaska_field("wind_speed_10m", data, 8, 6);

    let rendered = render(&field, &path, None).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], &PNG_SIGNATURE);
    assert_eq!(rendered.path, path);
    assert_eq!(rendered.range, (0.0, 23.5));
    assert_eq!(rendered.outline_segments, 0);

    let width = u32::from_be_bytes(bytes[16..20].try_into().unwrap());
    let height = u32::from_be_bytes(bytes[20..24].try_into().unwrap());
    assert_eq!((width, height), (rendered.width, rendered.height));
}

#[test]
fn test_render_with_boundary_overlay() {
    let dir = temp_test_dir();
    let path = dir.path().join("co_emiss_h02.png");
    let field = alaska_field("emiss", create_grid_with_nans(8, 6, &[(0, 0), (3, 4)]), 8, 6);
    let outline = Outline::new(
        "Fairbanks",
        vec![
            (-148.2, 64.2),
            (-146.9, 64.2),
            (-146.9, 65.1),
            (-148.2, 65.1),
            (-148.2, 64.2),
        ],
    );

    let rendered = render(&field, &path, Some(std::slice::from_ref(&outline))).unwrap();
    assert_eq!(rendered.outline_segments, 4);
    assert!(path.exists());
}

#[test]
fn test_rerun_overwrites() {
    let dir = temp_test_dir();
    let path = dir.path().join("wind_h01.png");
    fs::write(&path, b"stale").unwrap();

    let field = alaska_field("wind_speed_10m", vec![3.0; 12], 4, 3);
    let opts = RenderOptions {
        colormap: Some(Colormap::Viridis),
        target_size: 40,
    };
    render_with(&field, &path, None, &opts).unwrap();

    assert_eq!(&fs::read(&path).unwrap()[..8], &PNG_SIGNATURE);
}

// ============================================================================
// Rejected fields
// ============================================================================

#[test]
fn test_degenerate_extent_rejected() {
    let dir = temp_test_dir();
    let path = dir.path().join("flat.png");
    let field = alaska_field("emiss", vec![1.0; 4], 2, 2)
        .with_extent(BoundingBox::new(-147.0, 64.0, -147.0, 65.0));

    let err = render(&field, &path, None).unwrap_err();
    assert!(matches!(err, RenderError::DegenerateExtent { .. }));
    assert!(!path.exists());

    let err: QuicklookError = err.into();
    assert_eq!(err.kind(), "RenderError");
}

#[test]
fn test_nan_extent_rejected() {
    let dir = temp_test_dir();
    let field = alaska_field("emiss", vec![1.0; 4], 2, 2)
        .with_extent(BoundingBox::new(f64::NAN, 64.0, -147.0, 65.0));
    assert!(matches!(
        render(&field, &dir.path().join("x.png"), None),
        Err(RenderError::DegenerateExtent { .. })
    ));
}

#[test]
fn test_all_missing_rejected() {
    let dir = temp_test_dir();
    let path = dir.path().join("missing.png");
    let field = alaska_field("emiss", vec![f32::NAN; 6], 3, 2);

    assert!(matches!(render(&field, &path, None), Err(RenderError::NoData(_))));
    assert!(!path.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

// ============================================================================
// Encoder on realistic canvases
// ============================================================================

#[test]
fn test_banded_canvas_is_indexed() {
    let pixels = create_banded_rgba_pixels(256, 64, 12);
    let png = encode_auto(&pixels, 256, 64).unwrap();
    assert_eq!(png[25], 3);
    assert!(png.len() < pixels.len() / 4);
}
