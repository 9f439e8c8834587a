//! Quicklook rendering for derived 2D fields.
//!
//! - [`gradient`]: colormaps (wind speed ramp, viridis)
//! - [`overlay`]: boundary outlines in planar coordinates
//! - [`png`]: indexed / RGBA PNG encoder
//! - [`quicklook`]: raster + colorbar + outlines, written atomically

pub mod error;
pub mod gradient;
pub mod overlay;
pub mod png;
pub mod quicklook;

pub use error::{RenderError, RenderResult};
pub use gradient::{Color, Colormap};
pub use quicklook::{render, render_with, RenderOptions, Rendered};
