//! Two-dimensional latitude/longitude coordinates (WRF `XLAT`/`XLONG`).

use netcdf_parser::ArrayHandle;
use quicklook_common::{BoundingBox, QuicklookError, QuicklookResult};

/// Curvilinear lat/lon arrays, row-major `(south_north, west_east)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LatLonGrid {
    lat: Vec<f32>,
    lon: Vec<f32>,
    width: usize,
    height: usize,
}

impl LatLonGrid {
    pub fn new(lat: Vec<f32>, lon: Vec<f32>, width: usize, height: usize) -> QuicklookResult<Self> {
        if lat.len() != width * height || lon.len() != width * height {
            return Err(QuicklookError::ShapeMismatch {
                left: "latitude".to_string(),
                right: "longitude".to_string(),
                left_shape: vec![lat.len()],
                right_shape: vec![lon.len()],
            });
        }
        Ok(Self {
            lat,
            lon,
            width,
            height,
        })
    }

    /// Read coordinates at `time_index`.
    ///
    /// WRF stores `XLAT(Time, south_north, west_east)`; 2D coordinate
    /// variables without a time dimension are accepted too.
    pub fn from_handle(
        handle: &ArrayHandle,
        lat_name: &str,
        lon_name: &str,
        time_index: usize,
    ) -> QuicklookResult<Self> {
        let lat_info = handle.variable(lat_name)?;
        let lon_info = handle.variable(lon_name)?;
        if lat_info.shape() != lon_info.shape() {
            return Err(QuicklookError::ShapeMismatch {
                left: lat_name.to_string(),
                right: lon_name.to_string(),
                left_shape: lat_info.shape(),
                right_shape: lon_info.shape(),
            });
        }

        let shape = lat_info.shape();
        let leading: &[usize] = match shape.len() {
            2 => &[],
            3 => std::slice::from_ref(&time_index),
            _ => {
                return Err(QuicklookError::ShapeMismatch {
                    left: lat_name.to_string(),
                    right: "([time,] y, x)".to_string(),
                    left_shape: shape,
                    right_shape: Vec::new(),
                })
            }
        };

        let lat = handle.read_plane(lat_name, leading)?;
        let lon = handle.read_plane(lon_name, leading)?;
        Self::new(lat, lon, shape[shape.len() - 1], shape[shape.len() - 2])
    }

    /// `(height, width)`
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Lon/lat box over finite coordinates, or `None` if there are none.
    pub fn extent(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(
            self.lon
                .iter()
                .zip(&self.lat)
                .map(|(&x, &y)| (x as f64, y as f64)),
        )
    }

    /// The centered `height × width` window.
    ///
    /// Emissions grids are typically a few cells smaller than the WRF grid
    /// they were built from, with the difference split between both edges.
    pub fn crop_center(&self, width: usize, height: usize) -> QuicklookResult<Self> {
        if width > self.width || height > self.height {
            return Err(QuicklookError::ShapeMismatch {
                left: "coordinate grid".to_string(),
                right: "crop window".to_string(),
                left_shape: vec![self.height, self.width],
                right_shape: vec![height, width],
            });
        }

        let x0 = (self.width - width) / 2;
        let y0 = (self.height - height) / 2;
        let mut lat = Vec::with_capacity(width * height);
        let mut lon = Vec::with_capacity(width * height);
        for row in y0..y0 + height {
            let start = row * self.width + x0;
            lat.extend_from_slice(&self.lat[start..start + width]);
            lon.extend_from_slice(&self.lon[start..start + width]);
        }

        Self::new(lat, lon, width, height)
    }

    pub fn lat(&self) -> &[f32] {
        &self.lat
    }

    pub fn lon(&self) -> &[f32] {
        &self.lon
    }
}
