//! Time-indexed grid sources.

use netcdf_parser::{ArrayHandle, VariableInfo};
use quicklook_common::{BoundingBox, Field2D, QuicklookError, QuicklookResult};
use tracing::debug;

/// A variable laid out `(time, y, x)` that can be read one plane at a time.
pub trait GridSource {
    /// Variable name, used in error messages and as the field name.
    fn name(&self) -> &str;

    /// Length of the leading time dimension.
    fn time_len(&self) -> usize;

    /// `(height, width)` of one plane.
    fn plane_shape(&self) -> (usize, usize);

    fn units(&self) -> Option<&str>;

    /// Coordinate extent of every plane.
    fn extent(&self) -> BoundingBox;

    /// Row-major values of the plane at `t`.
    ///
    /// Fails with `IndexOutOfRange` when `t >= time_len()`.
    fn read_plane(&self, t: usize) -> QuicklookResult<Vec<f32>>;

    /// `[time, height, width]`
    fn shape(&self) -> Vec<usize> {
        let (h, w) = self.plane_shape();
        vec![self.time_len(), h, w]
    }
}

pub(crate) fn check_time_index<S: GridSource + ?Sized>(src: &S, t: usize) -> QuicklookResult<()> {
    if t >= src.time_len() {
        return Err(QuicklookError::IndexOutOfRange {
            variable: src.name().to_string(),
            index: t,
            len: src.time_len(),
        });
    }
    Ok(())
}

/// An in-memory `(time, y, x)` array.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid3D {
    name: String,
    data: Vec<f32>,
    times: usize,
    height: usize,
    width: usize,
    extent: BoundingBox,
    units: Option<String>,
}

impl Grid3D {
    /// Wrap row-major data. The length must equal `times * height * width`.
    pub fn new(
        name: impl Into<String>,
        data: Vec<f32>,
        times: usize,
        height: usize,
        width: usize,
    ) -> QuicklookResult<Self> {
        let name = name.into();
        if data.len() != times * height * width {
            return Err(QuicklookError::ShapeMismatch {
                left: name,
                right: "declared shape".to_string(),
                left_shape: vec![data.len()],
                right_shape: vec![times, height, width],
            });
        }
        Ok(Self {
            extent: BoundingBox::grid_index(width, height),
            name,
            data,
            times,
            height,
            width,
            units: None,
        })
    }

    /// Stack 2D fields along a new leading time axis.
    ///
    /// Name, units and extent come from the first field; every field must
    /// have the same shape.
    pub fn stack(fields: &[Field2D]) -> QuicklookResult<Self> {
        let first = fields
            .first()
            .ok_or_else(|| QuicklookError::config("Cannot stack zero fields"))?;

        let mut data = Vec::with_capacity(fields.len() * first.data.len());
        for field in fields {
            if field.shape() != first.shape() {
                let (h0, w0) = first.shape();
                let (h, w) = field.shape();
                return Err(QuicklookError::ShapeMismatch {
                    left: first.name.clone(),
                    right: field.name.clone(),
                    left_shape: vec![h0, w0],
                    right_shape: vec![h, w],
                });
            }
            data.extend_from_slice(&field.data);
        }

        Ok(Self {
            name: first.name.clone(),
            data,
            times: fields.len(),
            height: first.height,
            width: first.width,
            extent: first.extent,
            units: first.units.clone(),
        })
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn with_extent(mut self, extent: BoundingBox) -> Self {
        self.extent = extent;
        self
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

impl GridSource for Grid3D {
    fn name(&self) -> &str {
        &self.name
    }

    fn time_len(&self) -> usize {
        self.times
    }

    fn plane_shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    fn extent(&self) -> BoundingBox {
        self.extent
    }

    fn read_plane(&self, t: usize) -> QuicklookResult<Vec<f32>> {
        check_time_index(self, t)?;
        let n = self.height * self.width;
        Ok(self.data[t * n..(t + 1) * n].to_vec())
    }
}

/// How a 4D `(time, level, y, x)` variable becomes one plane per time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelReduction {
    /// Sum over every level (column totals for layered emissions).
    #[default]
    Sum,
    /// Take a single level.
    Index(usize),
}

/// A variable read lazily from an open dataset.
///
/// Only metadata is held; each [`GridSource::read_plane`] call reads one
/// hyperslab (or one per level when summing).
pub struct NetCdfSource<'a> {
    handle: &'a ArrayHandle,
    info: VariableInfo,
    reduction: LevelReduction,
    extent: BoundingBox,
}

impl<'a> NetCdfSource<'a> {
    /// Wrap a 3D `(time, y, x)` or 4D `(time, level, y, x)` variable.
    ///
    /// The extent defaults to grid-index coordinates `(0, 0, nx, ny)`.
    pub fn new(handle: &'a ArrayHandle, name: &str) -> QuicklookResult<Self> {
        let info = handle.variable(name)?;
        let shape = info.shape();
        if shape.len() != 3 && shape.len() != 4 {
            return Err(QuicklookError::ShapeMismatch {
                left: name.to_string(),
                right: "(time, [level,] y, x)".to_string(),
                left_shape: shape,
                right_shape: Vec::new(),
            });
        }

        let (h, w) = (shape[shape.len() - 2], shape[shape.len() - 1]);
        debug!(variable = name, shape = ?info.shape(), "Opened grid source");
        Ok(Self {
            handle,
            info,
            reduction: LevelReduction::default(),
            extent: BoundingBox::grid_index(w, h),
        })
    }

    pub fn with_reduction(mut self, reduction: LevelReduction) -> Self {
        self.reduction = reduction;
        self
    }

    pub fn with_extent(mut self, extent: BoundingBox) -> Self {
        self.extent = extent;
        self
    }

    /// Number of vertical levels, or `None` for a 3D variable.
    pub fn levels(&self) -> Option<usize> {
        let shape = self.info.shape();
        (shape.len() == 4).then(|| shape[1])
    }

    pub fn info(&self) -> &VariableInfo {
        &self.info
    }
}

impl GridSource for NetCdfSource<'_> {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn time_len(&self) -> usize {
        self.info.dims.first().map(|d| d.len).unwrap_or(0)
    }

    fn plane_shape(&self) -> (usize, usize) {
        let shape = self.info.shape();
        (shape[shape.len() - 2], shape[shape.len() - 1])
    }

    fn units(&self) -> Option<&str> {
        self.info.units()
    }

    fn extent(&self) -> BoundingBox {
        self.extent
    }

    fn read_plane(&self, t: usize) -> QuicklookResult<Vec<f32>> {
        check_time_index(self, t)?;
        let name = self.name();

        let Some(levels) = self.levels() else {
            return Ok(self.handle.read_plane(name, &[t])?);
        };

        match self.reduction {
            LevelReduction::Index(k) if k >= levels => Err(QuicklookError::IndexOutOfRange {
                variable: format!("{} level", name),
                index: k,
                len: levels,
            }),
            LevelReduction::Index(k) => Ok(self.handle.read_plane(name, &[t, k])?),
            LevelReduction::Sum => {
                let (h, w) = self.plane_shape();
                let mut total = vec![0.0f32; h * w];
                for k in 0..levels {
                    let plane = self.handle.read_plane(name, &[t, k])?;
                    for (acc, v) in total.iter_mut().zip(plane) {
                        *acc += v;
                    }
                }
                debug!(variable = name, t, levels, "Summed levels");
                Ok(total)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid3d_rejects_wrong_length() {
        let err = Grid3D::new("x", vec![0.0; 5], 1, 2, 3).unwrap_err();
        assert_eq!(err.kind(), "ShapeMismatchError");
    }

    #[test]
    fn test_grid3d_read_plane() {
        let grid = Grid3D::new("x", (0..12).map(|v| v as f32).collect(), 2, 2, 3).unwrap();
        assert_eq!(grid.read_plane(1).unwrap(), vec![6.0, 7.0, 8.0, 9.0, 10.0, 11.0]);
        assert_eq!(grid.shape(), vec![2, 2, 3]);
        assert_eq!(grid.extent(), BoundingBox::new(0.0, 0.0, 3.0, 2.0));
    }

    #[test]
    fn test_grid3d_index_is_never_wrapped() {
        let grid = Grid3D::new("x", vec![0.0; 12], 2, 2, 3).unwrap();
        let err = grid.read_plane(2).unwrap_err();
        assert!(matches!(
            err,
            QuicklookError::IndexOutOfRange { index: 2, len: 2, .. }
        ));
    }

    #[test]
    fn test_stack_rejects_mixed_shapes() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let a = Field2D::new("a", vec![0.0; 4], 2, 2, bbox, None);
        let b = Field2D::new("b", vec![0.0; 6], 3, 2, bbox, None);
        assert!(Grid3D::stack(&[a, b]).is_err());
        assert!(Grid3D::stack(&[]).is_err());
    }
}
