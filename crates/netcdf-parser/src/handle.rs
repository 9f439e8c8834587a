//! Read-only dataset handles with lazy data access.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use quicklook_common::AttrValue;
use tracing::{debug, instrument};

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{get_f64_attr, silence_hdf5_errors, widen_attribute};

/// Name and length of a dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionInfo {
    pub name: String,
    pub len: usize,
    pub unlimited: bool,
}

/// Metadata of a variable. Holds no array data.
#[derive(Debug, Clone)]
pub struct VariableInfo {
    pub name: String,
    pub dims: Vec<DimensionInfo>,
    /// NetCDF storage type, e.g. "Float(F32)".
    pub dtype: String,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl VariableInfo {
    /// Dimension lengths in file order.
    pub fn shape(&self) -> Vec<usize> {
        self.dims.iter().map(|d| d.len).collect()
    }

    pub fn dim_names(&self) -> Vec<&str> {
        self.dims.iter().map(|d| d.name.as_str()).collect()
    }

    /// The `units` attribute, if it is text.
    pub fn units(&self) -> Option<&str> {
        match self.attributes.get("units") {
            Some(AttrValue::Text(s)) => Some(s.trim()),
            _ => None,
        }
    }

    pub fn has_dim(&self, name: &str) -> bool {
        self.dims.iter().any(|d| d.name == name)
    }
}

/// An open, read-only NetCDF file.
///
/// Opening reads only the header. Array values are read by explicit
/// [`ArrayHandle::read_plane`] / [`ArrayHandle::read_all`] calls. The
/// underlying file is closed when the handle is dropped, which covers
/// early returns through `?` as well as normal completion.
pub struct ArrayHandle {
    path: PathBuf,
    file: netcdf::File,
}

/// Open a NetCDF file read-only.
pub fn open_dataset<P: AsRef<Path>>(path: P) -> NetCdfResult<ArrayHandle> {
    ArrayHandle::open(path)
}

/// Open `path`, run `f` on the handle and close the file before returning,
/// whatever `f` returns.
pub fn with_dataset<P, T, E, F>(path: P, f: F) -> Result<T, E>
where
    P: AsRef<Path>,
    E: From<NetCdfError>,
    F: FnOnce(&ArrayHandle) -> Result<T, E>,
{
    let handle = ArrayHandle::open(path)?;
    f(&handle)
}

impl ArrayHandle {
    /// Open a NetCDF file read-only.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> NetCdfResult<Self> {
        // Silence HDF5's verbose stderr output for missing attributes
        silence_hdf5_errors();

        let path = path.as_ref().to_path_buf();
        let file = netcdf::open(&path).map_err(|source| NetCdfError::Open {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), "Opened dataset");
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All dimensions in definition order.
    pub fn dimensions(&self) -> Vec<DimensionInfo> {
        self.file
            .dimensions()
            .map(|d| DimensionInfo {
                name: d.name(),
                len: d.len(),
                unlimited: d.is_unlimited(),
            })
            .collect()
    }

    pub fn dimension_len(&self, name: &str) -> Option<usize> {
        self.file.dimension(name).map(|d| d.len())
    }

    pub fn variable_names(&self) -> Vec<String> {
        self.file.variables().map(|v| v.name()).collect()
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.file.variable(name).is_some()
    }

    /// Metadata of one variable.
    pub fn variable(&self, name: &str) -> NetCdfResult<VariableInfo> {
        let var = self.lookup(name)?;

        let dims = var
            .dimensions()
            .iter()
            .map(|d| DimensionInfo {
                name: d.name(),
                len: d.len(),
                unlimited: d.is_unlimited(),
            })
            .collect();

        let attributes = var
            .attributes()
            .filter_map(|attr| {
                let value = attr.value().ok()?;
                Some((attr.name().to_string(), widen_attribute(value)))
            })
            .collect();

        Ok(VariableInfo {
            name: name.to_string(),
            dims,
            dtype: format!("{:?}", var.vartype()),
            attributes,
        })
    }

    /// Global (file-level) attributes. Unreadable attributes are skipped.
    pub fn global_attributes(&self) -> BTreeMap<String, AttrValue> {
        self.file
            .attributes()
            .filter_map(|attr| {
                let value = attr.value().ok()?;
                Some((attr.name().to_string(), widen_attribute(value)))
            })
            .collect()
    }

    pub fn global_attribute(&self, name: &str) -> Option<AttrValue> {
        let attr = self.file.attribute(name)?;
        attr.value().ok().map(widen_attribute)
    }

    /// Read one 2D plane of a variable.
    ///
    /// `leading` fixes every dimension except the last two, so a
    /// `(Time, south_north, west_east)` variable takes one index and a
    /// `(TSTEP, LAY, ROW, COL)` variable takes two. Values are returned
    /// row-major with fill values replaced by `NaN` and packing
    /// (`scale_factor`, `add_offset`) applied.
    pub fn read_plane(&self, name: &str, leading: &[usize]) -> NetCdfResult<Vec<f32>> {
        let var = self.lookup(name)?;
        let dims: Vec<(String, usize)> = var
            .dimensions()
            .iter()
            .map(|d| (d.name(), d.len()))
            .collect();
        let shape: Vec<usize> = dims.iter().map(|(_, len)| *len).collect();

        if dims.len() != leading.len() + 2 {
            return Err(NetCdfError::InvalidShape {
                variable: name.to_string(),
                shape,
                message: format!(
                    "a 2D plane needs {} leading indices, got {}",
                    dims.len().saturating_sub(2),
                    leading.len()
                ),
            });
        }

        for ((dim_name, len), &index) in dims.iter().zip(leading) {
            if index >= *len {
                return Err(NetCdfError::IndexOutOfRange {
                    variable: name.to_string(),
                    dimension: dim_name.clone(),
                    index,
                    len: *len,
                });
            }
        }

        debug!(variable = name, leading = ?leading, "Reading plane");

        let raw: Result<Vec<f32>, netcdf::Error> = match *leading {
            [] => var.get_values::<f32, _>(..),
            [a] => var.get_values::<f32, _>((a, .., ..)),
            [a, b] => var.get_values::<f32, _>((a, b, .., ..)),
            [a, b, c] => var.get_values::<f32, _>((a, b, c, .., ..)),
            _ => {
                return Err(NetCdfError::InvalidShape {
                    variable: name.to_string(),
                    shape,
                    message: "more than five dimensions are not supported".to_string(),
                })
            }
        };
        let raw = raw.map_err(|source| NetCdfError::Read {
            variable: name.to_string(),
            path: self.path.clone(),
            source,
        })?;

        Ok(unpack(&var, raw))
    }

    /// Read a whole variable. Meant for coordinate arrays; bulk data should
    /// go through [`ArrayHandle::read_plane`].
    pub fn read_all(&self, name: &str) -> NetCdfResult<Vec<f32>> {
        let var = self.lookup(name)?;
        let raw = var
            .get_values::<f32, _>(..)
            .map_err(|source| NetCdfError::Read {
                variable: name.to_string(),
                path: self.path.clone(),
                source,
            })?;
        Ok(unpack(&var, raw))
    }

    fn lookup(&self, name: &str) -> NetCdfResult<netcdf::Variable<'_>> {
        self.file
            .variable(name)
            .ok_or_else(|| NetCdfError::VariableNotFound {
                variable: name.to_string(),
                path: self.path.clone(),
            })
    }
}

impl Drop for ArrayHandle {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "Closed dataset");
    }
}

impl std::fmt::Debug for ArrayHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayHandle").field("path", &self.path).finish()
    }
}

/// Apply fill value masking and packing attributes.
fn unpack(var: &netcdf::Variable, raw: Vec<f32>) -> Vec<f32> {
    let fill = get_f64_attr(var, "_FillValue").or_else(|| get_f64_attr(var, "missing_value"));
    let scale = get_f64_attr(var, "scale_factor").unwrap_or(1.0) as f32;
    let offset = get_f64_attr(var, "add_offset").unwrap_or(0.0) as f32;
    let fill = fill.map(|f| f as f32);

    if fill.is_none() && scale == 1.0 && offset == 0.0 {
        return raw;
    }

    raw.into_iter()
        .map(|val| {
            if Some(val) == fill {
                f32::NAN
            } else {
                val * scale + offset
            }
        })
        .collect()
}
