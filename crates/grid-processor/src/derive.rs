//! Derived fields.
//!
//! Both operations are pure functions of their sources. Indices are checked
//! against the time dimension and never wrapped or clamped.

use quicklook_common::{Field2D, QuicklookError, QuicklookResult};
use tracing::debug;

use crate::source::{check_time_index, GridSource};

/// Time index used when a caller does not pick one.
pub const DEFAULT_TIME_INDEX: usize = 0;

/// 10 m wind speed `sqrt(u² + v²)` at `time_index`.
///
/// Shapes are compared before the index is checked and before any data is
/// read. Units and extent are taken from `u`.
pub fn wind_speed_10m<U, V>(u: &U, v: &V, time_index: usize) -> QuicklookResult<Field2D>
where
    U: GridSource + ?Sized,
    V: GridSource + ?Sized,
{
    if u.shape() != v.shape() {
        return Err(QuicklookError::ShapeMismatch {
            left: u.name().to_string(),
            right: v.name().to_string(),
            left_shape: u.shape(),
            right_shape: v.shape(),
        });
    }
    check_time_index(u, time_index)?;

    let u_plane = u.read_plane(time_index)?;
    let v_plane = v.read_plane(time_index)?;

    let speed: Vec<f32> = u_plane
        .iter()
        .zip(&v_plane)
        .map(|(&a, &b)| (a * a + b * b).sqrt())
        .collect();

    let (height, width) = u.plane_shape();
    debug!(u = u.name(), v = v.name(), time_index, "Derived wind speed");

    Ok(Field2D::new(
        "wind_speed_10m",
        speed,
        width,
        height,
        u.extent(),
        u.units().map(str::to_string),
    ))
}

/// [`wind_speed_10m`] at [`DEFAULT_TIME_INDEX`].
pub fn wind_speed_10m_at_default<U, V>(u: &U, v: &V) -> QuicklookResult<Field2D>
where
    U: GridSource + ?Sized,
    V: GridSource + ?Sized,
{
    wind_speed_10m(u, v, DEFAULT_TIME_INDEX)
}

/// The `(y, x)` plane at `hour_index`.
pub fn slice_hour<S: GridSource + ?Sized>(source: &S, hour_index: usize) -> QuicklookResult<Field2D> {
    check_time_index(source, hour_index)?;
    let (height, width) = source.plane_shape();
    let data = source.read_plane(hour_index)?;

    Ok(Field2D::new(
        source.name(),
        data,
        width,
        height,
        source.extent(),
        source.units().map(str::to_string),
    ))
}
