//! Synthetic gridded data for tests.
//!
//! Every generator is deterministic so that expected values can be
//! recomputed in assertions.

/// Grid where each cell encodes its own position and time step:
/// `t * 10_000 + row * 100 + col`.
///
/// Row-major, one `height * width` plane per time step.
///
/// ```
/// use test_utils::create_indexed_cube;
///
/// let cube = create_indexed_cube(3, 2, 2);
/// assert_eq!(cube.len(), 12);
/// assert_eq!(cube[1], 1.0);        // t=0, row=0, col=1
/// assert_eq!(cube[3], 100.0);      // t=0, row=1, col=0
/// assert_eq!(cube[6], 10_000.0);   // t=1, row=0, col=0
/// ```
pub fn create_indexed_cube(width: usize, height: usize, times: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height * times);
    for t in 0..times {
        for row in 0..height {
            for col in 0..width {
                data.push((t * 10_000 + row * 100 + col) as f32);
            }
        }
    }
    data
}

/// Eastward 10 m wind in m/s, `times` planes.
///
/// Varies with row (latitude band) and flips sign every other time step so
/// that each plane is distinguishable.
pub fn create_u_wind_cube(width: usize, height: usize, times: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height * times);
    for t in 0..times {
        let sign = if t % 2 == 0 { 1.0 } else { -1.0 };
        for row in 0..height {
            let band = (row as f32 / height.max(1) as f32 - 0.5) * 2.0;
            for _col in 0..width {
                data.push(sign * (band * 12.0 + t as f32));
            }
        }
    }
    data
}

/// Northward 10 m wind in m/s, `times` planes. Varies with column.
pub fn create_v_wind_cube(width: usize, height: usize, times: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height * times);
    for t in 0..times {
        for _row in 0..height {
            for col in 0..width {
                let band = (col as f32 / width.max(1) as f32 - 0.5) * 2.0;
                data.push(band * 9.0 - t as f32 * 0.5);
            }
        }
    }
    data
}

/// Non-negative emission rates laid out `(time, layer, row, col)`.
///
/// Sparse like a real inventory: roughly a quarter of cells emit.
pub fn create_emission_cube(
    width: usize,
    height: usize,
    layers: usize,
    times: usize,
    seed: u32,
) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height * layers * times);
    for t in 0..times {
        for k in 0..layers {
            for row in 0..height {
                for col in 0..width {
                    let h = simple_hash(col as u32, row as u32, seed ^ ((t * 31 + k) as u32));
                    let rate = if h % 4 == 0 {
                        (h % 1000) as f32 / 100.0 / (k + 1) as f32
                    } else {
                        0.0
                    };
                    data.push(rate);
                }
            }
        }
    }
    data
}

/// Latitude and longitude planes for a regular grid starting at
/// `(lat0, lon0)` with spacing `step` degrees. Row 0 is the southern edge.
pub fn create_latlon_planes(
    width: usize,
    height: usize,
    lat0: f32,
    lon0: f32,
    step: f32,
) -> (Vec<f32>, Vec<f32>) {
    let mut lat = Vec::with_capacity(width * height);
    let mut lon = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            lat.push(lat0 + row as f32 * step);
            lon.push(lon0 + col as f32 * step);
        }
    }
    (lat, lon)
}

/// Grid of zeros with NaN at the given `(col, row)` positions.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    nan_positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = vec![0.0f32; width * height];
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f32::NAN;
        }
    }
    data
}

/// RGBA pixels using a handful of distinct colors, for indexed PNG tests.
pub fn create_banded_rgba_pixels(width: usize, height: usize, bands: usize) -> Vec<u8> {
    let bands = bands.max(1);
    let mut pixels = Vec::with_capacity(width * height * 4);
    for _y in 0..height {
        for x in 0..width {
            let band = x * bands / width.max(1);
            let level = (band * 255 / bands) as u8;
            pixels.extend_from_slice(&[level, 255 - level, 64, 255]);
        }
    }
    pixels
}

fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_cube_layout() {
        let cube = create_indexed_cube(4, 3, 2);
        assert_eq!(cube.len(), 24);
        // t=1, row=2, col=3
        assert_eq!(cube[12 + 2 * 4 + 3], 10_203.0);
    }

    #[test]
    fn test_wind_cubes_differ_between_time_steps() {
        let u = create_u_wind_cube(4, 4, 2);
        assert_ne!(&u[..16], &u[16..]);
        let v = create_v_wind_cube(4, 4, 2);
        assert_ne!(&v[..16], &v[16..]);
    }

    #[test]
    fn test_emission_cube_is_non_negative_and_deterministic() {
        let a = create_emission_cube(6, 4, 2, 3, 7);
        let b = create_emission_cube(6, 4, 2, 3, 7);
        assert_eq!(a, b);
        assert_eq!(a.len(), 6 * 4 * 2 * 3);
        assert!(a.iter().all(|&v| v >= 0.0));
        assert!(a.iter().any(|&v| v > 0.0));
    }

    #[test]
    fn test_latlon_planes_increase_northward() {
        let (lat, lon) = create_latlon_planes(3, 2, 64.0, -148.0, 0.5);
        assert_eq!(lat[0], 64.0);
        assert_eq!(lat[3], 64.5);
        assert_eq!(lon[2], -147.0);
    }

    #[test]
    fn test_grid_with_nans() {
        let grid = create_grid_with_nans(10, 10, &[(5, 5), (0, 0)]);
        assert!(grid[0].is_nan());
        assert!(grid[55].is_nan());
        assert!(!grid[1].is_nan());
    }

    #[test]
    fn test_banded_pixels_are_opaque() {
        let pixels = create_banded_rgba_pixels(32, 8, 4);
        assert_eq!(pixels.len(), 32 * 8 * 4);
        assert!(pixels.chunks_exact(4).all(|p| p[3] == 255));
    }
}
