//! Colormaps for pseudocolor rendering of gridded fields.

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Cells without a finite value.
pub const MISSING_COLOR: Color = Color::rgb(211, 211, 211);

/// Linear blend of two colors, `t` clamped to `[0, 1]`.
pub fn interpolate_color(from: Color, to: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Color::new(
        mix(from.r, to.r),
        mix(from.g, to.g),
        mix(from.b, to.b),
        mix(from.a, to.a),
    )
}

/// Wind speed scale in m/s.
pub fn wind_speed_color(speed_ms: f32) -> Color {
    // 0 calm gray, 5 light cyan, 10 yellow, 15 orange, 20+ dark red
    match speed_ms {
        s if s < 0.0 => Color::rgb(200, 200, 200),
        s if s < 5.0 => interpolate_color(Color::rgb(200, 200, 200), Color::rgb(0, 200, 255), s / 5.0),
        s if s < 10.0 => interpolate_color(
            Color::rgb(0, 200, 255),
            Color::rgb(255, 255, 0),
            (s - 5.0) / 5.0,
        ),
        s if s < 15.0 => interpolate_color(
            Color::rgb(255, 255, 0),
            Color::rgb(255, 165, 0),
            (s - 10.0) / 5.0,
        ),
        s if s < 20.0 => interpolate_color(
            Color::rgb(255, 165, 0),
            Color::rgb(139, 0, 0),
            (s - 15.0) / 5.0,
        ),
        _ => Color::rgb(75, 0, 0),
    }
}

/// Samples of matplotlib's viridis at eighths.
const VIRIDIS: [Color; 9] = [
    Color::rgb(68, 1, 84),
    Color::rgb(71, 44, 122),
    Color::rgb(59, 81, 139),
    Color::rgb(44, 113, 142),
    Color::rgb(33, 144, 141),
    Color::rgb(39, 173, 129),
    Color::rgb(92, 200, 99),
    Color::rgb(170, 220, 50),
    Color::rgb(253, 231, 37),
];

/// Viridis at `t` in `[0, 1]`.
pub fn viridis_color(t: f32) -> Color {
    let scaled = t.clamp(0.0, 1.0) * (VIRIDIS.len() - 1) as f32;
    let lower = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    interpolate_color(VIRIDIS[lower], VIRIDIS[lower + 1], scaled - lower as f32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    /// Physical wind speed ramp; values are used in m/s.
    WindSpeed,
    /// Perceptually uniform, stretched over the data range.
    Viridis,
}

impl Colormap {
    /// Colormap for a derived field, by field name.
    pub fn for_field(name: &str) -> Self {
        if name.starts_with("wind_speed") {
            Colormap::WindSpeed
        } else {
            Colormap::Viridis
        }
    }

    /// Color for `value` with the data spanning `[min, max]`.
    pub fn color(self, value: f32, min: f32, max: f32) -> Color {
        if !value.is_finite() {
            return MISSING_COLOR;
        }
        match self {
            Colormap::WindSpeed => wind_speed_color(value),
            Colormap::Viridis => viridis_color(normalize(value, min, max)),
        }
    }
}

fn normalize(value: f32, min: f32, max: f32) -> f32 {
    let range = max - min;
    if range.abs() < f32::EPSILON {
        0.5
    } else {
        ((value - min) / range).clamp(0.0, 1.0)
    }
}

/// Color a row-major grid into RGBA bytes, one pixel per cell.
pub fn render_grid(data: &[f32], min: f32, max: f32, colormap: Colormap) -> Vec<u8> {
    data.iter()
        .flat_map(|&v| colormap.color(v, min, max).to_rgba())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_endpoints() {
        let a = Color::rgb(0, 0, 0);
        let b = Color::rgb(200, 100, 50);
        assert_eq!(interpolate_color(a, b, 0.0), a);
        assert_eq!(interpolate_color(a, b, 1.0), b);
        assert_eq!(interpolate_color(a, b, 0.5), Color::rgb(100, 50, 25));
        assert_eq!(interpolate_color(a, b, 7.0), b);
    }

    #[test]
    fn test_wind_speed_bands() {
        assert_eq!(wind_speed_color(0.0), Color::rgb(200, 200, 200));
        assert_eq!(wind_speed_color(10.0), Color::rgb(255, 255, 0));
        assert_eq!(wind_speed_color(40.0), Color::rgb(75, 0, 0));
    }

    #[test]
    fn test_viridis_ends() {
        assert_eq!(viridis_color(0.0), VIRIDIS[0]);
        assert_eq!(viridis_color(1.0), VIRIDIS[8]);
        assert_eq!(viridis_color(-3.0), VIRIDIS[0]);
    }

    #[test]
    fn test_nan_is_light_gray() {
        for cmap in [Colormap::WindSpeed, Colormap::Viridis] {
            assert_eq!(cmap.color(f32::NAN, 0.0, 1.0), MISSING_COLOR);
        }
    }

    #[test]
    fn test_constant_field_uses_mid_color() {
        assert_eq!(
            Colormap::Viridis.color(3.0, 3.0, 3.0),
            viridis_color(0.5)
        );
    }

    #[test]
    fn test_for_field() {
        assert_eq!(Colormap::for_field("wind_speed_10m"), Colormap::WindSpeed);
        assert_eq!(Colormap::for_field("emiss"), Colormap::Viridis);
    }

    #[test]
    fn test_render_grid_layout() {
        let px = render_grid(&[0.0, f32::NAN], 0.0, 1.0, Colormap::Viridis);
        assert_eq!(px.len(), 8);
        assert_eq!(&px[..4], &VIRIDIS[0].to_rgba());
        assert_eq!(&px[4..], &MISSING_COLOR.to_rgba());
    }
}
