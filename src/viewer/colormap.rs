//! Colormap definitions and application logic.

/// Colormaps used by the figure panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    /// Grayscale - black to white.
    Gray,
    /// Jet - blue to cyan to yellow to red.
    Jet,
    /// Viridis (approximate) - blue to teal to green to yellow.
    Viridis,
}

impl std::fmt::Display for Colormap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Colormap::Gray => write!(f, "gray"),
            Colormap::Jet => write!(f, "jet"),
            Colormap::Viridis => write!(f, "viridis"),
        }
    }
}

/// Convert f32 to u8 with clamping to [0, 255].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn f32_to_u8(value: f32) -> u8 {
    let clamped = value.clamp(0.0, 255.0);
    clamped.round() as u8
}

impl Colormap {
    /// Apply the colormap to a normalized value [0, 1] and return RGBA bytes.
    #[must_use]
    pub fn apply(self, val: f32) -> [u8; 4] {
        let val = val.clamp(0.0, 1.0);
        match self {
            Colormap::Gray => {
                let v = f32_to_u8(val * 255.0);
                [v, v, v, 255]
            }
            Colormap::Jet => {
                let channel = |offset: f32| f32_to_u8(255.0 * (1.5 - (4.0 * val - offset).abs()));
                [channel(3.0), channel(2.0), channel(1.0), 255]
            }
            Colormap::Viridis => {
                let r = f32_to_u8(255.0 * val.powf(2.0));
                let g = f32_to_u8(255.0 * val);
                let b = f32_to_u8(255.0 * (1.0 - val));
                [r, g, b, 255]
            }
        }
    }

    /// Map a raw value into the `[vmin, vmax]` stretch and colour it.
    ///
    /// Non-finite values, and anything when the bounds themselves are
    /// unusable, come back fully transparent.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn map(self, value: f64, vmin: f64, vmax: f64) -> [u8; 4] {
        if !value.is_finite() || !vmin.is_finite() || !vmax.is_finite() {
            return [0, 0, 0, 0];
        }
        let span = vmax - vmin;
        let t = if span > 0.0 {
            (value - vmin) / span
        } else {
            0.0
        };
        self.apply(t as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_endpoints() {
        assert_eq!(Colormap::Gray.apply(0.0), [0, 0, 0, 255]);
        assert_eq!(Colormap::Gray.apply(1.0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_jet_runs_blue_to_red() {
        let low = Colormap::Jet.apply(0.0);
        let mid = Colormap::Jet.apply(0.5);
        let high = Colormap::Jet.apply(1.0);
        assert_eq!(low, [0, 0, 128, 255]);
        assert_eq!(mid[1], 255);
        assert_eq!(high, [128, 0, 0, 255]);
    }

    #[test]
    fn test_map_clamps_outside_stretch() {
        assert_eq!(Colormap::Gray.map(-5.0, 0.0, 10.0), [0, 0, 0, 255]);
        assert_eq!(Colormap::Gray.map(50.0, 0.0, 10.0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_map_non_finite_is_transparent() {
        assert_eq!(Colormap::Jet.map(f64::NAN, 0.0, 1.0), [0, 0, 0, 0]);
        assert_eq!(Colormap::Jet.map(f64::NEG_INFINITY, 0.0, 1.0), [0, 0, 0, 0]);
        assert_eq!(Colormap::Jet.map(0.5, f64::NAN, f64::NAN), [0, 0, 0, 0]);
    }

    #[test]
    fn test_map_with_flat_bounds() {
        assert_eq!(Colormap::Gray.map(3.0, 3.0, 3.0), [0, 0, 0, 255]);
    }
}
