use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// Number of colours profile lines cycle through.
pub const LINE_CYCLE: usize = 10;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Line colours: n-th drawn profile → Color32
// ---------------------------------------------------------------------------

/// Cycles a fixed palette over successively drawn lines.
#[derive(Debug, Clone)]
pub struct LineColors {
    palette: Vec<Color32>,
}

impl Default for LineColors {
    fn default() -> Self {
        Self {
            palette: generate_palette(LINE_CYCLE),
        }
    }
}

impl LineColors {
    /// Colour of the `i`-th line on a panel.
    pub fn color_for(&self, i: usize) -> Color32 {
        self.palette[i % self.palette.len()]
    }
}
