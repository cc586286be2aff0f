//! Texture generation for figure panels.

use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use ndarray::ArrayView2;

use super::Colormap;

/// Where row 0 of an image is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Row 0 at the top.
    Upper,
    /// Row 0 at the bottom.
    Lower,
}

/// Colour a 2-D array, one texel per element, stretched to `[vmin, vmax]`.
#[must_use]
pub fn generate_image(
    data: ArrayView2<'_, f64>,
    colormap: Colormap,
    (vmin, vmax): (f64, f64),
    origin: Origin,
) -> ColorImage {
    let (rows, cols) = data.dim();
    let mut pixels = Vec::with_capacity(rows * cols * 4);

    for y in 0..rows {
        let row = match origin {
            Origin::Upper => y,
            Origin::Lower => rows - 1 - y,
        };
        for x in 0..cols {
            pixels.extend_from_slice(&colormap.map(data[[row, x]], vmin, vmax));
        }
    }

    ColorImage::from_rgba_unmultiplied([cols, rows], &pixels)
}

/// A vertical colour ramp, maximum at the top, for drawing colorbars.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn colorbar_image(colormap: Colormap, steps: usize) -> ColorImage {
    let steps = steps.max(2);
    let pixels: Vec<u8> = (0..steps)
        .rev()
        .flat_map(|i| colormap.apply(i as f32 / (steps - 1) as f32))
        .collect();
    ColorImage::from_rgba_unmultiplied([1, steps], &pixels)
}

/// A GPU texture tagged with the revision of the panel it was built from.
#[derive(Default)]
pub struct TextureSlot {
    revision: Option<u64>,
    handle: Option<TextureHandle>,
}

impl TextureSlot {
    /// Return the cached texture, re-uploading it when `revision` moved on.
    pub fn get_or_load(
        &mut self,
        ctx: &egui::Context,
        name: &str,
        revision: u64,
        build: impl FnOnce() -> ColorImage,
    ) -> &TextureHandle {
        if self.revision != Some(revision) {
            self.handle = None;
            self.revision = Some(revision);
        }
        self.handle.get_or_insert_with(|| {
            log::debug!("uploading texture {name} (revision {revision})");
            ctx.load_texture(name, build(), TextureOptions::NEAREST)
        })
    }

    /// Drop the cached texture.
    pub fn clear(&mut self) {
        self.revision = None;
        self.handle = None;
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn test_generate_image_upper_origin() {
        let data = array![[0.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
        let img = generate_image(data.view(), Colormap::Gray, (0.0, 1.0), Origin::Upper);
        assert_eq!(img.size, [2, 3]);
        assert_eq!(img.pixels[1], egui::Color32::WHITE);
        assert_eq!(img.pixels[2], egui::Color32::WHITE);
        assert_eq!(img.pixels[0], egui::Color32::BLACK);
    }

    #[test]
    fn test_generate_image_lower_origin_flips_rows() {
        let data = array![[1.0, 1.0], [0.0, 0.0]];
        let img = generate_image(data.view(), Colormap::Gray, (0.0, 1.0), Origin::Lower);
        // Row 0 of the data ends up in the bottom texel row.
        assert_eq!(img.pixels[0], egui::Color32::BLACK);
        assert_eq!(img.pixels[2], egui::Color32::WHITE);
    }

    #[test]
    fn test_colorbar_image_max_on_top() {
        let img = colorbar_image(Colormap::Gray, 16);
        assert_eq!(img.size, [1, 16]);
        assert_eq!(img.pixels[0], egui::Color32::WHITE);
        assert_eq!(img.pixels[15], egui::Color32::BLACK);
    }
}
