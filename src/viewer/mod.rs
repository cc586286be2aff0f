//! Render-independent viewer components.
//!
//! Each component owns its data, the state of its bound controls and the
//! contents of its figure panels. The `ui` layer draws that state with egui
//! and forwards slider changes and clicks back to the component.

mod colormap;
mod error;
mod stack;
mod texture;
mod volume;

pub use colormap::Colormap;
pub use error::ViewerError;
pub use stack::{StackFrame, StackPanel, StackViewer};
pub use texture::{colorbar_image, generate_image, Origin, TextureSlot};
pub use volume::{ClickEvent, HeightTick, PanelId, SliceImage, VolumeExplorer};

/// Integer slider bounds bound to a component callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderSpec {
    pub label: &'static str,
    pub min: i64,
    pub max: i64,
    pub step: i64,
}

/// Title and axis labels of one figure panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxesText {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

/// Minimum and maximum over the finite values of `values`.
///
/// Falls back to `(0.0, 1.0)` when nothing is finite.
pub fn finite_bounds<'a>(values: impl IntoIterator<Item = &'a f64>) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        (0.0, 1.0)
    } else {
        (lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_bounds_skips_non_finite() {
        let values = [f64::NEG_INFINITY, 2.0, f64::NAN, -1.0, 7.5];
        assert_eq!(finite_bounds(&values), (-1.0, 7.5));
    }

    #[test]
    fn test_finite_bounds_without_finite_values() {
        let values = [f64::NAN, f64::INFINITY];
        assert_eq!(finite_bounds(&values), (0.0, 1.0));
    }
}
