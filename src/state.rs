use std::fmt;

use crate::color::LineColors;
use crate::data::model::Dataset;
use crate::viewer::{ClickEvent, StackViewer, TextureSlot, ViewerError, VolumeExplorer};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which component fills the central panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    Stacks,
    Tomography,
}

impl fmt::Display for ActiveView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveView::Stacks => write!(f, "Input stacks"),
            ActiveView::Tomography => write!(f, "Tomography"),
        }
    }
}

/// GPU textures of every image panel.
#[derive(Default)]
pub struct FigureTextures {
    pub amplitude: TextureSlot,
    pub phase: TextureSlot,
    pub wavenumber: TextureSlot,
    pub horizontal: TextureSlot,
    pub colorbar: TextureSlot,
    pub range_slice: TextureSlot,
    pub azimuth_slice: TextureSlot,
}

/// Slider positions the user is dragging but has not released yet.
#[derive(Debug, Default, Clone, Copy)]
pub struct SliderDrafts {
    pub stack: Option<i64>,
    pub height: Option<i64>,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Input stack viewer (None until stacks are loaded).
    pub stack_viewer: Option<StackViewer>,

    /// Tomography explorer (None until a volume is loaded).
    pub volume_explorer: Option<VolumeExplorer>,

    /// Component shown in the central panel.
    pub view: ActiveView,

    pub textures: FigureTextures,

    /// Colours of vertical profile lines.
    pub line_colors: LineColors,

    /// Cursor readout of the hovered tomography panel.
    pub hover_text: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    pub slider_drafts: SliderDrafts,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            stack_viewer: None,
            volume_explorer: None,
            view: ActiveView::Stacks,
            textures: FigureTextures::default(),
            line_colors: LineColors::default(),
            hover_text: None,
            status_message: None,
            slider_drafts: SliderDrafts::default(),
        }
    }
}

impl AppState {
    /// Views that have data behind them.
    pub fn available_views(&self) -> Vec<ActiveView> {
        let mut views = Vec::new();
        if self.stack_viewer.is_some() {
            views.push(ActiveView::Stacks);
        }
        if self.volume_explorer.is_some() {
            views.push(ActiveView::Tomography);
        }
        views
    }

    /// Ingest a newly loaded dataset, build its component and draw it once.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.status_message = None;
        self.slider_drafts = SliderDrafts::default();

        match dataset {
            Dataset::Stacks(stacks) => {
                let mut viewer = StackViewer::new(stacks);
                let initial = viewer.slider().min;
                let drawn = viewer.on_slide(initial);
                self.stack_viewer = Some(viewer);
                self.textures.amplitude.clear();
                self.textures.phase.clear();
                self.textures.wavenumber.clear();
                self.view = ActiveView::Stacks;
                self.report(drawn);
            }
            Dataset::Volume(volume) => {
                match VolumeExplorer::new(volume.absolute, volume.normalized) {
                    Ok(mut explorer) => {
                        let slider = explorer.slider();
                        let drawn = explorer.on_slide(0_i64.clamp(slider.min, slider.max));
                        self.volume_explorer = Some(explorer);
                        self.textures.horizontal.clear();
                        self.textures.colorbar.clear();
                        self.textures.range_slice.clear();
                        self.textures.azimuth_slice.clear();
                        self.hover_text = None;
                        self.view = ActiveView::Tomography;
                        self.report(drawn);
                    }
                    Err(e) => self.report(Err(e)),
                }
            }
        }
    }

    /// Position shown by the stack slider: the dragged value, else the
    /// value of the frame on display.
    pub fn stack_slider_value(&self) -> Option<i64> {
        let viewer = self.stack_viewer.as_ref()?;
        Some(self.slider_drafts.stack.unwrap_or(viewer.slider_value()))
    }

    /// Position shown by the height slider.
    pub fn height_slider_value(&self) -> Option<i64> {
        let explorer = self.volume_explorer.as_ref()?;
        Some(self.slider_drafts.height.unwrap_or(explorer.slider_value()))
    }

    /// Forward a stack slider change.
    pub fn slide_stack(&mut self, h: i64) {
        self.slider_drafts.stack = None;
        if let Some(viewer) = &mut self.stack_viewer {
            let result = viewer.on_slide(h);
            self.report(result);
        }
    }

    /// Forward a height slider change.
    pub fn slide_height(&mut self, h: i64) {
        self.slider_drafts.height = None;
        if let Some(explorer) = &mut self.volume_explorer {
            let result = explorer.on_slide(h);
            self.report(result);
        }
    }

    /// Forward a pointer press on the tomography figure.
    pub fn click(&mut self, event: ClickEvent) {
        if let Some(explorer) = &mut self.volume_explorer {
            let result = explorer.on_click(event).map(|_| ());
            self.report(result);
        }
    }

    /// Forward the "clear vertical plot" button.
    pub fn clear_vertical_plot(&mut self) {
        if let Some(explorer) = &mut self.volume_explorer {
            explorer.clear_vertical_plot();
        }
    }

    fn report(&mut self, result: Result<(), ViewerError>) {
        match result {
            Ok(()) => self.status_message = None,
            Err(e) => {
                log::warn!("{e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array3;
    use num_complex::Complex64;

    use super::*;
    use crate::data::model::{InputStacks, ReflectivityVolume};
    use crate::viewer::PanelId;

    fn volume(shape: (usize, usize, usize)) -> Dataset {
        Dataset::Volume(ReflectivityVolume {
            absolute: Array3::from_elem(shape, 1.0),
            normalized: Array3::from_elem(shape, 0.5),
        })
    }

    fn stacks(n: usize) -> Dataset {
        let files = |p: &str| -> Vec<String> { (0..n).map(|i| format!("{p}{i}.tif")).collect() };
        Dataset::Stacks(InputStacks {
            slc_files: files("slc"),
            phase_files: files("phase"),
            kz_files: files("kz"),
            slc: Array3::from_elem((2, 2, n), Complex64::new(1.0, 1.0)),
            phase: Array3::zeros((2, 2, n)),
            kz: Array3::zeros((2, 2, n)),
        })
    }

    #[test]
    fn test_volume_is_drawn_at_height_zero() {
        let mut state = AppState::default();
        state.set_dataset(volume((3, 3, 21)));

        let explorer = state.volume_explorer.as_ref().unwrap();
        let layer = explorer.horizontal_slice().unwrap();
        assert_eq!((layer.height, layer.index), (0, 10));
        assert_eq!(state.view, ActiveView::Tomography);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn test_stacks_are_drawn_at_slider_minimum() {
        let mut state = AppState::default();
        state.set_dataset(stacks(4));

        let frame = state.stack_viewer.as_ref().unwrap().frame().unwrap();
        assert_eq!(frame.slider_value, 1);
        assert_eq!(state.available_views(), vec![ActiveView::Stacks]);
    }

    #[test]
    fn test_mismatched_volume_keeps_previous_explorer() {
        let mut state = AppState::default();
        state.set_dataset(volume((3, 3, 5)));
        state.set_dataset(Dataset::Volume(ReflectivityVolume {
            absolute: Array3::zeros((10, 10, 8)),
            normalized: Array3::zeros((10, 10, 9)),
        }));

        assert_eq!(state.volume_explorer.as_ref().unwrap().shape(), [3, 3, 5]);
        assert!(state
            .status_message
            .as_deref()
            .unwrap()
            .contains("mismatch of input arrays"));
    }

    #[test]
    fn test_callbacks_are_forwarded() {
        let mut state = AppState::default();
        state.set_dataset(volume((3, 3, 5)));

        state.click(ClickEvent {
            panel: Some(PanelId::HorizontalSlice),
            x: 1.0,
            y: 2.0,
        });
        assert_eq!(
            state.volume_explorer.as_ref().unwrap().profile_lines().len(),
            1
        );

        state.clear_vertical_plot();
        assert!(state
            .volume_explorer
            .as_ref()
            .unwrap()
            .profile_lines()
            .is_empty());

        state.click(ClickEvent {
            panel: Some(PanelId::HorizontalSlice),
            x: 7.0,
            y: 0.0,
        });
        assert!(state.status_message.is_some());

        state.slide_height(2);
        assert!(state.status_message.is_none());
        assert_eq!(state.volume_explorer.as_ref().unwrap().slider_value(), 2);
    }

    #[test]
    fn test_rejected_slide_restores_committed_slider_value() {
        let mut state = AppState::default();
        // Eight heights: H = 4, so -4 maps past the last index.
        state.set_dataset(volume((3, 3, 8)));
        assert_eq!(state.height_slider_value(), Some(0));

        state.slider_drafts.height = Some(-4);
        assert_eq!(state.height_slider_value(), Some(-4));

        state.slide_height(-4);
        assert!(state.status_message.is_some());
        assert_eq!(state.slider_drafts.height, None);
        assert_eq!(state.height_slider_value(), Some(0));
        assert_eq!(
            state.volume_explorer.as_ref().unwrap().horizontal_slice().unwrap().height,
            0
        );
    }

    #[test]
    fn test_stack_slider_follows_displayed_frame() {
        let mut state = AppState::default();
        assert_eq!(state.stack_slider_value(), None);
        state.set_dataset(stacks(4));

        state.slider_drafts.stack = Some(3);
        state.slide_stack(3);
        assert_eq!(state.stack_slider_value(), Some(3));

        state.slide_stack(7);
        assert!(state.status_message.is_some());
        assert_eq!(state.stack_slider_value(), Some(3));
    }
}
