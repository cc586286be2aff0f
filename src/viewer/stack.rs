use ndarray::{Array2, Axis};

use super::{finite_bounds, Colormap, SliderSpec, ViewerError};
use crate::data::model::{basename, InputStacks};

/// Percentiles used for the linear contrast stretch of the SLC intensity.
pub const STRETCH_PERCENTILES: (f64, f64) = (2.0, 98.0);

// ---------------------------------------------------------------------------
// Panel contents
// ---------------------------------------------------------------------------

/// One image panel of the stack triptych.
#[derive(Debug, Clone)]
pub struct StackPanel {
    pub title: String,
    pub image: Array2<f64>,
    pub colormap: Colormap,
    /// Colour stretch `(vmin, vmax)`.
    pub bounds: (f64, f64),
}

/// Everything displayed for one slider position.
#[derive(Debug, Clone)]
pub struct StackFrame {
    pub slider_value: i64,
    pub amplitude: StackPanel,
    pub phase: StackPanel,
    pub wavenumber: StackPanel,
}

// ---------------------------------------------------------------------------
// StackViewer
// ---------------------------------------------------------------------------

/// Browses the SLC, phase and wavenumber stacks one frame at a time.
///
/// The slider starts at 1, so frame 0 is never shown, and the phase and
/// wavenumber titles name the file one position behind the SLC title.
pub struct StackViewer {
    stacks: InputStacks,
    slider: SliderSpec,
    slider_value: i64,
    frame: Option<StackFrame>,
    revision: u64,
}

impl StackViewer {
    /// Build the viewer. Labels and stacks are not cross-validated; any
    /// mismatch shows up as an error from [`StackViewer::on_slide`].
    pub fn new(stacks: InputStacks) -> Self {
        let slider = SliderSpec {
            label: "file number",
            min: 1,
            max: stacks.slc_files.len() as i64 - 1,
            step: 1,
        };
        log::info!(
            "stack viewer over {} files and {} frames, slider {}..={}",
            stacks.slc_files.len(),
            stacks.n_frames(),
            slider.min,
            slider.max
        );
        Self {
            stacks,
            slider,
            slider_value: slider.min,
            frame: None,
            revision: 0,
        }
    }

    pub fn slider(&self) -> SliderSpec {
        self.slider
    }

    /// Slider value of the frame on display.
    pub fn slider_value(&self) -> i64 {
        self.slider_value
    }

    /// The frame currently on display, if the slider has fired yet.
    pub fn frame(&self) -> Option<&StackFrame> {
        self.frame.as_ref()
    }

    /// Bumped every time the panels are redrawn.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Resolve the displayed file names for slider value `h`:
    /// SLC at `h`, phase and wavenumber at `h - 1`.
    pub fn labels_for(&self, h: i64) -> Result<(String, String, String), ViewerError> {
        let slc = ViewerError::check_index("slc label", h, self.stacks.slc_files.len())?;
        let phase = ViewerError::check_index("phase label", h - 1, self.stacks.phase_files.len())?;
        let kz = ViewerError::check_index("wavenumber label", h - 1, self.stacks.kz_files.len())?;
        Ok((
            basename(&self.stacks.slc_files[slc]),
            basename(&self.stacks.phase_files[phase]),
            basename(&self.stacks.kz_files[kz]),
        ))
    }

    /// Redraw all three panels for slider value `h`.
    ///
    /// On error nothing on display changes.
    pub fn on_slide(&mut self, h: i64) -> Result<(), ViewerError> {
        let (slc_name, phase_name, kz_name) = self.labels_for(h)?;

        let slc_frame = ViewerError::check_index("slc frame", h, self.stacks.slc.dim().2)?;
        let phase_frame = ViewerError::check_index("phase frame", h, self.stacks.phase.dim().2)?;
        let kz_frame = ViewerError::check_index("wavenumber frame", h, self.stacks.kz.dim().2)?;

        // 10 * log10(|slc|); zero pixels become -inf and are left in place.
        let amp_log = self
            .stacks
            .slc
            .index_axis(Axis(2), slc_frame)
            .mapv(|z| 10.0 * z.norm().log10());
        let stretch = percentile_bounds(amp_log.iter().copied(), STRETCH_PERCENTILES);

        let phase = self.stacks.phase.index_axis(Axis(2), phase_frame).mapv(f64::abs);
        let kz = self.stacks.kz.index_axis(Axis(2), kz_frame).mapv(f64::abs);
        let phase_bounds = finite_bounds(phase.iter());
        let kz_bounds = finite_bounds(kz.iter());

        log::debug!("stack slider at {h}: {slc_name}, stretch {stretch:?}");

        self.frame = Some(StackFrame {
            slider_value: h,
            amplitude: StackPanel {
                title: format!("SLC intensity: {slc_name}"),
                image: amp_log,
                colormap: Colormap::Gray,
                bounds: stretch,
            },
            phase: StackPanel {
                title: format!("phase: {phase_name}"),
                image: phase,
                colormap: Colormap::Viridis,
                bounds: phase_bounds,
            },
            wavenumber: StackPanel {
                title: format!("wavenumber: {kz_name}"),
                image: kz,
                colormap: Colormap::Viridis,
                bounds: kz_bounds,
            },
        });
        self.slider_value = h;
        self.revision += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Percentiles
// ---------------------------------------------------------------------------

/// Low and high percentiles with linear interpolation between ranks.
///
/// A NaN anywhere yields NaN bounds and infinities sort to the ends, which
/// leaves the image blank or washed out rather than failing.
pub fn percentile_bounds(values: impl Iterator<Item = f64>, (low, high): (f64, f64)) -> (f64, f64) {
    let mut sorted: Vec<f64> = values.collect();
    if sorted.is_empty() || sorted.iter().any(|v| v.is_nan()) {
        return (f64::NAN, f64::NAN);
    }
    sorted.sort_by(f64::total_cmp);
    (percentile_of_sorted(&sorted, low), percentile_of_sorted(&sorted, high))
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn percentile_of_sorted(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64 / 100.0;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    if frac == 0.0 || sorted[lo] == sorted[hi] {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array3;
    use num_complex::Complex64;

    use super::*;

    fn labels(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("/data/{prefix}_{i:02}.tif")).collect()
    }

    fn stacks(n: usize) -> InputStacks {
        InputStacks {
            slc_files: labels("slc", n),
            phase_files: labels("phase", n),
            kz_files: labels("kz", n),
            slc: Array3::from_shape_fn((4, 5, n), |(r, c, f)| {
                Complex64::new(1.0 + (r * 5 + c) as f64, f as f64)
            }),
            phase: Array3::from_shape_fn((4, 5, n), |(r, _, f)| -(r as f64) - f as f64),
            kz: Array3::from_shape_fn((4, 5, n), |(_, c, f)| c as f64 * 0.1 - f as f64),
        }
    }

    #[test]
    fn test_slider_skips_index_zero() {
        let viewer = StackViewer::new(stacks(6));
        let slider = viewer.slider();
        assert_eq!((slider.min, slider.max, slider.step), (1, 5, 1));
        assert_eq!(viewer.slider_value(), 1);
    }

    #[test]
    fn test_labels_lag_by_one_for_phase_and_kz() {
        let viewer = StackViewer::new(stacks(6));
        for h in viewer.slider().min..=viewer.slider().max {
            let (slc, phase, kz) = viewer.labels_for(h).unwrap();
            assert_eq!(slc, format!("slc_{h:02}.tif"));
            assert_eq!(phase, format!("phase_{:02}.tif", h - 1));
            assert_eq!(kz, format!("kz_{:02}.tif", h - 1));
        }
    }

    #[test]
    fn test_on_slide_sets_titles_and_images() {
        let mut viewer = StackViewer::new(stacks(4));
        viewer.on_slide(2).unwrap();

        let frame = viewer.frame().unwrap();
        assert_eq!(frame.slider_value, 2);
        assert_eq!(frame.amplitude.title, "SLC intensity: slc_02.tif");
        assert_eq!(frame.phase.title, "phase: phase_01.tif");
        assert_eq!(frame.wavenumber.title, "wavenumber: kz_01.tif");

        // Images come from frame h of every stack.
        let expected = 10.0 * Complex64::new(1.0, 2.0).norm().log10();
        assert!((frame.amplitude.image[[0, 0]] - expected).abs() < 1e-12);
        assert_eq!(frame.phase.image[[3, 0]], 5.0);
        assert!((frame.wavenumber.image[[0, 4]] - 1.6).abs() < 1e-12);
        assert_eq!(frame.amplitude.colormap, Colormap::Gray);
    }

    #[test]
    fn test_redraw_replaces_previous_frame() {
        let mut viewer = StackViewer::new(stacks(4));
        viewer.on_slide(1).unwrap();
        let first = viewer.revision();
        viewer.on_slide(3).unwrap();
        assert_eq!(viewer.frame().unwrap().slider_value, 3);
        assert_eq!(viewer.slider_value(), 3);
        assert!(viewer.revision() > first);
    }

    #[test]
    fn test_amplitude_stretch_uses_percentiles() {
        let mut viewer = StackViewer::new(stacks(3));
        viewer.on_slide(1).unwrap();
        let frame = viewer.frame().unwrap();
        let (lo, hi) = frame.amplitude.bounds;
        let (min, max) = finite_bounds(frame.amplitude.image.iter());
        assert!(lo > min && lo < hi && hi < max);
    }

    #[test]
    fn test_zero_magnitude_pixels_do_not_fail() {
        let mut s = stacks(3);
        s.slc.fill(Complex64::new(0.0, 0.0));
        let mut viewer = StackViewer::new(s);
        viewer.on_slide(1).unwrap();
        let frame = viewer.frame().unwrap();
        assert!(frame.amplitude.image[[0, 0]].is_infinite());
        assert_eq!(frame.amplitude.bounds, (f64::NEG_INFINITY, f64::NEG_INFINITY));
    }

    #[test]
    fn test_short_stack_surfaces_index_error() {
        let mut s = stacks(3);
        s.slc_files.push("/data/extra.tif".into());
        s.phase_files.push("/data/extra.tif".into());
        s.kz_files.push("/data/extra.tif".into());
        let mut viewer = StackViewer::new(s);
        viewer.on_slide(1).unwrap();

        let err = viewer.on_slide(3).unwrap_err();
        assert_eq!(
            err,
            ViewerError::IndexOutOfRange {
                axis: "slc frame",
                index: 3,
                len: 3
            }
        );
        assert_eq!(viewer.frame().unwrap().slider_value, 1);
        assert_eq!(viewer.slider_value(), 1);
    }

    #[test]
    fn test_percentile_interpolates_like_numpy() {
        let values = (1..=101).map(f64::from);
        assert_eq!(percentile_bounds(values, (2.0, 98.0)), (3.0, 99.0));

        let values = [1.0, 2.0, 3.0, 4.0].into_iter();
        let (lo, hi) = percentile_bounds(values, (2.0, 98.0));
        assert!((lo - 1.06).abs() < 1e-12);
        assert!((hi - 3.94).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_with_nan_is_nan() {
        let (lo, hi) = percentile_bounds([1.0, f64::NAN, 3.0].into_iter(), (2.0, 98.0));
        assert!(lo.is_nan() && hi.is_nan());
    }
}
