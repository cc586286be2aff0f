use ndarray::{s, Array2, Array3, ArrayView2, Axis};

use super::{finite_bounds, AxesText, Colormap, SliderSpec, ViewerError};

/// Step of the inversion height slider.
pub const HEIGHT_STEP: i64 = 10;

// ---------------------------------------------------------------------------
// Event and coordinate types
// ---------------------------------------------------------------------------

/// The four panels of the tomography figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelId {
    HorizontalSlice,
    VerticalProfile,
    RangeSlice,
    AzimuthSlice,
}

/// Integer image position on the horizontal slice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelCoord {
    pub range: usize,
    pub azimuth: usize,
}

/// A pointer press on the figure.
///
/// `panel` is the panel under the pointer (`None` outside every panel) and
/// `x`, `y` are in that panel's image coordinates: column and row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickEvent {
    pub panel: Option<PanelId>,
    pub x: f64,
    pub y: f64,
}

// ---------------------------------------------------------------------------
// Panel contents
// ---------------------------------------------------------------------------

/// A colour-mapped 2-D image with its stretch.
#[derive(Debug, Clone)]
pub struct SliceImage {
    pub image: Array2<f64>,
    pub colormap: Colormap,
    pub bounds: (f64, f64),
}

impl SliceImage {
    fn jet(image: Array2<f64>) -> Self {
        let bounds = finite_bounds(image.iter());
        Self {
            image,
            colormap: Colormap::Jet,
            bounds,
        }
    }

    /// Value at fractional `(row, col)`, truncated to the containing element.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn value_at(&self, row: f64, col: f64) -> Option<f64> {
        if row < 0.0 || col < 0.0 {
            return None;
        }
        self.image.get((row as usize, col as usize)).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Colorbar {
    pub label: String,
    pub colormap: Colormap,
    pub bounds: (f64, f64),
}

/// One image layer of the horizontal slice panel.
#[derive(Debug, Clone)]
pub struct SliceLayer {
    /// Physical height of the slice.
    pub height: i64,
    /// Height index into the volume.
    pub index: usize,
    pub slice: SliceImage,
    pub colorbar: Option<Colorbar>,
}

#[derive(Debug, Default)]
struct HorizontalPanel {
    axes: AxesText,
    layers: Vec<SliceLayer>,
    crosshair: Option<PixelCoord>,
    revision: u64,
}

/// A vertical profile drawn on the profile panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileLine {
    pub label: String,
    pub source: PixelCoord,
    /// Reflectivity, lowest height first.
    pub reflectivity: Vec<f64>,
    /// Physical height of every sample.
    pub heights: Vec<f64>,
}

#[derive(Debug, Default)]
struct ProfilePanel {
    axes: AxesText,
    y_limits: (f64, f64),
    lines: Vec<ProfileLine>,
    legend: Option<Vec<String>>,
}

#[derive(Debug)]
struct SlicePanel {
    title: String,
    x_limits: (f64, f64),
    slice: Option<SliceImage>,
    revision: u64,
}

impl SlicePanel {
    fn new(width: usize) -> Self {
        Self {
            title: String::new(),
            x_limits: (0.0, width as f64),
            slice: None,
            revision: 0,
        }
    }
}

/// A y-axis tick of the range and azimuth slice panels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightTick {
    /// Row position in the rotated slice image.
    pub position: f64,
    /// Physical height shown at that position.
    pub label: i64,
}

// ---------------------------------------------------------------------------
// VolumeExplorer
// ---------------------------------------------------------------------------

/// Explores a reflectivity volume through a horizontal slice, stacked
/// vertical profiles and range/azimuth slices through a clicked point.
///
/// Heights run from `-H` to `H` with `H = n_height / 2`; height index 0 is
/// the top of the volume, so physical height `h` lives at index `H - h`.
pub struct VolumeExplorer {
    absolute: Array3<f64>,
    normalized: Array3<f64>,
    half_height: i64,
    slider: SliderSpec,
    slider_value: i64,
    /// Bound "stack vertical profiles" checkbox.
    pub stack_profiles: bool,
    horizontal: HorizontalPanel,
    profile: ProfilePanel,
    range_slice: SlicePanel,
    azimuth_slice: SlicePanel,
    height_ticks: Vec<HeightTick>,
}

impl VolumeExplorer {
    /// Build the explorer; both volumes must share one `[azimuth, range, height]` shape.
    pub fn new(absolute: Array3<f64>, normalized: Array3<f64>) -> Result<Self, ViewerError> {
        if absolute.shape() != normalized.shape() {
            let (a0, a1, a2) = absolute.dim();
            let (n0, n1, n2) = normalized.dim();
            return Err(ViewerError::ShapeMismatch {
                absolute: [a0, a1, a2],
                normalized: [n0, n1, n2],
            });
        }

        let (n_azimuth, n_range, n_height) = absolute.dim();
        let half_height = (n_height / 2) as i64;
        let slider = SliderSpec {
            label: "inversion height",
            min: -half_height,
            max: half_height,
            step: HEIGHT_STEP,
        };

        let mut explorer = Self {
            absolute,
            normalized,
            half_height,
            slider,
            slider_value: 0,
            stack_profiles: true,
            horizontal: HorizontalPanel::default(),
            profile: ProfilePanel::default(),
            range_slice: SlicePanel::new(n_range),
            azimuth_slice: SlicePanel::new(n_azimuth),
            height_ticks: height_ticks(half_height),
        };
        explorer.clear_vertical_plot();

        log::info!(
            "volume explorer over {n_azimuth}×{n_range}×{n_height} voxels, heights ±{half_height}"
        );
        Ok(explorer)
    }

    /// `[azimuth, range, height]` extent of the volume.
    pub fn shape(&self) -> [usize; 3] {
        let (a, r, h) = self.absolute.dim();
        [a, r, h]
    }

    pub fn half_height(&self) -> i64 {
        self.half_height
    }

    pub fn slider(&self) -> SliderSpec {
        self.slider
    }

    /// Height of the slice on display.
    pub fn slider_value(&self) -> i64 {
        self.slider_value
    }

    /// Array index of physical height `h`.
    pub fn height_to_index(&self, h: i64) -> i64 {
        self.half_height - h
    }

    // -- horizontal slice --

    /// Show the horizontal slice at physical height `h`.
    ///
    /// The new image replaces the previous one together with its colorbar.
    pub fn on_slide(&mut self, h: i64) -> Result<(), ViewerError> {
        let index =
            ViewerError::check_index("height", self.height_to_index(h), self.shape()[2])?;
        let slice = SliceImage::jet(self.normalized.index_axis(Axis(2), index).to_owned());

        self.horizontal.axes = AxesText {
            title: format!("horizontal slice at height {h} m"),
            x_label: "range".into(),
            y_label: "azimuth".into(),
        };
        self.horizontal.layers.push(SliceLayer {
            height: h,
            index,
            slice,
            colorbar: None,
        });
        if self.horizontal.layers.len() > 1 {
            self.horizontal.layers.remove(0);
        }
        if let Some(layer) = self.horizontal.layers.last_mut() {
            layer.colorbar = Some(Colorbar {
                label: "reflectivity".into(),
                colormap: layer.slice.colormap,
                bounds: layer.slice.bounds,
            });
        }
        self.horizontal.revision += 1;
        self.slider_value = h;

        log::debug!("horizontal slice at height {h} (index {index})");
        Ok(())
    }

    pub fn horizontal_axes(&self) -> &AxesText {
        &self.horizontal.axes
    }

    pub fn horizontal_layers(&self) -> &[SliceLayer] {
        &self.horizontal.layers
    }

    /// The image currently on top of the horizontal slice panel.
    pub fn horizontal_slice(&self) -> Option<&SliceLayer> {
        self.horizontal.layers.last()
    }

    /// The single live colorbar of the horizontal slice panel.
    pub fn colorbar(&self) -> Option<&Colorbar> {
        self.horizontal.layers.last().and_then(|l| l.colorbar.as_ref())
    }

    pub fn horizontal_revision(&self) -> u64 {
        self.horizontal.revision
    }

    pub fn crosshair(&self) -> Option<PixelCoord> {
        self.horizontal.crosshair
    }

    // -- clicks --

    /// Handle a pointer press. Only presses on the horizontal slice do
    /// anything; they return the picked pixel.
    ///
    /// On error nothing on display changes.
    pub fn on_click(&mut self, event: ClickEvent) -> Result<Option<PixelCoord>, ViewerError> {
        if event.panel != Some(PanelId::HorizontalSlice) {
            return Ok(None);
        }

        let [n_azimuth, n_range, _] = self.shape();
        #[allow(clippy::cast_possible_truncation)]
        let (rg, az) = (event.x.trunc() as i64, event.y.trunc() as i64);
        let range = ViewerError::check_index("range", rg, n_range)?;
        let azimuth = ViewerError::check_index("azimuth", az, n_azimuth)?;
        let source = PixelCoord { range, azimuth };

        self.reset_crosshair(source);

        let reflectivity: Vec<f64> = self
            .absolute
            .slice(s![azimuth, range, ..])
            .iter()
            .rev()
            .copied()
            .collect();
        let heights = (0..reflectivity.len())
            .map(|i| i as f64 - self.half_height as f64)
            .collect();
        let range_view = rot90(self.normalized.index_axis(Axis(0), azimuth));
        let azimuth_view = rot90(self.normalized.index_axis(Axis(1), range));

        if !self.stack_profiles {
            self.clear_vertical_plot();
        }

        let label = format!("rg: {range:03}; az: {azimuth:03}");
        log::debug!("vertical profile {label}");
        self.profile.lines.push(ProfileLine {
            label,
            source,
            reflectivity,
            heights,
        });
        self.profile.legend = Some(self.profile.lines.iter().map(|l| l.label.clone()).collect());

        self.range_slice.title = format!("range slice at azimuth line {azimuth}");
        self.range_slice.slice = Some(SliceImage::jet(range_view));
        self.range_slice.revision += 1;

        self.azimuth_slice.title = format!("azimuth slice at range line {range}");
        self.azimuth_slice.slice = Some(SliceImage::jet(azimuth_view));
        self.azimuth_slice.revision += 1;

        Ok(Some(source))
    }

    /// Move the crosshair to `coord`.
    pub fn reset_crosshair(&mut self, coord: PixelCoord) {
        self.horizontal.crosshair = Some(coord);
    }

    // -- vertical profile panel --

    /// Reset the profile panel to its empty initial state.
    pub fn clear_vertical_plot(&mut self) {
        self.profile.lines.clear();
        self.profile.legend = None;
        self.profile.axes = AxesText {
            title: "vertical point profiles".into(),
            x_label: "reflectivity".into(),
            y_label: "height [m]".into(),
        };
        let h = self.half_height as f64;
        self.profile.y_limits = (-h, h);
    }

    pub fn profile_axes(&self) -> &AxesText {
        &self.profile.axes
    }

    pub fn profile_lines(&self) -> &[ProfileLine] {
        &self.profile.lines
    }

    pub fn profile_y_limits(&self) -> (f64, f64) {
        self.profile.y_limits
    }

    /// Legend entries, rebuilt after every drawn profile.
    pub fn legend(&self) -> Option<&[String]> {
        self.profile.legend.as_deref()
    }

    // -- range / azimuth slices --

    pub fn range_slice(&self) -> Option<&SliceImage> {
        self.range_slice.slice.as_ref()
    }

    pub fn range_slice_title(&self) -> &str {
        &self.range_slice.title
    }

    pub fn range_slice_x_limits(&self) -> (f64, f64) {
        self.range_slice.x_limits
    }

    pub fn range_slice_revision(&self) -> u64 {
        self.range_slice.revision
    }

    pub fn azimuth_slice(&self) -> Option<&SliceImage> {
        self.azimuth_slice.slice.as_ref()
    }

    pub fn azimuth_slice_title(&self) -> &str {
        &self.azimuth_slice.title
    }

    pub fn azimuth_slice_x_limits(&self) -> (f64, f64) {
        self.azimuth_slice.x_limits
    }

    pub fn azimuth_slice_revision(&self) -> u64 {
        self.azimuth_slice.revision
    }

    /// Height ticks shared by the range and azimuth slice panels.
    pub fn height_ticks(&self) -> &[HeightTick] {
        &self.height_ticks
    }

    // -- cursor readout --

    /// Cursor readout for a position in `panel`'s image coordinates.
    #[allow(clippy::cast_possible_truncation)]
    pub fn format_coord(&self, panel: PanelId, x: f64, y: f64) -> String {
        let h = self.half_height as f64;
        let value = |slice: Option<&SliceImage>, row: f64, col: f64| {
            slice
                .and_then(|s| s.value_at(row, col))
                .map(|v| format!("{v:.3}"))
                .unwrap_or_default()
        };

        match panel {
            PanelId::HorizontalSlice => format!(
                "range={}, azimuth={}, reflectivity={}",
                x as i64,
                y as i64,
                value(self.horizontal_slice().map(|l| &l.slice), y, x)
            ),
            PanelId::VerticalProfile => format!("reflectivity={x:.3}, height={}", y as i64),
            PanelId::RangeSlice => format!(
                "range={}, height={}, reflectivity={}",
                x as i64,
                (y - h) as i64,
                value(self.range_slice(), y, x)
            ),
            PanelId::AzimuthSlice => format!(
                "azimuth={}, height={}, reflectivity={}",
                x as i64,
                (y - h) as i64,
                value(self.azimuth_slice(), y, x)
            ),
        }
    }
}

/// Ticks at rows `0, H/2, H, 3H/2, 2H` labelled `-H, -H/2, 0, H/2, H`
/// (labels rounded down).
fn height_ticks(half_height: i64) -> Vec<HeightTick> {
    let h = half_height as f64;
    let labels = [
        -half_height,
        (-half_height).div_euclid(2),
        0,
        half_height.div_euclid(2),
        half_height,
    ];
    let positions = [0.0, h / 2.0, h, h + h / 2.0, h * 2.0];
    positions
        .into_iter()
        .zip(labels)
        .map(|(position, label)| HeightTick { position, label })
        .collect()
}

/// Rotate a 2-D view by 90° counter-clockwise: the last column becomes row 0.
fn rot90(view: ArrayView2<'_, f64>) -> Array2<f64> {
    view.t().slice(s![..;-1, ..]).to_owned()
}
