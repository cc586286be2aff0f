use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, TextStyle, TextureId, Ui};
use egui_extras::{Size, StripBuilder};
use egui_plot::{GridMark, HLine, Legend, Line, Plot, PlotImage, PlotPoint, PlotPoints, VLine};

use crate::color::LineColors;
use crate::state::{AppState, FigureTextures};
use crate::viewer::{
    colorbar_image, generate_image, ClickEvent, Colormap, HeightTick, Origin, PanelId,
    SliceImage, StackFrame, StackPanel, TextureSlot, VolumeExplorer,
};

const TITLE_SIZE: f32 = 12.0;
const CROSSHAIR_COLOR: Color32 = Color32::RED;
const COLORBAR_STEPS: usize = 256;

/// Pointer activity collected while drawing the tomography figure.
#[derive(Default)]
struct FigureEvents {
    click: Option<ClickEvent>,
    hover: Option<String>,
}

// ---------------------------------------------------------------------------
// Input stack triptych
// ---------------------------------------------------------------------------

/// Render the amplitude / phase / wavenumber triptych.
pub fn stack_figure(ui: &mut Ui, state: &mut AppState) {
    let AppState {
        stack_viewer,
        textures,
        ..
    } = state;
    let Some(viewer) = stack_viewer.as_ref() else {
        no_data_hint(ui);
        return;
    };
    let Some(frame) = viewer.frame() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("Move the file number slider to show a frame.");
        });
        return;
    };
    let revision = viewer.revision();

    StripBuilder::new(ui)
        .sizes(Size::remainder(), 3)
        .horizontal(|mut strip| {
            let FigureTextures {
                amplitude,
                phase,
                wavenumber,
                ..
            } = textures;
            let StackFrame {
                amplitude: amp_panel,
                phase: phase_panel,
                wavenumber: kz_panel,
                ..
            } = frame;
            strip.cell(|ui| stack_panel(ui, "amplitude", amp_panel, amplitude, revision));
            strip.cell(|ui| stack_panel(ui, "phase", phase_panel, phase, revision));
            strip.cell(|ui| stack_panel(ui, "wavenumber", kz_panel, wavenumber, revision));
        });
}

fn stack_panel(ui: &mut Ui, id: &str, panel: &StackPanel, slot: &mut TextureSlot, revision: u64) {
    let texture = slot
        .get_or_load(ui.ctx(), id, revision, || {
            generate_image(panel.image.view(), panel.colormap, panel.bounds, Origin::Upper)
        })
        .id();
    let (rows, cols) = panel.image.dim();

    ui.label(RichText::new(&panel.title).size(TITLE_SIZE));
    Plot::new(id)
        .data_aspect(1.0)
        .show_x(false)
        .show_y(false)
        .y_axis_formatter(upper_row_formatter(rows))
        .show(ui, |plot_ui| {
            plot_ui.image(upper_image(texture, rows, cols));
        });
}

// ---------------------------------------------------------------------------
// Tomography figure
// ---------------------------------------------------------------------------

/// Render the four-panel tomography figure and dispatch pointer presses.
pub fn tomography_figure(ui: &mut Ui, state: &mut AppState) {
    let AppState {
        volume_explorer,
        textures,
        line_colors,
        ..
    } = state;
    let Some(explorer) = volume_explorer.as_ref() else {
        no_data_hint(ui);
        return;
    };
    let mut events = FigureEvents::default();

    StripBuilder::new(ui)
        .size(Size::relative(0.5))
        .size(Size::relative(0.25))
        .size(Size::remainder())
        .vertical(|mut strip| {
            strip.strip(|builder| {
                builder.sizes(Size::remainder(), 2).horizontal(|mut strip| {
                    strip.cell(|ui| horizontal_slice(ui, explorer, textures, &mut events));
                    strip.cell(|ui| vertical_profile(ui, explorer, line_colors, &mut events));
                });
            });
            strip.cell(|ui| {
                slice_panel(
                    ui,
                    explorer,
                    PanelId::RangeSlice,
                    &mut textures.range_slice,
                    &mut events,
                );
            });
            strip.cell(|ui| {
                slice_panel(
                    ui,
                    explorer,
                    PanelId::AzimuthSlice,
                    &mut textures.azimuth_slice,
                    &mut events,
                );
            });
        });

    state.hover_text = events.hover;
    if let Some(event) = events.click {
        state.click(event);
    }
}

fn horizontal_slice(
    ui: &mut Ui,
    explorer: &VolumeExplorer,
    textures: &mut FigureTextures,
    events: &mut FigureEvents,
) {
    let axes = explorer.horizontal_axes();
    ui.label(RichText::new(&axes.title).size(TITLE_SIZE));

    let Some(layer) = explorer.horizontal_slice() else {
        return;
    };
    let [n_azimuth, n_range, _] = explorer.shape();
    let texture = textures
        .horizontal
        .get_or_load(ui.ctx(), "horizontal_slice", explorer.horizontal_revision(), || {
            generate_image(
                layer.slice.image.view(),
                layer.slice.colormap,
                layer.slice.bounds,
                Origin::Upper,
            )
        })
        .id();
    let crosshair = explorer.crosshair().unwrap_or_default();

    StripBuilder::new(ui)
        .size(Size::remainder())
        .size(Size::exact(70.0))
        .horizontal(|mut strip| {
            strip.cell(|ui| {
                let response = Plot::new("horizontal_slice")
                    .data_aspect(1.0)
                    .show_x(false)
                    .show_y(false)
                    .y_axis_formatter(upper_row_formatter(n_azimuth))
                    .x_axis_label(axes.x_label.as_str())
                    .y_axis_label(axes.y_label.as_str())
                    .show(ui, |plot_ui| {
                        plot_ui.image(upper_image(texture, n_azimuth, n_range));
                        plot_ui.hline(
                            HLine::new(n_azimuth as f64 - crosshair.azimuth as f64 - 0.5)
                                .color(CROSSHAIR_COLOR)
                                .width(1.0),
                        );
                        plot_ui.vline(
                            VLine::new(crosshair.range as f64 + 0.5)
                                .color(CROSSHAIR_COLOR)
                                .width(1.0),
                        );
                        plot_ui.pointer_coordinate()
                    });

                // Plot y grows upwards; image rows grow downwards.
                let pointer = response
                    .inner
                    .map(|p| (p.x, n_azimuth as f64 - p.y));
                if let Some((x, y)) = pointer {
                    if response.response.hovered() {
                        events.hover =
                            Some(explorer.format_coord(PanelId::HorizontalSlice, x, y));
                    }
                    if response.response.clicked() {
                        let inside = x >= 0.0
                            && y >= 0.0
                            && x < n_range as f64
                            && y < n_azimuth as f64;
                        events.click = Some(ClickEvent {
                            panel: inside.then_some(PanelId::HorizontalSlice),
                            x,
                            y,
                        });
                    }
                }
            });
            strip.cell(|ui| {
                if let Some(bar) = explorer.colorbar() {
                    colorbar(ui, &mut textures.colorbar, bar.colormap, bar.bounds, &bar.label);
                }
            });
        });
}

fn colorbar(ui: &mut Ui, slot: &mut TextureSlot, colormap: Colormap, (vmin, vmax): (f64, f64), label: &str) {
    let texture = slot
        .get_or_load(ui.ctx(), &format!("colorbar_{colormap}"), 0, || {
            colorbar_image(colormap, COLORBAR_STEPS)
        })
        .id();
    let span = if vmax > vmin { vmax - vmin } else { 1.0 };

    Plot::new("horizontal_slice_colorbar")
        .show_x(false)
        .show_y(false)
        .show_grid([false, true])
        .show_axes([false, true])
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .y_axis_label(label)
        .include_y(vmin)
        .include_y(vmin + span)
        .show(ui, |plot_ui| {
            plot_ui.image(PlotImage::new(
                texture,
                PlotPoint::new(0.5, vmin + span / 2.0),
                [1.0, span as f32],
            ));
        });
}

fn vertical_profile(
    ui: &mut Ui,
    explorer: &VolumeExplorer,
    line_colors: &LineColors,
    events: &mut FigureEvents,
) {
    let axes = explorer.profile_axes();
    let (y_min, y_max) = explorer.profile_y_limits();
    ui.label(RichText::new(&axes.title).size(TITLE_SIZE));

    let mut plot = Plot::new("vertical_profile")
        .show_x(false)
        .show_y(false)
        .x_axis_label(axes.x_label.as_str())
        .y_axis_label(axes.y_label.as_str())
        .include_y(y_min)
        .include_y(y_max);
    if explorer.legend().is_some() {
        plot = plot.legend(Legend::default().text_style(TextStyle::Small));
    }

    let response = plot.show(ui, |plot_ui| {
        for (i, line) in explorer.profile_lines().iter().enumerate() {
            let points: PlotPoints = line
                .reflectivity
                .iter()
                .zip(line.heights.iter())
                .map(|(&r, &h)| [r, h])
                .collect();
            plot_ui.line(
                Line::new(points)
                    .name(&line.label)
                    .color(line_colors.color_for(i))
                    .width(1.5),
            );
        }
        plot_ui.pointer_coordinate()
    });

    if let Some(p) = response.inner {
        if response.response.hovered() {
            events.hover = Some(explorer.format_coord(PanelId::VerticalProfile, p.x, p.y));
        }
        if response.response.clicked() {
            events.click = Some(ClickEvent {
                panel: Some(PanelId::VerticalProfile),
                x: p.x,
                y: p.y,
            });
        }
    }
}

fn slice_panel(
    ui: &mut Ui,
    explorer: &VolumeExplorer,
    panel: PanelId,
    slot: &mut TextureSlot,
    events: &mut FigureEvents,
) {
    let (id, title, slice, x_limits, revision): (&str, &str, Option<&SliceImage>, _, _) =
        match panel {
            PanelId::AzimuthSlice => (
                "azimuth_slice",
                explorer.azimuth_slice_title(),
                explorer.azimuth_slice(),
                explorer.azimuth_slice_x_limits(),
                explorer.azimuth_slice_revision(),
            ),
            _ => (
                "range_slice",
                explorer.range_slice_title(),
                explorer.range_slice(),
                explorer.range_slice_x_limits(),
                explorer.range_slice_revision(),
            ),
        };
    ui.label(RichText::new(title).size(TITLE_SIZE));

    let spacer_ticks = explorer.height_ticks().to_vec();
    let label_ticks = spacer_ticks.clone();
    let step = spacer_ticks
        .get(1)
        .map(|t| t.position)
        .filter(|s| *s > 0.0)
        .unwrap_or(1.0);

    let texture = slice.map(|s| {
        slot.get_or_load(ui.ctx(), id, revision, || {
            generate_image(s.image.view(), s.colormap, s.bounds, Origin::Lower)
        })
        .id()
    });

    let response = Plot::new(id)
        .show_x(false)
        .show_y(false)
        .include_x(x_limits.0)
        .include_x(x_limits.1)
        .y_grid_spacer(move |_input| {
            spacer_ticks
                .iter()
                .map(|t| GridMark {
                    value: t.position,
                    step_size: step,
                })
                .collect()
        })
        .y_axis_formatter(move |mark, _range| tick_label(&label_ticks, mark.value))
        .show(ui, |plot_ui| {
            if let (Some(texture), Some(s)) = (texture, slice) {
                let (rows, cols) = s.image.dim();
                plot_ui.image(PlotImage::new(
                    texture,
                    PlotPoint::new(cols as f64 / 2.0, rows as f64 / 2.0),
                    [cols as f32, rows as f32],
                ));
            }
            plot_ui.pointer_coordinate()
        });

    if let Some(p) = response.inner {
        if response.response.hovered() {
            events.hover = Some(explorer.format_coord(panel, p.x, p.y));
        }
        if response.response.clicked() {
            events.click = Some(ClickEvent {
                panel: Some(panel),
                x: p.x,
                y: p.y,
            });
        }
    }
}

fn tick_label(ticks: &[HeightTick], value: f64) -> String {
    ticks
        .iter()
        .find(|t| (t.position - value).abs() < 1e-9)
        .map(|t| t.label.to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn no_data_hint(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("Open a file to view data  (File → Open…)");
    });
}

/// Axis labels for an image of `rows` rows drawn with row 0 on top.
fn upper_row_formatter(rows: usize) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| format!("{}", rows as f64 - mark.value)
}

/// A `rows × cols` image spanning `[0, cols] × [0, rows]`, row 0 on top.
fn upper_image(texture: TextureId, rows: usize, cols: usize) -> PlotImage {
    PlotImage::new(
        texture,
        PlotPoint::new(cols as f64 / 2.0, rows as f64 / 2.0),
        [cols as f32, rows as f32],
    )
}
