use eframe::egui::{self, Color32, Response, RichText, Slider, Ui};

use crate::state::{ActiveView, AppState};
use crate::viewer::SliderSpec;

// ---------------------------------------------------------------------------
// Left side panel – bound controls
// ---------------------------------------------------------------------------

/// Render the controls of the active component.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Controls");
    ui.separator();

    match state.view {
        ActiveView::Stacks => stack_controls(ui, state),
        ActiveView::Tomography => tomography_controls(ui, state),
    }
}

fn stack_controls(ui: &mut Ui, state: &mut AppState) {
    let (Some(spec), Some(mut value)) = (
        state.stack_viewer.as_ref().map(|v| v.slider()),
        state.stack_slider_value(),
    ) else {
        ui.label("No input stacks loaded.");
        return;
    };

    let response = int_slider(ui, &mut value, spec);
    if released_change(&response) {
        state.slide_stack(value);
    } else if response.dragged() {
        state.slider_drafts.stack = Some(value);
    }
}

fn tomography_controls(ui: &mut Ui, state: &mut AppState) {
    let (Some(spec), Some(mut value)) = (
        state.volume_explorer.as_ref().map(|e| e.slider()),
        state.height_slider_value(),
    ) else {
        ui.label("No reflectivity volume loaded.");
        return;
    };

    let response = int_slider(ui, &mut value, spec);
    if response.dragged() && !response.drag_stopped() {
        state.slider_drafts.height = Some(value);
    }

    let Some(explorer) = &mut state.volume_explorer else {
        return;
    };

    ui.add_space(4.0);
    ui.checkbox(&mut explorer.stack_profiles, "stack vertical profiles");

    ui.add_space(4.0);
    let clear = ui.button("clear vertical plot").clicked();

    if let Some(c) = explorer.crosshair() {
        ui.separator();
        ui.label(format!("selected: range {}, azimuth {}", c.range, c.azimuth));
    }

    if released_change(&response) {
        state.slide_height(value);
    }
    if clear {
        state.clear_vertical_plot();
    }
}

fn int_slider(ui: &mut Ui, value: &mut i64, spec: SliderSpec) -> Response {
    ui.strong(spec.label);
    ui.add(
        Slider::new(value, spec.min..=spec.max)
            .step_by(spec.step as f64)
            .clamping(egui::SliderClamping::Always),
    )
}

/// Slider changes only count once the user lets go of the handle.
fn released_change(response: &Response) -> bool {
    response.drag_stopped() || (response.changed() && !response.dragged())
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        for view in state.available_views() {
            if ui
                .selectable_label(state.view == view, view.to_string())
                .clicked()
            {
                state.view = view;
            }
        }

        ui.separator();

        if state.view == ActiveView::Tomography {
            if let Some(text) = &state.hover_text {
                ui.monospace(text);
            }
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open stacks or reflectivity volume")
        .add_filter("Supported files", &["parquet", "pq", "json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!("Loaded {} from {}", dataset.describe(), path.display());
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
