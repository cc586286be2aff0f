use eframe::egui;

use crate::state::{ActiveView, AppState};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct TomoViewerApp {
    pub state: AppState,
}

impl eframe::App for TomoViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: controls ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: figure ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.view {
            ActiveView::Stacks => plot::stack_figure(ui, &mut self.state),
            ActiveView::Tomography => plot::tomography_figure(ui, &mut self.state),
        });
    }
}
