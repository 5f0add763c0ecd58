use eframe::egui;

use crate::app::viewer_app::StreamViewerApp;

pub fn render_main_panel(app: &StreamViewerApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        app.plot.ui(ui, &app.snapshot);
    });
}
