use eframe::egui;

use crate::app::viewer_app::StreamViewerApp;
use crate::stream::ConnectionStatus;

pub fn render_status_bar(app: &StreamViewerApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("status_bar")
        .min_height(40.0)
        .show(ctx, |ui| {
            ui.add_space(5.0);
            ui.horizontal(|ui| {
                ui.label("Status:");

                let (status_text, status_color) = match app.state.connection() {
                    ConnectionStatus::Connecting => ("Connecting", egui::Color32::from_rgb(255, 165, 0)), // 橙色
                    ConnectionStatus::Connected => ("Connected", egui::Color32::from_rgb(0, 150, 0)),     // 绿色
                    ConnectionStatus::Disconnected => ("Disconnected", egui::Color32::from_rgb(150, 0, 0)), // 红色
                };
                ui.colored_label(status_color, status_text);

                ui.separator();
                ui.label(format!("Source: {}", app.endpoint));

                ui.separator();
                ui.label(format!("Events: {}", app.state.received()));

                if app.state.decode_errors() > 0 {
                    ui.separator();
                    ui.colored_label(
                        egui::Color32::from_rgb(150, 0, 0),
                        format!("Decode errors: {}", app.state.decode_errors()),
                    );
                }

                if app.dropped_updates() > 0 {
                    ui.separator();
                    ui.colored_label(
                        egui::Color32::from_rgb(255, 165, 0),
                        format!("Dropped: {}", app.dropped_updates()),
                    );
                }

                ui.separator();
                let window = app.state.timestamp_window();
                ui.label(format!("Window: {}/{}", window.len(), window.capacity()));

                if let Some(device) = app.state.device_summary() {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(format!("Device: {}", device));
                    });
                }
            });
            ui.add_space(5.0);
        });
}
