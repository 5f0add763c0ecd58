use egui::Color32;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::config::PlotConfig;
use crate::utils::format_seconds;

/// 一次重绘所需的数据副本
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotSnapshot {
    pub time_axis: Vec<f64>,
    pub accel: Vec<[f64; 2]>,
    pub gyro: Vec<[f64; 2]>,
    pub activity: String,
    pub elapsed_seconds: f64,
}

impl PlotSnapshot {
    pub fn accel_title(&self) -> String {
        format!(
            "Accelerometer - Activity: {} ({}s)",
            self.activity,
            format_seconds(self.elapsed_seconds)
        )
    }
}

/// 绝对时间戳 -> 相对时间轴，第一个时间戳为 0
pub fn relative_time_axis(timestamps: &[f64]) -> Vec<f64> {
    match timestamps.first() {
        None => Vec::new(),
        Some(&origin) => timestamps.iter().map(|t| t - origin).collect(),
    }
}

/// 把序列对齐到时间轴末尾的同长度部分
pub fn align_trailing(time_axis: &[f64], values: &[f64]) -> Vec<[f64; 2]> {
    let len = values.len().min(time_axis.len());
    let times = &time_axis[time_axis.len() - len..];
    let values = &values[values.len() - len..];
    times.iter().zip(values).map(|(&t, &v)| [t, v]).collect()
}

fn rgb(color: [u8; 3]) -> Color32 {
    Color32::from_rgb(color[0], color[1], color[2])
}

/// 加速度计 / 陀螺仪两张上下排列的实时曲线
#[derive(Debug)]
pub struct MagnitudePlot {
    config: PlotConfig,
}

impl MagnitudePlot {
    pub fn new(config: &PlotConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn ui(&self, ui: &mut egui::Ui, snapshot: &PlotSnapshot) {
        if snapshot.time_axis.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label("waiting for data...");
            });
            return;
        }

        ui.vertical(|ui| {
            if !snapshot.accel.is_empty() {
                ui.heading(snapshot.accel_title());
                self.plot_series(
                    ui,
                    "accelerometer_plot",
                    "Accelerometer",
                    "Magnitude (m/s²)",
                    &snapshot.accel,
                    rgb(self.config.colors.accelerometer),
                );
            }

            ui.separator();

            if !snapshot.gyro.is_empty() {
                ui.heading("Gyroscope");
                self.plot_series(
                    ui,
                    "gyroscope_plot",
                    "Gyroscope",
                    "Magnitude (rad/s)",
                    &snapshot.gyro,
                    rgb(self.config.colors.gyroscope),
                );
            }
        });
    }

    fn plot_series(
        &self,
        ui: &mut egui::Ui,
        id: &str,
        name: &str,
        y_label: &str,
        points: &[[f64; 2]],
        color: Color32,
    ) {
        Plot::new(id)
            .height(self.config.plot_height)
            .legend(Legend::default())
            .x_axis_label("Time (seconds)")
            .y_axis_label(y_label)
            .x_axis_formatter(|v, _| format!("{:.1}s", v.value))
            .allow_drag(false)
            .allow_zoom(false)
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(name, PlotPoints::from(points.to_vec()))
                        .color(color)
                        .width(self.config.line_width),
                );
            });
    }
}
