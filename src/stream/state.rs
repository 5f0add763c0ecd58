use std::fmt;

use crate::config::ViewerConfig;
use crate::plotter::{self, PlotSnapshot};
use crate::types::{ReceivedUpdate, SensorEvent, SensorKind, StreamUpdate, UNKNOWN_ACTIVITY};
use crate::utils::format_seconds;

use super::rolling_window::RollingWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

/// 周期性状态行
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub activity: String,
    pub elapsed_seconds: f64,
    pub data_points: u64,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Activity: {}, Elapsed: {}s, Data points: {}",
            self.activity,
            format_seconds(self.elapsed_seconds),
            self.data_points
        )
    }
}

/// 决定何时打印状态行。在传输回调中使用，渲染线程停转时状态行照常输出
#[derive(Debug, Clone)]
pub struct StatusTracker {
    received: u64,
    interval: u64,
}

impl StatusTracker {
    pub fn new(interval: u64) -> Self {
        Self {
            received: 0,
            interval: interval.max(1),
        }
    }

    /// 只统计带 sensor_type 的事件；每满一个间隔返回一行
    pub fn observe(&mut self, event: &SensorEvent) -> Option<StatusLine> {
        let reading = event.reading()?;
        self.received += 1;
        if self.received % self.interval != 0 {
            return None;
        }
        Some(StatusLine {
            activity: reading.activity().to_string(),
            elapsed_seconds: reading.elapsed_seconds(),
            data_points: self.received,
        })
    }

    pub fn received(&self) -> u64 {
        self.received
    }
}

/// 查看器的全部可变状态，由渲染线程独占
#[derive(Debug)]
pub struct StreamState {
    accel: RollingWindow<f64>,
    gyro: RollingWindow<f64>,
    timestamps: RollingWindow<f64>,
    current_activity: String,
    elapsed_seconds: f64,
    received: u64,
    decode_errors: u64,
    connection: ConnectionStatus,
    device_summary: Option<String>,
}

impl StreamState {
    pub fn new(window_capacity: usize) -> Self {
        Self {
            accel: RollingWindow::new(window_capacity),
            gyro: RollingWindow::new(window_capacity),
            timestamps: RollingWindow::new(window_capacity),
            current_activity: UNKNOWN_ACTIVITY.to_string(),
            elapsed_seconds: 0.0,
            received: 0,
            decode_errors: 0,
            connection: ConnectionStatus::Connecting,
            device_summary: None,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(config.window_capacity)
    }

    /// 应用一条带到达时间的更新；返回是否写入了窗口
    pub fn apply(&mut self, received: ReceivedUpdate) -> bool {
        match received.update {
            StreamUpdate::Connected => {
                self.connection = ConnectionStatus::Connected;
                false
            }
            StreamUpdate::Disconnected => {
                self.connection = ConnectionStatus::Disconnected;
                false
            }
            StreamUpdate::DecodeFailed(_) => {
                self.decode_errors += 1;
                false
            }
            StreamUpdate::Sensor(event) => self.record(&event, received.arrival),
        }
    }

    /// 记录一个传感器事件。没有 sensor_type 的事件不改变任何状态
    pub fn record(&mut self, event: &SensorEvent, arrival: f64) -> bool {
        let Some(reading) = event.reading() else {
            return false;
        };

        self.current_activity = reading.activity().to_string();
        self.elapsed_seconds = reading.elapsed_seconds();
        if let Some(summary) = event.device_summary() {
            self.device_summary = Some(summary);
        }

        self.timestamps.push(arrival);
        match reading.kind() {
            SensorKind::Accelerometer => self.accel.push(reading.magnitude()),
            SensorKind::Gyroscope => self.gyro.push(reading.magnitude()),
            _ => {}
        }

        self.received += 1;
        true
    }

    /// 为一次重绘复制窗口内容并计算相对时间轴
    pub fn snapshot(&self) -> PlotSnapshot {
        let time_axis = plotter::relative_time_axis(&self.timestamps.snapshot());
        PlotSnapshot {
            accel: plotter::align_trailing(&time_axis, &self.accel.snapshot()),
            gyro: plotter::align_trailing(&time_axis, &self.gyro.snapshot()),
            time_axis,
            activity: self.current_activity.clone(),
            elapsed_seconds: self.elapsed_seconds,
        }
    }

    pub fn accel_window(&self) -> &RollingWindow<f64> {
        &self.accel
    }

    pub fn gyro_window(&self) -> &RollingWindow<f64> {
        &self.gyro
    }

    pub fn timestamp_window(&self) -> &RollingWindow<f64> {
        &self.timestamps
    }

    pub fn current_activity(&self) -> &str {
        &self.current_activity
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn decode_errors(&self) -> u64 {
        self.decode_errors
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn device_summary(&self) -> Option<&str> {
        self.device_summary.as_deref()
    }
}
