use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::Receiver;
use eframe::{egui, Frame};
use log::info;

use crate::config::AppConfig;
use crate::plotter::{MagnitudePlot, PlotSnapshot};
use crate::stream::StreamState;
use crate::types::ReceivedUpdate;

/// 中断信号：置位后唤醒渲染线程，最小化的窗口也会执行一次 update
#[derive(Clone, Default)]
pub struct ShutdownHandle {
    requested: Arc<AtomicBool>,
    ctx: Arc<Mutex<Option<egui::Context>>>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存 egui 上下文，在创建 App 时调用
    pub fn attach(&self, ctx: &egui::Context) {
        if let Ok(mut slot) = self.ctx.lock() {
            *slot = Some(ctx.clone());
        }
        // 上下文到达之前已经收到中断
        if self.is_requested() {
            ctx.request_repaint();
        }
    }

    /// 请求关闭；返回此前是否已经请求过
    pub fn request(&self) -> bool {
        let already = self.requested.swap(true, Ordering::SeqCst);
        if let Ok(slot) = self.ctx.lock() {
            if let Some(ctx) = slot.as_ref() {
                ctx.request_repaint();
            }
        }
        already
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

pub struct StreamViewerApp {
    pub state: StreamState,
    pub plot: MagnitudePlot,
    pub snapshot: PlotSnapshot,
    pub endpoint: String,
    update_receiver: Receiver<ReceivedUpdate>,
    shutdown: ShutdownHandle,
    dropped_updates: Arc<AtomicU64>,
    redraw_interval: Duration,
}

impl StreamViewerApp {
    pub fn new(
        config: &AppConfig,
        update_receiver: Receiver<ReceivedUpdate>,
        shutdown: ShutdownHandle,
        dropped_updates: Arc<AtomicU64>,
    ) -> Self {
        info!("Starting real-time plot, close the plot window to exit");
        Self {
            state: StreamState::from_config(&config.viewer),
            plot: MagnitudePlot::new(&config.plot),
            snapshot: PlotSnapshot::default(),
            endpoint: format!("{}:{}", config.viewer.host, config.viewer.port),
            update_receiver,
            shutdown,
            dropped_updates,
            redraw_interval: config.viewer.redraw_interval(),
        }
    }

    /// 取空通道中的全部更新并应用到状态；时间轴使用回调时记录的到达时间
    pub fn drain_updates(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.update_receiver.try_recv() {
            self.state.apply(update);
            applied += 1;
        }
        applied
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.is_requested()
    }

    pub fn dropped_updates(&self) -> u64 {
        self.dropped_updates.load(Ordering::Relaxed)
    }
}

impl eframe::App for StreamViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        if self.shutdown_requested() {
            info!("Shutting down...");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        ctx.set_visuals(egui::Visuals::light());

        self.drain_updates();
        self.snapshot = self.state.snapshot();

        crate::app::ui::render_status_bar(self, ctx);
        crate::app::ui::render_main_panel(self, ctx);

        ctx.request_repaint_after(self.redraw_interval);
    }
}
