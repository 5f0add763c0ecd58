use std::thread;

use crossbeam_channel::bounded;
use eframe::egui;
use log::{error, info, warn};

use sensetap::app::{ShutdownHandle, StreamViewerApp};
use sensetap::config::AppConfig;
use sensetap::logger;
use sensetap::stream::StreamClient;

/// 中断后强制退出时的退出码（128 + SIGINT）
const INTERRUPTED_EXIT_CODE: i32 = 130;

fn main() {
    logger::init_logger();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Motion Sensor Stream Client");
    info!("Connecting to {}:{}", config.viewer.host, config.viewer.port);
    info!("Make sure the sensor app is running and streaming is enabled!");
    info!("{}", "-".repeat(60));

    let (update_sender, update_receiver) = bounded(config.viewer.channel_capacity);
    let mut client = StreamClient::new(config.viewer.clone(), update_sender);

    if !client.connect() {
        return;
    }

    let shutdown = ShutdownHandle::new();
    let ctrlc_shutdown = shutdown.clone();
    let grace = config.viewer.shutdown_grace();
    if let Err(e) = ctrlc::set_handler(move || {
        if ctrlc_shutdown.request() {
            warn!("Second interrupt, exiting now");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
        info!("Interrupt received, closing the plot window");
        // 窗口最小化时部分平台不再调度帧，超时后强制退出
        thread::spawn(move || {
            thread::sleep(grace);
            warn!("Plot window did not close within {:?}, exiting", grace);
            std::process::exit(INTERRUPTED_EXIT_CODE);
        });
    }) {
        warn!("Failed to install interrupt handler: {}", e);
    }

    let options = eframe::NativeOptions {
        vsync: config.window.vsync,
        viewport: egui::ViewportBuilder::default()
            .with_title(config.window.title.clone())
            .with_inner_size([config.window.width, config.window.height])
            .with_resizable(config.window.resizable),
        ..Default::default()
    };

    let app_config = config.clone();
    let dropped_updates = client.dropped_updates();
    if let Err(e) = eframe::run_native(
        &config.window.title,
        options,
        Box::new(move |cc| {
            shutdown.attach(&cc.egui_ctx);
            Ok(Box::new(StreamViewerApp::new(
                &app_config,
                update_receiver,
                shutdown,
                dropped_updates,
            )))
        }),
    ) {
        error!("Error: {}", e);
    }

    // 无论 GUI 如何退出都尝试断开
    client.disconnect();
    info!("Disconnected");
}
