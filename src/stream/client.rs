use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel::{Sender, TrySendError};
use log::{debug, error, info, warn};
use rust_socketio::client::Client;
use rust_socketio::{ClientBuilder, Payload, RawClient, TransportType};

use crate::config::ViewerConfig;
use crate::error::StreamError;
use crate::types::{ReceivedUpdate, StreamUpdate};
use crate::utils::unix_seconds_now;

use super::dispatch::{EventDispatcher, EventHandler};
use super::state::StatusTracker;

/// 连接采集端实时数据流的 Socket.IO 客户端（仅使用 WebSocket 传输）
pub struct StreamClient {
    config: ViewerConfig,
    dispatcher: EventDispatcher,
    sender: Sender<ReceivedUpdate>,
    status: Arc<Mutex<StatusTracker>>,
    dropped: Arc<AtomicU64>,
    socket: Option<Client>,
}

impl StreamClient {
    pub fn new(config: ViewerConfig, sender: Sender<ReceivedUpdate>) -> Self {
        let dispatcher = EventDispatcher::with_sensor_event(&config.event_name);
        let status = Arc::new(Mutex::new(StatusTracker::new(config.status_interval)));
        Self {
            config,
            dispatcher,
            sender,
            status,
            dropped: Arc::new(AtomicU64::new(0)),
            socket: None,
        }
    }

    pub fn url(&self) -> String {
        self.config.url()
    }

    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    /// 通道已满时丢弃的更新数，与界面共享
    pub fn dropped_updates(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.dropped)
    }

    /// 建立连接；失败时打印排查提示并返回 false，不向上传播错误
    pub fn connect(&mut self) -> bool {
        info!("Attempting to connect to {}", self.url());
        match self.try_connect() {
            Ok(socket) => {
                self.socket = Some(socket);
                true
            }
            Err(e) => {
                error!("{}", e);
                print_connection_help();
                false
            }
        }
    }

    fn try_connect(&self) -> Result<Client, StreamError> {
        let url = self.url();
        let mut builder = ClientBuilder::new(url.as_str()).transport_type(TransportType::Websocket);

        for (event_name, handler) in self.dispatcher.routes() {
            let forwarder = self.forwarder(event_name, handler);
            builder = builder.on(event_name, move |payload: Payload, _socket: RawClient| {
                forwarder.forward(payload);
            });
        }

        builder
            .connect()
            .map_err(|source| StreamError::Connect { url, source })
    }

    fn forwarder(&self, event_name: &str, handler: EventHandler) -> Forwarder {
        Forwarder {
            sender: self.sender.clone(),
            event_name: event_name.to_string(),
            endpoint: format!("{}:{}", self.config.host, self.config.port),
            handler,
            status: Arc::clone(&self.status),
            dropped: Arc::clone(&self.dropped),
        }
    }

    /// 断开连接；从未连接或已断开时什么也不做
    pub fn disconnect(&mut self) {
        if let Some(socket) = self.socket.take() {
            if let Err(e) = socket.disconnect() {
                warn!("{}", StreamError::Disconnect(e));
            }
        }
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// 单个事件名的回调：记录到达时间、解码、打印连接和状态日志，然后非阻塞地交给渲染线程
#[derive(Clone)]
pub struct Forwarder {
    sender: Sender<ReceivedUpdate>,
    event_name: String,
    endpoint: String,
    handler: EventHandler,
    status: Arc<Mutex<StatusTracker>>,
    dropped: Arc<AtomicU64>,
}

impl Forwarder {
    pub fn new(
        sender: Sender<ReceivedUpdate>,
        event_name: &str,
        handler: EventHandler,
        status_interval: u64,
    ) -> Self {
        Self {
            sender,
            event_name: event_name.to_string(),
            endpoint: String::new(),
            handler,
            status: Arc::new(Mutex::new(StatusTracker::new(status_interval))),
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn dropped_updates(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.dropped)
    }

    pub fn forward(&self, payload: Payload) {
        // 回调触发时就记录时间，渲染线程晚取不影响时间轴
        let arrival = unix_seconds_now();
        let body = payload_text(payload);
        let update = match (self.handler)(&body) {
            Ok(update) => update,
            Err(e) => {
                warn!("Error parsing sensor data: {}", e);
                StreamUpdate::DecodeFailed(e.to_string())
            }
        };

        match &update {
            StreamUpdate::Connected => info!("Connected to {}", self.endpoint),
            StreamUpdate::Disconnected => info!("Disconnected from server"),
            StreamUpdate::Sensor(event) => {
                if let Ok(mut status) = self.status.lock() {
                    if let Some(line) = status.observe(event) {
                        info!("{}", line);
                    }
                }
            }
            StreamUpdate::DecodeFailed(_) => {}
        }

        // 不阻塞传输线程
        match self.sender.try_send(ReceivedUpdate::new(update, arrival)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped == 1 || dropped % 100 == 0 {
                    warn!(
                        "Update channel full, dropping '{}' event ({} dropped so far)",
                        self.event_name, dropped
                    );
                }
            }
            Err(TrySendError::Disconnected(_)) => debug!("Viewer closed, dropping '{}' event", self.event_name),
        }
    }
}

/// 取出消息体的文本形式，只看第一个参数
#[allow(deprecated)]
fn payload_text(payload: Payload) -> String {
    match payload {
        Payload::Text(values) => values.first().map(|value| value.to_string()).unwrap_or_default(),
        Payload::String(text) => text,
        Payload::Binary(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
    }
}

fn print_connection_help() {
    warn!("Failed to connect. Please check:");
    warn!("1. The sensor app is running");
    warn!("2. Streaming is enabled in settings");
    warn!("3. Host and port are correct");
    warn!("4. Devices are on the same network");
}
