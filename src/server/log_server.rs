use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;

use chrono::Local;
use crossbeam_channel::Sender;
use log::{debug, info, warn};
use tokio::io::AsyncReadExt;
use tokio::net::{lookup_host, TcpListener, TcpSocket, TcpStream};

use crate::config::ServerConfig;
use crate::error::ServerError;

use super::record::{interpret_chunk, ChunkRecord};

/// LISTENING -> CONNECTED -> CLOSED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Listening,
    Connected,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// 对端正常关闭（读到 0 字节）
    PeerClosed,
    /// 对端异常断开（reset / aborted / broken pipe）
    PeerReset,
    Interrupted,
}

/// 一次会话的统计
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub peer: Option<SocketAddr>,
    pub bytes_received: u64,
    pub json_records: u64,
    pub raw_records: u64,
    pub close_reason: CloseReason,
}

impl SessionReport {
    fn new(peer: Option<SocketAddr>) -> Self {
        Self {
            peer,
            bytes_received: 0,
            json_records: 0,
            raw_records: 0,
            close_reason: CloseReason::PeerClosed,
        }
    }

    fn count(&mut self, record: &ChunkRecord, bytes: usize) {
        self.bytes_received += bytes as u64;
        if record.is_json() {
            self.json_records += 1;
        } else {
            self.raw_records += 1;
        }
    }
}

/// 只接受一个连接的 TCP 日志服务器
pub struct LogServer {
    listener: Option<TcpListener>,
    connection: Option<TcpStream>,
    state: ServerState,
    local_addr: SocketAddr,
    read_buffer_size: usize,
    observer: Option<Sender<ChunkRecord>>,
}

impl LogServer {
    /// 绑定 IPv4 地址并开始监听
    pub async fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        let address = config.bind_address();
        let bind_error = |source: io::Error| ServerError::Bind {
            addr: address.clone(),
            source,
        };

        let addr = lookup_host(address.as_str())
            .await
            .map_err(bind_error)?
            .find(SocketAddr::is_ipv4)
            .ok_or_else(|| ServerError::InvalidAddress(address.clone()))?;

        let socket = TcpSocket::new_v4().map_err(bind_error)?;
        socket.set_reuseaddr(true).map_err(bind_error)?;
        socket.bind(addr).map_err(bind_error)?;
        let listener = socket.listen(config.backlog).map_err(bind_error)?;
        let local_addr = listener.local_addr()?;

        info!("Server listening on {}", local_addr);

        Ok(Self {
            listener: Some(listener),
            connection: None,
            state: ServerState::Listening,
            local_addr,
            read_buffer_size: config.read_buffer_size.max(1),
            observer: None,
        })
    }

    /// 每条解析后的记录额外发送到该通道
    pub fn with_observer(mut self, observer: Sender<ChunkRecord>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    /// 连接和监听套接字都已释放
    pub fn is_released(&self) -> bool {
        self.listener.is_none() && self.connection.is_none()
    }

    /// 处理唯一的一个连接，直到对端断开或 `shutdown` 完成。
    /// 无论以何种方式退出，连接与监听套接字都会被释放。
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<SessionReport, ServerError>
    where
        F: Future<Output = ()>,
    {
        if self.state != ServerState::Listening {
            return Err(ServerError::Closed);
        }

        tokio::pin!(shutdown);
        let result = self.serve(shutdown).await;
        self.close();
        result
    }

    async fn serve<F>(&mut self, mut shutdown: Pin<&mut F>) -> Result<SessionReport, ServerError>
    where
        F: Future<Output = ()>,
    {
        let listener = self.listener.as_ref().ok_or(ServerError::Closed)?;

        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = shutdown.as_mut() => {
                info!("Interrupted while waiting for a connection");
                let mut report = SessionReport::new(None);
                report.close_reason = CloseReason::Interrupted;
                return Ok(report);
            }
        };

        self.state = ServerState::Connected;
        info!("Connection from {}", peer);

        let mut report = SessionReport::new(Some(peer));
        let mut buffer = vec![0u8; self.read_buffer_size];
        let stream = self.connection.insert(stream);

        loop {
            let read = tokio::select! {
                read = stream.read(&mut buffer) => read,
                _ = shutdown.as_mut() => {
                    info!("Interrupted, closing connection from {}", peer);
                    report.close_reason = CloseReason::Interrupted;
                    break;
                }
            };

            match read {
                Ok(0) => {
                    info!("Client {} disconnected", peer);
                    report.close_reason = CloseReason::PeerClosed;
                    break;
                }
                Ok(n) => {
                    let record = interpret_chunk(&buffer[..n], Local::now());
                    report.count(&record, n);
                    info!("{}", record);
                    if let Some(observer) = &self.observer {
                        if observer.try_send(record).is_err() {
                            debug!("Record observer unavailable, record not forwarded");
                        }
                    }
                }
                Err(e) if is_peer_reset(&e) => {
                    warn!("Connection from {} reset: {}", peer, e);
                    report.close_reason = CloseReason::PeerReset;
                    break;
                }
                Err(e) => return Err(ServerError::Io(e)),
            }
        }

        Ok(report)
    }

    fn close(&mut self) {
        let had_connection = self.connection.take().is_some();
        let had_listener = self.listener.take().is_some();
        if self.state != ServerState::Closed && (had_connection || had_listener) {
            info!("Server closed");
        }
        self.state = ServerState::Closed;
    }
}

impl Drop for LogServer {
    fn drop(&mut self) {
        self.close();
    }
}

fn is_peer_reset(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted | io::ErrorKind::BrokenPipe
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ephemeral() -> ServerConfig {
        ServerConfig {
            port: 0,
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn bind_starts_listening_on_ipv4() {
        let server = LogServer::bind(&ephemeral()).await.unwrap();
        assert_eq!(server.state(), ServerState::Listening);
        assert!(server.local_addr().is_ipv4());
        assert_ne!(server.local_addr().port(), 0);
        assert!(!server.is_released());
    }

    #[tokio::test]
    async fn interrupt_before_connection_closes_everything() {
        let mut server = LogServer::bind(&ephemeral()).await.unwrap();
        let report = server.run_until(async {}).await.unwrap();

        assert_eq!(report.close_reason, CloseReason::Interrupted);
        assert_eq!(report.peer, None);
        assert_eq!(server.state(), ServerState::Closed);
        assert!(server.is_released());
    }

    #[tokio::test]
    async fn second_run_is_rejected() {
        let mut server = LogServer::bind(&ephemeral()).await.unwrap();
        server.run_until(async {}).await.unwrap();
        assert!(matches!(server.run_until(async {}).await, Err(ServerError::Closed)));
    }

    #[test]
    fn reset_kinds_are_treated_as_disconnects() {
        assert!(is_peer_reset(&io::Error::from(io::ErrorKind::ConnectionReset)));
        assert!(is_peer_reset(&io::Error::from(io::ErrorKind::BrokenPipe)));
        assert!(!is_peer_reset(&io::Error::from(io::ErrorKind::PermissionDenied)));
    }
}
