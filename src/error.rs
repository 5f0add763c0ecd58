use thiserror::Error;

/// 数据流查看器错误
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("connection to {url} failed: {source}")]
    Connect {
        url: String,
        #[source]
        source: rust_socketio::Error,
    },
    #[error("disconnect failed: {0}")]
    Disconnect(#[source] rust_socketio::Error),
    #[error("JSON parsing error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no handler registered for event '{0}'")]
    UnknownEvent(String),
}

/// 日志服务器错误
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid listen address '{0}'")]
    InvalidAddress(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server already closed")]
    Closed,
}
