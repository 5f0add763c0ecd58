//! 传感器数据流诊断工具：实时曲线查看器与单连接 TCP 日志服务器

pub mod app;
pub mod config;
pub mod error;
pub mod logger;
pub mod plotter;
pub mod server;
pub mod stream;
pub mod types;
pub mod utils;
