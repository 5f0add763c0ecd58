use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 应用配置管理模块
/// 集中管理两个工具的配置项，提供默认值、环境变量覆盖和配置验证

pub const DEFAULT_CONFIG_PATH: &str = "sensetap.toml";

/// 主配置结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub viewer: ViewerConfig,
    pub server: ServerConfig,
    pub window: WindowConfig,
    pub plot: PlotConfig,
}

/// 数据流查看器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub host: String,
    pub port: u16,
    pub event_name: String,
    pub window_capacity: usize,
    pub status_interval: u64,
    pub redraw_interval_ms: u64,
    pub channel_capacity: usize,
    /// 收到中断后等待窗口自行关闭的时间，超时强制退出
    pub shutdown_grace_ms: u64,
}

/// 日志服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub read_buffer_size: usize,
    pub backlog: u32,
}

/// 窗口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
    pub resizable: bool,
    pub vsync: bool,
}

/// 绘图配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub plot_height: f32,
    pub line_width: f32,
    pub colors: PlotColors,
}

/// 绘图颜色配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotColors {
    pub accelerometer: [u8; 3],
    pub gyroscope: [u8; 3],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            event_name: "sensor_data".to_string(),
            window_capacity: 100,
            status_interval: 50,
            redraw_interval_ms: 100,
            channel_capacity: 5000,
            shutdown_grace_ms: 3000,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            read_buffer_size: 1024,
            backlog: 1,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            title: "Live Motion Sensor Data Stream".to_string(),
            resizable: true,
            vsync: true,
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            plot_height: 320.0,
            line_width: 2.0,
            colors: PlotColors::default(),
        }
    }
}

impl Default for PlotColors {
    fn default() -> Self {
        Self {
            accelerometer: [0, 0, 255], // 蓝色
            gyroscope: [255, 0, 0],     // 红色
        }
    }
}

impl ViewerConfig {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn redraw_interval(&self) -> Duration {
        Duration::from_millis(self.redraw_interval_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AppConfig {
    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::IoError)?;
        let config: AppConfig = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::SerializeError)?;
        std::fs::write(path, content).map_err(ConfigError::IoError)?;
        Ok(())
    }

    /// 加载 `.env`，读取 SENSETAP_CONFIG 指向的文件（不存在时使用默认值），再应用环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let path = config_path();
        let mut config = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 环境变量覆盖；`lookup` 便于测试时注入
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SENSETAP_VIEWER_HOST") {
            self.viewer.host = host;
        }
        if let Some(port) = lookup("SENSETAP_VIEWER_PORT") {
            self.viewer.port = parse_port("SENSETAP_VIEWER_PORT", &port)?;
        }
        if let Some(host) = lookup("SENSETAP_SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SENSETAP_SERVER_PORT") {
            self.server.port = parse_port("SENSETAP_SERVER_PORT", &port)?;
        }
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewer.event_name.trim().is_empty() {
            return Err(ConfigError::ValidationError("Event name must not be empty".to_string()));
        }

        if self.viewer.window_capacity == 0 {
            return Err(ConfigError::ValidationError("Window capacity must be positive".to_string()));
        }

        if self.viewer.status_interval == 0 {
            return Err(ConfigError::ValidationError("Status interval must be positive".to_string()));
        }

        if self.viewer.redraw_interval_ms == 0 {
            return Err(ConfigError::ValidationError("Redraw interval must be positive".to_string()));
        }

        if self.viewer.channel_capacity == 0 {
            return Err(ConfigError::ValidationError("Channel capacity must be positive".to_string()));
        }

        if self.server.read_buffer_size == 0 {
            return Err(ConfigError::ValidationError("Read buffer size must be positive".to_string()));
        }

        if self.server.backlog == 0 {
            return Err(ConfigError::ValidationError("Backlog must be at least 1".to_string()));
        }

        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            return Err(ConfigError::ValidationError("Window dimensions must be positive".to_string()));
        }

        Ok(())
    }
}

fn config_path() -> PathBuf {
    env::var("SENSETAP_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn parse_port(key: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|e| ConfigError::ValidationError(format!("{} is not a valid port: {}", key, e)))
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(toml::de::Error),
    #[error("Serialize error: {0}")]
    SerializeError(toml::ser::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_the_documented_endpoints() {
        let config = AppConfig::default();
        assert_eq!(config.viewer.url(), "http://127.0.0.1:8080");
        assert_eq!(config.server.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.viewer.window_capacity, 100);
        assert_eq!(config.viewer.status_interval, 50);
        assert_eq!(config.viewer.shutdown_grace(), Duration::from_secs(3));
        assert_eq!(config.server.read_buffer_size, 1024);
        assert_eq!(config.server.backlog, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sensetap.toml");
        std::fs::write(&path, "[viewer]\nhost = \"192.168.1.20\"\nport = 9000\n").unwrap();

        let config = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(config.viewer.url(), "http://192.168.1.20:9000");
        assert_eq!(config.viewer.event_name, "sensor_data");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = AppConfig::default();
        config.server.port = 9100;
        config.viewer.window_capacity = 250;
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.server.port, 9100);
        assert_eq!(loaded.viewer.window_capacity, 250);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut config = AppConfig::default();
        config.viewer.window_capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn zero_backlog_is_rejected() {
        let mut config = AppConfig::default();
        config.server.backlog = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn env_overrides_replace_host_and_port() {
        let vars: HashMap<&str, &str> = [
            ("SENSETAP_VIEWER_HOST", "10.0.0.5"),
            ("SENSETAP_SERVER_PORT", "7000"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_env_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.viewer.host, "10.0.0.5");
        assert_eq!(config.viewer.port, 8080);
        assert_eq!(config.server.port, 7000);
    }

    #[test]
    fn invalid_port_override_is_an_error() {
        let mut config = AppConfig::default();
        let result = config.apply_env_overrides(|key| {
            (key == "SENSETAP_VIEWER_PORT").then(|| "eighty".to_string())
        });
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[viewer\nport = ").unwrap();
        assert!(matches!(AppConfig::load_from_file(&path), Err(ConfigError::ParseError(_))));
    }
}
