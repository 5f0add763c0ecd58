use serde::Deserialize;
use serde_json::Value;
use std::fmt;

pub const UNKNOWN_ACTIVITY: &str = "Unknown";

/// 传感器事件：没有强制模式，缺失或为 null 的字段使用默认值
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SensorEvent {
    #[serde(default)]
    pub timestamp: Value,
    #[serde(default)]
    pub data: Option<SensorReading>,
    #[serde(default)]
    pub device_info: Value,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SensorReading {
    /// 任意 JSON 值；非字符串按 `SensorKind::Other` 处理
    #[serde(default)]
    pub sensor_type: Option<Value>,
    #[serde(default)]
    pub magnitude: Option<f64>,
    #[serde(default)]
    pub current_activity: Option<String>,
    #[serde(default)]
    pub elapsed_seconds: Option<f64>,
}

impl SensorEvent {
    /// 解析 JSON 文本
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// 只有带 sensor_type 的事件才会写入滚动窗口
    pub fn reading(&self) -> Option<&SensorReading> {
        self.data.as_ref().filter(|reading| reading.sensor_type.is_some())
    }

    /// device_info 的单行摘要，用于状态栏
    pub fn device_summary(&self) -> Option<String> {
        match &self.device_info {
            Value::Null => None,
            Value::Object(map) if map.is_empty() => None,
            Value::Object(map) => Some(
                map.iter()
                    .map(|(key, value)| match value {
                        Value::String(s) => format!("{}={}", key, s),
                        other => format!("{}={}", key, other),
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl SensorReading {
    pub fn kind(&self) -> SensorKind {
        match &self.sensor_type {
            Some(Value::String(name)) => SensorKind::from(name.as_str()),
            Some(other) => SensorKind::Other(other.to_string()),
            None => SensorKind::Other(String::new()),
        }
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude.unwrap_or(0.0)
    }

    pub fn activity(&self) -> &str {
        self.current_activity.as_deref().unwrap_or(UNKNOWN_ACTIVITY)
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds.unwrap_or(0.0)
    }
}

/// 采集端会发送的传感器类型
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
    Magnetometer,
    RotationVector,
    Other(String),
}

impl From<&str> for SensorKind {
    fn from(name: &str) -> Self {
        match name {
            "accelerometer" => SensorKind::Accelerometer,
            "gyroscope" => SensorKind::Gyroscope,
            "magnetometer" => SensorKind::Magnetometer,
            "rotation_vector" => SensorKind::RotationVector,
            other => SensorKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Accelerometer => write!(f, "accelerometer"),
            SensorKind::Gyroscope => write!(f, "gyroscope"),
            SensorKind::Magnetometer => write!(f, "magnetometer"),
            SensorKind::RotationVector => write!(f, "rotation_vector"),
            SensorKind::Other(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_event_decodes() {
        let event = SensorEvent::from_json(
            r#"{"timestamp": 1700000000123,
                "data": {"sensor_type": "gyroscope", "magnitude": 0.42,
                         "current_activity": "Walking", "elapsed_seconds": 17},
                "device_info": {"model": "Pixel 7"}}"#,
        )
        .unwrap();

        let reading = event.reading().unwrap();
        assert_eq!(reading.kind(), SensorKind::Gyroscope);
        assert_eq!(reading.magnitude(), 0.42);
        assert_eq!(reading.activity(), "Walking");
        assert_eq!(reading.elapsed_seconds(), 17.0);
        assert_eq!(event.device_summary().as_deref(), Some("model=Pixel 7"));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let event = SensorEvent::from_json(r#"{"data": {"sensor_type": "accelerometer"}}"#).unwrap();
        let reading = event.reading().unwrap();
        assert_eq!(reading.magnitude(), 0.0);
        assert_eq!(reading.activity(), UNKNOWN_ACTIVITY);
        assert_eq!(reading.elapsed_seconds(), 0.0);
        assert_eq!(event.device_summary(), None);
    }

    #[test]
    fn null_fields_fall_back_to_defaults() {
        let event = SensorEvent::from_json(
            r#"{"data": {"sensor_type": "accelerometer", "magnitude": null, "current_activity": null}}"#,
        )
        .unwrap();
        let reading = event.reading().unwrap();
        assert_eq!(reading.magnitude(), 0.0);
        assert_eq!(reading.activity(), UNKNOWN_ACTIVITY);
    }

    #[test]
    fn event_without_sensor_type_has_no_reading() {
        let event = SensorEvent::from_json(r#"{"timestamp": 1, "data": {"magnitude": 3.0}}"#).unwrap();
        assert!(event.reading().is_none());

        let empty = SensorEvent::from_json("{}").unwrap();
        assert!(empty.reading().is_none());
    }

    #[test]
    fn unknown_sensor_names_are_kept() {
        assert_eq!(SensorKind::from("rotation_vector"), SensorKind::RotationVector);
        assert_eq!(SensorKind::from("barometer"), SensorKind::Other("barometer".to_string()));
        assert_eq!(SensorKind::from("barometer").to_string(), "barometer");
    }

    #[test]
    fn non_string_sensor_type_is_other() {
        let event = SensorEvent::from_json(
            r#"{"data": {"sensor_type": 3, "magnitude": 1.0, "current_activity": "Cycling"}}"#,
        )
        .unwrap();
        let reading = event.reading().unwrap();
        assert_eq!(reading.kind(), SensorKind::Other("3".to_string()));
        assert_eq!(reading.activity(), "Cycling");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SensorEvent::from_json("{\"data\": ").is_err());
    }
}
