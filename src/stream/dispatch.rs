use std::collections::HashMap;

use serde_json::Value;

use crate::error::StreamError;
use crate::types::{SensorEvent, StreamUpdate};

/// 事件处理函数：原始消息体 -> 状态更新
pub type EventHandler = fn(&str) -> Result<StreamUpdate, StreamError>;

/// Socket.IO 内置的连接 / 断开事件名
pub const OPEN_EVENT: &str = "open";
pub const CLOSE_EVENT: &str = "close";

/// 以事件名为键的分发表
#[derive(Clone)]
pub struct EventDispatcher {
    routes: HashMap<String, EventHandler>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// 标准路由：连接事件加上指定名称的传感器数据事件
    pub fn with_sensor_event(event_name: &str) -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register(OPEN_EVENT, on_open);
        dispatcher.register(CLOSE_EVENT, on_close);
        dispatcher.register(event_name, decode_sensor_event);
        dispatcher
    }

    pub fn register(&mut self, event_name: &str, handler: EventHandler) {
        self.routes.insert(event_name.to_string(), handler);
    }

    pub fn handler(&self, event_name: &str) -> Option<EventHandler> {
        self.routes.get(event_name).copied()
    }

    pub fn dispatch(&self, event_name: &str, body: &str) -> Result<StreamUpdate, StreamError> {
        let handler = self
            .handler(event_name)
            .ok_or_else(|| StreamError::UnknownEvent(event_name.to_string()))?;
        handler(body)
    }

    pub fn routes(&self) -> impl Iterator<Item = (&str, EventHandler)> {
        self.routes.iter().map(|(name, handler)| (name.as_str(), *handler))
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::with_sensor_event("sensor_data")
    }
}

fn on_open(_body: &str) -> Result<StreamUpdate, StreamError> {
    Ok(StreamUpdate::Connected)
}

fn on_close(_body: &str) -> Result<StreamUpdate, StreamError> {
    Ok(StreamUpdate::Disconnected)
}

/// 采集端发送的是 JSON 编码后的字符串；也接受直接内联的 JSON 对象
pub fn decode_sensor_event(body: &str) -> Result<StreamUpdate, StreamError> {
    let value: Value = serde_json::from_str(body)?;
    let event = match value {
        Value::String(inner) => SensorEvent::from_json(&inner)?,
        other => serde_json::from_value::<SensorEvent>(other)?,
    };
    Ok(StreamUpdate::Sensor(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCEL: &str = r#"{"data": {"sensor_type": "accelerometer", "magnitude": 9.81}}"#;

    #[test]
    fn string_encoded_payload_is_decoded() {
        let body = serde_json::to_string(ACCEL).unwrap();
        let update = decode_sensor_event(&body).unwrap();
        match update {
            StreamUpdate::Sensor(event) => {
                assert_eq!(event.reading().unwrap().magnitude(), 9.81);
            }
            other => panic!("unexpected update {:?}", other),
        }
    }

    #[test]
    fn inline_object_payload_is_decoded() {
        let update = decode_sensor_event(ACCEL).unwrap();
        assert!(matches!(update, StreamUpdate::Sensor(_)));
    }

    #[test]
    fn malformed_inner_json_is_a_decode_error() {
        let body = serde_json::to_string("{not json").unwrap();
        assert!(matches!(decode_sensor_event(&body), Err(StreamError::Decode(_))));
    }

    #[test]
    fn dispatch_routes_by_event_name() {
        let dispatcher = EventDispatcher::with_sensor_event("imu");
        assert_eq!(dispatcher.dispatch(OPEN_EVENT, "").unwrap(), StreamUpdate::Connected);
        assert_eq!(dispatcher.dispatch(CLOSE_EVENT, "").unwrap(), StreamUpdate::Disconnected);
        assert!(matches!(dispatcher.dispatch("imu", ACCEL), Ok(StreamUpdate::Sensor(_))));
        assert!(matches!(
            dispatcher.dispatch("sensor_data", ACCEL),
            Err(StreamError::UnknownEvent(_))
        ));
    }

    #[test]
    fn default_table_has_three_routes() {
        let dispatcher = EventDispatcher::default();
        let mut names: Vec<&str> = dispatcher.routes().map(|(name, _)| name).collect();
        names.sort();
        assert_eq!(names, vec!["close", "open", "sensor_data"]);
    }
}
