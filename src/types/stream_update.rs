use super::SensorEvent;

/// 传输线程交给渲染线程的更新消息
#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    Connected,
    Disconnected,
    Sensor(SensorEvent),
    /// 消息体无法解码，已丢弃
    DecodeFailed(String),
}

/// 带到达时间的更新；时间在传输回调触发时记录，而不是渲染线程取出时
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedUpdate {
    pub update: StreamUpdate,
    /// Unix 纪元秒
    pub arrival: f64,
}

impl ReceivedUpdate {
    pub fn new(update: StreamUpdate, arrival: f64) -> Self {
        Self { update, arrival }
    }
}
