pub mod sensor_event;
pub mod stream_update;

pub use sensor_event::{SensorEvent, SensorKind, SensorReading, UNKNOWN_ACTIVITY};
pub use stream_update::{ReceivedUpdate, StreamUpdate};
