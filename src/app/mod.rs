pub mod ui;
pub mod viewer_app;

pub use viewer_app::{ShutdownHandle, StreamViewerApp};
