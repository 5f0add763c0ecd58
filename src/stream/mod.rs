pub mod client;
pub mod dispatch;
pub mod rolling_window;
pub mod state;

pub use client::{Forwarder, StreamClient};
pub use dispatch::{EventDispatcher, EventHandler};
pub use rolling_window::RollingWindow;
pub use state::{ConnectionStatus, StatusLine, StatusTracker, StreamState};
