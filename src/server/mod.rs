pub mod log_server;
pub mod record;

pub use log_server::{CloseReason, LogServer, ServerState, SessionReport};
pub use record::{interpret_chunk, ChunkRecord};
