//! WebSocket progress streaming.
//!
//! One connection per watched job, fed by the notification hub.

mod handler;

pub use handler::{ws_handler, HEARTBEAT_INTERVAL};
