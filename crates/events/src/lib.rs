//! Progress event plumbing for webclone.
//!
//! - [`ProgressSink`]: where the job orchestrator emits progress.
//! - [`EventBus`]: in-process broadcast channel implementing the sink.
//! - [`NotificationHub`]: per-job routing to the live client connection.

pub mod bus;
pub mod hub;
pub mod sink;

pub use bus::EventBus;
pub use hub::{ConnectionId, EventSender, NotificationHub};
pub use sink::ProgressSink;
