//! Browser automation for webclone.
//!
//! The scrape engine depends only on the traits in [`session`]. The
//! production implementation in [`chromium`] drives Chromium over the
//! DevTools protocol, either launched locally or attached remotely.

pub mod chromium;
pub mod config;
pub mod error;
pub mod remote;
pub mod session;
pub mod viewport;

pub use chromium::ChromiumSessionFactory;
pub use config::{BrowserMode, BrowserSettings, RemoteEndpoint};
pub use error::BrowserError;
pub use session::{NetworkRequest, PageHandle, RenderSession, ResourceKind, SessionFactory};
pub use viewport::Viewport;
