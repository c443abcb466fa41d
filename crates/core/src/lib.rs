//! Shared domain model for the webclone service.
//!
//! Holds the job record and its state machine, the snapshot produced by a
//! scrape, progress events, the generation payload projection, URL
//! validation and the retry-with-backoff combinator. Depends on no other
//! workspace crate.

pub mod error;
pub mod job;
pub mod job_events;
pub mod payload;
pub mod retry;
pub mod snapshot;
pub mod types;
pub mod validation;

pub use error::CoreError;
pub use job::{CloneResult, Job, JobStatus, Transition};
pub use job_events::ProgressEvent;
pub use snapshot::{Extraction, Snapshot};
pub use types::{JobId, Timestamp};
