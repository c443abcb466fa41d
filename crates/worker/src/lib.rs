//! Job execution for webclone: the registry, the generation collaborator
//! and the orchestrator that drives jobs through their stages.

pub mod config;
pub mod generator;
pub mod orchestrator;
pub mod store;

pub use config::WorkerConfig;
pub use generator::{GenerationError, Generator, TemplateGenerator};
pub use orchestrator::{JobOrchestrator, OrchestratorConfig, OrchestratorError};
pub use store::{InMemoryJobStore, JobStore};
