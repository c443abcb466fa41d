//! Job registry.

use dashmap::DashMap;
use webclone_core::{CoreError, Job, JobId, Transition};

/// Keyed store of job records.
///
/// `update` is atomic per key: concurrent readers see the job either before
/// or after the transition, never in between.
pub trait JobStore: Send + Sync {
    fn put(&self, job: Job);

    fn get(&self, id: JobId) -> Option<Job>;

    /// Remove a job, returning it if it existed.
    fn delete(&self, id: JobId) -> Option<Job>;

    /// Apply `transition` to the stored job and return the updated record.
    fn update(&self, id: JobId, transition: Transition) -> Result<Job, CoreError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-lifetime registry on a sharded concurrent map.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: DashMap<JobId, Job>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for InMemoryJobStore {
    fn put(&self, job: Job) {
        self.jobs.insert(job.id, job);
    }

    fn get(&self, id: JobId) -> Option<Job> {
        self.jobs.get(&id).map(|entry| entry.value().clone())
    }

    fn delete(&self, id: JobId) -> Option<Job> {
        self.jobs.remove(&id).map(|(_, job)| job)
    }

    fn update(&self, id: JobId, transition: Transition) -> Result<Job, CoreError> {
        let mut entry = self.jobs.get_mut(&id).ok_or(CoreError::NotFound(id))?;
        entry.apply(transition)?;
        Ok(entry.value().clone())
    }

    fn len(&self) -> usize {
        self.jobs.len()
    }
}
