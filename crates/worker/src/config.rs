use std::time::Duration;

use webclone_core::retry::RetryPolicy;

/// Job execution settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Scrape attempts per job, including the first (default: `3`).
    pub max_scrape_attempts: u32,
    /// Backoff after the first failed attempt, in seconds (default: `1`).
    pub scrape_base_delay_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_scrape_attempts: 3,
            scrape_base_delay_secs: 1,
        }
    }
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default |
    /// |--------------------------|---------|
    /// | `MAX_SCRAPE_ATTEMPTS`    | `3`     |
    /// | `SCRAPE_BASE_DELAY_SECS` | `1`     |
    pub fn from_env() -> Self {
        let max_scrape_attempts: u32 = std::env::var("MAX_SCRAPE_ATTEMPTS")
            .unwrap_or_else(|_| "3".into())
            .parse()
            .expect("MAX_SCRAPE_ATTEMPTS must be a valid u32");

        let scrape_base_delay_secs: u64 = std::env::var("SCRAPE_BASE_DELAY_SECS")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("SCRAPE_BASE_DELAY_SECS must be a valid u64");

        Self {
            max_scrape_attempts,
            scrape_base_delay_secs,
        }
    }

    /// Backoff policy for the scrape engine.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_scrape_attempts,
            base_delay: Duration::from_secs(self.scrape_base_delay_secs),
            ..RetryPolicy::default()
        }
    }
}
