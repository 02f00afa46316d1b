//! Outbound news search.
//!
//! [`SearchProvider`] is the one capability the scan pipeline needs: look up
//! a single vendor and say what came back. [`GoogleSearch`] is the HTTP
//! implementation; tests plug in scripted providers.

mod google;

pub use google::{GoogleSearch, SearchQuery};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::config::SearchConfig;
use crate::model::Finding;

/// Why a search gave up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchFailure {
    #[error("throttled on all {attempts} attempts")]
    Throttled { attempts: u32 },

    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    #[error("request failed: {0}")]
    Transport(String),
}

/// Result of searching for one vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(String),
    NoResults,
    Failed(SearchFailure),
}

impl From<SearchOutcome> for Finding {
    fn from(outcome: SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Found(body) => Finding::Found { body },
            SearchOutcome::NoResults => Finding::NoResults,
            SearchOutcome::Failed(failure) => Finding::Failed {
                reason: failure.to_string(),
            },
        }
    }
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Looks up negative news for `vendor`. Never errors: every problem is
    /// folded into [`SearchOutcome::Failed`].
    async fn search(&self, vendor: &str) -> SearchOutcome;
}

/// Fixed attempt budget with exponential backoff between throttled attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Wait after throttled attempt number `attempt` (1-based): `base * 2^attempt`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor)
    }

    /// Whether another attempt is allowed after `attempt` attempts.
    pub fn can_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(1))
    }
}

impl From<&SearchConfig> for RetryPolicy {
    fn from(config: &SearchConfig) -> Self {
        Self::new(config.attempts(), config.backoff_base())
    }
}

pub fn default_provider(config: &SearchConfig) -> anyhow::Result<GoogleSearch> {
    GoogleSearch::new(config)
}
