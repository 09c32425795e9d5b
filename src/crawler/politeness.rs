//! Randomized delay between page fetches
//!
//! The frontier engine fetches one page at a time; between pages it sleeps for
//! a random duration inside a configured window so requests do not arrive at a
//! fixed rhythm. This is rate control only and never part of error recovery.

use crate::config::PolitenessConfig;
use rand::Rng;
use std::time::Duration;

/// Bounded random delay, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Politeness {
    lower_ms: u64,
    upper_ms: u64,
}

impl Politeness {
    /// Creates a delay window; bounds given in the wrong order are swapped
    pub fn new(lower_ms: u64, upper_ms: u64) -> Self {
        Self {
            lower_ms: lower_ms.min(upper_ms),
            upper_ms: lower_ms.max(upper_ms),
        }
    }

    /// No delay at all
    pub fn none() -> Self {
        Self::new(0, 0)
    }

    pub fn from_config(config: &PolitenessConfig) -> Self {
        Self::new(config.wait_lower, config.wait_upper)
    }

    /// Picks the next delay uniformly from the window
    pub fn next_delay(&self) -> Duration {
        if self.lower_ms == self.upper_ms {
            return Duration::from_millis(self.lower_ms);
        }
        let ms = rand::thread_rng().gen_range(self.lower_ms..=self.upper_ms);
        Duration::from_millis(ms)
    }

    /// Sleeps for [`Politeness::next_delay`]
    pub async fn wait(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tracing::trace!("Waiting {:?} before next fetch", delay);
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for Politeness {
    fn default() -> Self {
        Self::from_config(&PolitenessConfig::default())
    }
}
