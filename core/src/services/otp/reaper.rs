//! Background purge of expired OTP records
//!
//! Expiry is enforced lazily at verification time; the reaper only reclaims
//! memory for codes that were never submitted. A purged record answers
//! `NotFound` instead of `Expired`, both of which tell the caller to request a
//! new code.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::clock::Clock;
use super::store::OtpStore;

/// Periodically removes expired records from an [`OtpStore`]
pub struct OtpReaper {
    store: Arc<OtpStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl OtpReaper {
    /// Create a reaper that sweeps every `interval`
    pub fn new(store: Arc<OtpStore>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            store,
            clock,
            interval,
        }
    }

    /// Run a single sweep
    pub async fn run_once(&self) -> ReapResult {
        let removed = self.store.purge_expired(self.clock.now()).await;
        let remaining = self.store.len().await;

        if removed > 0 {
            info!(
                removed,
                remaining,
                event = "otp_reaped",
                "Purged expired verification codes"
            );
        } else {
            debug!(remaining, "Reaper sweep found no expired codes");
        }

        ReapResult { removed, remaining }
    }

    /// Start the reaper as a background task
    ///
    /// This spawns a tokio task that sweeps at the configured interval until
    /// the returned handle is aborted or the runtime shuts down.
    pub fn start_background_task(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                interval_secs = self.interval.as_secs(),
                "OTP reaper started"
            );

            let mut interval_timer = tokio::time::interval(self.interval);
            // The first tick completes immediately; skip it so the first sweep
            // happens one interval after start.
            interval_timer.tick().await;

            loop {
                interval_timer.tick().await;
                self.run_once().await;
            }
        })
    }
}

/// Result of a reaper sweep
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReapResult {
    /// Records removed by this sweep
    pub removed: usize,
    /// Records left in the store
    pub remaining: usize,
}
