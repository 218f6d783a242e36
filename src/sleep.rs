//! Cancellable lifecycle delays
//!
//! [`SleepScheduler::delay`] blocks the calling lifecycle operation for a
//! configured duration unless the caller's [`CancelToken`] fires first. The
//! wait has no internal budget of its own: cancellation comes from the
//! explicit token, never from an ambient transport timeout, so delays of
//! tens of minutes or more behave the same as short ones.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::errors::{TemporalError, TemporalResult};

/// Explicit cancellation signal for in-flight delays
///
/// Clonable; all clones observe the same signal. Cancellation is sticky:
/// once fired, every current and future wait returns immediately.
#[derive(Debug, Clone)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    /// Fire the signal, waking every pending wait
    pub fn cancel(&self) {
        // Send only fails when no receiver exists; we always hold one
        let _ = self.sender.send(true);
    }

    /// Whether the signal has fired
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolve when the signal fires; pending forever otherwise
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            // Sender gone without firing: this wait can never complete
            std::future::pending::<()>().await;
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Durations applied before creation and after destruction of the owning
/// record; at least one must be present
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelaySpec {
    pub before: Option<Duration>,
    pub after: Option<Duration>,
}

impl DelaySpec {
    pub fn before(duration: Duration) -> Self {
        Self {
            before: Some(duration),
            after: None,
        }
    }

    pub fn after(duration: Duration) -> Self {
        Self {
            before: None,
            after: Some(duration),
        }
    }

    /// Validate before any delay executes
    pub fn validate(&self) -> TemporalResult<()> {
        if self.before.is_none() && self.after.is_none() {
            return Err(TemporalError::configuration(
                "delay requires at least one of the before/after durations",
            ));
        }
        Ok(())
    }
}

/// Executes cancellable, context-bounded delays
pub struct SleepScheduler;

impl SleepScheduler {
    /// Wait for `duration`, or return early when `cancel` fires
    ///
    /// Cancellation surfaces as [`TemporalError::Cancelled`] carrying the
    /// time actually waited; it must be propagated as the operation's own
    /// cancellation, never treated as success or retried.
    pub async fn delay(duration: Duration, cancel: &CancelToken) -> TemporalResult<()> {
        let started = tokio::time::Instant::now();
        debug!(duration_ms = duration.as_millis() as u64, "lifecycle delay started");

        tokio::select! {
            _ = tokio::time::sleep(duration) => {
                debug!("lifecycle delay elapsed");
                Ok(())
            }
            _ = cancel.cancelled() => {
                let waited_ms = started.elapsed().as_millis() as u64;
                debug!(waited_ms, "lifecycle delay cancelled");
                Err(TemporalError::Cancelled { waited_ms })
            }
        }
    }
}
