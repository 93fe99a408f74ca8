use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

const TICK: Duration = Duration::from_secs(1);

/// Exam timer that ticks once per second on the tokio runtime.
///
/// Remaining seconds are observable through a `watch` channel. `expired()`
/// resolves once the timer reaches zero. The background task is aborted on
/// `cancel()` and on drop.
pub struct ExamCountdown {
    remaining: watch::Receiver<u64>,
    expiry: Option<oneshot::Receiver<()>>,
    fired: bool,
    task: JoinHandle<()>,
}

impl ExamCountdown {
    /// Start counting down from `total_secs`. Must be called inside a tokio runtime.
    #[must_use]
    pub fn start(total_secs: u64) -> Self {
        let (remaining_tx, remaining) = watch::channel(total_secs);
        let (expiry_tx, expiry) = oneshot::channel();

        let task = tokio::spawn(async move {
            let mut ticker = interval(TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // first tick completes immediately
            ticker.tick().await;

            let mut left = total_secs;
            while left > 0 {
                ticker.tick().await;
                left -= 1;
                remaining_tx.send_replace(left);
            }
            let _ = expiry_tx.send(());
        });

        Self {
            remaining,
            expiry: Some(expiry),
            fired: false,
            task,
        }
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u64 {
        *self.remaining.borrow()
    }

    /// A receiver that observes every tick.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.remaining.clone()
    }

    /// Wait for the timer to hit zero.
    ///
    /// Returns `true` when it expired and `false` when it was cancelled first.
    pub async fn expired(&mut self) -> bool {
        if self.fired {
            return true;
        }
        let Some(expiry) = self.expiry.take() else {
            return false;
        };
        self.fired = expiry.await.is_ok();
        self.fired
    }

    pub fn cancel(&mut self) {
        self.task.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ExamCountdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}
