// Cancellable periodic timer for the animator.
//
// Each ticker runs as its own tokio task and tags every tick with the
// generation it was started under. Stopping (or dropping) the ticker aborts
// the task. A tick already sitting in the channel when the ticker is replaced
// still arrives, so receivers compare its generation with the current one
// and discard mismatches.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

#[derive(Debug)]
pub struct Ticker {
    generation: u64,
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Start emitting a [`Tick`] every `period`. The first tick arrives one
    /// full period after spawning. The task ends on its own if the receiver
    /// is dropped.
    pub fn spawn(period: Duration, generation: u64, tx: mpsc::Sender<Tick>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;
                if tx.send(Tick { generation }).await.is_err() {
                    debug!("Tick receiver closed, ticker (gen: {}) exiting", generation);
                    break;
                }
            }
        });

        Self {
            generation,
            period,
            handle: Some(handle),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Abort the timer task. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Ticker stopped (gen: {})", self.generation);
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
