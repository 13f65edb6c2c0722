//! Cosmetic progress stepper shown while an extraction is in flight.
//!
//! The backend gives no progress callbacks, so this is a fixed-interval
//! ticker with no semantic meaning; it only cycles a step index for the
//! processing panel.

use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::AppEvent;

/// Step labels, cycled in order while processing.
pub const PROCESS_STEPS: [&str; 4] = [
    "Reading text…",
    "Detecting totals…",
    "Extracting line items…",
    "Building Excel…",
];

pub const STEP_COUNT: usize = PROCESS_STEPS.len();

/// Time between step advances.
pub const TICK_INTERVAL: Duration = Duration::from_millis(1100);

/// Self-terminating ticker task. Dropping the handle aborts the task, so
/// holding it only while the workflow is processing is the whole
/// cancellation story.
pub struct ProgressTicker {
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    /// Spawn a ticker that emits a tick event every interval until
    /// aborted or the receiving side goes away.
    pub fn spawn(tx: mpsc::Sender<AppEvent>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            // The first tick of a tokio interval fires immediately; skip
            // it so the stepper dwells on step 0 first.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(AppEvent::ProgressTick).await.is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
