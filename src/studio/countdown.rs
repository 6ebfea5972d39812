use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Where the countdown publishes its value; `None` means inactive.
pub type CountdownDisplay = Arc<watch::Sender<Option<u32>>>;

/// Cancellation handle for a running countdown. Dropping it also cancels.
pub struct CountdownHandle {
    task: Option<JoinHandle<()>>,
    display: CountdownDisplay,
}

impl CountdownHandle {
    /// Shows `seed` immediately, then decrements once per `tick` until it reaches 0.
    pub fn start(seed: u32, tick: Duration, display: CountdownDisplay) -> Self {
        display.send_replace(Some(seed));

        let publisher = display.clone();
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + tick, tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut remaining = seed;
            while remaining > 0 {
                ticker.tick().await;
                remaining -= 1;
                publisher.send_replace(Some(remaining));
            }
        });

        Self {
            task: Some(task),
            display,
        }
    }

    /// Stops the timer and resets the display to inactive.
    pub fn cancel(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            self.display.send_replace(None);
        }
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
