use std::time::Duration;

use tokio::{sync::Mutex, time::Instant};
use tracing::debug;

/// Enforces a minimum interval between outbound calls.
///
/// The lock is held while waiting, so concurrent callers are admitted one at a
/// time in arrival order. Single-process only.
#[derive(Debug)]
pub struct RateLimiter {
    name: &'static str,
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(name: &'static str, min_interval: Duration) -> Self {
        Self {
            name,
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Waits until the interval since the previous admitted call has passed.
    pub async fn acquire(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(prev) = *last_call {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!(limiter = self.name, wait_ms = wait.as_millis() as u64, "throttling");
                tokio::time::sleep(wait).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}
