use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
///
/// Cloning shares the underlying window, so every clone counts against the same cap.
#[derive(Clone)]
pub struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests: max_requests.max(1),
            window,
        }
    }

    /// Wait until a slot is free, then record the acquisition.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut window = self.timestamps.lock().await;
                match self.reserve(&mut window, Instant::now()) {
                    Ok(()) => return,
                    Err(wait) => wait,
                }
            };
            tracing::debug!(wait_ms = wait.as_millis() as u64, "Catalog request slot busy");
            tokio::time::sleep(wait).await;
        }
    }

    /// Claim a slot at `now`, or report how long until the oldest one frees up.
    fn reserve(&self, window: &mut VecDeque<Instant>, now: Instant) -> Result<(), Duration> {
        window.retain(|stamp| now.duration_since(*stamp) < self.window);
        if window.len() < self.max_requests {
            window.push_back(now);
            return Ok(());
        }
        Err(window
            .front()
            .map_or(Duration::ZERO, |oldest| (*oldest + self.window).saturating_duration_since(now)))
    }
}
