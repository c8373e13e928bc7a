use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Sliding-window limiter for outbound calls to one provider
pub struct RateLimiter {
    requests: Mutex<VecDeque<Instant>>,
    limit: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            requests: Mutex::new(VecDeque::new()),
            limit: limit.max(1),
            window,
        }
    }

    /// At most `limit` requests per second
    pub fn per_second(limit: usize) -> Self {
        Self::new(limit, Duration::from_secs(1))
    }

    /// Wait if needed to respect the limit, then record the request
    pub async fn wait_if_needed(&self) {
        let mut requests = self.requests.lock().await;

        loop {
            let now = Instant::now();
            while let Some(&oldest) = requests.front() {
                if now.duration_since(oldest) >= self.window {
                    requests.pop_front();
                } else {
                    break;
                }
            }

            if requests.len() < self.limit {
                requests.push_back(now);
                return;
            }

            let wait = match requests.front() {
                Some(&oldest) => self.window.saturating_sub(now.duration_since(oldest)),
                None => Duration::ZERO,
            };
            drop(requests); // Release lock before sleeping
            sleep(wait).await;
            requests = self.requests.lock().await;
        }
    }

    /// Requests recorded inside the current window
    #[cfg(test)]
    pub async fn request_count(&self) -> usize {
        let requests = self.requests.lock().await;
        let now = Instant::now();
        requests
            .iter()
            .filter(|&&at| now.duration_since(at) < self.window)
            .count()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_second(5)
    }
}
