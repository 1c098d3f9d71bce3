use std::{
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;

/// Fixed-window request counter keyed by client IP.
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<DashMap<String, Window>>,
    requests_per_window: u32,
    window_duration: Duration,
}

#[derive(Debug)]
struct Window {
    started: Instant,
    request_count: u32,
}

impl RateLimiter {
    pub fn per_minute(requests_per_minute: u32) -> Self {
        Self::new(requests_per_minute, Duration::from_secs(60))
    }

    pub fn new(requests_per_window: u32, window_duration: Duration) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            requests_per_window,
            window_duration,
        }
    }

    pub fn get_client_key(&self, addr: &SocketAddr) -> String {
        addr.ip().to_string()
    }

    pub fn check_rate_limit(&self, client_key: &str) -> bool {
        self.check_at(client_key, Instant::now())
    }

    fn check_at(&self, client_key: &str, now: Instant) -> bool {
        let mut window = self
            .windows
            .entry(client_key.to_string())
            .or_insert(Window {
                started: now,
                request_count: 0,
            });

        if now.duration_since(window.started) >= self.window_duration {
            window.started = now;
            window.request_count = 0;
        }

        if window.request_count >= self.requests_per_window {
            return false;
        }

        window.request_count += 1;
        true
    }

    /// Drops windows idle for longer than one window length.
    pub fn prune(&self) {
        let now = Instant::now();
        self.windows
            .retain(|_, w| now.duration_since(w.started) < self.window_duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_quota_until_window_rolls() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();

        assert!(limiter.check_at("10.0.0.1", start));
        assert!(limiter.check_at("10.0.0.1", start));
        assert!(!limiter.check_at("10.0.0.1", start + Duration::from_secs(1)));

        assert!(limiter.check_at("10.0.0.2", start));

        assert!(limiter.check_at("10.0.0.1", start + Duration::from_secs(61)));
    }
}
