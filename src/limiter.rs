//! Call-admission rate limiting
//!
//! Sliding-window limiter governing how many chat calls are admitted per
//! time period. Both the blocking and the async invocation paths share one
//! window, so mixed use stays within a single budget. The limiter governs
//! admission only; it plays no part in error handling.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Sliding-window rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    timestamps: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter admitting `max_rate` calls per `time_period`
    ///
    /// A `max_rate` below one still admits one call per window.
    #[must_use]
    pub fn new(max_rate: f64, time_period: Duration) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let max_requests = max_rate.max(1.0) as usize;
        Self {
            max_requests,
            window: time_period,
            timestamps: Mutex::new(VecDeque::new()),
        }
    }

    /// Try to admit a call now
    ///
    /// On denial returns how long to wait before the oldest tracked call
    /// leaves the window.
    fn try_acquire(&self) -> std::result::Result<(), Duration> {
        let now = Instant::now();
        let mut timestamps = self.timestamps.lock();

        while let Some(oldest) = timestamps.front() {
            if now.duration_since(*oldest) >= self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        if timestamps.len() >= self.max_requests {
            let retry_after = timestamps
                .front()
                .map_or(self.window, |oldest| {
                    self.window.saturating_sub(now.duration_since(*oldest))
                });
            return Err(retry_after.max(Duration::from_millis(1)));
        }

        timestamps.push_back(now);
        Ok(())
    }

    /// Block the current thread until a call is admitted
    pub fn acquire_blocking(&self) {
        loop {
            match self.try_acquire() {
                Ok(()) => return,
                Err(retry_after) => std::thread::sleep(retry_after),
            }
        }
    }

    /// Suspend until a call is admitted
    pub async fn acquire(&self) {
        loop {
            match self.try_acquire() {
                Ok(()) => return,
                Err(retry_after) => tokio::time::sleep(retry_after).await,
            }
        }
    }

    /// Remaining calls in the current window
    #[must_use]
    pub fn remaining(&self) -> usize {
        let now = Instant::now();
        let timestamps = self.timestamps.lock();
        let in_window = timestamps
            .iter()
            .filter(|t| now.duration_since(**t) < self.window)
            .count();
        self.max_requests.saturating_sub(in_window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_up_to_limit() {
        let limiter = RateLimiter::new(3.0, Duration::from_secs(60));
        assert!(limiter.try_acquire().is_ok());
        assert!(limiter.try_acquire().is_ok());
        assert!(limiter.try_acquire().is_ok());
        assert!(limiter.try_acquire().is_err());
        assert_eq!(limiter.remaining(), 0);
    }

    #[test]
    fn test_window_expiry_readmits() {
        let limiter = RateLimiter::new(1.0, Duration::from_millis(20));
        assert!(limiter.try_acquire().is_ok());
        assert!(limiter.try_acquire().is_err());
        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.try_acquire().is_ok());
    }

    #[test]
    fn test_fractional_rate_admits_one() {
        let limiter = RateLimiter::new(0.1, Duration::from_secs(60));
        assert!(limiter.try_acquire().is_ok());
        assert!(limiter.try_acquire().is_err());
    }

    #[test]
    fn test_blocking_acquire_waits_out_the_window() {
        let limiter = RateLimiter::new(1.0, Duration::from_millis(20));
        let start = Instant::now();
        limiter.acquire_blocking();
        limiter.acquire_blocking();
        assert!(start.elapsed() >= Duration::from_millis(15));
    }

    #[tokio::test]
    async fn test_async_acquire() {
        let limiter = RateLimiter::new(2.0, Duration::from_millis(20));
        limiter.acquire().await;
        limiter.acquire().await;
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(10));
    }
}
