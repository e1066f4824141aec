//! Process-wide outbound request throttle
//!
//! A token bucket holding `capacity` permits per `window`. A permit taken at
//! time `t` becomes available again at `t + window`, so a burst drains the
//! bucket and the whole bucket refills one window later. In any interval of
//! length `window` at most `capacity` permits are handed out.
//!
//! Waiters queue on a fair `tokio::sync::Mutex` and are served in arrival
//! order. All timing goes through `tokio::time`, so tests drive the limiter
//! with a paused clock.

use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Token bucket shared by every outbound HTTP call
#[derive(Debug)]
pub struct RateLimiter {
    capacity: usize,
    window: Duration,

    /// Instants at which the permits of the current bucket were taken, oldest first
    taken: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter granting `capacity` permits per `window`
    #[must_use]
    pub fn new(capacity: NonZeroU32, window: Duration) -> Self {
        let capacity = capacity.get() as usize;

        Self {
            capacity,
            window,
            taken: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Create a limiter granting `capacity` permits per minute
    #[must_use]
    pub fn per_minute(capacity: NonZeroU32) -> Self {
        Self::new(capacity, Duration::from_secs(60))
    }

    /// Maximum number of permits per window
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Length of the refill window
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Wait until a permit is available and consume it
    ///
    /// Never fails, only delays. Callers waiting concurrently are served in
    /// the order they called `acquire`.
    pub async fn acquire(&self) {
        let mut taken = self.taken.lock().await;

        loop {
            let now = Instant::now();
            self.release_expired(&mut taken, now);

            if taken.len() < self.capacity {
                taken.push_back(now);
                return;
            }

            if let Some(&oldest) = taken.front() {
                let refill_at = oldest + self.window;
                tracing::debug!(
                    capacity = self.capacity,
                    wait_ms = refill_at.duration_since(now).as_millis() as u64,
                    "Rate limit reached, waiting for refill"
                );
                sleep_until(refill_at).await;
            }
        }
    }

    /// Permits that can be taken right now without waiting
    pub async fn available(&self) -> usize {
        let mut taken = self.taken.lock().await;
        self.release_expired(&mut taken, Instant::now());
        self.capacity - taken.len()
    }

    fn release_expired(&self, taken: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = taken.front() {
            if now.duration_since(oldest) < self.window {
                break;
            }
            taken.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn limiter(capacity: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(
            NonZeroU32::new(capacity).unwrap(),
            Duration::from_secs(window_secs),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_bucket_is_immediate() {
        let limiter = limiter(5, 60);
        let start = Instant::now();

        for _ in 0..5 {
            limiter.acquire().await;
        }

        assert_eq!(Instant::now(), start);
        assert_eq!(limiter.available().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_refill() {
        let limiter = limiter(3, 60);
        let start = Instant::now();

        for _ in 0..3 {
            limiter.acquire().await;
        }
        limiter.acquire().await;

        assert_eq!(Instant::now() - start, Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bucket_refills_fully_after_window() {
        let limiter = limiter(4, 60);

        for _ in 0..4 {
            limiter.acquire().await;
        }
        assert_eq!(limiter.available().await, 0);

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(limiter.available().await, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_bound_holds_for_any_window() {
        let limiter = Arc::new(limiter(3, 10));
        let dispatched = Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let limiter = limiter.clone();
            let dispatched = dispatched.clone();
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
                dispatched.lock().unwrap().push(Instant::now());
            }));
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut times = dispatched.lock().unwrap().clone();
        times.sort();
        assert_eq!(times.len(), 10);
        for pair in times.windows(4) {
            assert!(
                pair[3] - pair[0] >= Duration::from_secs(10),
                "more than 3 permits within one window"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiters_served_in_arrival_order() {
        let limiter = Arc::new(limiter(1, 5));
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        limiter.acquire().await;

        let mut handles = Vec::new();
        for i in 0..4 {
            let limiter = limiter.clone();
            let order = order.clone();
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
                order.lock().unwrap().push(i);
            }));
            tokio::task::yield_now().await;
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_per_minute() {
        let limiter = RateLimiter::per_minute(NonZeroU32::new(30).unwrap());
        assert_eq!(limiter.capacity(), 30);
        assert_eq!(limiter.window(), Duration::from_secs(60));
    }
}
