//! Request pacing for outbound Spotify calls.
//!
//! One token bucket is shared by every provider call in the process, so
//! concurrent workers draw from a single global request budget instead of
//! each sleeping a fixed interval.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Trait for pacing outbound provider requests.
pub trait RequestThrottler: Send + Sync {
    /// Block until the caller may issue one request.
    fn acquire(&self);
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Token-bucket limiter: refills at `qps` tokens per second up to `capacity`.
///
/// A depleted bucket makes `acquire` sleep until the next token accrues.
pub struct TokenBucket {
    state: Mutex<BucketState>,
    capacity: f64,
    qps: f64,
}

impl TokenBucket {
    /// Bucket with a burst capacity of one second's worth of requests.
    pub fn new(qps: f64) -> Self {
        Self::with_capacity(qps, qps.max(1.0))
    }

    pub fn with_capacity(qps: f64, capacity: f64) -> Self {
        assert!(qps > 0.0, "qps must be positive");
        Self {
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
            capacity,
            qps,
        }
    }
}

impl RequestThrottler for TokenBucket {
    fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().unwrap();
                let elapsed = state.last_refill.elapsed();
                state.tokens =
                    (state.tokens + elapsed.as_secs_f64() * self.qps).min(self.capacity);
                state.last_refill = Instant::now();

                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return;
                }
                Duration::from_secs_f64((1.0 - state.tokens) / self.qps)
            };
            std::thread::sleep(wait);
        }
    }
}

/// Throttler that never waits. Used by tests and one-off maintenance runs.
pub struct NoOpThrottler;

impl RequestThrottler for NoOpThrottler {
    fn acquire(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_op_throttler_never_waits() {
        let throttler = NoOpThrottler;
        let start = Instant::now();
        for _ in 0..100 {
            throttler.acquire();
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_burst_within_capacity_is_immediate() {
        let bucket = TokenBucket::with_capacity(10.0, 5.0);
        let start = Instant::now();
        for _ in 0..5 {
            bucket.acquire();
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_acquire_beyond_capacity_waits_for_refill() {
        // Capacity 1, 20 tokens/sec: the second acquire must wait ~50ms.
        let bucket = TokenBucket::with_capacity(20.0, 1.0);
        bucket.acquire();
        let start = Instant::now();
        bucket.acquire();
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_bucket_is_shared_across_threads() {
        use std::sync::Arc;

        let bucket = Arc::new(TokenBucket::with_capacity(20.0, 1.0));
        let start = Instant::now();
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let bucket = Arc::clone(&bucket);
                std::thread::spawn(move || bucket.acquire())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        // One token available immediately, two more accrue at 20/sec.
        assert!(start.elapsed() >= Duration::from_millis(80));
    }
}
