// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Rate limiters deciding how long a failed work item waits before it is re-queued.
//!
//! - [`ItemExponentialFailureRateLimiter`] doubles the delay for every consecutive
//!   failure of the same item, starting at 5ms and capped at 1000s
//! - [`BucketRateLimiter`] is an overall token bucket (10/s, burst 100) shared by
//!   all items
//! - [`MaxOfRateLimiter`] combines limiters by taking the longest delay

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::constants::{
    BUCKET_BURST, BUCKET_RATE_PER_SEC, ITEM_BACKOFF_BASE_DELAY, ITEM_BACKOFF_MAX_DELAY,
};

/// Decides the delay before an item is retried.
pub trait RateLimiter<T>: Send + Sync {
    /// Delay before `item` may be processed again. Records a failure for it.
    fn when(&self, item: &T) -> Duration;

    /// Stop tracking `item`, resetting its backoff.
    fn forget(&self, item: &T);

    /// Number of failures recorded for `item` since it was last forgotten.
    fn num_requeues(&self, item: &T) -> u32;
}

fn lock<S>(mutex: &Mutex<S>) -> MutexGuard<'_, S> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-item exponential backoff: `base * 2^failures`, capped at `max`.
pub struct ItemExponentialFailureRateLimiter<T> {
    base: Duration,
    max: Duration,
    failures: Mutex<HashMap<T, u32>>,
}

impl<T> ItemExponentialFailureRateLimiter<T> {
    #[must_use]
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            failures: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> Default for ItemExponentialFailureRateLimiter<T> {
    fn default() -> Self {
        Self::new(ITEM_BACKOFF_BASE_DELAY, ITEM_BACKOFF_MAX_DELAY)
    }
}

impl<T: Clone + Eq + Hash + Send> RateLimiter<T> for ItemExponentialFailureRateLimiter<T> {
    fn when(&self, item: &T) -> Duration {
        let mut failures = lock(&self.failures);
        let count = failures.entry(item.clone()).or_insert(0);
        let exponent = *count;
        *count = count.saturating_add(1);

        let exponent = i32::try_from(exponent).unwrap_or(i32::MAX);
        let backoff = self.base.as_secs_f64() * 2f64.powi(exponent);
        if !backoff.is_finite() || backoff > self.max.as_secs_f64() {
            return self.max;
        }
        Duration::from_secs_f64(backoff)
    }

    fn forget(&self, item: &T) {
        lock(&self.failures).remove(item);
    }

    fn num_requeues(&self, item: &T) -> u32 {
        lock(&self.failures).get(item).copied().unwrap_or(0)
    }
}

struct Bucket {
    tokens: f64,
    last: Instant,
}

/// Overall token bucket. Each call reserves one token; once the bucket is empty
/// the delay grows with the number of outstanding reservations.
pub struct BucketRateLimiter {
    rate: f64,
    burst: f64,
    bucket: Mutex<Bucket>,
}

impl BucketRateLimiter {
    /// Bucket refilled at `rate` tokens per second, holding at most `burst` tokens.
    #[must_use]
    pub fn new(rate: f64, burst: u32) -> Self {
        let burst = f64::from(burst);
        Self {
            rate,
            burst,
            bucket: Mutex::new(Bucket {
                tokens: burst,
                last: Instant::now(),
            }),
        }
    }
}

impl Default for BucketRateLimiter {
    fn default() -> Self {
        Self::new(BUCKET_RATE_PER_SEC, BUCKET_BURST)
    }
}

impl<T> RateLimiter<T> for BucketRateLimiter {
    fn when(&self, _item: &T) -> Duration {
        let mut bucket = lock(&self.bucket);
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(bucket.last).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.burst);
        bucket.last = now;
        bucket.tokens -= 1.0;

        if bucket.tokens >= 0.0 || self.rate <= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(-bucket.tokens / self.rate)
        }
    }

    fn forget(&self, _item: &T) {}

    fn num_requeues(&self, _item: &T) -> u32 {
        0
    }
}

/// Combines limiters; the longest delay wins.
pub struct MaxOfRateLimiter<T> {
    limiters: Vec<Box<dyn RateLimiter<T>>>,
}

impl<T> MaxOfRateLimiter<T> {
    #[must_use]
    pub fn new(limiters: Vec<Box<dyn RateLimiter<T>>>) -> Self {
        Self { limiters }
    }
}

impl<T> RateLimiter<T> for MaxOfRateLimiter<T> {
    fn when(&self, item: &T) -> Duration {
        self.limiters
            .iter()
            .map(|limiter| limiter.when(item))
            .max()
            .unwrap_or(Duration::ZERO)
    }

    fn forget(&self, item: &T) {
        for limiter in &self.limiters {
            limiter.forget(item);
        }
    }

    fn num_requeues(&self, item: &T) -> u32 {
        self.limiters
            .iter()
            .map(|limiter| limiter.num_requeues(item))
            .max()
            .unwrap_or(0)
    }
}

/// Limiter used by the event processor: per-item exponential backoff bounded
/// below by the overall token bucket.
#[must_use]
pub fn default_controller_rate_limiter<T>() -> MaxOfRateLimiter<T>
where
    T: Clone + Eq + Hash + Send + 'static,
{
    MaxOfRateLimiter::new(vec![
        Box::new(ItemExponentialFailureRateLimiter::<T>::default()),
        Box::new(BucketRateLimiter::default()),
    ])
}

#[cfg(test)]
#[path = "rate_limiter_tests.rs"]
mod rate_limiter_tests;
