// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Count of matched remote endpoints.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Signed counter driven by (subscription|publication)-matched deltas.
///
/// Only the transport's match notifications mutate it; consumers poll it.
/// A negative value means the transport reported more unmatches than
/// matches. It is logged, never clamped.
#[derive(Debug, Default)]
pub struct MatchedCounter {
    count: Mutex<i64>,
}

impl MatchedCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a signed delta and return the new count.
    pub fn apply(&self, delta: i32) -> i64 {
        let current = {
            let mut count = self.count.lock();
            *count += i64::from(delta);
            *count
        };
        if current < 0 {
            log::warn!(
                "[MATCHED] Counter went negative ({}) after delta {}",
                current,
                delta
            );
        }
        current
    }

    pub fn current(&self) -> i64 {
        *self.count.lock()
    }

    /// Poll every `poll_interval` until the count is at least `n`.
    ///
    /// Returns `false` if `timeout` elapses first. The last sleep is cut to
    /// the remaining time so the deadline is honored. A timeout too large to
    /// represent as an instant (e.g. `Duration::MAX`) waits without limit.
    pub fn wait_at_least(&self, n: i64, timeout: Duration, poll_interval: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            if self.current() >= n {
                return true;
            }
            let nap = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    poll_interval.min(deadline - now)
                }
                None => poll_interval,
            };
            std::thread::sleep(nap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    #[test]
    fn deltas_accumulate() {
        let counter = MatchedCounter::new();
        assert_eq!(counter.apply(1), 1);
        assert_eq!(counter.apply(2), 3);
        assert_eq!(counter.apply(-3), 0);
        assert_eq!(counter.current(), 0);
    }

    #[test]
    fn negative_count_is_kept() {
        let counter = MatchedCounter::new();
        assert_eq!(counter.apply(-1), -1);
        assert_eq!(counter.current(), -1);
    }

    #[test]
    fn concurrent_deltas_sum_exactly() {
        let counter = Arc::new(MatchedCounter::new());
        let expected = Arc::new(AtomicI64::new(0));

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                let expected = expected.clone();
                std::thread::spawn(move || {
                    let mut rng = fastrand::Rng::new();
                    for _ in 0..1_000 {
                        let delta = rng.i32(-3..=3);
                        counter.apply(delta);
                        expected.fetch_add(i64::from(delta), Ordering::Relaxed);
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().expect("worker panicked");
        }

        assert_eq!(counter.current(), expected.load(Ordering::Relaxed));
    }

    #[test]
    fn wait_succeeds_once_count_is_reached() {
        let counter = Arc::new(MatchedCounter::new());
        let bumper = {
            let counter = counter.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                counter.apply(2);
            })
        };
        assert!(counter.wait_at_least(2, Duration::from_secs(5), Duration::from_millis(5)));
        bumper.join().expect("bumper panicked");
    }

    #[test]
    fn wait_times_out_on_deadline() {
        let counter = MatchedCounter::new();
        let start = Instant::now();
        assert!(!counter.wait_at_least(1, Duration::from_millis(30), Duration::from_millis(500)));
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(30));
        assert!(waited < Duration::from_millis(400), "ignored deadline: {:?}", waited);
    }

    #[test]
    fn unbounded_timeout_does_not_overflow() {
        let counter = Arc::new(MatchedCounter::new());
        counter.apply(1);
        assert!(counter.wait_at_least(1, Duration::MAX, Duration::from_millis(1)));

        let bumper = {
            let counter = counter.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                counter.apply(1);
            })
        };
        assert!(counter.wait_at_least(2, Duration::MAX, Duration::from_millis(2)));
        bumper.join().expect("bumper panicked");
    }
}
