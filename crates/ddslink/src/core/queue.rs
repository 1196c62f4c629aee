// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounded-wait FIFO used by every reader.
//!
//! # Architecture
//! - `parking_lot::Mutex<VecDeque<T>>` holds the items
//! - `Condvar` signaled after every push
//!
//! Timed waits are a single deadline-bounded condvar wait, not a polling
//! loop: spurious wakeups re-wait for the remaining time only.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::Duration;

/// Thread-safe FIFO with blocking and timed pops.
///
/// # Example
/// ```
/// use ddslink::core::WaitQueue;
/// use std::time::Duration;
///
/// let queue = WaitQueue::new();
/// queue.push(1);
/// queue.push(2);
/// assert_eq!(queue.pop_timeout(Duration::from_millis(1)), Some(1));
/// assert_eq!(queue.try_pop(), Some(2));
/// assert_eq!(queue.pop_timeout(Duration::from_millis(1)), None);
/// ```
#[derive(Debug)]
pub struct WaitQueue<T> {
    items: Mutex<VecDeque<T>>,
    available: Condvar,
}

impl<T> WaitQueue<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
        }
    }

    /// Append `item` and wake waiters.
    pub fn push(&self, item: T) {
        self.items.lock().push_back(item);
        // Waiters may only be peeking (wait_until_nonempty), so wake them all.
        self.available.notify_all();
    }

    /// Block until an item is available, then pop it.
    pub fn pop_wait(&self) -> T {
        let mut items = self.items.lock();
        loop {
            if let Some(item) = items.pop_front() {
                return item;
            }
            self.available.wait(&mut items);
        }
    }

    /// Pop, waiting at most `timeout`. `None` if nothing arrived.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let mut items = self.items.lock();
        if items.is_empty() {
            self.available
                .wait_while_for(&mut items, |q| q.is_empty(), timeout);
        }
        items.pop_front()
    }

    /// Pop without waiting.
    pub fn try_pop(&self) -> Option<T> {
        self.items.lock().pop_front()
    }

    /// Block until the queue is non-empty, without popping.
    pub fn wait_until_nonempty(&self) {
        let mut items = self.items.lock();
        self.available.wait_while(&mut items, |q| q.is_empty());
    }

    /// As [`wait_until_nonempty`](Self::wait_until_nonempty), bounded by
    /// `timeout`. Returns whether the queue is non-empty.
    pub fn wait_until_nonempty_for(&self, timeout: Duration) -> bool {
        let mut items = self.items.lock();
        if items.is_empty() {
            self.available
                .wait_while_for(&mut items, |q| q.is_empty(), timeout);
        }
        !items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Drop every queued item, returning how many there were.
    pub fn clear(&self) -> usize {
        let mut items = self.items.lock();
        let n = items.len();
        items.clear();
        n
    }
}

impl<T> Default for WaitQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    #[test]
    fn pops_in_push_order() {
        let queue = WaitQueue::new();
        let n = 200 + fastrand::usize(..300);
        for i in 0..n {
            queue.push(i);
        }
        assert_eq!(queue.len(), n);
        for i in 0..n {
            assert_eq!(queue.pop_wait(), i);
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn timed_pop_on_empty_queue_waits_the_full_timeout() {
        let queue: WaitQueue<u32> = WaitQueue::new();
        let timeout = Duration::from_millis(50);
        let start = Instant::now();
        assert_eq!(queue.pop_timeout(timeout), None);
        let waited = start.elapsed();
        assert!(waited >= timeout, "returned early after {:?}", waited);
        assert!(waited < timeout + Duration::from_secs(1), "overslept {:?}", waited);
    }

    #[test]
    fn blocked_pop_wakes_on_push() {
        let queue = Arc::new(WaitQueue::new());
        let consumer = {
            let queue = queue.clone();
            std::thread::spawn(move || queue.pop_wait())
        };
        std::thread::sleep(Duration::from_millis(20));
        queue.push("hello");
        assert_eq!(consumer.join().expect("consumer panicked"), "hello");
    }

    #[test]
    fn peek_wait_does_not_consume() {
        let queue = Arc::new(WaitQueue::new());
        let peeker = {
            let queue = queue.clone();
            std::thread::spawn(move || queue.wait_until_nonempty_for(Duration::from_secs(5)))
        };
        std::thread::sleep(Duration::from_millis(10));
        queue.push(7u8);
        assert!(peeker.join().expect("peeker panicked"));
        assert_eq!(queue.try_pop(), Some(7));
        assert!(!queue.wait_until_nonempty_for(Duration::from_millis(5)));
    }

    #[test]
    fn clear_reports_dropped_items() {
        let queue = WaitQueue::new();
        queue.push(1);
        queue.push(2);
        assert_eq!(queue.clear(), 2);
        assert_eq!(queue.try_pop(), None);
    }
}
