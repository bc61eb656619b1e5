// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounded per-topic queue of encoded records.
//!
//! One `TopicChannel` exists per `(domain, topic)` pair. Publishers append
//! and never block: when the queue is full the oldest unread record is
//! dropped. Takers remove from the front, so every record is delivered to
//! exactly one `take()` call.
//!
//! # Thread Safety
//!
//! - queue: one `parking_lot::Mutex` per channel (unrelated topics never contend)
//! - counters: relaxed atomics, read as a best-effort snapshot

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of [`TopicChannel::publish`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    /// Appended without loss.
    Queued,
    /// Queue was full; the oldest record was evicted to make room.
    Evicted,
}

/// Counter snapshot for one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    pub published: u64,
    pub taken: u64,
    pub evicted: u64,
    /// Payloads dequeued but rejected by the codec.
    pub malformed: u64,
}

/// Bounded FIFO with drop-oldest overflow.
pub struct TopicChannel {
    domain_id: u32,
    topic: Arc<str>,
    capacity: usize,
    queue: Mutex<VecDeque<Vec<u8>>>,
    available: Condvar,
    published: AtomicU64,
    taken: AtomicU64,
    evicted: AtomicU64,
    malformed: AtomicU64,
}

impl TopicChannel {
    /// Create an empty channel. `capacity` must be non-zero (checked by the registry).
    pub(crate) fn new(domain_id: u32, topic: Arc<str>, capacity: usize) -> Self {
        debug_assert!(capacity > 0, "channel capacity must be > 0");
        Self {
            domain_id,
            topic,
            capacity,
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            available: Condvar::new(),
            published: AtomicU64::new(0),
            taken: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
            malformed: AtomicU64::new(0),
        }
    }

    pub fn domain_id(&self) -> u32 {
        self.domain_id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Append an encoded record (non-blocking).
    pub fn publish(&self, payload: Vec<u8>) -> Publish {
        let outcome = {
            let mut queue = self.queue.lock();
            let outcome = if queue.len() >= self.capacity {
                queue.pop_front();
                Publish::Evicted
            } else {
                Publish::Queued
            };
            queue.push_back(payload);
            outcome
        };

        self.published.fetch_add(1, Ordering::Relaxed);
        if outcome == Publish::Evicted {
            self.evicted.fetch_add(1, Ordering::Relaxed);
            log::debug!(
                "[TopicChannel] domain={} topic='{}' full ({}), dropped oldest",
                self.domain_id,
                self.topic,
                self.capacity
            );
        }
        self.available.notify_one();
        outcome
    }

    /// Remove the oldest record, or `None` if empty (non-blocking).
    pub fn take(&self) -> Option<Vec<u8>> {
        let payload = self.queue.lock().pop_front();
        if payload.is_some() {
            self.taken.fetch_add(1, Ordering::Relaxed);
        }
        payload
    }

    /// Like [`take`](Self::take) but waits up to `timeout` for a record.
    pub fn take_timeout(&self, timeout: Duration) -> Option<Vec<u8>> {
        // A timeout past the end of the clock waits without a deadline
        let deadline = Instant::now().checked_add(timeout);
        let mut queue = self.queue.lock();
        loop {
            if let Some(payload) = queue.pop_front() {
                self.taken.fetch_add(1, Ordering::Relaxed);
                return Some(payload);
            }
            let Some(deadline) = deadline else {
                self.available.wait(&mut queue);
                continue;
            };
            if self.available.wait_until(&mut queue, deadline).timed_out() {
                let payload = queue.pop_front();
                if payload.is_some() {
                    self.taken.fetch_add(1, Ordering::Relaxed);
                }
                return payload;
            }
        }
    }

    pub(crate) fn record_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> ChannelStats {
        ChannelStats {
            published: self.published.load(Ordering::Relaxed),
            taken: self.taken.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for TopicChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicChannel")
            .field("domain_id", &self.domain_id)
            .field("topic", &self.topic)
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}
