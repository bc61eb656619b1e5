// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Session: a caller's handle bound to one `(domain, topic)` channel.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --init()--> Active --shutdown()--> Shutdown (terminal)
//! ```
//!
//! `write` and `take` are only valid while `Active`. `shutdown` releases the
//! session's channel reference; the channel itself stays in the registry.
//!
//! # Thread Safety
//!
//! A session may be shared between threads. Its state sits behind one mutex
//! that `write`, `take` and `shutdown` all acquire, so a shutdown never races
//! an in-flight publish or dequeue on the same session. Lock order is always
//! session then channel.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::channel::{ChannelStats, Publish, TopicChannel};
use crate::codec;
use crate::config::SessionConfig;
use crate::registry::DomainRegistry;
use crate::{Error, Record, Result};

/// Coarse lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Active,
    Shutdown,
}

/// Snapshot returned by [`Session::info`]
///
/// `domain_id` and `topic_name` are kept after shutdown so callers can still
/// see what the session was bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionInfo {
    pub initialized: bool,
    pub domain_id: Option<u32>,
    pub topic_name: Option<String>,
}

struct Binding {
    domain_id: u32,
    topic: Arc<str>,
    channel: Arc<TopicChannel>,
}

enum State {
    Uninitialized,
    Active(Binding),
    Shutdown { domain_id: u32, topic: Arc<str> },
}

/// Publish/subscribe handle for one topic.
pub struct Session {
    registry: Arc<DomainRegistry>,
    config: SessionConfig,
    state: Mutex<State>,
}

impl Session {
    /// Create an uninitialized session using the environment-derived config.
    pub fn new(registry: Arc<DomainRegistry>) -> Self {
        Self::with_config(registry, SessionConfig::default())
    }

    pub fn with_config(registry: Arc<DomainRegistry>, config: SessionConfig) -> Self {
        Self {
            registry,
            config,
            state: Mutex::new(State::Uninitialized),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Bind to `topic` in the configured default domain.
    pub fn init(&self, topic: &str) -> Result<()> {
        self.init_with_domain(topic, self.config.default_domain_id)
    }

    /// Bind to `topic` in `domain_id`.
    pub fn init_with_domain(&self, topic: &str, domain_id: u32) -> Result<()> {
        let mut state = self.state.lock();
        match *state {
            State::Uninitialized => {}
            State::Active(_) => return Err(Error::AlreadyInitialized),
            State::Shutdown { .. } => return Err(Error::SessionClosed),
        }

        let channel = self.registry.resolve_or_create(domain_id, topic)?;
        log::debug!(
            "[Session] Active on domain={} topic='{}'",
            domain_id,
            topic
        );
        *state = State::Active(Binding {
            domain_id,
            topic: Arc::from(topic),
            channel,
        });
        Ok(())
    }

    /// Publish one record (never blocks; may evict the oldest queued record).
    pub fn write(&self, record: &Record) -> Result<()> {
        let state = self.state.lock();
        let binding = Self::active(&state)?;

        let len = record.message().len();
        if len > self.config.max_message_len {
            return Err(Error::MessageTooLarge {
                len,
                max: self.config.max_message_len,
            });
        }

        if binding.channel.publish(codec::encode(record)?) == Publish::Evicted {
            log::trace!(
                "[Session] write index={} evicted oldest on '{}'",
                record.index(),
                binding.topic
            );
        }
        Ok(())
    }

    /// Take the oldest pending record, or `None` if nothing is queued.
    ///
    /// A queued payload that fails to decode is counted and dropped, and the
    /// call reports `None` rather than an error.
    pub fn take(&self) -> Result<Option<Record>> {
        let state = self.state.lock();
        let binding = Self::active(&state)?;
        Ok(binding
            .channel
            .take()
            .and_then(|payload| Self::decode_or_drop(&binding.channel, &payload)))
    }

    /// Text-only projection of [`take`](Self::take).
    pub fn take_message(&self) -> Result<Option<String>> {
        Ok(self.take()?.map(Record::into_message))
    }

    /// Wait up to `timeout` for a record.
    ///
    /// The session lock is released while waiting, so a concurrent
    /// `shutdown` returns immediately; this call may still hand back a record
    /// that was dequeued before it noticed.
    pub fn take_timeout(&self, timeout: Duration) -> Result<Option<Record>> {
        let channel = {
            let state = self.state.lock();
            Self::active(&state)?.channel.clone()
        };
        Ok(channel
            .take_timeout(timeout)
            .and_then(|payload| Self::decode_or_drop(&channel, &payload)))
    }

    /// Release the channel. Idempotent; a no-op before `init`.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        let next = match &*state {
            State::Active(binding) => State::Shutdown {
                domain_id: binding.domain_id,
                topic: binding.topic.clone(),
            },
            State::Uninitialized | State::Shutdown { .. } => return,
        };
        if let State::Shutdown { domain_id, topic } = &next {
            log::debug!("[Session] Shutdown domain={} topic='{}'", domain_id, topic);
        }
        *state = next;
    }

    pub fn state(&self) -> SessionState {
        match *self.state.lock() {
            State::Uninitialized => SessionState::Uninitialized,
            State::Active(_) => SessionState::Active,
            State::Shutdown { .. } => SessionState::Shutdown,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    /// Current binding, the facade's `getConfig`.
    pub fn info(&self) -> SessionInfo {
        match &*self.state.lock() {
            State::Uninitialized => SessionInfo {
                initialized: false,
                domain_id: None,
                topic_name: None,
            },
            State::Active(binding) => SessionInfo {
                initialized: true,
                domain_id: Some(binding.domain_id),
                topic_name: Some(binding.topic.to_string()),
            },
            State::Shutdown { domain_id, topic } => SessionInfo {
                initialized: false,
                domain_id: Some(*domain_id),
                topic_name: Some(topic.to_string()),
            },
        }
    }

    /// Counters of the bound channel, if active.
    pub fn channel_stats(&self) -> Option<ChannelStats> {
        match &*self.state.lock() {
            State::Active(binding) => Some(binding.channel.stats()),
            _ => None,
        }
    }

    fn active(state: &State) -> Result<&Binding> {
        match state {
            State::Active(binding) => Ok(binding),
            State::Uninitialized => Err(Error::NotInitialized),
            State::Shutdown { .. } => Err(Error::SessionClosed),
        }
    }

    fn decode_or_drop(channel: &TopicChannel, payload: &[u8]) -> Option<Record> {
        match codec::decode(payload) {
            Ok(record) => Some(record),
            Err(e) => {
                channel.record_malformed();
                log::warn!(
                    "[Session] Dropping undecodable sample on domain={} topic='{}': {}",
                    channel.domain_id(),
                    channel.topic(),
                    e
                );
                None
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .field("info", &self.info())
            .finish()
    }
}
