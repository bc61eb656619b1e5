// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Domain Registry: `(domain, topic)` to [`TopicChannel`] mapping.
//!
//! Sessions naming the same pair share one channel; sessions in different
//! domains never see each other's channels.
//!
//! # Architecture
//!
//! ```text
//! DomainRegistry (owned, or DomainRegistry::global() for the C facade)
//! +-- channels: DashMap<ChannelKey, Arc<TopicChannel>>
//! +-- capacity: queue depth for channels created by this registry
//!
//! ChannelKey
//! +-- domain_id: u32   (0-232)
//! +-- topic: Arc<str>  (non-empty)
//! ```
//!
//! # Lifetime
//!
//! Channels are created lazily on first `resolve_or_create` and are never
//! removed: records published just before the last session shuts down stay
//! available to the next session that binds the same pair.
//!
//! # Thread Safety
//!
//! - channels: sharded `DashMap`, inserts are atomic per key
//! - each channel has its own queue lock

use dashmap::DashMap;
use std::sync::{Arc, OnceLock};

use crate::channel::TopicChannel;
use crate::config::{validate_domain_id, DEFAULT_QUEUE_CAPACITY};
use crate::{Error, Result};

/// Registry key for one channel
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelKey {
    pub domain_id: u32,
    pub topic: Arc<str>,
}

impl ChannelKey {
    pub fn new(domain_id: u32, topic: impl Into<Arc<str>>) -> Self {
        Self {
            domain_id,
            topic: topic.into(),
        }
    }
}

/// Process-scoped table of topic channels.
pub struct DomainRegistry {
    channels: DashMap<ChannelKey, Arc<TopicChannel>>,
    capacity: usize,
}

impl Default for DomainRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainRegistry {
    /// Create a registry whose channels hold [`DEFAULT_QUEUE_CAPACITY`] records.
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
            capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Create a registry with a custom queue capacity.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidConfig(
                "queue capacity must be > 0".to_string(),
            ));
        }
        Ok(Self {
            channels: DashMap::new(),
            capacity,
        })
    }

    /// Registry shared by every session in the process (used by the C facade).
    pub fn global() -> &'static Arc<DomainRegistry> {
        static REGISTRY: OnceLock<Arc<DomainRegistry>> = OnceLock::new();
        REGISTRY.get_or_init(|| Arc::new(DomainRegistry::new()))
    }

    /// Queue capacity applied to channels created by this registry.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Return the channel for `(domain_id, topic)`, creating it on first use.
    pub fn resolve_or_create(&self, domain_id: u32, topic: &str) -> Result<Arc<TopicChannel>> {
        validate_domain_id(domain_id)?;
        if topic.is_empty() {
            return Err(Error::InvalidTopic);
        }

        let key = ChannelKey::new(domain_id, topic);
        let channel = self
            .channels
            .entry(key)
            .or_insert_with(|| {
                log::debug!(
                    "[DomainRegistry] Created channel domain={} topic='{}' capacity={}",
                    domain_id,
                    topic,
                    self.capacity
                );
                Arc::new(TopicChannel::new(domain_id, Arc::from(topic), self.capacity))
            })
            .clone();

        Ok(channel)
    }

    /// Look up an existing channel without creating one.
    pub fn get(&self, domain_id: u32, topic: &str) -> Option<Arc<TopicChannel>> {
        self.channels
            .get(&ChannelKey::new(domain_id, topic))
            .map(|entry| entry.value().clone())
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Topic names known in one domain, sorted.
    pub fn topics(&self, domain_id: u32) -> Vec<String> {
        let mut topics: Vec<String> = self
            .channels
            .iter()
            .filter(|entry| entry.key().domain_id == domain_id)
            .map(|entry| entry.key().topic.to_string())
            .collect();
        topics.sort();
        topics
    }
}

impl std::fmt::Debug for DomainRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainRegistry")
            .field("channel_count", &self.channel_count())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_same_pair_shares_channel() {
        let registry = DomainRegistry::new();
        let a = registry.resolve_or_create(3, "sensor/temp").expect("resolve");
        let b = registry.resolve_or_create(3, "sensor/temp").expect("resolve");

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.channel_count(), 1);
        assert_eq!(a.domain_id(), 3);
        assert_eq!(a.topic(), "sensor/temp");
    }

    #[test]
    fn test_domains_are_isolated() {
        let registry = DomainRegistry::new();
        let d5 = registry.resolve_or_create(5, "T").expect("resolve");
        let d6 = registry.resolve_or_create(6, "T").expect("resolve");

        assert!(!Arc::ptr_eq(&d5, &d6));
        assert_eq!(registry.topics(5), vec!["T".to_string()]);
        assert_eq!(registry.topics(6), vec!["T".to_string()]);
        assert!(registry.topics(7).is_empty());
    }

    #[test]
    fn test_invalid_domain_rejected() {
        let registry = DomainRegistry::new();
        assert_eq!(
            registry.resolve_or_create(233, "T").unwrap_err(),
            Error::InvalidDomain(233)
        );
        assert_eq!(
            registry.resolve_or_create(u32::MAX, "T").unwrap_err(),
            Error::InvalidDomain(u32::MAX)
        );
        assert_eq!(registry.channel_count(), 0);
    }

    #[test]
    fn test_empty_topic_rejected() {
        let registry = DomainRegistry::new();
        assert_eq!(
            registry.resolve_or_create(0, "").unwrap_err(),
            Error::InvalidTopic
        );
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            DomainRegistry::with_capacity(0),
            Err(Error::InvalidConfig(_))
        ));
        assert_eq!(DomainRegistry::new().capacity(), DEFAULT_QUEUE_CAPACITY);
        let registry = DomainRegistry::with_capacity(2).expect("registry");
        assert_eq!(registry.capacity(), 2);
        let ch = registry.resolve_or_create(0, "T").expect("resolve");
        assert_eq!(ch.capacity(), 2);
    }

    #[test]
    fn test_get_does_not_create() {
        let registry = DomainRegistry::new();
        assert!(registry.get(0, "T").is_none());
        assert_eq!(registry.channel_count(), 0);

        let created = registry.resolve_or_create(0, "T").expect("resolve");
        let found = registry.get(0, "T").expect("channel exists");
        assert!(Arc::ptr_eq(&created, &found));
    }

    #[test]
    fn test_channels_survive_last_reference() {
        let registry = DomainRegistry::new();
        {
            let ch = registry.resolve_or_create(1, "T").expect("resolve");
            ch.publish(b"in-flight".to_vec());
        }
        let ch = registry.get(1, "T").expect("channel kept");
        assert_eq!(ch.take().as_deref(), Some(&b"in-flight"[..]));
    }

    #[test]
    fn test_global_registry_is_singleton() {
        let a = DomainRegistry::global();
        let b = DomainRegistry::global();
        assert!(Arc::ptr_eq(a, b));
    }
}
