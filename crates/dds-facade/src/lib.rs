// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # dds-facade - in-process publish/subscribe with a typed record
//!
//! A small DDS-flavoured messaging core: sessions bind to a topic inside a
//! domain, publish `{index, message}` records and take them back in FIFO
//! order. Domains are isolated from each other, queues are bounded and drop
//! the oldest record instead of blocking publishers.
//!
//! ## Quick Start
//!
//! ```rust
//! use dds_facade::{DomainRegistry, Record, Session};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(DomainRegistry::new());
//!
//! let publisher = Session::new(registry.clone());
//! let subscriber = Session::new(registry);
//! publisher.init_with_domain("HelloWorldTopic", 5)?;
//! subscriber.init_with_domain("HelloWorldTopic", 5)?;
//!
//! publisher.write(&Record::new(1, "hi"))?;
//! assert_eq!(subscriber.take()?, Some(Record::new(1, "hi")));
//! assert_eq!(subscriber.take()?, None);
//! # Ok::<(), dds_facade::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Session --init--> DomainRegistry --(domain, topic)--> TopicChannel
//!    |                                                      |
//!    +--write: codec::encode ------------> publish ---------+
//!    +--take:  codec::decode <------------ take ------------+
//! ```
//!
//! The C ABI used by language bindings lives in the `dds-facade-c` crate.

pub mod channel;
pub mod codec;
pub mod config;
mod error;
mod record;
pub mod registry;
pub mod session;

pub use channel::{ChannelStats, Publish, TopicChannel};
pub use config::SessionConfig;
pub use error::{Error, Result};
pub use record::Record;
pub use registry::{ChannelKey, DomainRegistry};
pub use session::{Session, SessionInfo, SessionState};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
