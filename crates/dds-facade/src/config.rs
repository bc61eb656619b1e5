// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Facade constants and session configuration.
//!
//! Constants are the single source of truth for limits used across the
//! crate. [`SessionConfig`] carries the per-session knobs; its `Default`
//! impl reads `DOMAIN_ID_OVERRIDE` from the environment.
//!
//! ```
//! use dds_facade::config::SessionConfig;
//!
//! let config = SessionConfig::from_env_value(Some("7")).with_max_message_len(256);
//! assert_eq!(config.default_domain_id, 7);
//! assert_eq!(config.max_message_len, 256);
//! ```

/// Maximum domain ID (inclusive).
///
/// Valid range: 0..=232, the same bound DDS places on domain ids.
pub const MAX_DOMAIN_ID: u32 = 232;

/// Domain used by `init` when no override is configured.
pub const DEFAULT_DOMAIN_ID: u32 = 0;

/// Records buffered per topic channel before drop-oldest kicks in.
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Topic used by the C facade when the caller passes a NULL topic name.
pub const DEFAULT_TOPIC_NAME: &str = "HelloWorldTopic";

/// Practical cap on message text, in UTF-8 bytes.
pub const MAX_MESSAGE_LEN: usize = 64 * 1024;

/// Environment variable consulted by `init` (never by `init_with_domain`).
pub const DOMAIN_ID_OVERRIDE_ENV: &str = "DOMAIN_ID_OVERRIDE";

/// Check a domain id against [`MAX_DOMAIN_ID`].
pub fn validate_domain_id(domain_id: u32) -> crate::Result<u32> {
    if domain_id > MAX_DOMAIN_ID {
        return Err(crate::Error::InvalidDomain(domain_id));
    }
    Ok(domain_id)
}

/// Per-session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionConfig {
    /// Domain joined by `init` (not range-checked until `init`).
    pub default_domain_id: u32,
    /// Largest message accepted by `write`, in bytes.
    pub max_message_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_env_value(std::env::var(DOMAIN_ID_OVERRIDE_ENV).ok().as_deref())
    }
}

impl SessionConfig {
    /// Build a config from the raw value of `DOMAIN_ID_OVERRIDE`.
    ///
    /// Values that do not parse as an unsigned integer are ignored with a
    /// warning and the default domain is used instead.
    pub fn from_env_value(value: Option<&str>) -> Self {
        let default_domain_id = match value.map(str::trim) {
            None | Some("") => DEFAULT_DOMAIN_ID,
            Some(raw) => match raw.parse::<u32>() {
                Ok(id) => id,
                Err(e) => {
                    log::warn!(
                        "[SessionConfig] Ignoring {}={:?}: {}",
                        DOMAIN_ID_OVERRIDE_ENV,
                        raw,
                        e
                    );
                    DEFAULT_DOMAIN_ID
                }
            },
        };

        Self {
            default_domain_id,
            max_message_len: MAX_MESSAGE_LEN,
        }
    }

    /// Set the domain used by `init`.
    pub fn with_default_domain(mut self, domain_id: u32) -> Self {
        self.default_domain_id = domain_id;
        self
    }

    /// Set the message size cap.
    ///
    /// Clamped to what the `u32` length field can describe (NUL included).
    pub fn with_max_message_len(mut self, max_message_len: usize) -> Self {
        self.max_message_len = max_message_len.min(u32::MAX as usize - 1);
        self
    }
}
