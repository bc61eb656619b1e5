// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type shared by every facade operation.

use crate::config::MAX_DOMAIN_ID;

/// Errors returned by facade operations.
///
/// Construction and lifecycle errors are returned synchronously to the
/// caller; nothing in the core panics on bad input.
///
/// # Example
///
/// ```rust
/// use dds_facade::{DomainRegistry, Error, Session};
/// use std::sync::Arc;
///
/// let session = Session::new(Arc::new(DomainRegistry::new()));
/// match session.init_with_domain("HelloWorldTopic", 999) {
///     Err(Error::InvalidDomain(id)) => assert_eq!(id, 999),
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Domain ID out of range (0-232).
    InvalidDomain(u32),
    /// Topic name is empty.
    InvalidTopic,
    /// Configuration value rejected (e.g. zero queue capacity).
    InvalidConfig(String),

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// `init` called on a session that is already active.
    AlreadyInitialized,
    /// Data operation called before `init`.
    NotInitialized,
    /// Operation called on a session after `shutdown`.
    SessionClosed,

    // ========================================================================
    // Data Errors
    // ========================================================================
    /// Bytes do not match the record layout.
    MalformedRecord(String),
    /// Message text exceeds the configured cap.
    MessageTooLarge { len: usize, max: usize },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidDomain(id) => {
                write!(f, "Invalid domain_id: {} (must be 0-{})", id, MAX_DOMAIN_ID)
            }
            Error::InvalidTopic => write!(f, "Invalid topic name: must not be empty"),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::AlreadyInitialized => write!(f, "Session already initialized"),
            Error::NotInitialized => write!(f, "Session not initialized, call init() first"),
            Error::SessionClosed => write!(f, "Session has been shut down"),
            Error::MalformedRecord(reason) => write!(f, "Malformed record: {}", reason),
            Error::MessageTooLarge { len, max } => {
                write!(f, "Message too large: {} bytes (max {})", len, max)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Convenient alias for results using the crate `Error` type.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_domain_range() {
        let msg = Error::InvalidDomain(300).to_string();
        assert_eq!(msg, "Invalid domain_id: 300 (must be 0-232)");
    }

    #[test]
    fn test_display_message_too_large() {
        let err = Error::MessageTooLarge { len: 10, max: 4 };
        assert_eq!(err.to_string(), "Message too large: 10 bytes (max 4)");
    }
}
