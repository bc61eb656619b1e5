// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Logger setup for binding hosts.
//!
//! The core crate only emits through the `log` facade; a host process picks
//! one of these once at startup to route records to stderr.

use std::ffi::CStr;
use std::os::raw::c_char;

use super::DdsError;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdsLogLevel {
    DdsLogOff = 0,
    DdsLogError = 1,
    DdsLogWarn = 2,
    DdsLogInfo = 3,
    DdsLogDebug = 4,
    DdsLogTrace = 5,
}

impl From<DdsLogLevel> for log::LevelFilter {
    fn from(level: DdsLogLevel) -> Self {
        match level {
            DdsLogLevel::DdsLogOff => log::LevelFilter::Off,
            DdsLogLevel::DdsLogError => log::LevelFilter::Error,
            DdsLogLevel::DdsLogWarn => log::LevelFilter::Warn,
            DdsLogLevel::DdsLogInfo => log::LevelFilter::Info,
            DdsLogLevel::DdsLogDebug => log::LevelFilter::Debug,
            DdsLogLevel::DdsLogTrace => log::LevelFilter::Trace,
        }
    }
}

fn finish(builder: &mut env_logger::Builder) -> DdsError {
    match builder.format_timestamp_millis().try_init() {
        Ok(()) => DdsError::DdsOk,
        // A logger is already installed
        Err(_) => DdsError::DdsOperationFailed,
    }
}

/// Route log output to stderr at `level`
///
/// # Safety
/// Must be called from a single thread during initialization.
///
/// # Returns
/// `DDS_OK`, or `DDS_OPERATION_FAILED` if a logger is already installed
///
/// # Example (C)
/// ```c
/// dds_logging_init(DDS_LOG_INFO);
/// ```
#[no_mangle]
pub unsafe extern "C" fn dds_logging_init(level: DdsLogLevel) -> DdsError {
    finish(env_logger::Builder::new().filter_level(level.into()))
}

/// Filter enabling `level` for this library's targets only.
fn facade_filter(level: DdsLogLevel) -> String {
    let level = log::LevelFilter::from(level).as_str().to_ascii_lowercase();
    format!("dds_facade={level},dds_facade_c={level}")
}

/// Like `dds_logging_init`, but `RUST_LOG` wins when set
///
/// Without `RUST_LOG`, `default_level` applies to `dds_facade` and
/// `dds_facade_c` targets; records from other crates in the host stay off.
///
/// # Safety
/// Must be called from a single thread during initialization.
#[no_mangle]
pub unsafe extern "C" fn dds_logging_init_env(default_level: DdsLogLevel) -> DdsError {
    finish(&mut env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(facade_filter(default_level)),
    ))
}

/// Install a logger from an `env_logger` filter string
///
/// # Safety
/// - `filter` must be a valid null-terminated C string or NULL.
///
/// # Example (C)
/// ```c
/// dds_logging_init_with_filter("dds_facade=debug,warn");
/// ```
#[no_mangle]
pub unsafe extern "C" fn dds_logging_init_with_filter(filter: *const c_char) -> DdsError {
    if filter.is_null() {
        return DdsError::DdsInvalidArgument;
    }
    let Ok(filter) = CStr::from_ptr(filter).to_str() else {
        return DdsError::DdsInvalidArgument;
    };
    finish(env_logger::Builder::new().parse_filters(filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn test_level_mapping() {
        assert_eq!(
            log::LevelFilter::from(DdsLogLevel::DdsLogOff),
            log::LevelFilter::Off
        );
        assert_eq!(
            log::LevelFilter::from(DdsLogLevel::DdsLogDebug),
            log::LevelFilter::Debug
        );
    }

    #[test]
    fn test_env_default_filter_scoped_to_facade() {
        assert_eq!(
            facade_filter(DdsLogLevel::DdsLogWarn),
            "dds_facade=warn,dds_facade_c=warn"
        );
        assert_eq!(
            facade_filter(DdsLogLevel::DdsLogOff),
            "dds_facade=off,dds_facade_c=off"
        );
    }

    #[test]
    fn test_null_filter_rejected() {
        assert_eq!(
            unsafe { dds_logging_init_with_filter(ptr::null()) },
            DdsError::DdsInvalidArgument
        );
    }
}
