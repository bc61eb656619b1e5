// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # dds-facade C FFI Bindings
//!
//! C-compatible entry points over the `dds-facade` core, consumed by the
//! C#, Node.js and Python bindings.
//!
//! Two surfaces are exported:
//!
//! - **Session handles** (`dds_session_*`): one opaque handle per caller,
//!   returning [`DdsError`] codes. Use these when a process hosts several
//!   publishers/subscribers.
//! - **Default session** (`dds_init`, `dds_write`, `dds_take`, ...): the
//!   classic `dds_facade.h` contract, operating on one process-wide session
//!   and returning `1` on success, `0` on failure or no data.
//!
//! Every session binds through the process-wide `DomainRegistry`, so two
//! handles naming the same `(domain, topic)` exchange records.
//!
//! # Safety
//!
//! All public functions are `unsafe` and require the caller to uphold the
//! invariants documented in each function's safety comment.

mod legacy;
mod logging;

pub use legacy::*;
pub use logging::*;

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use std::sync::Arc;
use std::time::Duration;

use dds_facade::config::DEFAULT_TOPIC_NAME;
use dds_facade::{DomainRegistry, Error, Record, Session, SessionInfo};

/// Opaque handle to a Session
#[repr(C)]
pub struct DdsSession {
    _private: [u8; 0],
}

/// Error codes (C-compatible enum)
///
/// # Error Code Categories
///
/// - **0-9**: Success and generic errors
/// - **10-19**: Configuration and lifecycle errors
/// - **30-39**: Record and serialization errors
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdsError {
    /// Operation completed successfully
    DdsOk = 0,
    /// Invalid argument provided (null pointer, invalid UTF-8)
    DdsInvalidArgument = 1,
    /// No record pending
    DdsNoData = 2,
    /// Generic operation failure
    DdsOperationFailed = 3,

    // === Configuration and lifecycle errors (10-19) ===
    /// Invalid configuration settings
    DdsConfigError = 10,
    /// Invalid domain ID (must be 0-232)
    DdsInvalidDomainId = 11,
    /// Empty topic name
    DdsInvalidTopic = 12,
    /// Session already initialized
    DdsAlreadyInitialized = 13,
    /// Session not initialized
    DdsNotInitialized = 14,
    /// Session has been shut down
    DdsSessionClosed = 15,

    // === Record errors (30-39) ===
    /// Payload did not decode as a record
    DdsMalformedRecord = 30,
    /// Message exceeds the configured size cap
    DdsMessageTooLarge = 31,
}

impl From<&Error> for DdsError {
    fn from(err: &Error) -> Self {
        match err {
            Error::InvalidDomain(_) => DdsError::DdsInvalidDomainId,
            Error::InvalidTopic => DdsError::DdsInvalidTopic,
            Error::InvalidConfig(_) => DdsError::DdsConfigError,
            Error::AlreadyInitialized => DdsError::DdsAlreadyInitialized,
            Error::NotInitialized => DdsError::DdsNotInitialized,
            Error::SessionClosed => DdsError::DdsSessionClosed,
            Error::MalformedRecord(_) => DdsError::DdsMalformedRecord,
            Error::MessageTooLarge { .. } => DdsError::DdsMessageTooLarge,
        }
    }
}

/// Record passed in by the caller (`writeStruct`)
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DdsRecord {
    pub index: u32,
    /// Null-terminated UTF-8, or NULL for an empty message
    pub message: *const c_char,
}

/// Record handed out to the caller (`takeStruct`)
///
/// `message` is owned by the caller and must be released with
/// `dds_string_free`.
#[repr(C)]
#[derive(Debug)]
pub struct DdsOwnedRecord {
    pub index: u32,
    pub message: *mut c_char,
}

/// Session binding (`getConfig`)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct DdsConfigInfo {
    /// Session is active
    pub initialized: bool,
    /// `domain_id` and the topic name are meaningful (set after init, kept after shutdown)
    pub has_binding: bool,
    pub domain_id: u32,
}

thread_local! {
    /// Backing storage for `*_take_message` return values
    static TAKE_MESSAGE_STORAGE: RefCell<CString> = RefCell::new(CString::default());
}

// =============================================================================
// Shared helpers (used by the session and default-session surfaces)
// =============================================================================

/// Borrow a topic argument; NULL maps to the default topic name.
unsafe fn topic_arg<'a>(topic_name: *const c_char) -> Result<&'a str, DdsError> {
    if topic_name.is_null() {
        return Ok(DEFAULT_TOPIC_NAME);
    }
    CStr::from_ptr(topic_name)
        .to_str()
        .map_err(|_| DdsError::DdsInvalidArgument)
}

/// Borrow a message argument; NULL maps to the empty string.
unsafe fn message_arg<'a>(message: *const c_char) -> Result<&'a str, DdsError> {
    if message.is_null() {
        return Ok("");
    }
    CStr::from_ptr(message)
        .to_str()
        .map_err(|_| DdsError::DdsInvalidArgument)
}

/// Convert to a C string, cutting at the first interior NUL.
fn to_cstring(text: &str) -> CString {
    let bytes: Vec<u8> = text.bytes().take_while(|b| *b != 0).collect();
    CString::new(bytes).unwrap_or_default()
}

/// Copy `text` into `buf`, truncating on a UTF-8 boundary and NUL-terminating.
///
/// Returns the number of bytes copied (excluding the terminator).
unsafe fn copy_truncated(text: &str, buf: *mut c_char, buf_len: usize) -> usize {
    if buf.is_null() || buf_len == 0 {
        return 0;
    }
    let text = text.split('\0').next().unwrap_or_default();
    let mut n = text.len().min(buf_len - 1);
    while !text.is_char_boundary(n) {
        n -= 1;
    }
    ptr::copy_nonoverlapping(text.as_ptr(), buf.cast::<u8>(), n);
    *buf.add(n) = 0;
    n
}

fn map_result(result: Result<(), Error>) -> DdsError {
    match result {
        Ok(()) => DdsError::DdsOk,
        Err(e) => {
            log::debug!("dds-facade-c: {}", e);
            DdsError::from(&e)
        }
    }
}

fn init_session(session: &Session, topic: &str, domain_id: Option<u32>) -> DdsError {
    map_result(match domain_id {
        Some(domain_id) => session.init_with_domain(topic, domain_id),
        None => session.init(topic),
    })
}

fn write_session(session: &Session, index: u32, message: &str) -> DdsError {
    map_result(session.write(&Record::new(index, message)))
}

fn take_session(session: &Session) -> Result<Record, DdsError> {
    match session.take() {
        Ok(Some(record)) => Ok(record),
        Ok(None) => Err(DdsError::DdsNoData),
        Err(e) => Err(DdsError::from(&e)),
    }
}

unsafe fn take_into_buffer(
    session: &Session,
    index_out: *mut u32,
    message_buffer: *mut c_char,
    buffer_len: usize,
) -> DdsError {
    match take_session(session) {
        Ok(record) => {
            if !index_out.is_null() {
                *index_out = record.index();
            }
            copy_truncated(record.message(), message_buffer, buffer_len);
            DdsError::DdsOk
        }
        Err(code) => code,
    }
}

unsafe fn take_into_owned(
    record: Result<Record, DdsError>,
    out: *mut DdsOwnedRecord,
) -> DdsError {
    match record {
        Ok(record) => {
            let (index, message) = record.into_parts();
            (*out).index = index;
            (*out).message = to_cstring(&message).into_raw();
            DdsError::DdsOk
        }
        Err(code) => code,
    }
}

unsafe fn take_message_ptr(session: &Session, index_out: *mut u32) -> *const c_char {
    match take_session(session) {
        Ok(record) => {
            if !index_out.is_null() {
                *index_out = record.index();
            }
            TAKE_MESSAGE_STORAGE.with(|storage| {
                let mut storage = storage.borrow_mut();
                *storage = to_cstring(record.message());
                storage.as_ptr()
            })
        }
        Err(_) => ptr::null(),
    }
}

unsafe fn fill_config(
    info: &SessionInfo,
    out: *mut DdsConfigInfo,
    topic_buffer: *mut c_char,
    buffer_len: usize,
) {
    *out = DdsConfigInfo {
        initialized: info.initialized,
        has_binding: info.domain_id.is_some(),
        domain_id: info.domain_id.unwrap_or_default(),
    };
    copy_truncated(
        info.topic_name.as_deref().unwrap_or_default(),
        topic_buffer,
        buffer_len,
    );
}

unsafe fn session_ref<'a>(session: *mut DdsSession) -> Option<&'a Session> {
    if session.is_null() {
        None
    } else {
        Some(&*session.cast::<Session>())
    }
}

// =============================================================================
// Library information
// =============================================================================

/// Get the library version string
///
/// # Safety
/// The returned pointer is valid for the lifetime of the process (static storage).
#[no_mangle]
pub unsafe extern "C" fn dds_version() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr().cast::<c_char>()
}

/// Release a string returned by this library (`DdsOwnedRecord::message`)
///
/// # Safety
/// - `s` must come from this library or be NULL
/// - Must not be called more than once with the same pointer
#[no_mangle]
pub unsafe extern "C" fn dds_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

// =============================================================================
// Session handles
// =============================================================================

/// Create an uninitialized session bound to the process-wide registry
///
/// The default domain for `dds_session_init` is read from
/// `DOMAIN_ID_OVERRIDE` at creation time.
///
/// # Safety
/// The returned handle must be released with `dds_session_destroy`.
#[no_mangle]
pub unsafe extern "C" fn dds_session_create() -> *mut DdsSession {
    let session = Session::new(Arc::clone(DomainRegistry::global()));
    Box::into_raw(Box::new(session)).cast::<DdsSession>()
}

/// Destroy a session (shutting it down first)
///
/// # Safety
/// - `session` must be a valid pointer returned from `dds_session_create` or NULL
/// - Must not be called more than once with the same pointer
#[no_mangle]
pub unsafe extern "C" fn dds_session_destroy(session: *mut DdsSession) {
    if !session.is_null() {
        let session = Box::from_raw(session.cast::<Session>());
        session.shutdown();
    }
}

/// Bind a session to `topic_name` in the configured default domain
///
/// # Safety
/// - `session` must be a valid pointer returned from `dds_session_create`
/// - `topic_name` must be a valid null-terminated C string, or NULL for the
///   default topic (`HelloWorldTopic`)
#[no_mangle]
pub unsafe extern "C" fn dds_session_init(
    session: *mut DdsSession,
    topic_name: *const c_char,
) -> DdsError {
    let Some(session) = session_ref(session) else {
        return DdsError::DdsInvalidArgument;
    };
    match topic_arg(topic_name) {
        Ok(topic) => init_session(session, topic, None),
        Err(code) => code,
    }
}

/// Bind a session to `topic_name` in `domain_id` (0-232)
///
/// # Safety
/// Same as `dds_session_init`.
#[no_mangle]
pub unsafe extern "C" fn dds_session_init_with_domain(
    session: *mut DdsSession,
    topic_name: *const c_char,
    domain_id: u32,
) -> DdsError {
    let Some(session) = session_ref(session) else {
        return DdsError::DdsInvalidArgument;
    };
    match topic_arg(topic_name) {
        Ok(topic) => init_session(session, topic, Some(domain_id)),
        Err(code) => code,
    }
}

/// Publish `{index, message}`
///
/// # Safety
/// - `session` must be a valid pointer returned from `dds_session_create`
/// - `message` must be a valid null-terminated C string or NULL (empty)
#[no_mangle]
pub unsafe extern "C" fn dds_session_write(
    session: *mut DdsSession,
    index: u32,
    message: *const c_char,
) -> DdsError {
    let Some(session) = session_ref(session) else {
        return DdsError::DdsInvalidArgument;
    };
    match message_arg(message) {
        Ok(message) => write_session(session, index, message),
        Err(code) => code,
    }
}

/// Publish a record struct
///
/// # Safety
/// - `session` must be a valid pointer returned from `dds_session_create`
/// - `record` must point to a valid `DdsRecord`
#[no_mangle]
pub unsafe extern "C" fn dds_session_write_struct(
    session: *mut DdsSession,
    record: *const DdsRecord,
) -> DdsError {
    if record.is_null() {
        return DdsError::DdsInvalidArgument;
    }
    let record = *record;
    dds_session_write(session, record.index, record.message)
}

/// Take one record into a caller buffer
///
/// The message is truncated to `buffer_len - 1` bytes and always
/// NUL-terminated.
///
/// # Safety
/// - `session` must be a valid pointer returned from `dds_session_create`
/// - `index_out` may be NULL; otherwise it must be writable
/// - `message_buffer` may be NULL; otherwise it must hold `buffer_len` bytes
///
/// # Returns
/// `DDS_OK`, `DDS_NO_DATA` when nothing is pending, or a lifecycle error
#[no_mangle]
pub unsafe extern "C" fn dds_session_take(
    session: *mut DdsSession,
    index_out: *mut u32,
    message_buffer: *mut c_char,
    buffer_len: usize,
) -> DdsError {
    let Some(session) = session_ref(session) else {
        return DdsError::DdsInvalidArgument;
    };
    take_into_buffer(session, index_out, message_buffer, buffer_len)
}

/// Take one record as an owned struct
///
/// # Safety
/// - `session` must be a valid pointer returned from `dds_session_create`
/// - `out` must point to writable `DdsOwnedRecord` storage; on `DDS_OK`
///   the caller owns `out->message` and frees it with `dds_string_free`
#[no_mangle]
pub unsafe extern "C" fn dds_session_take_struct(
    session: *mut DdsSession,
    out: *mut DdsOwnedRecord,
) -> DdsError {
    let Some(session) = session_ref(session) else {
        return DdsError::DdsInvalidArgument;
    };
    if out.is_null() {
        return DdsError::DdsInvalidArgument;
    }
    take_into_owned(take_session(session), out)
}

/// Wait up to `timeout_ms` for a record
///
/// # Safety
/// Same as `dds_session_take_struct`.
#[no_mangle]
pub unsafe extern "C" fn dds_session_take_timeout(
    session: *mut DdsSession,
    timeout_ms: u32,
    out: *mut DdsOwnedRecord,
) -> DdsError {
    let Some(session) = session_ref(session) else {
        return DdsError::DdsInvalidArgument;
    };
    if out.is_null() {
        return DdsError::DdsInvalidArgument;
    }
    let record = match session.take_timeout(Duration::from_millis(u64::from(timeout_ms))) {
        Ok(Some(record)) => Ok(record),
        Ok(None) => Err(DdsError::DdsNoData),
        Err(e) => Err(DdsError::from(&e)),
    };
    take_into_owned(record, out)
}

/// Take one record and return only its message
///
/// # Safety
/// - `session` must be a valid pointer returned from `dds_session_create`
/// - `index_out` may be NULL
///
/// # Returns
/// Pointer to thread-local storage valid until the next `*_take_message`
/// call on the same thread, or NULL when nothing is pending
#[no_mangle]
pub unsafe extern "C" fn dds_session_take_message(
    session: *mut DdsSession,
    index_out: *mut u32,
) -> *const c_char {
    match session_ref(session) {
        Some(session) => take_message_ptr(session, index_out),
        None => ptr::null(),
    }
}

/// Shut a session down (idempotent)
///
/// # Safety
/// - `session` must be a valid pointer returned from `dds_session_create` or NULL
#[no_mangle]
pub unsafe extern "C" fn dds_session_shutdown(session: *mut DdsSession) -> DdsError {
    match session_ref(session) {
        Some(session) => {
            session.shutdown();
            DdsError::DdsOk
        }
        None => DdsError::DdsInvalidArgument,
    }
}

/// Report the session binding
///
/// # Safety
/// - `session` must be a valid pointer returned from `dds_session_create`
/// - `out` must point to writable `DdsConfigInfo` storage
/// - `topic_buffer` may be NULL; otherwise it must hold `buffer_len` bytes
#[no_mangle]
pub unsafe extern "C" fn dds_session_get_config(
    session: *mut DdsSession,
    out: *mut DdsConfigInfo,
    topic_buffer: *mut c_char,
    buffer_len: usize,
) -> DdsError {
    let Some(session) = session_ref(session) else {
        return DdsError::DdsInvalidArgument;
    };
    if out.is_null() {
        return DdsError::DdsInvalidArgument;
    }
    fill_config(&session.info(), out, topic_buffer, buffer_len);
    DdsError::DdsOk
}
