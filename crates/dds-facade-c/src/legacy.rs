// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Default-session entry points (`dds_facade.h`).
//!
//! These keep the classic single-session contract used by the language
//! bindings: one process-wide session, `1` for success and `0` for failure
//! or no data. Calling `dds_init` after `dds_shutdown` starts a fresh
//! session.

use std::os::raw::{c_char, c_int};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use dds_facade::{DomainRegistry, Session, SessionInfo, SessionState};

use super::{
    fill_config, init_session, message_arg, take_into_buffer, take_into_owned, take_message_ptr,
    take_session, topic_arg, write_session, DdsConfigInfo, DdsError, DdsOwnedRecord, DdsRecord,
};

/// Empty until the first `dds_init`, so `DOMAIN_ID_OVERRIDE` is read at init time.
fn default_slot() -> MutexGuard<'static, Option<Arc<Session>>> {
    static SESSION: OnceLock<Mutex<Option<Arc<Session>>>> = OnceLock::new();
    SESSION
        .get_or_init(|| Mutex::new(None))
        .lock()
        .unwrap_or_else(|err| err.into_inner())
}

/// Current default session; the slot lock is not held across operations.
fn current() -> Option<Arc<Session>> {
    default_slot().clone()
}

fn status(code: DdsError) -> c_int {
    c_int::from(code == DdsError::DdsOk)
}

unsafe fn init_default(topic_name: *const c_char, domain_id: Option<u32>) -> c_int {
    let topic = match topic_arg(topic_name) {
        Ok(topic) => topic,
        Err(_) => return 0,
    };

    let mut slot = default_slot();
    if slot
        .as_ref()
        .is_some_and(|session| session.state() == SessionState::Shutdown)
    {
        *slot = None;
    }
    let session =
        slot.get_or_insert_with(|| Arc::new(Session::new(Arc::clone(DomainRegistry::global()))));
    let code = init_session(session, topic, domain_id);
    if code != DdsError::DdsOk {
        log::warn!("dds_init({}) failed: {:?}", topic, code);
    }
    status(code)
}

/// Initialize the default session on `topic_name` (NULL: `HelloWorldTopic`)
///
/// The domain is `DOMAIN_ID_OVERRIDE` when set, otherwise 0.
///
/// # Safety
/// `topic_name` must be a valid null-terminated C string or NULL.
///
/// # Returns
/// 1 on success, 0 on failure (invalid domain, already initialized)
#[no_mangle]
pub unsafe extern "C" fn dds_init(topic_name: *const c_char) -> c_int {
    init_default(topic_name, None)
}

/// Initialize the default session on `topic_name` in `domain_id` (0-232)
///
/// # Safety
/// `topic_name` must be a valid null-terminated C string or NULL.
#[no_mangle]
pub unsafe extern "C" fn dds_init_with_domain(topic_name: *const c_char, domain_id: u32) -> c_int {
    init_default(topic_name, Some(domain_id))
}

/// Publish `{index, message}` (NULL message: empty string)
///
/// # Safety
/// `message` must be a valid null-terminated C string or NULL.
#[no_mangle]
pub unsafe extern "C" fn dds_write(index: u32, message: *const c_char) -> c_int {
    let Some(session) = current() else {
        return 0;
    };
    match message_arg(message) {
        Ok(message) => status(write_session(&session, index, message)),
        Err(_) => 0,
    }
}

/// Publish a record struct
///
/// # Safety
/// `record` must point to a valid `DdsRecord` or be NULL.
#[no_mangle]
pub unsafe extern "C" fn dds_write_struct(record: *const DdsRecord) -> c_int {
    if record.is_null() {
        return 0;
    }
    let record = *record;
    dds_write(record.index, record.message)
}

/// Take one record into a caller buffer (truncated, always NUL-terminated)
///
/// `buffer_len` keeps the `int` type of the classic header; zero or a
/// negative length copies nothing.
///
/// # Safety
/// - `index_out` may be NULL; otherwise it must be writable
/// - `message_buffer` may be NULL; otherwise it must hold `buffer_len` bytes
///
/// # Returns
/// 1 when a record was taken, 0 when none is pending or the session is not active
#[no_mangle]
pub unsafe extern "C" fn dds_take(
    index_out: *mut u32,
    message_buffer: *mut c_char,
    buffer_len: c_int,
) -> c_int {
    let Some(session) = current() else {
        return 0;
    };
    let buffer_len = usize::try_from(buffer_len).unwrap_or(0);
    status(take_into_buffer(
        &session,
        index_out,
        message_buffer,
        buffer_len,
    ))
}

/// Take one record as an owned struct; free `out->message` with `dds_string_free`
///
/// # Safety
/// `out` must point to writable `DdsOwnedRecord` storage or be NULL.
#[no_mangle]
pub unsafe extern "C" fn dds_take_struct(out: *mut DdsOwnedRecord) -> c_int {
    if out.is_null() {
        return 0;
    }
    let Some(session) = current() else {
        return 0;
    };
    status(take_into_owned(take_session(&session), out))
}

/// Take one record and return its message
///
/// # Safety
/// `index_out` may be NULL; otherwise it must be writable.
///
/// # Returns
/// Thread-local string valid until the next `*_take_message` call on this
/// thread, or NULL when nothing is pending
#[no_mangle]
pub unsafe extern "C" fn dds_take_message(index_out: *mut u32) -> *const c_char {
    match current() {
        Some(session) => take_message_ptr(&session, index_out),
        None => std::ptr::null(),
    }
}

/// Shut the default session down (idempotent)
#[no_mangle]
pub extern "C" fn dds_shutdown() {
    if let Some(session) = current() {
        session.shutdown();
    }
}

/// Report the default session binding
///
/// # Safety
/// - `out` must point to writable `DdsConfigInfo` storage or be NULL
/// - `topic_buffer` may be NULL; otherwise it must hold `buffer_len` bytes
#[no_mangle]
pub unsafe extern "C" fn dds_get_config(
    out: *mut DdsConfigInfo,
    topic_buffer: *mut c_char,
    buffer_len: usize,
) -> c_int {
    if out.is_null() {
        return 0;
    }
    let info = match current() {
        Some(session) => session.info(),
        None => SessionInfo {
            initialized: false,
            domain_id: None,
            topic_name: None,
        },
    };
    fill_config(&info, out, topic_buffer, buffer_len);
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use dds_facade::config::DOMAIN_ID_OVERRIDE_ENV;
    use std::ffi::{CStr, CString};
    use std::ptr;

    // The default session is process-wide, so the whole lifecycle runs in one test.
    #[test]
    fn test_default_session_lifecycle() {
        unsafe {
            let topic = CString::new("legacy/lifecycle").unwrap();
            let msg = CString::new("hello").unwrap();

            assert_eq!(dds_write(1, msg.as_ptr()), 0, "write before init");
            assert!(dds_take_message(ptr::null_mut()).is_null());
            let mut info = DdsConfigInfo::default();
            assert_eq!(dds_get_config(&mut info, ptr::null_mut(), 0), 1);
            assert!(!info.initialized);
            assert!(!info.has_binding);

            // The override is read by dds_init, not by earlier calls
            std::env::set_var(DOMAIN_ID_OVERRIDE_ENV, "49");
            assert_eq!(dds_init(topic.as_ptr()), 1);
            dds_get_config(&mut info, ptr::null_mut(), 0);
            assert_eq!(info.domain_id, 49);
            dds_shutdown();
            std::env::remove_var(DOMAIN_ID_OVERRIDE_ENV);

            assert_eq!(dds_init_with_domain(topic.as_ptr(), 233), 0);
            assert_eq!(dds_init_with_domain(topic.as_ptr(), 47), 1);
            assert_eq!(dds_init_with_domain(topic.as_ptr(), 47), 0);

            assert_eq!(dds_write(1, msg.as_ptr()), 1);
            let mut index = 0u32;
            let mut buf = [0 as c_char; 16];
            assert_eq!(dds_take(&mut index, buf.as_mut_ptr(), buf.len() as c_int), 1);
            assert_eq!(index, 1);
            assert_eq!(CStr::from_ptr(buf.as_ptr()).to_str().unwrap(), "hello");
            assert_eq!(dds_take(&mut index, buf.as_mut_ptr(), buf.len() as c_int), 0);

            dds_write(9, msg.as_ptr());
            assert_eq!(dds_take(&mut index, buf.as_mut_ptr(), -1), 1);
            assert_eq!(index, 9);

            let record = DdsRecord {
                index: 2,
                message: msg.as_ptr(),
            };
            assert_eq!(dds_write_struct(&record), 1);
            let mut out = DdsOwnedRecord {
                index: 0,
                message: ptr::null_mut(),
            };
            assert_eq!(dds_take_struct(&mut out), 1);
            assert_eq!(out.index, 2);
            crate::dds_string_free(out.message);

            let mut topic_buf = [0 as c_char; 32];
            assert_eq!(
                dds_get_config(&mut info, topic_buf.as_mut_ptr(), topic_buf.len()),
                1
            );
            assert!(info.initialized);
            assert_eq!(info.domain_id, 47);
            assert_eq!(
                CStr::from_ptr(topic_buf.as_ptr()).to_str().unwrap(),
                "legacy/lifecycle"
            );

            dds_shutdown();
            dds_shutdown();
            assert_eq!(dds_write(3, msg.as_ptr()), 0, "write after shutdown");
            dds_get_config(&mut info, ptr::null_mut(), 0);
            assert!(!info.initialized);

            // Re-init starts a fresh session
            assert_eq!(dds_init_with_domain(topic.as_ptr(), 48), 1);
            assert_eq!(dds_write(4, ptr::null()), 1);
            let text = dds_take_message(&mut index);
            assert!(!text.is_null());
            assert_eq!(index, 4);
            assert_eq!(CStr::from_ptr(text).to_bytes(), b"");
            dds_shutdown();
        }
    }
}
