// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

// Binding-style scenarios driven through the exported C functions only

use dds_facade_c::*;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

unsafe fn open(topic: &str, domain: u32) -> *mut DdsSession {
    let topic = CString::new(topic).unwrap();
    let session = dds_session_create();
    assert_eq!(
        dds_session_init_with_domain(session, topic.as_ptr(), domain),
        DdsError::DdsOk
    );
    session
}

unsafe fn take_text(session: *mut DdsSession) -> Option<(u32, String)> {
    let mut index = 0u32;
    let mut buf = [0 as c_char; 128];
    match dds_session_take(session, &mut index, buf.as_mut_ptr(), buf.len()) {
        DdsError::DdsOk => Some((
            index,
            CStr::from_ptr(buf.as_ptr()).to_string_lossy().into_owned(),
        )),
        DdsError::DdsNoData => None,
        other => panic!("take failed: {:?}", other),
    }
}

#[test]
fn test_cross_domain_isolation_through_handles() {
    unsafe {
        let d5 = open("abi/isolation", 5);
        let d6 = open("abi/isolation", 6);

        let msg = CString::new("Isolation test message").unwrap();
        assert_eq!(dds_session_write(d5, 999, msg.as_ptr()), DdsError::DdsOk);

        assert_eq!(take_text(d6), None);
        assert_eq!(
            take_text(d5),
            Some((999, "Isolation test message".to_string()))
        );

        dds_session_destroy(d5);
        dds_session_destroy(d6);
    }
}

#[test]
fn test_publisher_subscriber_handles_fifo() {
    unsafe {
        let publisher = open("abi/fifo", 30);
        let subscriber = open("abi/fifo", 30);

        for (i, text) in ["A", "B", "C"].iter().enumerate() {
            let msg = CString::new(*text).unwrap();
            assert_eq!(
                dds_session_write(publisher, i as u32, msg.as_ptr()),
                DdsError::DdsOk
            );
        }

        assert_eq!(take_text(subscriber), Some((0, "A".to_string())));
        assert_eq!(take_text(subscriber), Some((1, "B".to_string())));
        assert_eq!(take_text(subscriber), Some((2, "C".to_string())));
        assert_eq!(take_text(subscriber), None);

        dds_session_destroy(publisher);
        dds_session_destroy(subscriber);
    }
}

#[test]
fn test_take_timeout_returns_no_data() {
    unsafe {
        let session = open("abi/timeout", 31);
        let mut out = DdsOwnedRecord {
            index: 0,
            message: ptr::null_mut(),
        };
        assert_eq!(
            dds_session_take_timeout(session, 10, &mut out),
            DdsError::DdsNoData
        );
        assert!(out.message.is_null());

        let msg = CString::new("ready").unwrap();
        dds_session_write(session, 8, msg.as_ptr());
        assert_eq!(
            dds_session_take_timeout(session, 10, &mut out),
            DdsError::DdsOk
        );
        assert_eq!(out.index, 8);
        assert_eq!(CStr::from_ptr(out.message).to_str().unwrap(), "ready");
        dds_string_free(out.message);

        dds_session_destroy(session);
    }
}

#[test]
fn test_oversized_and_invalid_utf8_messages() {
    unsafe {
        let session = open("abi/limits", 32);

        let big = CString::new("x".repeat(64 * 1024 + 1)).unwrap();
        assert_eq!(
            dds_session_write(session, 1, big.as_ptr()),
            DdsError::DdsMessageTooLarge
        );

        let invalid = [0xffu8, 0xfe, 0x00];
        assert_eq!(
            dds_session_write(session, 1, invalid.as_ptr().cast::<c_char>()),
            DdsError::DdsInvalidArgument
        );
        assert_eq!(take_text(session), None);

        dds_session_destroy(session);
    }
}

#[test]
fn test_default_session_interoperates_with_handles() {
    unsafe {
        let topic = CString::new("abi/default").unwrap();
        assert_eq!(dds_init_with_domain(topic.as_ptr(), 33), 1);
        let handle = open("abi/default", 33);

        let msg = CString::new("from default").unwrap();
        assert_eq!(dds_write(11, msg.as_ptr()), 1);
        assert_eq!(take_text(handle), Some((11, "from default".to_string())));

        let reply = CString::new("from handle").unwrap();
        dds_session_write(handle, 12, reply.as_ptr());
        let mut index = 0;
        let text = dds_take_message(&mut index);
        assert!(!text.is_null());
        assert_eq!(index, 12);
        assert_eq!(CStr::from_ptr(text).to_str().unwrap(), "from handle");

        dds_shutdown();
        dds_session_destroy(handle);
    }
}
