// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # rill C FFI facade
//!
//! C-compatible bindings for a single-topic publish/subscribe channel.
//!
//! Every channel is an opaque `RillChannel*` handle created by
//! [`rill_channel_open`] and released by [`rill_channel_close`]. All
//! fallible calls return `1` on success and `0` on failure or no-data; the
//! error taxonomy is deliberately flat. Binding-layer misuse (NULL
//! pointers, non-UTF-8 text) is collapsed to the same failure result.
//!
//! # Safety
//!
//! All public functions are `unsafe` and require the caller to uphold the
//! invariants documented in each function's safety comment.

mod channel;
mod record;

pub use channel::{Channel, ChannelConfig};
pub use record::MessageRecord;

use std::ffi::{CStr, CString};
use std::ptr;
use std::sync::Once;

use libc::{c_char, c_int};

/// Opaque handle to a channel.
#[repr(C)]
pub struct RillChannel {
    _private: [u8; 0],
}

/// A message record crossing the C boundary.
///
/// `message` is a NUL-terminated string owned by the record. Records filled
/// in by `rill_channel_take_record` must be released with
/// `rill_record_free`.
#[repr(C)]
pub struct RillRecord {
    pub index: u32,
    pub message: *mut c_char,
}

/// Open a channel on `topic_name`, domain 0.
///
/// # Safety
/// - `topic_name` must be a valid null-terminated C string.
/// - The returned handle must be released with `rill_channel_close`.
#[no_mangle]
pub unsafe extern "C" fn rill_channel_open(topic_name: *const c_char) -> *mut RillChannel {
    rill_channel_open_with_domain(topic_name, 0)
}

/// Open a channel on `topic_name` in the given domain.
///
/// Returns NULL when the topic name is missing/invalid or any entity
/// construction stage fails (the stages already built are rolled back).
///
/// # Safety
/// - `topic_name` must be a valid null-terminated C string.
/// - The returned handle must be released with `rill_channel_close`.
#[no_mangle]
pub unsafe extern "C" fn rill_channel_open_with_domain(
    topic_name: *const c_char,
    domain_id: u32,
) -> *mut RillChannel {
    // Initialize logger (only once, subsequent calls are no-op)
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = env_logger::try_init();
    });

    if topic_name.is_null() {
        return ptr::null_mut();
    }

    let Ok(topic) = CStr::from_ptr(topic_name).to_str() else {
        return ptr::null_mut();
    };

    match Channel::open(ChannelConfig::new(topic).domain_id(domain_id)) {
        Ok(channel) => Box::into_raw(Box::new(channel)).cast::<RillChannel>(),
        Err(err) => {
            log::error!("[rill-c] open failed topic='{}': {}", topic, err);
            ptr::null_mut()
        }
    }
}

/// Close a channel and release its entity set.
///
/// # Safety
/// - `channel` must be a valid handle from `rill_channel_open`, or NULL
///   (no-op).
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn rill_channel_close(channel: *mut RillChannel) {
    if !channel.is_null() {
        drop(Box::from_raw(channel.cast::<Channel>()));
    }
}

/// Publish a record built from `index` and `message`.
///
/// A NULL `message` publishes an empty message.
///
/// # Safety
/// - `channel` must be a valid handle from `rill_channel_open`, or NULL.
/// - `message` must be a valid null-terminated C string, or NULL.
#[no_mangle]
pub unsafe extern "C" fn rill_channel_write(
    channel: *mut RillChannel,
    index: u32,
    message: *const c_char,
) -> c_int {
    if channel.is_null() {
        return 0;
    }
    let channel_ref = &*channel.cast::<Channel>();

    let message = if message.is_null() {
        ""
    } else {
        let Ok(text) = CStr::from_ptr(message).to_str() else {
            return 0;
        };
        text
    };

    match channel_ref.write(index, message) {
        Ok(()) => 1,
        Err(_) => 0,
    }
}

/// Publish a fully-formed record.
///
/// # Safety
/// - `channel` must be a valid handle from `rill_channel_open`, or NULL.
/// - `record` must point to a valid `RillRecord` whose `message` is a valid
///   null-terminated C string or NULL.
#[no_mangle]
pub unsafe extern "C" fn rill_channel_write_record(
    channel: *mut RillChannel,
    record: *const RillRecord,
) -> c_int {
    if record.is_null() {
        return 0;
    }
    rill_channel_write(channel, (*record).index, (*record).message)
}

/// Poll for the next pending record (non-blocking, decomposed form).
///
/// On success copies the record's index to `index_out` and its message into
/// `message_buf`: when the message's byte length is >= `buf_len` it is
/// truncated to exactly `buf_len - 1` bytes; the buffer is always
/// NUL-terminated. Returns 0 when the channel handle is missing, no sample
/// is pending, or the pending sample is a non-alive tombstone (the
/// tombstone is still consumed).
///
/// # Safety
/// - `channel` must be a valid handle from `rill_channel_open`, or NULL.
/// - `index_out` must be a valid pointer or NULL.
/// - `message_buf` must point to at least `buf_len` writable bytes, or be
///   NULL.
#[no_mangle]
pub unsafe extern "C" fn rill_channel_take(
    channel: *mut RillChannel,
    index_out: *mut u32,
    message_buf: *mut c_char,
    buf_len: c_int,
) -> c_int {
    if channel.is_null() {
        return 0;
    }
    let channel_ref = &*channel.cast::<Channel>();

    let record = match channel_ref.take() {
        Ok(Some(record)) => record,
        _ => return 0,
    };

    if !index_out.is_null() {
        *index_out = record.index;
    }

    if !message_buf.is_null() && buf_len > 0 {
        let bytes = record.message.as_bytes();
        let cap = buf_len as usize;
        let len = if bytes.len() >= cap { cap - 1 } else { bytes.len() };
        ptr::copy_nonoverlapping(bytes.as_ptr(), message_buf.cast::<u8>(), len);
        *message_buf.add(len) = 0;
    }

    1
}

/// Poll for the next pending record (non-blocking, whole-record form).
///
/// On success fills `record_out` with the index and a heap-allocated,
/// untruncated message; release it with `rill_record_free`. Same no-data
/// and tombstone semantics as `rill_channel_take`.
///
/// # Safety
/// - `channel` must be a valid handle from `rill_channel_open`, or NULL.
/// - `record_out` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn rill_channel_take_record(
    channel: *mut RillChannel,
    record_out: *mut RillRecord,
) -> c_int {
    if channel.is_null() || record_out.is_null() {
        return 0;
    }
    let channel_ref = &*channel.cast::<Channel>();

    let record = match channel_ref.take() {
        Ok(Some(record)) => record,
        _ => return 0,
    };

    let Ok(message) = CString::new(record.message) else {
        return 0;
    };

    (*record_out).index = record.index;
    (*record_out).message = message.into_raw();
    1
}

/// Poll for the next pending record and return its message text.
///
/// Returns a heap-allocated, NUL-terminated string owned by the caller
/// (release with `rill_string_free`), or NULL when no alive sample is
/// pending. The record's index is stored in `index_out` when non-NULL.
///
/// # Safety
/// - `channel` must be a valid handle from `rill_channel_open`, or NULL.
/// - `index_out` must be a valid pointer or NULL.
#[no_mangle]
pub unsafe extern "C" fn rill_channel_take_message(
    channel: *mut RillChannel,
    index_out: *mut u32,
) -> *mut c_char {
    if channel.is_null() {
        return ptr::null_mut();
    }
    let channel_ref = &*channel.cast::<Channel>();

    let record = match channel_ref.take() {
        Ok(Some(record)) => record,
        _ => return ptr::null_mut(),
    };

    if !index_out.is_null() {
        *index_out = record.index;
    }

    match CString::new(record.message) {
        Ok(message) => message.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Release a string returned by `rill_channel_take_message`.
///
/// # Safety
/// - `s` must be a pointer returned by this library, or NULL (no-op).
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn rill_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Release the message owned by a record filled in by
/// `rill_channel_take_record`.
///
/// The record's `message` is reset to NULL; calling this twice is safe.
///
/// # Safety
/// - `record` must be a valid pointer or NULL (no-op).
/// - The record's `message` must have been allocated by this library.
#[no_mangle]
pub unsafe extern "C" fn rill_record_free(record: *mut RillRecord) {
    if record.is_null() {
        return;
    }
    let message = std::mem::replace(&mut (*record).message, ptr::null_mut());
    if !message.is_null() {
        drop(CString::from_raw(message));
    }
}

/// Get the library version string.
///
/// # Safety
/// The returned pointer is valid for the lifetime of the process (static
/// storage).
#[no_mangle]
pub unsafe extern "C" fn rill_version() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr().cast::<c_char>()
}
