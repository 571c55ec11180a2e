use std::ffi::{c_int, c_void};
use std::ptr;

use bytes::Bytes;

use super::{SendPtr, TSUE_ITER_CONTINUE, slice_from_raw};
use crate::body::{Body, BodyDataCallback, UserBody};
use crate::common::UserData;
use crate::error::Error;
use crate::rt::Task;

/// Owned chunk of bytes.
pub struct Buf(Bytes);

impl Buf {
    pub(crate) fn new(bytes: Bytes) -> Self {
        Self(bytes)
    }

    pub(crate) fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl std::fmt::Debug for Buf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Buf").field(&self.0).finish()
    }
}

type BodyForeachCallback = extern "C" fn(*mut c_void, *const Buf) -> c_int;

// ===== Body =====

ffi_fn! {
    /// Create a new body to be produced by a data callback.
    ///
    /// Without `tsue_body_set_data_func`, the body is empty.
    fn tsue_body_new() -> *mut Body {
        Box::into_raw(Box::new(Body::user(UserBody::new())))
    } ?= ptr::null_mut()
}

ffi_fn! {
    /// Free a body.
    ///
    /// A response body freed before its end aborts consumption, the connection is closed.
    fn tsue_body_free(body: *mut Body) {
        drop(non_null!(Box::from_raw(body) ?= ()));
    }
}

ffi_fn! {
    /// Creates a task that polls the body for the next chunk.
    ///
    /// The task yields a `tsue_buf *` with more data, `TSUE_TASK_EMPTY` at the end of body, or an
    /// error. The body is not consumed, but it must not be used or freed until the task
    /// completes.
    fn tsue_body_data(body: *mut Body) -> *mut Task {
        if body.is_null() {
            return ptr::null_mut();
        }
        let body = SendPtr(body);

        Box::into_raw(Task::new(async move {
            let mut body = body;
            // SAFETY: the application keeps the body alive and untouched until completion
            let body = unsafe { body.as_mut() };
            body.data().await.transpose()
        }))
    } ?= ptr::null_mut()
}

ffi_fn! {
    /// Creates a task that calls `func` with each chunk of the body.
    ///
    /// Consumes the body. The `tsue_buf *` passed to the callback is borrowed for the duration of
    /// the call. Returning anything but `TSUE_ITER_CONTINUE` stops the iteration. The task yields
    /// `TSUE_TASK_EMPTY` or an error.
    fn tsue_body_foreach(body: *mut Body, func: BodyForeachCallback, userdata: *mut c_void) -> *mut Task {
        let mut body = non_null!(Box::from_raw(body) ?= ptr::null_mut());
        let userdata = UserData(userdata);

        Box::into_raw(Task::new(async move {
            let userdata = userdata;
            while let Some(chunk) = body.data().await {
                let buf = Buf(chunk?);
                if func(userdata.0, &buf) != TSUE_ITER_CONTINUE {
                    break;
                }
            }
            Ok::<_, Error>(())
        }))
    } ?= ptr::null_mut()
}

ffi_fn! {
    /// Set the user data pointer passed to the data callback.
    fn tsue_body_set_userdata(body: *mut Body, userdata: *mut c_void) {
        let body = non_null!(&mut *body ?= ());
        match body.user_mut() {
            Some(user) => user.set_userdata(userdata),
            None => {
                crate::log::warning!("userdata set on a body not created by tsue_body_new");
            }
        }
    }
}

ffi_fn! {
    /// Set the data callback producing this body.
    ///
    /// The callback sets `*chunk` to a `tsue_buf *` and returns `TSUE_POLL_READY` for each
    /// chunk, leaves it null and returns `TSUE_POLL_READY` at the end of body. Without data
    /// available, register a waker from the context and return `TSUE_POLL_PENDING`. Returning
    /// `TSUE_POLL_ERROR` aborts the request with `TSUE_ABORTED_BY_CALLBACK`.
    fn tsue_body_set_data_func(body: *mut Body, func: BodyDataCallback) {
        let body = non_null!(&mut *body ?= ());
        match body.user_mut() {
            Some(user) => user.set_data_func(func),
            None => {
                crate::log::warning!("data func set on a body not created by tsue_body_new");
            }
        }
    }
}

// ===== Buf =====

ffi_fn! {
    /// Create a buffer holding a copy of `len` bytes from `buf`.
    ///
    /// Returns null if `buf` is null while `len` is not zero.
    fn tsue_buf_copy(buf: *const u8, len: usize) -> *mut Buf {
        // SAFETY: caller provides a valid region
        let Some(slice) = (unsafe { slice_from_raw(buf, len) }) else {
            return ptr::null_mut();
        };
        Box::into_raw(Box::new(Buf(Bytes::copy_from_slice(slice))))
    } ?= ptr::null_mut()
}

ffi_fn! {
    /// Get a pointer to the bytes in this buffer, valid until the buffer is freed.
    fn tsue_buf_bytes(buf: *const Buf) -> *const u8 {
        non_null!(&*buf ?= ptr::null()).0.as_ptr()
    } ?= ptr::null()
}

ffi_fn! {
    /// Get the length of the bytes this buffer contains.
    fn tsue_buf_len(buf: *const Buf) -> usize {
        non_null!(&*buf ?= 0).0.len()
    } ?= 0
}

ffi_fn! {
    /// Free a buffer.
    fn tsue_buf_free(buf: *mut Buf) {
        drop(non_null!(Box::from_raw(buf) ?= ()));
    }
}
