//! C API.
//!
//! Every handle is an opaque pointer created by a `*_new` function, or handed out by a task, and
//! released by the matching `*_free` function. Freeing a null handle is a no-op.
//!
//! Operations that can suspend return a [`Task`][crate::rt::Task] which must be pushed to an
//! executor, the outcome is read from the completed task.
#[macro_use]
mod macros;

mod body;
mod client;
mod error;
mod http_types;
mod io;
mod task;

use std::ffi::{c_char, c_int};

pub use body::Buf;
pub use error::Code;

#[cfg(test)]
mod test;

/// Transport callback return value, no progress possible, a waker is registered.
pub const TSUE_IO_PENDING: usize = 0xFFFF_FFFF;

/// Transport callback return value, unrecoverable transport fault.
pub const TSUE_IO_ERROR: usize = 0xFFFF_FFFE;

/// Body data callback return value, a chunk or the end of body is ready.
pub const TSUE_POLL_READY: c_int = 0;

/// Body data callback return value, a waker is registered.
pub const TSUE_POLL_PENDING: c_int = 1;

/// Body data callback return value, abort the request.
pub const TSUE_POLL_ERROR: c_int = 3;

/// Continue iterating.
pub const TSUE_ITER_CONTINUE: c_int = 0;

/// Stop iterating.
pub const TSUE_ITER_BREAK: c_int = 1;

pub const TSUE_HTTP_VERSION_NONE: c_int = 0;
pub const TSUE_HTTP_VERSION_1_0: c_int = 10;
pub const TSUE_HTTP_VERSION_1_1: c_int = 11;

static VERSION_CSTR: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

/// Opaque pointer moved into a future.
struct SendPtr<T>(*mut T);

// SAFETY: the application guarantees exclusive access until the task completes
unsafe impl<T> Send for SendPtr<T> { }

impl<T> SendPtr<T> {
    /// # Safety
    ///
    /// Pointer must be valid and not aliased for the returned lifetime.
    unsafe fn as_mut<'a>(&mut self) -> &'a mut T {
        unsafe { &mut *self.0 }
    }
}

/// Borrow a byte slice from C, `None` if the pointer is null with a non zero length.
///
/// # Safety
///
/// A non null `ptr` must be valid for `len` bytes.
unsafe fn slice_from_raw<'a>(ptr: *const u8, len: usize) -> Option<&'a [u8]> {
    match (ptr.is_null(), len) {
        (_, 0) => Some(&[]),
        (true, _) => None,
        // SAFETY: guaranteed by caller
        (false, len) => Some(unsafe { std::slice::from_raw_parts(ptr, len) }),
    }
}

ffi_fn! {
    /// Returns a static NUL terminated string of the library version.
    fn tsue_version() -> *const c_char {
        VERSION_CSTR.as_ptr().cast()
    } ?= std::ptr::null()
}
