use std::io::Write;

use crate::error::{Error, ErrorKind};

/// Return code of synchronous calls, and classification of an error handle.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Code {
    /// All is well.
    Ok,
    /// General error, details in the error handle.
    Error,
    /// A function argument was invalid.
    InvalidArg,
    /// The peer closed the transport before the message was complete.
    UnexpectedEof,
    /// A user callback aborted the operation.
    AbortedByCallback,
}

impl Code {
    fn of(err: &Error) -> Code {
        match err.kind() {
            ErrorKind::UnexpectedEof => Code::UnexpectedEof,
            ErrorKind::AbortedByCallback => Code::AbortedByCallback,
            _ => Code::Error,
        }
    }
}

ffi_fn! {
    /// Frees an error.
    fn tsue_error_free(err: *mut Error) {
        drop(non_null!(Box::from_raw(err) ?= ()));
    }
}

ffi_fn! {
    /// Get the classification of an error.
    fn tsue_error_code(err: *const Error) -> Code {
        Code::of(non_null!(&*err ?= Code::InvalidArg))
    } ?= Code::InvalidArg
}

ffi_fn! {
    /// Print the error details into `dst`, truncated to `dst_len` bytes.
    ///
    /// The output is not NUL terminated. Returns the number of bytes written.
    fn tsue_error_print(err: *const Error, dst: *mut u8, dst_len: usize) -> usize {
        let err = non_null!(&*err ?= 0);
        if dst.is_null() || dst_len == 0 {
            return 0;
        }

        // SAFETY: caller provides `dst_len` writable bytes
        let dst = unsafe { std::slice::from_raw_parts_mut(dst, dst_len) };
        let mut cursor = std::io::Cursor::new(dst);
        // a short write only truncates
        let _ = write!(cursor, "{err}");
        cursor.position() as usize
    } ?= 0
}
