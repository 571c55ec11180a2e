use std::ffi::c_void;
use std::ptr;

use crate::io::{Io, IoReadCallback, IoWriteCallback};

ffi_fn! {
    /// Create a new IO type used to represent a transport.
    ///
    /// The read and write functions of this transport should be set with `tsue_io_set_read` and
    /// `tsue_io_set_write`, by default reads report EOF and writes accept nothing.
    fn tsue_io_new() -> *mut Io {
        Box::into_raw(Box::new(Io::new()))
    } ?= ptr::null_mut()
}

ffi_fn! {
    /// Free an IO handle.
    ///
    /// Only needed if the IO was not consumed by `tsue_clientconn_handshake`.
    fn tsue_io_free(io: *mut Io) {
        drop(non_null!(Box::from_raw(io) ?= ()));
    }
}

ffi_fn! {
    /// Set the user data pointer passed to the read and write callbacks.
    fn tsue_io_set_userdata(io: *mut Io, data: *mut c_void) {
        non_null!(&mut *io ?= ()).set_userdata(data);
    }
}

ffi_fn! {
    /// Set the read function for this IO transport.
    ///
    /// Data read from the transport is written into `buf` up to `buf_len` bytes, returning the
    /// number of bytes read, 0 meaning EOF. Without data available, register a waker from the
    /// context and return `TSUE_IO_PENDING`. Return `TSUE_IO_ERROR` on a fatal fault.
    fn tsue_io_set_read(io: *mut Io, func: IoReadCallback) {
        non_null!(&mut *io ?= ()).set_read(func);
    }
}

ffi_fn! {
    /// Set the write function for this IO transport.
    ///
    /// Data from `buf` up to `buf_len` bytes is written to the transport, returning the number
    /// of bytes written. Without room available, register a waker from the context and return
    /// `TSUE_IO_PENDING`. Return `TSUE_IO_ERROR` on a fatal fault.
    fn tsue_io_set_write(io: *mut Io, func: IoWriteCallback) {
        non_null!(&mut *io ?= ()).set_write(func);
    }
}
