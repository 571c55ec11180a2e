use std::mem::ManuallyDrop;
use std::ptr;
use std::sync::Arc;

use super::error::Code;
use crate::client::{self, ClientConn, ClientConnOptions};
use crate::io::Io;
use crate::request::Request;
use crate::rt::{Executor, Task};

// ===== ClientConn =====

ffi_fn! {
    /// Creates a task that performs the handshake over `io`.
    ///
    /// Consumes both `io` and `options`. The task yields a `tsue_clientconn *` or an error,
    /// including when no live executor is set on the options.
    fn tsue_clientconn_handshake(io: *mut Io, options: *mut ClientConnOptions) -> *mut Task {
        let options = non_null!(Box::from_raw(options) ?= {
            if !io.is_null() {
                // SAFETY: consumed unconditionally
                drop(unsafe { Box::from_raw(io) });
            }
            ptr::null_mut()
        });
        let io = non_null!(Box::from_raw(io) ?= ptr::null_mut());

        Box::into_raw(Task::new(client::handshake(*io, *options)))
    } ?= ptr::null_mut()
}

ffi_fn! {
    /// Creates a task that sends a request on the connection.
    ///
    /// Consumes the request. The task yields a `tsue_response *` or an error.
    fn tsue_clientconn_send(conn: *mut ClientConn, req: *mut Request) -> *mut Task {
        let req = non_null!(Box::from_raw(req) ?= ptr::null_mut());
        let conn = non_null!(&mut *conn ?= ptr::null_mut());

        Box::into_raw(Task::new(conn.send(*req)))
    } ?= ptr::null_mut()
}

ffi_fn! {
    /// Free a connection.
    ///
    /// The background connection task completes once in flight exchanges are done.
    fn tsue_clientconn_free(conn: *mut ClientConn) {
        drop(non_null!(Box::from_raw(conn) ?= ()));
    }
}

// ===== Options =====

ffi_fn! {
    /// Creates a new set of connection options.
    fn tsue_clientconn_options_new() -> *mut ClientConnOptions {
        Box::into_raw(Box::new(ClientConnOptions::new()))
    } ?= ptr::null_mut()
}

ffi_fn! {
    /// Free a set of options.
    ///
    /// Only needed if the options were not consumed by `tsue_clientconn_handshake`.
    fn tsue_clientconn_options_free(opts: *mut ClientConnOptions) {
        drop(non_null!(Box::from_raw(opts) ?= ()));
    }
}

ffi_fn! {
    /// Set the executor that runs the background connection task.
    ///
    /// Neither handle is consumed, the options keep a weak reference to the executor.
    fn tsue_clientconn_options_exec(opts: *mut ClientConnOptions, exec: *const Executor) {
        let opts = non_null!(&mut *opts ?= ());
        // the executor is borrowed, not consumed
        let exec = ManuallyDrop::new(non_null!(Arc::from_raw(exec) ?= ()));
        opts.exec(&exec);
    }
}

ffi_fn! {
    /// Set the maximum number of header fields accepted in a response, must be non zero.
    fn tsue_clientconn_options_set_max_headers(opts: *mut ClientConnOptions, max: usize) -> Code {
        let opts = non_null!(&mut *opts ?= Code::InvalidArg);
        match opts.max_headers(max) {
            Ok(()) => Code::Ok,
            Err(_) => Code::InvalidArg,
        }
    } ?= Code::InvalidArg
}

ffi_fn! {
    /// Set the maximum size of a response head, must be at least 8192.
    fn tsue_clientconn_options_set_max_buf_size(opts: *mut ClientConnOptions, max: usize) -> Code {
        let opts = non_null!(&mut *opts ?= Code::InvalidArg);
        match opts.max_buf_size(max) {
            Ok(()) => Code::Ok,
            Err(_) => Code::InvalidArg,
        }
    } ?= Code::InvalidArg
}
