use std::ffi::{c_int, c_void};
use std::ptr;
use std::task::Poll;

use bytes::Bytes;

use crate::common::UserData;
use crate::error::{Error, ErrorKind};
use crate::ffi::{Buf, TSUE_POLL_ERROR, TSUE_POLL_PENDING, TSUE_POLL_READY};
use crate::rt::Context;

/// Callback producing request body chunks.
///
/// Sets the out pointer to a [`Buf`] and returns `TSUE_POLL_READY` for a chunk, leaves it null
/// and returns `TSUE_POLL_READY` at the end of body.
pub type BodyDataCallback =
    extern "C" fn(*mut c_void, *mut Context<'_>, *mut *mut Buf) -> c_int;

/// Request body produced by an application callback.
pub(crate) struct UserBody {
    data_func: BodyDataCallback,
    userdata: UserData,
}

impl UserBody {
    pub(crate) fn new() -> Self {
        Self {
            data_func: data_noop,
            userdata: UserData::null(),
        }
    }

    pub(crate) fn set_data_func(&mut self, func: BodyDataCallback) {
        self.data_func = func;
    }

    pub(crate) fn set_userdata(&mut self, userdata: *mut c_void) {
        self.userdata = UserData(userdata);
    }

    pub(crate) fn poll_data(
        &mut self,
        cx: &mut std::task::Context,
    ) -> Poll<Option<Result<Bytes, Error>>> {
        let mut out = ptr::null_mut::<Buf>();
        match (self.data_func)(self.userdata.0, Context::wrap(cx), &mut out) {
            TSUE_POLL_READY => {
                if out.is_null() {
                    Poll::Ready(None)
                } else {
                    // SAFETY: the callback hands over a `Buf` created by `tsue_buf_copy`
                    let buf = unsafe { Box::from_raw(out) };
                    Poll::Ready(Some(Ok(buf.into_bytes())))
                }
            }
            TSUE_POLL_PENDING => Poll::Pending,
            TSUE_POLL_ERROR => Poll::Ready(Some(Err(Error::new(ErrorKind::AbortedByCallback)))),
            unexpected => {
                crate::log::error!("body data callback returned unexpected value: {unexpected}");
                Poll::Ready(Some(Err(Error::new(ErrorKind::AbortedByCallback))))
            }
        }
    }
}

extern "C" fn data_noop(_: *mut c_void, _: *mut Context<'_>, _: *mut *mut Buf) -> c_int {
    TSUE_POLL_READY
}

impl std::fmt::Debug for UserBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserBody").field("userdata", &self.userdata).finish_non_exhaustive()
    }
}
