//! Transport driven by application callbacks.
use std::ffi::c_void;
use std::io;
use std::mem::MaybeUninit;
use std::pin::Pin;
use std::task::{Poll, ready};

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::common::UserData;
use crate::ffi::{TSUE_IO_ERROR, TSUE_IO_PENDING};
use crate::rt::Context;

/// Largest capacity offered to a callback, keeping every legitimate count below the sentinels.
const MAX_IO_LEN: usize = TSUE_IO_ERROR - 1;

/// Read callback, `(userdata, context, buffer, capacity) -> bytes | PENDING | ERROR`.
pub type IoReadCallback = extern "C" fn(*mut c_void, *mut Context<'_>, *mut u8, usize) -> usize;

/// Write callback, `(userdata, context, buffer, len) -> bytes | PENDING | ERROR`.
pub type IoWriteCallback = extern "C" fn(*mut c_void, *mut Context<'_>, *const u8, usize) -> usize;

/// Byte stream backed by application callbacks.
pub struct Io {
    read: IoReadCallback,
    write: IoWriteCallback,
    userdata: UserData,
}

/// Outcome of a single callback invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IoPoll {
    Ready(usize),
    Pending,
    Error,
}

impl IoPoll {
    fn from_raw(ret: usize, capacity: usize) -> IoPoll {
        match ret {
            TSUE_IO_PENDING => IoPoll::Pending,
            TSUE_IO_ERROR => IoPoll::Error,
            n if n > capacity => {
                crate::log::error!("transport callback returned {n} for a capacity of {capacity}");
                IoPoll::Error
            }
            n => IoPoll::Ready(n),
        }
    }
}

impl Io {
    /// Create an inert transport, reads report EOF and writes accept nothing.
    pub fn new() -> Io {
        Io {
            read: read_noop,
            write: write_noop,
            userdata: UserData::null(),
        }
    }

    pub fn set_userdata(&mut self, userdata: *mut c_void) {
        self.userdata = UserData(userdata);
    }

    pub fn set_read(&mut self, read: IoReadCallback) {
        self.read = read;
    }

    pub fn set_write(&mut self, write: IoWriteCallback) {
        self.write = write;
    }

    pub(crate) fn poll_read_raw(
        &mut self,
        cx: &mut std::task::Context,
        buf: &mut [MaybeUninit<u8>],
    ) -> IoPoll {
        let capacity = buf.len().min(MAX_IO_LEN);
        let ret = (self.read)(
            self.userdata.0,
            Context::wrap(cx),
            buf.as_mut_ptr().cast(),
            capacity,
        );
        IoPoll::from_raw(ret, capacity)
    }

    pub(crate) fn poll_write_raw(&mut self, cx: &mut std::task::Context, buf: &[u8]) -> IoPoll {
        let capacity = buf.len().min(MAX_IO_LEN);
        let ret = (self.write)(self.userdata.0, Context::wrap(cx), buf.as_ptr(), capacity);
        IoPoll::from_raw(ret, capacity)
    }

    /// Probe writability with an empty write.
    pub(crate) fn poll_ready(&mut self, cx: &mut std::task::Context) -> Poll<io::Result<()>> {
        match self.poll_write_raw(cx, &[]) {
            IoPoll::Ready(_) => Poll::Ready(Ok(())),
            IoPoll::Pending => Poll::Pending,
            IoPoll::Error => Poll::Ready(Err(callback_error())),
        }
    }
}

fn callback_error() -> io::Error {
    io::Error::other("transport callback reported an error")
}

extern "C" fn read_noop(_: *mut c_void, _: *mut Context<'_>, _: *mut u8, _: usize) -> usize {
    0
}

extern "C" fn write_noop(_: *mut c_void, _: *mut Context<'_>, _: *const u8, _: usize) -> usize {
    0
}

impl Default for Io {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Io {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Io").field("userdata", &self.userdata).finish_non_exhaustive()
    }
}

// ===== Async IO =====

impl AsyncRead for Io {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let me = self.get_mut();
        // SAFETY: the callback only writes initialized bytes, and only `n` of them are assumed
        let unfilled = unsafe { buf.unfilled_mut() };
        match me.poll_read_raw(cx, unfilled) {
            IoPoll::Ready(n) => {
                // SAFETY: callback reported `n` bytes written, `n <= capacity`
                unsafe { buf.assume_init(n) };
                buf.advance(n);
                Poll::Ready(Ok(()))
            }
            IoPoll::Pending => Poll::Pending,
            IoPoll::Error => Poll::Ready(Err(callback_error())),
        }
    }
}

impl AsyncWrite for Io {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut().poll_write_raw(cx, buf) {
            IoPoll::Ready(n) => Poll::Ready(Ok(n)),
            IoPoll::Pending => Poll::Pending,
            IoPoll::Error => Poll::Ready(Err(callback_error())),
        }
    }

    #[inline]
    fn poll_flush(self: Pin<&mut Self>, _: &mut std::task::Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    #[inline]
    fn poll_shutdown(self: Pin<&mut Self>, _: &mut std::task::Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

// ===== Buffered =====

/// Read into the spare capacity of `buf`, reserving `reserve` bytes first if it is full.
pub(crate) fn poll_read_buf<R>(
    io: &mut R,
    buf: &mut BytesMut,
    reserve: usize,
    cx: &mut std::task::Context,
) -> Poll<io::Result<usize>>
where
    R: AsyncRead + Unpin,
{
    if !buf.has_remaining_mut() || buf.capacity() == buf.len() {
        buf.reserve(reserve);
    }

    let read = {
        let dst = buf.chunk_mut();
        // SAFETY: `ReadBuf` never de-initializes memory
        let dst = unsafe { dst.as_uninit_slice_mut() };
        let mut read_buf = ReadBuf::uninit(dst);
        ready!(Pin::new(io).poll_read(cx, &mut read_buf))?;
        read_buf.filled().len()
    };

    // SAFETY: `read` bytes were initialized by the reader
    unsafe { buf.advance_mut(read) };

    Poll::Ready(Ok(read))
}

/// Write all of `buf`, advancing it as bytes are accepted.
pub(crate) fn poll_write_all<W>(
    io: &mut W,
    buf: &mut BytesMut,
    cx: &mut std::task::Context,
) -> Poll<io::Result<()>>
where
    W: AsyncWrite + Unpin,
{
    use bytes::Buf;

    while buf.has_remaining() {
        let n = ready!(Pin::new(&mut *io).poll_write(cx, buf.chunk()))?;
        if n == 0 {
            return Poll::Ready(Err(io::ErrorKind::WriteZero.into()));
        }
        buf.advance(n);
    }
    Poll::Ready(Ok(()))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::task::Waker;

    extern "C" fn read_abc(_: *mut c_void, _: *mut Context<'_>, buf: *mut u8, cap: usize) -> usize {
        let src = b"abc";
        let n = src.len().min(cap);
        unsafe { std::ptr::copy_nonoverlapping(src.as_ptr(), buf, n) };
        n
    }

    extern "C" fn read_overflow(_: *mut c_void, _: *mut Context<'_>, _: *mut u8, cap: usize) -> usize {
        cap + 1
    }

    extern "C" fn write_pending(_: *mut c_void, _: *mut Context<'_>, _: *const u8, _: usize) -> usize {
        TSUE_IO_PENDING
    }

    extern "C" fn write_error(_: *mut c_void, _: *mut Context<'_>, _: *const u8, _: usize) -> usize {
        TSUE_IO_ERROR
    }

    #[test]
    fn io_callbacks() {
        let mut cx = std::task::Context::from_waker(Waker::noop());

        // inert transport
        let mut io = Io::new();
        let mut buf = BytesMut::new();
        assert!(matches!(poll_read_buf(&mut io, &mut buf, 64, &mut cx), Poll::Ready(Ok(0))));
        assert!(matches!(io.poll_ready(&mut cx), Poll::Ready(Ok(()))));

        io.set_read(read_abc);
        assert!(matches!(poll_read_buf(&mut io, &mut buf, 64, &mut cx), Poll::Ready(Ok(3))));
        assert_eq!(&buf[..], b"abc");

        io.set_read(read_overflow);
        assert!(matches!(poll_read_buf(&mut io, &mut buf, 64, &mut cx), Poll::Ready(Err(_))));

        io.set_write(write_pending);
        assert!(io.poll_ready(&mut cx).is_pending());
        let mut out = BytesMut::from(&b"GET"[..]);
        assert!(poll_write_all(&mut io, &mut out, &mut cx).is_pending());
        assert_eq!(&out[..], b"GET");

        io.set_write(write_error);
        assert!(matches!(io.poll_ready(&mut cx), Poll::Ready(Err(_))));
        assert!(matches!(poll_write_all(&mut io, &mut out, &mut cx), Poll::Ready(Err(_))));
    }

    #[test]
    fn sentinel_classification() {
        assert_eq!(IoPoll::from_raw(TSUE_IO_PENDING, usize::MAX), IoPoll::Pending);
        assert_eq!(IoPoll::from_raw(TSUE_IO_ERROR, usize::MAX), IoPoll::Error);
        assert_eq!(IoPoll::from_raw(4, 4), IoPoll::Ready(4));
        assert_eq!(IoPoll::from_raw(5, 4), IoPoll::Error);
        assert!(MAX_IO_LEN < TSUE_IO_ERROR);
    }
}
