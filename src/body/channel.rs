//! Demand driven handoff between the connection task and a response [`Body`].
//!
//! The receiver announces demand with the `WANT` flag, the connection task only reads the
//! transport while demand is present, so an unconsumed body never buffers more than one chunk.
//!
//! [`Body`]: super::Body
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Poll, Waker};

use bytes::Bytes;

use crate::error::Error;

/// Create a connected pair.
pub(crate) fn channel() -> (Sender, Receiver) {
    let shared = Arc::new(Shared {
        state: Mutex::new(State {
            flag: SENDER | RECEIVER,
            data: Data::None,
            recv: None,
            send: None,
        }),
    });
    (
        Sender {
            shared: shared.clone(),
        },
        Receiver { shared },
    )
}

/// Connection side handle.
pub(crate) struct Sender {
    shared: Arc<Shared>,
}

/// Body side handle.
pub(crate) struct Receiver {
    shared: Arc<Shared>,
}

struct Shared {
    state: Mutex<State>,
}

struct State {
    /// [ .., data, want, receiver, sender ]
    flag: u8,
    data: Data,
    recv: Option<Waker>,
    send: Option<Waker>,
}

enum Data {
    None,
    Chunk(Bytes),
    Eof,
    Err(Error),
}

const SENDER    : u8 = 1;
const RECEIVER  : u8 = 1 << 1;
const WANT      : u8 = 1 << 2;
const DATA      : u8 = 1 << 3;

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        // a poisoned lock only means a waker panicked, the state itself is consistent
        self.state.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}

impl State {
    #[inline(always)]
    fn is_set(&self, mask: u8) -> bool {
        self.flag & mask == mask
    }
}

// ===== Sender =====

impl Sender {
    /// Poll for demand from the receiver.
    ///
    /// Returns `Err` if the receiver is dropped, the remaining body will never be consumed.
    pub(crate) fn poll_want(&mut self, cx: &mut std::task::Context) -> Poll<Result<(), Closed>> {
        let mut state = self.shared.lock();

        if !state.is_set(RECEIVER) {
            return Poll::Ready(Err(Closed));
        }

        if state.is_set(WANT) && !state.is_set(DATA) {
            return Poll::Ready(Ok(()));
        }

        match &mut state.send {
            Some(waker) => waker.clone_from(cx.waker()),
            None => state.send = Some(cx.waker().clone()),
        }
        Poll::Pending
    }

    /// Send a chunk of body.
    pub(crate) fn send_data(&mut self, bytes: Bytes) {
        self.send(Data::Chunk(bytes));
    }

    /// Signal the end of body.
    pub(crate) fn send_eof(&mut self) {
        self.send(Data::Eof);
    }

    /// Abort the body with an error.
    pub(crate) fn send_error(&mut self, err: Error) {
        self.send(Data::Err(err));
    }

    fn send(&mut self, data: Data) {
        let waker = {
            let mut state = self.shared.lock();
            state.data = data;
            state.flag = (state.flag & !WANT) | DATA;
            state.recv.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

impl Drop for Sender {
    fn drop(&mut self) {
        let waker = {
            let mut state = self.shared.lock();
            state.flag &= !SENDER;
            state.recv.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

// ===== Receiver =====

impl Receiver {
    /// Poll for the next chunk, `None` means the body is complete.
    pub(crate) fn poll_data(
        &mut self,
        cx: &mut std::task::Context,
    ) -> Poll<Option<Result<Bytes, Error>>> {
        let waker = {
            let mut state = self.shared.lock();

            if state.is_set(DATA) {
                state.flag &= !DATA;
                return Poll::Ready(match mem::replace(&mut state.data, Data::None) {
                    Data::Chunk(bytes) => Some(Ok(bytes)),
                    Data::Err(err) => Some(Err(err)),
                    Data::Eof | Data::None => None,
                });
            }

            if !state.is_set(SENDER) {
                return Poll::Ready(Some(Err(Error::closed())));
            }

            match &mut state.recv {
                Some(waker) => waker.clone_from(cx.waker()),
                None => state.recv = Some(cx.waker().clone()),
            }

            if state.is_set(WANT) {
                None
            } else {
                state.flag |= WANT;
                state.send.take()
            }
        };

        if let Some(waker) = waker {
            waker.wake();
        }
        Poll::Pending
    }
}

impl Drop for Receiver {
    fn drop(&mut self) {
        let waker = {
            let mut state = self.shared.lock();
            state.flag &= !RECEIVER;
            state.send.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

// ===== Error =====

/// The receiving [`Body`] was dropped.
///
/// [`Body`]: super::Body
#[derive(Debug)]
pub(crate) struct Closed;

// ===== Helpers =====

impl std::fmt::Debug for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sender").finish_non_exhaustive()
    }
}

impl std::fmt::Debug for Receiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Receiver").finish_non_exhaustive()
    }
}
