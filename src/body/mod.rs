//! HTTP Message Body.
use std::pin::Pin;
use std::task::Poll;

use bytes::Bytes;
use futures_core::Stream;

use crate::error::Error;

mod channel;
mod user;

pub(crate) use channel::{Receiver, Sender, channel};
pub(crate) use user::UserBody;
pub use user::BodyDataCallback;


/// HTTP Message Body.
///
/// A stream of [`Bytes`] chunks, either owned in memory, produced by an application callback, or
/// received from a connection.
#[derive(Debug, Default)]
pub struct Body {
    repr: Repr,
}

#[derive(Debug, Default)]
enum Repr {
    #[default]
    Empty,
    Full(Bytes),
    User(UserBody),
    Incoming {
        recv: Receiver,
        remaining: Option<u64>,
    },
}

// ===== Constructor =====

impl Body {
    /// Create an empty [`Body`].
    #[inline]
    pub const fn empty() -> Body {
        Self { repr: Repr::Empty }
    }

    /// Create an exact size [`Body`].
    #[inline]
    pub fn full(bytes: impl Into<Bytes>) -> Body {
        let bytes = bytes.into();
        match bytes.is_empty() {
            true => Self::empty(),
            false => Self {
                repr: Repr::Full(bytes),
            },
        }
    }

    pub(crate) fn user(user: UserBody) -> Body {
        Self {
            repr: Repr::User(user),
        }
    }

    pub(crate) fn incoming(recv: Receiver, content_length: Option<u64>) -> Body {
        Self {
            repr: Repr::Incoming {
                recv,
                remaining: content_length,
            },
        }
    }
}

// ===== Ref =====

impl Body {
    /// Returns `true` if there is no more data to be read.
    #[inline]
    pub fn is_end_stream(&self) -> bool {
        matches!(self.repr, Repr::Empty)
    }

    /// Returns the exact remaining length if known.
    pub fn exact_len(&self) -> Option<u64> {
        match &self.repr {
            Repr::Empty => Some(0),
            Repr::Full(bytes) => Some(bytes.len() as u64),
            Repr::User(_) => None,
            Repr::Incoming { remaining, .. } => *remaining,
        }
    }

    pub(crate) fn user_mut(&mut self) -> Option<&mut UserBody> {
        match &mut self.repr {
            Repr::User(user) => Some(user),
            _ => None,
        }
    }
}

// ===== Read =====

impl Body {
    /// Tries to read the next chunk, `None` means the body is complete.
    pub fn poll_data(&mut self, cx: &mut std::task::Context) -> Poll<Option<Result<Bytes, Error>>> {
        let result = match &mut self.repr {
            Repr::Empty => return Poll::Ready(None),
            Repr::Full(bytes) => {
                let bytes = std::mem::take(bytes);
                self.repr = Repr::Empty;
                return Poll::Ready(Some(Ok(bytes)));
            }
            Repr::User(user) => std::task::ready!(user.poll_data(cx)),
            Repr::Incoming { recv, remaining } => {
                let result = std::task::ready!(recv.poll_data(cx));
                if let (Some(Ok(bytes)), Some(remaining)) = (&result, remaining) {
                    *remaining = remaining.saturating_sub(bytes.len() as u64);
                }
                result
            }
        };

        if !matches!(result, Some(Ok(_))) {
            self.repr = Repr::Empty;
        }

        Poll::Ready(result)
    }

    /// Read the next chunk.
    #[inline]
    pub fn data(&mut self) -> impl Future<Output = Option<Result<Bytes, Error>>> {
        std::future::poll_fn(|cx| self.poll_data(cx))
    }
}

impl Stream for Body {
    type Item = Result<Bytes, Error>;

    #[inline]
    fn poll_next(self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().poll_data(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.repr {
            Repr::Empty => (0, Some(0)),
            Repr::Full(_) => (1, Some(1)),
            _ => (0, None),
        }
    }
}

impl From<Bytes> for Body {
    #[inline]
    fn from(value: Bytes) -> Self {
        Self::full(value)
    }
}

impl From<&'static str> for Body {
    #[inline]
    fn from(value: &'static str) -> Self {
        Self::full(Bytes::from_static(value.as_bytes()))
    }
}
