//! Engine error.
use std::{fmt, io};

use crate::h1::{BodyError, ParseError};

/// Result type returned by the engine.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error that terminates a task.
///
/// Asynchronous failures never surface as status codes, they complete the dependent task with
/// this error instead.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

/// Classification of [`Error`].
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The transport reported a fault.
    Io(io::Error),
    /// The peer closed the transport before the message was complete.
    UnexpectedEof,
    /// The response head is malformed.
    Parse(ParseError),
    /// The response body framing is malformed.
    Body(BodyError),
    /// The response head exceeds the configured buffer limit.
    MessageHeadTooLarge,
    /// A user supplied request body callback returned an error.
    AbortedByCallback,
    /// The connection is closed and cannot carry the request.
    ConnectionClosed,
    /// The connection ended before the request was written.
    Canceled,
    /// No executor is available to run the background connection task.
    NoExecutor,
}

use ErrorKind as Kind;

impl Error {
    pub(crate) fn new(kind: Kind) -> Self {
        Self { kind }
    }

    pub(crate) fn io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Self::new(Kind::UnexpectedEof),
            _ => Self::new(Kind::Io(err)),
        }
    }

    pub(crate) fn closed() -> Self {
        Self::new(Kind::ConnectionClosed)
    }

    /// Copy of this error, delivered to the request while the connection task keeps the
    /// original.
    pub(crate) fn duplicate(&self) -> Self {
        let kind = match &self.kind {
            Kind::Io(err) => Kind::Io(io::Error::new(err.kind(), err.to_string())),
            Kind::UnexpectedEof => Kind::UnexpectedEof,
            Kind::Parse(err) => Kind::Parse(*err),
            Kind::Body(err) => Kind::Body(*err),
            Kind::MessageHeadTooLarge => Kind::MessageHeadTooLarge,
            Kind::AbortedByCallback => Kind::AbortedByCallback,
            Kind::ConnectionClosed => Kind::ConnectionClosed,
            Kind::Canceled => Kind::Canceled,
            Kind::NoExecutor => Kind::NoExecutor,
        };
        Self::new(kind)
    }

    /// Returns the error classification.
    #[inline]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns `true` if the peer closed the transport mid message.
    #[inline]
    pub fn is_unexpected_eof(&self) -> bool {
        matches!(self.kind, Kind::UnexpectedEof)
    }

    /// Returns `true` if a user callback aborted the operation.
    #[inline]
    pub fn is_aborted_by_callback(&self) -> bool {
        matches!(self.kind, Kind::AbortedByCallback)
    }

    /// Returns `true` if the connection was already closed.
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self.kind, Kind::ConnectionClosed)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            Kind::Io(err) => Some(err),
            Kind::Parse(err) => Some(err),
            Kind::Body(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Io(err) => write!(f, "transport error: {err}"),
            Kind::UnexpectedEof => f.write_str("connection closed before message completed"),
            Kind::Parse(err) => write!(f, "invalid response head: {err}"),
            Kind::Body(err) => write!(f, "invalid response body: {err}"),
            Kind::MessageHeadTooLarge => f.write_str("message head is too large"),
            Kind::AbortedByCallback => f.write_str("operation aborted by an application callback"),
            Kind::ConnectionClosed => f.write_str("connection closed"),
            Kind::Canceled => f.write_str("operation was canceled"),
            Kind::NoExecutor => f.write_str("no executor to run the connection task"),
        }
    }
}

impl From<Kind> for Error {
    #[inline]
    fn from(kind: Kind) -> Self {
        Self { kind }
    }
}

impl From<io::Error> for Error {
    #[inline]
    fn from(err: io::Error) -> Self {
        Self::io(err)
    }
}

impl From<ParseError> for Error {
    #[inline]
    fn from(err: ParseError) -> Self {
        Self::new(Kind::Parse(err))
    }
}

impl From<BodyError> for Error {
    #[inline]
    fn from(err: BodyError) -> Self {
        Self::new(Kind::Body(err))
    }
}
