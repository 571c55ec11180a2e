//! HTTP Response
use bytes::Bytes;

use crate::{
    body::Body,
    headers::HeaderMap,
    http::{StatusCode, Version},
    request::delegate,
};

/// Response head.
#[derive(Debug, Default)]
pub struct Parts {
    pub version: Version,
    pub status: StatusCode,
    /// reason phrase as received, may be empty
    pub reason: Bytes,
    pub headers: HeaderMap,
}

/// Response received on a [`ClientConn`].
///
/// The body streams from the connection on demand, see [`Body`].
///
/// [`ClientConn`]: crate::client::ClientConn
#[derive(Debug, Default)]
pub struct Response {
    parts: Parts,
    body: Body,
}

impl Response {
    #[inline]
    pub fn from_parts(parts: Parts, body: Body) -> Self {
        Self { parts, body }
    }

    #[inline]
    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    delegate! {
        /// Status code, within `100..=599`.
        status, status_mut: StatusCode;
        /// Protocol version of the status line.
        version, version_mut: Version;
        /// Header fields, in the order received with their original casing.
        headers, headers_mut: HeaderMap;
    }

    /// Returns the reason phrase.
    ///
    /// Falls back to the canonical reason of the status code when the peer sent none.
    pub fn reason_phrase(&self) -> &[u8] {
        match self.parts.reason.is_empty() {
            true => self.parts.status.canonical_reason().unwrap_or("").as_bytes(),
            false => &self.parts.reason,
        }
    }

    #[inline]
    pub fn body(&self) -> &Body {
        &self.body
    }

    #[inline]
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Takes the body out, leaving an empty one behind.
    #[inline]
    pub fn take_body(&mut self) -> Body {
        std::mem::take(&mut self.body)
    }

    #[inline]
    pub fn into_body(self) -> Body {
        self.body
    }
}
