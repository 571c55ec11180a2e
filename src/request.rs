//! HTTP Request
use crate::{
    body::Body,
    headers::HeaderMap,
    http::{Method, Uri, Version},
};

/// Generate a shared and a mutable accessor for a field of `self.parts`.
macro_rules! delegate {
    ($(
        $(#[$doc:meta])*
        $field:ident, $field_mut:ident: $ty:ty;
    )*) => {$(
        $(#[$doc])*
        #[inline]
        pub fn $field(&self) -> &$ty {
            &self.parts.$field
        }

        $(#[$doc])*
        #[inline]
        pub fn $field_mut(&mut self) -> &mut $ty {
            &mut self.parts.$field
        }
    )*};
}

pub(crate) use delegate;

/// Request head.
#[derive(Debug, Clone, Default)]
pub struct Parts {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
}

/// Request to be sent on a [`ClientConn`].
///
/// Defaults to `GET / HTTP/1.1` without headers and with an empty body.
///
/// [`ClientConn`]: crate::client::ClientConn
#[derive(Debug, Default)]
pub struct Request {
    parts: Parts,
    body: Body,
}

impl Request {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn from_parts(parts: Parts, body: Body) -> Self {
        Self { parts, body }
    }

    delegate! {
        /// Request method.
        method, method_mut: Method;
        /// Request target.
        uri, uri_mut: Uri;
        /// Protocol version of the request line.
        version, version_mut: Version;
        /// Header fields, written in insertion order.
        headers, headers_mut: HeaderMap;
    }

    #[inline]
    pub fn body(&self) -> &Body {
        &self.body
    }

    #[inline]
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Split the request into its head and body.
    #[inline]
    pub fn into_parts(self) -> (Parts, Body) {
        (self.parts, self.body)
    }
}
