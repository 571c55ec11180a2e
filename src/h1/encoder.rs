use std::fmt::Write;

use bytes::{BufMut, Bytes, BytesMut};

use super::error::BodyError;
use crate::body::Body;
use crate::headers::standard::{CONTENT_LENGTH, HOST, TRANSFER_ENCODING};
use crate::request::Parts;

/// Request body framing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Encoder {
    /// Remaining length of a `Content-Length` body.
    Length(u64),
    Chunked,
    /// No body is written.
    Empty,
}

/// Write request head, returns the body framing.
///
/// Header names are written with their original casing. `Host` is derived from an absolute-form
/// target, and the framing header is added unless the application set one.
pub(crate) fn encode_head(parts: &Parts, body: &Body, dst: &mut BytesMut) -> Encoder {
    dst.put_slice(parts.method.as_bytes());
    dst.put_u8(b' ');
    dst.put_slice(parts.uri.path_and_query());
    dst.put_u8(b' ');
    dst.put_slice(parts.version.as_str().as_bytes());
    dst.put_slice(b"\r\n");

    if let Some(authority) = parts.uri.authority() {
        if !parts.headers.contains_key(HOST) {
            dst.put_slice(b"Host: ");
            dst.put_slice(authority);
            dst.put_slice(b"\r\n");
        }
    }

    for (name, value) in parts.headers.iter_raw() {
        dst.put_slice(name);
        dst.put_slice(b": ");
        dst.put_slice(value.as_bytes());
        dst.put_slice(b"\r\n");
    }

    let encoder = match framing(parts) {
        Some(encoder) => encoder,
        None => match body.exact_len() {
            Some(0) => Encoder::Empty,
            Some(len) => {
                dst.put_slice(b"content-length: ");
                dst.put_slice(itoa::Buffer::new().format(len).as_bytes());
                dst.put_slice(b"\r\n");
                Encoder::Length(len)
            }
            None => {
                dst.put_slice(b"transfer-encoding: chunked\r\n");
                Encoder::Chunked
            }
        },
    };

    dst.put_slice(b"\r\n");
    encoder
}

/// Framing declared by the application headers.
fn framing(parts: &Parts) -> Option<Encoder> {
    if let Some(value) = parts.headers.get_all(TRANSFER_ENCODING).last() {
        let is_chunked = value
            .as_bytes()
            .rsplit(|&b| b == b',')
            .next()
            .is_some_and(|e| e.trim_ascii().eq_ignore_ascii_case(b"chunked"));
        if is_chunked {
            return Some(Encoder::Chunked);
        }
    }

    let len = parts.headers.get(CONTENT_LENGTH)?.to_str()?.trim().parse().ok()?;
    Some(Encoder::Length(len))
}

impl Encoder {
    /// Returns `true` if no more body bytes are expected.
    pub(crate) fn is_eof(&self) -> bool {
        matches!(self, Encoder::Empty | Encoder::Length(0))
    }

    /// Write a chunk of body with its framing.
    pub(crate) fn encode(&mut self, chunk: Bytes, dst: &mut BytesMut) -> Result<(), BodyError> {
        if chunk.is_empty() {
            return Ok(());
        }
        match self {
            Encoder::Length(remaining) => {
                let len = chunk.len() as u64;
                if len > *remaining {
                    return Err(BodyError::LengthMismatch);
                }
                *remaining -= len;
                dst.put_slice(&chunk);
            }
            Encoder::Chunked => {
                // writing to `BytesMut` is infallible
                let _ = write!(dst, "{:X}\r\n", chunk.len());
                dst.put_slice(&chunk);
                dst.put_slice(b"\r\n");
            }
            Encoder::Empty => {}
        }
        Ok(())
    }

    /// Write the end of body.
    pub(crate) fn encode_eof(&mut self, dst: &mut BytesMut) -> Result<(), BodyError> {
        match self {
            Encoder::Length(0) | Encoder::Empty => Ok(()),
            Encoder::Length(_) => Err(BodyError::LengthMismatch),
            Encoder::Chunked => {
                dst.put_slice(b"0\r\n\r\n");
                *self = Encoder::Empty;
                Ok(())
            }
        }
    }
}
