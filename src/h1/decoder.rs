use std::num::NonZeroU64;

use bytes::{Bytes, BytesMut};

use super::error::BodyError;
use crate::common::ParseResult;
use crate::headers::HeaderMap;
use crate::headers::standard::{CONTENT_LENGTH, TRANSFER_ENCODING};

/// Longest chunk size or trailer line accepted.
const MAX_CHUNK_LINE: usize = 4 * 1024;

/// Response body framing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Decoder {
    /// Remaining length of a `Content-Length` body.
    Length(u64),
    Chunked(ChunkedDecoder),
    /// Body is delimited by the peer closing the connection.
    Eof,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ChunkedDecoder {
    phase: Phase,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Phase {
    Size,
    Data(NonZeroU64),
    DataEnd,
    Trailer,
    Done,
}

impl Decoder {
    /// Select the framing from response headers.
    ///
    /// `Transfer-Encoding` takes precedence over `Content-Length`, a transfer coding that does
    /// not end with `chunked` is read until the connection closes.
    pub(crate) fn new(headers: &HeaderMap) -> Result<Decoder, BodyError> {
        let transfer_encodings = headers.get_all(TRANSFER_ENCODING);
        if transfer_encodings.has_remaining() {
            let is_chunked = transfer_encodings
                .last()
                .and_then(|e| e.as_bytes().rsplit(|&b| b == b',').next())
                .is_some_and(|e| e.trim_ascii().eq_ignore_ascii_case(b"chunked"));
            return Ok(match is_chunked {
                true => Decoder::Chunked(ChunkedDecoder::new()),
                false => Decoder::Eof,
            });
        }

        let mut length = None;
        for value in headers.get_all(CONTENT_LENGTH) {
            for value in value.as_bytes().split(|&b| b == b',') {
                let value = parse_decimal(value.trim_ascii())?;
                if length.is_some_and(|len| len != value) {
                    return Err(BodyError::InvalidContentLength);
                }
                length = Some(value);
            }
        }

        Ok(match length {
            Some(len) => Decoder::Length(len),
            None => Decoder::Eof,
        })
    }

    /// Returns the exact body length if known.
    pub(crate) fn content_length(&self) -> Option<u64> {
        match self {
            Decoder::Length(len) => Some(*len),
            _ => None,
        }
    }

    /// Returns `true` if the body ends when the connection closes.
    #[inline]
    pub(crate) fn is_eof_delimited(&self) -> bool {
        matches!(self, Decoder::Eof)
    }

    /// Decode the next chunk of body from buffered bytes.
    ///
    /// Returns `Ok(None)` at the end of body, `Pending` if more bytes must be read.
    pub(crate) fn decode(&mut self, buffer: &mut BytesMut) -> ParseResult<Option<Bytes>, BodyError> {
        match self {
            Decoder::Length(0) => ParseResult::Ok(None),
            Decoder::Length(remaining) => {
                if buffer.is_empty() {
                    return ParseResult::Pending;
                }
                let len = (*remaining).min(buffer.len() as u64);
                *remaining -= len;
                // `len <= buffer.len()`, no truncation
                ParseResult::Ok(Some(buffer.split_to(len as usize).freeze()))
            }
            Decoder::Chunked(decoder) => decoder.decode(buffer),
            Decoder::Eof => match buffer.is_empty() {
                true => ParseResult::Pending,
                false => ParseResult::Ok(Some(buffer.split().freeze())),
            },
        }
    }
}

impl ChunkedDecoder {
    pub(crate) const fn new() -> Self {
        Self { phase: Phase::Size }
    }

    fn decode(&mut self, buffer: &mut BytesMut) -> ParseResult<Option<Bytes>, BodyError> {
        loop {
            match &mut self.phase {
                Phase::Size => {
                    let line = match take_line(buffer) {
                        ParseResult::Ok(line) => line,
                        ParseResult::Err(err) => return ParseResult::Err(err),
                        ParseResult::Pending => return ParseResult::Pending,
                    };
                    let size = match parse_chunk_size(&line) {
                        Ok(size) => size,
                        Err(err) => return ParseResult::Err(err),
                    };
                    self.phase = match NonZeroU64::new(size) {
                        Some(size) => Phase::Data(size),
                        None => Phase::Trailer,
                    };
                }
                Phase::Data(remaining) => {
                    if buffer.is_empty() {
                        return ParseResult::Pending;
                    }
                    let len = remaining.get().min(buffer.len() as u64);
                    match NonZeroU64::new(remaining.get() - len) {
                        Some(leftover) => *remaining = leftover,
                        None => self.phase = Phase::DataEnd,
                    }
                    return ParseResult::Ok(Some(buffer.split_to(len as usize).freeze()));
                }
                Phase::DataEnd => match take_line(buffer) {
                    ParseResult::Ok(line) if line.is_empty() => self.phase = Phase::Size,
                    ParseResult::Ok(_) => return ParseResult::Err(BodyError::InvalidChunked),
                    ParseResult::Err(err) => return ParseResult::Err(err),
                    ParseResult::Pending => return ParseResult::Pending,
                },
                Phase::Trailer => match take_line(buffer) {
                    ParseResult::Ok(line) if line.is_empty() => {
                        self.phase = Phase::Done;
                        return ParseResult::Ok(None);
                    }
                    // trailer fields are discarded
                    ParseResult::Ok(_) => {}
                    ParseResult::Err(err) => return ParseResult::Err(err),
                    ParseResult::Pending => return ParseResult::Pending,
                },
                Phase::Done => return ParseResult::Ok(None),
            }
        }
    }
}

/// Take a line terminated by `\n` or `\r\n` without the separator.
fn take_line(buffer: &mut BytesMut) -> ParseResult<BytesMut, BodyError> {
    let Some(lf) = buffer.iter().position(|&b| b == b'\n') else {
        return match buffer.len() > MAX_CHUNK_LINE {
            true => ParseResult::Err(BodyError::InvalidChunked),
            false => ParseResult::Pending,
        };
    };
    let mut line = buffer.split_to(lf + 1);
    line.truncate(lf);
    if line.last() == Some(&b'\r') {
        line.truncate(lf - 1);
    }
    ParseResult::Ok(line)
}

/// `chunk-size [ chunk-ext ]`
fn parse_chunk_size(line: &[u8]) -> Result<u64, BodyError> {
    let digits_len = line.iter().position(|e| !e.is_ascii_hexdigit()).unwrap_or(line.len());
    let (digits, ext) = line.split_at(digits_len);

    if digits.is_empty() {
        return Err(BodyError::InvalidChunked);
    }
    if !matches!(ext.first(), None | Some(b';' | b' ' | b'\t')) {
        return Err(BodyError::InvalidChunked);
    }

    let mut size = 0u64;
    for &digit in digits {
        let value = match digit {
            b'0'..=b'9' => digit - b'0',
            b'a'..=b'f' => digit - b'a' + 10,
            b'A'..=b'F' => digit - b'A' + 10,
            _ => return Err(BodyError::InvalidChunked),
        };
        size = size
            .checked_mul(16)
            .and_then(|size| size.checked_add(u64::from(value)))
            .ok_or(BodyError::ChunkTooLarge)?;
    }
    Ok(size)
}

fn parse_decimal(value: &[u8]) -> Result<u64, BodyError> {
    if value.is_empty() {
        return Err(BodyError::InvalidContentLength);
    }
    value.iter().try_fold(0u64, |acc, &b| {
        if !b.is_ascii_digit() {
            return Err(BodyError::InvalidContentLength);
        }
        acc.checked_mul(10)
            .and_then(|acc| acc.checked_add(u64::from(b - b'0')))
            .ok_or(BodyError::InvalidContentLength)
    })
}
