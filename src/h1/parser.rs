//! HTTP/1.1 Response Parser.
//!
//! Every function works on chunked bytes: given any length of bytes, the parser looks for the
//! next line separator and only advances the buffer when a complete line is found. If the
//! separator is not found, it returns [`ParseResult::Pending`] and the bytes are left untouched.
use bytes::{Buf, Bytes, BytesMut};

use super::error::ParseError;
use crate::common::{ParseResult, parse_ready};
use crate::http::{StatusCode, Version};
use crate::matches;

const VERSION_SIZE: usize = b"HTTP/1.1".len();
const STATUS_SIZE: usize = b"200".len();

#[derive(Debug)]
pub(crate) struct StatusLine {
    pub(crate) version: Version,
    pub(crate) status: StatusCode,
    pub(crate) reason: Bytes,
}

#[derive(Debug)]
pub(crate) struct Header {
    pub(crate) name: Bytes,
    pub(crate) value: Bytes,
}

/// Split a line terminated by `\n` or `\r\n`, the separator is discarded.
pub(crate) fn split_line(bytes: &mut BytesMut) -> ParseResult<BytesMut, ParseError> {
    let Some(lf) = bytes.iter().position(|&b| b == b'\n') else {
        return ParseResult::Pending;
    };

    let mut line = bytes.split_to(lf + 1);
    line.truncate(lf);
    if line.last() == Some(&b'\r') {
        line.truncate(lf - 1);
    }

    if line.contains(&b'\r') {
        return ParseResult::Err(ParseError::InvalidSeparator);
    }

    ParseResult::Ok(line)
}

// ===== Status Line =====

/// Parse response status line.
///
/// Leading empty lines are skipped.
pub(crate) fn parse_status_chunk(bytes: &mut BytesMut) -> ParseResult<StatusLine, ParseError> {
    use ParseResult as Result;

    loop {
        match bytes.first() {
            Some(b'\n') => bytes.advance(1),
            Some(b'\r') => match bytes.get(1) {
                Some(b'\n') => bytes.advance(2),
                Some(_) => return Result::Err(ParseError::InvalidSeparator),
                None => return Result::Pending,
            },
            _ => break,
        }
    }

    let line = parse_ready!(split_line(bytes)).freeze();

    let Some((version, rest)) = line.split_first_chunk::<VERSION_SIZE>() else {
        return Result::Err(ParseError::UnsupportedVersion);
    };
    let Some(version) = Version::from_bytes(version) else {
        return Result::Err(ParseError::UnsupportedVersion);
    };

    let Some((b' ', rest)) = rest.split_first() else {
        return Result::Err(ParseError::InvalidSeparator);
    };

    let Some((status, rest)) = rest.split_first_chunk::<STATUS_SIZE>() else {
        return Result::Err(ParseError::InvalidStatus);
    };
    let Ok(status) = StatusCode::from_bytes(status) else {
        return Result::Err(ParseError::InvalidStatus);
    };

    let reason = match rest.split_first() {
        None => Bytes::new(),
        Some((b' ', reason)) => {
            if !reason.iter().all(|&b| matches::is_reason(b)) {
                return Result::Err(ParseError::InvalidReason);
            }
            line.slice_ref(reason)
        }
        Some(_) => return Result::Err(ParseError::InvalidStatus),
    };

    Result::Ok(StatusLine {
        version,
        status,
        reason,
    })
}

// ===== Header =====

/// Parse header field.
///
/// Returns `ParseResult::Ok(None)` when encounter an empty line with separator.
pub(crate) fn parse_header_chunk(bytes: &mut BytesMut) -> ParseResult<Option<Header>, ParseError> {
    use ParseResult as Result;

    match bytes.first() {
        None => return Result::Pending,
        Some(b'\n') => {
            bytes.advance(1);
            return Result::Ok(None);
        }
        Some(b'\r') => {
            return match bytes.get(1) {
                Some(b'\n') => {
                    bytes.advance(2);
                    Result::Ok(None)
                }
                Some(_) => Result::Err(ParseError::InvalidSeparator),
                None => Result::Pending,
            };
        }
        Some(_) => {}
    }

    let line = parse_ready!(split_line(bytes)).freeze();

    let Some(colon) = line.iter().position(|&b| b == b':') else {
        return Result::Err(ParseError::InvalidHeader);
    };

    let name = &line[..colon];
    if name.is_empty() || !name.iter().all(|&b| matches::is_token(b)) {
        return Result::Err(ParseError::InvalidHeader);
    }

    let value = trim_ows(&line[colon + 1..]);
    if !value.iter().all(|&b| matches::is_header_value(b)) {
        return Result::Err(ParseError::InvalidHeader);
    }

    Result::Ok(Some(Header {
        name: line.slice_ref(name),
        value: line.slice_ref(value),
    }))
}

fn trim_ows(mut value: &[u8]) -> &[u8] {
    while let [b' ' | b'\t', rest @ ..] = value {
        value = rest;
    }
    while let [rest @ .., b' ' | b'\t'] = value {
        value = rest;
    }
    value
}
