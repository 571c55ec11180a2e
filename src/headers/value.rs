use bytes::Bytes;

use super::HeaderError;
use crate::matches;

const MAX_HEADER_VALUE_LEN: usize = 1 << 16;

/// Header field value, as sent by the application or received from the server.
///
/// Leading and trailing whitespace is rejected. Bytes above `0x7F` (`obs-text`) are accepted, so
/// the value is not guaranteed to be UTF-8.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct HeaderValue {
    bytes: Bytes,
}

impl HeaderValue {
    /// Parse header value from [`Bytes`].
    ///
    /// # Errors
    ///
    /// Returns error if the input is not a valid header value.
    #[inline]
    pub fn from_bytes<B: Into<Bytes>>(value: B) -> Result<Self, HeaderError> {
        let bytes = value.into();
        validate_header_value(&bytes)?;
        Ok(Self { bytes })
    }

    /// Parse header value by copying from slice of bytes.
    ///
    /// # Errors
    ///
    /// Returns error if the input is not a valid header value.
    #[inline]
    pub fn from_slice<A: AsRef<[u8]>>(value: A) -> Result<Self, HeaderError> {
        validate_header_value(value.as_ref())?;
        Ok(Self {
            bytes: Bytes::copy_from_slice(value.as_ref()),
        })
    }

    /// Returns header value as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns header value as `str` if it only contains visible ASCII.
    #[inline]
    pub fn to_str(&self) -> Option<&str> {
        match self.bytes.is_ascii() {
            // SAFETY: checked ASCII
            true => Some(unsafe { std::str::from_utf8_unchecked(&self.bytes) }),
            false => None,
        }
    }
}

// ===== Parsing =====

const fn validate_header_value(mut bytes: &[u8]) -> Result<(), HeaderError> {
    use HeaderError as E;
    match bytes {
        // no leading SP / HTAB
        | [b' ' | b'\t', ..]
        // no trailing SP / HTAB
        | [.., b' ' | b'\t'] => {
            return Err(E::Invalid);
        },
        _ => {}
    }
    if bytes.len() > MAX_HEADER_VALUE_LEN {
        return Err(E::TooLong);
    }
    let mut error = false;
    while let [byte, rest @ ..] = bytes {
        error |= !matches::is_header_value(*byte);
        bytes = rest;
    }
    if !error { Ok(()) } else { Err(E::Invalid) }
}

// ===== Traits =====

impl std::fmt::Debug for HeaderValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_str() {
            Some(s) => std::fmt::Debug::fmt(s, f),
            None => std::fmt::Debug::fmt(&self.bytes, f),
        }
    }
}
