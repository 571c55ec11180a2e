use bytes::Bytes;

use super::HeaderError;
use crate::matches;

const MAX_HEADER_NAME_LEN: usize = 1 << 12;

/// HTTP Header name.
///
/// # Case Normalization
///
/// Input is normalized to lowercase at construction time. [`from_static`][HeaderName::from_static]
/// panics when name contains uppercase character.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct HeaderName {
    /// valid lowercase `token`
    bytes: Bytes,
}

impl HeaderName {
    /// Parse header name from static bytes.
    ///
    /// # Panics
    ///
    /// Panics if the input is not a valid header name or contains ASCII uppercase characters.
    #[inline]
    pub const fn from_static(bytes: &'static [u8]) -> Self {
        match validate_header_name(bytes) {
            Ok(true) => Self {
                bytes: Bytes::from_static(bytes),
            },
            Ok(false) => panic!("header name contains uppercase"),
            Err(err) => err.panic_const(),
        }
    }

    /// Parse header name by copying from slice of bytes.
    ///
    /// Input name is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns error if the input is not a valid header name.
    pub fn from_slice<A: AsRef<[u8]>>(name: A) -> Result<Self, HeaderError> {
        let name = name.as_ref();
        let bytes = match validate_header_name(name)? {
            true => Bytes::copy_from_slice(name),
            false => Bytes::from(name.to_ascii_lowercase()),
        };
        Ok(Self { bytes })
    }

    /// Extracts a string slice of the header name.
    ///
    /// The returned string will always in ASCII lowercase.
    #[inline]
    pub fn as_str(&self) -> &str {
        // SAFETY: `token` is valid ASCII
        unsafe { std::str::from_utf8_unchecked(&self.bytes) }
    }

    /// Checks that two header name are an ASCII case-insensitive match.
    #[inline]
    pub fn eq_ignore_ascii_case(&self, name: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(name)
    }
}

/// Returns `Ok(true)` if the name is already lowercase.
const fn validate_header_name(mut bytes: &[u8]) -> Result<bool, HeaderError> {
    if bytes.is_empty() {
        return Err(HeaderError::Empty);
    }
    if bytes.len() > MAX_HEADER_NAME_LEN {
        return Err(HeaderError::TooLong);
    }
    let mut lowercase = true;
    while let [byte, rest @ ..] = bytes {
        if !matches::is_token(*byte) {
            return Err(HeaderError::Invalid);
        }
        lowercase &= !byte.is_ascii_uppercase();
        bytes = rest;
    }
    Ok(lowercase)
}

// ===== Lookup =====

/// A type that can be used to lookup a header in [`HeaderMap`].
///
/// [`HeaderMap`]: super::HeaderMap
pub trait AsHeaderName {
    /// Returns the name to compare case-insensitively.
    fn as_header_str(&self) -> &str;
}

impl AsHeaderName for HeaderName {
    #[inline]
    fn as_header_str(&self) -> &str {
        self.as_str()
    }
}

impl AsHeaderName for &HeaderName {
    #[inline]
    fn as_header_str(&self) -> &str {
        self.as_str()
    }
}

impl AsHeaderName for &str {
    #[inline]
    fn as_header_str(&self) -> &str {
        self
    }
}

// ===== Traits =====

impl std::fmt::Debug for HeaderName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self.as_str(), f)
    }
}

impl std::fmt::Display for HeaderName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header names used by the HTTP/1 framing.
pub mod standard {
    use super::HeaderName;

    pub const CONNECTION: HeaderName = HeaderName::from_static(b"connection");
    pub const CONTENT_LENGTH: HeaderName = HeaderName::from_static(b"content-length");
    pub const HOST: HeaderName = HeaderName::from_static(b"host");
    pub const TRANSFER_ENCODING: HeaderName = HeaderName::from_static(b"transfer-encoding");
}
