use std::num::NonZeroU16;

/// HTTP [Status Code][rfc].
///
/// The value is always within `100..=599`.
///
/// [rfc]: <https://datatracker.ietf.org/doc/html/rfc9110#name-status-codes>
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusCode(NonZeroU16);

impl Default for StatusCode {
    #[inline]
    fn default() -> Self {
        Self::OK
    }
}

impl StatusCode {
    /// Create [`StatusCode`] from integer.
    ///
    /// # Errors
    ///
    /// Returns error if the value is outside of `100..=599`.
    #[inline]
    pub const fn from_u16(code: u16) -> Result<StatusCode, InvalidStatusCode> {
        match code {
            // SAFETY: 100..=599 is never zero
            100..=599 => Ok(Self(unsafe { NonZeroU16::new_unchecked(code) })),
            _ => Err(InvalidStatusCode),
        }
    }

    /// Parse the three digit status code, e.g: `b"200"`.
    pub const fn from_bytes(bytes: &[u8]) -> Result<StatusCode, InvalidStatusCode> {
        let [a @ b'1'..=b'5', b @ b'0'..=b'9', c @ b'0'..=b'9'] = *bytes else {
            return Err(InvalidStatusCode);
        };
        let code = (a - b'0') as u16 * 100 + (b - b'0') as u16 * 10 + (c - b'0') as u16;
        Self::from_u16(code)
    }

    /// Returns status code value, e.g: `200`.
    #[inline]
    pub const fn as_u16(&self) -> u16 {
        self.0.get()
    }

    /// Returns `true` for `1xx` status codes.
    #[inline]
    pub const fn is_informational(&self) -> bool {
        matches!(self.0.get(), 100..=199)
    }
}

macro_rules! status_codes {
    (
        $(
            $(#[$doc:meta])*
            $int:literal $id:ident $msg:literal;
        )*
    ) => {
        impl StatusCode {
            /// Returns the registered reason phrase, e.g: `"OK"`.
            ///
            /// Returns `None` for unregistered codes.
            #[inline]
            pub const fn canonical_reason(&self) -> Option<&'static str> {
                match self.0.get() {
                    $(
                        $int => Some($msg),
                    )*
                    _ => None,
                }
            }

            $(
                $(#[$doc])*
                pub const $id: Self = Self(NonZeroU16::new($int).unwrap());
            )*
        }
    };
}

status_codes! {
    /// `100`, the client should continue with its request.
    100 CONTINUE "Continue";
    /// `101`, the server is switching protocols per the `Upgrade` header.
    101 SWITCHING_PROTOCOLS "Switching Protocols";
    /// `200`, the request succeeded.
    200 OK "OK";
    /// `201`, a new resource was created.
    201 CREATED "Created";
    /// `204`, there is no content to send for this request.
    204 NO_CONTENT "No Content";
    /// `301`, the resource has been moved permanently.
    301 MOVED_PERMANENTLY "Moved Permanently";
    /// `302`, the resource has been found at another URI.
    302 FOUND "Found";
    /// `304`, the cached version is still valid.
    304 NOT_MODIFIED "Not Modified";
    /// `400`, the server cannot process the request due to client error.
    400 BAD_REQUEST "Bad Request";
    /// `401`, authentication is required.
    401 UNAUTHORIZED "Unauthorized";
    /// `403`, the client does not have access rights.
    403 FORBIDDEN "Forbidden";
    /// `404`, the server cannot find the requested resource.
    404 NOT_FOUND "Not Found";
    /// `500`, the server encountered an unexpected condition.
    500 INTERNAL_SERVER_ERROR "Internal Server Error";
    /// `502`, the upstream server returned an invalid response.
    502 BAD_GATEWAY "Bad Gateway";
    /// `503`, the server is not ready to handle the request.
    503 SERVICE_UNAVAILABLE "Service Unavailable";
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

impl std::fmt::Debug for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

// ===== Error =====

/// An error when status code is outside of `100..=599`.
#[derive(Debug)]
pub struct InvalidStatusCode;

impl std::error::Error for InvalidStatusCode { }

impl std::fmt::Display for InvalidStatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("invalid status code")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_code_range() {
        assert_eq!(StatusCode::from_bytes(b"200").unwrap(), StatusCode::OK);
        assert_eq!(StatusCode::from_bytes(b"599").unwrap().as_u16(), 599);
        assert_eq!(StatusCode::from_u16(100).unwrap(), StatusCode::CONTINUE);
        assert!(StatusCode::from_bytes(b"099").is_err());
        assert!(StatusCode::from_bytes(b"600").is_err());
        assert!(StatusCode::from_bytes(b"20").is_err());
        assert!(StatusCode::from_bytes(b"2x0").is_err());
        assert!(StatusCode::from_u16(99).is_err());
        assert_eq!(StatusCode::NOT_FOUND.canonical_reason(), Some("Not Found"));
        assert_eq!(StatusCode::from_u16(299).unwrap().canonical_reason(), None);
    }
}
