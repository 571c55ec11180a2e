use bytes::Bytes;

use crate::matches;

/// HTTP Request Target.
///
/// Either `origin-form` (`/path?query`) or `absolute-form` (`http://host/path`). When given the
/// absolute form, the authority is split off so it can populate the `Host` header while the
/// request line carries only the path and query.
#[derive(Clone, PartialEq, Eq)]
pub struct Uri {
    authority: Option<Bytes>,
    path_and_query: Bytes,
}

impl Uri {
    /// `/`
    pub const fn root() -> Uri {
        Uri {
            authority: None,
            path_and_query: Bytes::from_static(b"/"),
        }
    }

    /// Parse request target from bytes.
    pub fn from_bytes<B: Into<Bytes>>(bytes: B) -> Result<Uri, InvalidUri> {
        let mut bytes: Bytes = bytes.into();

        if bytes.is_empty() {
            return Err(InvalidUri::Empty);
        }
        if !bytes.iter().all(|&b| matches::is_target(b)) {
            return Err(InvalidUri::Char);
        }

        if bytes == "*" || bytes.first() == Some(&b'/') {
            return Ok(Uri {
                authority: None,
                path_and_query: bytes,
            });
        }

        let Some(scheme_len) = bytes.windows(3).position(|w| w == b"://") else {
            return Err(InvalidUri::Form);
        };
        let scheme = &bytes[..scheme_len];
        if scheme.is_empty()
            || !scheme[0].is_ascii_alphabetic()
            || !scheme.iter().all(|&b| matches::is_scheme(b))
        {
            return Err(InvalidUri::Scheme);
        }

        let _ = bytes.split_to(scheme_len + 3);
        let authority_len = bytes
            .iter()
            .position(|&b| matches!(b, b'/' | b'?' | b'#'))
            .unwrap_or(bytes.len());
        let authority = bytes.split_to(authority_len);
        if authority.is_empty() {
            return Err(InvalidUri::Authority);
        }

        // fragments are never sent
        if let Some(fragment) = bytes.iter().position(|&b| b == b'#') {
            bytes.truncate(fragment);
        }

        let path_and_query = match bytes.first() {
            Some(b'/') => bytes,
            Some(_) => {
                let mut path = Vec::with_capacity(bytes.len() + 1);
                path.push(b'/');
                path.extend_from_slice(&bytes);
                Bytes::from(path)
            }
            None => Bytes::from_static(b"/"),
        };

        Ok(Uri {
            authority: Some(authority),
            path_and_query,
        })
    }

    /// Returns the authority if the target was in absolute form.
    #[inline]
    pub fn authority(&self) -> Option<&[u8]> {
        self.authority.as_deref()
    }

    /// Returns the target written in the request line.
    #[inline]
    pub fn path_and_query(&self) -> &[u8] {
        &self.path_and_query
    }
}

impl Default for Uri {
    #[inline]
    fn default() -> Self {
        Self::root()
    }
}

impl std::fmt::Debug for Uri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut d = f.debug_struct("Uri");
        if let Some(authority) = &self.authority {
            d.field("authority", &String::from_utf8_lossy(authority));
        }
        d.field("path_and_query", &String::from_utf8_lossy(&self.path_and_query));
        d.finish()
    }
}

// ===== Error =====

/// An error when parsing [`Uri`].
#[derive(Debug)]
pub enum InvalidUri {
    /// Target is empty.
    Empty,
    /// Target contains invalid character.
    Char,
    /// Target is neither origin nor absolute form.
    Form,
    /// Invalid scheme.
    Scheme,
    /// Authority is missing.
    Authority,
}

impl std::error::Error for InvalidUri { }

impl std::fmt::Display for InvalidUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Empty => "empty request target",
            Self::Char => "invalid character in request target",
            Self::Form => "unsupported request target form",
            Self::Scheme => "invalid scheme",
            Self::Authority => "missing authority",
        })
    }
}
