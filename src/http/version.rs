/// Protocol version of an HTTP/1 message.
///
/// Stored as the minor digit of `HTTP/1.x`, only `0` and `1` are valid.
///
/// [httpwg](https://httpwg.org/specs/rfc9112.html#http.version)
#[derive(Copy, Clone, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct Version(u8);

impl Version {
    /// `HTTP/1.0`
    pub const HTTP_10: Version = Version(0);

    /// `HTTP/1.1`
    pub const HTTP_11: Version = Version(1);

    /// Version from its minor digit.
    pub const fn from_minor(minor: u8) -> Option<Version> {
        match minor {
            0 | 1 => Some(Version(minor)),
            _ => None,
        }
    }

    /// Minor digit of `HTTP/1.x`.
    #[inline]
    pub const fn minor(&self) -> u8 {
        self.0
    }

    /// Parse the 8 bytes `HTTP-version` token of a status line.
    pub const fn from_bytes(bytes: &[u8]) -> Option<Version> {
        match bytes {
            [b'H', b'T', b'T', b'P', b'/', b'1', b'.', digit] => match digit.checked_sub(b'0') {
                Some(minor) => Version::from_minor(minor),
                None => None,
            },
            _ => None,
        }
    }

    /// Returns the token as written on the wire, e.g: `HTTP/1.1`.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self.0 {
            0 => "HTTP/1.0",
            _ => "HTTP/1.1",
        }
    }

    /// HTTP/1.1 connections persist unless `Connection: close` is sent, HTTP/1.0 ones do not.
    #[inline]
    pub const fn is_keep_alive_default(&self) -> bool {
        self.0 >= 1
    }
}

impl Default for Version {
    #[inline]
    fn default() -> Version {
        Version::HTTP_11
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Debug for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Version({})", self.as_str())
    }
}
