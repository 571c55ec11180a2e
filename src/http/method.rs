use bytes::Bytes;

use crate::matches;

/// HTTP Method.
///
/// Standard methods from [RFC9110] and the PATCH method from [RFC5789] are interned, any other
/// valid `token` is kept as an extension method.
///
/// [RFC5789]: https://www.rfc-editor.org/rfc/rfc5789
/// [RFC9110]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-methods>
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Method(Repr);

#[derive(Clone, PartialEq, Eq, Hash)]
enum Repr {
    Standard(u8),
    Extension(Bytes),
}

// ===== Macros =====

macro_rules! props {
    (
        static $props:ident: [$len:literal];
        $(
           $(#[$doc:meta])*
           pub const $name:ident = ($idx:literal, $val:literal, $($safe:ident)?, $($idem:ident)?);
        )*
    ) => {
        impl Method {
            $(
               $(#[$doc])*
               pub const $name: Self = Self(Repr::Standard($idx));
            )*

            const fn from_standard(src: &[u8]) -> Option<Method> {
                match src {
                    $(
                        $val => Some(Self::$name),
                    )*
                    _ => None,
                }
            }
        }

        static $props: [Props; $len] = [
            $(
                Props { value: $val, safe: prop!($($safe)?), idem: prop!($($idem)?) },
            )*
        ];
    };
}

macro_rules! prop {
    (safe) => { true };
    (idem) => { true };
    () => { false };
}

struct Props {
    safe: bool,
    idem: bool,
    value: &'static [u8],
}

props! {
    static PROPS: [9];

    /// The [GET] method requests transfer of a current selected representation for the target
    /// resource.
    ///
    /// [GET]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-get>
    pub const GET = (0, b"GET", safe, idem);
    /// The [HEAD] method is identical to GET except that the server MUST NOT send content in the
    /// response.
    ///
    /// [HEAD]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-head>
    pub const HEAD = (1, b"HEAD", safe, idem);
    /// The [POST] method.
    ///
    /// [POST]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-post>
    pub const POST = (2, b"POST", , );
    /// The [PUT] method.
    ///
    /// [PUT]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-put>
    pub const PUT = (3, b"PUT", , idem);
    /// The [DELETE] method.
    ///
    /// [DELETE]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-delete>
    pub const DELETE = (4, b"DELETE", , idem);
    /// The [CONNECT] method.
    ///
    /// [CONNECT]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-connect>
    pub const CONNECT = (5, b"CONNECT", , );
    /// The [OPTIONS] method.
    ///
    /// [OPTIONS]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-options>
    pub const OPTIONS = (6, b"OPTIONS", safe, idem);
    /// The [TRACE] method.
    ///
    /// [TRACE]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-trace>
    pub const TRACE = (7, b"TRACE", safe, idem);
    /// The [PATCH] method.
    ///
    /// [PATCH]: <https://www.rfc-editor.org/rfc/rfc5789#section-2>
    pub const PATCH = (8, b"PATCH", , );
}

impl Method {
    /// Parse method from bytes.
    ///
    /// # Errors
    ///
    /// Returns error if the input is empty or not a valid `token`.
    pub fn from_bytes(src: &[u8]) -> Result<Method, InvalidMethod> {
        if let Some(standard) = Self::from_standard(src) {
            return Ok(standard);
        }
        if src.is_empty() || !src.iter().all(|&b| matches::is_token(b)) {
            return Err(InvalidMethod);
        }
        Ok(Self(Repr::Extension(Bytes::copy_from_slice(src))))
    }

    /// Returns `true` if method is considered ["safe"].
    ///
    /// Extension methods are never considered safe.
    ///
    /// ["safe"]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-safe-methods>
    #[inline]
    pub fn is_safe(&self) -> bool {
        match &self.0 {
            Repr::Standard(idx) => PROPS[*idx as usize].safe,
            Repr::Extension(_) => false,
        }
    }

    /// Returns `true` if method is considered ["idempotent"].
    ///
    /// ["idempotent"]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-idempotent-methods>
    #[inline]
    pub fn is_idempotent(&self) -> bool {
        match &self.0 {
            Repr::Standard(idx) => PROPS[*idx as usize].idem,
            Repr::Extension(_) => false,
        }
    }

    /// Returns the method as bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.0 {
            Repr::Standard(idx) => PROPS[*idx as usize].value,
            Repr::Extension(bytes) => bytes,
        }
    }

    /// Returns string representation of the method.
    #[inline]
    pub fn as_str(&self) -> &str {
        // SAFETY: both standard values and extension token are ASCII
        unsafe { std::str::from_utf8_unchecked(self.as_bytes()) }
    }
}

impl Default for Method {
    #[inline]
    fn default() -> Self {
        Self::GET
    }
}

impl std::str::FromStr for Method {
    type Err = InvalidMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}

impl std::fmt::Debug for Method {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self.as_str(), f)
    }
}

impl std::fmt::Display for Method {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===== Error =====

/// An error when parsing method that is not a valid `token`.
pub struct InvalidMethod;

impl std::error::Error for InvalidMethod { }

impl std::fmt::Debug for InvalidMethod {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("invalid method")
    }
}

impl std::fmt::Display for InvalidMethod {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("invalid method")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn method_from_bytes() {
        assert_eq!(Method::from_bytes(b"GET").unwrap(), Method::GET);
        assert_eq!(Method::from_bytes(b"PATCH").unwrap(), Method::PATCH);
        assert!(Method::GET.is_safe());
        assert!(Method::PUT.is_idempotent());
        assert!(!Method::POST.is_idempotent());

        let purge = Method::from_bytes(b"PURGE").unwrap();
        assert_eq!(purge.as_str(), "PURGE");
        assert!(!purge.is_safe());

        assert!(Method::from_bytes(b"").is_err());
        assert!(Method::from_bytes(b"GE T").is_err());
        assert!(Method::from_bytes(b"G\r\n").is_err());
    }
}
