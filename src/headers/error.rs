/// Rejected header name or value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderError {
    /// Name is empty.
    Empty,
    /// Name or value exceeds the length limit.
    TooLong,
    /// Name is not a `token`, or value contains a control character or surrounding whitespace.
    Invalid,
}

impl HeaderError {
    const fn message(&self) -> &'static str {
        match self {
            Self::Empty => "empty header name",
            Self::TooLong => "header field too long",
            Self::Invalid => "invalid byte in header field",
        }
    }

    /// Fails constant evaluation of a static header.
    pub(crate) const fn panic_const(self) -> ! {
        panic!("{}", self.message())
    }
}

impl std::error::Error for HeaderError { }

impl std::fmt::Display for HeaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}
