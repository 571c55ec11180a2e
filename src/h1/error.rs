use std::fmt;

/// Response head parsing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Line have invalid separator.
    InvalidSeparator,
    /// Unsupported version.
    UnsupportedVersion,
    /// Invalid status code.
    InvalidStatus,
    /// Invalid character in reason phrase.
    InvalidReason,
    /// Invalid header field.
    InvalidHeader,
    /// Header fields exceed the configured count.
    TooManyHeaders,
}

impl ParseError {
    const fn message(&self) -> &'static str {
        match self {
            Self::InvalidSeparator => "invalid separator",
            Self::UnsupportedVersion => "unsupported version",
            Self::InvalidStatus => "invalid status code",
            Self::InvalidReason => "invalid reason phrase",
            Self::InvalidHeader => "invalid header",
            Self::TooManyHeaders => "too many headers",
        }
    }
}

impl std::error::Error for ParseError { }

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A framing error when reading or writing message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyError {
    /// Chunked format is invalid.
    InvalidChunked,
    /// Chunk size does not fit in 64 bits.
    ChunkTooLarge,
    /// Content-Length is invalid or conflicting.
    InvalidContentLength,
    /// Request body does not match its declared Content-Length.
    LengthMismatch,
}

impl BodyError {
    const fn message(&self) -> &'static str {
        match self {
            Self::InvalidChunked => "invalid chunked format",
            Self::ChunkTooLarge => "chunk too large",
            Self::InvalidContentLength => "invalid content-length",
            Self::LengthMismatch => "body length does not match content-length",
        }
    }
}

impl std::error::Error for BodyError { }

impl fmt::Display for BodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
