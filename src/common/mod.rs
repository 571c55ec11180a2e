/// Result of a chunked parse over a partially received buffer.
#[derive(Debug)]
pub enum ParseResult<T, E> {
    /// Bytes is not sufficient for parsing, more IO read is required.
    Pending,
    /// Parse success.
    Ok(T),
    /// Parse failed.
    Err(E),
}

/// Unwraps `ParseResult::Ok`, returning early on `Pending` or `Err`.
macro_rules! parse_ready {
    ($e:expr) => {
        match $e {
            $crate::common::ParseResult::Ok(ok) => ok,
            $crate::common::ParseResult::Err(err) => return $crate::common::ParseResult::Err(err.into()),
            $crate::common::ParseResult::Pending => return $crate::common::ParseResult::Pending,
        }
    };
}

pub(crate) use parse_ready;

/// Opaque pointer supplied by the caller and handed back verbatim.
///
/// The engine never dereferences it, so moving it across threads is the caller's concern.
#[derive(Clone, Copy)]
pub(crate) struct UserData(pub(crate) *mut std::ffi::c_void);

// SAFETY: the pointer is never dereferenced by this crate
unsafe impl Send for UserData { }

// SAFETY: the pointer is never dereferenced by this crate
unsafe impl Sync for UserData { }

impl UserData {
    pub(crate) const fn null() -> Self {
        Self(std::ptr::null_mut())
    }
}

impl std::fmt::Debug for UserData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("UserData").field(&self.0).finish()
    }
}
