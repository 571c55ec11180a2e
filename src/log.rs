#![allow(unused, reason = "logger")]
//! Logging facade.
//!
//! Forwards to the `log` crate under the `tsue` target when the `log` feature is enabled.

macro_rules! trace {
    ($($tt:tt)*) => {
        #[cfg(feature = "log")]
        ::log::trace!(target: "tsue", $($tt)*);
    };
}

macro_rules! debug {
    ($($tt:tt)*) => {
        #[cfg(feature = "log")]
        ::log::debug!(target: "tsue", $($tt)*);
    };
}

macro_rules! warning {
    ($($tt:tt)*) => {
        #[cfg(feature = "log")]
        ::log::warn!(target: "tsue", $($tt)*);
    };
}

macro_rules! error {
    ($($tt:tt)*) => {
        #[cfg(feature = "log")]
        ::log::error!(target: "tsue", $($tt)*);
    };
}

pub(crate) use {trace, debug, warning, error};
