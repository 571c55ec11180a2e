/// Define an exported C function.
///
/// A panic never unwinds across the boundary, it is caught and the value after `?=` is returned
/// instead. Functions returning nothing fall back to doing nothing.
macro_rules! ffi_fn {
    (
        $(#[$doc:meta])*
        fn $name:ident($($arg:ident: $arg_ty:ty),*) -> $ret:ty $body:block ?= $default:expr
    ) => {
        $(#[$doc])*
        #[unsafe(no_mangle)]
        pub extern "C" fn $name($($arg: $arg_ty),*) -> $ret {
            use std::panic::{self, AssertUnwindSafe};

            match panic::catch_unwind(AssertUnwindSafe(move || -> $ret { $body })) {
                Ok(ret) => ret,
                Err(_) => {
                    $crate::log::error!("panic in {}", stringify!($name));
                    $default
                }
            }
        }
    };
    (
        $(#[$doc:meta])*
        fn $name:ident($($arg:ident: $arg_ty:ty),*) $body:block
    ) => {
        ffi_fn! {
            $(#[$doc])*
            fn $name($($arg: $arg_ty),*) -> () $body ?= ()
        }
    };
}

/// Dereference a handle, returning the fallback from the enclosing function if it is null.
macro_rules! non_null {
    ($ptr:ident, $eval:expr, $err:expr) => {{
        if $ptr.is_null() {
            $crate::log::warning!("{} must not be null", stringify!($ptr));
            return $err;
        }
        // SAFETY: the handle is non null, validity is part of the C API contract
        unsafe { $eval }
    }};
    (&*$ptr:ident ?= $err:expr) => {{
        non_null!($ptr, &*$ptr, $err)
    }};
    (&mut *$ptr:ident ?= $err:expr) => {{
        non_null!($ptr, &mut *$ptr, $err)
    }};
    (Box::from_raw($ptr:ident) ?= $err:expr) => {{
        non_null!($ptr, Box::from_raw($ptr), $err)
    }};
    (Arc::from_raw($ptr:ident) ?= $err:expr) => {{
        non_null!($ptr, std::sync::Arc::from_raw($ptr), $err)
    }};
}
