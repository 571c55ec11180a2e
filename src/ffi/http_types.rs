use std::ffi::{c_int, c_void};
use std::ptr;

use bytes::Bytes;

use super::error::Code;
use super::{
    TSUE_HTTP_VERSION_1_0, TSUE_HTTP_VERSION_1_1, TSUE_HTTP_VERSION_NONE, TSUE_ITER_CONTINUE,
    slice_from_raw,
};
use crate::body::Body;
use crate::headers::{HeaderMap, HeaderName, HeaderValue};
use crate::http::{Method, Uri, Version};
use crate::request::Request;
use crate::response::Response;

type HeadersForeachCallback =
    extern "C" fn(*mut c_void, *const u8, usize, *const u8, usize) -> c_int;

// ===== Request =====

ffi_fn! {
    /// Construct a new `GET / HTTP/1.1` request with no headers and an empty body.
    fn tsue_request_new() -> *mut Request {
        Box::into_raw(Box::new(Request::new()))
    } ?= ptr::null_mut()
}

ffi_fn! {
    /// Free a request.
    fn tsue_request_free(req: *mut Request) {
        drop(non_null!(Box::from_raw(req) ?= ()));
    }
}

ffi_fn! {
    /// Set the request method.
    fn tsue_request_set_method(req: *mut Request, method: *const u8, method_len: usize) -> Code {
        let req = non_null!(&mut *req ?= Code::InvalidArg);
        // SAFETY: caller provides a valid region
        let Some(bytes) = (unsafe { slice_from_raw(method, method_len) }) else {
            return Code::InvalidArg;
        };
        match Method::from_bytes(bytes) {
            Ok(method) => {
                *req.method_mut() = method;
                Code::Ok
            }
            Err(_) => Code::InvalidArg,
        }
    } ?= Code::InvalidArg
}

ffi_fn! {
    /// Set the request target.
    ///
    /// Either the origin form `/path?query`, or the absolute form `http://host/path` whose
    /// authority populates the `Host` header if none is set.
    fn tsue_request_set_uri(req: *mut Request, uri: *const u8, uri_len: usize) -> Code {
        let req = non_null!(&mut *req ?= Code::InvalidArg);
        // SAFETY: caller provides a valid region
        let Some(bytes) = (unsafe { slice_from_raw(uri, uri_len) }) else {
            return Code::InvalidArg;
        };
        match Uri::from_bytes(Bytes::copy_from_slice(bytes)) {
            Ok(uri) => {
                *req.uri_mut() = uri;
                Code::Ok
            }
            Err(_) => Code::InvalidArg,
        }
    } ?= Code::InvalidArg
}

ffi_fn! {
    /// Set the HTTP version, either `TSUE_HTTP_VERSION_1_0` or `TSUE_HTTP_VERSION_1_1`.
    fn tsue_request_set_version(req: *mut Request, version: c_int) -> Code {
        let req = non_null!(&mut *req ?= Code::InvalidArg);
        let minor = match version {
            TSUE_HTTP_VERSION_1_0 | TSUE_HTTP_VERSION_1_1 => version - TSUE_HTTP_VERSION_1_0,
            _ => return Code::InvalidArg,
        };
        match Version::from_minor(minor as u8) {
            Some(version) => {
                *req.version_mut() = version;
                Code::Ok
            }
            None => Code::InvalidArg,
        }
    } ?= Code::InvalidArg
}

ffi_fn! {
    /// Get the headers of this request, borrowed for the lifetime of the request.
    fn tsue_request_headers(req: *mut Request) -> *mut HeaderMap {
        non_null!(&mut *req ?= ptr::null_mut()).headers_mut()
    } ?= ptr::null_mut()
}

ffi_fn! {
    /// Set the body of the request, consuming the body.
    ///
    /// Without a `Content-Length` header, a body of unknown length is sent chunked.
    fn tsue_request_set_body(req: *mut Request, body: *mut Body) -> Code {
        let body = non_null!(Box::from_raw(body) ?= Code::InvalidArg);
        let req = non_null!(&mut *req ?= Code::InvalidArg);
        *req.body_mut() = *body;
        Code::Ok
    } ?= Code::InvalidArg
}

// ===== Response =====

ffi_fn! {
    /// Free a response.
    fn tsue_response_free(res: *mut Response) {
        drop(non_null!(Box::from_raw(res) ?= ()));
    }
}

ffi_fn! {
    /// Get the response status code, within `100..=599`.
    fn tsue_response_status(res: *const Response) -> u16 {
        non_null!(&*res ?= 0).status().as_u16()
    } ?= 0
}

ffi_fn! {
    /// Get the response HTTP version.
    fn tsue_response_version(res: *const Response) -> c_int {
        let res = non_null!(&*res ?= TSUE_HTTP_VERSION_NONE);
        TSUE_HTTP_VERSION_1_0 + c_int::from(res.version().minor())
    } ?= TSUE_HTTP_VERSION_NONE
}

ffi_fn! {
    /// Get a pointer to the reason phrase, valid for the lifetime of the response.
    ///
    /// The canonical reason is used when the peer sent none. Not NUL terminated.
    fn tsue_response_reason_phrase(res: *const Response) -> *const u8 {
        non_null!(&*res ?= ptr::null()).reason_phrase().as_ptr()
    } ?= ptr::null()
}

ffi_fn! {
    /// Get the length of the reason phrase.
    fn tsue_response_reason_phrase_len(res: *const Response) -> usize {
        non_null!(&*res ?= 0).reason_phrase().len()
    } ?= 0
}

ffi_fn! {
    /// Get the headers of this response, borrowed for the lifetime of the response.
    fn tsue_response_headers(res: *mut Response) -> *mut HeaderMap {
        non_null!(&mut *res ?= ptr::null_mut()).headers_mut()
    } ?= ptr::null_mut()
}

ffi_fn! {
    /// Take ownership of the response body.
    ///
    /// The response keeps an empty body and must still be freed.
    fn tsue_response_body(res: *mut Response) -> *mut Body {
        let body = non_null!(&mut *res ?= ptr::null_mut()).take_body();
        Box::into_raw(Box::new(body))
    } ?= ptr::null_mut()
}

// ===== Headers =====

ffi_fn! {
    /// Iterate over every header, in insertion order, with the name in its original casing.
    ///
    /// Returning anything but `TSUE_ITER_CONTINUE` stops the iteration.
    fn tsue_headers_foreach(headers: *const HeaderMap, func: HeadersForeachCallback, userdata: *mut c_void) {
        let headers = non_null!(&*headers ?= ());
        for (name, value) in headers.iter_raw() {
            let value = value.as_bytes();
            if func(userdata, name.as_ptr(), name.len(), value.as_ptr(), value.len()) != TSUE_ITER_CONTINUE {
                break;
            }
        }
    }
}

ffi_fn! {
    /// Set a header, replacing every previous value of the same name.
    fn tsue_headers_set(
        headers: *mut HeaderMap,
        name: *const u8,
        name_len: usize,
        value: *const u8,
        value_len: usize
    ) -> Code {
        let headers = non_null!(&mut *headers ?= Code::InvalidArg);
        // SAFETY: caller provides valid regions
        match unsafe { raw_field(name, name_len, value, value_len) } {
            Some((name, orig, value)) => {
                headers.insert_cased(name, orig, value);
                Code::Ok
            }
            None => Code::InvalidArg,
        }
    } ?= Code::InvalidArg
}

ffi_fn! {
    /// Add a header, keeping any previous value of the same name.
    fn tsue_headers_add(
        headers: *mut HeaderMap,
        name: *const u8,
        name_len: usize,
        value: *const u8,
        value_len: usize
    ) -> Code {
        let headers = non_null!(&mut *headers ?= Code::InvalidArg);
        // SAFETY: caller provides valid regions
        match unsafe { raw_field(name, name_len, value, value_len) } {
            Some((name, orig, value)) => {
                headers.append_cased(name, orig, value);
                Code::Ok
            }
            None => Code::InvalidArg,
        }
    } ?= Code::InvalidArg
}

/// # Safety
///
/// Non null pointers must be valid for their length.
unsafe fn raw_field(
    name: *const u8,
    name_len: usize,
    value: *const u8,
    value_len: usize,
) -> Option<(HeaderName, Bytes, HeaderValue)> {
    // SAFETY: guaranteed by caller
    let (name, value) = unsafe { (slice_from_raw(name, name_len)?, slice_from_raw(value, value_len)?) };
    let header_name = HeaderName::from_slice(name).ok()?;
    let header_value = HeaderValue::from_slice(value).ok()?;
    Some((header_name, Bytes::copy_from_slice(name), header_value))
}
