//! Embeddable HTTP/1 Client Engine
//!
//! The engine performs no IO of its own. The application supplies the transport as read and
//! write callbacks, and drives every operation by polling an [`Executor`] from its own event
//! loop. The [`ffi`] module exposes the whole surface as a C API.
#![warn(missing_debug_implementations)]

mod log;
mod common;
mod matches;

pub mod http;
pub mod headers;
pub mod body;
pub mod request;
pub mod response;
pub mod error;

pub mod rt;
pub mod io;
mod h1;
pub mod client;

pub mod ffi;

pub use error::{Error, ErrorKind, Result};
pub use h1::{BodyError, ParseError};
pub use rt::{Executor, Task, TaskType, TaskValue};
