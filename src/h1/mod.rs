//! HTTP/1.1 client protocol.
mod conn;
mod decoder;
mod encoder;
mod error;
mod parser;

pub use error::{BodyError, ParseError};
pub(crate) use conn::{Config, Connection, Envelope, MIN_BUF_SIZE};
