//! HTTP Header Multimap.
//!
//! Header names are compared case-insensitively, but the casing sent by the user (or received
//! from the peer) is kept alongside so it can be written back verbatim.
mod name;
mod value;
mod map;
mod error;

pub use name::{HeaderName, AsHeaderName, standard};
pub use value::HeaderValue;
pub use map::{HeaderMap, GetAll, Iter, IterRaw};
pub use error::HeaderError;
