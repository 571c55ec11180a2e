//! HTTP Protocol primitives.
mod method;
mod status;
mod version;
mod uri;

pub use method::{Method, InvalidMethod};
pub use version::Version;
pub use status::{StatusCode, InvalidStatusCode};
pub use uri::{Uri, InvalidUri};
