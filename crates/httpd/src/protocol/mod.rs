//! Core HTTP protocol types.
//!
//! - [`Request`]: a fully parsed request, header names kept as received
//! - [`Reply`]: a fully buffered reply produced by a [`Handler`](crate::handler::Handler)
//! - [`Headers`]: the ordered header list both of them use
//! - [`KeepAlive`]: the version and `Connection` header driven lifetime policy
//! - [`HttpError`], [`ParseError`], [`SendError`]: error types of the read and write paths

mod header;
pub use header::Headers;

mod request;
pub use request::Request;

mod reply;
pub use reply::Reply;

mod keep_alive;
pub use keep_alive::KeepAlive;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
