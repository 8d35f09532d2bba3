//! Per-connection request processing.
//!
//! - [`HttpConnection`]: the read loop / write loop pair serving one byte stream
//! - [`queue`]: the bounded reply queue coupling the two loops

mod http_connection;
mod message_writer;
pub mod queue;

pub use http_connection::HttpConnection;
