//! HTTP codec module for encoding and decoding HTTP messages
//!
//! - Request handling:
//!   - [`RequestDecoder`]: decodes one complete request (head plus buffered body) at a time
//!   - Header parsing via the `header` module
//!   - `Content-Length` body buffering via the `body` module
//!
//! - Reply handling:
//!   - [`ReplyEncoder`]: serializes a fully buffered [`Reply`](crate::protocol::Reply)
//!
//! # Example
//!
//! ```
//! use micro_httpd::codec::{ReplyEncoder, RequestDecoder};
//! use micro_httpd::protocol::Reply;
//! use tokio_util::codec::{Decoder, Encoder};
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut request_buffer = BytesMut::from("GET / HTTP/1.1\r\n\r\n");
//! let request = decoder.decode(&mut request_buffer).unwrap();
//! assert!(request.is_some());
//!
//! let mut encoder = ReplyEncoder::new();
//! let mut reply_buffer = BytesMut::new();
//! encoder.encode(Reply::ok(), &mut reply_buffer).unwrap();
//! assert_eq!(&reply_buffer[..], b"HTTP/1.1 200 OK\r\n\r\n");
//! ```

mod body;
mod header;
mod reply_encoder;
mod request_decoder;

pub use reply_encoder::ReplyEncoder;
pub use request_decoder::DEFAULT_MAX_BODY_SIZE;
pub use request_decoder::RequestDecoder;
