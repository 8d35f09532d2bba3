//! HTTP request header decoding.
//!
//! - [`HeaderDecoder`]: parses the request line and header section with `httparse`
//!   - Enforces header count and header size limits
//!   - Works out how many body bytes follow the header section
//!
//! Reply headers are serialized by [`ReplyEncoder`](crate::codec::ReplyEncoder).

mod header_decoder;

pub use header_decoder::HeaderDecoder;
pub use header_decoder::RequestHead;
