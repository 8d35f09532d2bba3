//! HTTP reply encoder implementation for serializing fully buffered replies
//!
//! The wire format is fixed: the status line, every header as `name: value\r\n` in
//! insertion order, an empty `\r\n` line, then the raw body bytes. No transfer encoding
//! is applied, so the `Content-Length` header set by the connection must match the body.

use crate::protocol::{Reply, SendError};

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

/// Initial buffer size reserved for the status line and headers
const INIT_HEADER_SIZE: usize = 1024;

/// Encoder for [`Reply`] values implementing the [`Encoder`] trait.
#[derive(Debug, Default)]
pub struct ReplyEncoder;

impl ReplyEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<Reply> for ReplyEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Reply, dst: &mut BytesMut) -> Result<(), Self::Error> {
        <Self as Encoder<&Reply>>::encode(self, &item, dst)
    }
}

impl Encoder<&Reply> for ReplyEncoder {
    type Error = SendError;

    /// Encodes the reply into the provided bytes buffer.
    ///
    /// Encoding into memory cannot fail; the `Result` is part of the [`Encoder`] contract.
    fn encode(&mut self, item: &Reply, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEADER_SIZE + item.body().len());

        dst.put_slice(&item.status_line());

        for (header_name, header_value) in item.headers().iter() {
            dst.put_slice(header_name);
            dst.put_slice(b": ");
            dst.put_slice(header_value);
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");

        dst.put_slice(item.body());
        Ok(())
    }
}
