use crate::codec::ReplyEncoder;
use crate::protocol::{Reply, SendError};
use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;

/// Buffered write half of a connection.
#[derive(Debug)]
pub struct MessageWriter<W> {
    writer: W,
    buffer: BytesMut,
    encoder: ReplyEncoder,
}

impl<W> MessageWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn with_capacity(writer: W, buffer_size: usize) -> Self {
        Self { writer, buffer: BytesMut::with_capacity(buffer_size), encoder: ReplyEncoder::new() }
    }

    #[cfg(test)]
    fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Encodes `reply` into the buffer. Nothing reaches the stream until [`flush`](Self::flush).
    #[inline]
    pub fn write(&mut self, reply: &Reply) -> Result<(), SendError> {
        <ReplyEncoder as Encoder<&Reply>>::encode(&mut self.encoder, reply, &mut self.buffer)
    }

    #[inline]
    pub async fn flush(&mut self) -> Result<(), SendError> {
        if !self.buffer.is_empty() {
            self.writer.write_all_buf(&mut self.buffer).await?;
        }
        Ok(self.writer.flush().await?)
    }

    /// Closes the write side of the stream; anything still buffered is discarded.
    pub async fn shutdown(&mut self) -> Result<(), SendError> {
        self.buffer.clear();
        Ok(self.writer.shutdown().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[tokio::test]
    async fn write_then_flush() {
        let mut writer = MessageWriter::with_capacity(Vec::new(), 64);

        let mut reply = Reply::ok().with_header("Content-Length", "2").with_body("hi");
        reply.done();
        writer.write(&reply).unwrap();
        assert!(writer.get_mut().is_empty());

        writer.flush().await.unwrap();
        assert_eq!(&writer.get_mut()[..], b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nhi");

        let mut reply = Reply::new(StatusCode::NO_CONTENT);
        reply.done();
        writer.write(&reply).unwrap();
        writer.flush().await.unwrap();
        assert!(writer.get_mut().ends_with(b"hiHTTP/1.1 204 No Content\r\n\r\n"));
    }

    #[tokio::test]
    async fn flush_empty_buffer() {
        let mut writer = MessageWriter::with_capacity(Vec::new(), 64);

        writer.flush().await.unwrap();
        writer.shutdown().await.unwrap();

        assert!(writer.get_mut().is_empty());
    }
}
