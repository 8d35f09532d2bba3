use bytes::Bytes;
use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::select;
use tokio_util::codec::FramedRead;
use tracing::{debug, error, trace, warn};

use crate::codec::RequestDecoder;
use crate::connection::message_writer::MessageWriter;
use crate::connection::queue::{QueueSlot, ReplyReceiver, ReplySender, reply_queue};
use crate::handler::Handler;
use crate::protocol::{HttpError, KeepAlive, SendError};
use crate::server::{ConnectionGuard, ConnectionId, DateService, ServerConfig};

const SERVER: &str = "Server";
const DATE: &str = "Date";
const CONTENT_LENGTH: &str = "Content-Length";

/// One HTTP/1.x connection with request pipelining.
///
/// The read loop parses requests, dispatches each to the handler in arrival order and
/// queues the replies; the write loop serializes queued replies in the same order. The
/// two loops share nothing but the bounded reply queue, so a client can send request
/// N+1 while reply N is still being transmitted.
///
/// Errors never escape [`process`](Self::process). A read failure is counted, the replies
/// already queued are still written, then the connection closes. A write failure is
/// counted and abandons every reply not yet written.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    writer: MessageWriter<W>,
    guard: ConnectionGuard,
    queue_capacity: usize,
    server_name: Bytes,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, guard: ConnectionGuard, config: &ServerConfig) -> Self {
        let decoder = RequestDecoder::with_max_body_size(config.max_body_size());
        Self {
            framed_read: FramedRead::with_capacity(reader, decoder, config.read_buffer_capacity()),
            writer: MessageWriter::with_capacity(writer, config.write_buffer_capacity()),
            guard,
            queue_capacity: config.queue_capacity(),
            server_name: config.server_name().clone(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.guard.id()
    }

    /// Serves requests until the client stops sending, asks to close, or an error occurs.
    ///
    /// The connection is deregistered when this returns.
    pub async fn process<H>(self, handler: &H, date: &DateService)
    where
        H: Handler + ?Sized,
    {
        let Self { framed_read, mut writer, guard, queue_capacity, server_name } = self;
        let (sender, receiver) = reply_queue(queue_capacity);

        debug!(connection = %guard.id(), "start processing connection");
        tokio::join!(
            read_loop(framed_read, sender, handler, &guard),
            write_loop(&mut writer, receiver, &guard, &server_name, date),
        );
        debug!(connection = %guard.id(), "connection finished");
    }
}

async fn read_loop<R, H>(
    mut framed_read: FramedRead<R, RequestDecoder>,
    sender: ReplySender,
    handler: &H,
    guard: &ConnectionGuard,
) where
    R: AsyncRead + Unpin,
    H: Handler + ?Sized,
{
    match read_requests(&mut framed_read, &sender, handler, guard).await {
        Ok(()) => {}
        Err(HttpError::QueueClosed) => {
            debug!(connection = %guard.id(), "write side gone, stop reading requests");
        }
        Err(HttpError::Read { source }) if source.is_io() => {
            guard.note_read_error();
            warn!(connection = %guard.id(), cause = %source, "connection read failed");
        }
        Err(e) => {
            guard.note_read_error();
            error!(connection = %guard.id(), cause = %e, "failed to read request");
        }
    }

    if sender.push(QueueSlot::End).await.is_err() {
        trace!(connection = %guard.id(), "reply queue already closed");
    }
    drop(framed_read);
}

async fn read_requests<R, H>(
    framed_read: &mut FramedRead<R, RequestDecoder>,
    sender: &ReplySender,
    handler: &H,
    guard: &ConnectionGuard,
) -> Result<(), HttpError>
where
    R: AsyncRead + Unpin,
    H: Handler + ?Sized,
{
    let mut done = false;
    while !done {
        framed_read.decoder_mut().reset();

        let request = select! {
            biased;
            () = guard.stopped() => {
                debug!(connection = %guard.id(), "connection stopped, no more requests are read");
                return Ok(());
            }
            next = framed_read.next() => match next {
                Some(request) => request?,
                None => {
                    trace!(connection = %guard.id(), "end of request stream");
                    return Ok(());
                }
            },
        };

        guard.note_request_served();
        if !sender.has_free_capacity() {
            trace!(connection = %guard.id(), "reply queue full, waiting for the write side");
        }
        let permit = sender.reserve().await?;

        let version = request.version();
        let keep_alive = KeepAlive::evaluate(version, request.headers());
        let path = request.path().to_owned();
        trace!(connection = %guard.id(), method = %request.method(), path = %path, "dispatching request");

        let mut reply = handler.handle(&path, request).await;
        keep_alive.apply(&mut reply);
        reply.set_version(version).done();
        done = keep_alive.should_close();

        permit.push(QueueSlot::Reply(reply));
    }
    Ok(())
}

async fn write_loop<W>(
    writer: &mut MessageWriter<W>,
    mut receiver: ReplyReceiver,
    guard: &ConnectionGuard,
    server_name: &Bytes,
    date: &DateService,
) where
    W: AsyncWrite + Unpin,
{
    if let Err(e) = write_replies(writer, &mut receiver, server_name, date).await {
        guard.note_respond_error();
        error!(connection = %guard.id(), cause = %e, "failed to write reply");
        // unblocks a read loop waiting on a silent client
        guard.stop();
    }
    drop(receiver);

    if let Err(e) = writer.shutdown().await {
        debug!(connection = %guard.id(), cause = %e, "failed to shut down write side");
    }
}

async fn write_replies<W>(
    writer: &mut MessageWriter<W>,
    receiver: &mut ReplyReceiver,
    server_name: &Bytes,
    date: &DateService,
) -> Result<(), SendError>
where
    W: AsyncWrite + Unpin,
{
    loop {
        let mut reply = match receiver.pop().await {
            QueueSlot::Reply(reply) => reply,
            QueueSlot::End => return Ok(()),
        };

        let content_length = reply.body().len().to_string();
        let headers = reply.headers_mut();
        headers.set(SERVER, server_name.clone());
        headers.set(DATE, date.current_date());
        headers.set(CONTENT_LENGTH, content_length);

        writer.write(&reply)?;
        writer.flush().await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::make_handler;
    use crate::protocol::{Reply, Request};
    use crate::server::ConnectionRegistry;

    fn echo_path() -> impl Handler {
        make_handler(|request: Request| async move { Reply::ok().with_body(request.path().to_owned()) })
    }

    fn body(slot: QueueSlot) -> Bytes {
        match slot {
            QueueSlot::Reply(reply) => reply.body().clone(),
            QueueSlot::End => panic!("unexpected end slot"),
        }
    }

    #[tokio::test]
    async fn end_follows_last_reply() {
        let registry = ConnectionRegistry::new();
        let guard = registry.register(None);
        let input = &b"GET /1 HTTP/1.1\r\n\r\nGET /2 HTTP/1.1\r\n\r\nGET /3 HTTP/1.1\r\n\r\n"[..];
        let (sender, mut receiver) = reply_queue(10);

        read_loop(FramedRead::new(input, RequestDecoder::new()), sender, &echo_path(), &guard).await;

        assert_eq!(receiver.len(), 4);
        assert_eq!(body(receiver.pop().await), "/1");
        assert_eq!(body(receiver.pop().await), "/2");
        assert_eq!(body(receiver.pop().await), "/3");
        assert!(receiver.pop().await.is_end());
        assert!(receiver.is_empty());
        assert_eq!(registry.snapshot().requests_served, 3);
    }

    #[tokio::test]
    async fn end_follows_last_reply_on_read_error() {
        let registry = ConnectionRegistry::new();
        let guard = registry.register(None);
        let input = &b"GET /1 HTTP/1.1\r\n\r\nGET /2 HTTP/1.1\r\nbroken header\r\n\r\n"[..];
        let (sender, mut receiver) = reply_queue(10);

        read_loop(FramedRead::new(input, RequestDecoder::new()), sender, &echo_path(), &guard).await;

        assert_eq!(receiver.len(), 2);
        assert_eq!(body(receiver.pop().await), "/1");
        assert!(receiver.pop().await.is_end());
        assert_eq!(registry.snapshot().read_errors, 1);
    }

    #[tokio::test]
    async fn close_request_ends_the_queue() {
        let registry = ConnectionRegistry::new();
        let guard = registry.register(None);
        let input = &b"GET /1 HTTP/1.1\r\nConnection: Close\r\n\r\nGET /2 HTTP/1.1\r\n\r\n"[..];
        let (sender, mut receiver) = reply_queue(10);

        read_loop(FramedRead::new(input, RequestDecoder::new()), sender, &echo_path(), &guard).await;

        assert_eq!(receiver.len(), 2);
        assert_eq!(body(receiver.pop().await), "/1");
        assert!(receiver.pop().await.is_end());
    }
}
