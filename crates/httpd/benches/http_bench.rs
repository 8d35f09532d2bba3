use criterion::{Criterion, criterion_group, criterion_main};
use micro_httpd::codec::{ReplyEncoder, RequestDecoder};
use micro_httpd::handler::make_handler;
use micro_httpd::protocol::{Reply, Request};
use micro_httpd::server::HttpServer;
use std::hint::black_box;
use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::runtime::Runtime;
use tokio_util::codec::{Decoder, Encoder};

const PIPELINED: usize = 16;

// Mock IO for testing
struct MockIO {
    read_data: Vec<u8>,
    read_pos: usize,
}

impl MockIO {
    fn new(read_data: Vec<u8>) -> Self {
        Self { read_data, read_pos: 0 }
    }
}

impl AsyncRead for MockIO {
    fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let remaining = &self.read_data[self.read_pos..];
        let amt = std::cmp::min(remaining.len(), buf.remaining());
        buf.put_slice(&remaining[..amt]);
        self.read_pos += amt;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockIO {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result<usize, io::Error>> {
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }
}

async fn test_handler(_request: Request) -> Reply {
    Reply::ok().with_body("Hello World!")
}

fn bench_request_decoder(c: &mut Criterion) {
    let request = b"GET /hello?name=bench HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello";

    c.bench_function("decode_simple_request", |b| {
        b.iter(|| {
            let mut decoder = RequestDecoder::new();
            let mut bytes = bytes::BytesMut::from(&request[..]);
            black_box(decoder.decode(&mut bytes).unwrap());
        });
    });
}

fn bench_reply_encoder(c: &mut Criterion) {
    let mut reply = Reply::ok()
        .with_header("Server", "micro-httpd")
        .with_header("Date", "Sun, 06 Nov 1994 08:49:37 GMT")
        .with_header("Content-Length", "12")
        .with_body("Hello World!");
    reply.done();

    c.bench_function("encode_simple_reply", |b| {
        b.iter(|| {
            let mut encoder = ReplyEncoder::new();
            let mut bytes = bytes::BytesMut::new();
            black_box(encoder.encode(&reply, &mut bytes).unwrap());
        });
    });
}

fn bench_http_connection(c: &mut Criterion) {
    let request = b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n";
    let pipelined = request.repeat(PIPELINED);

    let runtime = Runtime::new().unwrap();
    let server = runtime.block_on(async { HttpServer::builder().handler(make_handler(test_handler)).build().unwrap() });

    c.bench_function("process_simple_request", |b| {
        b.to_async(&runtime).iter(|| server.serve_connection(MockIO::new(request.to_vec()), MockIO::new(Vec::new()), None));
    });

    c.bench_function("process_pipelined_requests", |b| {
        b.to_async(&runtime).iter(|| server.serve_connection(MockIO::new(pipelined.clone()), MockIO::new(Vec::new()), None));
    });
}

criterion_group!(benches, bench_request_decoder, bench_reply_encoder, bench_http_connection);
criterion_main!(benches);
