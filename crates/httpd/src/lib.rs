//! An asynchronous, pipelined HTTP/1.x connection engine
//!
//! Each accepted byte stream becomes a connection running two cooperating loops on top of
//! tokio: a read loop that parses requests and dispatches them to a [`handler::Handler`],
//! and a write loop that serializes the resulting replies. The loops are coupled only by a
//! bounded reply queue, so a client may pipeline requests while earlier replies are still
//! in flight, and replies always leave in request order.
//!
//! # Features
//!
//! - HTTP/1.0 and HTTP/1.1 request parsing on `httparse`
//! - Request pipelining with a bounded in-memory reply backlog
//! - HTTP/1.0 `Keep-Alive` and HTTP/1.1 `Connection: Close` handling
//! - Mandatory `Server`, `Date` and `Content-Length` reply headers
//! - Server wide connection registry with counters and graceful stop
//! - Path routing on `matchit`, query parameters on `serde_urlencoded`
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn, Level};
//! use tracing_subscriber::FmtSubscriber;
//! use micro_httpd::handler::{make_handler, Routes};
//! use micro_httpd::protocol::{Reply, Request};
//! use micro_httpd::server::HttpServer;
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder()
//!         .with_max_level(Level::INFO)
//!         .finish();
//!     tracing::subscriber::set_global_default(subscriber)
//!         .expect("setting default subscriber failed");
//!
//!     let routes = Routes::new().route("/hello", make_handler(hello_world)).expect("valid route");
//!     let server = Arc::new(HttpServer::builder().handler(routes).build().expect("valid server"));
//!
//!     info!(port = 8080, "start listening");
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     loop {
//!         let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let server = Arc::clone(&server);
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             server.serve_connection(reader, writer, Some(remote_addr)).await;
//!         });
//!     }
//! }
//!
//! async fn hello_world(request: Request) -> Reply {
//!     let name = request.query_param("name").unwrap_or("World");
//!     Reply::ok().with_content_type(&mime::TEXT_PLAIN_UTF_8).with_body(format!("Hello {name}!\r\n"))
//! }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: request, reply, header list, keep-alive policy and error types
//! - [`codec`]: request decoding and reply encoding on `tokio_util::codec`
//! - [`handler`]: the handler trait, function handlers and the routing table
//! - [`connection`]: the read/write loop pair and the reply queue
//! - [`server`]: configuration, connection registry, counters and the date cache
//!
//! ## Error Handling
//!
//! Nothing a client does can fail the server. Errors are caught at two boundaries:
//!
//! - [`protocol::ParseError`]: malformed requests and read failures end the read loop,
//!   replies already queued are still written
//! - [`protocol::SendError`]: write failures end the write loop and abandon queued replies
//!
//! Both are logged through `tracing` and counted in [`server::ServerStats`].
//!
//! # Limitations
//!
//! - No chunked request bodies, bodies are buffered whole up to a configurable limit
//! - No request or idle timeouts
//! - Maximum header size: 8KB
//! - Maximum number of headers: 64

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
