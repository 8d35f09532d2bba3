//! Server wide state: configuration, connection registry, counters and the date cache.
//!
//! [`HttpServer`] does not own a listener. The caller accepts streams however it likes
//! and hands each one to [`HttpServer::serve_connection`]:
//!
//! ```no_run
//! use std::sync::Arc;
//! use micro_httpd::handler::make_handler;
//! use micro_httpd::protocol::{Reply, Request};
//! use micro_httpd::server::HttpServer;
//! use tokio::net::TcpListener;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let server = Arc::new(
//!     HttpServer::builder()
//!         .handler(make_handler(|_request: Request| async { Reply::ok().with_body("hi") }))
//!         .build()?,
//! );
//!
//! let listener = TcpListener::bind("127.0.0.1:8080").await?;
//! loop {
//!     let (stream, peer) = listener.accept().await?;
//!     let server = Arc::clone(&server);
//!     tokio::spawn(async move {
//!         let (reader, writer) = stream.into_split();
//!         server.serve_connection(reader, writer, Some(peer)).await;
//!     });
//! }
//! # }
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::runtime::Handle;
use tracing::info;

use crate::connection::HttpConnection;
use crate::handler::Handler;
use crate::ensure;

mod config;
mod date;
mod registry;
mod stats;

pub use config::{DEFAULT_BUFFER_CAPACITY, DEFAULT_QUEUE_CAPACITY, DEFAULT_SERVER_NAME, ServerBuildError, ServerConfig};
pub use date::{DEFAULT_DATE_INTERVAL, DateService};
pub use registry::{ConnectionGuard, ConnectionId, ConnectionInfo, ConnectionRegistry};
pub use stats::{ServerStats, StatsSnapshot};

pub struct HttpServer {
    config: ServerConfig,
    handler: Arc<dyn Handler>,
    registry: Arc<ConnectionRegistry>,
    date: DateService,
}

impl HttpServer {
    pub fn builder() -> HttpServerBuilder {
        HttpServerBuilder::new()
    }

    /// Runs one connection to completion.
    ///
    /// Never fails: read and write errors are logged and counted in [`stats`](Self::stats),
    /// then the connection is torn down.
    pub async fn serve_connection<R, W>(&self, reader: R, writer: W, peer: Option<SocketAddr>)
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let guard = self.registry.register(peer);
        let connection = HttpConnection::new(reader, writer, guard, &self.config);
        connection.process(self.handler.as_ref(), &self.date).await;
    }

    /// Stops every connection from reading new requests and waits until all of them
    /// have written their queued replies and closed.
    pub async fn stop(&self) {
        info!(live = self.registry.len(), "stopping server");
        self.registry.shutdown();
        self.registry.wait_idle().await;
        info!("server stopped");
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.registry.snapshot()
    }

    pub fn date(&self) -> &DateService {
        &self.date
    }
}

impl std::fmt::Debug for HttpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpServer").field("config", &self.config).field("registry", &self.registry).finish_non_exhaustive()
    }
}

pub struct HttpServerBuilder {
    config: ServerConfig,
    handler: Option<Arc<dyn Handler>>,
}

impl HttpServerBuilder {
    fn new() -> Self {
        Self { config: ServerConfig::default(), handler: None }
    }

    pub fn handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn shared_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn server_name(mut self, server_name: impl Into<Bytes>) -> Self {
        self.config.server_name = server_name.into();
        self
    }

    pub fn queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.config.queue_capacity = queue_capacity;
        self
    }

    pub fn read_buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.read_buffer_capacity = capacity;
        self
    }

    pub fn write_buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.write_buffer_capacity = capacity;
        self
    }

    pub fn max_body_size(mut self, max_body_size: u64) -> Self {
        self.config.max_body_size = max_body_size;
        self
    }

    pub fn date_interval(mut self, interval: Duration) -> Self {
        self.config.date_interval = interval;
        self
    }

    /// Must be called inside a tokio runtime, which hosts the date refresh task.
    pub fn build(self) -> Result<HttpServer, ServerBuildError> {
        let handler = self.handler.ok_or(ServerBuildError::MissingHandler)?;
        ensure!(self.config.queue_capacity > 0, ServerBuildError::ZeroQueueCapacity);
        let runtime = Handle::try_current().map_err(|_e| ServerBuildError::MissingRuntime)?;

        let date = DateService::start(&runtime, self.config.date_interval);
        Ok(HttpServer { config: self.config, handler, registry: ConnectionRegistry::new(), date })
    }
}

impl std::fmt::Debug for HttpServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpServerBuilder").field("config", &self.config).finish_non_exhaustive()
    }
}
