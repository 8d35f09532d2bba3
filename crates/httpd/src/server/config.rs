use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;

use crate::codec::DEFAULT_MAX_BODY_SIZE;
use crate::server::date::DEFAULT_DATE_INTERVAL;

pub const DEFAULT_SERVER_NAME: &str = "micro-httpd";
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("handler must be set")]
    MissingHandler,
    #[error("reply queue capacity must be at least 1")]
    ZeroQueueCapacity,
    #[error("server must be built inside a tokio runtime")]
    MissingRuntime,
}

/// Settings shared by every connection of a server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) server_name: Bytes,
    pub(crate) queue_capacity: usize,
    pub(crate) read_buffer_capacity: usize,
    pub(crate) write_buffer_capacity: usize,
    pub(crate) max_body_size: u64,
    pub(crate) date_interval: Duration,
}

impl ServerConfig {
    /// Value of the `Server` header of every reply.
    pub fn server_name(&self) -> &Bytes {
        &self.server_name
    }

    /// How many replies a connection may hold ahead of the one being written.
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn read_buffer_capacity(&self) -> usize {
        self.read_buffer_capacity
    }

    pub fn write_buffer_capacity(&self) -> usize {
        self.write_buffer_capacity
    }

    pub fn max_body_size(&self) -> u64 {
        self.max_body_size
    }

    pub fn date_interval(&self) -> Duration {
        self.date_interval
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_name: Bytes::from_static(DEFAULT_SERVER_NAME.as_bytes()),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            read_buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            write_buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            date_interval: DEFAULT_DATE_INTERVAL,
        }
    }
}
