//! Connection lifetime policy.
//!
//! | version  | `Connection` header | reply header              | close after reply |
//! |----------|---------------------|---------------------------|-------------------|
//! | HTTP/1.0 | `Keep-Alive`        | `Connection: Keep-Alive`  | no                |
//! | HTTP/1.0 | absent / other      | -                         | yes               |
//! | HTTP/1.1 | `Close`             | -                         | yes               |
//! | HTTP/1.1 | absent / other      | -                         | no                |
//! | other    | any                 | -                         | yes               |
//!
//! The header name is looked up case-insensitively, the value must match byte for byte:
//! `keep-alive` or ` Close` count as "other".

use http::Version;

use crate::protocol::{Headers, Reply};

const CONNECTION: &str = "Connection";
const KEEP_ALIVE: &str = "Keep-Alive";
const CLOSE: &str = "Close";

/// The keep-alive decision taken for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlive {
    should_close: bool,
    announce: bool,
}

impl KeepAlive {
    pub fn evaluate(version: Version, headers: &Headers) -> Self {
        let connection = headers.get(CONNECTION).map(|value| &value[..]);
        let keep_alive = connection == Some(KEEP_ALIVE.as_bytes());
        let close = connection == Some(CLOSE.as_bytes());

        match version {
            Version::HTTP_10 => Self { should_close: !keep_alive, announce: keep_alive },
            Version::HTTP_11 => Self { should_close: close, announce: false },
            // HTTP/0.9 and anything newer than what this engine speaks
            _ => Self { should_close: true, announce: false },
        }
    }

    /// Whether the connection stops reading requests after this one.
    #[inline]
    pub fn should_close(&self) -> bool {
        self.should_close
    }

    /// Adds `Connection: Keep-Alive` when an HTTP/1.0 client asked for it.
    pub fn apply(&self, reply: &mut Reply) {
        if self.announce {
            reply.headers_mut().set(CONNECTION, KEEP_ALIVE);
        }
    }
}
