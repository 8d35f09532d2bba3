//! HTTP reply representation.
//!
//! Handlers build a [`Reply`]; the connection copies the request version into it, calls
//! [`Reply::done`] and queues it. The write loop then adds the mandatory `Server`, `Date`
//! and `Content-Length` headers right before serialization.

use bytes::{BufMut, Bytes, BytesMut};
use http::{StatusCode, Version};

use crate::protocol::Headers;

/// A fully buffered HTTP reply.
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    version: Version,
    headers: Headers,
    body: Bytes,
    status_line: Option<Bytes>,
}

impl Reply {
    pub fn new(status: StatusCode) -> Self {
        Self { status, version: Version::HTTP_11, headers: Headers::new(), body: Bytes::new(), status_line: None }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// An error-status reply whose plain text body is the canonical reason phrase.
    ///
    /// Handlers report ordinary failures this way instead of failing the connection.
    pub fn from_status(status: StatusCode) -> Self {
        let reason = status.canonical_reason().unwrap_or_default();
        Self::new(status).with_content_type(&mime::TEXT_PLAIN_UTF_8).with_body(reason)
    }

    pub fn with_header(mut self, name: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn with_content_type(mut self, mime: &mime::Mime) -> Self {
        self.headers.set("Content-Type", mime.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self.status_line = None;
        self
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn set_version(&mut self, version: Version) -> &mut Self {
        self.version = version;
        self.status_line = None;
        self
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) -> &mut Self {
        self.body = body.into();
        self
    }

    /// Freezes the status line from the current status and version.
    pub fn done(&mut self) -> &mut Self {
        self.status_line = Some(render_status_line(self.version, self.status));
        self
    }

    pub fn is_done(&self) -> bool {
        self.status_line.is_some()
    }

    /// The `HTTP/x.y code reason\r\n` line, rendered on the fly if [`Reply::done`] was skipped.
    pub fn status_line(&self) -> Bytes {
        match &self.status_line {
            Some(line) => line.clone(),
            None => render_status_line(self.version, self.status),
        }
    }
}

impl Default for Reply {
    fn default() -> Self {
        Self::ok()
    }
}

fn render_status_line(version: Version, status: StatusCode) -> Bytes {
    let reason = status.canonical_reason().unwrap_or_default();
    let mut line = BytesMut::with_capacity(16 + reason.len());
    line.put_slice(version_str(version).as_bytes());
    line.put_u8(b' ');
    line.put_slice(status.as_str().as_bytes());
    line.put_u8(b' ');
    line.put_slice(reason.as_bytes());
    line.put_slice(b"\r\n");
    line.freeze()
}

fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/1.1",
    }
}
