//! Error types of the read and write paths.
//!
//! [`ParseError`] covers everything that can go wrong while turning bytes into a
//! [`Request`](crate::protocol::Request), transport read failures included. [`SendError`]
//! covers writing a reply. Neither ever reaches a handler or the caller of
//! [`HttpServer::serve_connection`](crate::server::HttpServer::serve_connection): the
//! connection logs and counts them, then closes.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("read side failed: {source}")]
    Read {
        #[from]
        source: ParseError,
    },

    #[error("write side failed: {source}")]
    Write {
        #[from]
        source: SendError,
    },

    /// The write side of the connection is gone, no more replies can be queued.
    #[error("reply queue closed")]
    QueueClosed,
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("header section of {current_size} bytes exceeds the limit of {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("more than {max_num} headers")]
    TooManyHeaders { max_num: usize },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    /// Only HTTP/1.0 and HTTP/1.1 requests are parsed.
    #[error("unsupported http version: {0:?}")]
    InvalidVersion(Option<u8>),

    #[error("invalid http method")]
    InvalidMethod,

    #[error("invalid request target")]
    InvalidUri,

    #[error("invalid content-length: {reason}")]
    InvalidContentLength { reason: String },

    /// The body framing is not one this engine buffers, e.g. chunked.
    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("body of {current_size} bytes exceeds the limit of {max_size}")]
    TooLargeBody { current_size: u64, max_size: u64 },

    #[error("read failed: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_header<S: ToString>(reason: S) -> Self {
        Self::InvalidHeader { reason: reason.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(reason: S) -> Self {
        Self::InvalidContentLength { reason: reason.to_string() }
    }

    pub fn invalid_body<S: ToString>(reason: S) -> Self {
        Self::InvalidBody { reason: reason.to_string() }
    }

    pub fn too_large_body(current_size: u64, max_size: u64) -> Self {
        Self::TooLargeBody { current_size, max_size }
    }

    /// Whether the failure came from the transport rather than from the request bytes.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("write failed: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_side_conversions() {
        let error: HttpError = ParseError::from(io::Error::from(io::ErrorKind::ConnectionReset)).into();

        assert!(matches!(&error, HttpError::Read { source } if source.is_io()));
        assert!(!ParseError::InvalidMethod.is_io());
    }

    #[test]
    fn messages() {
        assert_eq!(ParseError::too_large_body(11, 10).to_string(), "body of 11 bytes exceeds the limit of 10");
        assert_eq!(HttpError::QueueClosed.to_string(), "reply queue closed");
    }
}
