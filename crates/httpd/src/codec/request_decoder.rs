//! HTTP request decoder module
//!
//! This module decodes complete HTTP requests out of a byte stream. It is meant to be
//! driven by a [`FramedRead`](tokio_util::codec::FramedRead): every `Some` item is one
//! request, and the framed reader returning `None` is the end-of-stream signal.
//!
//! # Example
//!
//! ```
//! use micro_httpd::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from("GET /hello HTTP/1.1\r\nHost: localhost\r\n\r\n");
//! let request = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(request.path(), "/hello");
//! ```

use crate::codec::body::LengthDecoder;
use crate::codec::header::{HeaderDecoder, RequestHead};
use crate::ensure;
use crate::protocol::{ParseError, Request};
use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

/// Default upper bound of a buffered request body.
pub const DEFAULT_MAX_BODY_SIZE: u64 = 8 * 1024 * 1024;

/// A decoder for HTTP requests that handles both headers and payload
///
/// The decoder operates in two phases:
/// 1. Header parsing: Decodes the request headers using [`HeaderDecoder`]
/// 2. Body buffering: If a `Content-Length` body follows, waits for it using [`LengthDecoder`]
///
/// # State Machine
///
/// The decoder maintains its state through the `pending` field:
/// - `None`: Currently parsing headers
/// - `Some(_)`: Headers parsed, waiting for the rest of the body
#[derive(Debug)]
pub struct RequestDecoder {
    header_decoder: HeaderDecoder,
    pending: Option<(RequestHead, LengthDecoder)>,
    max_body_size: u64,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` instance
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_max_body_size(max_body_size: u64) -> Self {
        Self { header_decoder: HeaderDecoder, pending: None, max_body_size }
    }

    /// Drops any half-decoded request so the next call starts from a request line.
    pub fn reset(&mut self) {
        self.pending = None;
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::with_max_body_size(DEFAULT_MAX_BODY_SIZE)
    }
}

impl Decoder for RequestDecoder {
    type Item = Request;
    type Error = ParseError;

    /// Attempts to decode one HTTP request from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(request))`: Successfully decoded a request, including its body
    /// - `Ok(None)`: Need more data to proceed
    /// - `Err(_)`: Encountered a parsing error
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let (head, mut body_decoder) = match self.pending.take() {
            Some(pending) => pending,
            None => match self.header_decoder.decode(src)? {
                None => return Ok(None),
                Some((head, 0)) => return Ok(Some(head.into_request(None))),
                Some((head, length)) => {
                    ensure!(length <= self.max_body_size, ParseError::too_large_body(length, self.max_body_size));
                    let length =
                        usize::try_from(length).map_err(|_e| ParseError::too_large_body(length, self.max_body_size))?;
                    trace!(body_size = length, "waiting for request body");
                    (head, LengthDecoder::new(length))
                }
            },
        };

        match body_decoder.decode(src)? {
            Some(body) => Ok(Some(head.into_request(Some(body)))),
            None => {
                self.pending = Some((head, body_decoder));
                Ok(None)
            }
        }
    }
}
