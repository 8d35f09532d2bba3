//! HTTP header decoder implementation for parsing HTTP request headers
//!
//! This module decodes the request line and header section from raw bytes into a
//! [`RequestHead`], and reports how many body bytes follow it.
//!
//! # Limits
//!
//! - Maximum number of headers: 64
//! - Maximum header size: 8KB
//! - Only supports HTTP/1.0 and HTTP/1.1
//!
//! # Implementation Details
//!
//! 1. Parse raw bytes using `httparse`
//! 2. Record header name/value byte ranges
//! 3. Split the header section off the buffer and slice names and values out of it
//! 4. Determine the body length from `Content-Length` / `Transfer-Encoding`
//!
//! Names and values are `Bytes` slices of the original header section, so no header
//! data is copied.

use bytes::{Bytes, BytesMut};
use http::{Method, Uri, Version};
use httparse::{Error, Status};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;

use crate::protocol::{Headers, ParseError, Request};

/// Maximum number of headers allowed in a request
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire header section
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// The request line and headers of a request whose body may still be in flight.
#[derive(Debug)]
pub struct RequestHead {
    method: Method,
    uri: Uri,
    version: Version,
    headers: Headers,
}

impl RequestHead {
    pub fn into_request(self, body: Option<Bytes>) -> Request {
        Request::from_parts(self.method, self.uri, self.version, self.headers, body)
    }
}

/// Decoder for HTTP request headers implementing the [`Decoder`] trait.
///
/// The item is the parsed head together with the `Content-Length` of the body that
/// follows it (`0` when there is none).
#[derive(Debug)]
pub struct HeaderDecoder;

impl Decoder for HeaderDecoder {
    type Item = (RequestHead, u64);
    type Error = ParseError;

    /// Attempts to decode HTTP headers from the provided bytes buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((head, body_length)))` if a complete header was successfully parsed
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if parsing failed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // "GET / HTTP/1.1\r\n\r\n" is the shortest request we can accept
        if src.len() < 14 {
            return Ok(None);
        }

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
        let mut req = httparse::Request::new(&mut headers);

        let parsed_result = req.parse(src).map_err(|e| match e {
            Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
            e => ParseError::invalid_header(e.to_string()),
        });

        match parsed_result? {
            Status::Complete(body_offset) => {
                trace!(header_size = body_offset, "parsed request header");
                ensure!(body_offset <= MAX_HEADER_BYTES, ParseError::too_large_header(body_offset, MAX_HEADER_BYTES));

                let header_count = req.headers.len();

                let mut header_index: [HeaderIndex; MAX_HEADER_NUM] = EMPTY_HEADER_INDEX_ARRAY;
                HeaderIndex::record(src, req.headers, &mut header_index);

                let version = match req.version {
                    Some(0) => Version::HTTP_10,
                    Some(1) => Version::HTTP_11,
                    _ => return Err(ParseError::InvalidVersion(req.version)),
                };

                let method = req.method.ok_or(ParseError::InvalidMethod)?;
                let method = Method::from_bytes(method.as_bytes()).map_err(|_e| ParseError::InvalidMethod)?;
                let uri = req.path.ok_or(ParseError::InvalidUri)?;
                let uri = Uri::try_from(uri).map_err(|_e| ParseError::InvalidUri)?;

                let header_bytes = src.split_to(body_offset).freeze();
                let mut headers = Headers::with_capacity(header_count);
                for index in &header_index[..header_count] {
                    headers.append(
                        header_bytes.slice(index.name.0..index.name.1),
                        header_bytes.slice(index.value.0..index.value.1),
                    );
                }

                let body_length = parse_body_length(&headers)?;

                Ok(Some((RequestHead { method, uri, version, headers }, body_length)))
            }
            // If parsing incomplete, ensure current buffer size does not exceed limit
            Status::Partial => {
                ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
                Ok(None)
            }
        }
    }
}

/// Stores the byte range positions of a header's name and value within the original buffer.
#[derive(Clone, Copy)]
struct HeaderIndex {
    name: (usize, usize),
    value: (usize, usize),
}

const EMPTY_HEADER_INDEX: HeaderIndex = HeaderIndex { name: (0, 0), value: (0, 0) };

const EMPTY_HEADER_INDEX_ARRAY: [HeaderIndex; MAX_HEADER_NUM] = [EMPTY_HEADER_INDEX; MAX_HEADER_NUM];

impl HeaderIndex {
    /// Records the byte positions of header names and values from the parsed headers.
    fn record(bytes: &[u8], headers: &[httparse::Header<'_>], indices: &mut [HeaderIndex]) {
        let bytes_ptr = bytes.as_ptr() as usize;
        for (header, indices) in headers.iter().zip(indices.iter_mut()) {
            let name_start = header.name.as_ptr() as usize - bytes_ptr;
            let name_end = name_start + header.name.len();
            indices.name = (name_start, name_end);
            let value_start = header.value.as_ptr() as usize - bytes_ptr;
            let value_end = value_start + header.value.len();
            indices.value = (value_start, value_end);
        }
    }
}

/// Determines how many body bytes follow the header section.
///
/// refer: <https://www.rfc-editor.org/rfc/rfc9112.html#name-transfer-encoding>
///
/// Chunked request bodies are not decoded by this engine and are rejected.
fn parse_body_length(headers: &Headers) -> Result<u64, ParseError> {
    let te_header = headers.get("Transfer-Encoding");
    let cl_header = headers.get("Content-Length");

    match (te_header, cl_header) {
        (None, None) => Ok(0),

        (Some(te_value), None) => {
            if is_chunked(te_value) {
                Err(ParseError::invalid_body("chunked request body is not supported"))
            } else {
                Ok(0)
            }
        }

        (None, Some(cl_value)) => {
            let cl_str =
                std::str::from_utf8(cl_value).map_err(|_e| ParseError::invalid_content_length("value is not utf-8"))?;

            cl_str.trim().parse::<u64>().map_err(|_e| ParseError::invalid_content_length(format!("value {cl_str} is not u64")))
        }

        (Some(_), Some(_)) => {
            Err(ParseError::invalid_content_length("transfer_encoding and content_length both present in headers"))
        }
    }
}

/// Checks if the Transfer-Encoding header indicates chunked encoding.
///
/// According to RFC 7230, chunked must be the last encoding if present.
fn is_chunked(value: &[u8]) -> bool {
    const CHUNKED: &[u8] = b"chunked";
    value.rsplit(|b| *b == b',').next().is_some_and(|last| last.trim_ascii().eq_ignore_ascii_case(CHUNKED))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn check_is_chunked() {
        assert!(is_chunked(b"gzip, chunked"));
        assert!(is_chunked(b"chunked"));
        assert!(!is_chunked(b"chunked, gzip"));
        assert!(!is_chunked(b"gzip"));
    }

    #[test]
    fn test_bytes_mut_lens() {
        let str = indoc! {r##"
        GET /index.html HTTP/1.1
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        123"##};

        let mut bytes = BytesMut::from(str);

        let result = HeaderDecoder.decode(&mut bytes).unwrap();

        assert!(result.is_some());
        assert_eq!(&bytes[..], &b"123"[..]);
    }

    #[test]
    fn from_curl() {
        let str = indoc! {r##"
        GET /index.html HTTP/1.1
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        "##};

        let mut buf = BytesMut::from(str);

        let (head, body_length) = HeaderDecoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(body_length, 0);

        let request = head.into_request(None);
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.version(), Version::HTTP_11);
        assert_eq!(request.uri().host(), None);
        assert_eq!(request.path(), "/index.html");
        assert_eq!(request.query(), None);

        assert_eq!(request.headers().len(), 3);
        assert_eq!(request.headers().get_str("accept"), Some("*/*"));
        assert_eq!(request.headers().get_str("Host"), Some("127.0.0.1:8080"));
        assert_eq!(request.headers().get_str("User-Agent"), Some("curl/7.79.1"));
    }

    #[test]
    fn from_edge() {
        let str = indoc! {r##"
        GET /index/?a=1&b=2&a=3 HTTP/1.0
        Host: 127.0.0.1:8080
        Connection: keep-alive
        Cache-Control: max-age=0
        sec-ch-ua: "#Not_A Brand";v="99", "Microsoft Edge";v="109", "Chromium";v="109"
        sec-ch-ua-mobile: ?0
        Accept-Language: zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7

        "##};

        let mut buf = BytesMut::from(str);

        let (head, _) = HeaderDecoder.decode(&mut buf).unwrap().unwrap();
        let request = head.into_request(None);

        assert_eq!(request.version(), Version::HTTP_10);
        assert_eq!(request.path(), "/index/");
        assert_eq!(request.query(), Some("a=1&b=2&a=3"));
        assert_eq!(request.query_param("a"), Some("1"));

        let names: Vec<_> = request.headers().iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec![
                &b"Host"[..],
                &b"Connection"[..],
                &b"Cache-Control"[..],
                &b"sec-ch-ua"[..],
                &b"sec-ch-ua-mobile"[..],
                &b"Accept-Language"[..]
            ]
        );
        assert_eq!(
            request.headers().get_str("SEC-CH-UA"),
            Some(r##""#Not_A Brand";v="99", "Microsoft Edge";v="109", "Chromium";v="109""##)
        );
    }

    #[test]
    fn content_length() {
        let mut buf = BytesMut::from("POST /submit HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello");

        let (_, body_length) = HeaderDecoder.decode(&mut buf).unwrap().unwrap();

        assert_eq!(body_length, 5);
        assert_eq!(&buf[..], b"hello");
    }

    #[test]
    fn reject_chunked_body() {
        let mut buf = BytesMut::from("POST /submit HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n");

        let result = HeaderDecoder.decode(&mut buf);

        assert!(matches!(result, Err(ParseError::InvalidBody { .. })));
    }

    #[test]
    fn reject_invalid_content_length() {
        let mut buf = BytesMut::from("POST /submit HTTP/1.1\r\nContent-Length: five\r\n\r\n");

        let result = HeaderDecoder.decode(&mut buf);

        assert!(matches!(result, Err(ParseError::InvalidContentLength { .. })));
    }

    #[test]
    fn partial_header() {
        const PARTIAL: &str = "GET /index.html HTTP/1.1\r\nHost: 127.0.0.1\r\n";
        let mut buf = BytesMut::from(PARTIAL);

        assert!(HeaderDecoder.decode(&mut buf).unwrap().is_none());
        assert_eq!(&buf[..], PARTIAL.as_bytes());
    }

    #[test]
    fn too_large_header() {
        let mut buf = BytesMut::from("GET /index.html HTTP/1.1\r\n");
        buf.extend_from_slice(format!("X-Padding: {}\r\n", "a".repeat(MAX_HEADER_BYTES)).as_bytes());

        let result = HeaderDecoder.decode(&mut buf);

        assert!(matches!(result, Err(ParseError::TooLargeHeader { .. })));
    }
}
