//! HTTP request representation.
//!
//! A [`Request`] is produced by the [`RequestDecoder`](crate::codec::RequestDecoder) once the
//! header section and any `Content-Length` body have been fully received. It is handed to
//! the [`Handler`](crate::handler::Handler) by value, so the read loop never touches it again.

use bytes::Bytes;
use http::{Method, Uri, Version};

use crate::protocol::Headers;

/// A fully parsed HTTP/1.x request.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    version: Version,
    headers: Headers,
    body: Option<Bytes>,
    query_params: Vec<(String, String)>,
    path_params: Vec<(String, String)>,
}

impl Request {
    /// Creates a request with no headers and no body.
    pub fn new(method: Method, uri: Uri, version: Version) -> Self {
        let query_params = uri.query().map(decode_query).unwrap_or_default();
        Self { method, uri, version, headers: Headers::new(), body: None, query_params, path_params: Vec::new() }
    }

    pub(crate) fn from_parts(method: Method, uri: Uri, version: Version, headers: Headers, body: Option<Bytes>) -> Self {
        Self { headers, body, ..Self::new(method, uri, version) }
    }

    pub fn with_header(mut self, name: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The request path without the query string.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Decoded query parameters in the order they appear in the request target.
    pub fn query_params(&self) -> &[(String, String)] {
        &self.query_params
    }

    /// Returns the first query parameter named `name`.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        lookup(&self.query_params, name)
    }

    /// Path parameters captured by [`Routes`](crate::handler::Routes), empty otherwise.
    pub fn path_params(&self) -> &[(String, String)] {
        &self.path_params
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        lookup(&self.path_params, name)
    }

    pub(crate) fn set_path_params(&mut self, params: Vec<(String, String)>) {
        self.path_params = params;
    }
}

fn lookup<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
}

fn decode_query(query: &str) -> Vec<(String, String)> {
    serde_urlencoded::from_str(query).unwrap_or_default()
}
