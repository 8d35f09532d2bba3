//! HTTP request body handling.
//!
//! Request bodies are fully buffered: [`LengthDecoder`] waits until the whole
//! `Content-Length` payload is available and yields it as a single `Bytes`.
//! Chunked request bodies are rejected while parsing the header section.

mod length_decoder;

pub use length_decoder::LengthDecoder;
