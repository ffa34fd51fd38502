//! HTTP/1.x wire format.
//!
//! This module parses and serialises HTTP requests, parses upstream response
//! heads, and decides how message bodies are framed. Everything here works
//! on byte buffers; reading from sockets lives in the server.

mod error;
mod framing;
mod headers;
mod method;
mod request;
mod response;
mod version;

// Re-export public items
pub use error::Error;
pub use framing::{decode_body, find_head_end, BodyFraming, BodyProgress, MAX_BODY_SIZE, MAX_HEAD_SIZE};
pub use headers::Headers;
pub use method::Method;
pub use request::{parse_request, parse_request_head, HttpRequest};
pub use response::{parse_response_head, ResponseHead};
pub use version::HttpVersion;
