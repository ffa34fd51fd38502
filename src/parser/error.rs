//! Error types for the HTTP parser.

use thiserror::Error;

/// Errors that can occur while parsing HTTP messages.
#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP method in the request is not supported.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The request target is invalid or missing.
    #[error("Invalid HTTP path")]
    InvalidPath,

    /// The request line is malformed (wrong format or missing components).
    #[error("Malformed request line: {0}")]
    MalformedRequestLine(String),

    /// The status line of a response is malformed.
    #[error("Malformed status line: {0}")]
    MalformedStatusLine(String),

    /// The HTTP version in the message is not supported.
    #[error("Invalid HTTP version: {0}")]
    InvalidVersion(String),

    /// A required header is missing from the request.
    #[error("Required header is missing: {0}")]
    MissingHeader(String),

    /// A header in the message has an invalid format.
    #[error("Invalid header format")]
    InvalidHeaderFormat,

    /// The Content-Length header is not a valid length.
    #[error("Invalid Content-Length: {0}")]
    InvalidContentLength(String),

    /// A chunk of a chunked body is malformed.
    #[error("Invalid chunked encoding")]
    InvalidChunk,

    /// The header section exceeds the size limit.
    #[error("Header section too large")]
    HeadersTooLarge,

    /// The body exceeds the size limit.
    #[error("Body too large")]
    BodyTooLarge,

    /// The input ended before the message was complete.
    #[error("Incomplete message")]
    Incomplete,

    /// The request is empty.
    #[error("Empty request")]
    EmptyRequest,
}
