//! HTTP response types and utilities.

use std::fmt;

use serde::Serialize;

use crate::parser::{Headers, ResponseHead};
use crate::server::error::Error;

/// Body of every synthesised 400 response.
pub const BAD_REQUEST_BODY: &str = "Request was malformed.";
/// Body of every synthesised 404 response.
pub const NOT_FOUND_BODY: &str = "The requested resource was not found.";
/// Body of every synthesised 500 response.
pub const INTERNAL_ERROR_BODY: &str = "An internal error occurred on the server.";

/// Value of the `Server` header on every response built here.
pub const SERVER_NAME: &str = "koko-server";

/// An HTTP status code.
///
/// Any three-digit code can be carried, so responses relayed from an
/// upstream keep their original status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const CREATED: StatusCode = StatusCode(201);
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    pub const MOVED_PERMANENTLY: StatusCode = StatusCode(301);
    pub const FOUND: StatusCode = StatusCode(302);
    pub const NOT_MODIFIED: StatusCode = StatusCode(304);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const FORBIDDEN: StatusCode = StatusCode(403);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const METHOD_NOT_ALLOWED: StatusCode = StatusCode(405);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const NOT_IMPLEMENTED: StatusCode = StatusCode(501);
    pub const BAD_GATEWAY: StatusCode = StatusCode(502);
    pub const SERVICE_UNAVAILABLE: StatusCode = StatusCode(503);

    pub const fn from_u16(code: u16) -> Self {
        StatusCode(code)
    }

    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Whether this is a 301 or 302 redirect.
    pub fn is_redirect(&self) -> bool {
        *self == StatusCode::MOVED_PERMANENTLY || *self == StatusCode::FOUND
    }

    /// Get the reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self.0 {
            100 => "Continue",
            101 => "Switching Protocols",
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            204 => "No Content",
            206 => "Partial Content",
            301 => "Moved Permanently",
            302 => "Found",
            303 => "See Other",
            304 => "Not Modified",
            307 => "Temporary Redirect",
            308 => "Permanent Redirect",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            408 => "Request Timeout",
            413 => "Payload Too Large",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.reason_phrase())
    }
}

/// Represents an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// The HTTP status code
    pub status: StatusCode,
    /// The HTTP headers
    pub headers: Headers,
    /// The response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a new HTTP response with the given status code.
    pub fn new(status: StatusCode) -> Self {
        let mut headers = Headers::new();
        headers.set("Server", SERVER_NAME);

        Self {
            status,
            headers,
            body: Vec::new(),
        }
    }

    /// Build a response from an upstream status line, headers and body.
    pub fn from_upstream(head: ResponseHead, body: Vec<u8>) -> Self {
        Self {
            status: StatusCode::from_u16(head.status),
            headers: head.headers,
            body,
        }
    }

    /// Plain-text response with a fixed body.
    fn canned(status: StatusCode, body: &str) -> Self {
        HttpResponse::new(status)
            .with_content_type("text/plain")
            .with_body_string(body)
    }

    /// The 400 response sent for malformed requests.
    pub fn bad_request() -> Self {
        Self::canned(StatusCode::BAD_REQUEST, BAD_REQUEST_BODY)
    }

    /// The 404 response sent when nothing handles a target.
    pub fn not_found() -> Self {
        Self::canned(StatusCode::NOT_FOUND, NOT_FOUND_BODY)
    }

    /// The 500 response sent when a handler fails.
    pub fn internal_error() -> Self {
        Self::canned(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY)
    }

    /// Set the response body with a string.
    pub fn with_body_string(mut self, body: impl Into<String>) -> Self {
        self.body = body.into().into_bytes();
        self
    }

    /// Set the response body with bytes.
    pub fn with_body_bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Add or replace a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Set the content type.
    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header("Content-Type", content_type)
    }

    /// Set the response body with a JSON value.
    ///
    /// This method serializes the provided value to JSON and sets it as the response body.
    pub fn with_json<T: Serialize>(self, value: &T) -> Result<Self, Error> {
        let json = serde_json::to_vec(value).map_err(Error::JsonError)?;
        Ok(self
            .with_header("Content-Type", "application/json")
            .with_body_bytes(json))
    }

    /// Whether the response asks for the connection to be closed.
    pub fn need_close(&self) -> bool {
        self.headers.has_token("Connection", "close")
    }

    /// Convert the response to bytes.
    ///
    /// `Content-Length` is always derived from the body; stored framing
    /// headers are not written.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {}\r\n", self.status);

        for (name, value) in self.headers.iter() {
            if name.eq_ignore_ascii_case("Content-Length") || name.eq_ignore_ascii_case("Transfer-Encoding") {
                continue;
            }
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));

        // Add the empty line that separates headers from body
        head.push_str("\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}
