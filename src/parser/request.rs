//! HTTP request parsing and representation.

use std::str::FromStr;

use crate::parser::error::Error;
use crate::parser::framing::{decode_body, find_head_end, BodyFraming, BodyProgress};
use crate::parser::headers::Headers;
use crate::parser::method::Method;
use crate::parser::version::HttpVersion;

/// Represents an HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request target as sent by the client, query string included
    pub target: String,
    /// The HTTP version
    pub version: HttpVersion,
    /// The HTTP headers, in wire order
    pub headers: Headers,
    /// The decoded request body
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Create a new HTTP request with an empty body.
    pub fn new(method: Method, target: impl Into<String>, version: HttpVersion, headers: Headers) -> Self {
        Self {
            method,
            target: target.into(),
            version,
            headers,
            body: Vec::new(),
        }
    }

    /// Create a new HTTP request with a body.
    pub fn with_body(
        method: Method,
        target: impl Into<String>,
        version: HttpVersion,
        headers: Headers,
        body: Vec<u8>,
    ) -> Self {
        let mut request = Self::new(method, target, version, headers);
        request.body = body;
        request
    }

    /// Get a header value (case-insensitive).
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains(name)
    }

    /// The target without its query string.
    pub fn path(&self) -> &str {
        match self.target.split_once('?') {
            Some((path, _)) => path,
            None => &self.target,
        }
    }

    /// Whether the client is willing to send another request on this
    /// connection.
    ///
    /// HTTP/1.1 connections persist unless `Connection: close` is sent;
    /// HTTP/1.0 connections close unless `Connection: keep-alive` is sent.
    pub fn keep_alive(&self) -> bool {
        match self.version {
            HttpVersion::Http11 => !self.headers.has_token("Connection", "close"),
            HttpVersion::Http10 => self.headers.has_token("Connection", "keep-alive"),
        }
    }

    /// Serialise the request in HTTP/1.x wire format.
    ///
    /// The body is always sent with an explicit `Content-Length`; any
    /// framing headers carried over from parsing are replaced.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("{} {} {}\r\n", self.method, self.target, self.version);
        for (name, value) in self.headers.iter() {
            if name.eq_ignore_ascii_case("Content-Length") || name.eq_ignore_ascii_case("Transfer-Encoding") {
                continue;
            }
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        if !self.body.is_empty() {
            head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        }
        head.push_str("\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// Parse header lines up to the first empty line.
pub(crate) fn parse_header_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Result<Headers, Error> {
    let mut headers = Headers::new();
    for line in lines {
        // Empty line indicates the end of headers
        if line.is_empty() {
            break;
        }

        let (name, value) = line.split_once(':').ok_or(Error::InvalidHeaderFormat)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidHeaderFormat);
        }
        headers.append(name, value.trim());
    }
    Ok(headers)
}

/// Parse the request line and headers of an HTTP request.
///
/// The returned request has an empty body; use [`BodyFraming::for_request`]
/// on its headers to find out how much body follows.
pub fn parse_request_head(input: &[u8]) -> Result<HttpRequest, Error> {
    let input_str = std::str::from_utf8(input)
        .map_err(|_| Error::MalformedRequestLine("Invalid UTF-8".to_string()))?;

    let mut lines = input_str.lines();

    let request_line = lines.next().ok_or(Error::EmptyRequest)?;
    if request_line.trim().is_empty() {
        return Err(Error::EmptyRequest);
    }

    // Split the request line into method, target, and version
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(Error::MalformedRequestLine(request_line.to_string()));
    }

    let method = Method::from_str(parts[0])?;

    let target = parts[1];
    if target.is_empty() {
        return Err(Error::InvalidPath);
    }

    let version = HttpVersion::from_str(parts[2])?;

    let headers = parse_header_lines(lines)?;

    // Check for required headers
    if version == HttpVersion::Http11 && !headers.contains("Host") {
        return Err(Error::MissingHeader("Host".to_string()));
    }

    Ok(HttpRequest::new(method, target, version, headers))
}

/// Parse a complete HTTP request, body included, from a byte slice.
///
/// A missing blank line after the headers is tolerated; a body shorter than
/// its framing announces is [`Error::Incomplete`].
pub fn parse_request(input: &[u8]) -> Result<HttpRequest, Error> {
    let head_end = find_head_end(input).unwrap_or(input.len());
    let mut request = parse_request_head(&input[..head_end])?;

    let framing = BodyFraming::for_request(&request.headers)?;
    match decode_body(framing, &input[head_end..], true)? {
        BodyProgress::Complete { body, .. } => request.body = body,
        BodyProgress::Partial => return Err(Error::Incomplete),
    }

    Ok(request)
}
