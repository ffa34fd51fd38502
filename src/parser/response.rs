//! Parsing of upstream response heads.

use crate::parser::error::Error;
use crate::parser::headers::Headers;
use crate::parser::request::parse_header_lines;
use crate::parser::version::HttpVersion;

/// Status line and headers of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub version: HttpVersion,
    pub status: u16,
    pub reason: String,
    pub headers: Headers,
}

/// Parse a response head (status line and headers, without the body).
pub fn parse_response_head(input: &[u8]) -> Result<ResponseHead, Error> {
    let input_str = std::str::from_utf8(input)
        .map_err(|_| Error::MalformedStatusLine("Invalid UTF-8".to_string()))?;
    let mut lines = input_str.lines();

    let status_line = lines.next().ok_or(Error::Incomplete)?;
    let mut parts = status_line.splitn(3, ' ');
    let version = parts
        .next()
        .ok_or_else(|| Error::MalformedStatusLine(status_line.to_string()))?
        .parse::<HttpVersion>()?;
    let status = parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .filter(|code| (100..1000).contains(code))
        .ok_or_else(|| Error::MalformedStatusLine(status_line.to_string()))?;
    let reason = parts.next().unwrap_or_default().trim().to_string();

    let headers = parse_header_lines(lines)?;

    Ok(ResponseHead {
        version,
        status,
        reason,
        headers,
    })
}
