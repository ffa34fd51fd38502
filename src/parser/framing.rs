//! Message framing: where the head ends and how long the body is.

use crate::parser::error::Error;
use crate::parser::headers::Headers;

/// Upper bound on the request line plus headers.
pub const MAX_HEAD_SIZE: usize = 64 * 1024;

/// Upper bound on a decoded message body.
pub const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Offset just past the blank line that ends the head, if it has arrived.
pub fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// How the body following a message head is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFraming {
    /// No body at all.
    Empty,
    /// Exactly this many bytes.
    Length(usize),
    /// `Transfer-Encoding: chunked`.
    Chunked,
    /// Everything until the peer closes the connection (responses only).
    UntilEof,
}

impl BodyFraming {
    /// Framing of a request body.
    pub fn for_request(headers: &Headers) -> Result<Self, Error> {
        if headers.has_token("Transfer-Encoding", "chunked") {
            return Ok(BodyFraming::Chunked);
        }
        match headers.get("Content-Length") {
            Some(value) => parse_length(value).map(BodyFraming::Length),
            None => Ok(BodyFraming::Empty),
        }
    }

    /// Framing of a response body.
    ///
    /// Responses to HEAD requests, informational responses, 204 and 304 never
    /// carry a body.
    pub fn for_response(status: u16, headers: &Headers, head_request: bool) -> Result<Self, Error> {
        if head_request || (100..200).contains(&status) || status == 204 || status == 304 {
            return Ok(BodyFraming::Empty);
        }
        if headers.has_token("Transfer-Encoding", "chunked") {
            return Ok(BodyFraming::Chunked);
        }
        match headers.get("Content-Length") {
            Some(value) => parse_length(value).map(BodyFraming::Length),
            None => Ok(BodyFraming::UntilEof),
        }
    }
}

fn parse_length(value: &str) -> Result<usize, Error> {
    let length = value
        .trim()
        .parse::<usize>()
        .map_err(|_| Error::InvalidContentLength(value.to_string()))?;
    if length > MAX_BODY_SIZE {
        return Err(Error::BodyTooLarge);
    }
    Ok(length)
}

/// Result of trying to decode a body from the bytes received so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyProgress {
    /// The body is complete; `consumed` bytes of the buffer belong to it.
    Complete { body: Vec<u8>, consumed: usize },
    /// More bytes are needed.
    Partial,
}

/// Decode a body from `buf`, which starts right after the message head.
///
/// `eof` tells whether the peer has finished sending; it only matters for
/// [`BodyFraming::UntilEof`].
pub fn decode_body(framing: BodyFraming, buf: &[u8], eof: bool) -> Result<BodyProgress, Error> {
    match framing {
        BodyFraming::Empty => Ok(BodyProgress::Complete {
            body: Vec::new(),
            consumed: 0,
        }),
        BodyFraming::Length(length) => {
            if buf.len() < length {
                return Ok(BodyProgress::Partial);
            }
            Ok(BodyProgress::Complete {
                body: buf[..length].to_vec(),
                consumed: length,
            })
        }
        BodyFraming::Chunked => decode_chunked(buf),
        BodyFraming::UntilEof => {
            if buf.len() > MAX_BODY_SIZE {
                return Err(Error::BodyTooLarge);
            }
            if !eof {
                return Ok(BodyProgress::Partial);
            }
            Ok(BodyProgress::Complete {
                body: buf.to_vec(),
                consumed: buf.len(),
            })
        }
    }
}

fn decode_chunked(buf: &[u8]) -> Result<BodyProgress, Error> {
    let mut body = Vec::new();
    let mut pos = 0;

    loop {
        let Some(line_len) = find_crlf(&buf[pos..]) else {
            return Ok(BodyProgress::Partial);
        };
        let line = std::str::from_utf8(&buf[pos..pos + line_len]).map_err(|_| Error::InvalidChunk)?;
        // Chunk extensions after ';' are ignored
        let size_field = line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_field, 16).map_err(|_| Error::InvalidChunk)?;
        pos += line_len + 2;

        if size == 0 {
            // Skip trailers up to the terminating blank line
            loop {
                let Some(trailer_len) = find_crlf(&buf[pos..]) else {
                    return Ok(BodyProgress::Partial);
                };
                pos += trailer_len + 2;
                if trailer_len == 0 {
                    return Ok(BodyProgress::Complete { body, consumed: pos });
                }
            }
        }

        // body.len() never exceeds MAX_BODY_SIZE, so this cannot underflow
        if size > MAX_BODY_SIZE - body.len() {
            return Err(Error::BodyTooLarge);
        }
        let data_end = pos.checked_add(size).ok_or(Error::BodyTooLarge)?;
        let chunk_end = data_end.checked_add(2).ok_or(Error::BodyTooLarge)?;
        if buf.len() < chunk_end {
            return Ok(BodyProgress::Partial);
        }
        body.extend_from_slice(&buf[pos..data_end]);
        if &buf[data_end..chunk_end] != b"\r\n" {
            return Err(Error::InvalidChunk);
        }
        pos = chunk_end;
    }
}
