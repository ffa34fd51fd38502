//! Reading whole HTTP messages off an async stream.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::parser::{
    decode_body, find_head_end, parse_request_head, parse_response_head, BodyFraming, BodyProgress,
    Error as ParserError, HttpRequest, ResponseHead, MAX_HEAD_SIZE,
};
use crate::server::error::Error;

const READ_CHUNK: usize = 8192;

/// What a read from the client produced.
#[derive(Debug)]
pub enum ReadOutcome {
    /// A complete request.
    Request(HttpRequest),
    /// The peer closed the connection between requests.
    Closed,
}

/// Read one request from `stream`.
///
/// `buf` carries bytes across calls so that pipelined requests are not
/// lost. A malformed request yields [`Error::ParseError`]; a failing socket
/// yields [`Error::IoError`].
pub async fn read_request<S>(stream: &mut S, buf: &mut Vec<u8>) -> Result<ReadOutcome, Error>
where
    S: AsyncRead + Unpin,
{
    let mut chunk = vec![0u8; READ_CHUNK];

    let head_end = loop {
        // Stray line breaks between requests are allowed
        let blank = buf.iter().take_while(|b| matches!(b, b'\r' | b'\n')).count();
        buf.drain(..blank);

        if let Some(end) = find_head_end(buf) {
            break end;
        }
        if buf.len() > MAX_HEAD_SIZE {
            return Err(ParserError::HeadersTooLarge.into());
        }

        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            if buf.is_empty() {
                return Ok(ReadOutcome::Closed);
            }
            // The peer is done sending; whatever arrived is all there is
            let request = parse_request_head(buf)?;
            buf.clear();
            if BodyFraming::for_request(&request.headers)? != BodyFraming::Empty {
                return Err(ParserError::Incomplete.into());
            }
            return Ok(ReadOutcome::Request(request));
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    if head_end > MAX_HEAD_SIZE {
        return Err(ParserError::HeadersTooLarge.into());
    }

    let mut request = parse_request_head(&buf[..head_end])?;
    let framing = BodyFraming::for_request(&request.headers)?;

    loop {
        match decode_body(framing, &buf[head_end..], false)? {
            BodyProgress::Complete { body, consumed } => {
                request.body = body;
                buf.drain(..head_end + consumed);
                return Ok(ReadOutcome::Request(request));
            }
            BodyProgress::Partial => {
                let n = stream.read(&mut chunk).await?;
                if n == 0 {
                    return Err(ParserError::Incomplete.into());
                }
                buf.extend_from_slice(&chunk[..n]);
            }
        }
    }
}

/// Read a full response from an upstream server.
///
/// `head_request` must be set when the request was `HEAD`, since such
/// responses announce a length but carry no body.
pub async fn read_response<S>(stream: &mut S, head_request: bool) -> Result<(ResponseHead, Vec<u8>), Error>
where
    S: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK];
    let mut eof = false;

    let head_end = loop {
        if let Some(end) = find_head_end(&buf) {
            break end;
        }
        if buf.len() > MAX_HEAD_SIZE {
            return Err(ParserError::HeadersTooLarge.into());
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(ParserError::Incomplete.into());
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = parse_response_head(&buf[..head_end])?;
    let framing = BodyFraming::for_response(head.status, &head.headers, head_request)?;

    loop {
        match decode_body(framing, &buf[head_end..], eof)? {
            BodyProgress::Complete { body, .. } => return Ok((head, body)),
            BodyProgress::Partial if eof => return Err(ParserError::Incomplete.into()),
            BodyProgress::Partial => {
                let n = stream.read(&mut chunk).await?;
                if n == 0 {
                    eof = true;
                } else {
                    buf.extend_from_slice(&chunk[..n]);
                }
            }
        }
    }
}
