//! Plain and TLS connection setup.
//!
//! A [`Transport`] is what the acceptor hands to a new session: a freshly
//! accepted socket that still has to be turned into a byte stream. For plain
//! TCP that is a no-op; for TLS it is the handshake.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::server::TlsStream;
use tokio_rustls::TlsAcceptor;

/// Upper bound on a TLS handshake.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// An accepted connection that has not started speaking HTTP yet.
pub trait Transport: Send + 'static {
    /// The stream requests are read from once the transport is ready.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Short name used in log lines.
    fn kind(&self) -> &'static str;

    /// Complete any connection-level setup and yield the HTTP stream.
    fn handshake(self) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// Unencrypted TCP.
#[derive(Debug)]
pub struct PlainTransport(pub TcpStream);

impl Transport for PlainTransport {
    type Stream = TcpStream;

    fn kind(&self) -> &'static str {
        "tcp"
    }

    async fn handshake(self) -> io::Result<TcpStream> {
        Ok(self.0)
    }
}

/// TCP wrapped in TLS by a shared acceptor.
pub struct TlsTransport {
    stream: TcpStream,
    acceptor: TlsAcceptor,
    timeout: Duration,
}

impl TlsTransport {
    pub fn new(stream: TcpStream, acceptor: TlsAcceptor) -> Self {
        Self {
            stream,
            acceptor,
            timeout: HANDSHAKE_TIMEOUT,
        }
    }
}

impl Transport for TlsTransport {
    type Stream = TlsStream<TcpStream>;

    fn kind(&self) -> &'static str {
        "tls"
    }

    async fn handshake(self) -> io::Result<Self::Stream> {
        match tokio::time::timeout(self.timeout, self.acceptor.accept(self.stream)).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "TLS handshake timed out")),
        }
    }
}
