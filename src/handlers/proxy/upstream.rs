//! Talking to the upstream server.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::time::Duration;

use log::{trace, warn};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::handlers::proxy::ProxyError;
use crate::parser::{HttpRequest, Method};
use crate::server::{read_response, HttpResponse};

/// Upper bound on one upstream exchange, connect included.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Boxed future returned by [`Upstream::send`].
pub type UpstreamFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, ProxyError>> + Send + 'a>>;

/// Performs one request/response exchange with a remote server.
pub trait Upstream: Send + Sync {
    fn send<'a>(&'a self, host: &'a str, port: &'a str, request: &'a HttpRequest) -> UpstreamFuture<'a>;
}

/// One fresh TCP connection per exchange; nothing is pooled.
#[derive(Debug, Clone)]
pub struct TcpUpstream {
    timeout: Duration,
}

impl TcpUpstream {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn exchange(host: &str, port: &str, request: &HttpRequest) -> Result<HttpResponse, ProxyError> {
        let addr = format!("{host}:{port}");
        trace!("proxy: connecting to {addr}");
        let mut stream = TcpStream::connect(addr.as_str())
            .await
            .map_err(|source| ProxyError::Connect { addr: addr.clone(), source })?;

        stream.write_all(&request.to_bytes()).await?;
        let (head, body) = read_response(&mut stream, request.method == Method::HEAD).await?;

        if let Err(e) = stream.shutdown().await {
            // The upstream often closes first
            if e.kind() != io::ErrorKind::NotConnected {
                warn!("proxy: shutting down connection to {addr}: {e}");
            }
        }

        trace!("proxy: {addr} answered {}", head.status);
        Ok(HttpResponse::from_upstream(head, body))
    }
}

impl Default for TcpUpstream {
    fn default() -> Self {
        Self::new(UPSTREAM_TIMEOUT)
    }
}

impl Upstream for TcpUpstream {
    fn send<'a>(&'a self, host: &'a str, port: &'a str, request: &'a HttpRequest) -> UpstreamFuture<'a> {
        Box::pin(async move {
            match tokio::time::timeout(self.timeout, Self::exchange(host, port, request)).await {
                Ok(result) => result,
                Err(_) => Err(ProxyError::Timeout(format!("{host}:{port}"))),
            }
        })
    }
}
