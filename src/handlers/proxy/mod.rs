//! Reverse proxy handler.
//!
//! Requests under the handler's prefix are forwarded to a fixed upstream
//! with the prefix removed. Redirects that name another host are followed a
//! bounded number of times; redirects to a path on the upstream are sent to
//! the client with the prefix put back. HTML from a non-root mount has its
//! root-relative links rewritten so the browser keeps going through the
//! proxy.

mod location;
mod rewrite;
mod upstream;

use log::{error, info, warn};
use thiserror::Error;

use crate::config::ConfigBlock;
use crate::parser::HttpRequest;
use crate::server::{HandlerFuture, HttpResponse, RequestHandler};

pub use location::{parse_location, RedirectTarget};
pub use rewrite::rewrite_links;
pub use upstream::{TcpUpstream, Upstream, UpstreamFuture, UPSTREAM_TIMEOUT};

/// Redirects followed per request unless `max_redirects` says otherwise.
pub const DEFAULT_MAX_REDIRECTS: usize = 2;

/// Errors raised while forwarding a request.
///
/// None of these reach the client; they are logged and answered with a 500.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("proxy is misconfigured: {0}")]
    InvalidConfig(String),

    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("upstream I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("upstream protocol error: {0}")]
    Protocol(#[from] crate::server::Error),

    #[error("upstream {0} timed out")]
    Timeout(String),

    #[error("more than {0} redirects")]
    TooManyRedirects(usize),
}

/// Upstream destination from the handler's config block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTarget {
    pub host: String,
    pub port: String,
    pub max_redirects: usize,
}

impl ProxyTarget {
    /// Read `dest`, `port` and the optional `max_redirects`.
    pub fn from_config(config: &ConfigBlock) -> Result<Self, ProxyError> {
        let host = config.find_str("dest").unwrap_or_default();
        let port = config.find_str("port").unwrap_or_default();
        if host.is_empty() || port.is_empty() {
            return Err(ProxyError::InvalidConfig("missing dest or port".to_string()));
        }

        let max_redirects = match config.find_str("max_redirects") {
            Some(value) => value.parse().unwrap_or_else(|_| {
                warn!("proxy: malformed max_redirects {value}, using {DEFAULT_MAX_REDIRECTS}");
                DEFAULT_MAX_REDIRECTS
            }),
            None => DEFAULT_MAX_REDIRECTS,
        };

        Ok(Self {
            host: host.to_string(),
            port: port.to_string(),
            max_redirects,
        })
    }
}

/// Forwards requests to a [`ProxyTarget`].
pub struct ProxyHandler<U = TcpUpstream> {
    prefix: String,
    target: Option<ProxyTarget>,
    upstream: U,
}

impl ProxyHandler<TcpUpstream> {
    pub fn new(prefix: impl Into<String>, config: &ConfigBlock) -> Self {
        Self::with_upstream(prefix, config, TcpUpstream::default())
    }
}

impl<U: Upstream> ProxyHandler<U> {
    /// Build a handler that talks to the upstream through `upstream`.
    pub fn with_upstream(prefix: impl Into<String>, config: &ConfigBlock, upstream: U) -> Self {
        let prefix = prefix.into();
        let target = match ProxyTarget::from_config(config) {
            Ok(target) => {
                info!("proxy: {prefix} -> {}:{}", target.host, target.port);
                Some(target)
            }
            Err(e) => {
                error!("proxy: handler for {prefix} disabled: {e}");
                None
            }
        };
        Self {
            prefix,
            target,
            upstream,
        }
    }

    fn is_root(&self) -> bool {
        self.prefix.is_empty() || self.prefix == "/"
    }

    /// Target to request upstream: the inbound target minus the prefix.
    fn upstream_target(&self, target: &str) -> String {
        let stripped = if self.is_root() {
            target
        } else {
            target.strip_prefix(self.prefix.as_str()).unwrap_or(target)
        };
        if stripped.starts_with('/') {
            stripped.to_string()
        } else {
            format!("/{stripped}")
        }
    }

    /// Forward `request` and produce the response for the client.
    pub async fn forward(&self, request: &HttpRequest) -> Result<HttpResponse, ProxyError> {
        let target = self
            .target
            .as_ref()
            .ok_or_else(|| ProxyError::InvalidConfig(format!("no destination for {}", self.prefix)))?;

        let mut outbound = request.clone();
        outbound.target = self.upstream_target(&request.target);
        // Bodies must arrive unencoded so links can be rewritten
        outbound.headers.set("Accept-Encoding", "identity");
        outbound.headers.set("Connection", "close");

        let mut host = target.host.clone();
        let mut port = target.port.clone();
        let mut redirects = 0;

        loop {
            outbound.headers.set("Host", host_header(&host, &port));
            let mut response = self.upstream.send(&host, &port, &outbound).await?;
            strip_hop_headers(&mut response);

            let location = if response.status.is_redirect() {
                response.headers.get("Location").map(str::to_string)
            } else {
                None
            };
            let Some(location) = location else {
                return Ok(self.finish(response));
            };

            let (next_host, next_port, path) = match parse_location(&location) {
                RedirectTarget::Secure => {
                    info!("proxy: not following redirect to {location}");
                    return Ok(response);
                }
                RedirectTarget::Path(path) if host == target.host && port == target.port => {
                    // Keep the client on the proxy
                    if !self.is_root() {
                        response.headers.set("Location", format!("{}{path}", self.prefix));
                    }
                    return Ok(response);
                }
                RedirectTarget::Path(path) => (host.clone(), port.clone(), path),
                RedirectTarget::Host { host, port, path } => (host, port.unwrap_or_else(|| "80".to_string()), path),
            };

            if redirects >= target.max_redirects {
                return Err(ProxyError::TooManyRedirects(target.max_redirects));
            }
            redirects += 1;
            info!("proxy: following redirect {redirects} to {next_host}:{next_port}{path}");
            host = next_host;
            port = next_port;
            outbound.target = path;
        }
    }

    /// Rewrite links in an HTML body served from a non-root mount.
    fn finish(&self, mut response: HttpResponse) -> HttpResponse {
        let is_html = response
            .headers
            .get("Content-Type")
            .is_some_and(|content_type| content_type.contains("text/html"));
        if !is_html || self.is_root() {
            return response;
        }
        match std::str::from_utf8(&response.body) {
            Ok(body) => response.body = rewrite_links(body, &self.prefix).into_bytes(),
            Err(_) => warn!("proxy: HTML body from upstream is not UTF-8, links left as is"),
        }
        response
    }
}

fn host_header(host: &str, port: &str) -> String {
    if port == "80" {
        host.to_string()
    } else {
        format!("{host}:{port}")
    }
}

/// Headers that describe the upstream connection, not the content.
fn strip_hop_headers(response: &mut HttpResponse) {
    for name in ["Connection", "Keep-Alive", "Transfer-Encoding"] {
        response.headers.remove(name);
    }
}

impl<U: Upstream> RequestHandler for ProxyHandler<U> {
    fn name(&self) -> &'static str {
        "ProxyRequestHandler"
    }

    fn handle<'a>(&'a self, request: &'a HttpRequest) -> HandlerFuture<'a> {
        Box::pin(async move {
            match self.forward(request).await {
                Ok(response) => Ok(response),
                Err(e) => {
                    error!("proxy: {} failed for {}: {e}", self.prefix, request.target);
                    Ok(HttpResponse::internal_error())
                }
            }
        })
    }
}
