//! Per-connection request/response loop.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::parser::HttpRequest;
use crate::server::error::Error;
use crate::server::request_log::RequestLog;
use crate::server::response::HttpResponse;
use crate::server::router::Router;
use crate::server::transport::Transport;
use crate::server::wire::{read_request, ReadOutcome};

/// How long a connection may sit idle waiting for the next request.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// State shared by every session of a server instance.
#[derive(Debug)]
pub struct ServerContext {
    pub router: Router,
    pub log: Arc<RequestLog>,
}

impl ServerContext {
    pub fn new(router: Router, log: Arc<RequestLog>) -> Self {
        Self { router, log }
    }
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Handshaking,
    Reading,
    Dispatching,
    Writing,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Response for one request and whether the connection must close after it.
struct Dispatched {
    response: HttpResponse,
    close: bool,
}

/// One client connection.
///
/// A session is driven by a single task, so its reads and writes never
/// overlap. Different sessions run in parallel on the runtime's workers.
pub struct Session<S> {
    stream: S,
    peer: String,
    context: Arc<ServerContext>,
    buffer: Vec<u8>,
    state: SessionState,
    idle_timeout: Duration,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, peer: impl Into<String>, context: Arc<ServerContext>) -> Self {
        Self {
            stream,
            peer: peer.into(),
            context,
            buffer: Vec::new(),
            state: SessionState::Idle,
            idle_timeout: IDLE_TIMEOUT,
        }
    }

    /// Override the idle read deadline.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        debug!("session {}: {} -> {}", self.peer, self.state, next);
        self.state = next;
    }

    /// Serve requests until the connection closes.
    ///
    /// Returns an error only when the socket itself fails; protocol problems
    /// are answered on the wire.
    pub async fn run(mut self) -> Result<(), Error> {
        let result = self.serve().await;
        self.transition(SessionState::Closed);
        // The peer may already be gone
        if let Err(e) = self.stream.shutdown().await {
            debug!("session {}: shutdown: {e}", self.peer);
        }
        result
    }

    async fn serve(&mut self) -> Result<(), Error> {
        loop {
            self.transition(SessionState::Reading);
            let read = tokio::time::timeout(self.idle_timeout, read_request(&mut self.stream, &mut self.buffer)).await;

            let dispatched = match read {
                Err(_) => {
                    debug!("session {}: idle timeout", self.peer);
                    return Ok(());
                }
                Ok(Ok(ReadOutcome::Closed)) => {
                    debug!("session {}: closed by peer", self.peer);
                    return Ok(());
                }
                Ok(Ok(ReadOutcome::Request(request))) => {
                    self.transition(SessionState::Dispatching);
                    self.dispatch(request).await
                }
                Ok(Err(Error::IoError(e))) => {
                    warn!("session {}: read failed: {e}", self.peer);
                    return Ok(());
                }
                Ok(Err(e)) => {
                    warn!("session {}: malformed request: {e}", self.peer);
                    Dispatched {
                        response: HttpResponse::bad_request(),
                        close: true,
                    }
                }
            };

            self.transition(SessionState::Writing);
            let mut response = dispatched.response;
            if dispatched.close {
                response.headers.set("Connection", "close");
            }
            self.stream.write_all(&response.to_bytes()).await?;
            self.stream.flush().await?;

            if dispatched.close {
                return Ok(());
            }
        }
    }

    /// Route `request` and run its handler.
    async fn dispatch(&mut self, request: HttpRequest) -> Dispatched {
        let target = request.target.clone();
        let keep_alive = request.keep_alive();

        let (response, handler_name) = match self.context.router.resolve(&target) {
            Some(entry) => {
                let handler = Arc::clone(&entry.handler);
                let name = handler.name();
                // A panicking handler only takes down its own task
                let outcome = tokio::spawn(async move { handler.handle(&request).await }).await;
                let response = match outcome {
                    Ok(Ok(response)) => response,
                    Ok(Err(e)) => {
                        error!("session {}: {name} failed for {target}: {e}", self.peer);
                        HttpResponse::internal_error()
                    }
                    Err(e) => {
                        error!("session {}: {name} panicked for {target}: {e}", self.peer);
                        HttpResponse::internal_error()
                    }
                };
                (response, Some(name))
            }
            None => (HttpResponse::not_found(), None),
        };

        let status = response.status.as_u16();
        self.context.log.record(target.as_str(), status);
        info!(
            "metrics: peer={} target={} status={} handler={}",
            self.peer,
            target,
            status,
            handler_name.unwrap_or("none")
        );

        let close = !keep_alive || response.need_close() || handler_name.is_none();
        Dispatched { response, close }
    }
}

/// Run a freshly accepted connection to completion.
///
/// Handshake failures end the connection without an HTTP response.
pub async fn serve_connection<T: Transport>(transport: T, peer: String, context: Arc<ServerContext>) {
    let kind = transport.kind();
    let opened = Instant::now();
    debug!("session {peer}: {} -> {}", SessionState::Idle, SessionState::Handshaking);

    let stream = match transport.handshake().await {
        Ok(stream) => stream,
        Err(e) => {
            warn!("session {peer}: {kind} handshake failed: {e}");
            return;
        }
    };

    if let Err(e) = Session::new(stream, peer.as_str(), context).run().await {
        warn!("session {peer}: {e}");
    }

    if kind == "tls" {
        info!("metrics: tls session {peer} alive for {:?}", opened.elapsed());
    }
}
