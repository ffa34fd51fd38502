//! Listeners and the accept loop.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tokio::task::JoinSet;
use tokio_rustls::TlsAcceptor;

use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::session::{serve_connection, ServerContext};
use crate::server::tls::load_tls_acceptor;
use crate::server::transport::{PlainTransport, TlsTransport, Transport};

/// Exit status used when the process is interrupted.
pub const INTERRUPT_EXIT_CODE: i32 = 130;

/// An HTTP server with an optional HTTPS listener.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    context: Arc<ServerContext>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and shared state.
    pub fn new(config: ServerConfig, context: ServerContext) -> Self {
        Self {
            config,
            context: Arc::new(context),
        }
    }

    pub fn context(&self) -> &Arc<ServerContext> {
        &self.context
    }

    /// Log the dispatch table.
    fn display_server_info(&self) {
        info!("Registered handlers:");
        for entry in self.context.router.entries() {
            info!("  {} -> {}", entry.prefix, entry.handler.name());
        }
    }

    /// Exit immediately on Ctrl+C, skipping destructors.
    fn setup_ctrl_c_handler(tasks: &mut JoinSet<()>) {
        tasks.spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, exiting");
                    std::process::exit(INTERRUPT_EXIT_CODE);
                }
                Err(e) => {
                    error!("Error setting up Ctrl+C handler: {e}");
                }
            }
        });
    }

    /// Load the configured certificate, if any.
    fn setup_tls(&self) -> Option<TlsAcceptor> {
        let (cert, key) = self.config.tls_paths()?;
        match load_tls_acceptor(cert, key) {
            Ok(acceptor) => Some(acceptor),
            Err(e) => {
                error!("HTTPS disabled: {e}");
                None
            }
        }
    }

    async fn bind(port: u16, scheme: &str) -> Option<TcpListener> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                info!("Server listening on {scheme}://{addr}");
                Some(listener)
            }
            Err(e) => {
                error!("Failed to bind {scheme} listener on {addr}: {e}");
                None
            }
        }
    }

    /// Bind the configured ports and serve until the process exits.
    ///
    /// A listener that fails to bind is logged and skipped; it is an error
    /// only when nothing could be bound at all.
    pub async fn start(&self) -> Result<(), Error> {
        self.display_server_info();

        let http = Self::bind(self.config.port, "http").await;
        let https = match self.setup_tls() {
            Some(acceptor) => Self::bind(self.config.https_port, "https")
                .await
                .map(|listener| (listener, acceptor)),
            None => None,
        };

        if http.is_none() && https.is_none() {
            return Err(Error::NoListener);
        }

        let mut tasks = JoinSet::new();
        Self::setup_ctrl_c_handler(&mut tasks);
        self.spawn_listeners(http, https, &mut tasks);

        while let Some(res) = tasks.join_next().await {
            if let Err(e) = res {
                error!("Listener task failed: {e}");
            }
        }
        Ok(())
    }

    /// Serve on already bound listeners until they fail.
    pub async fn serve(&self, http: Option<TcpListener>, https: Option<(TcpListener, TlsAcceptor)>) {
        let mut tasks = JoinSet::new();
        self.spawn_listeners(http, https, &mut tasks);
        while let Some(res) = tasks.join_next().await {
            if let Err(e) = res {
                error!("Listener task failed: {e}");
            }
        }
    }

    fn spawn_listeners(
        &self,
        http: Option<TcpListener>,
        https: Option<(TcpListener, TlsAcceptor)>,
        tasks: &mut JoinSet<()>,
    ) {
        if let Some(listener) = http {
            tasks.spawn(accept_loop(listener, Arc::clone(&self.context), PlainTransport));
        }
        if let Some((listener, acceptor)) = https {
            tasks.spawn(accept_loop(listener, Arc::clone(&self.context), move |stream| {
                TlsTransport::new(stream, acceptor.clone())
            }));
        }
    }
}

/// Accept connections forever, one session task per connection.
async fn accept_loop<T, F>(listener: TcpListener, context: Arc<ServerContext>, wrap: F)
where
    T: Transport,
    F: Fn(TcpStream) -> T + Send + 'static,
{
    loop {
        match listener.accept().await {
            Ok((socket, addr)) => {
                let transport = wrap(socket);
                tokio::spawn(serve_connection(transport, addr.to_string(), Arc::clone(&context)));
            }
            Err(e) => match accept_backoff(&e) {
                Some(delay) => {
                    error!("Error accepting connection, retrying in {delay:?}: {e}");
                    tokio::time::sleep(delay).await;
                }
                None => debug!("Accepted connection was lost before setup: {e}"),
            },
        }
    }
}

/// Out of file descriptors, process-wide (`EMFILE`) or system-wide (`ENFILE`).
const FD_EXHAUSTED: [i32; 2] = [24, 23];

/// How long to wait before accepting again after `e`.
///
/// `None` means the failure belonged to one pending connection and the next
/// accept can go ahead at once. Descriptor exhaustion backs off longer so
/// open sessions get a chance to finish.
fn accept_backoff(e: &io::Error) -> Option<Duration> {
    match e.kind() {
        io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::Interrupted => None,
        _ if e.raw_os_error().is_some_and(|code| FD_EXHAUSTED.contains(&code)) => {
            Some(Duration::from_secs(1))
        }
        _ => Some(Duration::from_millis(100)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_backoff() {
        let aborted = io::Error::from(io::ErrorKind::ConnectionAborted);
        assert_eq!(accept_backoff(&aborted), None);
        assert_eq!(accept_backoff(&io::Error::from(io::ErrorKind::Interrupted)), None);

        assert_eq!(accept_backoff(&io::Error::from_raw_os_error(24)), Some(Duration::from_secs(1)));
        assert_eq!(accept_backoff(&io::Error::from_raw_os_error(23)), Some(Duration::from_secs(1)));

        let other = io::Error::new(io::ErrorKind::Other, "boom");
        assert_eq!(accept_backoff(&other), Some(Duration::from_millis(100)));
    }
}
