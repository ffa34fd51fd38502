//! HTTP/HTTPS server.
//!
//! This module owns everything between an accepted socket and a handler:
//! the transports, the per-connection session loop, the dispatch table and
//! the request log shared by all connections.

mod config;
mod error;
mod handler;
mod http_server;
mod request_log;
mod response;
mod router;
mod session;
mod tls;
mod transport;
mod wire;

// Re-export public items
pub use config::ServerConfig;
pub use error::Error;
pub use handler::{HandlerFuture, RequestHandler};
pub use http_server::{HttpServer, INTERRUPT_EXIT_CODE};
pub use request_log::{HandlerInfo, RequestLog, RequestRecord};
pub use response::{
    HttpResponse, StatusCode, BAD_REQUEST_BODY, INTERNAL_ERROR_BODY, NOT_FOUND_BODY, SERVER_NAME,
};
pub use router::{DispatchEntry, Router};
pub use session::{serve_connection, ServerContext, Session, SessionState, IDLE_TIMEOUT};
pub use tls::load_tls_acceptor;
pub use transport::{PlainTransport, TlsTransport, Transport, HANDSHAKE_TIMEOUT};
pub use wire::{read_request, read_response, ReadOutcome};
