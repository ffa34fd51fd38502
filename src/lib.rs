//! A multi-threaded HTTP/HTTPS server configured by an nginx-style file.
//!
//! Requests are dispatched to handlers by longest matching URL prefix.
//! Handlers are picked by name in `location` directives and receive the
//! directive's block as their own configuration.
//!
//! # Features
//!
//! - Config tokenizer, parser and typed accessors
//! - HTTP/1.x request parsing with `Content-Length` and chunked bodies
//! - Keep-alive sessions over plain TCP and TLS
//! - Echo, static file, gzip, status, health and reverse proxy handlers
//!
//! # Examples
//!
//! ## Reading a config
//!
//! ```
//! use koko_server::config::parse_str;
//!
//! let config = parse_str(
//!     "port 8080;\n\
//!      location /static StaticHandler { root ./files; }\n",
//! )
//! .unwrap();
//!
//! assert_eq!(config.get_port(), 8080);
//! let locations = config.locations();
//! assert_eq!(locations[0].handler, "StaticHandler");
//! assert_eq!(locations[0].config.get_str("root"), "./files");
//! ```
//!
//! ## Building the dispatch table
//!
//! ```
//! use std::sync::Arc;
//!
//! use koko_server::config::parse_str;
//! use koko_server::handlers::build_router;
//! use koko_server::server::RequestLog;
//!
//! let config = parse_str("location /echo EchoHandler {}\nlocation / NotFoundHandler {}").unwrap();
//! let router = build_router(&config, &Arc::new(RequestLog::new()));
//!
//! let entry = router.resolve("/echo/hello").unwrap();
//! assert_eq!(entry.prefix, "/echo");
//! assert_eq!(router.resolve("/other").unwrap().handler.name(), "NotFoundHandler");
//! ```
//!
//! ## Parsing a request
//!
//! ```
//! use koko_server::{parse_request, Method, ParserError};
//!
//! let request = parse_request(b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n").unwrap();
//! assert_eq!(request.method, Method::GET);
//! assert_eq!(request.get_header("host"), Some("example.com"));
//!
//! let missing_host = parse_request(b"GET / HTTP/1.1\r\n\r\n");
//! assert!(matches!(missing_host, Err(ParserError::MissingHeader(_))));
//! ```

pub mod config;
pub mod handlers;
pub mod parser;
pub mod server;

// Re-export commonly used items for convenience
pub use config::{parse_file, parse_str, ConfigBlock};
pub use handlers::build_router;
pub use parser::{parse_request, Error as ParserError, HttpRequest, HttpVersion, Method};
pub use server::{
    Error as ServerError, HttpResponse, HttpServer, RequestHandler, RequestLog, ServerConfig, ServerContext,
    StatusCode,
};
