//! The request handler interface.

use std::future::Future;
use std::pin::Pin;

use crate::parser::HttpRequest;
use crate::server::{Error, HttpResponse};

/// Type alias for a boxed future that returns a Result<HttpResponse, Error>.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send + 'a>>;

/// Turns a request into a response.
///
/// One handler instance serves every request routed to its prefix, from any
/// number of connections at once.
pub trait RequestHandler: Send + Sync {
    /// The config name this handler was registered under.
    fn name(&self) -> &'static str;

    /// Build the response for `request`.
    ///
    /// An `Err` is answered with a 500 by the session.
    fn handle<'a>(&'a self, request: &'a HttpRequest) -> HandlerFuture<'a>;
}
