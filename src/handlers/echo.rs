//! Handlers that send the request back to the client.

use std::time::Duration;

use crate::parser::HttpRequest;
use crate::server::{HandlerFuture, HttpResponse, RequestHandler, StatusCode};

/// How long [`SleepEchoHandler`] waits before answering.
pub const SLEEP_ECHO_DELAY: Duration = Duration::from_secs(3);

fn echo(request: &HttpRequest) -> HttpResponse {
    HttpResponse::new(StatusCode::OK)
        .with_content_type("text/plain")
        .with_body_bytes(request.to_bytes())
}

/// Responds with the serialised request.
#[derive(Debug, Default)]
pub struct EchoHandler;

impl RequestHandler for EchoHandler {
    fn name(&self) -> &'static str {
        "EchoHandler"
    }

    fn handle<'a>(&'a self, request: &'a HttpRequest) -> HandlerFuture<'a> {
        Box::pin(async move { Ok(echo(request)) })
    }
}

/// Echoes after a fixed delay. Used to check that slow requests do not
/// hold up others.
#[derive(Debug)]
pub struct SleepEchoHandler {
    delay: Duration,
}

impl SleepEchoHandler {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SleepEchoHandler {
    fn default() -> Self {
        Self::new(SLEEP_ECHO_DELAY)
    }
}

impl RequestHandler for SleepEchoHandler {
    fn name(&self) -> &'static str {
        "SleepEchoHandler"
    }

    fn handle<'a>(&'a self, request: &'a HttpRequest) -> HandlerFuture<'a> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            Ok(echo(request))
        })
    }
}
