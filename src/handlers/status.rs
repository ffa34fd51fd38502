//! Diagnostics handlers: status page, health check and the fixed 404.

use std::sync::Arc;

use serde::Serialize;

use crate::parser::HttpRequest;
use crate::server::{
    HandlerFuture, HandlerInfo, HttpResponse, RequestHandler, RequestLog, RequestRecord, StatusCode,
};

/// Always answers with the standard 404.
#[derive(Debug, Default)]
pub struct NotFoundHandler;

impl RequestHandler for NotFoundHandler {
    fn name(&self) -> &'static str {
        "NotFoundHandler"
    }

    fn handle<'a>(&'a self, _request: &'a HttpRequest) -> HandlerFuture<'a> {
        Box::pin(async move { Ok(HttpResponse::not_found()) })
    }
}

/// Liveness probe.
#[derive(Debug, Default)]
pub struct HealthHandler;

impl RequestHandler for HealthHandler {
    fn name(&self) -> &'static str {
        "HealthHandler"
    }

    fn handle<'a>(&'a self, _request: &'a HttpRequest) -> HandlerFuture<'a> {
        Box::pin(async move {
            Ok(HttpResponse::new(StatusCode::OK)
                .with_content_type("text/plain")
                .with_body_string("OK"))
        })
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    total_requests: usize,
    requests: Vec<RequestRecord>,
    handlers: Vec<HandlerInfo>,
}

/// Reports every request served so far and the registered handlers.
///
/// The request being answered is not in the log yet, so it is added to the
/// report as a 200. Clients sending `Accept: application/json` get JSON,
/// everyone else an HTML page.
#[derive(Debug)]
pub struct StatusHandler {
    log: Arc<RequestLog>,
}

impl StatusHandler {
    pub fn new(log: Arc<RequestLog>) -> Self {
        Self { log }
    }

    fn report(&self, request: &HttpRequest) -> StatusReport {
        let mut requests = self.log.records();
        requests.push(RequestRecord {
            target: request.target.clone(),
            status: StatusCode::OK.as_u16(),
            time: chrono::Utc::now(),
        });
        requests.reverse();

        StatusReport {
            total_requests: requests.len(),
            requests,
            handlers: self.log.handlers(),
        }
    }
}

impl RequestHandler for StatusHandler {
    fn name(&self) -> &'static str {
        "StatusHandler"
    }

    fn handle<'a>(&'a self, request: &'a HttpRequest) -> HandlerFuture<'a> {
        Box::pin(async move {
            let report = self.report(request);
            let wants_json = request
                .get_header("Accept")
                .is_some_and(|accept| accept.contains("application/json"));

            if wants_json {
                return HttpResponse::new(StatusCode::OK).with_json(&report);
            }
            Ok(HttpResponse::new(StatusCode::OK)
                .with_content_type("text/html")
                .with_body_string(render_html(&report)))
        })
    }
}

fn render_html(report: &StatusReport) -> String {
    let mut requests = String::new();
    for record in &report.requests {
        requests.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&record.target),
            record.status,
            record.time.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }

    let mut handlers = String::new();
    for info in &report.handlers {
        handlers.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>",
            escape_html(&info.prefix),
            escape_html(&info.handler)
        ));
    }

    format!(
        "<html><head><title>Koko Status Report</title></head><body>\
         <h1>Koko Server Status Report</h1>\
         <h3>Total Requests Received: {}</h3>\
         <h3>Received Requests</h3>\
         <table><tr><th>Location</th><th>Response Code</th><th>Time</th></tr>{requests}</table>\
         <h2>Registered Handlers</h2>\
         <table><tr><th>URL Prefix</th><th>Handler Type</th></tr>{handlers}</table>\
         </body></html>",
        report.total_requests
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}
