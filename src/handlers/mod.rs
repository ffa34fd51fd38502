//! Handler registry and the built-in handlers.
//!
//! Handlers are created from `location <prefix> <HandlerName> { ... }`
//! directives. The name picks a constructor from a fixed registry; the
//! block is handed to that constructor as the handler's own config.

mod echo;
mod proxy;
mod static_file;
mod status;
mod tests;

use std::sync::Arc;

use log::{error, info};

use crate::config::{ConfigBlock, ConfigStatement, Targets};
use crate::server::{DispatchEntry, RequestHandler, RequestLog, Router};

pub use echo::{EchoHandler, SleepEchoHandler, SLEEP_ECHO_DELAY};
pub use proxy::{
    parse_location, rewrite_links, ProxyError, ProxyHandler, ProxyTarget, RedirectTarget, TcpUpstream, Upstream,
    UpstreamFuture, DEFAULT_MAX_REDIRECTS, UPSTREAM_TIMEOUT,
};
pub use static_file::{gzip, mime_type, CompressedFileHandler, StaticHandler};
pub use status::{HealthHandler, NotFoundHandler, StatusHandler};

/// Builds a handler from its normalised prefix and config block.
type Constructor = fn(&str, &ConfigBlock, &Arc<RequestLog>) -> Arc<dyn RequestHandler>;

fn make_echo(_: &str, _: &ConfigBlock, _: &Arc<RequestLog>) -> Arc<dyn RequestHandler> {
    Arc::new(EchoHandler)
}

fn make_static(prefix: &str, config: &ConfigBlock, _: &Arc<RequestLog>) -> Arc<dyn RequestHandler> {
    Arc::new(StaticHandler::new(prefix, config))
}

fn make_not_found(_: &str, _: &ConfigBlock, _: &Arc<RequestLog>) -> Arc<dyn RequestHandler> {
    Arc::new(NotFoundHandler)
}

fn make_proxy(prefix: &str, config: &ConfigBlock, _: &Arc<RequestLog>) -> Arc<dyn RequestHandler> {
    Arc::new(ProxyHandler::new(prefix, config))
}

fn make_status(_: &str, _: &ConfigBlock, log: &Arc<RequestLog>) -> Arc<dyn RequestHandler> {
    Arc::new(StatusHandler::new(Arc::clone(log)))
}

fn make_sleep_echo(_: &str, _: &ConfigBlock, _: &Arc<RequestLog>) -> Arc<dyn RequestHandler> {
    Arc::new(SleepEchoHandler::default())
}

fn make_health(_: &str, _: &ConfigBlock, _: &Arc<RequestLog>) -> Arc<dyn RequestHandler> {
    Arc::new(HealthHandler)
}

fn make_compressed(prefix: &str, config: &ConfigBlock, _: &Arc<RequestLog>) -> Arc<dyn RequestHandler> {
    Arc::new(CompressedFileHandler::new(prefix, config))
}

/// Handler names accepted in `location` directives.
static REGISTRY: [(&str, Constructor); 8] = [
    ("EchoHandler", make_echo),
    ("StaticHandler", make_static),
    ("NotFoundHandler", make_not_found),
    ("ProxyRequestHandler", make_proxy),
    ("StatusHandler", make_status),
    ("SleepEchoHandler", make_sleep_echo),
    ("HealthHandler", make_health),
    ("CompressedFileHandler", make_compressed),
];

/// Names of every registered handler type.
pub fn handler_names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(name, _)| *name)
}

/// Drop one trailing slash (unless the prefix is `/`) and make sure the
/// prefix starts with one.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = match prefix.strip_suffix('/') {
        Some(rest) if !rest.is_empty() => rest,
        _ => prefix,
    };
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Construct the handler registered as `name` for `prefix`.
///
/// Unknown names are logged and yield `None`.
pub fn create_handler(
    prefix: &str,
    name: &str,
    config: &ConfigBlock,
    log: &Arc<RequestLog>,
) -> Option<DispatchEntry> {
    let Some((_, constructor)) = REGISTRY.iter().find(|(known, _)| *known == name) else {
        error!("config: unknown handler type {name} for {prefix}, skipping");
        return None;
    };
    let prefix = normalize_prefix(prefix);
    let handler = constructor(&prefix, config, log);
    Some(DispatchEntry { prefix, handler })
}

/// Config block that points a static handler at `path`.
fn root_block(path: &str) -> ConfigBlock {
    ConfigBlock {
        statements: vec![ConfigStatement {
            tokens: vec!["root".to_string(), path.to_string()],
            child: None,
        }],
    }
}

/// Build the dispatch table described by `config`.
///
/// `location` directives are registered in file order, then the legacy
/// `static`/`echo` marker blocks. Every registered handler is also noted in
/// `log` for the status page.
pub fn build_router(config: &ConfigBlock, log: &Arc<RequestLog>) -> Router {
    let mut router = Router::new();
    let mut register = |prefix: &str, name: &str, block: &ConfigBlock| {
        if let Some(entry) = create_handler(prefix, name, block, log) {
            info!("config: registered {name} at {}", entry.prefix);
            log.register_handler(entry.prefix.as_str(), name);
            router.add(entry.prefix, entry.handler);
        }
    };

    for location in config.locations() {
        register(location.prefix, location.handler, location.config);
    }

    let targets = Targets::extract(config);
    for (url, marker) in &targets.routes {
        match marker.as_str() {
            "static" => {
                let path = targets.paths.get(url).map(String::as_str).unwrap_or_default();
                register(url, "StaticHandler", &root_block(path));
            }
            "echo" => register(url, "EchoHandler", &ConfigBlock::default()),
            _ => {}
        }
    }

    router
}
