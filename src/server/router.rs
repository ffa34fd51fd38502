//! Longest-prefix dispatch table.

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::server::handler::RequestHandler;

/// One `(prefix, handler)` pair of the dispatch table.
#[derive(Clone)]
pub struct DispatchEntry {
    pub prefix: String,
    pub handler: Arc<dyn RequestHandler>,
}

impl fmt::Debug for DispatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchEntry")
            .field("prefix", &self.prefix)
            .field("handler", &self.handler.name())
            .finish()
    }
}

/// Maps request targets to handlers.
///
/// Built once at startup and read-only afterwards, so lookups from many
/// connections need no locking.
#[derive(Debug, Clone, Default)]
pub struct Router {
    entries: Vec<DispatchEntry>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `prefix`.
    pub fn add(&mut self, prefix: impl Into<String>, handler: Arc<dyn RequestHandler>) {
        self.entries.push(DispatchEntry {
            prefix: prefix.into(),
            handler,
        });
    }

    pub fn entries(&self) -> &[DispatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the entry whose prefix is the longest segment-aligned match for
    /// `target`.
    ///
    /// A query string after the last `/` is ignored. The root prefix `/`
    /// matches everything. When two prefixes are equally long the one
    /// registered first wins.
    pub fn resolve(&self, target: &str) -> Option<&DispatchEntry> {
        let mut path = strip_query(target).to_string();
        path.push('/');

        let mut best: Option<&DispatchEntry> = None;
        for entry in &self.entries {
            if !matches_prefix(&path, &entry.prefix) {
                continue;
            }
            if best.map_or(true, |b| entry.prefix.len() > b.prefix.len()) {
                best = Some(entry);
            }
        }

        match best {
            Some(entry) => debug!("router: {target} -> {} ({})", entry.prefix, entry.handler.name()),
            None => debug!("router: no handler for {target}"),
        }
        best
    }
}

/// Drop a `?query` suffix that follows the final `/`.
fn strip_query(target: &str) -> &str {
    let last_slash = target.rfind('/').unwrap_or(0);
    match target[last_slash..].find('?') {
        Some(offset) => &target[..last_slash + offset],
        None => target,
    }
}

/// `path` carries a trailing `/`, so a match must end on a segment boundary.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    if prefix.is_empty() || !path.starts_with(prefix) {
        return false;
    }
    prefix.ends_with('/') || path.as_bytes().get(prefix.len()) == Some(&b'/')
}
