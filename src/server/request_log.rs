//! Process-wide history of served requests.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

/// One served request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestRecord {
    pub target: String,
    pub status: u16,
    pub time: DateTime<Utc>,
}

/// A registered `(prefix, handler name)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerInfo {
    pub prefix: String,
    pub handler: String,
}

/// Append-only log of every dispatched request plus the table of
/// registered handlers.
///
/// Created once when the server starts and shared by every session. The
/// record list is never pruned and grows for the life of the process.
#[derive(Debug, Default)]
pub struct RequestLog {
    records: Mutex<Vec<RequestRecord>>,
    handlers: Mutex<Vec<HandlerInfo>>,
}

impl RequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a served request, stamped with the current time.
    pub fn record(&self, target: impl Into<String>, status: u16) {
        self.records.lock().push(RequestRecord {
            target: target.into(),
            status,
            time: Utc::now(),
        });
    }

    /// Note a handler added to the dispatch table.
    pub fn register_handler(&self, prefix: impl Into<String>, handler: impl Into<String>) {
        self.handlers.lock().push(HandlerInfo {
            prefix: prefix.into(),
            handler: handler.into(),
        });
    }

    /// Copy of every record, oldest first.
    pub fn records(&self) -> Vec<RequestRecord> {
        self.records.lock().clone()
    }

    pub fn handlers(&self) -> Vec<HandlerInfo> {
        self.handlers.lock().clone()
    }

    pub fn total(&self) -> usize {
        self.records.lock().len()
    }
}
