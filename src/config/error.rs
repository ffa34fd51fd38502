//! Error types for the config parser.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::token::TokenKind;

/// Errors that can occur while reading a config file.
#[derive(Debug, Error)]
pub enum Error {
    /// The config file could not be read.
    #[error("Failed to open config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The token stream does not follow the directive grammar.
    #[error("Bad transition from {last} to {current}")]
    BadTransition { last: TokenKind, current: TokenKind },
}
