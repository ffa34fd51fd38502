//! nginx-style configuration files.
//!
//! A configuration file is a sequence of directives. Each directive is a list
//! of tokens terminated either by `;` or by a brace-delimited block of nested
//! directives:
//!
//! ```text
//! port 8080;
//! location /static StaticHandler {
//!     root "./public";
//! }
//! ```
//!
//! [`parse_str`] and [`parse_file`] turn that text into a [`ConfigBlock`] tree,
//! and the accessors on [`ConfigBlock`] pull typed values back out of it.

mod accessor;
mod block;
mod error;
mod parser;
mod token;

// Re-export public items
pub use accessor::{Location, Targets};
pub use block::{ConfigBlock, ConfigStatement};
pub use error::Error;
pub use parser::{parse_file, parse_str, Parser};
pub use token::{Token, TokenKind, Tokenizer};
