//! The parsed configuration tree.

use std::fmt;

use crate::config::token::escape;

/// A single directive: its tokens and, if it opened one, a nested block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigStatement {
    pub tokens: Vec<String>,
    pub child: Option<ConfigBlock>,
}

/// An ordered sequence of directives.
///
/// The root block is the whole file; nested blocks hang off the statement
/// that opened them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigBlock {
    pub statements: Vec<ConfigStatement>,
}

impl ConfigStatement {
    /// The directive name, i.e. the first token.
    pub fn name(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Whether the first token equals `name`.
    pub fn is(&self, name: &str) -> bool {
        self.name() == Some(name)
    }

    fn write_at(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write_indent(f, depth)?;
        for (i, token) in self.tokens.iter().enumerate() {
            if i != 0 {
                f.write_str(" ")?;
            }
            write_token(f, token)?;
        }
        match &self.child {
            Some(child) => {
                f.write_str(" {\n")?;
                child.write_at(f, depth + 1)?;
                write_indent(f, depth)?;
                f.write_str("}\n")
            }
            None => f.write_str(";\n"),
        }
    }
}

impl ConfigBlock {
    fn write_at(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for statement in &self.statements {
            statement.write_at(f, depth)?;
        }
        Ok(())
    }
}

impl fmt::Display for ConfigBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_at(f, 0)
    }
}

fn write_indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str("  ")?;
    }
    Ok(())
}

/// Write a token, quoting it when a bareword would not survive re-parsing.
fn write_token(f: &mut fmt::Formatter<'_>, token: &str) -> fmt::Result {
    let needs_quotes = token.is_empty()
        || token.starts_with('\'')
        || token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ';' | '{' | '}' | '#' | '"'));
    if !needs_quotes {
        return f.write_str(token);
    }

    f.write_str("\"")?;
    for c in token.chars() {
        match escape(c) {
            Some(escaped) => write!(f, "\\{escaped}")?,
            None => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}
