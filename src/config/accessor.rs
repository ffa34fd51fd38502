//! Typed lookups over a parsed config tree.

use std::collections::HashMap;

use log::{error, trace, warn};

use crate::config::block::{ConfigBlock, ConfigStatement};

static EMPTY_BLOCK: ConfigBlock = ConfigBlock {
    statements: Vec::new(),
};

/// Default values for numeric fields that are absent or malformed.
fn default_num(field: &str) -> Option<i64> {
    match field {
        "port" => Some(80),
        "httpsPort" => Some(443),
        "threads" => Some(4),
        "keep-alive" => Some(0),
        _ => None,
    }
}

/// Value of a `<field> <value>;` statement, if `statement` is one.
fn field_value<'a>(field: &str, statement: &'a ConfigStatement) -> Option<&'a str> {
    if !statement.is(field) {
        return None;
    }
    if statement.tokens.len() != 2 {
        error!(
            "config: found a malformed {field} line with {} tokens",
            statement.tokens.len()
        );
        return None;
    }
    Some(statement.tokens[1].as_str())
}

impl ConfigBlock {
    /// Statements of every top-level `server { ... }` block.
    fn server_statements(&self) -> impl Iterator<Item = &ConfigStatement> {
        self.statements
            .iter()
            .filter(|statement| statement.is("server"))
            .filter_map(|statement| statement.child.as_ref())
            .flat_map(|block| block.statements.iter())
    }

    /// Find a `<field> <value>;` directive.
    ///
    /// Top-level statements are scanned first, then the statements one level
    /// inside any `server` block.
    pub fn find_str(&self, field: &str) -> Option<&str> {
        let found = self
            .statements
            .iter()
            .find_map(|statement| field_value(field, statement))
            .or_else(|| {
                self.server_statements()
                    .find_map(|statement| field_value(field, statement))
            });
        if let Some(value) = found {
            trace!("config: extracted {field} = {value}");
        }
        found
    }

    /// String value of `field`, or an empty string when it is absent.
    pub fn get_str(&self, field: &str) -> String {
        match self.find_str(field) {
            Some(value) => value.to_string(),
            None => {
                trace!("config: no value found for field: {field}");
                String::new()
            }
        }
    }

    /// Numeric value of `field`.
    ///
    /// Falls back to the field's registered default when the field is absent
    /// or not a number, and to 0 when no default exists.
    pub fn get_num(&self, field: &str) -> i64 {
        if let Some(value) = self.find_str(field) {
            match value.parse::<i64>() {
                Ok(num) => return num,
                Err(e) => warn!("config: malformed number for {field}: {value} ({e})"),
            }
        }
        default_num(field).unwrap_or_else(|| {
            trace!("config: no default number for field: {field}");
            0
        })
    }

    /// Port-valued field, falling back to its default when out of range.
    fn get_port_field(&self, field: &str) -> u16 {
        let num = self.get_num(field);
        u16::try_from(num).unwrap_or_else(|_| {
            error!("config: {field} {num} is not a valid port number");
            default_num(field).and_then(|d| u16::try_from(d).ok()).unwrap_or(0)
        })
    }

    /// Plain HTTP listener port. Defaults to 80.
    pub fn get_port(&self) -> u16 {
        self.get_port_field("port")
    }

    /// HTTPS listener port. Defaults to 443.
    pub fn get_https_port(&self) -> u16 {
        self.get_port_field("httpsPort")
    }

    /// Number of worker threads, at least 1. Defaults to 4.
    pub fn get_threads(&self) -> usize {
        let num = self.get_num("threads");
        usize::try_from(num).unwrap_or(1).max(1)
    }

    /// Every `location <prefix> <HandlerName> { ... }` directive, in file order.
    ///
    /// Locations inside a `server` block are taken where that block appears
    /// among the top-level statements. Directives with the wrong number of
    /// tokens are logged and skipped individually.
    pub fn locations(&self) -> Vec<Location<'_>> {
        self.statements
            .iter()
            .flat_map(|statement| {
                let nested: &[ConfigStatement] = match (statement.is("server"), statement.child.as_ref()) {
                    (true, Some(block)) => block.statements.as_slice(),
                    _ => &[],
                };
                std::iter::once(statement).chain(nested)
            })
            .filter(|statement| statement.is("location"))
            .filter_map(|statement| {
                if statement.tokens.len() != 3 {
                    error!(
                        "config: skipping location directive with {} tokens, expected 3",
                        statement.tokens.len()
                    );
                    return None;
                }
                Some(Location {
                    prefix: statement.tokens[1].as_str(),
                    handler: statement.tokens[2].as_str(),
                    config: statement.child.as_ref().unwrap_or(&EMPTY_BLOCK),
                })
            })
            .collect()
    }
}

/// A `location` directive: URL prefix, handler type name and sub-config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location<'a> {
    pub prefix: &'a str,
    pub handler: &'a str,
    pub config: &'a ConfigBlock,
}

/// Targets declared with marker blocks inside `server`:
///
/// ```text
/// server {
///     static { /static /var/www; }
///     echo { /echo; }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Targets {
    /// `(url prefix, marker name)` in declaration order.
    pub routes: Vec<(String, String)>,
    /// Filesystem path for every `static` prefix.
    pub paths: HashMap<String, String>,
}

impl Targets {
    /// Extract marker-block targets from `config`.
    ///
    /// Unknown markers are ignored. Extraction is all-or-nothing: a single
    /// malformed entry discards every target found so far and yields an empty
    /// result.
    pub fn extract(config: &ConfigBlock) -> Self {
        let mut targets = Targets::default();

        for marker in config.server_statements() {
            let (Some(name), Some(block)) = (marker.name(), marker.child.as_ref()) else {
                continue;
            };
            let expected_tokens = match name {
                "static" => 2,
                "echo" => 1,
                _ => continue,
            };

            for entry in &block.statements {
                if entry.tokens.len() != expected_tokens || entry.child.is_some() {
                    error!(
                        "config: malformed {name} target with {} tokens, ignoring all targets",
                        entry.tokens.len()
                    );
                    return Targets::default();
                }
                let url = entry.tokens[0].clone();
                if name == "static" {
                    targets.paths.insert(url.clone(), entry.tokens[1].clone());
                }
                targets.routes.push((url, name.to_string()));
            }
        }

        targets
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
