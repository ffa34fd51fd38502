//! Recursive block parser driven by a "last token kind" state machine.

use std::path::Path;

use log::{error, trace};

use crate::config::block::{ConfigBlock, ConfigStatement};
use crate::config::error::Error;
use crate::config::token::{TokenKind, Tokenizer};

/// Parses config text into a [`ConfigBlock`] tree.
#[derive(Debug, Default)]
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a whole config text.
    ///
    /// The root block is implicit; every nested block must be closed by the
    /// end of input and the last directive must be terminated by `;` or `}`.
    pub fn parse(&self, input: &str) -> Result<ConfigBlock, Error> {
        let mut tokenizer = Tokenizer::new(input);
        // Innermost open block last; the root block is never popped
        let mut stack: Vec<ConfigBlock> = vec![ConfigBlock::default()];
        let mut last = TokenKind::Start;

        loop {
            let token = tokenizer.next_token();
            let bad = Error::BadTransition {
                last,
                current: token.kind,
            };

            match token.kind {
                TokenKind::Comment => continue,
                TokenKind::Normal => {
                    if !matches!(
                        last,
                        TokenKind::Start
                            | TokenKind::StatementEnd
                            | TokenKind::BlockStart
                            | TokenKind::BlockEnd
                            | TokenKind::Normal
                    ) {
                        return Err(report(bad));
                    }
                    let Some(block) = stack.last_mut() else {
                        return Err(report(bad));
                    };
                    if last != TokenKind::Normal {
                        block.statements.push(ConfigStatement::default());
                    }
                    let Some(statement) = block.statements.last_mut() else {
                        return Err(report(bad));
                    };
                    statement.tokens.push(token.value);
                }
                TokenKind::StatementEnd => {
                    if last != TokenKind::Normal {
                        return Err(report(bad));
                    }
                }
                TokenKind::BlockStart => {
                    if last != TokenKind::Normal {
                        return Err(report(bad));
                    }
                    stack.push(ConfigBlock::default());
                }
                TokenKind::BlockEnd => {
                    if !matches!(
                        last,
                        TokenKind::StatementEnd | TokenKind::BlockEnd | TokenKind::BlockStart
                    ) {
                        return Err(report(bad));
                    }
                    // More closes than opens
                    if stack.len() < 2 {
                        return Err(report(bad));
                    }
                    let (Some(child), Some(parent)) = (stack.pop(), stack.last_mut()) else {
                        return Err(report(bad));
                    };
                    match parent.statements.last_mut() {
                        Some(statement) => statement.child = Some(child),
                        None => return Err(report(bad)),
                    }
                }
                TokenKind::Eof => {
                    if !matches!(last, TokenKind::StatementEnd | TokenKind::BlockEnd)
                        || stack.len() != 1
                    {
                        return Err(report(bad));
                    }
                    trace!("config: parsed {} top-level statements", stack[0].statements.len());
                    return stack.pop().ok_or(bad);
                }
                TokenKind::Start | TokenKind::Error => return Err(report(bad)),
            }

            last = token.kind;
        }
    }
}

fn report(err: Error) -> Error {
    error!("config: {err}");
    err
}

/// Parse config text.
pub fn parse_str(input: &str) -> Result<ConfigBlock, Error> {
    Parser::new().parse(input)
}

/// Read and parse a config file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ConfigBlock, Error> {
    let path = path.as_ref();
    let input = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&input)
}
