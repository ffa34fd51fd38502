//! Config file tokenizer.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// Characters that may follow a backslash inside a quoted token.
const ESCAPE_CHARS: &str = "abfnrtv'\"?\\";

/// The kind of a token produced by the [`Tokenizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// No token has been read yet. Never returned by the tokenizer; the parser
    /// uses it as its initial state.
    Start,
    /// A bareword or a quoted string.
    Normal,
    /// `{`
    BlockStart,
    /// `}`
    BlockEnd,
    /// `;`
    StatementEnd,
    /// `#` up to the end of the line.
    Comment,
    /// End of input.
    Eof,
    /// Malformed input.
    Error,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Start => "START",
            TokenKind::Normal => "NORMAL",
            TokenKind::BlockStart => "BLOCK_START",
            TokenKind::BlockEnd => "BLOCK_END",
            TokenKind::StatementEnd => "STATEMENT_END",
            TokenKind::Comment => "COMMENT",
            TokenKind::Eof => "EOF",
            TokenKind::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// A single token and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
}

impl Token {
    fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

enum State {
    InitialWhitespace,
    SingleQuote,
    DoubleQuote,
    Comment,
    Bareword,
}

/// Splits config text into tokens, one per call to [`Tokenizer::next_token`].
pub struct Tokenizer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.chars().peekable(),
        }
    }

    /// Read the next token from the input.
    ///
    /// Once [`TokenKind::Eof`] or [`TokenKind::Error`] has been returned the
    /// caller should stop asking for more tokens.
    pub fn next_token(&mut self) -> Token {
        let mut state = State::InitialWhitespace;
        let mut value = String::new();

        while let Some(c) = self.input.next() {
            match state {
                State::InitialWhitespace => match c {
                    '{' => return Token::new(TokenKind::BlockStart, "{"),
                    '}' => return Token::new(TokenKind::BlockEnd, "}"),
                    ';' => return Token::new(TokenKind::StatementEnd, ";"),
                    '#' => state = State::Comment,
                    '"' => state = State::DoubleQuote,
                    '\'' => state = State::SingleQuote,
                    c if c.is_whitespace() => {}
                    c => {
                        value.push(c);
                        if self.at_bareword_end() {
                            return Token::new(TokenKind::Normal, value);
                        }
                        state = State::Bareword;
                    }
                },
                State::SingleQuote | State::DoubleQuote => {
                    let quote = if matches!(state, State::SingleQuote) { '\'' } else { '"' };
                    if c == '\\' {
                        match self.input.next() {
                            Some(escaped) if ESCAPE_CHARS.contains(escaped) => {
                                value.push(unescape(escaped));
                            }
                            _ => return Token::new(TokenKind::Error, value),
                        }
                        continue;
                    }
                    if c == quote {
                        // A closing quote must stand alone: `"a"b` is rejected
                        return match self.input.peek() {
                            Some(&next) if next.is_whitespace() || next == ';' => {
                                Token::new(TokenKind::Normal, value)
                            }
                            _ => Token::new(TokenKind::Error, value),
                        };
                    }
                    value.push(c);
                }
                State::Comment => {
                    if c == '\n' || c == '\r' {
                        return Token::new(TokenKind::Comment, value);
                    }
                    value.push(c);
                }
                State::Bareword => {
                    value.push(c);
                    if self.at_bareword_end() {
                        return Token::new(TokenKind::Normal, value);
                    }
                }
            }
        }

        match state {
            State::SingleQuote | State::DoubleQuote => Token::new(TokenKind::Error, value),
            State::Bareword => Token::new(TokenKind::Normal, value),
            _ => Token::new(TokenKind::Eof, ""),
        }
    }

    /// Whether the next character ends a bareword. End of input is handled
    /// by the caller.
    fn at_bareword_end(&mut self) -> bool {
        matches!(self.input.peek(), Some(&next) if next.is_whitespace() || matches!(next, ';' | '{' | '}'))
    }
}

/// Map the character after a backslash to the literal it stands for.
fn unescape(c: char) -> char {
    match c {
        'a' => '\x07',
        'b' => '\x08',
        'f' => '\x0c',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\x0b',
        other => other,
    }
}

/// Inverse of [`unescape`] for characters that cannot appear raw in a quoted token.
pub(crate) fn escape(c: char) -> Option<char> {
    match c {
        '\x07' => Some('a'),
        '\x08' => Some('b'),
        '\x0c' => Some('f'),
        '\n' => Some('n'),
        '\r' => Some('r'),
        '\t' => Some('t'),
        '\x0b' => Some('v'),
        '"' => Some('"'),
        '\\' => Some('\\'),
        _ => None,
    }
}
