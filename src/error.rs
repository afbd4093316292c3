//! Error types for the triq compiler

use crate::span::Span;
use serde::Serialize;
use thiserror::Error;

/// Problems found while scanning. These never abort the scan: they travel
/// through the token stream inside `TokenKind::Error` tokens.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum LexError {
    #[error("unterminated string: \"{0}")]
    UnterminatedString(String),

    #[error("invalid floating-point number: {0}")]
    InvalidFloat(String),

    #[error("floating-point overflow: {0}")]
    FloatOverflow(String),

    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    #[error("integer overflow: {0}")]
    IntegerOverflow(String),

    #[error("unrecognized character: {0}")]
    UnrecognizedCharacter(char),
}

/// A syntax error, reported at the token where parsing of the current
/// top-level statement failed.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum ParseError {
    #[error("line {line}: expected {expected_kind} '{expected}', found {found_kind} '{found}'")]
    Expected {
        expected_kind: &'static str,
        expected: String,
        found_kind: &'static str,
        found: String,
        line: usize,
        span: Span,
    },

    #[error("line {line}: unexpected token {kind} '{text}'")]
    UnexpectedToken {
        kind: &'static str,
        text: String,
        line: usize,
        span: Span,
    },

    #[error("line {line}: unrecognized keyword '{text}'")]
    UnrecognizedKeyword { text: String, line: usize, span: Span },

    #[error("line {line}: unexpected end of input")]
    UnexpectedEnd { line: usize, span: Span },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::Expected { line, .. }
            | ParseError::UnexpectedToken { line, .. }
            | ParseError::UnrecognizedKeyword { line, .. }
            | ParseError::UnexpectedEnd { line, .. } => *line,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ParseError::Expected { span, .. }
            | ParseError::UnexpectedToken { span, .. }
            | ParseError::UnrecognizedKeyword { span, .. }
            | ParseError::UnexpectedEnd { span, .. } => *span,
        }
    }

    /// The message without the `line N:` prefix
    pub fn message(&self) -> String {
        match self {
            ParseError::Expected { expected_kind, expected, found_kind, found, .. } => {
                format!("expected {expected_kind} '{expected}', found {found_kind} '{found}'")
            }
            ParseError::UnexpectedToken { kind, text, .. } => format!("unexpected token {kind} '{text}'"),
            ParseError::UnrecognizedKeyword { text, .. } => format!("unrecognized keyword '{text}'"),
            ParseError::UnexpectedEnd { .. } => "unexpected end of input".to_string(),
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug)]
pub enum TriqError {
    #[error("{lexical} lexical error(s), {syntax} syntax error(s)")]
    Diagnostics { lexical: usize, syntax: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}

/// Result type for triq operations
pub type TriqResult<T> = Result<T, TriqError>;
