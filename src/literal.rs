//! Structured-data literal codec
//!
//! Group files hold exactly one `return [...];` array literal. This module
//! evaluates that literal without executing anything and writes it back in a
//! stable, key-sorted layout.

mod export;
mod parser;

pub use export::{
    export,
    render_file,
};
pub use parser::parse;

/// Error raised when a group file is not a plain array literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at line {line}, column {column}")]
pub struct ParseError {
    pub message: String,
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl ParseError {
    fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let consumed = source.get(..offset).unwrap_or(source);
        let line = consumed.matches('\n').count() + 1;
        let column = consumed.rsplit('\n').next().map_or(0, |tail| tail.chars().count()) + 1;
        Self { message: message.into(), line, column }
    }
}
