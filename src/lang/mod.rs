//! Pluggable language front end.
//!
//! The editing core only needs a [`Parse`] implementation; pretty-printing
//! is an exhaustive match over [`crate::ast::NodeKind`] (see [`printer`]).
//! [`SexprParser`] is the bundled Racket-flavoured s-expression language.

pub mod lexer;
pub mod printer;
pub mod sexpr;

pub use sexpr::SexprParser;

use crate::ast::{Node, Pos};
use thiserror::Error;

/// Candidate text did not parse. Always recoverable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at {pos}")]
pub struct ParseError {
    pub message: String,
    pub pos: Pos,
}

impl ParseError {
    pub fn new(message: impl Into<String>, pos: Pos) -> Self {
        Self {
            message: message.into(),
            pos,
        }
    }
}

/// Parse whole-document text into unidentified root nodes.
///
/// Implementations must be deterministic and side-effect free.
pub trait Parse {
    fn parse(&self, text: &str) -> Result<Vec<Node>, ParseError>;
}

impl<F> Parse for F
where
    F: Fn(&str) -> Result<Vec<Node>, ParseError>,
{
    fn parse(&self, text: &str) -> Result<Vec<Node>, ParseError> {
        self(text)
    }
}
