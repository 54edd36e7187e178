//! Speculative validation of candidate text changes.
//!
//! # Hard Rule
//!
//! Changes are applied to a scratch copy of the document and re-parsed
//! before anything touches the live buffer. If the scratch copy does not
//! parse, the edit is rejected and nothing changes.

use crate::ast::Node;
use crate::edit::{apply_changes, EditError, TextChange};
use crate::lang::Parse;
use tracing::debug;

/// A candidate document that parsed: its text and unreconciled roots.
#[derive(Debug, Clone)]
pub struct Speculation {
    pub text: String,
    pub roots: Vec<Node>,
}

/// Apply `changes` to a copy of `text` and parse the result.
pub fn speculate<P>(text: &str, changes: &[TextChange], parser: &P) -> Result<Speculation, EditError>
where
    P: Parse + ?Sized,
{
    let candidate = apply_changes(text, changes)?;
    match parser.parse(&candidate) {
        Ok(roots) => Ok(Speculation {
            text: candidate,
            roots,
        }),
        Err(err) => {
            debug!(error = %err, changes = changes.len(), "speculative parse rejected edit");
            Err(err.into())
        }
    }
}
