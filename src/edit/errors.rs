use crate::ast::{NodeId, Pos};
use crate::lang::ParseError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("edited document does not parse: {0}")]
    Parse(#[from] ParseError),

    #[error("node {id} not found: {detail}")]
    StructuralLookup { id: NodeId, detail: String },

    #[error("invalid range {from}..{to}: {reason}")]
    InvalidRange { from: Pos, to: Pos, reason: String },

    #[error("text buffer error: {0}")]
    Buffer(String),
}

impl EditError {
    pub(crate) fn lookup(id: NodeId, detail: impl Into<String>) -> Self {
        EditError::StructuralLookup {
            id,
            detail: detail.into(),
        }
    }

    pub(crate) fn range(from: Pos, to: Pos, reason: impl Into<String>) -> Self {
        EditError::InvalidRange {
            from,
            to,
            reason: reason.into(),
        }
    }
}
