//! Script applicator: resolves an [`EditScript`] against the session's
//! current tree and runs it as a single transaction.
//!
//! Every path in the script is resolved against the tree as it was before
//! the script ran, so edit order inside a script does not matter.

use crate::ast::{Ast, NodeId};
use crate::buffer::TextBuffer;
use crate::commit::Committed;
use crate::config::schema::{parse_path, EditScript, ScriptEdit};
use crate::edit::{drop_edits, DropTarget, Edit, EditError};
use crate::lang::Parse;
use crate::session::Session;
use std::fmt;

#[derive(Debug)]
pub enum ApplicationError {
    /// A node path that does not exist in the document.
    UnknownPath { edit: usize, path: String },
    /// The resolved edit was rejected.
    Edit { edit: Option<usize>, source: EditError },
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationError::UnknownPath { edit, path } => {
                write!(f, "edit #{edit}: no node at path '{path}'")
            }
            ApplicationError::Edit {
                edit: Some(edit),
                source,
            } => write!(f, "edit #{edit}: {source}"),
            ApplicationError::Edit { edit: None, source } => {
                write!(f, "script rejected: {source}")
            }
        }
    }
}

impl std::error::Error for ApplicationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApplicationError::Edit { source, .. } => Some(source),
            ApplicationError::UnknownPath { .. } => None,
        }
    }
}

/// Resolve every script entry to structural edits against `ast`.
///
/// `text` is the document `ast` was parsed from; drops copy their source
/// node's text out of it.
pub fn resolve_script(
    script: &EditScript,
    ast: &Ast,
    text: &str,
) -> Result<Vec<Edit>, ApplicationError> {
    let mut edits = Vec::with_capacity(script.edits.len());

    for (idx, entry) in script.edits.iter().enumerate() {
        let node = |path: &str| -> Result<NodeId, ApplicationError> {
            parse_path(path)
                .and_then(|p| ast.node_at_path(&p))
                .map(|n| n.id)
                .ok_or_else(|| ApplicationError::UnknownPath {
                    edit: idx,
                    path: path.to_string(),
                })
        };
        let parent_of = |parent: &Option<String>| parent.as_deref().map(node).transpose();
        let wrap = |source: EditError| ApplicationError::Edit {
            edit: Some(idx),
            source,
        };

        match entry {
            ScriptEdit::Insert {
                parent,
                field,
                index,
                text,
            } => {
                let parent = parent_of(parent)?;
                let field = field.as_deref().unwrap_or_default();
                edits.push(Edit::insert_at(ast, text, parent, field, *index).map_err(wrap)?);
            }
            ScriptEdit::Delete { target } => {
                edits.push(Edit::delete(ast, node(target)?).map_err(wrap)?);
            }
            ScriptEdit::Replace { target, text } => {
                edits.push(Edit::replace(ast, text, node(target)?).map_err(wrap)?);
            }
            ScriptEdit::Overwrite { from, to, text } => {
                edits.push(Edit::overwrite(ast, text, *from, *to).map_err(wrap)?);
            }
            ScriptEdit::Drop {
                source,
                parent,
                field,
                index,
            } => {
                let source = node(source)?;
                let parent = parent_of(parent)?;
                let field = field.as_deref().unwrap_or_default();
                let pos = ast.insertion_pos(parent, field, *index).map_err(wrap)?;
                let target = match parent {
                    Some(parent) => DropTarget::Child {
                        parent,
                        field: field.to_string(),
                        pos,
                    },
                    None => DropTarget::Root(pos),
                };
                let source_text = ast
                    .get(source)
                    .and_then(|n| crate::buffer::text_in(text, n.src_range()))
                    .unwrap_or_default();
                edits.extend(drop_edits(ast, source_text, source, target).map_err(wrap)?);
            }
        }
    }

    Ok(edits)
}

/// Resolve and commit `script` as one transaction.
pub fn apply_script<P: Parse, B: TextBuffer>(
    session: &mut Session<P, B>,
    script: &EditScript,
) -> Result<Committed, ApplicationError> {
    let edits = resolve_script(script, session.ast(), &session.text())?;
    session
        .perform_edit(edits)
        .map_err(|source| ApplicationError::Edit { edit: None, source })
}
