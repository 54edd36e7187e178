//! Choosing focus after a commit.

use crate::ast::{Ast, NodeId};
use crate::buffer::{offset_of, pos_of};
use crate::edit::{FocusHint, TextChange};
use serde::Serialize;
use std::collections::HashSet;

/// Outcome of a committed edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Committed {
    pub focus: Option<NodeId>,
    /// The text changes that were applied, latest first.
    pub changes: Vec<TextChange>,
}

/// Focus derived from the change set alone.
///
/// With any non-empty insertion, the latest one wins and the node ending
/// where its text ends (in the new document) is focused. Otherwise the node
/// just before the earliest deleted range is focused, falling back to the
/// first root. `None` only when the new tree is empty.
pub fn focus_from_changes(
    new_ast: &Ast,
    old_text: &str,
    new_text: &str,
    changes: &[TextChange],
) -> Option<NodeId> {
    let mut sorted = changes.to_vec();
    sorted.sort_by(|a, b| a.from.cmp(&b.from).then(a.to.cmp(&b.to)));

    let latest_insert = sorted.iter().rposition(TextChange::inserts_text);
    let pos = match latest_insert {
        Some(i) => {
            let change = &sorted[i];
            let shift: isize = sorted[..i]
                .iter()
                .map(|c| length_delta(old_text, c))
                .sum();
            offset_of(old_text, change.from)
                .and_then(|start| start.checked_add_signed(shift))
                .map(|start| pos_of(new_text, start + change.text.len()))
        }
        None => sorted.first().map(|c| c.from),
    };

    pos.and_then(|p| new_ast.node_before(p))
        .or_else(|| new_ast.first_root())
        .map(|n| n.id)
}

fn length_delta(old_text: &str, change: &TextChange) -> isize {
    let removed = match (offset_of(old_text, change.from), offset_of(old_text, change.to)) {
        (Some(start), Some(end)) => end.saturating_sub(start),
        _ => 0,
    };
    change.text.len() as isize - removed as isize
}

/// Move focus off a node hidden by a collapsed ancestor, onto the outermost
/// collapsed ancestor.
pub fn retarget_collapsed(ast: &Ast, focus: NodeId, collapsed: &HashSet<NodeId>) -> NodeId {
    ast.ancestors(focus)
        .into_iter()
        .find(|a| collapsed.contains(&a.id))
        .map_or(focus, |a| a.id)
}

/// Full focus decision: a concrete hint wins, then the change-set
/// heuristic, then collapse retargeting.
pub fn resolve_focus(
    new_ast: &Ast,
    hint: Option<&dyn Fn(&Ast) -> FocusHint>,
    old_text: &str,
    new_text: &str,
    changes: &[TextChange],
    collapsed: &HashSet<NodeId>,
) -> Option<NodeId> {
    let hinted = hint.and_then(|f| match f(new_ast) {
        FocusHint::Node(id) if new_ast.contains(id) => Some(id),
        _ => None,
    });
    hinted
        .or_else(|| focus_from_changes(new_ast, old_text, new_text, changes))
        .map(|id| retarget_collapsed(new_ast, id, collapsed))
}
