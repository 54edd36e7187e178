//! Batching child edits by shared ancestor and lowering each batch to a
//! single text change through clone-and-pretty-print.

use super::{sort_descending, Edit, EditError, TextChange};
use crate::ast::{Ast, Node, NodeId, NodeKind, Span};
use tracing::{debug, warn};

/// Child edits that share one ancestor and become one text change.
#[derive(Debug, Clone)]
pub struct EditGroup {
    pub ancestor: NodeId,
    /// Source range of the ancestor in the tree the edits were made against.
    pub range: Span,
    /// Indices into the edit slice the group was built from.
    pub members: Vec<usize>,
    cached: Option<TextChange>,
}

impl EditGroup {
    fn new(ancestor: NodeId, range: Span) -> Self {
        Self {
            ancestor,
            range,
            members: Vec::new(),
            cached: None,
        }
    }

    /// Clone the ancestor once, apply every member edit to the clone (latest
    /// first), and pretty-print it over the ancestor's original range.
    ///
    /// A member whose target cannot be found in the clone is logged and
    /// skipped. The result is cached; later calls return it unchanged.
    pub fn to_change(
        &mut self,
        ast: &Ast,
        edits: &[Edit],
        pretty_width: usize,
    ) -> Result<TextChange, EditError> {
        if let Some(change) = &self.cached {
            return Ok(change.clone());
        }

        let ancestor = ast
            .get(self.ancestor)
            .ok_or_else(|| EditError::lookup(self.ancestor, "group ancestor is not in the tree"))?;
        let mut clone = ancestor.clone();

        let mut members: Vec<&Edit> = self.members.iter().filter_map(|&i| edits.get(i)).collect();
        members.sort_by(|a, b| b.from.cmp(&a.from).then(b.to.cmp(&a.to)));
        for edit in members {
            match edit.make_ast_edit(&mut clone) {
                Ok(()) => {}
                Err(EditError::StructuralLookup { id, detail }) => {
                    warn!(%id, %detail, ancestor = %self.ancestor, "skipping edit with missing target");
                }
                Err(other) => return Err(other),
            }
        }

        let width = pretty_width.saturating_sub(self.range.from.ch).max(1);
        let printed = clone.pretty().display(width).join("\n");
        let text = indent_continuation(&printed, self.range.from.ch);
        let change = TextChange::new(self.range.from, self.range.to, text);
        self.cached = Some(change.clone());
        Ok(change)
    }
}

/// Shift every line after the first right by `column` so a reprint lines up
/// under its own opening bracket. Lines that start inside a string literal
/// are left alone, as are blank ones.
fn indent_continuation(text: &str, column: usize) -> String {
    if column == 0 {
        return text.to_string();
    }
    let pad = " ".repeat(column);
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            if !in_string && !line.trim().is_empty() {
                out.push_str(&pad);
            }
        }
        out.push_str(line);
        in_string = ends_inside_string(line, in_string);
    }
    out
}

/// Whether a string literal is still open at the end of `line`, given
/// whether one was open at its start. Comments end the scan.
fn ends_inside_string(line: &str, mut in_string: bool) -> bool {
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match (in_string, c) {
            (true, '\\') => {
                chars.next();
            }
            (_, '"') => in_string = !in_string,
            (false, ';') => break,
            _ => {}
        }
    }
    in_string
}

/// Group every child edit by the highest ancestor any of its neighbours
/// needs. Root-level edits are left out. `edits` should already be sorted
/// latest-first.
pub fn group_by_ancestor(ast: &Ast, edits: &[Edit]) -> Result<Vec<EditGroup>, EditError> {
    let mut groups: Vec<EditGroup> = Vec::new();

    for (i, edit) in edits.iter().enumerate() {
        let Some(parent) = edit.parent() else {
            continue;
        };
        let anchor = anchor_of(ast, parent)?;
        let range = anchor.src_range();

        // ancestors are disjoint, so at most one group can contain this one
        if let Some(group) = groups.iter_mut().find(|g| g.range.contains(range)) {
            group.members.push(i);
            continue;
        }

        let mut group = EditGroup::new(anchor.id, range);
        let (absorbed, kept): (Vec<_>, Vec<_>) =
            groups.into_iter().partition(|g| range.contains(g.range));
        for inner in absorbed {
            group.members.extend(inner.members);
        }
        group.members.push(i);
        groups = kept;
        groups.push(group);
    }

    debug!(
        groups = groups.len(),
        edits = edits.len(),
        "grouped child edits by ancestor"
    );
    Ok(groups)
}

/// The node that gets reprinted for an edit under `parent`.
///
/// A function header's parameter list has no brackets of its own in the
/// source, so it is always reprinted through its definition.
fn anchor_of(ast: &Ast, parent: NodeId) -> Result<&Node, EditError> {
    let node = ast
        .get(parent)
        .ok_or_else(|| EditError::lookup(parent, "edit parent is not in the tree"))?;
    if let Some(grandparent) = ast.parent(parent) {
        if let NodeKind::FunctionDefinition { params, .. } = &grandparent.kind {
            if params.id == parent {
                return Ok(grandparent);
            }
        }
    }
    Ok(node)
}

/// Lower a batch of edits to text changes, sorted latest-first.
pub fn translate(ast: &Ast, edits: &[Edit], pretty_width: usize) -> Result<Vec<TextChange>, EditError> {
    let mut sorted = edits.to_vec();
    sorted.sort_by(|a, b| b.from.cmp(&a.from).then(b.to.cmp(&a.to)));

    let mut changes: Vec<TextChange> = sorted.iter().filter_map(Edit::root_change).collect();
    for mut group in group_by_ancestor(ast, &sorted)? {
        changes.push(group.to_change(ast, &sorted, pretty_width)?);
    }
    sort_descending(&mut changes);
    Ok(changes)
}
