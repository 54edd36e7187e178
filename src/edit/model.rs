//! Structural edits and their two lowerings: a direct text change for
//! root-level edits, or an in-place mutation of a cloned ancestor for edits
//! inside a node.

use super::{EditError, TextChange};
use crate::ast::{Ast, Node, NodeId, Pos, SlotMut, SlotRef, SlotSpec};

/// A structural edit against one snapshot of the tree.
///
/// `from`/`to` is the source range the edit removes (empty for insertions).
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub from: Pos,
    pub to: Pos,
    pub kind: EditKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditKind {
    InsertRoot {
        text: String,
    },
    DeleteRoot {
        node: NodeId,
    },
    ReplaceRoot {
        node: NodeId,
        text: String,
    },
    Overwrite {
        text: String,
    },
    InsertChild {
        parent: NodeId,
        field: &'static str,
        index: usize,
        text: String,
    },
    DeleteChild {
        node: NodeId,
        parent: NodeId,
        field: &'static str,
        index: usize,
    },
    ReplaceChild {
        node: NodeId,
        parent: NodeId,
        field: &'static str,
        index: usize,
        text: String,
    },
}

/// Which node should take focus after an edit commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusHint {
    Node(NodeId),
    /// Use the change-set heuristic.
    Fallback,
}

/// Where a dragged node lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Root(Pos),
    Child {
        parent: NodeId,
        field: String,
        pos: Pos,
    },
}

impl Edit {
    /// Insert `text` at `pos`, either between roots (`parent == None`) or
    /// into the `field` slot of `parent`.
    pub fn insert(
        ast: &Ast,
        text: &str,
        parent: Option<NodeId>,
        field: &str,
        pos: Pos,
    ) -> Result<Edit, EditError> {
        let Some(parent_id) = parent else {
            if let Some(root) = ast
                .roots()
                .iter()
                .find(|r| r.src_range().strictly_contains_pos(pos))
            {
                return Err(EditError::range(
                    pos,
                    pos,
                    format!("root insertion point is inside {}", root.id),
                ));
            }
            return Ok(Edit {
                from: pos,
                to: pos,
                kind: EditKind::InsertRoot {
                    text: text.to_string(),
                },
            });
        };

        let parent = lookup(ast, parent_id)?;
        let (spec, slot) = parent.kind.slot(field).ok_or_else(|| {
            EditError::lookup(
                parent_id,
                format!("{} has no `{field}` slot", parent.kind_name()),
            )
        })?;

        let index = match (spec, slot) {
            (SlotSpec::List(_), SlotRef::List(children)) => children
                .iter()
                .position(|child| pos <= child.src_range().from)
                .unwrap_or(children.len()),
            (SlotSpec::Optional(_), SlotRef::Optional(None)) => 0,
            (SlotSpec::Optional(f), _) => {
                return Err(EditError::range(
                    pos,
                    pos,
                    format!("optional slot `{f}` is already filled"),
                ))
            }
            (spec, _) => {
                return Err(EditError::range(
                    pos,
                    pos,
                    format!("cannot insert into required slot `{}`", spec.field()),
                ))
            }
        };

        Ok(Edit {
            from: pos,
            to: pos,
            kind: EditKind::InsertChild {
                parent: parent_id,
                field: spec.field(),
                index,
                text: text.to_string(),
            },
        })
    }

    /// Insert `text` at `index` of a list slot, or between roots.
    pub fn insert_at(
        ast: &Ast,
        text: &str,
        parent: Option<NodeId>,
        field: &str,
        index: usize,
    ) -> Result<Edit, EditError> {
        let pos = ast.insertion_pos(parent, field, index)?;
        Edit::insert(ast, text, parent, field, pos)
    }

    pub fn delete(ast: &Ast, id: NodeId) -> Result<Edit, EditError> {
        let node = lookup(ast, id)?;
        let range = node.src_range();
        let kind = match ast.parent(id) {
            None => EditKind::DeleteRoot { node: id },
            Some(parent) => {
                let (spec, index) = locate_in_parent(parent, id)?;
                EditKind::DeleteChild {
                    node: id,
                    parent: parent.id,
                    field: spec.field(),
                    index,
                }
            }
        };
        Ok(Edit {
            from: range.from,
            to: range.to,
            kind,
        })
    }

    /// Replace a node with `text`. Empty text deletes the node.
    pub fn replace(ast: &Ast, text: &str, id: NodeId) -> Result<Edit, EditError> {
        if text.is_empty() {
            return Edit::delete(ast, id);
        }
        let node = lookup(ast, id)?;
        let range = node.src_range();
        let text = text.to_string();
        let kind = match ast.parent(id) {
            None => EditKind::ReplaceRoot { node: id, text },
            Some(parent) => {
                let (spec, index) = locate_in_parent(parent, id)?;
                EditKind::ReplaceChild {
                    node: id,
                    parent: parent.id,
                    field: spec.field(),
                    index,
                    text,
                }
            }
        };
        Ok(Edit {
            from: range.from,
            to: range.to,
            kind,
        })
    }

    /// Replace raw text between roots. Neither end may fall inside a root.
    pub fn overwrite(ast: &Ast, text: &str, from: Pos, to: Pos) -> Result<Edit, EditError> {
        if from > to {
            return Err(EditError::range(from, to, "inverted range"));
        }
        for root in ast.roots() {
            let range = root.src_range();
            if range.strictly_contains_pos(from) || range.strictly_contains_pos(to) {
                return Err(EditError::range(
                    from,
                    to,
                    format!("range cuts through {} at {range}", root.id),
                ));
            }
        }
        Ok(Edit {
            from,
            to,
            kind: EditKind::Overwrite {
                text: text.to_string(),
            },
        })
    }

    /// The parent whose clone this edit mutates; `None` for root-level edits.
    pub fn parent(&self) -> Option<NodeId> {
        match &self.kind {
            EditKind::InsertChild { parent, .. }
            | EditKind::DeleteChild { parent, .. }
            | EditKind::ReplaceChild { parent, .. } => Some(*parent),
            _ => None,
        }
    }

    /// Text change for a root-level edit.
    pub fn root_change(&self) -> Option<TextChange> {
        let text = match &self.kind {
            EditKind::InsertRoot { text }
            | EditKind::ReplaceRoot { text, .. }
            | EditKind::Overwrite { text } => text.clone(),
            EditKind::DeleteRoot { .. } => String::new(),
            _ => return None,
        };
        Some(TextChange::new(self.from, self.to, text))
    }

    /// Apply a child edit to `clone`, a disposable copy of an ancestor.
    pub fn make_ast_edit(&self, clone: &mut Node) -> Result<(), EditError> {
        let (parent_id, field) = match &self.kind {
            EditKind::InsertChild { parent, field, .. }
            | EditKind::DeleteChild { parent, field, .. }
            | EditKind::ReplaceChild { parent, field, .. } => (*parent, *field),
            _ => {
                return Err(EditError::lookup(
                    clone.id,
                    "root-level edit has no tree form",
                ))
            }
        };
        let parent = clone
            .find_mut(parent_id)
            .ok_or_else(|| EditError::lookup(parent_id, "parent missing from ancestor clone"))?;
        let (_, slot) = parent
            .kind
            .slot_mut(field)
            .ok_or_else(|| EditError::lookup(parent_id, format!("no `{field}` slot")))?;

        match (&self.kind, slot) {
            (EditKind::InsertChild { index, text, .. }, SlotMut::List(list)) => {
                let at = (*index).min(list.len());
                list.insert(at, Node::fake_insert(text, self.from));
            }
            (EditKind::InsertChild { text, .. }, SlotMut::Optional(slot)) if slot.is_none() => {
                *slot = Some(Box::new(Node::fake_insert(text, self.from)));
            }
            (EditKind::ReplaceChild { node, text, .. }, slot) => {
                let target = slot
                    .nodes()
                    .into_iter()
                    .find(|n| n.id == *node)
                    .ok_or_else(|| EditError::lookup(*node, format!("not in `{field}` slot")))?;
                *target = Node::fake_insert(text, self.from);
            }
            (EditKind::DeleteChild { node, .. }, SlotMut::List(list)) => {
                let at = list
                    .iter()
                    .position(|n| n.id == *node)
                    .ok_or_else(|| EditError::lookup(*node, format!("not in `{field}` list")))?;
                list.remove(at);
            }
            (EditKind::DeleteChild { node, .. }, SlotMut::Optional(slot)) => {
                if slot.as_ref().map(|n| n.id) != Some(*node) {
                    return Err(EditError::lookup(*node, format!("not in `{field}` slot")));
                }
                *slot = None;
            }
            (EditKind::DeleteChild { node, .. }, SlotMut::Single(child)) => {
                if child.id != *node {
                    return Err(EditError::lookup(*node, format!("not in `{field}` slot")));
                }
                let span = child.span;
                **child = Node::fake_blank(span);
            }
            _ => {
                return Err(EditError::lookup(
                    parent_id,
                    format!("`{field}` slot cannot take this edit"),
                ))
            }
        }
        Ok(())
    }

    /// Node to focus once the edit has committed and `new_ast` is reconciled.
    pub fn focus_hint(&self, new_ast: &Ast) -> FocusHint {
        let in_slot = |parent: NodeId, field: &str, index: usize| {
            let (_, slot) = new_ast.get(parent)?.kind.slot(field)?;
            slot.nodes().get(index).map(|n| n.id)
        };
        let found = match &self.kind {
            EditKind::InsertChild {
                parent,
                field,
                index,
                ..
            }
            | EditKind::ReplaceChild {
                parent,
                field,
                index,
                ..
            } => in_slot(*parent, *field, *index),
            EditKind::DeleteChild {
                parent,
                field,
                index,
                ..
            } => {
                let is_list = matches!(
                    new_ast.get(*parent).and_then(|p| p.kind.slot(*field)),
                    Some((SlotSpec::List(_), _))
                );
                let sibling = if is_list && *index > 0 {
                    in_slot(*parent, *field, index - 1)
                } else {
                    None
                };
                sibling.or_else(|| new_ast.get(*parent).map(|p| p.id))
            }
            _ => None,
        };
        found.map_or(FocusHint::Fallback, FocusHint::Node)
    }
}

impl Ast {
    /// Position at which an insertion lands at `index` of `field` (or of the
    /// root list when `parent` is `None`).
    pub fn insertion_pos(
        &self,
        parent: Option<NodeId>,
        field: &str,
        index: usize,
    ) -> Result<Pos, EditError> {
        let Some(parent_id) = parent else {
            let roots = self.roots();
            return Ok(match roots.get(index) {
                Some(root) => root.src_range().from,
                None => roots.last().map(|r| r.src_range().to).unwrap_or_default(),
            });
        };

        let parent = lookup(self, parent_id)?;
        let slots = parent.kind.slot_refs();
        let at = slots
            .iter()
            .position(|(spec, _)| spec.field() == field)
            .ok_or_else(|| {
                EditError::lookup(
                    parent_id,
                    format!("{} has no `{field}` slot", parent.kind_name()),
                )
            })?;

        let children = slots[at].1.nodes();
        if let Some(child) = children.get(index) {
            return Ok(child.src_range().from);
        }
        if let Some(last) = children.last() {
            return Ok(last.src_range().to);
        }
        // empty slot: just after whatever precedes it, else after the opener
        let preceding = slots[..at]
            .iter()
            .flat_map(|(_, slot)| slot.nodes())
            .last()
            .map(|n| n.src_range().to);
        Ok(preceding.unwrap_or(Pos::new(parent.span.from.line, parent.span.from.ch + 1)))
    }
}

/// Delete `source` and re-insert its text at `target`, as one batch.
pub fn drop_edits(
    ast: &Ast,
    source_text: &str,
    source: NodeId,
    target: DropTarget,
) -> Result<Vec<Edit>, EditError> {
    let node = lookup(ast, source)?;
    let range = node.src_range();

    let insert = match target {
        DropTarget::Root(pos) => {
            if range.strictly_contains_pos(pos) {
                return Err(EditError::range(pos, pos, "cannot drop a node inside itself"));
            }
            Edit::insert(ast, &format!("\n{source_text}\n"), None, "", pos)?
        }
        DropTarget::Child { parent, field, pos } => {
            if node.contains_id(parent) {
                return Err(EditError::range(pos, pos, "cannot drop a node inside itself"));
            }
            Edit::insert(ast, source_text, Some(parent), &field, pos)?
        }
    };

    Ok(vec![Edit::delete(ast, source)?, insert])
}

fn lookup(ast: &Ast, id: NodeId) -> Result<&Node, EditError> {
    ast.get(id)
        .ok_or_else(|| EditError::lookup(id, "not in the current tree"))
}

fn locate_in_parent(parent: &Node, id: NodeId) -> Result<(SlotSpec, usize), EditError> {
    parent
        .kind
        .slot_refs()
        .into_iter()
        .find_map(|(spec, slot)| {
            slot.nodes()
                .iter()
                .position(|n| n.id == id)
                .map(|index| (spec, index))
        })
        .ok_or_else(|| EditError::lookup(id, format!("not a child of {}", parent.id)))
}
