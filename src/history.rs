//! # Undo/Redo History
//!
//! Each committed edit records the document text on both sides of it plus
//! the focus before and after, because the host buffer's own undo stack has
//! no notion of structural focus.
//!
//! Nodes that undo or redo bring back are re-identified with fresh ids, so a
//! focus is stored both as an id and as its child-index path in the tree it
//! was taken from. The path is used when the id no longer exists.
//!
//! - Undo restores `text_before` and moves the entry to the redo stack
//! - Redo restores `text_after` and moves it back
//! - A new commit clears the redo stack
//! - The undo stack is trimmed from the oldest end past `max_levels`

use crate::ast::{Ast, NodeId};

/// A focused node, addressed by id and by path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FocusMark {
    pub id: Option<NodeId>,
    pub path: Option<Vec<usize>>,
}

impl FocusMark {
    pub fn new(ast: &Ast, id: Option<NodeId>) -> Self {
        let path = id.and_then(|id| ast.path_of(id)).map(<[usize]>::to_vec);
        Self { id, path }
    }

    /// The marked node in `ast`: by id if it survived, else whatever now sits
    /// at the recorded path.
    pub fn resolve(&self, ast: &Ast) -> Option<NodeId> {
        self.id
            .filter(|id| ast.contains(*id))
            .or_else(|| {
                let path = self.path.as_deref()?;
                ast.node_at_path(path).map(|n| n.id)
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub old_focus: FocusMark,
    pub new_focus: FocusMark,
    pub text_before: String,
    pub text_after: String,
}

#[derive(Debug)]
pub struct History {
    /// Most recent last
    undo_stack: Vec<HistoryEntry>,

    /// Most recently undone last
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record a committed edit. Invalidates anything that could be redone.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    pub fn peek_undo(&self) -> Option<&HistoryEntry> {
        self.undo_stack.last()
    }

    pub fn peek_redo(&self) -> Option<&HistoryEntry> {
        self.redo_stack.last()
    }

    /// Move the latest entry to the redo stack and return it.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(entry);
        self.redo_stack.last()
    }

    /// Move the latest undone entry back to the undo stack and return it.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(entry);
        self.undo_stack.last()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
