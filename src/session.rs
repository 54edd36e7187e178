//! The editing session: one document, its tree, and everything that has to
//! change together when an edit commits.

use crate::ast::{Ast, IdGenerator, NodeId, Pos};
use crate::buffer::{end_pos, StringBuffer, TextBuffer};
use crate::commit::{resolve_focus, retarget_collapsed, Committed};
use crate::config::EditorConfig;
use crate::edit::{
    apply_changes, check_disjoint, drop_edits, sort_descending, translate, DropTarget, Edit,
    EditError, FocusHint, TextChange,
};
use crate::history::{FocusMark, History, HistoryEntry};
use crate::lang::Parse;
use crate::reconcile::reconcile;
use crate::validate::{speculate, Speculation};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Explicit context for every edit transaction.
///
/// The buffer text and the tree are only ever replaced together, inside
/// [`Session::commit`] (or undo/redo), and only after the new text parsed.
#[derive(Debug)]
pub struct Session<P, B = StringBuffer> {
    buffer: B,
    parser: P,
    ast: Ast,
    ids: IdGenerator,
    config: EditorConfig,
    collapsed: HashSet<NodeId>,
    focus: Option<NodeId>,
    history: History,
}

impl<P: Parse, B: TextBuffer> Session<P, B> {
    /// Parse the buffer and identify its tree. Fails if the buffer does not
    /// parse.
    pub fn new(buffer: B, parser: P, config: EditorConfig) -> Result<Self, EditError> {
        let roots = parser.parse(&buffer.value())?;
        let mut ids = IdGenerator::new();
        let ast = reconcile(&Ast::empty(), roots, &mut ids);
        Ok(Self {
            buffer,
            parser,
            ast,
            ids,
            history: History::with_max_levels(config.history_limit),
            config,
            collapsed: HashSet::new(),
            focus: None,
        })
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn text(&self) -> String {
        self.buffer.value()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn focus(&self) -> Option<NodeId> {
        self.focus
    }

    /// Focus `id`. Returns false (and changes nothing) for unknown ids.
    pub fn set_focus(&mut self, id: NodeId) -> bool {
        if !self.ast.contains(id) {
            return false;
        }
        self.focus = Some(retarget_collapsed(&self.ast, id, &self.collapsed));
        true
    }

    pub fn collapse(&mut self, id: NodeId) -> bool {
        if !self.ast.contains(id) {
            return false;
        }
        self.collapsed.insert(id);
        if let Some(focus) = self.focus {
            self.focus = Some(retarget_collapsed(&self.ast, focus, &self.collapsed));
        }
        true
    }

    pub fn expand(&mut self, id: NodeId) -> bool {
        self.collapsed.remove(&id)
    }

    pub fn is_collapsed(&self, id: NodeId) -> bool {
        self.collapsed.contains(&id)
    }

    /// Source text of a node, comment included.
    pub fn node_text(&self, id: NodeId) -> Result<String, EditError> {
        let node = self
            .ast
            .get(id)
            .ok_or_else(|| EditError::lookup(id, "not in the current tree"))?;
        let range = node.src_range();
        self.buffer.range(range.from, range.to)
    }

    /// Translate, validate, and commit a batch of edits as one transaction.
    ///
    /// On error the session is left exactly as it was.
    pub fn perform_edit(&mut self, edits: Vec<Edit>) -> Result<Committed, EditError> {
        if edits.is_empty() {
            return Ok(Committed {
                focus: self.focus,
                changes: Vec::new(),
            });
        }

        let changes = translate(&self.ast, &edits, self.config.pretty_width)?;
        let speculation = speculate(&self.buffer.value(), &changes, &self.parser)?;

        match edits.as_slice() {
            [edit] => {
                let hint = |ast: &Ast| edit.focus_hint(ast);
                self.commit(changes, Some(&hint), Some(speculation))
            }
            _ => self.commit(changes, None, Some(speculation)),
        }
    }

    /// Move `source` to `target` in one transaction.
    pub fn drop_node(&mut self, source: NodeId, target: DropTarget) -> Result<Committed, EditError> {
        let text = self.node_text(source)?;
        let edits = drop_edits(&self.ast, &text, source, target)?;
        self.perform_edit(edits)
    }

    /// Apply already-validated text changes and bring the tree, focus,
    /// collapse state, and history up to date.
    ///
    /// `ast_hint` skips the re-parse when the caller already speculated.
    pub fn commit(
        &mut self,
        mut changes: Vec<TextChange>,
        focus_hint: Option<&dyn Fn(&Ast) -> FocusHint>,
        ast_hint: Option<Speculation>,
    ) -> Result<Committed, EditError> {
        sort_descending(&mut changes);
        check_disjoint(&changes)?;

        let old_text = self.buffer.value();
        let Speculation {
            text: new_text,
            roots,
        } = match ast_hint {
            Some(speculation) => speculation,
            None => {
                let text = apply_changes(&old_text, &changes)?;
                let roots = self.parser.parse(&text)?;
                Speculation { text, roots }
            }
        };

        for change in &changes {
            if let Err(err) = self.buffer.replace_range(&change.text, change.from, change.to) {
                self.rollback(&old_text);
                return Err(err);
            }
        }

        let new_ast = reconcile(&self.ast, roots, &mut self.ids);
        let focus = resolve_focus(
            &new_ast,
            focus_hint,
            &old_text,
            &new_text,
            &changes,
            &self.collapsed,
        );
        debug!(
            changes = changes.len(),
            nodes = new_ast.len(),
            focus = ?focus,
            "committed edit"
        );

        self.history.record(HistoryEntry {
            old_focus: FocusMark::new(&self.ast, self.focus),
            new_focus: FocusMark::new(&new_ast, focus),
            text_before: old_text,
            text_after: new_text,
        });
        self.install(new_ast, focus);

        Ok(Committed { focus, changes })
    }

    /// Revert the latest commit. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, EditError> {
        let Some(entry) = self.history.peek_undo().cloned() else {
            return Ok(false);
        };
        self.restore(&entry.text_before, &entry.old_focus)?;
        self.history.undo();
        Ok(true)
    }

    /// Re-apply the latest undone commit. Returns false when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> Result<bool, EditError> {
        let Some(entry) = self.history.peek_redo().cloned() else {
            return Ok(false);
        };
        self.restore(&entry.text_after, &entry.new_focus)?;
        self.history.redo();
        Ok(true)
    }

    /// Re-read the buffer after a change made outside this session.
    pub fn refresh(&mut self) -> Result<(), EditError> {
        let roots = self.parser.parse(&self.buffer.value())?;
        let new_ast = reconcile(&self.ast, roots, &mut self.ids);
        let focus = self.focus.filter(|id| new_ast.contains(*id));
        self.install(new_ast, focus);
        Ok(())
    }

    /// Replace the whole document with a recorded text. Nodes it brings back get
    /// fresh ids, so the focus is found by path when its id is gone.
    fn restore(&mut self, text: &str, focus: &FocusMark) -> Result<(), EditError> {
        let roots = self.parser.parse(text)?;
        let current = self.buffer.value();
        self.buffer
            .replace_range(text, Pos::default(), end_pos(&current))?;

        let new_ast = reconcile(&self.ast, roots, &mut self.ids);
        let focus = focus
            .resolve(&new_ast)
            .or_else(|| new_ast.first_root().map(|n| n.id))
            .map(|id| retarget_collapsed(&new_ast, id, &self.collapsed));
        self.install(new_ast, focus);
        Ok(())
    }

    fn install(&mut self, ast: Ast, focus: Option<NodeId>) {
        self.collapsed.retain(|id| ast.contains(*id));
        self.ast = ast;
        self.focus = focus;
    }

    fn rollback(&mut self, text: &str) {
        let current = self.buffer.value();
        if let Err(err) = self
            .buffer
            .replace_range(text, Pos::default(), end_pos(&current))
        {
            warn!(error = %err, "failed to roll back buffer after partial commit");
        }
    }
}
