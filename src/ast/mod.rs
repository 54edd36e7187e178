//! Syntax tree model shared by every stage of an edit transaction.
//!
//! A document is a forest of root [`Node`]s. Nodes own their children by
//! value; parent links are never stored on a node. Instead [`Ast`] keeps an
//! index from [`NodeId`] to the node's path (a list of child indices starting
//! at a root), and answers `parent`/`ancestors` queries from that path.
//!
//! Node ids are handed out by the reconciler (see [`crate::reconcile`]), never
//! by a parser. Parsers emit [`NodeId::UNASSIGNED`].

pub mod hash;
pub mod node;

pub use hash::structural_hash;
pub use node::{LetForm, LiteralType, Node, NodeKind, SlotMut, SlotRef, SlotSpec, WhenForm};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A zero-based `(line, ch)` position. `ch` counts Unicode scalar values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Pos {
    pub line: usize,
    pub ch: usize,
}

impl Pos {
    pub const fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.ch)
    }
}

/// Half-open source range `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub from: Pos,
    pub to: Pos,
}

impl Span {
    pub const fn new(from: Pos, to: Pos) -> Self {
        Self { from, to }
    }

    /// A zero-width span at `pos`.
    pub const fn point(pos: Pos) -> Self {
        Self { from: pos, to: pos }
    }

    /// True when `other` lies inside this span (equal spans count).
    pub fn contains(&self, other: Span) -> bool {
        self.from <= other.from && other.to <= self.to
    }

    /// True when `pos` is strictly between the endpoints.
    pub fn strictly_contains_pos(&self, pos: Pos) -> bool {
        self.from < pos && pos < self.to
    }

    pub fn union(&self, other: Span) -> Span {
        Span {
            from: self.from.min(other.from),
            to: self.to.max(other.to),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}

/// Opaque node identity, stable across re-parses of unchanged content.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// The id every parser-produced node carries before reconciliation.
    pub const UNASSIGNED: NodeId = NodeId(0);

    pub fn is_assigned(&self) -> bool {
        *self != Self::UNASSIGNED
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic source of fresh [`NodeId`]s, owned by the editing session.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn fresh(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Make sure no id up to and including `id` is ever handed out again.
    pub fn advance_past(&mut self, id: NodeId) {
        self.next = self.next.max(id.0 + 1);
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// A reconciled document: root nodes plus an id index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ast {
    roots: Vec<Node>,
    #[serde(skip)]
    index: HashMap<NodeId, Vec<usize>>,
}

impl Ast {
    /// Build the id index over already-identified roots.
    pub fn new(roots: Vec<Node>) -> Self {
        let mut index = HashMap::new();
        let mut path = Vec::new();
        for (i, root) in roots.iter().enumerate() {
            path.push(i);
            index_node(root, &mut path, &mut index);
            path.pop();
        }
        Self { roots, index }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of indexed (non-comment) nodes.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.node_at_path(self.index.get(&id)?)
    }

    pub fn path_of(&self, id: NodeId) -> Option<&[usize]> {
        self.index.get(&id).map(Vec::as_slice)
    }

    /// Follow a path of child indices starting at a root index.
    pub fn node_at_path(&self, path: &[usize]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.get(*first)?;
        for &i in rest {
            node = node.children().into_iter().nth(i)?;
        }
        Some(node)
    }

    pub fn parent(&self, id: NodeId) -> Option<&Node> {
        let path = self.index.get(&id)?;
        if path.len() < 2 {
            return None;
        }
        self.node_at_path(&path[..path.len() - 1])
    }

    /// Ancestors of `id`, outermost first. Does not include the node itself.
    pub fn ancestors(&self, id: NodeId) -> Vec<&Node> {
        let Some(path) = self.index.get(&id) else {
            return Vec::new();
        };
        (1..path.len())
            .filter_map(|depth| self.node_at_path(&path[..depth]))
            .collect()
    }

    pub fn first_root(&self) -> Option<&Node> {
        self.roots.first()
    }

    /// Every indexed node in document (preorder) order.
    pub fn nodes(&self) -> Vec<&Node> {
        let mut out = Vec::with_capacity(self.index.len());
        for root in &self.roots {
            root.walk(&mut |n| out.push(n));
        }
        out
    }

    pub fn max_id(&self) -> Option<NodeId> {
        self.index.keys().copied().max()
    }

    /// The node nearest before `pos`: the outermost node ending at or before
    /// `pos`, descending into any node that straddles `pos`. A straddling node
    /// with no earlier child is itself the answer.
    pub fn node_before(&self, pos: Pos) -> Option<&Node> {
        fn search<'a>(nodes: Vec<&'a Node>, pos: Pos) -> Option<&'a Node> {
            let mut best = None;
            for node in nodes {
                let range = node.src_range();
                if range.from >= pos {
                    break;
                }
                if range.to <= pos {
                    best = Some(node);
                } else {
                    return search(node.children(), pos).or(Some(node));
                }
            }
            best
        }
        search(self.roots.iter().collect(), pos)
    }

    /// Render the whole document with the built-in pretty-printer.
    pub fn pretty_print(&self, width: usize) -> String {
        self.roots
            .iter()
            .map(|root| root.pretty().display(width).join("\n"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn index_node(node: &Node, path: &mut Vec<usize>, index: &mut HashMap<NodeId, Vec<usize>>) {
    if index.insert(node.id, path.clone()).is_some() {
        tracing::warn!(id = %node.id, "duplicate node id while indexing tree");
    }
    for (i, child) in node.children().into_iter().enumerate() {
        path.push(i);
        index_node(child, path, index);
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::{Parse, SexprParser};
    use crate::reconcile::reconcile;

    fn ast_of(src: &str) -> Ast {
        let roots = SexprParser.parse(src).unwrap();
        reconcile(&Ast::empty(), roots, &mut IdGenerator::new())
    }

    #[test]
    fn pos_ordering_is_line_major() {
        assert!(Pos::new(0, 10) < Pos::new(1, 0));
        assert!(Pos::new(2, 1) > Pos::new(2, 0));
    }

    #[test]
    fn span_containment() {
        let outer = Span::new(Pos::new(0, 0), Pos::new(0, 10));
        let inner = Span::new(Pos::new(0, 2), Pos::new(0, 4));
        assert!(outer.contains(inner));
        assert!(outer.contains(outer));
        assert!(!inner.contains(outer));
        assert!(outer.strictly_contains_pos(Pos::new(0, 5)));
        assert!(!outer.strictly_contains_pos(Pos::new(0, 0)));
    }

    #[test]
    fn id_generator_skips_inherited_ids() {
        let mut ids = IdGenerator::new();
        ids.advance_past(NodeId(41));
        assert_eq!(ids.fresh(), NodeId(42));
        ids.advance_past(NodeId(3));
        assert_eq!(ids.fresh(), NodeId(43));
    }

    #[test]
    fn reconcile_never_hands_out_an_id_at_or_below_the_old_max() {
        let mut ids = IdGenerator::new();
        let old = reconcile(
            &Ast::empty(),
            SexprParser.parse("(f 1 2)").unwrap(),
            &mut ids,
        );
        let old_max = old.max_id().unwrap();

        // a generator that has never seen the old tree
        let mut fresh = IdGenerator::new();
        let new = reconcile(&old, SexprParser.parse("(f 1 2)\n(g)").unwrap(), &mut fresh);
        let g = new.node_at_path(&[1]).unwrap();
        assert!(g.id > old_max);
        // fresh ids go out in preorder, so the innermost new node is the max
        assert_eq!(new.max_id(), Some(new.node_at_path(&[1, 0]).unwrap().id));
        assert_eq!(Ast::empty().max_id(), None);
    }

    #[test]
    fn parent_and_ancestors_follow_paths() {
        let ast = ast_of("(f (g 1) 2)");
        let one = ast.node_at_path(&[0, 1, 1]).unwrap();
        assert_eq!(one.kind_name(), "Literal");

        let parent = ast.parent(one.id).unwrap();
        assert_eq!(parent.id, ast.node_at_path(&[0, 1]).unwrap().id);

        let ancestors: Vec<_> = ast.ancestors(one.id).iter().map(|n| n.id).collect();
        assert_eq!(ancestors, vec![ast.roots()[0].id, parent.id]);
        assert!(ast.parent(ast.roots()[0].id).is_none());
    }

    #[test]
    fn every_node_is_indexed_with_a_distinct_id() {
        let ast = ast_of("(define (f x) (+ x 1))\n(f 2)");
        let nodes = ast.nodes();
        assert_eq!(nodes.len(), ast.len());
        for node in nodes {
            assert!(node.id.is_assigned());
            assert_eq!(ast.get(node.id).unwrap().id, node.id);
        }
    }

    #[test]
    fn node_before_prefers_outermost_finished_node() {
        let ast = ast_of("(f 1 2)\n(g 3)");
        let before = ast.node_before(Pos::new(0, 7)).unwrap();
        assert_eq!(before.id, ast.roots()[0].id);

        // inside `(f 1 2)`, right after `1`
        let before = ast.node_before(Pos::new(0, 4)).unwrap();
        assert_eq!(before.id, ast.node_at_path(&[0, 1]).unwrap().id);

        assert!(ast.node_before(Pos::new(0, 0)).is_none());
    }
}
