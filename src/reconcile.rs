//! Identity transfer from an old tree onto a freshly parsed one.
//!
//! At each level the old children are indexed by structural hash. A new child
//! with a matching hash takes over the whole matched subtree's ids. When at
//! least one child matched, or at most one new child is left over, the
//! leftovers are paired by position and the walk descends into each pair, so
//! the inside of an edited subtree still keeps most of its identity. Anything
//! else keeps the fresh id it was given up front.

use crate::ast::{Ast, IdGenerator, Node, NodeId};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Subtrees matched wholesale by hash.
    pub matched: usize,
    /// Nodes paired by position after hash matching.
    pub paired: usize,
    /// New children left with fresh identity at levels with no match.
    pub unmatched: usize,
}

/// Reconcile `new_roots` (straight from a parser) against `old`.
///
/// Never fails: every new node ends up with either an inherited or a fresh id.
pub fn reconcile(old: &Ast, new_roots: Vec<Node>, ids: &mut IdGenerator) -> Ast {
    reconcile_with_stats(old, new_roots, ids).0
}

pub fn reconcile_with_stats(
    old: &Ast,
    mut new_roots: Vec<Node>,
    ids: &mut IdGenerator,
) -> (Ast, ReconcileStats) {
    for root in old.roots() {
        advance_past_subtree(root, ids);
    }
    for root in &mut new_roots {
        assign_fresh(root, ids);
    }

    let mut stats = ReconcileStats::default();
    unify_children(
        old.roots().iter().collect(),
        new_roots.iter_mut().collect(),
        &mut stats,
    );
    debug!(
        matched = stats.matched,
        paired = stats.paired,
        unmatched = stats.unmatched,
        "reconciled tree"
    );
    (Ast::new(new_roots), stats)
}

fn advance_past_subtree(node: &Node, ids: &mut IdGenerator) {
    ids.advance_past(node.id);
    if let Some(comment) = &node.comment {
        ids.advance_past(comment.id);
    }
    for child in node.children() {
        advance_past_subtree(child, ids);
    }
}

fn assign_fresh(node: &mut Node, ids: &mut IdGenerator) {
    node.id = ids.fresh();
    if let Some(comment) = node.comment.as_deref_mut() {
        comment.id = ids.fresh();
    }
    for child in node.children_mut() {
        assign_fresh(child, ids);
    }
}

fn unify_children(old: Vec<&Node>, new: Vec<&mut Node>, stats: &mut ReconcileStats) {
    // pushed in reverse so that popping yields the earliest sibling first
    let mut by_hash: HashMap<u64, Vec<usize>> = HashMap::new();
    for (i, node) in old.iter().enumerate().rev() {
        by_hash.entry(node.hash).or_default().push(i);
    }

    let mut consumed = vec![false; old.len()];
    let mut new_left = Vec::new();
    for node in new {
        match by_hash.get_mut(&node.hash).and_then(Vec::pop) {
            Some(i) => {
                copy_ids(old[i], node);
                consumed[i] = true;
                stats.matched += 1;
            }
            None => new_left.push(node),
        }
    }
    let matched_any = consumed.iter().any(|&c| c);

    let old_left: Vec<&Node> = old
        .into_iter()
        .zip(consumed)
        .filter_map(|(node, used)| (!used).then_some(node))
        .collect();

    if matched_any || new_left.len() <= 1 {
        for (old_node, new_node) in old_left.into_iter().zip(new_left) {
            unify_node(old_node, new_node, stats);
        }
    } else {
        stats.unmatched += new_left.len();
    }
}

/// Positional pairing: the new node inherits the old id unconditionally.
fn unify_node(old: &Node, new: &mut Node, stats: &mut ReconcileStats) {
    new.id = old.id;
    copy_comment_id(old, new);
    stats.paired += 1;
    unify_children(old.children(), new.children_mut(), stats);
}

/// Hash match: walk both subtrees in lockstep and copy every id.
fn copy_ids(old: &Node, new: &mut Node) {
    new.id = old.id;
    copy_comment_id(old, new);
    for (old_child, new_child) in old.children().into_iter().zip(new.children_mut()) {
        copy_ids(old_child, new_child);
    }
}

fn copy_comment_id(old: &Node, new: &mut Node) {
    if let (Some(old_comment), Some(new_comment)) =
        (old.comment.as_deref(), new.comment.as_deref_mut())
    {
        new_comment.id = old_comment.id;
    }
}

/// Ids present in both trees.
pub fn shared_ids(a: &Ast, b: &Ast) -> Vec<NodeId> {
    a.nodes()
        .into_iter()
        .map(|n| n.id)
        .filter(|id| b.contains(*id))
        .collect()
}
