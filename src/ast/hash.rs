//! Structural hashing.
//!
//! A node's hash covers its kind tag, payload text, the hashes of its children
//! slot by slot, and its attached comment. Ids and positions never enter the
//! serialization, so a subtree moved elsewhere in the document keeps its hash.

use super::node::{NodeKind, SlotRef};
use super::Node;
use xxhash_rust::xxh3::xxh3_64;

const OPTIONAL_EMPTY: u8 = 0;
const OPTIONAL_PRESENT: u8 = 1;

/// Hash a node's content from its kind and comment.
pub fn structural_hash(kind: &NodeKind, comment: Option<&Node>) -> u64 {
    let mut buf = Vec::with_capacity(64);
    buf.extend_from_slice(kind.name().as_bytes());
    buf.push(0);

    match kind {
        NodeKind::Literal { value, data_type } => {
            buf.push(*data_type as u8);
            write_str(&mut buf, value);
        }
        NodeKind::Comment { text } | NodeKind::FakeInsert { text } => write_str(&mut buf, text),
        NodeKind::LetLike { form, .. } => write_str(&mut buf, form.keyword()),
        NodeKind::WhenUnless { form, .. } => write_str(&mut buf, form.keyword()),
        _ => {}
    }

    for (spec, slot) in kind.slot_refs() {
        write_str(&mut buf, spec.field());
        match slot {
            SlotRef::Single(child) => buf.extend_from_slice(&child.hash.to_le_bytes()),
            SlotRef::Optional(None) => buf.push(OPTIONAL_EMPTY),
            SlotRef::Optional(Some(child)) => {
                buf.push(OPTIONAL_PRESENT);
                buf.extend_from_slice(&child.hash.to_le_bytes());
            }
            SlotRef::List(children) => {
                buf.extend_from_slice(&(children.len() as u64).to_le_bytes());
                for child in children {
                    buf.extend_from_slice(&child.hash.to_le_bytes());
                }
            }
        }
    }

    if let Some(comment) = comment {
        buf.extend_from_slice(b"comment");
        buf.extend_from_slice(&comment.hash.to_le_bytes());
    }

    xxh3_64(&buf)
}

fn write_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u64).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{LiteralType, Pos, Span};

    fn at(line: usize, ch: usize, len: usize) -> Span {
        Span::new(Pos::new(line, ch), Pos::new(line, ch + len))
    }

    fn app(span: Span, func: Node, args: Vec<Node>) -> Node {
        Node::new(
            NodeKind::FunctionApp {
                func: Box::new(func),
                args,
            },
            span,
        )
    }

    #[test]
    fn hash_ignores_position_and_id() {
        let a = app(
            at(0, 0, 7),
            Node::literal("f", LiteralType::Symbol, at(0, 1, 1)),
            vec![Node::literal("1", LiteralType::Number, at(0, 3, 1))],
        );
        let mut b = app(
            at(4, 9, 7),
            Node::literal("f", LiteralType::Symbol, at(4, 10, 1)),
            vec![Node::literal("1", LiteralType::Number, at(4, 12, 1))],
        );
        b.id = crate::ast::IdGenerator::new().fresh();
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn hash_distinguishes_literal_types() {
        let sym = Node::literal("1", LiteralType::Symbol, Span::default());
        let num = Node::literal("1", LiteralType::Number, Span::default());
        assert_ne!(sym.hash, num.hash);
    }

    #[test]
    fn hash_distinguishes_argument_order() {
        let one = || Node::literal("1", LiteralType::Number, Span::default());
        let two = || Node::literal("2", LiteralType::Number, Span::default());
        let f = || Node::literal("f", LiteralType::Symbol, Span::default());
        let a = app(Span::default(), f(), vec![one(), two()]);
        let b = app(Span::default(), f(), vec![two(), one()]);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn hash_includes_comment() {
        let bare = Node::literal("x", LiteralType::Symbol, Span::default());
        let commented = bare
            .clone()
            .with_comment(Some(Node::comment_node("; hi", Span::default())));
        assert_ne!(bare.hash, commented.hash);
        assert_eq!(commented.clone().with_comment(None).hash, bare.hash);
    }

    #[test]
    fn hash_is_deterministic() {
        let kind = NodeKind::Literal {
            value: "abc".into(),
            data_type: LiteralType::String,
        };
        assert_eq!(structural_hash(&kind, None), structural_hash(&kind, None));
    }
}
