//! Pretty-printing for every [`NodeKind`].

use crate::ast::node::BLANK_TEXT;
use crate::ast::{Node, NodeKind};
use crate::pretty::Doc;

/// Body indentation for broken special forms and applications.
pub const INDENT: usize = 2;

impl Node {
    /// The node (and its comment, on the lines above it) as a [`Doc`].
    pub fn pretty(&self) -> Doc {
        let body = self.pretty_kind();
        match self.comment.as_deref() {
            Some(comment) => Doc::concat([comment.pretty_kind(), Doc::HardLine, body]),
            None => body,
        }
    }

    fn pretty_kind(&self) -> Doc {
        match &self.kind {
            NodeKind::Literal { value, .. } => Doc::text(&**value),
            NodeKind::Blank | NodeKind::FakeBlank => Doc::text(BLANK_TEXT),
            NodeKind::Comment { text } => {
                Doc::join(text.lines().map(|line| Doc::text(line)), Doc::HardLine)
            }
            NodeKind::FakeInsert { text } => Doc::text(&**text),
            NodeKind::FunctionApp { func, args } => sexpr(func.pretty(), pretty_all(args)),
            NodeKind::IdentifierList { ids } => bracketed('(', ')', pretty_all(ids)),
            NodeKind::VariableDefinition { name, body } => {
                form(Doc::text("define"), vec![name.pretty(), body.pretty()])
            }
            NodeKind::FunctionDefinition { name, params, body } => {
                let mut header = vec![name.pretty()];
                match &params.kind {
                    NodeKind::IdentifierList { ids } => header.extend(pretty_all(ids)),
                    _ => header.push(params.pretty()),
                }
                form(
                    Doc::text("define"),
                    vec![bracketed('(', ')', header), body.pretty()],
                )
            }
            NodeKind::Lambda { args, body } => {
                form(Doc::text("lambda"), vec![args.pretty(), body.pretty()])
            }
            NodeKind::StructDefinition { name, fields } => {
                form(Doc::text("define-struct"), vec![name.pretty(), fields.pretty()])
            }
            NodeKind::If {
                test,
                then,
                otherwise,
            } => {
                let mut parts = vec![test.pretty(), then.pretty()];
                parts.extend(otherwise.iter().map(|e| e.pretty()));
                form(Doc::text("if"), parts)
            }
            NodeKind::Cond { clauses } => sexpr(Doc::text("cond"), pretty_all(clauses)),
            NodeKind::CondClause { test, body } => {
                let mut parts = vec![test.pretty()];
                parts.extend(pretty_all(body));
                bracketed('[', ']', parts)
            }
            NodeKind::LetLike {
                form,
                bindings,
                body,
            } => self::form(
                Doc::text(form.keyword()),
                vec![bracketed('(', ')', pretty_all(bindings)), body.pretty()],
            ),
            NodeKind::Binding { name, value } => {
                bracketed('[', ']', vec![name.pretty(), value.pretty()])
            }
            NodeKind::WhenUnless {
                form,
                predicate,
                exprs,
            } => {
                let mut parts = vec![predicate.pretty()];
                parts.extend(pretty_all(exprs));
                self::form(Doc::text(form.keyword()), parts)
            }
            NodeKind::Sequence { exprs } => sexpr(Doc::text("begin"), pretty_all(exprs)),
            NodeKind::Unknown { elts } => bracketed('(', ')', pretty_all(elts)),
        }
    }
}

fn pretty_all(nodes: &[Node]) -> Vec<Doc> {
    nodes.iter().map(Node::pretty).collect()
}

/// `(head item ...)`, breaking with items indented under the head.
fn sexpr(head: Doc, items: Vec<Doc>) -> Doc {
    let items = Doc::concat(items.into_iter().flat_map(|d| [Doc::Line, d])).nest(INDENT);
    Doc::concat([Doc::text("("), head, items, Doc::text(")")]).group()
}

/// Special form: like [`sexpr`] but the first item stays on the head's line.
fn form(head: Doc, items: Vec<Doc>) -> Doc {
    let mut items = items.into_iter();
    let Some(first) = items.next() else {
        return sexpr(head, Vec::new());
    };
    let rest = Doc::concat(
        std::iter::once(Doc::text(" "))
            .chain(std::iter::once(first))
            .chain(items.flat_map(|d| [Doc::Line, d])),
    )
    .nest(INDENT);
    Doc::concat([Doc::text("("), head, rest, Doc::text(")")]).group()
}

/// `(a b c)`, breaking with items aligned after the opener.
fn bracketed(open: char, close: char, items: Vec<Doc>) -> Doc {
    Doc::concat([
        Doc::text(open),
        Doc::join(items, Doc::Line).nest(1),
        Doc::text(close),
    ])
    .group()
}
