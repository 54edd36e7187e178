//! Racket-flavoured s-expression parser.
//!
//! Lists are read first; then each list is classified by its head symbol into
//! a special form. Form readers never fail: a list that does not have the
//! expected shape comes back as [`Shape::Fallback`] and is kept as
//! [`NodeKind::Unknown`]. Only lexical and bracket errors are [`ParseError`]s.

use super::lexer::{tokenize, Token, TokenKind};
use super::{Parse, ParseError};
use crate::ast::node::BLANK_TEXT;
use crate::ast::{LetForm, LiteralType, Node, NodeKind, Pos, Span, WhenForm};

#[derive(Debug, Clone, Copy, Default)]
pub struct SexprParser;

impl Parse for SexprParser {
    fn parse(&self, text: &str) -> Result<Vec<Node>, ParseError> {
        let tokens = tokenize(text)?;
        let mut reader = Reader { tokens, next: 0 };
        let (elems, _) = reader.read_seq(None)?;
        Ok(attach_comments(elems))
    }
}

enum Elem<'a> {
    Expr(Node),
    Comment(Token<'a>),
}

/// Result of reading a special form.
enum Shape {
    Ok(NodeKind),
    Fallback(Vec<Node>),
}

struct Reader<'a> {
    tokens: Vec<Token<'a>>,
    next: usize,
}

impl<'a> Reader<'a> {
    /// Read elements until the closer matching `open` (or end of input at top level).
    fn read_seq(&mut self, open: Option<Token<'a>>) -> Result<(Vec<Elem<'a>>, Pos), ParseError> {
        let mut elems = Vec::new();
        loop {
            let Some(tok) = self.tokens.get(self.next).copied() else {
                return match open {
                    Some(o) => Err(ParseError::new(
                        format!("unclosed `{}`", o.text),
                        o.span.from,
                    )),
                    None => Ok((elems, self.tokens.last().map(|t| t.span.to).unwrap_or_default())),
                };
            };
            self.next += 1;

            match tok.kind {
                TokenKind::Open(_) => {
                    let node = self.read_list(tok)?;
                    elems.push(Elem::Expr(node));
                }
                TokenKind::Close(c) => {
                    return match open {
                        Some(Token {
                            kind: TokenKind::Open(o),
                            ..
                        }) if closer_for(o) == c => Ok((elems, tok.span.to)),
                        Some(o) => Err(ParseError::new(
                            format!("`{}` closed by `{}`", o.text, c),
                            tok.span.from,
                        )),
                        None => Err(ParseError::new(format!("unexpected `{c}`"), tok.span.from)),
                    };
                }
                TokenKind::Comment => elems.push(Elem::Comment(tok)),
                TokenKind::Atom | TokenKind::Str => elems.push(Elem::Expr(atom(tok))),
            }
        }
    }

    fn read_list(&mut self, open: Token<'a>) -> Result<Node, ParseError> {
        let (elems, end) = self.read_seq(Some(open))?;
        let span = Span::new(open.span.from, end);
        Ok(Node::new(classify(attach_comments(elems)), span))
    }
}

fn closer_for(open: char) -> char {
    if open == '[' {
        ']'
    } else {
        ')'
    }
}

fn atom(tok: Token<'_>) -> Node {
    let text = tok.text;
    if tok.kind == TokenKind::Str {
        return Node::literal(text, LiteralType::String, tok.span);
    }
    if text == BLANK_TEXT {
        return Node::new(NodeKind::Blank, tok.span);
    }
    let data_type = if matches!(text, "#t" | "#f" | "#true" | "#false") {
        LiteralType::Boolean
    } else if is_number(text) {
        LiteralType::Number
    } else {
        LiteralType::Symbol
    };
    Node::literal(text, data_type, tok.span)
}

fn is_number(text: &str) -> bool {
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    let Some(first) = unsigned.chars().next() else {
        return false;
    };
    if !(first.is_ascii_digit() || first == '.') {
        return false;
    }
    if let Some((num, den)) = unsigned.split_once('/') {
        return !num.is_empty()
            && !den.is_empty()
            && num.chars().all(|c| c.is_ascii_digit())
            && den.chars().all(|c| c.is_ascii_digit());
    }
    unsigned.parse::<f64>().is_ok()
}

/// Attach comments to neighbouring expressions.
///
/// A comment on the line an expression ends on belongs to that expression.
/// Other comments belong to the next expression, or the previous one when
/// nothing follows. Comments in a list without expressions are dropped.
fn attach_comments(elems: Vec<Elem<'_>>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::new();
    let mut pending: Vec<Token<'_>> = Vec::new();

    for elem in elems {
        match elem {
            Elem::Comment(tok) => {
                let trailing = pending.is_empty()
                    && out
                        .last()
                        .is_some_and(|prev| prev.span.to.line == tok.span.from.line);
                if trailing {
                    if let Some(prev) = out.pop() {
                        out.push(add_comment(prev, token_blocks(&[tok])));
                    }
                } else {
                    pending.push(tok);
                }
            }
            Elem::Expr(node) => {
                out.push(add_comment(node, token_blocks(&pending)));
                pending.clear();
            }
        }
    }

    if !pending.is_empty() {
        match out.pop() {
            Some(prev) => out.push(add_comment(prev, token_blocks(&pending))),
            None => tracing::debug!(count = pending.len(), "dropping comments with no expression"),
        }
    }
    out
}

type CommentBlock = (Span, String);

fn token_blocks(tokens: &[Token<'_>]) -> Vec<CommentBlock> {
    tokens.iter().map(|t| (t.span, t.text.to_string())).collect()
}

fn comment_block(comment: Option<Box<Node>>) -> Option<CommentBlock> {
    let comment = comment?;
    match &comment.kind {
        NodeKind::Comment { text } => Some((comment.span, text.to_string())),
        _ => None,
    }
}

/// Merge comment blocks into the node's comment, in source order.
fn add_comment(mut node: Node, mut blocks: Vec<CommentBlock>) -> Node {
    if blocks.is_empty() {
        return node;
    }
    blocks.extend(comment_block(node.comment.take()));
    blocks.sort_by_key(|(span, _)| span.from);

    let span = blocks
        .iter()
        .map(|(span, _)| *span)
        .reduce(|a, b| a.union(b))
        .unwrap_or_default();
    let text = blocks
        .into_iter()
        .map(|(_, text)| text)
        .collect::<Vec<_>>()
        .join("\n");
    node.with_comment(Some(Node::comment_node(&text, span)))
}

fn classify(mut items: Vec<Node>) -> NodeKind {
    let head = items.first().and_then(Node::symbol).map(str::to_owned);
    let Some(head) = head else {
        return plain_list(items);
    };

    let is_form = matches!(
        head.as_str(),
        "define"
            | "define-struct"
            | "lambda"
            | "if"
            | "cond"
            | "let"
            | "let*"
            | "letrec"
            | "when"
            | "unless"
            | "begin"
    );
    if !is_form {
        return plain_list(items);
    }
    shift_keyword_comment(&mut items);

    let shape = match head.as_str() {
        "define" => define_form(items),
        "define-struct" => struct_form(items),
        "lambda" => lambda_form(items),
        "if" => if_form(items),
        "cond" => cond_form(items),
        "let" => let_form(LetForm::Let, items),
        "let*" => let_form(LetForm::LetStar, items),
        "letrec" => let_form(LetForm::Letrec, items),
        "when" => when_form(WhenForm::When, items),
        "unless" => when_form(WhenForm::Unless, items),
        _ => begin_form(items),
    };

    match shape {
        Shape::Ok(kind) => kind,
        Shape::Fallback(elts) => NodeKind::Unknown { elts },
    }
}

fn plain_list(items: Vec<Node>) -> NodeKind {
    let mut items = items.into_iter();
    match items.next() {
        Some(func) => NodeKind::FunctionApp {
            func: Box::new(func),
            args: items.collect(),
        },
        None => NodeKind::Unknown { elts: Vec::new() },
    }
}

/// The keyword itself is not kept in the tree; its comment moves to the
/// next element so printing does not lose it.
fn shift_keyword_comment(items: &mut [Node]) {
    if let [keyword, next, ..] = items {
        if let Some(block) = comment_block(keyword.comment.take()) {
            keyword.hash = crate::ast::structural_hash(&keyword.kind, None);
            let owned = std::mem::replace(next, Node::fake_blank(Span::default()));
            *next = add_comment(owned, vec![block]);
        }
    }
}

fn is_symbol_list(node: &Node, allow_empty: bool) -> bool {
    match &node.kind {
        NodeKind::FunctionApp { func, args } => {
            func.symbol().is_some() && args.iter().all(|a| a.symbol().is_some())
        }
        NodeKind::Unknown { elts } => allow_empty && elts.is_empty(),
        _ => false,
    }
}

/// Elements of a list already checked by [`is_symbol_list`].
fn list_elements(kind: NodeKind) -> Vec<Node> {
    match kind {
        NodeKind::FunctionApp { func, args } => {
            let mut items = vec![*func];
            items.extend(args);
            items
        }
        NodeKind::Unknown { elts } => elts,
        _ => Vec::new(),
    }
}

fn identifier_list(list: Node) -> Node {
    let Node {
        span, kind, comment, ..
    } = list;
    Node::new(
        NodeKind::IdentifierList {
            ids: list_elements(kind),
        },
        span,
    )
    .with_comment(comment.map(|c| *c))
}

fn define_form(items: Vec<Node>) -> Shape {
    let [kw, target, body] = match <[Node; 3]>::try_from(items) {
        Ok(parts) => parts,
        Err(items) => return Shape::Fallback(items),
    };

    if target.symbol().is_some() {
        return Shape::Ok(NodeKind::VariableDefinition {
            name: Box::new(target),
            body: Box::new(body),
        });
    }
    if !is_symbol_list(&target, false) {
        return Shape::Fallback(vec![kw, target, body]);
    }

    let Node { kind, comment, .. } = target;
    let mut parts = list_elements(kind).into_iter();
    let Some(name) = parts.next() else {
        return Shape::Fallback(vec![kw, body]);
    };
    let ids: Vec<Node> = parts.collect();
    let params_span = match (ids.first(), ids.last()) {
        (Some(first), Some(last)) => Span::new(first.src_range().from, last.src_range().to),
        _ => Span::point(name.span.to),
    };
    // the header list has no node of its own; its comment goes to the name
    let name = add_comment(name, comment_block(comment).into_iter().collect());

    Shape::Ok(NodeKind::FunctionDefinition {
        name: Box::new(name),
        params: Box::new(Node::new(NodeKind::IdentifierList { ids }, params_span)),
        body: Box::new(body),
    })
}

fn struct_form(items: Vec<Node>) -> Shape {
    let [kw, name, fields] = match <[Node; 3]>::try_from(items) {
        Ok(parts) => parts,
        Err(items) => return Shape::Fallback(items),
    };
    if name.symbol().is_none() || !is_symbol_list(&fields, true) {
        return Shape::Fallback(vec![kw, name, fields]);
    }
    Shape::Ok(NodeKind::StructDefinition {
        name: Box::new(name),
        fields: Box::new(identifier_list(fields)),
    })
}

fn lambda_form(items: Vec<Node>) -> Shape {
    let [kw, args, body] = match <[Node; 3]>::try_from(items) {
        Ok(parts) => parts,
        Err(items) => return Shape::Fallback(items),
    };
    if !is_symbol_list(&args, true) {
        return Shape::Fallback(vec![kw, args, body]);
    }
    Shape::Ok(NodeKind::Lambda {
        args: Box::new(identifier_list(args)),
        body: Box::new(body),
    })
}

fn if_form(items: Vec<Node>) -> Shape {
    if !(3..=4).contains(&items.len()) {
        return Shape::Fallback(items);
    }
    let mut parts = items.into_iter().skip(1);
    match (parts.next(), parts.next()) {
        (Some(test), Some(then)) => Shape::Ok(NodeKind::If {
            test: Box::new(test),
            then: Box::new(then),
            otherwise: parts.next().map(Box::new),
        }),
        _ => Shape::Fallback(Vec::new()),
    }
}

fn cond_form(items: Vec<Node>) -> Shape {
    let clauses_ok = items[1..]
        .iter()
        .all(|n| matches!(n.kind, NodeKind::FunctionApp { .. }));
    if !clauses_ok {
        return Shape::Fallback(items);
    }
    let clauses = items
        .into_iter()
        .skip(1)
        .map(|clause| {
            let Node {
                span, kind, comment, ..
            } = clause;
            let kind = match kind {
                NodeKind::FunctionApp { func, args } => NodeKind::CondClause {
                    test: func,
                    body: args,
                },
                other => other,
            };
            Node::new(kind, span).with_comment(comment.map(|c| *c))
        })
        .collect();
    Shape::Ok(NodeKind::Cond { clauses })
}

fn is_binding(node: &Node) -> bool {
    matches!(&node.kind, NodeKind::FunctionApp { func, args } if func.symbol().is_some() && args.len() == 1)
}

fn let_form(form: LetForm, items: Vec<Node>) -> Shape {
    let [kw, bindings, body] = match <[Node; 3]>::try_from(items) {
        Ok(parts) => parts,
        Err(items) => return Shape::Fallback(items),
    };
    let well_formed = match &bindings.kind {
        NodeKind::FunctionApp { func, args } => is_binding(func) && args.iter().all(is_binding),
        NodeKind::Unknown { elts } => elts.is_empty(),
        _ => false,
    };
    if !well_formed {
        return Shape::Fallback(vec![kw, bindings, body]);
    }

    let Node { kind, comment, .. } = bindings;
    let mut pairs: Vec<Node> = list_elements(kind)
        .into_iter()
        .map(|pair| {
            let Node {
                span, kind, comment, ..
            } = pair;
            let kind = match kind {
                NodeKind::FunctionApp { func, mut args } if args.len() == 1 => {
                    NodeKind::Binding {
                        name: func,
                        value: Box::new(args.remove(0)),
                    }
                }
                other => other,
            };
            Node::new(kind, span).with_comment(comment.map(|c| *c))
        })
        .collect();

    // the bindings list has no node of its own; keep its comment nearby
    let block: Vec<_> = comment_block(comment).into_iter().collect();
    let body = match pairs.first_mut() {
        Some(first) => {
            let owned = std::mem::replace(first, Node::fake_blank(Span::default()));
            *first = add_comment(owned, block);
            body
        }
        None => add_comment(body, block),
    };

    Shape::Ok(NodeKind::LetLike {
        form,
        bindings: pairs,
        body: Box::new(body),
    })
}

fn when_form(form: WhenForm, items: Vec<Node>) -> Shape {
    if items.len() < 2 {
        return Shape::Fallback(items);
    }
    let mut parts = items.into_iter().skip(1);
    match parts.next() {
        Some(predicate) => Shape::Ok(NodeKind::WhenUnless {
            form,
            predicate: Box::new(predicate),
            exprs: parts.collect(),
        }),
        None => Shape::Fallback(Vec::new()),
    }
}

fn begin_form(items: Vec<Node>) -> Shape {
    Shape::Ok(NodeKind::Sequence {
        exprs: items.into_iter().skip(1).collect(),
    })
}
