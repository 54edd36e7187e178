use super::{structural_hash, NodeId, Pos, Span};
use serde::Serialize;
use std::sync::Arc;

/// Token text shown by a deleted required slot.
pub const BLANK_TEXT: &str = "...";

/// One syntactic unit of a document.
///
/// `hash` is a positional-invariant fingerprint of `kind` (and the attached
/// comment); it is computed once at construction. Edits only ever mutate
/// disposable clones, whose hashes are never consulted again.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub span: Span,
    pub hash: u64,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Box<Node>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LiteralType {
    Number,
    String,
    Boolean,
    Symbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LetForm {
    Let,
    LetStar,
    Letrec,
}

impl LetForm {
    pub fn keyword(&self) -> &'static str {
        match self {
            LetForm::Let => "let",
            LetForm::LetStar => "let*",
            LetForm::Letrec => "letrec",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WhenForm {
    When,
    Unless,
}

impl WhenForm {
    pub fn keyword(&self) -> &'static str {
        match self {
            WhenForm::When => "when",
            WhenForm::Unless => "unless",
        }
    }
}

/// Closed set of node kinds. Payload text is shared (`Arc<str>`) so cloning a
/// subtree copies structure but not literal text.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    Literal {
        value: Arc<str>,
        data_type: LiteralType,
    },
    /// The `...` hole.
    Blank,
    Comment {
        text: Arc<str>,
    },
    FunctionApp {
        func: Box<Node>,
        args: Vec<Node>,
    },
    IdentifierList {
        ids: Vec<Node>,
    },
    VariableDefinition {
        name: Box<Node>,
        body: Box<Node>,
    },
    FunctionDefinition {
        name: Box<Node>,
        params: Box<Node>,
        body: Box<Node>,
    },
    Lambda {
        args: Box<Node>,
        body: Box<Node>,
    },
    StructDefinition {
        name: Box<Node>,
        fields: Box<Node>,
    },
    If {
        test: Box<Node>,
        then: Box<Node>,
        otherwise: Option<Box<Node>>,
    },
    Cond {
        clauses: Vec<Node>,
    },
    CondClause {
        test: Box<Node>,
        body: Vec<Node>,
    },
    LetLike {
        form: LetForm,
        bindings: Vec<Node>,
        body: Box<Node>,
    },
    Binding {
        name: Box<Node>,
        value: Box<Node>,
    },
    WhenUnless {
        form: WhenForm,
        predicate: Box<Node>,
        exprs: Vec<Node>,
    },
    Sequence {
        exprs: Vec<Node>,
    },
    /// A list the parser could not classify.
    Unknown {
        elts: Vec<Node>,
    },
    /// Stand-in for caller-supplied text inside a cloned ancestor.
    FakeInsert {
        text: Arc<str>,
    },
    /// Stand-in for a deleted required child inside a cloned ancestor.
    FakeBlank,
}

/// Declared child slot of a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSpec {
    Required(&'static str),
    Optional(&'static str),
    List(&'static str),
}

impl SlotSpec {
    pub fn field(&self) -> &'static str {
        match self {
            SlotSpec::Required(f) | SlotSpec::Optional(f) | SlotSpec::List(f) => f,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum SlotRef<'a> {
    Single(&'a Node),
    Optional(Option<&'a Node>),
    List(&'a [Node]),
}

impl<'a> SlotRef<'a> {
    pub fn nodes(self) -> Vec<&'a Node> {
        match self {
            SlotRef::Single(n) => vec![n],
            SlotRef::Optional(n) => n.into_iter().collect(),
            SlotRef::List(ns) => ns.iter().collect(),
        }
    }
}

#[derive(Debug)]
pub enum SlotMut<'a> {
    Single(&'a mut Box<Node>),
    Optional(&'a mut Option<Box<Node>>),
    List(&'a mut Vec<Node>),
}

impl<'a> SlotMut<'a> {
    pub fn nodes(self) -> Vec<&'a mut Node> {
        match self {
            SlotMut::Single(n) => vec![n.as_mut()],
            SlotMut::Optional(n) => n.as_deref_mut().into_iter().collect(),
            SlotMut::List(ns) => ns.iter_mut().collect(),
        }
    }
}

impl NodeKind {
    /// Every child slot in declaration order, with borrowed contents.
    pub fn slot_refs(&self) -> Vec<(SlotSpec, SlotRef<'_>)> {
        use SlotRef as R;
        use SlotSpec::*;
        match self {
            NodeKind::Literal { .. }
            | NodeKind::Blank
            | NodeKind::Comment { .. }
            | NodeKind::FakeInsert { .. }
            | NodeKind::FakeBlank => Vec::new(),
            NodeKind::FunctionApp { func, args } => {
                vec![(Required("func"), R::Single(func)), (List("args"), R::List(args))]
            }
            NodeKind::IdentifierList { ids } => vec![(List("ids"), R::List(ids))],
            NodeKind::VariableDefinition { name, body } => {
                vec![(Required("name"), R::Single(name)), (Required("body"), R::Single(body))]
            }
            NodeKind::FunctionDefinition { name, params, body } => vec![
                (Required("name"), R::Single(name)),
                (Required("params"), R::Single(params)),
                (Required("body"), R::Single(body)),
            ],
            NodeKind::Lambda { args, body } => {
                vec![(Required("args"), R::Single(args)), (Required("body"), R::Single(body))]
            }
            NodeKind::StructDefinition { name, fields } => vec![
                (Required("name"), R::Single(name)),
                (Required("fields"), R::Single(fields)),
            ],
            NodeKind::If { test, then, otherwise } => vec![
                (Required("test"), R::Single(test)),
                (Required("then"), R::Single(then)),
                (Optional("else"), R::Optional(otherwise.as_deref())),
            ],
            NodeKind::Cond { clauses } => vec![(List("clauses"), R::List(clauses))],
            NodeKind::CondClause { test, body } => {
                vec![(Required("test"), R::Single(test)), (List("body"), R::List(body))]
            }
            NodeKind::LetLike { bindings, body, .. } => vec![
                (List("bindings"), R::List(bindings)),
                (Required("body"), R::Single(body)),
            ],
            NodeKind::Binding { name, value } => vec![
                (Required("name"), R::Single(name)),
                (Required("value"), R::Single(value)),
            ],
            NodeKind::WhenUnless { predicate, exprs, .. } => vec![
                (Required("predicate"), R::Single(predicate)),
                (List("exprs"), R::List(exprs)),
            ],
            NodeKind::Sequence { exprs } => vec![(List("exprs"), R::List(exprs))],
            NodeKind::Unknown { elts } => vec![(List("elts"), R::List(elts))],
        }
    }

    /// Mutable counterpart of [`NodeKind::slot_refs`].
    pub fn slot_muts(&mut self) -> Vec<(SlotSpec, SlotMut<'_>)> {
        use SlotMut as M;
        use SlotSpec::*;
        match self {
            NodeKind::Literal { .. }
            | NodeKind::Blank
            | NodeKind::Comment { .. }
            | NodeKind::FakeInsert { .. }
            | NodeKind::FakeBlank => Vec::new(),
            NodeKind::FunctionApp { func, args } => {
                vec![(Required("func"), M::Single(func)), (List("args"), M::List(args))]
            }
            NodeKind::IdentifierList { ids } => vec![(List("ids"), M::List(ids))],
            NodeKind::VariableDefinition { name, body } => {
                vec![(Required("name"), M::Single(name)), (Required("body"), M::Single(body))]
            }
            NodeKind::FunctionDefinition { name, params, body } => vec![
                (Required("name"), M::Single(name)),
                (Required("params"), M::Single(params)),
                (Required("body"), M::Single(body)),
            ],
            NodeKind::Lambda { args, body } => {
                vec![(Required("args"), M::Single(args)), (Required("body"), M::Single(body))]
            }
            NodeKind::StructDefinition { name, fields } => vec![
                (Required("name"), M::Single(name)),
                (Required("fields"), M::Single(fields)),
            ],
            NodeKind::If { test, then, otherwise } => vec![
                (Required("test"), M::Single(test)),
                (Required("then"), M::Single(then)),
                (Optional("else"), M::Optional(otherwise)),
            ],
            NodeKind::Cond { clauses } => vec![(List("clauses"), M::List(clauses))],
            NodeKind::CondClause { test, body } => {
                vec![(Required("test"), M::Single(test)), (List("body"), M::List(body))]
            }
            NodeKind::LetLike { bindings, body, .. } => vec![
                (List("bindings"), M::List(bindings)),
                (Required("body"), M::Single(body)),
            ],
            NodeKind::Binding { name, value } => vec![
                (Required("name"), M::Single(name)),
                (Required("value"), M::Single(value)),
            ],
            NodeKind::WhenUnless { predicate, exprs, .. } => vec![
                (Required("predicate"), M::Single(predicate)),
                (List("exprs"), M::List(exprs)),
            ],
            NodeKind::Sequence { exprs } => vec![(List("exprs"), M::List(exprs))],
            NodeKind::Unknown { elts } => vec![(List("elts"), M::List(elts))],
        }
    }

    pub fn slot_specs(&self) -> Vec<SlotSpec> {
        self.slot_refs().into_iter().map(|(spec, _)| spec).collect()
    }

    pub fn slot(&self, field: &str) -> Option<(SlotSpec, SlotRef<'_>)> {
        self.slot_refs()
            .into_iter()
            .find(|(spec, _)| spec.field() == field)
    }

    pub fn slot_mut(&mut self, field: &str) -> Option<(SlotSpec, SlotMut<'_>)> {
        self.slot_muts()
            .into_iter()
            .find(|(spec, _)| spec.field() == field)
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Literal { .. } => "Literal",
            NodeKind::Blank => "Blank",
            NodeKind::Comment { .. } => "Comment",
            NodeKind::FunctionApp { .. } => "FunctionApp",
            NodeKind::IdentifierList { .. } => "IdentifierList",
            NodeKind::VariableDefinition { .. } => "VariableDefinition",
            NodeKind::FunctionDefinition { .. } => "FunctionDefinition",
            NodeKind::Lambda { .. } => "Lambda",
            NodeKind::StructDefinition { .. } => "StructDefinition",
            NodeKind::If { .. } => "If",
            NodeKind::Cond { .. } => "Cond",
            NodeKind::CondClause { .. } => "CondClause",
            NodeKind::LetLike { .. } => "LetLike",
            NodeKind::Binding { .. } => "Binding",
            NodeKind::WhenUnless { .. } => "WhenUnless",
            NodeKind::Sequence { .. } => "Sequence",
            NodeKind::Unknown { .. } => "Unknown",
            NodeKind::FakeInsert { .. } => "FakeInsert",
            NodeKind::FakeBlank => "FakeBlank",
        }
    }
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        let hash = structural_hash(&kind, None);
        Self {
            id: NodeId::UNASSIGNED,
            span,
            hash,
            kind,
            comment: None,
        }
    }

    pub fn literal(value: &str, data_type: LiteralType, span: Span) -> Self {
        Self::new(
            NodeKind::Literal {
                value: Arc::from(value),
                data_type,
            },
            span,
        )
    }

    pub fn comment_node(text: &str, span: Span) -> Self {
        Self::new(
            NodeKind::Comment {
                text: Arc::from(text),
            },
            span,
        )
    }

    pub fn fake_insert(text: &str, at: Pos) -> Self {
        Self::new(
            NodeKind::FakeInsert {
                text: Arc::from(text),
            },
            Span::point(at),
        )
    }

    pub fn fake_blank(span: Span) -> Self {
        Self::new(NodeKind::FakeBlank, span)
    }

    /// Attach (or replace) the comment and refresh the hash.
    pub fn with_comment(mut self, comment: Option<Node>) -> Self {
        self.comment = comment.map(Box::new);
        self.hash = structural_hash(&self.kind, self.comment.as_deref());
        self
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Symbol text when this node is a symbol literal.
    pub fn symbol(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Literal {
                value,
                data_type: LiteralType::Symbol,
            } => Some(value),
            _ => None,
        }
    }

    pub fn is_fake(&self) -> bool {
        matches!(self.kind, NodeKind::FakeInsert { .. } | NodeKind::FakeBlank)
    }

    /// Structural children in slot order (comments excluded).
    pub fn children(&self) -> Vec<&Node> {
        self.kind
            .slot_refs()
            .into_iter()
            .flat_map(|(_, slot)| slot.nodes())
            .collect()
    }

    pub fn children_mut(&mut self) -> Vec<&mut Node> {
        self.kind
            .slot_muts()
            .into_iter()
            .flat_map(|(_, slot)| slot.nodes())
            .collect()
    }

    /// Span widened to cover the attached comment.
    pub fn src_range(&self) -> Span {
        match &self.comment {
            Some(c) => self.span.union(c.span),
            None => self.span,
        }
    }

    /// Preorder visit of this node and its structural descendants.
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a Node)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children().into_iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        self.children_mut().into_iter().find_map(|c| c.find_mut(id))
    }

    pub fn contains_id(&self, id: NodeId) -> bool {
        self.find(id).is_some()
    }
}
