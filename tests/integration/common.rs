use blockedit::ast::{Ast, IdGenerator, NodeId};
use blockedit::lang::Parse;
use blockedit::{reconcile, EditorConfig, Session, SexprParser, StringBuffer};

pub fn session(src: &str) -> Session<SexprParser> {
    Session::new(StringBuffer::new(src), SexprParser, EditorConfig::default()).unwrap()
}

pub fn id_at(session: &Session<SexprParser>, path: &[usize]) -> NodeId {
    session.ast().node_at_path(path).unwrap().id
}

/// Parse and identify `src` from scratch.
pub fn identified(src: &str, ids: &mut IdGenerator) -> Ast {
    reconcile(&Ast::empty(), SexprParser.parse(src).unwrap(), ids)
}

/// Every id in preorder.
pub fn preorder_ids(ast: &Ast) -> Vec<NodeId> {
    ast.nodes().iter().map(|n| n.id).collect()
}
