//! Blockedit: the editing core of a structural (block-based) code editor.
//!
//! A document lives in a host [`TextBuffer`]; a parsed, identified tree
//! ([`Ast`]) mirrors it. Structural edits against the tree are translated
//! into minimal text changes, validated by parsing the candidate text, and
//! committed to the buffer. The new tree is then reconciled against the old
//! one so node identity survives the edit.
//!
//! # Architecture
//!
//! - Root-level edits lower directly to a [`TextChange`].
//! - Edits inside a node are grouped by their outermost affected ancestor.
//!   Each group mutates a clone of that ancestor and is pretty-printed back
//!   into a single replacement of the ancestor's range.
//! - Nothing touches the buffer until the whole candidate document parses.
//!
//! # Example
//!
//! ```
//! use blockedit::{Edit, EditorConfig, Session, SexprParser, StringBuffer};
//!
//! let buffer = StringBuffer::new("(define (area r) (* pi r r))");
//! let mut session = Session::new(buffer, SexprParser, EditorConfig::default()).unwrap();
//!
//! let body = session.ast().node_at_path(&[0, 2]).unwrap().id;
//! let edit = Edit::replace(session.ast(), "(* 3 r r)", body).unwrap();
//! session.perform_edit(vec![edit]).unwrap();
//!
//! assert_eq!(session.text(), "(define (area r) (* 3 r r))");
//! ```

pub mod ast;
pub mod buffer;
pub mod commit;
pub mod config;
pub mod edit;
pub mod history;
pub mod lang;
pub mod pretty;
pub mod reconcile;
pub mod session;
pub mod validate;

// Re-exports
pub use ast::{Ast, IdGenerator, Node, NodeId, NodeKind, Pos, Span};
pub use buffer::{StringBuffer, TextBuffer};
pub use commit::Committed;
pub use config::{
    apply_script, load_config_from_path, load_script_from_path, ApplicationError, ConfigError,
    EditScript, EditorConfig,
};
pub use edit::{DropTarget, Edit, EditError, EditKind, FocusHint, TextChange};
pub use history::{FocusMark, History};
pub use lang::{Parse, ParseError, SexprParser};
pub use reconcile::reconcile;
pub use session::Session;
pub use validate::speculate;
