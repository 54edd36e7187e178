//! Undo/redo through the session.

use super::common::{id_at, session};
use blockedit::{Edit, EditorConfig, Pos, Session, SexprParser, StringBuffer};

#[test]
fn test_undo_keeps_identity_of_untouched_nodes() {
    let mut s = session("(define a 1)\n(define b 2)");
    let a = id_at(&s, &[0]);
    let edit = Edit::replace(s.ast(), "3", id_at(&s, &[1, 1])).unwrap();
    s.perform_edit(vec![edit]).unwrap();

    assert!(s.undo().unwrap());
    assert_eq!(s.text(), "(define a 1)\n(define b 2)");
    assert_eq!(id_at(&s, &[0]), a);
    assert!(s.history().can_redo());
}

#[test]
fn test_undo_and_redo_walk_several_edits() {
    let mut s = session("(f 1)");
    for text in ["2", "3", "4"] {
        let edit = Edit::replace(s.ast(), text, id_at(&s, &[0, 1])).unwrap();
        s.perform_edit(vec![edit]).unwrap();
    }
    assert_eq!(s.text(), "(f 4)");

    assert!(s.undo().unwrap());
    assert!(s.undo().unwrap());
    assert_eq!(s.text(), "(f 2)");

    assert!(s.redo().unwrap());
    assert_eq!(s.text(), "(f 3)");

    assert!(s.undo().unwrap());
    assert!(s.undo().unwrap());
    assert_eq!(s.text(), "(f 1)");
    assert!(!s.undo().unwrap());
}

#[test]
fn test_new_edit_clears_redo() {
    let mut s = session("(f 1)");
    let edit = Edit::replace(s.ast(), "2", id_at(&s, &[0, 1])).unwrap();
    s.perform_edit(vec![edit]).unwrap();
    s.undo().unwrap();
    assert!(s.history().can_redo());

    let edit = Edit::replace(s.ast(), "9", id_at(&s, &[0, 1])).unwrap();
    s.perform_edit(vec![edit]).unwrap();
    assert!(!s.history().can_redo());
    assert!(!s.redo().unwrap());
    assert_eq!(s.text(), "(f 9)");
}

#[test]
fn test_history_limit_drops_oldest_levels() {
    let config = EditorConfig {
        history_limit: 2,
        ..EditorConfig::default()
    };
    let mut s = Session::new(StringBuffer::new("(f 0)"), SexprParser, config).unwrap();
    for text in ["1", "2", "3"] {
        let edit = Edit::replace(s.ast(), text, id_at(&s, &[0, 1])).unwrap();
        s.perform_edit(vec![edit]).unwrap();
    }
    assert_eq!(s.history().undo_levels(), 2);

    assert!(s.undo().unwrap());
    assert!(s.undo().unwrap());
    assert!(!s.undo().unwrap());
    assert_eq!(s.text(), "(f 1)");
}

#[test]
fn test_undo_focuses_the_restored_node() {
    let mut s = session("(a)\n(b)\n(c)");
    let b = id_at(&s, &[1]);
    s.set_focus(b);

    // the entry's old focus is the node being deleted
    let edit = Edit::delete(s.ast(), b).unwrap();
    s.perform_edit(vec![edit]).unwrap();
    assert!(!s.ast().contains(b));

    assert!(s.undo().unwrap());
    assert_eq!(s.text(), "(a)\n(b)\n(c)");
    assert!(!s.ast().contains(b));
    assert_eq!(s.focus(), Some(id_at(&s, &[1])));
}

#[test]
fn test_redo_focuses_the_reinserted_node() {
    let mut s = session("(a)");
    let a = id_at(&s, &[0]);
    s.set_focus(a);
    let edit = Edit::insert(s.ast(), "\n(b)", None, "", Pos::new(0, 3)).unwrap();
    let committed = s.perform_edit(vec![edit]).unwrap();
    let b = id_at(&s, &[1]);
    assert_eq!(committed.focus, Some(b));

    assert!(s.undo().unwrap());
    assert_eq!(s.text(), "(a)");
    assert_eq!(s.focus(), Some(a));

    assert!(s.redo().unwrap());
    assert_eq!(s.text(), "(a)\n(b)");
    let reinserted = id_at(&s, &[1]);
    assert_ne!(reinserted, b);
    assert_eq!(s.focus(), Some(reinserted));
}
