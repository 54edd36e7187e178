//! Focus after commit: edit hints, the change-set fallback, and collapse.

use super::common::{id_at, session};
use blockedit::{Edit, Pos};

#[test]
fn test_root_insert_focuses_inserted_node() {
    let mut s = session("(a)\n(c)");
    let edit = Edit::insert(s.ast(), "\n(b)", None, "", Pos::new(0, 3)).unwrap();
    let committed = s.perform_edit(vec![edit]).unwrap();

    assert_eq!(s.text(), "(a)\n(b)\n(c)");
    assert_eq!(committed.focus, Some(id_at(&s, &[1])));
    assert_eq!(s.focus(), committed.focus);
}

#[test]
fn test_deleting_first_root_focuses_next_root() {
    let mut s = session("(a)\n(b)\n(c)");
    let b = id_at(&s, &[1]);
    let edit = Edit::delete(s.ast(), id_at(&s, &[0])).unwrap();
    let committed = s.perform_edit(vec![edit]).unwrap();

    assert_eq!(committed.focus, Some(b));
    assert_eq!(id_at(&s, &[0]), b);
}

#[test]
fn test_deleting_only_root_clears_focus() {
    let mut s = session("(a)");
    let edit = Edit::delete(s.ast(), id_at(&s, &[0])).unwrap();
    let committed = s.perform_edit(vec![edit]).unwrap();

    assert_eq!(s.text(), "");
    assert!(s.ast().is_empty());
    assert_eq!(committed.focus, None);
}

#[test]
fn test_child_insert_focuses_new_child() {
    let mut s = session("(f 1 3)");
    let f = Some(id_at(&s, &[0]));
    let edit = Edit::insert_at(s.ast(), "2", f, "args", 1).unwrap();
    let committed = s.perform_edit(vec![edit]).unwrap();

    assert_eq!(s.text(), "(f 1 2 3)");
    assert_eq!(committed.focus, Some(id_at(&s, &[0, 2])));
}

#[test]
fn test_child_delete_focuses_previous_sibling() {
    let mut s = session("(f 1 2 3)");
    let one = id_at(&s, &[0, 1]);
    let edit = Edit::delete(s.ast(), id_at(&s, &[0, 2])).unwrap();
    let committed = s.perform_edit(vec![edit]).unwrap();

    assert_eq!(s.text(), "(f 1 3)");
    assert_eq!(committed.focus, Some(one));
}

#[test]
fn test_deleting_first_argument_focuses_parent() {
    let mut s = session("(f 1 2)");
    let f = id_at(&s, &[0]);
    let edit = Edit::delete(s.ast(), id_at(&s, &[0, 1])).unwrap();
    let committed = s.perform_edit(vec![edit]).unwrap();

    assert_eq!(s.text(), "(f 2)");
    assert_eq!(committed.focus, Some(f));
}

#[test]
fn test_focus_never_lands_inside_collapsed_node() {
    let mut s = session("(f (g 1 2))");
    let g = id_at(&s, &[0, 1]);
    assert!(s.collapse(g));

    let edit = Edit::replace(s.ast(), "5", id_at(&s, &[0, 1, 1])).unwrap();
    let committed = s.perform_edit(vec![edit]).unwrap();

    assert_eq!(s.text(), "(f (g 5 2))");
    assert_eq!(committed.focus, Some(g));
    assert!(s.is_collapsed(g));
}

#[test]
fn test_expand_restores_direct_focus() {
    let mut s = session("(f (g 1))");
    let g = id_at(&s, &[0, 1]);
    let one = id_at(&s, &[0, 1, 1]);
    s.collapse(g);
    s.set_focus(one);
    assert_eq!(s.focus(), Some(g));

    assert!(s.expand(g));
    s.set_focus(one);
    assert_eq!(s.focus(), Some(one));
}
