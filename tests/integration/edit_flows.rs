//! Edits translated, validated, and committed end to end.

use super::common::{id_at, session};
use blockedit::edit::{group_by_ancestor, translate};
use blockedit::lang::Parse;
use blockedit::{speculate, Edit, EditError, Pos, SexprParser, TextChange};

#[test]
fn test_localized_edit_keeps_surrounding_identity() {
    let mut s = session("(f 1 2)");
    let root = id_at(&s, &[0]);
    let func = id_at(&s, &[0, 0]);
    let two = id_at(&s, &[0, 2]);

    let edit = Edit::replace(s.ast(), "10", id_at(&s, &[0, 1])).unwrap();
    s.perform_edit(vec![edit]).unwrap();

    assert_eq!(s.text(), "(f 10 2)");
    assert_eq!(id_at(&s, &[0]), root);
    assert_eq!(id_at(&s, &[0, 0]), func);
    assert_eq!(id_at(&s, &[0, 2]), two);
}

#[test]
fn test_unrelated_roots_keep_identity() {
    let mut s = session("(define a 1)\n(define b 2)\n(define c 3)");
    let a = id_at(&s, &[0]);
    let c = id_at(&s, &[2]);

    let edit = Edit::replace(s.ast(), "20", id_at(&s, &[1, 1])).unwrap();
    s.perform_edit(vec![edit]).unwrap();

    assert_eq!(s.text(), "(define a 1)\n(define b 20)\n(define c 3)");
    assert_eq!(id_at(&s, &[0]), a);
    assert_eq!(id_at(&s, &[2]), c);
}

#[test]
fn test_sibling_deletes_share_one_group() {
    let s = session("(list 1 2 3)");
    let edits = vec![
        Edit::delete(s.ast(), id_at(&s, &[0, 1])).unwrap(),
        Edit::delete(s.ast(), id_at(&s, &[0, 2])).unwrap(),
    ];

    let groups = group_by_ancestor(s.ast(), &edits).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].ancestor, id_at(&s, &[0]));
    assert_eq!(groups[0].members.len(), 2);
    assert_eq!(groups[0].range.from, Pos::new(0, 0));
    assert_eq!(groups[0].range.to, Pos::new(0, 12));

    let changes = translate(s.ast(), &edits, 80).unwrap();
    assert_eq!(
        changes,
        vec![TextChange::new(Pos::new(0, 0), Pos::new(0, 12), "(list 3)")]
    );
}

#[test]
fn test_nested_edits_are_reprinted_through_outer_ancestor() {
    let mut s = session("(f (g 1) 2)");
    let edits = vec![
        Edit::replace(s.ast(), "5", id_at(&s, &[0, 1, 1])).unwrap(),
        Edit::delete(s.ast(), id_at(&s, &[0, 2])).unwrap(),
    ];
    let changes = translate(s.ast(), &edits, 80).unwrap();
    assert_eq!(changes.len(), 1);

    s.perform_edit(edits).unwrap();
    assert_eq!(s.text(), "(f (g 5))");
}

#[test]
fn test_root_and_child_edits_in_one_batch() {
    let mut s = session("(f 1)\n(g 2)\n(h 3)");
    let edits = vec![
        Edit::delete(s.ast(), id_at(&s, &[2])).unwrap(),
        Edit::replace(s.ast(), "(k)", id_at(&s, &[0, 1])).unwrap(),
    ];
    s.perform_edit(edits).unwrap();
    assert_eq!(s.text(), "(f (k))\n(g 2)\n");
    assert_eq!(s.history().undo_levels(), 1);
}

#[test]
fn test_parameter_insert_reprints_definition() {
    let mut s = session("(define (area r) (* pi r r))");
    let params = id_at(&s, &[0, 1]);
    let edit = Edit::insert_at(s.ast(), "h", Some(params), "ids", 1).unwrap();
    s.perform_edit(vec![edit]).unwrap();
    assert_eq!(s.text(), "(define (area r h) (* pi r r))");
}

#[test]
fn test_deleting_required_child_leaves_blank() {
    let mut s = session("(define x (+ 1 2))");
    let edit = Edit::delete(s.ast(), id_at(&s, &[0, 1])).unwrap();
    s.perform_edit(vec![edit]).unwrap();
    assert_eq!(s.text(), "(define x ...)");
    // the placeholder is reparsed as a real blank, not left as a fake node
    assert_eq!(s.ast().node_at_path(&[0, 1]).unwrap().kind_name(), "Blank");
    assert!(s.ast().nodes().iter().all(|n| !n.is_fake()));
}

#[test]
fn test_filling_optional_else_branch() {
    let mut s = session("(if ready (go))");
    let root = Some(id_at(&s, &[0]));
    let edit = Edit::insert_at(s.ast(), "(wait)", root, "else", 0).unwrap();
    s.perform_edit(vec![edit]).unwrap();
    assert_eq!(s.text(), "(if ready (go) (wait))");
}

#[test]
fn test_comment_travels_with_reprinted_node() {
    let mut s = session("; the answer\n(define x 42)");
    let edit = Edit::replace(s.ast(), "43", id_at(&s, &[0, 1])).unwrap();
    s.perform_edit(vec![edit]).unwrap();
    assert_eq!(s.text(), "; the answer\n(define x 43)");
}

#[test]
fn test_unparseable_edit_is_rejected_before_commit() {
    let mut s = session("(+ 1 2)");
    let changes = vec![TextChange::new(Pos::new(0, 0), Pos::new(0, 1), "")];

    let result = speculate(&s.text(), &changes, &SexprParser);
    assert!(matches!(result, Err(EditError::Parse(_))));

    let result = s.commit(changes, None, None);
    assert!(matches!(result, Err(EditError::Parse(_))));
    assert_eq!(s.text(), "(+ 1 2)");
    assert!(!s.history().can_undo());
}

#[test]
fn test_overwrite_cutting_through_a_root_is_rejected() {
    let s = session("(+ 1 2)");
    let result = Edit::overwrite(s.ast(), "", Pos::new(0, 0), Pos::new(0, 1));
    assert!(matches!(result, Err(EditError::InvalidRange { .. })));
}

#[test]
fn test_overwrite_between_roots() {
    let mut s = session("(a)\n\n\n(b)");
    let edit = Edit::overwrite(s.ast(), "\n", Pos::new(0, 3), Pos::new(3, 0)).unwrap();
    s.perform_edit(vec![edit]).unwrap();
    assert_eq!(s.text(), "(a)\n(b)");
    assert_eq!(SexprParser.parse(&s.text()).unwrap().len(), 2);
}
