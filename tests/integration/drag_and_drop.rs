//! Moving nodes with `Session::drop_node`.

use super::common::{id_at, session};
use blockedit::{DropTarget, EditError};

#[test]
fn test_moving_a_root_keeps_every_identity() {
    let mut s = session("(a)\n(b)\n(c)");
    let ids: Vec<_> = (0..3).map(|i| id_at(&s, &[i])).collect();

    let end = s.ast().insertion_pos(None, "", 3).unwrap();
    let committed = s.drop_node(ids[0], DropTarget::Root(end)).unwrap();

    assert_eq!(s.text(), "\n(b)\n(c)\n(a)\n");
    assert_eq!(id_at(&s, &[0]), ids[1]);
    assert_eq!(id_at(&s, &[1]), ids[2]);
    assert_eq!(id_at(&s, &[2]), ids[0]);
    assert_eq!(committed.focus, Some(ids[0]));
    assert_eq!(s.history().undo_levels(), 1);
}

#[test]
fn test_moving_an_argument_between_calls() {
    let mut s = session("(f 1 2)\n(g)");
    let g = id_at(&s, &[1]);
    let pos = s.ast().insertion_pos(Some(g), "args", 0).unwrap();
    let target = DropTarget::Child {
        parent: g,
        field: "args".to_string(),
        pos,
    };

    let committed = s.drop_node(id_at(&s, &[0, 2]), target).unwrap();
    assert_eq!(s.text(), "(f 1)\n(g 2)");
    assert_eq!(committed.focus, Some(id_at(&s, &[1])));
}

#[test]
fn test_drop_into_own_subtree_changes_nothing() {
    let mut s = session("(f (g 1))");
    let f = id_at(&s, &[0]);
    let g = id_at(&s, &[0, 1]);
    let target = DropTarget::Child {
        parent: g,
        field: "args".to_string(),
        pos: s.ast().insertion_pos(Some(g), "args", 0).unwrap(),
    };

    let result = s.drop_node(f, target);
    assert!(matches!(result, Err(EditError::InvalidRange { .. })));
    assert_eq!(s.text(), "(f (g 1))");
    assert!(!s.history().can_undo());
}

#[test]
fn test_drop_is_undone_as_one_step() {
    let mut s = session("(f 1)\n(g 2)");
    let f = id_at(&s, &[0]);
    let target = DropTarget::Child {
        parent: f,
        field: "args".to_string(),
        pos: s.ast().insertion_pos(Some(f), "args", 1).unwrap(),
    };
    s.drop_node(id_at(&s, &[1]), target).unwrap();
    assert_eq!(s.text(), "(f 1 (g 2))\n");

    assert!(s.undo().unwrap());
    assert_eq!(s.text(), "(f 1)\n(g 2)");
}
