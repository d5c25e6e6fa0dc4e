use sapwood_core::SourceBuffer;

use crate::InputEdit;

#[test]
fn splice_replaces_range() {
    let source = SourceBuffer::from("let x = 1;");
    let (new, edit) = InputEdit::splice(&source, 8..9, b"42");

    assert_eq!(new.as_bytes(), b"let x = 42;");
    assert_eq!(edit, InputEdit::new(8, 9, 10));
    assert_eq!(edit.delta(), 1);
    assert!(edit.is_consistent(&source, &new));
}

#[test]
fn splice_clamps_out_of_range() {
    let source = SourceBuffer::from("abc");
    let (new, edit) = InputEdit::splice(&source, 2..10, b"Z");

    assert_eq!(new.as_bytes(), b"abZ");
    assert_eq!(edit, InputEdit::new(2, 3, 3));

    let (appended, edit) = InputEdit::splice(&source, 7..9, b"!");
    assert_eq!(appended.as_bytes(), b"abc!");
    assert_eq!(edit, InputEdit::new(3, 3, 4));
}

#[test]
fn pure_deletion_and_insertion() {
    let source = SourceBuffer::from("hello world");

    let (deleted, edit) = InputEdit::splice(&source, 5..11, b"");
    assert_eq!(deleted.as_bytes(), b"hello");
    assert_eq!(edit.delta(), -6);

    let (inserted, edit) = InputEdit::splice(&source, 0..0, b">> ");
    assert_eq!(inserted.as_bytes(), b">> hello world");
    assert_eq!(edit, InputEdit::new(0, 0, 3));
}

#[test]
fn inconsistent_edits_are_detected() {
    let old = b"abcdef";
    let new = b"abXYef";

    assert!(InputEdit::new(2, 4, 4).is_consistent(old, new));
    // Wrong tail length.
    assert!(!InputEdit::new(2, 4, 5).is_consistent(old, new));
    // Prefix differs.
    assert!(!InputEdit::new(3, 4, 4).is_consistent(old, new));
    // Start after the old end.
    assert!(!InputEdit::new(5, 4, 4).is_consistent(old, new));
    // Past the end of the buffers.
    assert!(!InputEdit::new(2, 9, 9).is_consistent(old, new));
}

#[test]
fn offsets_map_across_the_edit() {
    // "0123456789" -> "012ab6789": [3, 6) replaced by two bytes.
    let edit = InputEdit::new(3, 6, 5);

    assert_eq!(edit.map_old(2), Some(2));
    assert_eq!(edit.map_old(3), None);
    assert_eq!(edit.map_old(5), None);
    assert_eq!(edit.map_old(6), Some(5));
    assert_eq!(edit.map_old(9), Some(8));

    assert_eq!(edit.map_new(2), Some(2));
    assert_eq!(edit.map_new(3), None);
    assert_eq!(edit.map_new(4), None);
    assert_eq!(edit.map_new(5), Some(6));
    assert_eq!(edit.map_new(8), Some(9));
}

#[test]
fn insertion_point_maps_to_its_far_side() {
    let edit = InputEdit::new(4, 4, 7);

    // Old offset 4 now sits after the inserted bytes.
    assert_eq!(edit.map_new(4), None);
    assert_eq!(edit.map_new(7), Some(4));
    assert_eq!(edit.map_new(3), Some(3));
    assert_eq!(edit.map_new(5), None);
    assert_eq!(edit.map_old(4), Some(7));
}

#[test]
fn deletion_point_maps_to_the_end_of_the_removed_bytes() {
    let edit = InputEdit::new(4, 7, 4);

    assert_eq!(edit.map_new(4), Some(7));
    assert_eq!(edit.map_new(3), Some(3));
    assert_eq!(edit.map_old(5), None);
    assert_eq!(edit.map_old(7), Some(4));
}
