use crate::{Point, SourceBuffer};

#[test]
fn clones_share_storage() {
    let a = SourceBuffer::from("def add(a, b):\n    return a + b\n");
    let b = a.clone();

    assert!(a.ptr_eq(&b));
    assert_eq!(a, b);
    assert_eq!(&a[0..3], b"def");
}

#[test]
fn equality_is_by_content() {
    let a = SourceBuffer::from("x = 1");
    let b = SourceBuffer::from(String::from("x = 1"));

    assert!(!a.ptr_eq(&b));
    assert_eq!(a, b);
    assert_ne!(a, SourceBuffer::from("x = 2"));
}

#[test]
fn point_conversion() {
    let src = SourceBuffer::from("ab\ncd\n\nef");

    assert_eq!(src.line_count(), 4);
    assert_eq!(src.point_at(0), Point::new(0, 0));
    assert_eq!(src.point_at(2), Point::new(0, 2));
    assert_eq!(src.point_at(3), Point::new(1, 0));
    assert_eq!(src.point_at(7), Point::new(3, 0));
    assert_eq!(src.point_at(100), Point::new(3, 2));

    assert_eq!(src.byte_at(Point::new(1, 1)), 4);
    assert_eq!(src.byte_at(Point::new(1, 40)), 5);
    assert_eq!(src.byte_at(Point::new(9, 0)), src.len());
}

#[test]
fn slice_clamps() {
    let src = SourceBuffer::from("hello");

    assert_eq!(src.slice(1..3), b"el");
    assert_eq!(src.slice(3..99), b"lo");
    assert_eq!(src.slice(9..12), b"");
    assert_eq!(src.text(0..5).unwrap(), "hello");
}

#[test]
fn non_utf8_bytes_are_kept() {
    let src = SourceBuffer::from(vec![b'a', 0xff, b'b']);

    assert_eq!(src.len(), 3);
    assert!(src.text(0..3).is_err());
    assert_eq!(src.point_at(2), Point::new(0, 2));
}

#[test]
fn point_display_is_one_based() {
    assert_eq!(Point::new(0, 4).to_string(), "1:5");
}
