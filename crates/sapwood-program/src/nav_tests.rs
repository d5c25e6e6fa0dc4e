use crate::Nav;

#[test]
fn stricter_navigation_wins() {
    assert_eq!(Nav::Search.restrict(Nav::Adjacent), Nav::Adjacent);
    assert_eq!(Nav::Adjacent.restrict(Nav::Search), Nav::Adjacent);
    assert_eq!(Nav::Stay.restrict(Nav::Adjacent), Nav::Stay);
    assert_eq!(Nav::Adjacent.restrict(Nav::Stay), Nav::Stay);
    assert_eq!(Nav::Search.restrict(Nav::Search), Nav::Search);
}

#[test]
fn anchoring() {
    assert!(!Nav::Search.is_anchored());
    assert!(Nav::Adjacent.is_anchored());
    assert!(Nav::Stay.is_anchored());
    assert_eq!(Nav::default(), Nav::Search);
}
